use crate::{FileRole, UploadedFile};

/// Session-scoped collection of loaded files, kept in insertion order.
///
/// Names are not unique: adding a file whose name is already present keeps
/// both records, and removal by name drops every record with that name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileCollection {
    files: Vec<UploadedFile>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, files: impl IntoIterator<Item = UploadedFile>) {
        self.files.extend(files);
    }

    /// Removes all records named `name` and returns how many were dropped.
    pub fn remove_by_name(&mut self, name: &str) -> usize {
        let before = self.files.len();
        self.files.retain(|file| file.name != name);
        before - self.files.len()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadedFile> {
        self.files.iter()
    }

    pub fn documents(&self) -> impl Iterator<Item = &UploadedFile> {
        documents(&self.files)
    }

    pub fn first_html(&self) -> Option<&UploadedFile> {
        first_html(&self.files)
    }

    pub fn html_count(&self) -> usize {
        self.files
            .iter()
            .filter(|file| file.role == FileRole::Html)
            .count()
    }

    /// The knowledge base can be built once at least one document and one
    /// HTML page are present.
    pub fn can_build(&self) -> bool {
        self.documents().next().is_some() && self.first_html().is_some()
    }

    pub fn snapshot(&self) -> Vec<UploadedFile> {
        self.files.clone()
    }
}

/// Document-role files in insertion order.
pub fn documents(files: &[UploadedFile]) -> impl Iterator<Item = &UploadedFile> {
    files.iter().filter(|file| file.role == FileRole::Document)
}

/// The HTML page used for prompting: the first HTML-role file in insertion
/// order. Later HTML files stay in the collection but are never sent.
pub fn first_html(files: &[UploadedFile]) -> Option<&UploadedFile> {
    files.iter().find(|file| file.role == FileRole::Html)
}
