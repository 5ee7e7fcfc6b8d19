use std::path::{Path, PathBuf};

use agent_logging::{agent_debug, agent_warn};
use qa_agent_core::{FileRole, UploadedFile};

use crate::decode::decode_text;
use crate::IntakeError;

/// Reads a selection of files in order. Fails as a whole on the first file
/// that cannot be read, so a selection is never partially added.
pub async fn read_files(
    role: FileRole,
    paths: &[PathBuf],
) -> Result<Vec<UploadedFile>, IntakeError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_file(role, path).await?);
    }
    Ok(files)
}

pub async fn read_file(role: FileRole, path: &Path) -> Result<UploadedFile, IntakeError> {
    let display = path.display().to_string();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| IntakeError::NoFileName {
            path: display.clone(),
        })?;

    let bytes = tokio::fs::read(path).await.map_err(|err| IntakeError::Read {
        path: display.clone(),
        message: err.to_string(),
    })?;
    let decoded = decode_text(&bytes);
    if decoded.lossy {
        agent_warn!(
            "{} has malformed {} sequences; replaced with U+FFFD",
            display,
            decoded.encoding_label
        );
    }

    agent_debug!(
        "Read {} as {} ({} bytes, {})",
        display,
        role,
        bytes.len(),
        decoded.encoding_label
    );
    Ok(UploadedFile {
        name,
        content: decoded.text,
        role,
        size: bytes.len() as u64,
    })
}
