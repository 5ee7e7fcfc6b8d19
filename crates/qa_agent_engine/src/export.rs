use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use agent_logging::agent_info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::filename::sanitize_file_name;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("export directory missing or not writable: {0}")]
    ExportDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes generated scripts into a directory, one file per test case.
#[derive(Debug, Clone)]
pub struct ScriptExporter {
    dir: PathBuf,
}

impl ScriptExporter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Writes `code` verbatim to `{dir}/{file_name}` through a temp file and
    /// rename, replacing any earlier export of the same name.
    pub fn export(&self, file_name: &str, code: &str) -> Result<PathBuf, PersistError> {
        prepare_dir(&self.dir)?;

        let target = self.dir.join(sanitize_file_name(file_name));
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(code.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        agent_info!("Exported script to {:?} ({} bytes)", target, code.len());
        Ok(target)
    }
}

fn prepare_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::ExportDir(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| PersistError::ExportDir(e.to_string()))
        }
        Err(err) => Err(PersistError::ExportDir(err.to_string())),
    }
}
