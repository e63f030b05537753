use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use checker_core::{Category, Record};
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history directory {0} missing or not usable")]
    Dir(PathBuf),
    #[error("reading history {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("writing history {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Line-file persistence for per-category record history.
///
/// One file per category inside `dir`, one record per line, file order =
/// scan order of the most recent run. A save replaces the whole file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, category: Category) -> PathBuf {
        self.dir.join(category.history_filename())
    }

    /// Read the category's history, preserving file order.
    ///
    /// A missing file is the first-run case, not an error: the store
    /// creates it empty so subsequent loads behave identically.
    pub fn load(&self, category: Category) -> Result<Vec<Record>, HistoryError> {
        let path = self.path_for(category);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text.lines().map(Record::new).collect()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.ensure_dir()?;
                fs::write(&path, "").map_err(|source| HistoryError::Write {
                    path: path.clone(),
                    source,
                })?;
                Ok(Vec::new())
            }
            Err(source) => Err(HistoryError::Read { path, source }),
        }
    }

    /// Replace the category's history with `records`, one line each.
    ///
    /// Written to a temp file in the same directory and renamed into
    /// place, so a crash mid-save leaves the previous file intact.
    pub fn save(&self, category: Category, records: &[Record]) -> Result<(), HistoryError> {
        self.ensure_dir()?;
        let path = self.path_for(category);

        let mut content = String::new();
        for record in records {
            content.push_str(record.as_str());
            content.push('\n');
        }

        let write_err = |source: io::Error| HistoryError::Write {
            path: path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.as_file_mut().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|err| write_err(err.error))?;
        Ok(())
    }

    fn ensure_dir(&self) -> Result<(), HistoryError> {
        if self.dir.exists() {
            let meta =
                fs::metadata(&self.dir).map_err(|_| HistoryError::Dir(self.dir.clone()))?;
            if !meta.is_dir() {
                return Err(HistoryError::Dir(self.dir.clone()));
            }
        } else {
            fs::create_dir_all(&self.dir).map_err(|_| HistoryError::Dir(self.dir.clone()))?;
        }
        Ok(())
    }
}

/// Append one local-time execution stamp to the run log.
pub fn append_run_timestamp(path: &Path) -> io::Result<()> {
    let mut log = fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        log,
        "Executed on {}",
        chrono::Local::now().format("%m/%d/%Y %H:%M:%S")
    )
}
