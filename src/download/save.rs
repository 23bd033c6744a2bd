use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// "Save bytes under this name" primitive.
pub trait Saver: Send + Sync {
    /// Persist `bytes` as `filename`, returning where it ended up.
    fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Saves into a directory, going through a hidden `.part` file so that a
/// failed write never leaves a truncated file under the final name.
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Saver for DirectorySaver {
    fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        if filename.is_empty() || Path::new(filename).file_name() != Some(OsStr::new(filename)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a plain file name: {filename:?}"),
            ));
        }

        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(filename);
        let part = self.dir.join(format!(".{filename}.part"));

        let written = File::create(&part).and_then(|mut f| {
            f.write_all(bytes)?;
            f.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&part, &target)) {
            let _ = fs::remove_file(&part);
            return Err(e);
        }

        Ok(target)
    }
}
