//! Filesystem access, behind a trait so staleness decisions are testable.

use std::os::unix::prelude::MetadataExt;

/// MTime info gathered for a path.  This also models "file is absent".
/// It's not using an Option<> just because it makes the code using it easier
/// to follow.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MTime {
    Missing,
    Stamp(u32),
}

pub trait FileSystem {
    /// stat() an on-disk path, producing its MTime.
    fn stat(&self, path: &str) -> std::io::Result<MTime>;
    /// Copy a regular file.  The destination's parent directory must already
    /// exist.
    fn copy(&self, src: &str, dst: &str) -> std::io::Result<()>;
    /// Remove a file or directory tree, returning whether anything existed
    /// to remove.
    fn remove_path(&self, path: &str) -> std::io::Result<bool>;
}

pub struct RealFileSystem {}
impl RealFileSystem {
    pub fn new() -> Self {
        RealFileSystem {}
    }
}

impl FileSystem for RealFileSystem {
    fn stat(&self, path: &str) -> std::io::Result<MTime> {
        Ok(match std::fs::metadata(path) {
            Ok(meta) => MTime::Stamp(meta.mtime() as u32),
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    MTime::Missing
                } else {
                    return Err(err);
                }
            }
        })
    }

    fn copy(&self, src: &str, dst: &str) -> std::io::Result<()> {
        std::fs::copy(src, dst).map(|_| ())
    }

    fn remove_path(&self, path: &str) -> std::io::Result<bool> {
        let meta = match std::fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    return Ok(false);
                }
                return Err(err);
            }
        };
        if meta.is_dir() {
            std::fs::remove_dir_all(path)?;
        } else {
            std::fs::remove_file(path)?;
        }
        Ok(true)
    }
}
