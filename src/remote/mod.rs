//! Remote file store abstraction.
//!
//! A store is a single session with a current-directory cursor. Backends
//! implement a handful of primitives; the higher-level operations used by the
//! deployment pipeline are provided on top of them and always navigate
//! explicitly before acting, so no operation depends on where a previous one
//! left the cursor.

mod ftp;
pub mod memory;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::SyncError;

pub use ftp::FtpStore;
pub use memory::{MemoryStore, RemoteOp};

/// Session-level operations a remote backend must provide.
///
/// Paths handed to the primitives are absolute remote paths unless stated
/// otherwise.
pub trait RemoteStore {
    /// Current directory of the session
    fn current_dir(&mut self) -> Result<String, SyncError>;

    /// Move the cursor. Fails with [`SyncError::Navigation`].
    fn change_dir(&mut self, path: &str) -> Result<(), SyncError>;

    /// Create a single directory whose parent exists
    fn make_dir(&mut self, path: &str) -> Result<(), SyncError>;

    /// Remove an empty directory
    fn remove_dir(&mut self, path: &str) -> Result<(), SyncError>;

    /// Store `reader` as `name` in the current directory, overwriting any
    /// existing file. Content must be transferred byte for byte.
    fn put_file(&mut self, name: &str, reader: &mut dyn Read) -> Result<u64, SyncError>;

    /// Remove `name` from the current directory
    fn remove_file(&mut self, name: &str) -> Result<(), SyncError>;

    /// Whether `path` is an existing directory.
    ///
    /// Probes by changing into it and restores the previous directory, so the
    /// cursor is unchanged afterwards.
    fn directory_exists(&mut self, path: &str) -> Result<bool, SyncError> {
        let previous = self.current_dir()?;
        if self.change_dir(path).is_err() {
            return Ok(false);
        }
        self.change_dir(&previous)?;
        Ok(true)
    }

    /// Create `path` and any missing ancestors.
    ///
    /// Walks the chain from the root, probing each prefix by changing into it
    /// and creating it only when the probe fails. Existing directories are
    /// never an error. A probe failing for another reason than absence is
    /// treated as absence; the following create then reports the real error.
    fn create_directory(&mut self, path: &str) -> Result<(), SyncError> {
        let mut prefix = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            prefix.push('/');
            prefix.push_str(segment);

            if self.change_dir(&prefix).is_err() {
                self.make_dir(&prefix)?;
                self.change_dir(&prefix)?;
            }
        }
        Ok(())
    }

    /// Upload a local file to `remote_path`. The parent directory must exist.
    fn upload_file(&mut self, local_path: &Path, remote_path: &str) -> Result<u64, SyncError> {
        let (directory, name) = split_remote(remote_path);
        let mut file = File::open(local_path).map_err(|e| {
            SyncError::remote_write(
                "uploading",
                remote_path,
                format!("cannot read '{}': {}", local_path.display(), e),
            )
        })?;

        self.change_dir(directory)?;
        self.put_file(name, &mut file)
    }

    /// Delete the file at `remote_path`
    fn delete_file(&mut self, remote_path: &str) -> Result<(), SyncError> {
        let (directory, name) = split_remote(remote_path);
        self.change_dir(directory)?;
        self.remove_file(name)
    }

    /// Delete the (empty) directory at `remote_path`
    fn delete_directory(&mut self, remote_path: &str) -> Result<(), SyncError> {
        if !self.directory_exists(remote_path)? {
            return Err(SyncError::remote_write(
                "deleting directory",
                remote_path,
                "no such directory",
            ));
        }
        self.remove_dir(remote_path)
    }
}

impl<S: RemoteStore + ?Sized> RemoteStore for &mut S {
    fn current_dir(&mut self) -> Result<String, SyncError> {
        (**self).current_dir()
    }

    fn change_dir(&mut self, path: &str) -> Result<(), SyncError> {
        (**self).change_dir(path)
    }

    fn make_dir(&mut self, path: &str) -> Result<(), SyncError> {
        (**self).make_dir(path)
    }

    fn remove_dir(&mut self, path: &str) -> Result<(), SyncError> {
        (**self).remove_dir(path)
    }

    fn put_file(&mut self, name: &str, reader: &mut dyn Read) -> Result<u64, SyncError> {
        (**self).put_file(name, reader)
    }

    fn remove_file(&mut self, name: &str) -> Result<(), SyncError> {
        (**self).remove_file(name)
    }
}

/// Split an absolute remote path into parent directory and final segment
pub fn split_remote(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((directory, name)) => (directory, name),
        None => (".", trimmed),
    }
}
