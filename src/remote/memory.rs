//! In-memory remote tree.
//!
//! Backs `deploy --dry-run`: the pipeline runs against an empty tree and the
//! journal shows every mutation that would have reached the server.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;

use super::RemoteStore;
use crate::error::SyncError;

/// A mutating operation issued against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    MakeDir(String),
    RemoveDir(String),
    Put { path: String, bytes: u64 },
    RemoveFile(String),
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteOp::MakeDir(path) => write!(f, "MKD  {path}"),
            RemoteOp::RemoveDir(path) => write!(f, "RMD  {path}"),
            RemoteOp::Put { path, bytes } => write!(f, "STOR {path} ({bytes} bytes)"),
            RemoteOp::RemoveFile(path) => write!(f, "DELE {path}"),
        }
    }
}

/// Remote store kept entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryStore {
    cwd: String,
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    journal: Vec<RemoteOp>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty tree containing only `/`
    pub fn new() -> Self {
        MemoryStore {
            cwd: "/".to_string(),
            dirs: BTreeSet::from(["/".to_string()]),
            files: BTreeMap::new(),
            journal: Vec::new(),
        }
    }

    /// Seed a file (and its directories) without journaling it
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        let path = normalize("/", path);
        let mut prefix = String::new();
        if let Some((parent, _)) = path.rsplit_once('/') {
            for segment in parent.split('/').filter(|s| !s.is_empty()) {
                prefix.push('/');
                prefix.push_str(segment);
                self.dirs.insert(prefix.clone());
            }
        }
        self.files.insert(path, content.to_vec());
        self
    }

    /// Seed a directory chain without journaling it
    pub fn with_dir(mut self, path: &str) -> Self {
        let mut prefix = String::new();
        for segment in normalize("/", path).split('/').filter(|s| !s.is_empty()) {
            prefix.push('/');
            prefix.push_str(segment);
            self.dirs.insert(prefix.clone());
        }
        self
    }

    /// Mutations issued so far, in order
    pub fn operations(&self) -> &[RemoteOp] {
        &self.journal
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.dirs.contains(&normalize("/", path))
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(&normalize("/", path)).map(Vec::as_slice)
    }

    fn resolve(&self, path: &str) -> String {
        normalize(&self.cwd, path)
    }

    fn parent_exists(&self, path: &str) -> bool {
        match path.rsplit_once('/') {
            Some(("", _)) => true,
            Some((parent, _)) => self.dirs.contains(parent),
            None => false,
        }
    }

    fn is_empty_dir(&self, path: &str) -> bool {
        let prefix = format!("{path}/");
        !self.dirs.iter().any(|d| d.starts_with(&prefix))
            && !self.files.keys().any(|f| f.starts_with(&prefix))
    }
}

impl RemoteStore for MemoryStore {
    fn current_dir(&mut self) -> Result<String, SyncError> {
        Ok(self.cwd.clone())
    }

    fn change_dir(&mut self, path: &str) -> Result<(), SyncError> {
        let target = self.resolve(path);
        if !self.dirs.contains(&target) {
            return Err(SyncError::navigation(path, "no such directory"));
        }
        self.cwd = target;
        Ok(())
    }

    fn make_dir(&mut self, path: &str) -> Result<(), SyncError> {
        let target = self.resolve(path);
        if self.dirs.contains(&target) || self.files.contains_key(&target) {
            return Err(SyncError::remote_write("creating directory", path, "already exists"));
        }
        if !self.parent_exists(&target) {
            return Err(SyncError::remote_write("creating directory", path, "parent does not exist"));
        }
        self.dirs.insert(target.clone());
        self.journal.push(RemoteOp::MakeDir(target));
        Ok(())
    }

    fn remove_dir(&mut self, path: &str) -> Result<(), SyncError> {
        let target = self.resolve(path);
        if target == "/" || !self.dirs.contains(&target) {
            return Err(SyncError::remote_write("deleting directory", path, "no such directory"));
        }
        if !self.is_empty_dir(&target) {
            return Err(SyncError::remote_write("deleting directory", path, "directory not empty"));
        }
        self.dirs.remove(&target);
        self.journal.push(RemoteOp::RemoveDir(target));
        Ok(())
    }

    fn put_file(&mut self, name: &str, reader: &mut dyn Read) -> Result<u64, SyncError> {
        let target = self.resolve(name);
        if self.dirs.contains(&target) {
            return Err(SyncError::remote_write("uploading", name, "is a directory"));
        }
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| SyncError::remote_write("uploading", name, e))?;

        let bytes = content.len() as u64;
        self.files.insert(target.clone(), content);
        self.journal.push(RemoteOp::Put { path: target, bytes });
        Ok(bytes)
    }

    fn remove_file(&mut self, name: &str) -> Result<(), SyncError> {
        let target = self.resolve(name);
        if self.files.remove(&target).is_none() {
            return Err(SyncError::remote_write("deleting file", name, "no such file"));
        }
        self.journal.push(RemoteOp::RemoveFile(target));
        Ok(())
    }
}

/// Resolve `path` against `cwd` into a canonical absolute path
fn normalize(cwd: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{cwd}/{path}")
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}
