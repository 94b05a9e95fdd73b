//! Filesystem View
//!
//! The minimal filesystem surface the wildcard matcher needs: directory
//! listings and single-entry metadata. Ships with an in-memory tree for
//! embedders and tests, and a thin adapter over the real filesystem for
//! the demonstration binary.

use indexmap::IndexMap;
use thiserror::Error;

use crate::path::normalize_path;

/// Filesystem errors surfaced to the matcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("ENOTDIR: not a directory, {operation} '{path}'")]
    NotDirectory { path: String, operation: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileKind,
    pub executable: bool,
}

pub trait FileSystem {
    /// List a directory. The order is the order candidates are matched in;
    /// the wildcard stage sorts final results itself.
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError>;
}

#[derive(Debug, Clone)]
enum Node {
    File { executable: bool },
    Dir(IndexMap<String, Node>),
}

/// An in-memory directory tree with absolute paths.
#[derive(Debug, Clone)]
pub struct InMemoryFs {
    root: IndexMap<String, Node>,
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFs {
    pub fn new() -> Self {
        Self {
            root: IndexMap::new(),
        }
    }

    fn components(path: &str) -> Vec<String> {
        normalize_path(path)
            .split('/')
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect()
    }

    /// Create a directory and any missing parents.
    pub fn add_dir(&mut self, path: &str) {
        let comps = Self::components(path);
        let mut cursor = &mut self.root;
        for comp in comps {
            let node = cursor
                .entry(comp)
                .or_insert_with(|| Node::Dir(IndexMap::new()));
            match node {
                Node::Dir(children) => cursor = children,
                Node::File { .. } => return,
            }
        }
    }

    fn add_node(&mut self, path: &str, node: Node) {
        let mut comps = Self::components(path);
        let Some(name) = comps.pop() else {
            return;
        };
        let mut cursor = &mut self.root;
        for comp in comps {
            let parent = cursor
                .entry(comp)
                .or_insert_with(|| Node::Dir(IndexMap::new()));
            match parent {
                Node::Dir(children) => cursor = children,
                Node::File { .. } => return,
            }
        }
        cursor.insert(name, node);
    }

    /// Create a regular file, with missing parents.
    pub fn add_file(&mut self, path: &str) {
        self.add_node(path, Node::File { executable: false });
    }

    /// Create an executable file, with missing parents.
    pub fn add_executable(&mut self, path: &str) {
        self.add_node(path, Node::File { executable: true });
    }

    fn lookup(&self, path: &str) -> Option<&Node> {
        let comps = Self::components(path);
        let mut cursor = &self.root;
        let mut iter = comps.iter().peekable();
        while let Some(comp) = iter.next() {
            let node = cursor.get(comp)?;
            if iter.peek().is_none() {
                return Some(node);
            }
            match node {
                Node::Dir(children) => cursor = children,
                Node::File { .. } => return None,
            }
        }
        None
    }
}

impl FileSystem for InMemoryFs {
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let children = if Self::components(path).is_empty() {
            &self.root
        } else {
            match self.lookup(path) {
                Some(Node::Dir(children)) => children,
                Some(Node::File { .. }) => {
                    return Err(FsError::NotDirectory {
                        path: path.to_string(),
                        operation: "scandir".to_string(),
                    })
                }
                None => {
                    return Err(FsError::NotFound {
                        path: path.to_string(),
                        operation: "scandir".to_string(),
                    })
                }
            }
        };
        Ok(children
            .iter()
            .map(|(name, node)| match node {
                Node::File { executable } => DirEntry {
                    name: name.clone(),
                    kind: FileKind::File,
                    executable: *executable,
                },
                Node::Dir(_) => DirEntry {
                    name: name.clone(),
                    kind: FileKind::Directory,
                    executable: true,
                },
            })
            .collect())
    }
}

/// Adapter over the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let dir = if path.is_empty() { "/" } else { path };
        let entries = std::fs::read_dir(dir).map_err(|_| FsError::NotFound {
            path: dir.to_string(),
            operation: "scandir".to_string(),
        })?;
        let mut result = Vec::new();
        for entry in entries.flatten() {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            let kind = if meta.is_dir() {
                FileKind::Directory
            } else {
                FileKind::File
            };
            #[cfg(unix)]
            let executable = {
                use std::os::unix::fs::PermissionsExt;
                meta.permissions().mode() & 0o111 != 0
            };
            #[cfg(not(unix))]
            let executable = kind == FileKind::Directory;
            result.push(DirEntry {
                name,
                kind,
                executable,
            });
        }
        Ok(result)
    }
}
