//! Collecting the files a batch will touch.
//!
//! Paths arrive three ways: picked directly, found by walking a folder, or
//! delivered as a drag-and-drop payload string. They all end up in a
//! [`FileList`], which keeps insertion order and refuses anything the batch
//! could not handle:
//!
//! | Rejection | When |
//! |---|---|
//! | `FileNotFound` | the path does not exist |
//! | `UnsupportedFormat` | extension is not jpg/jpeg/png/bmp/gif/webp, or not a file |
//! | `DuplicateSkipped` | the same file (after canonicalization) is already listed |
//!
//! Folders are walked recursively with no depth limit. Within a folder,
//! entries are visited in file-name order so repeated runs see the same
//! sequence.
//!
//! ## Drop payloads
//!
//! Desktop drag-and-drop hands over one string. [`parse_drop_payload`]
//! accepts the shapes seen in the wild:
//!
//! ```text
//! {C:/My Photos/a.jpg} {C:/b.png} C:/c.gif      Tk-style list, braces around paths with spaces
//! file:///home/me/a%20b.jpg file:///C:/c.png   URI list, percent-encoded
//! /home/me/My Photos/a.jpg                      one path with spaces
//! /tmp/a.jpg /tmp/b.jpg                         whitespace-separated paths
//! ```

use crate::imaging::{ResizeError, is_supported};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Ordered, duplicate-free list of files waiting to be resized.
#[derive(Debug, Default, Clone)]
pub struct FileList {
    files: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

fn identity_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one file, or say why not.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> Result<(), ResizeError> {
        let path = path.into();
        if !path.exists() {
            return Err(ResizeError::FileNotFound(path));
        }
        if !path.is_file() || !is_supported(&path) {
            return Err(ResizeError::UnsupportedFormat(path));
        }
        let key = identity_key(&path);
        if self.seen.contains(&key) {
            return Err(ResizeError::DuplicateSkipped(path));
        }
        self.seen.insert(key);
        self.files.push(path);
        Ok(())
    }

    /// Add many files, returning the rejections in input order.
    pub fn extend<I, P>(&mut self, paths: I) -> Vec<ResizeError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut rejected = Vec::new();
        for path in paths {
            if let Err(err) = self.add(path) {
                tracing::debug!(error = %err, "rejected file");
                rejected.push(err);
            }
        }
        rejected
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        let key = identity_key(path);
        let before = self.files.len();
        self.files.retain(|p| identity_key(p) != key);
        self.seen.remove(&key);
        self.files.len() != before
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Hand the list to a batch. Consuming it means nothing can be added or
    /// removed while the batch runs.
    pub fn into_batch(self) -> Vec<PathBuf> {
        self.files
    }
}

/// Expand user-supplied paths: files pass through, folders are walked.
///
/// Files found inside folders are pre-filtered by extension; explicitly named
/// files are not, so [`FileList::add`] can report why they were refused.
pub fn collect_from_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut collected = Vec::new();
    for path in paths {
        if path.is_dir() {
            collected.extend(walk_folder(path));
        } else {
            collected.push(path.clone());
        }
    }
    collected
}

/// All supported images under `root`, at any depth, in file-name order.
pub fn walk_folder(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_supported(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Split a drag-and-drop payload into paths. See the [module docs](self).
pub fn parse_drop_payload(data: &str) -> Vec<PathBuf> {
    let data = data.trim();
    if data.is_empty() {
        return Vec::new();
    }
    if data.contains("file:") {
        return data
            .split_whitespace()
            .filter_map(|token| token.strip_prefix("file://"))
            .map(|rest| windows_drive(percent_decode(strip_uri_host(rest))))
            .map(PathBuf::from)
            .collect();
    }
    if !data.contains('{') && Path::new(data).exists() {
        return vec![PathBuf::from(data)];
    }
    split_tk_list(data).into_iter().map(PathBuf::from).collect()
}

/// `file://host/path` and `file:///path` both reduce to `/path`.
fn strip_uri_host(rest: &str) -> &str {
    match rest.find('/') {
        Some(slash) => &rest[slash..],
        None => rest,
    }
}

/// `/C:/a.jpg` becomes `C:/a.jpg`; other paths pass through.
fn windows_drive(path: String) -> String {
    let bytes = path.as_bytes();
    let has_drive =
        bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':';
    if has_drive {
        path[1..].to_string()
    } else {
        path
    }
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Tokenize a Tk list: `{...}` groups keep their spaces, bare words split on
/// whitespace.
fn split_tk_list(data: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = data.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '{' {
            chars.next();
            let token: String = chars.by_ref().take_while(|&c| c != '}').collect();
            if !token.is_empty() {
                tokens.push(token);
            }
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
    }
    tokens
}
