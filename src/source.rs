//! Collaborator that turns a path (or literal string) into `{file_label, bytes}`.
//!
//! This is the one seam the core pipeline never reaches past: it knows how to
//! ask a `SourceLoader` for a file's contents and resolve `#include` search
//! paths, but never touches `std::fs` itself outside of this module.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::token::FileLabel;

/// Bytes for one file, tagged with the label that diagnostics print.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub label: FileLabel,
    pub path: Option<PathBuf>,
    pub bytes: Rc<[u8]>,
}

impl SourceFile {
    pub fn synthetic(label: &str, contents: &str) -> Self {
        SourceFile {
            label: Rc::from(label),
            path: None,
            bytes: Rc::from(contents.as_bytes()),
        }
    }
}

/// Resolves include paths and reads file contents. The core pipeline is
/// generic over this trait so tests can substitute an in-memory loader.
pub trait SourceLoader {
    fn load_path(&mut self, path: &Path) -> io::Result<SourceFile>;

    /// Resolve and load a `"local"` include relative to `current_dir`, then
    /// each of `include_paths`, in order. First existing file wins.
    fn resolve_local(
        &mut self,
        current_dir: Option<&Path>,
        name: &str,
        include_paths: &[PathBuf],
    ) -> io::Result<SourceFile> {
        if let Some(dir) = current_dir {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return self.load_path(&candidate);
            }
        }
        self.resolve_system(name, include_paths)
    }

    /// Resolve and load a `<system>` include: configured include paths only.
    fn resolve_system(&mut self, name: &str, include_paths: &[PathBuf]) -> io::Result<SourceFile> {
        for dir in include_paths {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return self.load_path(&candidate);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("include file not found: {name}"),
        ))
    }
}

/// The default loader: reads real files off disk.
#[derive(Debug, Default)]
pub struct FsSourceLoader;

impl SourceLoader for FsSourceLoader {
    fn load_path(&mut self, path: &Path) -> io::Result<SourceFile> {
        let bytes = fs::read(path)?;
        Ok(SourceFile {
            label: Rc::from(path.to_string_lossy().as_ref()),
            path: Some(path.to_path_buf()),
            bytes: Rc::from(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_file_has_no_path() {
        let f = SourceFile::synthetic("<test>", "int main(){}");
        assert!(f.path.is_none());
        assert_eq!(&*f.bytes, b"int main(){}");
    }

    #[test]
    fn fs_loader_resolves_local_before_system() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(dir.path().join("a.h"), "local").unwrap();
        std::fs::write(sub.join("a.h"), "system").unwrap();

        let mut loader = FsSourceLoader;
        let found = loader
            .resolve_local(Some(dir.path()), "a.h", &[sub.clone()])
            .unwrap();
        assert_eq!(&*found.bytes, b"local");
    }

    #[test]
    fn fs_loader_falls_back_to_include_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("b.h"), "system").unwrap();

        let mut loader = FsSourceLoader;
        let found = loader
            .resolve_local(Some(dir.path()), "b.h", &[sub.clone()])
            .unwrap();
        assert_eq!(&*found.bytes, b"system");
    }
}
