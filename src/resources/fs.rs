//! File-system resource helpers.
use anyhow::{Context as _, Result};
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::BootstrapError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove an existing file or symlink at `path`, including broken symlinks.
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    if path.symlink_metadata().is_ok() {
        std::fs::remove_file(path)
            .with_context(|| format!("remove existing: {}", path.display()))?;
    }
    Ok(())
}

/// `true` if `path` exists and is a real directory (not a symlink to one).
#[must_use]
pub fn is_real_dir(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_dir())
}

/// Copy a single file, preserving permission bits.
///
/// # Errors
///
/// Returns [`BootstrapError::CopyFailed`] if the copy fails.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), BootstrapError> {
    std::fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| BootstrapError::CopyFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

/// Recreate the symlink `from` at `to`, pointing at the same target.
///
/// Anything but a directory already at `to` is replaced.
///
/// # Errors
///
/// Returns [`BootstrapError::CopyFailed`] if the link cannot be read or
/// created.
pub fn copy_symlink(from: &Path, to: &Path) -> Result<(), BootstrapError> {
    let failed = |source: io::Error| BootstrapError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    let target = std::fs::read_link(from).map_err(failed)?;
    if to.symlink_metadata().is_ok_and(|m| !m.is_dir()) {
        std::fs::remove_file(to).map_err(failed)?;
    }
    #[cfg(unix)]
    let linked = std::os::unix::fs::symlink(&target, to);
    #[cfg(not(unix))]
    let linked = std::fs::copy(&target, to).map(|_| ());
    linked.map_err(failed)
}

/// Recursively copy a directory tree, merging into `dst` if it exists.
///
/// Symlinks inside `src` are recreated as symlinks; `src` itself may be a
/// link to a directory.
///
/// # Errors
///
/// Returns [`BootstrapError::CopyFailed`] if a directory cannot be created or
/// read, or an entry cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), BootstrapError> {
    let failed = |source: io::Error| BootstrapError::CopyFailed {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dst).map_err(failed)?;
    for entry in std::fs::read_dir(src).map_err(failed)? {
        let entry = entry.map_err(failed)?;
        let file_type = entry.file_type().map_err(failed)?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if file_type.is_symlink() {
            copy_symlink(&src_path, &dst_path)?;
        } else if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_file(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Copy a file or directory tree from `from` to `to`.
///
/// A top-level symlink is followed; a dangling one is copied as a link.
///
/// # Errors
///
/// Returns [`BootstrapError::CopyFailed`] on any I/O failure.
pub fn copy_entry(from: &Path, to: &Path) -> Result<(), BootstrapError> {
    if from.is_dir() {
        copy_dir_recursive(from, to)
    } else if !from.exists() && from.symlink_metadata().is_ok() {
        copy_symlink(from, to)
    } else {
        copy_file(from, to)
    }
}

/// Copy `from` to `to` through a hidden sibling, renamed into place only
/// once the whole copy succeeded. On failure nothing is left at `to` or at
/// the sibling.
///
/// # Errors
///
/// Returns [`BootstrapError::CopyFailed`] if the copy or the rename fails.
pub fn copy_entry_staged(from: &Path, to: &Path) -> Result<(), BootstrapError> {
    let staging = staging_path(to);
    let failed = |source: io::Error| BootstrapError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    remove_tree(&staging).map_err(failed)?;
    let copied = copy_entry(from, &staging)
        .and_then(|()| std::fs::rename(&staging, to).map_err(failed));
    if copied.is_err() {
        remove_tree(&staging).ok();
    }
    copied
}

/// `<dir>/.<name>.partial` next to `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".partial");
    path.with_file_name(name)
}

/// Remove whatever is at `path`: a directory tree, a file or a symlink.
fn remove_tree(path: &Path) -> io::Result<()> {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// SHA-256 digest of a file's content.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn file_digest(path: &Path) -> io::Result<[u8; 32]> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().into())
}

/// `true` if both files exist and have identical content.
#[must_use]
pub fn same_content(a: &Path, b: &Path) -> bool {
    match (file_digest(a), file_digest(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

/// `true` if every file under `src` exists under `dst` with identical
/// content. Extra files under `dst` are ignored.
#[must_use]
pub fn tree_contains(src: &Path, dst: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(src) else {
        return false;
    };
    entries.filter_map(Result::ok).all(|entry| {
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if entry.file_type().is_ok_and(|t| t.is_symlink()) {
            let link = std::fs::read_link(&src_path).ok();
            link.is_some() && link == std::fs::read_link(&dst_path).ok()
        } else if src_path.is_dir() {
            dst_path.is_dir() && tree_contains(&src_path, &dst_path)
        } else {
            same_content(&src_path, &dst_path)
        }
    })
}
