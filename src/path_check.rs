//! Opening and type-checking rule targets.

use crate::directive::Scope;
use crate::error::ResourceError;
use std::fs::{File, FileType, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Open a directive's target and check its type against the scope.
///
/// Directories are opened `O_PATH`: attaching a rule needs no access to their
/// contents. Files are opened read-write. The returned handle is meant to live
/// only until its rule is registered.
///
/// # Errors
///
/// - `NotADirectory` if a subtree target is anything but a directory
/// - `NotARegularFile` if a file target is anything but a regular file
/// - `Open` or `Stat` for other I/O failures
pub fn open_rule_target(path: &Path, scope: Scope) -> Result<File, ResourceError> {
    let mut options = OpenOptions::new();
    match scope {
        Scope::Subtree => {
            options.read(true).custom_flags(libc::O_PATH);
        }
        Scope::File => {
            options.read(true).write(true);
        }
    }

    let file = options.open(path).map_err(|source| {
        // O_RDWR on a directory fails before we get to fstat it
        if scope == Scope::File && source.raw_os_error() == Some(libc::EISDIR) {
            ResourceError::NotARegularFile {
                path: path.to_path_buf(),
            }
        } else {
            ResourceError::Open {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let metadata = file.metadata().map_err(|source| ResourceError::Stat {
        path: path.to_path_buf(),
        source,
    })?;

    check_type(path, scope, metadata.file_type())?;

    Ok(file)
}

fn check_type(path: &Path, scope: Scope, file_type: FileType) -> Result<(), ResourceError> {
    match scope {
        Scope::Subtree if !file_type.is_dir() => Err(ResourceError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Scope::File if !file_type.is_file() => Err(ResourceError::NotARegularFile {
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}
