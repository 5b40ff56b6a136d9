// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Shell-style expansion for entry values, and lexical normalization for
//! paths handed to us on the command line.

use std::{
    borrow::Cow,
    env,
    path::{Component, Path, PathBuf},
};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Expand leading `~` of value into the user's home directory.
///
/// Only a bare `~` or a `~/` prefix is expanded. Values that name another
/// user, e.g., `~bob/file`, stay as-is. If the home directory cannot be
/// determined, then the value stays as-is too.
pub fn expand_home(value: &str) -> Cow<'_, str> {
    shellexpand::tilde_with_context(value, || {
        home_dir()
            .ok()
            .map(|path| path.to_string_lossy().into_owned())
    })
}

/// Expand `$NAME` and `${NAME}` references in value.
///
/// References to variables that are unset, or not valid unicode, stay as-is.
pub fn expand_vars(value: &str) -> Cow<'_, str> {
    shellexpand::env_with_context_no_errors(value, |name: &str| env::var(name).ok())
}

/// Normalize path lexically.
///
/// Collapses redundant separators, `.` components, and `dir/..` pairs without
/// touching the file system. Leading `..` components of relative paths are
/// kept, and `..` at the root is dropped. An empty result becomes `.`.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => continue,
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }

    parts.iter().collect()
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
