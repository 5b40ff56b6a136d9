// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Entry resolution.
//!
//! Turn a single [`SpecEntry`] into the concrete file paths it stands for. The
//! attributes of the entry are applied in a fixed order:
//!
//! 1. Home directory expansion (`u`) on the raw value.
//! 2. Environment variable expansion (`v`) on the raw value.
//! 3. Glob expansion (`g`).
//! 4. Recursive directory expansion (`r`).
//! 5. Redirection through a list file (`@`).
//!
//! # Redirection
//!
//! An entry with the `@` attribute names a __list file__. Every non-blank line
//! of that file is trimmed and resolved as an entry of its own, inheriting the
//! attributes of the redirecting entry minus `@`. Because of this, glob and
//! recursive expansion never apply to the redirecting entry itself. They are
//! deferred to the entries read from the list file, and a diagnostic is
//! reported so the deferral is not silent.
//!
//! Resolution never deduplicates. The result is a sequence in resolution
//! order.

use crate::{
    attrs::Attrs,
    entry::SpecEntry,
    path::{expand_home, expand_vars},
};

use glob::MatchOptions;
use ignore::WalkBuilder;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Resolve entry into flat sequence of file paths.
///
/// Attribute conflicts are reported to `diagnostics`, and do not stop
/// resolution.
///
/// # Errors
///
/// - Return [`ResolveError::Pattern`] if glob pattern is invalid.
/// - Return [`ResolveError::Glob`] if glob matching cannot read a path.
/// - Return [`ResolveError::Walk`] if recursive directory walk fails.
/// - Return [`ResolveError::ReadList`] if list file cannot be read.
/// - Return [`ResolveError::RedirectArity`] if a redirecting entry does not
///   resolve to exactly one list file.
#[instrument(skip(entry, diagnostics), fields(value = %entry.value, attrs = %entry.attrs), level = "debug")]
pub fn resolve(entry: &SpecEntry, diagnostics: &mut dyn Diagnostics) -> Result<Vec<PathBuf>> {
    let attrs = entry.attrs;
    let mut value = entry.value.clone();
    if attrs.contains(Attrs::HOME) {
        value = expand_home(&value).into_owned();
    }
    if attrs.contains(Attrs::VARS) {
        value = expand_vars(&value).into_owned();
    }

    let mut filenames = vec![PathBuf::from(value)];

    if attrs.globs() {
        filenames = expand_glob(&filenames[0])?;
    } else if attrs.contains(Attrs::GLOB) {
        diagnostics.report(Diagnostic::GlobSkipped {
            value: entry.value.clone(),
        });
    }

    if attrs.recurses() {
        filenames = expand_dirs(filenames)?;
    } else if attrs.contains(Attrs::RECURSE) {
        diagnostics.report(Diagnostic::RecurseSkipped {
            value: entry.value.clone(),
        });
    }

    if !attrs.contains(Attrs::REDIRECT) {
        return Ok(filenames);
    }

    // INVARIANT: Redirect through exactly one list file.
    let list_path = match <[PathBuf; 1]>::try_from(filenames) {
        Ok([list_path]) => list_path,
        Err(filenames) => {
            return Err(ResolveError::RedirectArity {
                value: entry.value.clone(),
                count: filenames.len(),
            })
        }
    };

    debug!("follow redirect to {:?}", list_path.display());
    let content = read_to_string(&list_path).map_err(|err| ResolveError::ReadList {
        source: err,
        path: list_path.clone(),
    })?;

    let inherited = attrs.without(Attrs::REDIRECT);
    let mut resolved = Vec::new();
    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        resolved.extend(resolve(&SpecEntry::new(line, inherited), diagnostics)?);
    }

    Ok(resolved)
}

fn expand_glob(pattern: &Path) -> Result<Vec<PathBuf>> {
    let pattern = shell_pattern(&pattern.to_string_lossy());
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut matches = Vec::new();
    for path in glob::glob_with(&pattern, options).map_err(|err| ResolveError::Pattern {
        source: err,
        pattern: pattern.to_string(),
    })? {
        matches.push(path?);
    }
    debug!("glob {pattern:?} matched {} path(s)", matches.len());

    Ok(matches)
}

/// Rewrite shell glob pattern into [`glob`] crate syntax.
///
/// Shell globs have no recursive wildcard, so any run of `*` means a single
/// `*`. A `[` without a closing `]` in the same path component is a literal
/// character.
fn shell_pattern(pattern: &str) -> String {
    let chars = pattern.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(pattern.len());
    let mut idx = 0;
    while idx < chars.len() {
        match chars[idx] {
            '*' => {
                out.push('*');
                while chars.get(idx + 1) == Some(&'*') {
                    idx += 1;
                }
            }
            '[' => match closing_bracket(&chars, idx) {
                Some(end) => {
                    out.extend(&chars[idx..=end]);
                    idx = end;
                }
                None => out.push_str("[[]"),
            },
            ch => out.push(ch),
        }
        idx += 1;
    }

    out
}

fn closing_bracket(chars: &[char], open: usize) -> Option<usize> {
    let mut idx = open + 1;
    if chars.get(idx) == Some(&'!') {
        idx += 1;
    }

    // INVARIANT: A `]` right after the opening is part of the class.
    if chars.get(idx) == Some(&']') {
        idx += 1;
    }

    chars[idx.min(chars.len())..]
        .iter()
        .take_while(|ch| **ch != '/')
        .position(|ch| *ch == ']')
        .map(|offset| idx + offset)
}

fn expand_dirs(filenames: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::new();
    for filename in filenames {
        if !filename.is_dir() {
            expanded.push(filename);
            continue;
        }

        // INVARIANT: Walk every file, hidden or ignored, and skip directories.
        let walker = WalkBuilder::new(&filename)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();
        for dirent in walker {
            let dirent = dirent?;
            if dirent.depth() == 0 || dirent.path().is_dir() {
                continue;
            }
            expanded.push(dirent.into_path());
        }
    }

    Ok(expanded)
}

/// Non-fatal condition noticed during resolution.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Diagnostic {
    /// Glob expansion was deferred to the entries of a list file.
    GlobSkipped { value: String },

    /// Recursive expansion was deferred to the entries of a list file.
    RecurseSkipped { value: String },
}

impl Display for Diagnostic {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::GlobSkipped { value } => {
                write!(fmt, "`g` skipped on {value:?} since it's redirected by `@`")
            }
            Self::RecurseSkipped { value } => {
                write!(fmt, "`r` skipped on {value:?} since it's redirected by `@`")
            }
        }
    }
}

/// Sink for resolution diagnostics.
pub trait Diagnostics {
    /// Report a diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forward diagnostics to [`tracing`] at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        info!("{diagnostic}");
    }
}

impl Diagnostics for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Entry resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Glob pattern is invalid.
    #[error("invalid glob pattern {pattern:?}")]
    Pattern {
        #[source]
        source: glob::PatternError,
        pattern: String,
    },

    /// Glob matching cannot read a path.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),

    /// Recursive directory walk fails.
    #[error(transparent)]
    Walk(#[from] ignore::Error),

    /// List file of redirecting entry cannot be read.
    #[error("failed to read list file at {:?}", path.display())]
    ReadList {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Redirecting entry does not resolve to exactly one list file.
    #[error("redirecting entry {value:?} resolved to {count} list files instead of one")]
    RedirectArity { value: String, count: usize },
}

/// Friendly result alias :3
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
