// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Entry attributes.
//!
//! Every entry in a specification carries a set of single character
//! __attributes__ that decide how its value gets turned into file paths:
//!
//! | Flag | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | `u`  | Expand a leading `~` into the user's home directory.     |
//! | `v`  | Expand `$NAME` and `${NAME}` environment variables.      |
//! | `g`  | Treat the value as a glob pattern.                       |
//! | `r`  | Walk directories recursively and list every file inside. |
//! | `@`  | Treat the value as a list file of further entries.       |
//!
//! Attributes are written as plain strings in the specification file, e.g.,
//! `"ug"` or `"@r"`. Order and duplication do not matter. Any character that is
//! not a known flag is ignored.

use serde::Deserialize;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::BitOr,
};

/// Set of entry attributes.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash, Deserialize)]
#[serde(from = "String")]
pub struct Attrs(u8);

impl Attrs {
    /// Expand leading home directory marker.
    pub const HOME: Self = Self(1 << 0);

    /// Expand environment variable references.
    pub const VARS: Self = Self(1 << 1);

    /// Expand value as glob pattern.
    pub const GLOB: Self = Self(1 << 2);

    /// Expand directories recursively.
    pub const RECURSE: Self = Self(1 << 3);

    /// Redirect through list file.
    pub const REDIRECT: Self = Self(1 << 4);

    const FLAGS: [(char, Self); 5] = [
        ('u', Self::HOME),
        ('v', Self::VARS),
        ('g', Self::GLOB),
        ('r', Self::RECURSE),
        ('@', Self::REDIRECT),
    ];

    /// Construct empty attribute set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if all flags of `other` are set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Remove all flags of `other`.
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Check if glob expansion applies to the entry itself.
    ///
    /// Redirection wins over glob expansion. The glob flag is handed down to
    /// the entries read from the list file instead.
    pub const fn globs(self) -> bool {
        self.contains(Self::GLOB) && !self.contains(Self::REDIRECT)
    }

    /// Check if recursive expansion applies to the entry itself.
    ///
    /// Same deferral rule as [`Attrs::globs`].
    pub const fn recurses(self) -> bool {
        self.contains(Self::RECURSE) && !self.contains(Self::REDIRECT)
    }
}

impl From<&str> for Attrs {
    fn from(flags: &str) -> Self {
        flags.chars().fold(Self::empty(), |attrs, flag| {
            Self::FLAGS
                .iter()
                .find(|(known, _)| *known == flag)
                .map_or(attrs, |(_, bit)| attrs | *bit)
        })
    }
}

impl From<String> for Attrs {
    fn from(flags: String) -> Self {
        Self::from(flags.as_str())
    }
}

impl BitOr for Attrs {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl Display for Attrs {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for (flag, bit) in Self::FLAGS {
            if self.contains(bit) {
                write!(fmt, "{flag}")?;
            }
        }

        Ok(())
    }
}
