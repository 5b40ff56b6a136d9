// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Build staleness check.
//!
//! Decide whether a set of __targets__ needs rebuilding because some
//! __dependency__ was modified after the oldest target. Targets and
//! dependencies are written as entries of a small specification language,
//! where each entry carries attributes that expand it into file paths through
//! home directory and environment variable expansion, globbing, recursive
//! directory walks, and redirection through list files.
//!
//! # See Also
//!
//! 1. [`config::Specification`]
//! 2. [`attrs::Attrs`]
//! 3. [`resolve::resolve`]
//! 4. [`evaluate::check`]

pub mod attrs;
pub mod config;
pub mod entry;
pub mod evaluate;
pub mod path;
pub mod resolve;
