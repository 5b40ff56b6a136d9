// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Specification file layout.
//!
//! A __specification__ lists the targets that should be newer and the
//! dependencies that should be older:
//!
//! ```json
//! {
//!     "defaults": "u",
//!     "targets": ["~/build/out.bin"],
//!     "dependencies": [
//!         "~/src/main.c",
//!         ["g", "~/src/*.h"],
//!         ["@", "~/src/extra-deps.txt"]
//!     ]
//! }
//! ```
//!
//! Each list entry is either a bare string that takes the default attributes,
//! or an `[attrs, value]` pair whose attributes are joined with the defaults.
//! The same layout can be written as TOML for files with a `.toml` extension.

use crate::attrs::Attrs;

use serde::Deserialize;
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Specification layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct Specification {
    /// Attributes applied to every entry in both lists.
    #[serde(default)]
    pub defaults: Attrs,

    /// Files that should be newer.
    pub targets: Vec<RawEntry>,

    /// Files that should be older.
    #[serde(default)]
    pub dependencies: Vec<RawEntry>,
}

impl Specification {
    /// Load specification from file.
    ///
    /// Files with a `.toml` extension are parsed as TOML. Everything else is
    /// parsed as JSON.
    ///
    /// # Errors
    ///
    /// - Return [`SpecError::Read`] if file cannot be read.
    /// - Return [`SpecError::Json`] or [`SpecError::Toml`] if file does not
    ///   have the expected layout.
    /// - Return [`SpecError::EmptyTargets`] if no targets were listed.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("load specification {:?}", path.display());
        let data = read_to_string(path).map_err(|err| SpecError::Read {
            source: err,
            path: path.to_path_buf(),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&data),
            _ => Self::from_json(&data),
        }
    }

    /// Parse specification from JSON text.
    ///
    /// # Errors
    ///
    /// - Return [`SpecError::Json`] if layout is invalid.
    /// - Return [`SpecError::EmptyTargets`] if no targets were listed.
    pub fn from_json(data: &str) -> Result<Self> {
        let spec: Specification = serde_json::from_str(data)?;
        spec.validate()?;

        Ok(spec)
    }

    /// Parse specification from TOML text.
    ///
    /// # Errors
    ///
    /// - Return [`SpecError::Toml`] if layout is invalid.
    /// - Return [`SpecError::EmptyTargets`] if no targets were listed.
    pub fn from_toml(data: &str) -> Result<Self> {
        let spec: Specification = toml::de::from_str(data)?;
        spec.validate()?;

        Ok(spec)
    }

    /// Check invariants that the layout alone cannot express.
    ///
    /// # Errors
    ///
    /// - Return [`SpecError::EmptyTargets`] if no targets were listed.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(SpecError::EmptyTargets);
        }

        Ok(())
    }
}

impl FromStr for Specification {
    type Err = SpecError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Self::from_json(data)
    }
}

/// Raw list entry as written in a specification.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEntry {
    /// Value that takes the default attributes.
    Bare(String),

    /// Attributes and value pair.
    Tagged(Attrs, String),
}

impl RawEntry {
    pub fn bare(value: impl Into<String>) -> Self {
        Self::Bare(value.into())
    }

    pub fn tagged(attrs: impl Into<Attrs>, value: impl Into<String>) -> Self {
        Self::Tagged(attrs.into(), value.into())
    }
}

/// Specification error types.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// Specification file cannot be read.
    #[error("failed to read specification at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Specification is not valid JSON of the expected layout.
    #[error("malformed specification: {0}")]
    Json(#[from] serde_json::Error),

    /// Specification is not valid TOML of the expected layout.
    #[error("malformed specification: {0}")]
    Toml(#[from] toml::de::Error),

    /// Specification lists no targets.
    #[error("targets must contain at least one entry")]
    EmptyTargets,
}

/// Friendly result alias :3
type Result<T, E = SpecError> = std::result::Result<T, E>;
