// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Specification entries.

use crate::{attrs::Attrs, config::RawEntry};

/// Value paired with its effective attributes.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SpecEntry {
    pub value: String,
    pub attrs: Attrs,
}

impl SpecEntry {
    /// Construct new specification entry.
    pub fn new(value: impl Into<String>, attrs: impl Into<Attrs>) -> Self {
        Self {
            value: value.into(),
            attrs: attrs.into(),
        }
    }
}

/// Normalize raw list entries into specification entries.
///
/// Bare values take the default attributes. Tagged values take the union of
/// their own attributes and the default attributes. Input order is kept.
pub fn normalize(list: &[RawEntry], defaults: Attrs) -> impl Iterator<Item = SpecEntry> + '_ {
    list.iter().map(move |raw| match raw {
        RawEntry::Bare(value) => SpecEntry::new(value.as_str(), defaults),
        RawEntry::Tagged(attrs, value) => SpecEntry::new(value.as_str(), *attrs | defaults),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_joins_defaults() {
        let list = vec![
            RawEntry::bare("a"),
            RawEntry::tagged("g", "*.c"),
            RawEntry::tagged("u", "~/b"),
        ];

        let result = normalize(&list, Attrs::from("v")).collect::<Vec<_>>();
        let expect = vec![
            SpecEntry::new("a", "v"),
            SpecEntry::new("*.c", "gv"),
            SpecEntry::new("~/b", "uv"),
        ];

        assert_eq!(result, expect);
    }

    #[test]
    fn normalize_empty_list() {
        let list: Vec<RawEntry> = Vec::new();
        assert_eq!(normalize(&list, Attrs::empty()).count(), 0);
    }
}
