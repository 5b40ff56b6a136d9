// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Specification evaluation.
//!
//! Resolve the target and dependency lists of a [`Specification`], and decide
//! whether the targets are stale. Targets are __stale__ when the newest
//! dependency was modified after the oldest target.

use crate::{
    attrs::Attrs,
    config::{RawEntry, SpecError, Specification},
    entry::normalize,
    resolve::{resolve, Diagnostics, ResolveError},
};

use std::{
    fs::metadata,
    io::Write,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, instrument};

/// Verdict of a staleness check.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Freshness {
    /// Every target is at least as new as every dependency.
    Fresh,

    /// Some dependency is newer than the oldest target.
    Stale,
}

/// Resolve list of raw entries into flat sequence of file paths.
///
/// # Errors
///
/// - Return [`EvaluateError::Resolve`] if any entry fails to resolve.
pub fn resolve_list(
    list: &[RawEntry],
    defaults: Attrs,
    diagnostics: &mut dyn Diagnostics,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in normalize(list, defaults) {
        paths.extend(resolve(&entry, diagnostics)?);
    }

    Ok(paths)
}

/// Oldest modification time of paths.
///
/// Returns `None` for no paths, which compares as later than any time.
///
/// # Errors
///
/// - Return [`EvaluateError::Stat`] if modification time of any path cannot
///   be read.
pub fn min_mtime(paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Result<Option<SystemTime>> {
    let mut oldest = None;
    for path in paths {
        let mtime = mtime(path.as_ref())?;
        oldest = Some(oldest.map_or(mtime, |oldest: SystemTime| oldest.min(mtime)));
    }

    Ok(oldest)
}

/// Newest modification time of paths.
///
/// Returns `None` for no paths, which compares as earlier than any time.
///
/// # Errors
///
/// - Return [`EvaluateError::Stat`] if modification time of any path cannot
///   be read.
pub fn max_mtime(paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Result<Option<SystemTime>> {
    let mut newest = None;
    for path in paths {
        let mtime = mtime(path.as_ref())?;
        newest = Some(newest.map_or(mtime, |newest: SystemTime| newest.max(mtime)));
    }

    Ok(newest)
}

fn mtime(path: &Path) -> Result<SystemTime> {
    metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|err| EvaluateError::Stat {
            source: err,
            path: path.to_path_buf(),
        })
}

/// Decide freshness from oldest target and newest dependency.
pub fn compare(oldest_target: Option<SystemTime>, newest_dependency: Option<SystemTime>) -> Freshness {
    match (oldest_target, newest_dependency) {
        (Some(target), Some(dependency)) if dependency > target => Freshness::Stale,
        _ => Freshness::Fresh,
    }
}

/// Check whether targets of specification are stale.
///
/// Without any dependencies the targets are fresh, and nothing is resolved.
///
/// # Errors
///
/// - Return [`EvaluateError::Spec`] if specification lists no targets.
/// - Return [`EvaluateError::Resolve`] if any entry fails to resolve.
/// - Return [`EvaluateError::Stat`] if modification time of any resolved path
///   cannot be read.
#[instrument(skip(spec, diagnostics), level = "debug")]
pub fn check(spec: &Specification, diagnostics: &mut dyn Diagnostics) -> Result<Freshness> {
    spec.validate()?;
    if spec.dependencies.is_empty() {
        debug!("no dependencies, targets are fresh");
        return Ok(Freshness::Fresh);
    }

    let targets = resolve_list(&spec.targets, spec.defaults, diagnostics)?;
    let oldest_target = min_mtime(&targets)?;
    let dependencies = resolve_list(&spec.dependencies, spec.defaults, diagnostics)?;
    let newest_dependency = max_mtime(&dependencies)?;
    debug!(
        "{} target(s), {} dependency(ies): oldest target {oldest_target:?}, newest dependency {newest_dependency:?}",
        targets.len(),
        dependencies.len(),
    );

    Ok(compare(oldest_target, newest_dependency))
}

/// List resolved files of specification without reading any timestamps.
///
/// Writes a labeled section for targets, then one for dependencies. Paths
/// are written as soon as their entry resolves, so a failing entry still
/// leaves everything before it in `out`.
///
/// # Errors
///
/// - Return [`EvaluateError::Spec`] if specification lists no targets.
/// - Return [`EvaluateError::Resolve`] if any entry fails to resolve.
/// - Return [`EvaluateError::Output`] if writing to `out` fails.
#[instrument(skip(spec, diagnostics, out), level = "debug")]
pub fn list_files(
    spec: &Specification,
    diagnostics: &mut dyn Diagnostics,
    mut out: impl Write,
) -> Result<()> {
    spec.validate()?;
    write_section(&mut out, "targets", &spec.targets, spec.defaults, diagnostics)?;
    writeln!(out)?;
    write_section(
        &mut out,
        "dependencies",
        &spec.dependencies,
        spec.defaults,
        diagnostics,
    )?;

    Ok(())
}

fn write_section(
    out: &mut impl Write,
    label: &str,
    list: &[RawEntry],
    defaults: Attrs,
    diagnostics: &mut dyn Diagnostics,
) -> Result<()> {
    writeln!(out, "=== {label} ===")?;
    for entry in normalize(list, defaults) {
        for path in resolve(&entry, diagnostics)? {
            writeln!(out, "{}", path.display())?;
        }
    }

    Ok(())
}

/// Evaluation error types.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    /// Specification is invalid.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Entry resolution fails.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Modification time of resolved path cannot be read.
    #[error("failed to read modification time of {:?}", path.display())]
    Stat {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Listing cannot be written.
    #[error("failed to write file listing")]
    Output(#[from] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = EvaluateError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Diagnostic;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::{
        fs::{write, File},
        time::Duration,
    };
    use tempfile::TempDir;

    fn touch(path: impl AsRef<Path>, secs: u64) -> anyhow::Result<()> {
        write(path.as_ref(), "")?;
        File::options()
            .write(true)
            .open(path.as_ref())?
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))?;

        Ok(())
    }

    fn spec(dir: &TempDir, targets: &[&str], dependencies: &[&str]) -> Specification {
        let join = |names: &[&str]| -> Vec<RawEntry> {
            names
                .iter()
                .map(|name| RawEntry::bare(dir.path().join(name).to_string_lossy()))
                .collect()
        };

        Specification {
            defaults: Attrs::empty(),
            targets: join(targets),
            dependencies: join(dependencies),
        }
    }

    #[test]
    fn stale_when_dependency_is_newer() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        touch(dir.path().join("out.bin"), 1_000)?;
        touch(dir.path().join("src.c"), 2_000)?;
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let result = check(&spec(&dir, &["out.bin"], &["src.c"]), &mut diagnostics)?;
        assert_eq!(result, Freshness::Stale);

        touch(dir.path().join("out.bin"), 3_000)?;
        let result = check(&spec(&dir, &["out.bin"], &["src.c"]), &mut diagnostics)?;
        assert_eq!(result, Freshness::Fresh);

        Ok(())
    }

    #[test]
    fn equal_times_are_fresh() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        touch(dir.path().join("out.bin"), 1_000)?;
        touch(dir.path().join("src.c"), 1_000)?;
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let result = check(&spec(&dir, &["out.bin"], &["src.c"]), &mut diagnostics)?;
        assert_eq!(result, Freshness::Fresh);

        Ok(())
    }

    #[test]
    fn oldest_target_against_newest_dependency() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        touch(dir.path().join("new.o"), 5_000)?;
        touch(dir.path().join("old.o"), 2_000)?;
        touch(dir.path().join("a.c"), 1_000)?;
        touch(dir.path().join("b.c"), 3_000)?;
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let result = check(
            &spec(&dir, &["new.o", "old.o"], &["a.c", "b.c"]),
            &mut diagnostics,
        )?;
        assert_eq!(result, Freshness::Stale);

        let result = check(&spec(&dir, &["new.o"], &["a.c", "b.c"]), &mut diagnostics)?;
        assert_eq!(result, Freshness::Fresh);

        Ok(())
    }

    #[test]
    fn no_dependencies_skips_resolution() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        // Missing targets are never stat'ed.
        let result = check(&spec(&dir, &["missing"], &[]), &mut diagnostics)?;
        assert_eq!(result, Freshness::Fresh);

        Ok(())
    }

    #[test]
    fn empty_targets_fail() {
        let spec = Specification::default();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let result = check(&spec, &mut diagnostics);
        assert!(matches!(
            result,
            Err(EvaluateError::Spec(SpecError::EmptyTargets))
        ));

        let result = list_files(&spec, &mut diagnostics, std::io::sink());
        assert!(matches!(
            result,
            Err(EvaluateError::Spec(SpecError::EmptyTargets))
        ));
    }

    #[test]
    fn missing_file_fails_stat() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        touch(dir.path().join("out.bin"), 1_000)?;
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let result = check(&spec(&dir, &["out.bin"], &["missing.c"]), &mut diagnostics);
        assert!(matches!(result, Err(EvaluateError::Stat { .. })));

        Ok(())
    }

    #[test]
    fn empty_glob_dependency_is_fresh() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        touch(dir.path().join("out.bin"), 1_000)?;
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let mut spec = spec(&dir, &["out.bin"], &[]);
        spec.dependencies = vec![RawEntry::tagged(
            "g",
            dir.path().join("*.c").to_string_lossy(),
        )];
        assert_eq!(check(&spec, &mut diagnostics)?, Freshness::Fresh);

        Ok(())
    }

    #[test]
    fn mtime_bounds_of_empty_lists() -> anyhow::Result<()> {
        let none: [&Path; 0] = [];
        assert_eq!(min_mtime(none)?, None);
        assert_eq!(max_mtime(none)?, None);
        assert_eq!(compare(None, Some(SystemTime::now())), Freshness::Fresh);
        assert_eq!(compare(Some(SystemTime::now()), None), Freshness::Fresh);

        Ok(())
    }

    #[test]
    fn list_files_keeps_order_and_duplicates() -> anyhow::Result<()> {
        let spec = Specification {
            defaults: Attrs::empty(),
            targets: vec![RawEntry::bare("a"), RawEntry::bare("b"), RawEntry::bare("a")],
            dependencies: vec![RawEntry::bare("c")],
        };
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let mut out = Vec::new();
        list_files(&spec, &mut diagnostics, &mut out)?;

        let expect = indoc! {"
            === targets ===
            a
            b
            a

            === dependencies ===
            c
        "};
        assert_eq!(String::from_utf8(out)?, expect);

        Ok(())
    }

    #[test]
    fn list_files_with_no_dependencies() -> anyhow::Result<()> {
        let spec = Specification {
            defaults: Attrs::empty(),
            targets: vec![RawEntry::bare("a"), RawEntry::bare("b")],
            dependencies: Vec::new(),
        };
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let mut out = Vec::new();
        list_files(&spec, &mut diagnostics, &mut out)?;
        assert_eq!(
            String::from_utf8(out)?,
            "=== targets ===\na\nb\n\n=== dependencies ===\n"
        );

        Ok(())
    }

    #[test]
    fn list_files_writes_targets_before_failing_dependency() -> anyhow::Result<()> {
        let spec = Specification {
            defaults: Attrs::empty(),
            targets: vec![RawEntry::bare("a")],
            dependencies: vec![RawEntry::bare("b"), RawEntry::tagged("@", "/no/such/list.txt")],
        };
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let mut out = Vec::new();
        let result = list_files(&spec, &mut diagnostics, &mut out);
        assert!(matches!(
            result,
            Err(EvaluateError::Resolve(ResolveError::ReadList { .. }))
        ));
        assert_eq!(
            String::from_utf8(out)?,
            "=== targets ===\na\n\n=== dependencies ===\nb\n"
        );

        Ok(())
    }
}
