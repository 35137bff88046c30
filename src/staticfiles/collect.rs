// Copies static assets from the source directories into STATIC_ROOT

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOptions {
    /// Ask before overwriting a non-empty destination
    pub interactive: bool,
    /// Empty the destination before copying
    pub clear: bool,
}

impl CollectOptions {
    /// `--noinput`: never read stdin
    pub fn noinput() -> Self {
        Self { interactive: false, clear: false }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CollectReport {
    pub copied: usize,
    pub unmodified: usize,
    /// Paths already provided by an earlier source directory
    pub skipped: usize,
    pub cleared: usize,
}

impl CollectReport {
    pub fn summary(&self, root: &Path) -> String {
        let mut summary = format!(
            "{} static file{} copied to '{}'",
            self.copied,
            if self.copied == 1 { "" } else { "s" },
            root.display()
        );
        if self.unmodified > 0 {
            summary.push_str(&format!(", {} unmodified", self.unmodified));
        }
        summary.push('.');
        summary
    }
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Collecting static files cancelled.")]
    Cancelled,
    #[error("STATIC_ROOT '{root}' is inside the source directory '{source_dir}'")]
    RootInsideSource { root: PathBuf, source_dir: PathBuf },
    #[error("I/O error on '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> CollectError + '_ {
    move |source| CollectError::Io { path: path.to_path_buf(), source }
}

/// Collects every file under `sources` into `root`, keeping relative paths.
///
/// `confirm` is only consulted in interactive mode, when the destination already has files.
pub fn collect_static<F>(
    sources: &[PathBuf],
    root: &Path,
    options: CollectOptions,
    confirm: F,
) -> Result<CollectReport, CollectError>
where
    F: FnOnce(&str) -> io::Result<bool>,
{
    // A root under a source would be collected into itself on every run
    let resolved_root: PathBuf = resolve(root);
    for source in sources {
        if resolved_root.starts_with(resolve(source)) {
            return Err(CollectError::RootInsideSource {
                root: root.to_path_buf(),
                source_dir: source.to_path_buf(),
            });
        }
    }

    let mut report = CollectReport::default();

    if options.interactive && has_entries(root) {
        let action = if options.clear { "delete all existing files in" } else { "overwrite existing files in" };
        let question = format!(
            "This will {action} '{}'. Are you sure you want to do this? Type 'yes' to continue, or 'no' to cancel: ",
            root.display()
        );
        let accepted = confirm(&question).map_err(io_err(root))?;
        if !accepted {
            return Err(CollectError::Cancelled);
        }
    }

    if options.clear && root.exists() {
        report.cleared = clear_dir(root)?;
        info!("Deleted {} file(s) from '{}'", report.cleared, root.display());
    }

    fs::create_dir_all(root).map_err(io_err(root))?;

    let mut seen: HashSet<PathBuf> = HashSet::new();
    for source in sources {
        if !source.is_dir() {
            warn!("Static source directory '{}' does not exist, skipping", source.display());
            continue;
        }

        let mut files: Vec<PathBuf> = Vec::new();
        list_files(source, source, &mut files)?;

        for relative in files {
            if !seen.insert(relative.clone()) {
                debug!(
                    "'{}' from '{}' ignored, an earlier directory provides it",
                    relative.display(),
                    source.display()
                );
                report.skipped += 1;
                continue;
            }

            let from = source.join(&relative);
            let to = root.join(&relative);

            if is_up_to_date(&from, &to)? {
                report.unmodified += 1;
                continue;
            }

            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent).map_err(io_err(parent))?;
            }
            fs::copy(&from, &to).map_err(io_err(&from))?;
            debug!("Copied '{}'", relative.display());
            report.copied += 1;
        }
    }

    info!("{}", report.summary(root));
    Ok(report)
}

/// Reads a y/yes answer from stdin
pub fn confirm_on_stdin(question: &str) -> io::Result<bool> {
    use std::io::Write;

    let mut stdout = io::stdout();
    stdout.write_all(question.as_bytes())?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

// Relative paths of every regular file below `dir`, sorted for a stable copy order
fn list_files(base: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CollectError> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)
        .map_err(io_err(dir))?
        .collect::<Result<_, _>>()
        .map_err(io_err(dir))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_err(&path))?;

        if file_type.is_dir() {
            list_files(base, &path, out)?;
        } else if path.is_file() {
            if let Ok(relative) = path.strip_prefix(base) {
                out.push(relative.to_path_buf());
            }
        }
    }
    Ok(())
}

// Destination exists and was modified no earlier than the source
fn is_up_to_date(from: &Path, to: &Path) -> Result<bool, CollectError> {
    let target = match fs::metadata(to) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(io_err(to)(e)),
    };
    let source = fs::metadata(from).map_err(io_err(from))?;

    if target.len() != source.len() {
        return Ok(false);
    }

    match (source.modified(), target.modified()) {
        (Ok(src), Ok(dst)) => Ok(dst >= src),
        _ => Ok(false),
    }
}

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

// Empties `dir` without removing it, returns the number of files deleted
fn clear_dir(dir: &Path) -> Result<usize, CollectError> {
    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        if entry.file_type().map_err(io_err(&path))?.is_dir() {
            removed += clear_dir(&path)?;
            fs::remove_dir(&path).map_err(io_err(&path))?;
        } else {
            fs::remove_file(&path).map_err(io_err(&path))?;
            removed += 1;
        }
    }
    Ok(removed)
}

// Canonical form of `path`, which may not exist yet: the deepest existing ancestor is
// canonicalized and the missing components are appended
fn resolve(path: &Path) -> PathBuf {
    let absolute: PathBuf = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut missing: Vec<&OsStr> = Vec::new();
    let mut existing: &Path = &absolute;

    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing.iter().rev().fold(canonical, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn never_prompt(_: &str) -> io::Result<bool> {
        panic!("noinput must not prompt");
    }

    #[test]
    fn copies_nested_files_and_preserves_paths() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("static");
        let root = tmp.path().join("staticfiles");
        write(&source.join("css/app.css"), "body {}");
        write(&source.join("js/app.js"), "console.log(1)");

        let report = collect_static(&[source], &root, CollectOptions::noinput(), never_prompt).unwrap();

        assert_eq!(report.copied, 2);
        assert_eq!(fs::read_to_string(root.join("css/app.css")).unwrap(), "body {}");
        assert!(root.join("js/app.js").is_file());
    }

    #[test]
    fn second_run_leaves_everything_unmodified() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("static");
        let root = tmp.path().join("staticfiles");
        write(&source.join("logo.svg"), "<svg/>");

        collect_static(&[source.clone()], &root, CollectOptions::noinput(), never_prompt).unwrap();
        let again = collect_static(&[source], &root, CollectOptions::noinput(), never_prompt).unwrap();

        assert_eq!(again.copied, 0);
        assert_eq!(again.unmodified, 1);
        assert_eq!(again.summary(&root), format!("0 static files copied to '{}', 1 unmodified.", root.display()));
    }

    #[test]
    fn first_source_wins_on_duplicates() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("a");
        let second = tmp.path().join("b");
        let root = tmp.path().join("out");
        write(&first.join("site.css"), "first");
        write(&second.join("site.css"), "second!");

        let report = collect_static(&[first, second], &root, CollectOptions::noinput(), never_prompt).unwrap();

        assert_eq!(report.copied, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(fs::read_to_string(root.join("site.css")).unwrap(), "first");
    }

    #[test]
    fn missing_source_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("out");

        let report = collect_static(&[tmp.path().join("nope")], &root, CollectOptions::noinput(), never_prompt).unwrap();

        assert_eq!(report, CollectReport::default());
        assert!(root.is_dir());
    }

    #[test]
    fn clear_removes_stale_files() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("static");
        let root = tmp.path().join("out");
        write(&source.join("new.css"), "new");
        write(&root.join("old/stale.css"), "old");

        let options = CollectOptions { interactive: false, clear: true };
        let report = collect_static(&[source], &root, options, never_prompt).unwrap();

        assert_eq!(report.cleared, 1);
        assert!(!root.join("old").exists());
        assert!(root.join("new.css").is_file());
    }

    #[test]
    fn interactive_refusal_cancels_without_copying() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("static");
        let root = tmp.path().join("out");
        write(&source.join("a.css"), "a");
        write(&root.join("existing.css"), "x");

        let options = CollectOptions { interactive: true, clear: false };
        let err = collect_static(&[source], &root, options, |_| Ok(false)).unwrap_err();

        assert!(matches!(err, CollectError::Cancelled));
        assert!(!root.join("a.css").exists());
    }

    #[test]
    fn interactive_run_on_empty_root_does_not_ask() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("static");
        write(&source.join("a.css"), "a");

        let options = CollectOptions { interactive: true, clear: false };
        let report = collect_static(&[source], &tmp.path().join("out"), options, never_prompt).unwrap();
        assert_eq!(report.copied, 1);
    }

    #[test]
    fn root_inside_sources_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("static");
        fs::create_dir_all(&dir).unwrap();

        let err = collect_static(&[dir.clone()], &dir, CollectOptions::noinput(), never_prompt).unwrap_err();
        assert!(matches!(err, CollectError::RootInsideSource { .. }));
    }

    #[test]
    fn root_nested_in_a_source_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("static");
        write(&source.join("a.css"), "a");
        let root = source.join("collected");

        let err = collect_static(&[source.clone()], &root, CollectOptions::noinput(), never_prompt).unwrap_err();

        assert!(matches!(err, CollectError::RootInsideSource { .. }));
        assert!(!root.exists());

        // Still rejected once the nested root exists, even with a relative spelling
        fs::create_dir_all(&root).unwrap();
        let dotted = source.join(".").join("collected");
        let err = collect_static(&[source], &dotted, CollectOptions::noinput(), never_prompt).unwrap_err();
        assert!(matches!(err, CollectError::RootInsideSource { .. }));
    }

    #[test]
    fn sibling_root_with_a_shared_prefix_is_allowed() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("static");
        write(&source.join("a.css"), "a");
        let root = tmp.path().join("static_collected");

        let first = collect_static(&[source.clone()], &root, CollectOptions::noinput(), never_prompt).unwrap();
        let second = collect_static(&[source], &root, CollectOptions::noinput(), never_prompt).unwrap();

        assert_eq!(first.copied, 1);
        assert_eq!((second.copied, second.unmodified), (0, 1));
    }
}
