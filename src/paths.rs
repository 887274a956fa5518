//! Candidate path generation for configuration discovery.
//!
//! Discovery is split in two so the precedence rules can be tested without
//! touching the filesystem:
//! - [`candidate_paths`] turns (start dir, home dir, file names) into the
//!   ordered list of places a file may live. Pure path manipulation.
//! - [`find_first`] walks that list with an injected existence predicate.

use crate::config::SourceKind;
use std::path::{Component, Path, PathBuf};

/// Conventional file names for one configuration role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchNames {
    /// Plain file names tried in each directory of the upward search, in order.
    pub project: &'static [&'static str],
    /// Hidden file name looked up directly in the home directory.
    pub home: &'static str,
}

/// Names for the main configuration file.
pub const MAIN_FILE_NAMES: SearchNames = SearchNames {
    project: &["belbio_conf.yaml", "belbio_conf.yml"],
    home: ".belbio_conf",
};

/// Names for the secrets file.
pub const SECRETS_FILE_NAMES: SearchNames = SearchNames {
    project: &["belbio_secrets.yaml", "belbio_secrets.yml"],
    home: ".belbio_secrets",
};

/// A place a configuration file may be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Build the ordered candidate list for one role.
///
/// Every directory from `start_dir` up to the filesystem root contributes one
/// candidate per name in `names.project`, nearest directory first. The home
/// dotfile comes last. No filesystem access happens here.
pub fn candidate_paths(
    start_dir: &Path,
    home_dir: Option<&Path>,
    names: &SearchNames,
) -> Vec<Candidate> {
    let start = normalize_path_components(start_dir);
    let mut candidates = Vec::new();

    for dir in start.ancestors() {
        if dir.as_os_str().is_empty() {
            continue;
        }
        for name in names.project {
            candidates.push(Candidate {
                path: dir.join(name),
                kind: SourceKind::Project,
            });
        }
    }

    if let Some(home) = home_dir {
        candidates.push(Candidate {
            path: normalize_path_components(home).join(names.home),
            kind: SourceKind::Home,
        });
    }

    candidates
}

/// Return the first candidate for which `exists` holds.
pub fn find_first<F>(candidates: &[Candidate], exists: F) -> Option<&Candidate>
where
    F: Fn(&Path) -> bool,
{
    candidates.iter().find(|c| exists(&c.path))
}

/// Make `path` absolute against `cwd` and normalize it.
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path_components(path)
    } else {
        normalize_path_components(&cwd.join(path))
    }
}

/// Normalize path components without requiring the file to exist.
/// Handles `.` and `..` components.
pub fn normalize_path_components(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => {
                // Windows drive prefix (e.g., C:)
                components.push(Component::Prefix(p));
            }
            Component::RootDir => {
                components.push(Component::RootDir);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                } else if !matches!(components.last(), Some(Component::RootDir)) {
                    // `..` above a relative start is kept; above root it is dropped
                    components.push(Component::ParentDir);
                }
            }
            Component::Normal(name) => {
                components.push(Component::Normal(name));
            }
        }
    }

    components.iter().collect()
}
