//! Writing and checking generated artifacts on disk
//!
//! Writes are atomic: content goes to a temp file in the target directory and
//! is renamed over the destination. Checks compare artifacts with what is on
//! disk and report a unified diff for every file that would change.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use similar::TextDiff;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::codegen::GeneratedArtifact;
use crate::error::{CodegenError, Result};

/// Kind of mismatch between an artifact and the file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftKind {
    Missing,
    Stale,
}

/// One artifact that does not match disk
#[derive(Debug, Clone)]
pub struct Drift {
    pub path: PathBuf,
    pub kind: DriftKind,
    /// Unified diff from the file on disk to the artifact
    pub diff: String,
}

/// Resolve an artifact path under `out_dir`
pub fn artifact_path(out_dir: &Path, artifact: &GeneratedArtifact) -> PathBuf {
    out_dir.join(artifact.path.trim_start_matches('/'))
}

/// Write every artifact under `out_dir`, returning the written paths
pub fn write_artifacts(out_dir: &Path, artifacts: &[GeneratedArtifact]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let target = artifact_path(out_dir, artifact);
        atomic_write(&target, &artifact.content)?;
        info!(path = %target.display(), "wrote artifact");
        written.push(target);
    }
    Ok(written)
}

/// Compare every artifact with the file under `out_dir`
pub fn check_artifacts(out_dir: &Path, artifacts: &[GeneratedArtifact]) -> Result<Vec<Drift>> {
    let mut drift = Vec::new();
    for artifact in artifacts {
        let target = artifact_path(out_dir, artifact);
        let (kind, existing) = match fs::read_to_string(&target) {
            Ok(existing) if existing == artifact.content => {
                debug!(path = %target.display(), "up to date");
                continue;
            }
            Ok(existing) => (DriftKind::Stale, existing),
            Err(e) if e.kind() == ErrorKind::NotFound => (DriftKind::Missing, String::new()),
            Err(e) => return Err(e.into()),
        };

        let diff = unified_diff(&artifact.path, &existing, &artifact.content);
        drift.push(Drift { path: target, kind, diff });
    }
    Ok(drift)
}

fn atomic_write(target: &Path, content: &str) -> Result<()> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(target).map_err(|e| CodegenError::Io(e.error))?;
    Ok(())
}

fn unified_diff(path: &str, old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut unified = diff.unified_diff();
    unified
        .context_radius(3)
        .header(&format!("a/{}", path), &format!("b/{}", path));
    unified.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(path: &str, content: &str) -> GeneratedArtifact {
        GeneratedArtifact {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_write_then_check_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = vec![artifact("util.ts", "a\n"), artifact("nested/lexicons.ts", "b\n")];

        let written = write_artifacts(dir.path(), &artifacts).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("nested/lexicons.ts")).unwrap(), "b\n");

        assert!(check_artifacts(dir.path(), &artifacts).unwrap().is_empty());
    }

    #[test]
    fn test_check_reports_missing_and_stale() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("util.ts"), "old line\n").unwrap();

        let artifacts = vec![artifact("util.ts", "new line\n"), artifact("lexicons.ts", "x\n")];
        let drift = check_artifacts(dir.path(), &artifacts).unwrap();

        assert_eq!(drift.len(), 2);
        assert_eq!(drift[0].kind, DriftKind::Stale);
        assert!(drift[0].diff.contains("-old line"));
        assert!(drift[0].diff.contains("+new line"));
        assert!(drift[0].diff.contains("a/util.ts"));
        assert_eq!(drift[1].kind, DriftKind::Missing);
        assert!(drift[1].diff.contains("+x"));
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &[artifact("/util.ts", "first\n")]).unwrap();
        write_artifacts(dir.path(), &[artifact("/util.ts", "second\n")]).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("util.ts")).unwrap(), "second\n");
    }
}
