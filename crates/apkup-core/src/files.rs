//! Artifact resolution
//!
//! Paths are classified purely by file name. Existence is checked with a
//! read attempt so permission problems surface before any remote call; the
//! content itself is never inspected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::{PublishError, Result};
use crate::types::ExpansionFileType;

/// Kind of artifact, inferred from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Android package
    Apk,
    /// Android App Bundle
    Bundle,
    /// APK expansion file
    Obb,
    /// Deobfuscation (ProGuard/R8) mapping file
    Mapping,
}

impl ArtifactKind {
    /// Whether this kind can be released on a track
    pub fn is_primary(&self) -> bool {
        matches!(self, ArtifactKind::Apk | ArtifactKind::Bundle)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Apk => write!(f, "APK"),
            ArtifactKind::Bundle => write!(f, "AAB"),
            ArtifactKind::Obb => write!(f, "OBB"),
            ArtifactKind::Mapping => write!(f, "mapping file"),
        }
    }
}

/// Classify a path by its extension.
///
/// Matching is case-sensitive: `app.APK` is not an APK.
pub fn classify(path: &Path) -> Option<ArtifactKind> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("apk") => Some(ArtifactKind::Apk),
        Some("aab") => Some(ArtifactKind::Bundle),
        Some("obb") => Some(ArtifactKind::Obb),
        Some("txt") => Some(ArtifactKind::Mapping),
        _ => {
            let name = path.file_name()?.to_str()?;
            name.contains("mapping").then_some(ArtifactKind::Mapping)
        }
    }
}

/// A verified artifact on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// Verify a path is readable and classify it
pub async fn resolve(path: &Path) -> Result<FileSpec> {
    let kind = classify(path).ok_or_else(|| {
        PublishError::Validation(format!(
            "Unrecognized file type for {}. Expected .apk, .aab, .obb or a mapping file",
            path.display()
        ))
    })?;

    verify_readable(path).await?;
    debug!(path = %path.display(), %kind, "resolved artifact");

    Ok(FileSpec {
        path: path.to_path_buf(),
        kind,
    })
}

async fn verify_readable(path: &Path) -> Result<()> {
    let failed = |e: std::io::Error| {
        PublishError::Validation(format!(
            "File verification failed. Does {} exist? ({})",
            path.display(),
            e
        ))
    };

    let mut file = tokio::fs::File::open(path).await.map_err(failed)?;
    let mut probe = [0u8; 1];
    file.read(&mut probe).await.map_err(failed)?;
    Ok(())
}

/// Split a comma-joined file list, dropping empty entries
pub fn split_file_list(list: &str) -> Vec<PathBuf> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Primary artifact plus the sidecars that travel with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFiles {
    pub primary: FileSpec,
    pub expansion_files: Vec<(ExpansionFileType, FileSpec)>,
    pub mapping: Option<FileSpec>,
}

impl ResolvedFiles {
    /// Resolve an ordered file list.
    ///
    /// Exactly one APK or AAB is required. The first OBB becomes the main
    /// expansion file and the second the patch; at most one mapping file.
    pub async fn resolve(paths: &[PathBuf]) -> Result<Self> {
        if paths.is_empty() {
            return Err(PublishError::validation("At least one file is required"));
        }

        let mut primary: Option<FileSpec> = None;
        let mut obbs = Vec::new();
        let mut mapping: Option<FileSpec> = None;

        for path in paths {
            let spec = resolve(path).await?;
            match spec.kind {
                ArtifactKind::Apk | ArtifactKind::Bundle => {
                    if let Some(existing) = &primary {
                        return Err(PublishError::Validation(format!(
                            "Only one APK or AAB can be uploaded per call, got {} and {}",
                            existing.path.display(),
                            spec.path.display()
                        )));
                    }
                    primary = Some(spec);
                }
                ArtifactKind::Obb => obbs.push(spec),
                ArtifactKind::Mapping => {
                    if mapping.is_some() {
                        return Err(PublishError::validation(
                            "Only one deobfuscation mapping file can be uploaded",
                        ));
                    }
                    mapping = Some(spec);
                }
            }
        }

        let primary = primary
            .ok_or_else(|| PublishError::validation("The files must include an APK or an AAB"))?;

        if obbs.len() > 2 {
            return Err(PublishError::Validation(format!(
                "At most two expansion files (main and patch) are allowed, got {}",
                obbs.len()
            )));
        }

        let expansion_files = [ExpansionFileType::Main, ExpansionFileType::Patch]
            .into_iter()
            .zip(obbs)
            .collect();

        Ok(Self {
            primary,
            expansion_files,
            mapping,
        })
    }
}
