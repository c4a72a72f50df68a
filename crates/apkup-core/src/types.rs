//! Common types for edits, tracks and release results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PublishError, Result};

/// Identifies the package every call of an edit is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditParams {
    /// Package name (e.g., "com.example.app")
    pub package_name: String,
}

impl EditParams {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
        }
    }

    /// Reject an empty package name
    pub fn validate(&self) -> Result<()> {
        if self.package_name.trim().is_empty() {
            return Err(PublishError::validation("Missing required parameter packageName"));
        }
        Ok(())
    }
}

/// One open remote edit.
///
/// Handles are only produced by [`crate::edit::EditSession::open`] and are
/// consumed by [`crate::edit::EditSession::commit`].
#[derive(Debug, PartialEq, Eq)]
pub struct EditHandle {
    pub(crate) id: String,
    pub(crate) package_name: String,
}

impl EditHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }
}

/// Edit resource as returned by insert and commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEdit {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time_seconds: Option<String>,
}

/// Release track name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TrackName {
    Internal,
    Alpha,
    Beta,
    Production,
    /// Custom closed-testing track, validated only by the remote side
    Custom(String),
}

impl TrackName {
    pub fn as_str(&self) -> &str {
        match self {
            TrackName::Internal => "internal",
            TrackName::Alpha => "alpha",
            TrackName::Beta => "beta",
            TrackName::Production => "production",
            TrackName::Custom(name) => name,
        }
    }
}

impl fmt::Display for TrackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackName {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        match name {
            "" => Err(PublishError::validation("Track name must not be empty")),
            "internal" => Ok(TrackName::Internal),
            "alpha" => Ok(TrackName::Alpha),
            "beta" => Ok(TrackName::Beta),
            "production" => Ok(TrackName::Production),
            other => Ok(TrackName::Custom(other.to_string())),
        }
    }
}

impl TryFrom<String> for TrackName {
    type Error = PublishError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TrackName> for String {
    fn from(track: TrackName) -> Self {
        track.as_str().to_string()
    }
}

/// Localized release notes for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNote {
    /// BCP-47 language tag, passed through unvalidated
    pub language: String,
    pub text: String,
}

impl ReleaseNote {
    pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            text: text.into(),
        }
    }
}

/// Status of a release on a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseStatus {
    Completed,
    InProgress,
    Draft,
    Halted,
}

/// A release within a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRelease {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub version_codes: Vec<String>,

    pub status: ReleaseStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fraction: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release_notes: Vec<ReleaseNote>,
}

impl TrackRelease {
    /// Release of a single version code.
    ///
    /// A rollout below 1.0 is staged (`inProgress` with `userFraction`);
    /// no rollout or a full rollout completes the release.
    pub fn for_version(
        version_code: i64,
        rollout: Option<f64>,
        release_notes: Vec<ReleaseNote>,
    ) -> Self {
        let (status, user_fraction) = match rollout {
            Some(fraction) if fraction < 1.0 => (ReleaseStatus::InProgress, Some(fraction)),
            _ => (ReleaseStatus::Completed, None),
        };

        Self {
            name: None,
            version_codes: vec![version_code.to_string()],
            status,
            user_fraction,
            release_notes,
        }
    }
}

/// Track resource, used both as the update body and the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track: String,

    #[serde(default)]
    pub releases: Vec<TrackRelease>,
}

/// Check a rollout fraction lies in `(0, 1]`
pub fn validate_rollout(fraction: f64) -> Result<f64> {
    if fraction > 0.0 && fraction <= 1.0 {
        Ok(fraction)
    } else {
        Err(PublishError::Validation(format!(
            "Rollout fraction must be in (0, 1], got {}",
            fraction
        )))
    }
}

/// Checksums of an uploaded binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Response of an APK upload into an edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApkResponse {
    pub version_code: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinaryInfo>,
}

/// Response of a bundle upload into an edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResponse {
    pub version_code: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Expansion file slot of an APK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionFileType {
    Main,
    Patch,
}

impl ExpansionFileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpansionFileType::Main => "main",
            ExpansionFileType::Patch => "patch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_version: Option<i64>,
}

/// Response of an OBB upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionFileResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion_file: Option<ExpansionFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeobfuscationFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_type: Option<String>,
}

/// Response of a mapping file upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeobfuscationFileResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deobfuscation_file: Option<DeobfuscationFile>,
}

/// Internal sharing response for an APK; the SHA-1 sits under `binary`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedApk {
    pub download_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinaryInfo>,
}

/// Internal sharing response for a bundle; the SHA-1 is top-level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedBundle {
    pub download_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Result of an internal sharing upload.
///
/// Serialized untagged so each variant keeps the shape the remote side
/// returned for that artifact kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ShareResult {
    Apk(SharedApk),
    Bundle(SharedBundle),
}

impl ShareResult {
    pub fn download_url(&self) -> &str {
        match self {
            ShareResult::Apk(apk) => &apk.download_url,
            ShareResult::Bundle(bundle) => &bundle.download_url,
        }
    }

    pub fn certificate_fingerprint(&self) -> Option<&str> {
        match self {
            ShareResult::Apk(apk) => apk.certificate_fingerprint.as_deref(),
            ShareResult::Bundle(bundle) => bundle.certificate_fingerprint.as_deref(),
        }
    }

    /// SHA-1 read from wherever the artifact kind reports it
    pub fn sha1(&self) -> Option<&str> {
        match self {
            ShareResult::Apk(apk) => apk.binary.as_ref().and_then(|b| b.sha1.as_deref()),
            ShareResult::Bundle(bundle) => bundle.sha1.as_deref(),
        }
    }
}

/// Result of an upload mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub version_code: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinaryInfo>,

    /// Track assignment response
    #[serde(flatten)]
    pub track: Track,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expansion_files: Vec<ExpansionFileResponse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deobfuscation_file: Option<DeobfuscationFileResponse>,
}

/// Result of a promote mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteResult {
    pub version_code: i64,

    #[serde(flatten)]
    pub track: Track,
}

/// Result of a committed edit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditResponse<T> {
    /// The committed edit
    pub edit: AppEdit,

    #[serde(flatten)]
    pub result: T,
}
