//! Upload a new release into an edit

use std::path::PathBuf;
use tracing::info;

use super::EditMutation;
use crate::client::PublisherClient;
use crate::error::{PublishError, Result};
use crate::files::{ArtifactKind, ResolvedFiles};
use crate::types::*;

/// Parameters of an upload
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Primary APK or AAB plus optional OBB and mapping sidecars
    pub files: Vec<PathBuf>,
    pub track: TrackName,
    pub release_notes: Vec<ReleaseNote>,
    /// Staged rollout fraction in `(0, 1]`
    pub rollout: Option<f64>,
}

impl UploadParams {
    pub fn new(files: Vec<PathBuf>, track: TrackName) -> Self {
        Self {
            files,
            track,
            release_notes: Vec::new(),
            rollout: None,
        }
    }
}

/// Upload with its files verified on disk
#[derive(Debug, Clone)]
pub struct UploadMutation {
    files: ResolvedFiles,
    track: TrackName,
    release_notes: Vec<ReleaseNote>,
    rollout: Option<f64>,
}

impl UploadMutation {
    /// Validate the parameters and resolve every file
    pub async fn prepare(params: UploadParams) -> Result<Self> {
        let rollout = params.rollout.map(validate_rollout).transpose()?;
        let files = ResolvedFiles::resolve(&params.files).await?;

        Ok(Self {
            files,
            track: params.track,
            release_notes: params.release_notes,
            rollout,
        })
    }

    pub fn primary_kind(&self) -> ArtifactKind {
        self.files.primary.kind
    }

    async fn upload_primary(
        &self,
        client: &dyn PublisherClient,
        edit: &EditHandle,
    ) -> Result<(i64, Option<BinaryInfo>)> {
        let primary = &self.files.primary;
        info!(path = %primary.path.display(), kind = %primary.kind, "uploading release");

        match primary.kind {
            ArtifactKind::Apk => {
                let apk = client.upload_apk(edit, &primary.path).await?;
                Ok((apk.version_code, apk.binary))
            }
            ArtifactKind::Bundle => {
                let bundle = client.upload_bundle(edit, &primary.path).await?;
                let binary = BinaryInfo {
                    sha1: bundle.sha1,
                    sha256: bundle.sha256,
                };
                Ok((bundle.version_code, Some(binary)))
            }
            kind => Err(PublishError::Validation(format!(
                "An {} cannot be released on a track",
                kind
            ))),
        }
    }
}

#[async_trait::async_trait]
impl EditMutation for UploadMutation {
    type Output = UploadResult;

    fn name(&self) -> &'static str {
        "upload"
    }

    async fn apply(&self, client: &dyn PublisherClient, edit: &EditHandle) -> Result<UploadResult> {
        let (version_code, binary) = self.upload_primary(client, edit).await?;
        info!(
            version_code,
            sha1 = binary.as_ref().and_then(|b| b.sha1.as_deref()).unwrap_or("-"),
            "uploaded release"
        );

        // Sidecars must exist for the version code before it goes on a track
        let mut expansion_files = Vec::with_capacity(self.files.expansion_files.len());
        for (file_type, spec) in &self.files.expansion_files {
            info!(path = %spec.path.display(), file_type = file_type.as_str(), "uploading expansion file");
            let response = client
                .upload_expansion_file(edit, version_code, *file_type, &spec.path)
                .await?;
            expansion_files.push(response);
        }

        let deobfuscation_file = match &self.files.mapping {
            Some(spec) => {
                info!(path = %spec.path.display(), "uploading deobfuscation file");
                Some(
                    client
                        .upload_deobfuscation_file(edit, version_code, &spec.path)
                        .await?,
                )
            }
            None => None,
        };

        let request = Track {
            track: self.track.to_string(),
            releases: vec![TrackRelease::for_version(
                version_code,
                self.rollout,
                self.release_notes.clone(),
            )],
        };
        let track = client.assign_track(edit, &request).await?;
        info!(version_code, track = %track.track, "assigned release to track");

        Ok(UploadResult {
            version_code,
            binary,
            track,
            expansion_files,
            deobfuscation_file,
        })
    }
}
