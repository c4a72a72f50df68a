//! Internal app sharing
//!
//! Shared artifacts are not versioned releases, so no edit is opened.

use std::path::PathBuf;
use tracing::info;

use crate::client::PublisherClient;
use crate::error::{PublishError, Result};
use crate::files::{self, ArtifactKind, FileSpec};
use crate::types::{EditParams, ShareResult};

/// Parameters of a share
#[derive(Debug, Clone)]
pub struct ShareParams {
    /// APK or AAB to share
    pub file: PathBuf,
}

/// Share with its artifact verified on disk
#[derive(Debug, Clone)]
pub struct ShareMutation {
    artifact: FileSpec,
}

impl ShareMutation {
    /// Check the file is an APK or AAB and is readable
    pub async fn prepare(params: ShareParams) -> Result<Self> {
        match files::classify(&params.file) {
            Some(kind) if kind.is_primary() => {}
            _ => {
                return Err(PublishError::Validation(format!(
                    "{} must be either an APK or an AAB",
                    params.file.display()
                )))
            }
        }

        let artifact = files::resolve(&params.file).await?;
        Ok(Self { artifact })
    }

    pub fn kind(&self) -> ArtifactKind {
        self.artifact.kind
    }

    /// Upload the artifact to the kind-specific sharing endpoint
    pub async fn execute(
        &self,
        client: &dyn PublisherClient,
        params: &EditParams,
    ) -> Result<ShareResult> {
        params.validate()?;
        let path = &self.artifact.path;
        info!(package = %params.package_name, path = %path.display(), "sharing artifact");

        let result = match self.artifact.kind {
            ArtifactKind::Apk => ShareResult::Apk(client.share_apk(&params.package_name, path).await?),
            ArtifactKind::Bundle => {
                ShareResult::Bundle(client.share_bundle(&params.package_name, path).await?)
            }
            kind => {
                return Err(PublishError::Validation(format!(
                    "An {} cannot be shared",
                    kind
                )))
            }
        };

        info!(
            download_url = result.download_url(),
            sha1 = result.sha1().unwrap_or("-"),
            "shared artifact"
        );
        Ok(result)
    }
}
