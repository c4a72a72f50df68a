//! Promote an already uploaded version code to a track

use tracing::info;

use super::EditMutation;
use crate::client::PublisherClient;
use crate::error::{PublishError, Result};
use crate::types::*;

/// Parameters of a promotion
#[derive(Debug, Clone)]
pub struct PromoteParams {
    pub track: TrackName,
    pub version_code: i64,
    pub rollout: Option<f64>,
}

/// Validated promotion
#[derive(Debug, Clone)]
pub struct PromoteMutation {
    params: PromoteParams,
}

impl PromoteMutation {
    pub fn new(params: PromoteParams) -> Result<Self> {
        if params.version_code <= 0 {
            return Err(PublishError::Validation(format!(
                "versionCode must be a positive integer, got {}",
                params.version_code
            )));
        }
        if let Some(rollout) = params.rollout {
            validate_rollout(rollout)?;
        }

        Ok(Self { params })
    }
}

#[async_trait::async_trait]
impl EditMutation for PromoteMutation {
    type Output = PromoteResult;

    fn name(&self) -> &'static str {
        "promote"
    }

    async fn apply(&self, client: &dyn PublisherClient, edit: &EditHandle) -> Result<PromoteResult> {
        let request = Track {
            track: self.params.track.to_string(),
            releases: vec![TrackRelease::for_version(
                self.params.version_code,
                self.params.rollout,
                Vec::new(),
            )],
        };

        let track = client.assign_track(edit, &request).await?;
        info!(
            version_code = self.params.version_code,
            track = %track.track,
            "promoted release"
        );

        Ok(PromoteResult {
            version_code: self.params.version_code,
            track,
        })
    }
}
