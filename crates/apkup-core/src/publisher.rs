//! Publisher entry point
//!
//! ```ignore
//! use apkup_core::{Apkup, AuthParams, EditParams, TrackName, UploadParams};
//!
//! let apkup = Apkup::new(AuthParams::from_json_file("./key.json".as_ref())?)?;
//! let upload = apkup
//!     .upload(
//!         UploadParams::new(vec!["./app-release.aab".into()], TrackName::Beta),
//!         &EditParams::new("com.example.app"),
//!     )
//!     .await?;
//! ```

use std::sync::Arc;
use tracing::info;

use crate::auth::{AuthContext, AuthParams};
use crate::client::{PlayClient, PublisherClient};
use crate::config::PublisherConfig;
use crate::edit::EditSession;
use crate::error::Result;
use crate::mutations::*;
use crate::types::*;

/// Authenticated publishing context
pub struct Apkup {
    client: Arc<dyn PublisherClient>,
    config: PublisherConfig,
}

impl Apkup {
    /// Create a publisher against Google Play with default configuration
    pub fn new(auth: AuthParams) -> Result<Self> {
        Self::with_config(auth, PublisherConfig::default())
    }

    pub fn with_config(auth: AuthParams, config: PublisherConfig) -> Result<Self> {
        let auth = AuthContext::new(auth)?;
        info!(client_email = auth.client_email(), "authenticated publisher created");
        let client = PlayClient::new(auth, config.clone());
        Ok(Self::with_client(Arc::new(client), config))
    }

    /// Create a publisher over any client implementation
    pub fn with_client(client: Arc<dyn PublisherClient>, config: PublisherConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    fn session(&self, edit_params: &EditParams) -> Result<EditSession> {
        Ok(EditSession::new(self.client.clone(), edit_params)?.with_cleanup(self.config.cleanup))
    }

    /// Upload a release and assign it to a track
    pub async fn upload(
        &self,
        params: UploadParams,
        edit_params: &EditParams,
    ) -> Result<EditResponse<UploadResult>> {
        edit_params.validate()?;
        let mutation = UploadMutation::prepare(params).await?;
        self.session(edit_params)?.run(&mutation).await
    }

    /// Assign an existing version code to a track
    pub async fn promote(
        &self,
        params: PromoteParams,
        edit_params: &EditParams,
    ) -> Result<EditResponse<PromoteResult>> {
        edit_params.validate()?;
        let mutation = PromoteMutation::new(params)?;
        self.session(edit_params)?.run(&mutation).await
    }

    /// Share an artifact through internal app sharing
    pub async fn share(&self, params: ShareParams, edit_params: &EditParams) -> Result<ShareResult> {
        edit_params.validate()?;
        let mutation = ShareMutation::prepare(params).await?;
        mutation.execute(self.client.as_ref(), edit_params).await
    }

    /// Apply any supported mutation
    pub async fn apply(
        &self,
        mutation: Mutation,
        edit_params: &EditParams,
    ) -> Result<MutationResponse> {
        info!(mutation = mutation.name(), package = %edit_params.package_name, "applying mutation");
        match mutation {
            Mutation::Upload(params) => self
                .upload(params, edit_params)
                .await
                .map(MutationResponse::Upload),
            Mutation::Promote(params) => self
                .promote(params, edit_params)
                .await
                .map(MutationResponse::Promote),
            Mutation::Share(params) => self
                .share(params, edit_params)
                .await
                .map(MutationResponse::Share),
        }
    }
}
