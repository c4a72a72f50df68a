//! Mutations applied through the publisher
//!
//! Upload and promote run inside an edit ([`EditMutation`]); share talks to
//! the internal sharing endpoints directly and never opens an edit.

mod promote;
mod share;
mod upload;

pub use promote::{PromoteMutation, PromoteParams};
pub use share::{ShareMutation, ShareParams};
pub use upload::{UploadMutation, UploadParams};

use serde::Serialize;

use crate::client::PublisherClient;
use crate::error::Result;
use crate::types::{EditHandle, EditResponse, PromoteResult, ShareResult, UploadResult};

/// A mutation scoped to an open edit
///
/// Implementations are constructed from already-validated input, so `apply`
/// only performs remote calls.
#[async_trait::async_trait]
pub trait EditMutation: Send + Sync {
    type Output: Send;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Perform the mutation's remote calls against `edit`
    async fn apply(&self, client: &dyn PublisherClient, edit: &EditHandle) -> Result<Self::Output>;
}

/// The set of supported mutations
#[derive(Debug, Clone)]
pub enum Mutation {
    Upload(UploadParams),
    Promote(PromoteParams),
    Share(ShareParams),
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Upload(_) => "upload",
            Mutation::Promote(_) => "promote",
            Mutation::Share(_) => "share",
        }
    }
}

/// Response of a [`Mutation`]
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MutationResponse {
    Upload(EditResponse<UploadResult>),
    Promote(EditResponse<PromoteResult>),
    Share(ShareResult),
}
