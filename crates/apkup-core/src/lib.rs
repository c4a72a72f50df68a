//! Release automation for Google Play
//!
//! Every change to a package listing happens inside an *edit*: a remote
//! container that is opened, mutated and committed as one unit. This crate
//! owns that lifecycle and the mutations that plug into it.
//!
//! ## Mutations
//!
//! - **Upload**: push an APK or AAB (plus OBB and mapping sidecars) and
//!   assign the new version code to a track
//! - **Promote**: assign an existing version code to a track
//! - **Share**: internal app sharing; bypasses edits entirely
//!
//! ## Usage
//!
//! ```ignore
//! use apkup_core::{Apkup, AuthParams, EditParams, PromoteParams, TrackName};
//!
//! let apkup = Apkup::new(AuthParams::new(client_email, private_key))?;
//! apkup
//!     .promote(
//!         PromoteParams { track: TrackName::Production, version_code: 137, rollout: None },
//!         &EditParams::new("com.example.app"),
//!     )
//!     .await?;
//! ```
//!
//! A mutation that fails after its edit was opened leaves the edit open
//! remotely until it expires. Set [`CleanupPolicy::DeleteOnFailure`] to
//! delete it instead.

pub mod auth;
pub mod client;
pub mod config;
pub mod edit;
pub mod error;
pub mod files;
pub mod mutations;
pub mod publisher;
pub mod types;

#[cfg(test)]
mod testing;

pub use auth::{AuthContext, AuthParams};
pub use client::{PlayClient, PublisherClient};
pub use config::{CleanupPolicy, PublisherConfig};
pub use edit::{EditSession, EditState};
pub use error::{ErrorKind, PublishError, Result};
pub use files::{ArtifactKind, FileSpec};
pub use mutations::{
    EditMutation, Mutation, MutationResponse, PromoteMutation, PromoteParams, ShareMutation,
    ShareParams, UploadMutation, UploadParams,
};
pub use publisher::Apkup;
pub use types::*;
