//! Remote publisher client
//!
//! [`PublisherClient`] is the surface the edit core needs from the Android
//! Publisher API. [`PlayClient`] implements it over HTTP.

use reqwest::{Body, Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::debug;
use url::Url;

use crate::auth::AuthContext;
use crate::config::PublisherConfig;
use crate::error::{PublishError, Result};
use crate::types::*;

/// Remote operations used by edits and mutations
#[async_trait::async_trait]
pub trait PublisherClient: Send + Sync {
    /// Open a new edit for a package
    async fn insert_edit(&self, package_name: &str) -> Result<AppEdit>;

    /// Commit an open edit
    async fn commit_edit(&self, edit: &EditHandle) -> Result<AppEdit>;

    /// Discard an open edit
    async fn delete_edit(&self, edit: &EditHandle) -> Result<()>;

    /// Upload an APK into an edit
    async fn upload_apk(&self, edit: &EditHandle, path: &Path) -> Result<ApkResponse>;

    /// Upload an app bundle into an edit
    async fn upload_bundle(&self, edit: &EditHandle, path: &Path) -> Result<BundleResponse>;

    /// Attach an OBB to an uploaded version code
    async fn upload_expansion_file(
        &self,
        edit: &EditHandle,
        version_code: i64,
        file_type: ExpansionFileType,
        path: &Path,
    ) -> Result<ExpansionFileResponse>;

    /// Attach a deobfuscation mapping to an uploaded version code
    async fn upload_deobfuscation_file(
        &self,
        edit: &EditHandle,
        version_code: i64,
        path: &Path,
    ) -> Result<DeobfuscationFileResponse>;

    /// Replace the releases of a track
    async fn assign_track(&self, edit: &EditHandle, track: &Track) -> Result<Track>;

    /// Upload an APK for internal sharing (no edit involved)
    async fn share_apk(&self, package_name: &str, path: &Path) -> Result<SharedApk>;

    /// Upload an app bundle for internal sharing (no edit involved)
    async fn share_bundle(&self, package_name: &str, path: &Path) -> Result<SharedBundle>;
}

/// Google error envelope
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull the human-readable message out of an error response body
fn remote_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Append path segments to a base URL, percent-encoding each one
fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let invalid = || PublishError::validation(format!("Invalid endpoint base URL: {}", base));

    let mut url = Url::parse(base).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Streaming request body for a file, with its length
async fn media_body(path: &Path) -> Result<(Body, u64)> {
    let file = tokio::fs::File::open(path).await?;
    let length = file.metadata().await?.len();
    Ok((Body::wrap_stream(ReaderStream::new(file)), length))
}

/// Android Publisher API client
pub struct PlayClient {
    http: Client,
    auth: AuthContext,
    config: PublisherConfig,
}

impl PlayClient {
    pub fn new(auth: AuthContext, config: PublisherConfig) -> Self {
        Self {
            http: Client::new(),
            auth,
            config,
        }
    }

    fn edit_url(&self, edit: &EditHandle, resource: &[&str]) -> Result<Url> {
        let mut segments = vec!["applications", edit.package_name.as_str(), "edits", edit.id.as_str()];
        segments.extend_from_slice(resource);
        endpoint(&self.config.api_base_url, &segments)
    }

    fn edit_upload_url(&self, edit: &EditHandle, resource: &[&str]) -> Result<Url> {
        let mut segments = vec!["applications", edit.package_name.as_str(), "edits", edit.id.as_str()];
        segments.extend_from_slice(resource);
        endpoint(&self.config.upload_base_url, &segments)
    }

    fn sharing_url(&self, package_name: &str, artifact: &str) -> Result<Url> {
        endpoint(
            &self.config.upload_base_url,
            &["applications", "internalappsharing", package_name, "artifacts", artifact],
        )
    }

    async fn checked(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(PublishError::Remote {
            status: status.as_u16(),
            message: remote_message(&error_text),
        })
    }

    /// Make an authenticated JSON request
    async fn api_request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let token = self.auth.access_token(&self.http, &self.config.token_url).await?;

        debug!("Making {} request to {}", method, url);

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = Self::checked(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Stream a file as an octet-stream media payload
    async fn upload_media<T: DeserializeOwned>(&self, url: Url, path: &Path) -> Result<T> {
        let token = self.auth.access_token(&self.http, &self.config.token_url).await?;
        let (body, length) = media_body(path).await?;

        debug!(
            url = %url,
            path = %path.display(),
            bytes = length,
            "uploading media"
        );

        let response = self
            .http
            .post(url)
            .query(&[("uploadType", "media")])
            .bearer_auth(token)
            .header("Content-Type", "application/octet-stream")
            .header("Content-Length", length)
            .body(body)
            .send()
            .await?;

        let response = Self::checked(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl PublisherClient for PlayClient {
    async fn insert_edit(&self, package_name: &str) -> Result<AppEdit> {
        let url = endpoint(
            &self.config.api_base_url,
            &["applications", package_name, "edits"],
        )?;
        self.api_request(Method::POST, url, Some(serde_json::json!({})))
            .await
    }

    async fn commit_edit(&self, edit: &EditHandle) -> Result<AppEdit> {
        let commit = format!("{}:commit", edit.id);
        let url = endpoint(
            &self.config.api_base_url,
            &["applications", edit.package_name.as_str(), "edits", commit.as_str()],
        )?;
        self.api_request(Method::POST, url, None).await
    }

    async fn delete_edit(&self, edit: &EditHandle) -> Result<()> {
        let token = self.auth.access_token(&self.http, &self.config.token_url).await?;
        let url = self.edit_url(edit, &[])?;

        debug!("Making DELETE request to {}", url);
        let response = self.http.delete(url).bearer_auth(token).send().await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn upload_apk(&self, edit: &EditHandle, path: &Path) -> Result<ApkResponse> {
        let url = self.edit_upload_url(edit, &["apks"])?;
        self.upload_media(url, path).await
    }

    async fn upload_bundle(&self, edit: &EditHandle, path: &Path) -> Result<BundleResponse> {
        let url = self.edit_upload_url(edit, &["bundles"])?;
        self.upload_media(url, path).await
    }

    async fn upload_expansion_file(
        &self,
        edit: &EditHandle,
        version_code: i64,
        file_type: ExpansionFileType,
        path: &Path,
    ) -> Result<ExpansionFileResponse> {
        let version_code = version_code.to_string();
        let url = self.edit_upload_url(
            edit,
            &["apks", version_code.as_str(), "expansionFiles", file_type.as_str()],
        )?;
        self.upload_media(url, path).await
    }

    async fn upload_deobfuscation_file(
        &self,
        edit: &EditHandle,
        version_code: i64,
        path: &Path,
    ) -> Result<DeobfuscationFileResponse> {
        let version_code = version_code.to_string();
        let url = self.edit_upload_url(
            edit,
            &["apks", version_code.as_str(), "deobfuscationFiles", "proguard"],
        )?;
        self.upload_media(url, path).await
    }

    async fn assign_track(&self, edit: &EditHandle, track: &Track) -> Result<Track> {
        let url = self.edit_url(edit, &["tracks", track.track.as_str()])?;
        let body = serde_json::to_value(track)?;
        self.api_request(Method::PUT, url, Some(body)).await
    }

    async fn share_apk(&self, package_name: &str, path: &Path) -> Result<SharedApk> {
        let url = self.sharing_url(package_name, "apk")?;
        self.upload_media(url, path).await
    }

    async fn share_bundle(&self, package_name: &str, path: &Path) -> Result<SharedBundle> {
        let url = self.sharing_url(package_name, "bundle")?;
        self.upload_media(url, path).await
    }
}
