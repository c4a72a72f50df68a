//! Recording stub of the publisher API for unit tests

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::client::PublisherClient;
use crate::error::{PublishError, Result};
use crate::types::*;

/// A remote call observed by the stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    InsertEdit(String),
    CommitEdit(String),
    DeleteEdit(String),
    UploadApk(String),
    UploadBundle(String),
    UploadExpansionFile(i64, ExpansionFileType),
    UploadDeobfuscationFile(i64),
    AssignTrack(String),
    ShareApk(String),
    ShareBundle(String),
}

pub(crate) struct StubClient {
    calls: Mutex<Vec<Call>>,
    next_edit: AtomicUsize,
    version_code: i64,
    sha1: String,
    failures: HashMap<&'static str, String>,
}

impl StubClient {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_edit: AtomicUsize::new(1),
            version_code: 42,
            sha1: "abc123".to_string(),
            failures: HashMap::new(),
        }
    }

    pub(crate) fn with_version_code(mut self, version_code: i64) -> Self {
        self.version_code = version_code;
        self
    }

    /// Make the named operation fail with a remote error
    pub(crate) fn failing(mut self, operation: &'static str, message: &str) -> Self {
        self.failures.insert(operation, message.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.get(operation) {
            Some(message) => Err(PublishError::Remote {
                status: 400,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl PublisherClient for StubClient {
    async fn insert_edit(&self, package_name: &str) -> Result<AppEdit> {
        self.record("insert_edit", Call::InsertEdit(package_name.to_string()))?;
        let n = self.next_edit.fetch_add(1, Ordering::SeqCst);
        Ok(AppEdit {
            id: format!("edit-{}", n),
            expiry_time_seconds: Some("1700000000".to_string()),
        })
    }

    async fn commit_edit(&self, edit: &EditHandle) -> Result<AppEdit> {
        self.record("commit_edit", Call::CommitEdit(edit.id().to_string()))?;
        Ok(AppEdit {
            id: edit.id().to_string(),
            expiry_time_seconds: None,
        })
    }

    async fn delete_edit(&self, edit: &EditHandle) -> Result<()> {
        self.record("delete_edit", Call::DeleteEdit(edit.id().to_string()))
    }

    async fn upload_apk(&self, edit: &EditHandle, _path: &Path) -> Result<ApkResponse> {
        self.record("upload_apk", Call::UploadApk(edit.id().to_string()))?;
        Ok(ApkResponse {
            version_code: self.version_code,
            binary: Some(BinaryInfo {
                sha1: Some(self.sha1.clone()),
                sha256: None,
            }),
        })
    }

    async fn upload_bundle(&self, edit: &EditHandle, _path: &Path) -> Result<BundleResponse> {
        self.record("upload_bundle", Call::UploadBundle(edit.id().to_string()))?;
        Ok(BundleResponse {
            version_code: self.version_code,
            sha1: Some(self.sha1.clone()),
            sha256: Some("def456".to_string()),
        })
    }

    async fn upload_expansion_file(
        &self,
        _edit: &EditHandle,
        version_code: i64,
        file_type: ExpansionFileType,
        _path: &Path,
    ) -> Result<ExpansionFileResponse> {
        self.record(
            "upload_expansion_file",
            Call::UploadExpansionFile(version_code, file_type),
        )?;
        Ok(ExpansionFileResponse {
            expansion_file: Some(ExpansionFile {
                file_size: Some("7".to_string()),
                references_version: None,
            }),
        })
    }

    async fn upload_deobfuscation_file(
        &self,
        _edit: &EditHandle,
        version_code: i64,
        _path: &Path,
    ) -> Result<DeobfuscationFileResponse> {
        self.record(
            "upload_deobfuscation_file",
            Call::UploadDeobfuscationFile(version_code),
        )?;
        Ok(DeobfuscationFileResponse {
            deobfuscation_file: Some(DeobfuscationFile {
                symbol_type: Some("proguard".to_string()),
            }),
        })
    }

    async fn assign_track(&self, _edit: &EditHandle, track: &Track) -> Result<Track> {
        self.record("assign_track", Call::AssignTrack(track.track.clone()))?;
        Ok(track.clone())
    }

    async fn share_apk(&self, package_name: &str, _path: &Path) -> Result<SharedApk> {
        self.record("share_apk", Call::ShareApk(package_name.to_string()))?;
        Ok(SharedApk {
            download_url: "https://play.google.com/apps/test/apk".to_string(),
            certificate_fingerprint: Some("AA:BB".to_string()),
            binary: Some(BinaryInfo {
                sha1: Some(self.sha1.clone()),
                sha256: None,
            }),
        })
    }

    async fn share_bundle(&self, package_name: &str, _path: &Path) -> Result<SharedBundle> {
        self.record("share_bundle", Call::ShareBundle(package_name.to_string()))?;
        Ok(SharedBundle {
            download_url: "https://play.google.com/apps/test/bundle".to_string(),
            certificate_fingerprint: Some("AA:BB".to_string()),
            sha1: Some(self.sha1.clone()),
            sha256: None,
        })
    }
}
