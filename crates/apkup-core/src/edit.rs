//! Edit transaction lifecycle
//!
//! An [`EditSession`] groups the remote calls of one mutation into a single
//! edit: open, apply, commit. A session is single-use and bound to one
//! package.
//!
//! When a mutation fails after the edit was opened, the edit is left open
//! remotely until it expires, unless the session was configured with
//! [`CleanupPolicy::DeleteOnFailure`]. An edit abandoned between open and
//! commit (e.g., the future is dropped) is always left open.

use std::sync::Arc;
use tracing::{info, warn};

use crate::client::PublisherClient;
use crate::config::CleanupPolicy;
use crate::error::{PublishError, Result};
use crate::mutations::EditMutation;
use crate::types::{AppEdit, EditHandle, EditParams, EditResponse};

/// Lifecycle state of an edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Unopened,
    Open,
    Committed,
    Aborted,
}

/// Owns the lifecycle of one remote edit
pub struct EditSession {
    client: Arc<dyn PublisherClient>,
    package_name: String,
    cleanup: CleanupPolicy,
    state: EditState,
    open_edit: Option<String>,
}

impl EditSession {
    pub fn new(client: Arc<dyn PublisherClient>, params: &EditParams) -> Result<Self> {
        params.validate()?;

        Ok(Self {
            client,
            package_name: params.package_name.clone(),
            cleanup: CleanupPolicy::default(),
            state: EditState::Unopened,
            open_edit: None,
        })
    }

    pub fn with_cleanup(mut self, cleanup: CleanupPolicy) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Open the session's edit
    pub async fn open(&mut self) -> Result<EditHandle> {
        if self.state != EditState::Unopened {
            return Err(PublishError::Usage(format!(
                "cannot open an edit on a session in state {:?}",
                self.state
            )));
        }

        match self.client.insert_edit(&self.package_name).await {
            Ok(edit) => {
                info!(package = %self.package_name, edit_id = %edit.id, "edit opened");
                self.state = EditState::Open;
                self.open_edit = Some(edit.id.clone());
                Ok(EditHandle {
                    id: edit.id,
                    package_name: self.package_name.clone(),
                })
            }
            Err(e) => {
                self.state = EditState::Aborted;
                Err(e)
            }
        }
    }

    /// Commit the edit behind `handle`, consuming it
    pub async fn commit(&mut self, handle: EditHandle) -> Result<AppEdit> {
        self.check_handle(&handle)?;

        match self.client.commit_edit(&handle).await {
            Ok(edit) => {
                info!(package = %self.package_name, edit_id = %handle.id, "edit committed");
                self.state = EditState::Committed;
                self.open_edit = None;
                Ok(edit)
            }
            Err(e) => {
                warn!(
                    package = %self.package_name,
                    edit_id = %handle.id,
                    "commit rejected, edit left open until it expires"
                );
                self.state = EditState::Aborted;
                Err(e)
            }
        }
    }

    /// Open an edit, apply `mutation` inside it and commit.
    ///
    /// Commit is only attempted when the mutation succeeded.
    pub async fn run<M: EditMutation>(
        &mut self,
        mutation: &M,
    ) -> Result<EditResponse<M::Output>> {
        let handle = self.open().await?;

        let result = match mutation.apply(self.client.as_ref(), &handle).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    package = %self.package_name,
                    edit_id = %handle.id,
                    mutation = mutation.name(),
                    error = %e,
                    "mutation failed"
                );
                self.abort(handle).await;
                return Err(e);
            }
        };

        let edit = self.commit(handle).await?;
        Ok(EditResponse { edit, result })
    }

    async fn abort(&mut self, handle: EditHandle) {
        self.state = EditState::Aborted;
        self.open_edit = None;

        match self.cleanup {
            CleanupPolicy::LeaveOpen => {
                warn!(edit_id = %handle.id, "edit left open until it expires");
            }
            CleanupPolicy::DeleteOnFailure => match self.client.delete_edit(&handle).await {
                Ok(()) => info!(edit_id = %handle.id, "edit deleted"),
                Err(e) => warn!(edit_id = %handle.id, error = %e, "failed to delete edit"),
            },
        }
    }

    fn check_handle(&self, handle: &EditHandle) -> Result<()> {
        if self.state != EditState::Open {
            return Err(PublishError::Usage(format!(
                "cannot commit edit {} on a session in state {:?}",
                handle.id, self.state
            )));
        }

        let owned = self.open_edit.as_deref() == Some(handle.id.as_str())
            && handle.package_name == self.package_name;
        if !owned {
            return Err(PublishError::Usage(format!(
                "edit {} was not opened by this session",
                handle.id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{Call, StubClient};

    struct Noop;

    #[async_trait::async_trait]
    impl EditMutation for Noop {
        type Output = ();

        fn name(&self) -> &'static str {
            "noop"
        }

        async fn apply(&self, _client: &dyn PublisherClient, _edit: &EditHandle) -> Result<()> {
            Ok(())
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl EditMutation for Failing {
        type Output = ();

        fn name(&self) -> &'static str {
            "failing"
        }

        async fn apply(&self, _client: &dyn PublisherClient, _edit: &EditHandle) -> Result<()> {
            Err(PublishError::Remote {
                status: 403,
                message: "denied".to_string(),
            })
        }
    }

    fn session(stub: &Arc<StubClient>) -> EditSession {
        EditSession::new(stub.clone(), &EditParams::new("com.example.app")).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_package() {
        let stub = Arc::new(StubClient::new());
        let err = EditSession::new(stub, &EditParams::new("")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_run_opens_applies_and_commits() {
        let stub = Arc::new(StubClient::new());
        let mut session = session(&stub);

        let response = session.run(&Noop).await.unwrap();

        assert_eq!(response.edit.id, "edit-1");
        assert_eq!(session.state(), EditState::Committed);
        assert_eq!(
            stub.calls(),
            vec![
                Call::InsertEdit("com.example.app".to_string()),
                Call::CommitEdit("edit-1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_mutation_skips_commit_and_leaves_edit() {
        let stub = Arc::new(StubClient::new());
        let mut session = session(&stub);

        let err = session.run(&Failing).await.unwrap_err();

        assert!(err.to_string().contains("denied"));
        assert_eq!(session.state(), EditState::Aborted);
        assert_eq!(stub.count(|c| matches!(c, Call::CommitEdit(_))), 0);
        assert_eq!(stub.count(|c| matches!(c, Call::DeleteEdit(_))), 0);
    }

    #[tokio::test]
    async fn test_failed_mutation_deletes_edit_when_configured() {
        let stub = Arc::new(StubClient::new());
        let mut session = session(&stub).with_cleanup(CleanupPolicy::DeleteOnFailure);

        session.run(&Failing).await.unwrap_err();

        assert_eq!(stub.count(|c| matches!(c, Call::CommitEdit(_))), 0);
        assert_eq!(
            stub.count(|c| *c == Call::DeleteEdit("edit-1".to_string())),
            1
        );
    }

    #[tokio::test]
    async fn test_failed_cleanup_returns_original_error() {
        let stub = Arc::new(StubClient::new().failing("delete_edit", "gone"));
        let mut session = session(&stub).with_cleanup(CleanupPolicy::DeleteOnFailure);

        let err = session.run(&Failing).await.unwrap_err();
        assert!(err.to_string().contains("denied"));
    }

    #[tokio::test]
    async fn test_open_failure_aborts_session() {
        let stub = Arc::new(StubClient::new().failing("insert_edit", "edit conflict"));
        let mut session = session(&stub);

        let err = session.run(&Noop).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(session.state(), EditState::Aborted);
        assert_eq!(stub.count(|c| matches!(c, Call::CommitEdit(_))), 0);
    }

    #[tokio::test]
    async fn test_commit_rejection_aborts_session() {
        let stub = Arc::new(StubClient::new().failing("commit_edit", "missing track"));
        let mut session = session(&stub);

        let err = session.run(&Noop).await.unwrap_err();

        assert!(err.to_string().contains("missing track"));
        assert_eq!(session.state(), EditState::Aborted);
    }

    #[tokio::test]
    async fn test_commit_twice_is_usage_error() {
        let stub = Arc::new(StubClient::new());
        let mut session = session(&stub);

        let handle = session.open().await.unwrap();
        let replay = EditHandle {
            id: handle.id.clone(),
            package_name: handle.package_name.clone(),
        };

        session.commit(handle).await.unwrap();
        let err = session.commit(replay).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(stub.count(|c| matches!(c, Call::CommitEdit(_))), 1);
    }

    #[tokio::test]
    async fn test_commit_foreign_handle_is_usage_error() {
        let stub = Arc::new(StubClient::new());
        let mut first = session(&stub);
        let mut second = session(&stub);

        let foreign = first.open().await.unwrap();
        second.open().await.unwrap();

        let err = second.commit(foreign).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(stub.count(|c| matches!(c, Call::CommitEdit(_))), 0);
    }

    #[tokio::test]
    async fn test_commit_without_open_is_usage_error() {
        let stub = Arc::new(StubClient::new());
        let mut session = session(&stub);

        let forged = EditHandle {
            id: "edit-99".to_string(),
            package_name: "com.example.app".to_string(),
        };

        let err = session.commit(forged).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_session_is_single_use() {
        let stub = Arc::new(StubClient::new());
        let mut session = session(&stub);

        session.run(&Noop).await.unwrap();
        let err = session.run(&Noop).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(stub.count(|c| matches!(c, Call::InsertEdit(_))), 1);
    }
}
