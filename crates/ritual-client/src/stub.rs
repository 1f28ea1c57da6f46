//! Typed front-end proxy for the daemon's operations.

use std::time::Duration;

use tracing::debug;

use ritual_protocol::*;

use crate::error::{ClientError, ClientResult, decode_error};
use crate::transport::Transport;

/// Calls daemon operations over a [`Transport`].
///
/// Each method builds the call record, sends it and decodes the reply. Every
/// failure, local or remote, is returned as the `Err` of the call; nothing is
/// checked eagerly when the call is built.
pub struct Stub<T> {
    transport: T,
}

impl<T: Transport> Stub<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `request` and returns the reply envelope.
    ///
    /// Error replies are decoded into the returned error. The reply opcode is
    /// not checked against the request; see [`Stub::call`].
    pub async fn exchange(&self, request: &Envelope) -> ClientResult<Envelope> {
        let reply = self.transport.send(request.encode()?).await?;
        let envelope = Envelope::decode(&reply)?;

        if envelope.is_error() {
            return Err(decode_error(envelope.record()?));
        }
        Ok(envelope)
    }

    /// Invokes the operation `C` is bound to.
    pub async fn call<C: Call>(&self, call: C) -> ClientResult<C::Reply> {
        let expected = C::OPCODE.as_u32();
        debug!(operation = C::OPCODE.name(), opcode = expected, "Sending call");

        let reply = self.exchange(&Envelope::call(&call)?).await?;
        if reply.opcode != expected {
            return Err(ClientError::ProtocolMismatch {
                expected,
                received: reply.opcode,
            });
        }
        Ok(reply.record()?)
    }

    /// Like [`Stub::call`], giving up after `timeout`.
    ///
    /// The daemon is not told; it finishes the call regardless.
    pub async fn call_with_timeout<C: Call>(
        &self,
        call: C,
        timeout: Duration,
    ) -> ClientResult<C::Reply> {
        tokio::time::timeout(timeout, self.call(call))
            .await
            .map_err(|_| {
                ClientError::Timeout(format!("waiting for {} after {timeout:?}", C::OPCODE.name()))
            })?
    }

    pub async fn heartbeat(&self) -> ClientResult<()> {
        self.call(HeartbeatCall::default()).await?;
        Ok(())
    }

    pub async fn get_object_attributes(
        &self,
        path: impl Into<ObjectPath>,
    ) -> ClientResult<ObjectAttributes> {
        let reply = self.call(GetObjectAttributesCall::new(path)).await?;
        Ok(reply.attributes)
    }

    pub async fn get_children_attributes(
        &self,
        path: impl Into<ObjectPath>,
    ) -> ClientResult<Vec<ChildAttributes>> {
        let reply = self.call(GetChildrenAttributesCall::new(path)).await?;
        Ok(reply.children)
    }

    pub async fn create_object(&self, path: impl Into<ObjectPath>, dir: bool) -> ClientResult<()> {
        self.call(CreateObjectCall::new(path, dir)).await?;
        Ok(())
    }

    pub async fn delete_object(&self, path: impl Into<ObjectPath>) -> ClientResult<()> {
        self.call(DeleteObjectCall::new(path)).await?;
        Ok(())
    }

    pub async fn move_object(
        &self,
        from: impl Into<ObjectPath>,
        to: impl Into<ObjectPath>,
    ) -> ClientResult<()> {
        self.call(MoveObjectCall::new(from, to)).await?;
        Ok(())
    }

    /// Copies the local file `source` into the root anchor at `destination`.
    pub async fn import_file(
        &self,
        destination: impl Into<ObjectPath>,
        source: impl Into<String>,
    ) -> ClientResult<()> {
        self.call(ImportFileCall::new(destination, source)).await?;
        Ok(())
    }

    /// Returns the local path the daemon exported the file to.
    pub async fn export_file(&self, source: impl Into<ObjectPath>) -> ClientResult<String> {
        let reply = self.call(ExportFileCall::new(source)).await?;
        Ok(reply.dest)
    }

    pub async fn share_folder(
        &self,
        path: impl Into<ObjectPath>,
        subject_permissions: Vec<SubjectPermissions>,
        note: impl Into<String>,
        suppress_sharing_rules_warnings: bool,
    ) -> ClientResult<()> {
        let call = ShareFolderCall::new(path, subject_permissions)
            .with_note(note)
            .suppress_warnings(suppress_sharing_rules_warnings);
        self.call(call).await?;
        Ok(())
    }

    pub async fn unshare_folder(&self, path: impl Into<ObjectPath>) -> ClientResult<()> {
        self.call(UnshareFolderCall::new(path)).await?;
        Ok(())
    }

    pub async fn list_shared_folders(&self) -> ClientResult<Vec<SharedFolder>> {
        let reply = self.call(ListSharedFoldersCall::default()).await?;
        Ok(reply.shared_folders)
    }

    pub async fn list_shared_folder_invitations(&self) -> ClientResult<Vec<Invitation>> {
        let reply = self.call(ListSharedFolderInvitationsCall::default()).await?;
        Ok(reply.invitations)
    }

    pub async fn join_shared_folder(&self, id: impl Into<String>) -> ClientResult<()> {
        self.call(JoinSharedFolderCall::new(id)).await?;
        Ok(())
    }

    pub async fn leave_shared_folder(&self, path: impl Into<ObjectPath>) -> ClientResult<()> {
        self.call(LeaveSharedFolderCall::new(path)).await?;
        Ok(())
    }

    pub async fn exclude_folder(&self, path: impl Into<ObjectPath>) -> ClientResult<()> {
        self.call(ExcludeFolderCall::new(path)).await?;
        Ok(())
    }

    pub async fn include_folder(&self, path: impl Into<ObjectPath>) -> ClientResult<()> {
        self.call(IncludeFolderCall::new(path)).await?;
        Ok(())
    }

    pub async fn list_excluded_folders(&self) -> ClientResult<Vec<ObjectPath>> {
        let reply = self.call(ListExcludedFoldersCall::default()).await?;
        Ok(reply.paths)
    }

    pub async fn list_conflicts(&self) -> ClientResult<Vec<ConflictedPath>> {
        let reply = self.call(ListConflictsCall::default()).await?;
        Ok(reply.conflicts)
    }

    pub async fn export_conflict(
        &self,
        path: impl Into<ObjectPath>,
        kidx: u32,
    ) -> ClientResult<String> {
        let reply = self.call(ExportConflictCall::new(path, kidx)).await?;
        Ok(reply.dest)
    }

    pub async fn delete_conflict(&self, path: impl Into<ObjectPath>, kidx: u32) -> ClientResult<()> {
        self.call(DeleteConflictCall::new(path, kidx)).await?;
        Ok(())
    }

    /// Fetches one page of activities; pass the returned `page_token` to get
    /// the next one.
    pub async fn get_activities(
        &self,
        brief: bool,
        max_results: u32,
        page_token: Option<u64>,
    ) -> ClientResult<GetActivitiesReply> {
        self.call(GetActivitiesCall::new(brief, max_results, page_token))
            .await
    }

    pub async fn list_rev_children(&self, path: impl Into<ObjectPath>) -> ClientResult<Vec<RevChild>> {
        let reply = self.call(ListRevChildrenCall::new(path)).await?;
        Ok(reply.children)
    }

    pub async fn list_rev_history(&self, path: impl Into<ObjectPath>) -> ClientResult<Vec<Revision>> {
        let reply = self.call(ListRevHistoryCall::new(path)).await?;
        Ok(reply.revisions)
    }

    pub async fn export_revision(
        &self,
        path: impl Into<ObjectPath>,
        index: Vec<u8>,
    ) -> ClientResult<String> {
        let reply = self.call(ExportRevisionCall::new(path, index)).await?;
        Ok(reply.dest)
    }

    pub async fn delete_revision(
        &self,
        path: impl Into<ObjectPath>,
        index: Option<Vec<u8>>,
    ) -> ClientResult<()> {
        self.call(DeleteRevisionCall::new(path, index)).await?;
        Ok(())
    }

    pub async fn get_sync_status(
        &self,
        path: impl Into<ObjectPath>,
    ) -> ClientResult<GetSyncStatusReply> {
        self.call(GetSyncStatusCall::new(path)).await
    }

    pub async fn get_path_status(&self, paths: Vec<ObjectPath>) -> ClientResult<Vec<PathStatus>> {
        let reply = self.call(GetPathStatusCall::new(paths)).await?;
        Ok(reply.status)
    }

    pub async fn pause_syncing(&self) -> ClientResult<()> {
        self.call(PauseSyncingCall::default()).await?;
        Ok(())
    }

    pub async fn resume_syncing(&self) -> ClientResult<()> {
        self.call(ResumeSyncingCall::default()).await?;
        Ok(())
    }

    pub async fn relocate_root_anchor(&self, new_root: impl Into<String>) -> ClientResult<()> {
        self.call(RelocateRootAnchorCall::new(new_root)).await?;
        Ok(())
    }

    pub async fn dump_stats(&self, template: Vec<String>) -> ClientResult<Vec<StatEntry>> {
        let reply = self.call(DumpStatsCall::new(template)).await?;
        Ok(reply.stats)
    }

    pub async fn get_diagnostics(&self) -> ClientResult<DiagnosticsReport> {
        let reply = self.call(GetDiagnosticsCall::default()).await?;
        Ok(reply.diagnostics)
    }

    pub async fn log_threads(&self) -> ClientResult<()> {
        self.call(LogThreadsCall::default()).await?;
        Ok(())
    }

    pub async fn invalidate_device_name_cache(&self) -> ClientResult<()> {
        self.call(InvalidateDeviceNameCacheCall::default()).await?;
        Ok(())
    }

    pub async fn shutdown(&self) -> ClientResult<()> {
        self.call(ShutdownCall::default()).await?;
        Ok(())
    }
}
