//! The daemon-side service interface.

use async_trait::async_trait;

use ritual_protocol::{
    ChildAttributes, ConflictedPath, DiagnosticsReport, GetActivitiesReply, GetSyncStatusReply,
    Invitation, ObjectAttributes, ObjectPath, Opcode, PathStatus, RevChild, Revision,
    ServiceError, ServiceResult, SharedFolder, StatEntry, SubjectPermissions,
};

/// Everything a front-end can ask of the daemon.
///
/// The [`Reactor`](crate::Reactor) decodes each call record and invokes the
/// method of the same name with the record's fields in declaration order.
/// Operations whose reply holds a single field return that field's value;
/// the others return the whole reply record.
///
/// Every method has a default that fails with [`ServiceError::Unsupported`],
/// so a service only implements what it actually serves. `heartbeat` succeeds
/// by default.
#[async_trait]
pub trait SyncService: Send + Sync + 'static {
    async fn heartbeat(&self) -> ServiceResult<()> {
        Ok(())
    }

    async fn get_object_attributes(&self, _path: ObjectPath) -> ServiceResult<ObjectAttributes> {
        Err(ServiceError::unsupported(Opcode::GetObjectAttributes))
    }

    async fn get_children_attributes(
        &self,
        _path: ObjectPath,
    ) -> ServiceResult<Vec<ChildAttributes>> {
        Err(ServiceError::unsupported(Opcode::GetChildrenAttributes))
    }

    /// Creates a file, or a folder when `dir` is set.
    async fn create_object(&self, _path: ObjectPath, _dir: bool) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::CreateObject))
    }

    async fn delete_object(&self, _path: ObjectPath) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::DeleteObject))
    }

    async fn move_object(&self, _from: ObjectPath, _to: ObjectPath) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::MoveObject))
    }

    /// Copies the local file at `source` to `destination` inside the root anchor.
    async fn import_file(&self, _destination: ObjectPath, _source: String) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::ImportFile))
    }

    /// Returns the local path of the exported copy.
    async fn export_file(&self, _source: ObjectPath) -> ServiceResult<String> {
        Err(ServiceError::unsupported(Opcode::ExportFile))
    }

    async fn share_folder(
        &self,
        _path: ObjectPath,
        _subject_permissions: Vec<SubjectPermissions>,
        _note: String,
        _suppress_sharing_rules_warnings: bool,
    ) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::ShareFolder))
    }

    async fn unshare_folder(&self, _path: ObjectPath) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::UnshareFolder))
    }

    async fn list_shared_folders(&self) -> ServiceResult<Vec<SharedFolder>> {
        Err(ServiceError::unsupported(Opcode::ListSharedFolders))
    }

    async fn list_shared_folder_invitations(&self) -> ServiceResult<Vec<Invitation>> {
        Err(ServiceError::unsupported(Opcode::ListSharedFolderInvitations))
    }

    async fn join_shared_folder(&self, _id: String) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::JoinSharedFolder))
    }

    async fn leave_shared_folder(&self, _path: ObjectPath) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::LeaveSharedFolder))
    }

    async fn exclude_folder(&self, _path: ObjectPath) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::ExcludeFolder))
    }

    async fn include_folder(&self, _path: ObjectPath) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::IncludeFolder))
    }

    async fn list_excluded_folders(&self) -> ServiceResult<Vec<ObjectPath>> {
        Err(ServiceError::unsupported(Opcode::ListExcludedFolders))
    }

    async fn list_conflicts(&self) -> ServiceResult<Vec<ConflictedPath>> {
        Err(ServiceError::unsupported(Opcode::ListConflicts))
    }

    async fn export_conflict(&self, _path: ObjectPath, _kidx: u32) -> ServiceResult<String> {
        Err(ServiceError::unsupported(Opcode::ExportConflict))
    }

    async fn delete_conflict(&self, _path: ObjectPath, _kidx: u32) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::DeleteConflict))
    }

    async fn get_activities(
        &self,
        _brief: bool,
        _max_results: u32,
        _page_token: Option<u64>,
    ) -> ServiceResult<GetActivitiesReply> {
        Err(ServiceError::unsupported(Opcode::GetActivities))
    }

    async fn list_rev_children(&self, _path: ObjectPath) -> ServiceResult<Vec<RevChild>> {
        Err(ServiceError::unsupported(Opcode::ListRevChildren))
    }

    async fn list_rev_history(&self, _path: ObjectPath) -> ServiceResult<Vec<Revision>> {
        Err(ServiceError::unsupported(Opcode::ListRevHistory))
    }

    async fn export_revision(&self, _path: ObjectPath, _index: Vec<u8>) -> ServiceResult<String> {
        Err(ServiceError::unsupported(Opcode::ExportRevision))
    }

    /// Deletes one revision, or every revision of `path` when `index` is `None`.
    async fn delete_revision(
        &self,
        _path: ObjectPath,
        _index: Option<Vec<u8>>,
    ) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::DeleteRevision))
    }

    async fn get_sync_status(&self, _path: ObjectPath) -> ServiceResult<GetSyncStatusReply> {
        Err(ServiceError::unsupported(Opcode::GetSyncStatus))
    }

    async fn get_path_status(&self, _paths: Vec<ObjectPath>) -> ServiceResult<Vec<PathStatus>> {
        Err(ServiceError::unsupported(Opcode::GetPathStatus))
    }

    async fn pause_syncing(&self) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::PauseSyncing))
    }

    async fn resume_syncing(&self) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::ResumeSyncing))
    }

    async fn relocate_root_anchor(&self, _new_root: String) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::RelocateRootAnchor))
    }

    async fn dump_stats(&self, _template: Vec<String>) -> ServiceResult<Vec<StatEntry>> {
        Err(ServiceError::unsupported(Opcode::DumpStats))
    }

    async fn get_diagnostics(&self) -> ServiceResult<DiagnosticsReport> {
        Err(ServiceError::unsupported(Opcode::GetDiagnostics))
    }

    async fn log_threads(&self) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::LogThreads))
    }

    async fn invalidate_device_name_cache(&self) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::InvalidateDeviceNameCache))
    }

    /// Called before the reply is written. Stopping the daemon is up to the
    /// implementation, typically by signalling the socket server's shutdown
    /// future.
    async fn shutdown(&self) -> ServiceResult<()> {
        Err(ServiceError::unsupported(Opcode::Shutdown))
    }
}
