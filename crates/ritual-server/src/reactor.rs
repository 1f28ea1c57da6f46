//! Call dispatch: one inbound envelope in, one outbound envelope out.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{Instrument, debug, debug_span, error, warn};

use ritual_protocol::*;

use crate::service::SyncService;

/// Result type for reactor operations.
pub type ReactorResult<T> = Result<T, ReactorError>;

/// Failures the reactor cannot express as an error reply.
#[derive(Debug, Error)]
pub enum ReactorError {
    /// The service produced a result that cannot be put on the wire.
    #[error("{operation} returned a reply that cannot be encoded: {source}")]
    ContractViolation {
        operation: &'static str,
        #[source]
        source: ProtocolError,
    },
}

/// Why a call did not produce a successful reply.
enum Rejection {
    /// Answered with an error envelope.
    Fault(ErrorRecord),
    /// Not answered at all.
    Contract(ReactorError),
}

impl From<ProtocolError> for Rejection {
    fn from(err: ProtocolError) -> Self {
        Self::Fault(ErrorRecord::from(&err))
    }
}

impl From<ServiceError> for Rejection {
    fn from(err: ServiceError) -> Self {
        Self::Fault(encode_error(&err))
    }
}

/// Dispatches encoded calls to a [`SyncService`].
///
/// Transport agnostic: the reactor sees envelope bytes and returns envelope
/// bytes. Malformed envelopes, unknown opcodes, undecodable arguments and
/// service failures all come back as an error envelope; only a
/// [`ReactorError`] leaves the call unanswered.
pub struct Reactor<S: ?Sized> {
    service: Arc<S>,
}

impl<S: ?Sized> Clone for Reactor<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S> Reactor<S>
where
    S: SyncService + ?Sized,
{
    /// Creates a reactor serving `service`.
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Returns the service calls are dispatched to.
    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Handles one encoded call envelope and returns the encoded reply.
    pub async fn react(&self, request: &[u8]) -> ReactorResult<Vec<u8>> {
        let reply = match self.dispatch(request).await {
            Ok(reply) => reply,
            Err(Rejection::Fault(record)) => {
                warn!(
                    kind = ?record.kind,
                    message = %record.message,
                    "Sending error reply"
                );
                Envelope::error(&record).map_err(|source| ReactorError::ContractViolation {
                    operation: "error reply",
                    source,
                })?
            }
            Err(Rejection::Contract(err)) => {
                error!(error = %err, "Service broke its reply contract");
                return Err(err);
            }
        };

        reply
            .encode()
            .map_err(|source| ReactorError::ContractViolation {
                operation: Opcode::from_u32(reply.opcode).map_or("error reply", Opcode::name),
                source,
            })
    }

    async fn dispatch(&self, request: &[u8]) -> Result<Envelope, Rejection> {
        let envelope = Envelope::decode(request)?;
        let opcode = envelope.operation()?;

        debug!(
            operation = opcode.name(),
            opcode = opcode.as_u32(),
            "Dispatching call"
        );
        let span = debug_span!("call", operation = opcode.name());
        self.route(opcode, &envelope).instrument(span).await
    }

    async fn route(&self, opcode: Opcode, envelope: &Envelope) -> Result<Envelope, Rejection> {
        let service = &*self.service;

        match opcode {
            Opcode::Heartbeat => {
                invoke(envelope, |_: HeartbeatCall| async move {
                    service.heartbeat().await.map(|()| Empty::default())
                })
                .await
            }
            Opcode::GetObjectAttributes => {
                invoke(envelope, |c: GetObjectAttributesCall| async move {
                    service
                        .get_object_attributes(c.path)
                        .await
                        .map(GetObjectAttributesReply::new)
                })
                .await
            }
            Opcode::GetChildrenAttributes => {
                invoke(envelope, |c: GetChildrenAttributesCall| async move {
                    service
                        .get_children_attributes(c.path)
                        .await
                        .map(|children| GetChildrenAttributesReply {
                            children,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::CreateObject => {
                invoke(envelope, |c: CreateObjectCall| async move {
                    service
                        .create_object(c.path, c.dir)
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::DeleteObject => {
                invoke(envelope, |c: DeleteObjectCall| async move {
                    service.delete_object(c.path).await.map(|()| Empty::default())
                })
                .await
            }
            Opcode::MoveObject => {
                invoke(envelope, |c: MoveObjectCall| async move {
                    service
                        .move_object(c.path_from, c.path_to)
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::ImportFile => {
                invoke(envelope, |c: ImportFileCall| async move {
                    service
                        .import_file(c.destination, c.source)
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::ExportFile => {
                invoke(envelope, |c: ExportFileCall| async move {
                    service.export_file(c.source).await.map(ExportReply::new)
                })
                .await
            }
            Opcode::ShareFolder => {
                invoke(envelope, |c: ShareFolderCall| async move {
                    service
                        .share_folder(
                            c.path,
                            c.subject_permissions,
                            c.note,
                            c.suppress_sharing_rules_warnings,
                        )
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::UnshareFolder => {
                invoke(envelope, |c: UnshareFolderCall| async move {
                    service.unshare_folder(c.path).await.map(|()| Empty::default())
                })
                .await
            }
            Opcode::ListSharedFolders => {
                invoke(envelope, |_: ListSharedFoldersCall| async move {
                    service
                        .list_shared_folders()
                        .await
                        .map(|shared_folders| ListSharedFoldersReply {
                            shared_folders,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::ListSharedFolderInvitations => {
                invoke(envelope, |_: ListSharedFolderInvitationsCall| async move {
                    service
                        .list_shared_folder_invitations()
                        .await
                        .map(|invitations| ListSharedFolderInvitationsReply {
                            invitations,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::JoinSharedFolder => {
                invoke(envelope, |c: JoinSharedFolderCall| async move {
                    service
                        .join_shared_folder(c.id)
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::LeaveSharedFolder => {
                invoke(envelope, |c: LeaveSharedFolderCall| async move {
                    service
                        .leave_shared_folder(c.path)
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::ExcludeFolder => {
                invoke(envelope, |c: ExcludeFolderCall| async move {
                    service.exclude_folder(c.path).await.map(|()| Empty::default())
                })
                .await
            }
            Opcode::IncludeFolder => {
                invoke(envelope, |c: IncludeFolderCall| async move {
                    service.include_folder(c.path).await.map(|()| Empty::default())
                })
                .await
            }
            Opcode::ListExcludedFolders => {
                invoke(envelope, |_: ListExcludedFoldersCall| async move {
                    service
                        .list_excluded_folders()
                        .await
                        .map(|paths| ListExcludedFoldersReply {
                            paths,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::ListConflicts => {
                invoke(envelope, |_: ListConflictsCall| async move {
                    service
                        .list_conflicts()
                        .await
                        .map(|conflicts| ListConflictsReply {
                            conflicts,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::ExportConflict => {
                invoke(envelope, |c: ExportConflictCall| async move {
                    service
                        .export_conflict(c.path, c.kidx)
                        .await
                        .map(ExportReply::new)
                })
                .await
            }
            Opcode::DeleteConflict => {
                invoke(envelope, |c: DeleteConflictCall| async move {
                    service
                        .delete_conflict(c.path, c.kidx)
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::GetActivities => {
                invoke(envelope, |c: GetActivitiesCall| async move {
                    service
                        .get_activities(c.brief, c.max_results, c.page_token)
                        .await
                })
                .await
            }
            Opcode::ListRevChildren => {
                invoke(envelope, |c: ListRevChildrenCall| async move {
                    service
                        .list_rev_children(c.path)
                        .await
                        .map(|children| ListRevChildrenReply {
                            children,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::ListRevHistory => {
                invoke(envelope, |c: ListRevHistoryCall| async move {
                    service
                        .list_rev_history(c.path)
                        .await
                        .map(|revisions| ListRevHistoryReply {
                            revisions,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::ExportRevision => {
                invoke(envelope, |c: ExportRevisionCall| async move {
                    service
                        .export_revision(c.path, c.index)
                        .await
                        .map(ExportReply::new)
                })
                .await
            }
            Opcode::DeleteRevision => {
                invoke(envelope, |c: DeleteRevisionCall| async move {
                    service
                        .delete_revision(c.path, c.index)
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::GetSyncStatus => {
                invoke(envelope, |c: GetSyncStatusCall| async move {
                    service.get_sync_status(c.path).await
                })
                .await
            }
            Opcode::GetPathStatus => {
                invoke(envelope, |c: GetPathStatusCall| async move {
                    service
                        .get_path_status(c.paths)
                        .await
                        .map(|status| GetPathStatusReply {
                            status,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::PauseSyncing => {
                invoke(envelope, |_: PauseSyncingCall| async move {
                    service.pause_syncing().await.map(|()| Empty::default())
                })
                .await
            }
            Opcode::ResumeSyncing => {
                invoke(envelope, |_: ResumeSyncingCall| async move {
                    service.resume_syncing().await.map(|()| Empty::default())
                })
                .await
            }
            Opcode::RelocateRootAnchor => {
                invoke(envelope, |c: RelocateRootAnchorCall| async move {
                    service
                        .relocate_root_anchor(c.new_root)
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::DumpStats => {
                invoke(envelope, |c: DumpStatsCall| async move {
                    service
                        .dump_stats(c.template)
                        .await
                        .map(|stats| DumpStatsReply {
                            stats,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::GetDiagnostics => {
                invoke(envelope, |_: GetDiagnosticsCall| async move {
                    service
                        .get_diagnostics()
                        .await
                        .map(|diagnostics| GetDiagnosticsReply {
                            diagnostics,
                            ..Default::default()
                        })
                })
                .await
            }
            Opcode::LogThreads => {
                invoke(envelope, |_: LogThreadsCall| async move {
                    service.log_threads().await.map(|()| Empty::default())
                })
                .await
            }
            Opcode::InvalidateDeviceNameCache => {
                invoke(envelope, |_: InvalidateDeviceNameCacheCall| async move {
                    service
                        .invalidate_device_name_cache()
                        .await
                        .map(|()| Empty::default())
                })
                .await
            }
            Opcode::Shutdown => {
                invoke(envelope, |_: ShutdownCall| async move {
                    service.shutdown().await.map(|()| Empty::default())
                })
                .await
            }
        }
    }
}

/// Decodes the arguments of `C`, runs `method` and wraps its result.
///
/// Arguments that do not decode are answered with `bad_args` without
/// running `method`.
async fn invoke<C, F, Fut>(envelope: &Envelope, method: F) -> Result<Envelope, Rejection>
where
    C: Call,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = ServiceResult<C::Reply>>,
{
    let call: C = envelope.record()?;
    let reply = method(call).await?;

    Envelope::reply(C::OPCODE, &reply).map_err(|source| {
        Rejection::Contract(ReactorError::ContractViolation {
            operation: C::OPCODE.name(),
            source,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every method invoked, and answers with defaults.
    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingService {
        fn hit(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SyncService for RecordingService {
        async fn heartbeat(&self) -> ServiceResult<()> {
            self.hit("heartbeat");
            Ok(())
        }

        async fn get_object_attributes(&self, path: ObjectPath) -> ServiceResult<ObjectAttributes> {
            self.hit(format!("get_object_attributes {path}"));
            if path == ObjectPath::from("/missing") {
                return Err(ServiceError::NotFound(path.to_string()));
            }
            Ok(ObjectAttributes::new(ObjectType::Folder))
        }

        async fn get_children_attributes(
            &self,
            _path: ObjectPath,
        ) -> ServiceResult<Vec<ChildAttributes>> {
            self.hit("get_children_attributes");
            Ok(Vec::new())
        }

        async fn create_object(&self, path: ObjectPath, dir: bool) -> ServiceResult<()> {
            self.hit(format!("create_object {path} {dir}"));
            Ok(())
        }

        async fn delete_object(&self, _path: ObjectPath) -> ServiceResult<()> {
            self.hit("delete_object");
            Ok(())
        }

        async fn move_object(&self, from: ObjectPath, to: ObjectPath) -> ServiceResult<()> {
            self.hit(format!("move_object {from} {to}"));
            Ok(())
        }

        async fn import_file(&self, _destination: ObjectPath, _source: String) -> ServiceResult<()> {
            self.hit("import_file");
            Ok(())
        }

        async fn export_file(&self, source: ObjectPath) -> ServiceResult<String> {
            self.hit("export_file");
            Ok(format!("/tmp/export{source}"))
        }

        async fn share_folder(
            &self,
            _path: ObjectPath,
            _subject_permissions: Vec<SubjectPermissions>,
            _note: String,
            _suppress_sharing_rules_warnings: bool,
        ) -> ServiceResult<()> {
            self.hit("share_folder");
            Ok(())
        }

        async fn unshare_folder(&self, _path: ObjectPath) -> ServiceResult<()> {
            self.hit("unshare_folder");
            Ok(())
        }

        async fn list_shared_folders(&self) -> ServiceResult<Vec<SharedFolder>> {
            self.hit("list_shared_folders");
            Ok(Vec::new())
        }

        async fn list_shared_folder_invitations(&self) -> ServiceResult<Vec<Invitation>> {
            self.hit("list_shared_folder_invitations");
            Ok(Vec::new())
        }

        async fn join_shared_folder(&self, _id: String) -> ServiceResult<()> {
            self.hit("join_shared_folder");
            Ok(())
        }

        async fn leave_shared_folder(&self, _path: ObjectPath) -> ServiceResult<()> {
            self.hit("leave_shared_folder");
            Ok(())
        }

        async fn exclude_folder(&self, _path: ObjectPath) -> ServiceResult<()> {
            self.hit("exclude_folder");
            Ok(())
        }

        async fn include_folder(&self, _path: ObjectPath) -> ServiceResult<()> {
            self.hit("include_folder");
            Ok(())
        }

        async fn list_excluded_folders(&self) -> ServiceResult<Vec<ObjectPath>> {
            self.hit("list_excluded_folders");
            Ok(Vec::new())
        }

        async fn list_conflicts(&self) -> ServiceResult<Vec<ConflictedPath>> {
            self.hit("list_conflicts");
            Ok(Vec::new())
        }

        async fn export_conflict(&self, _path: ObjectPath, _kidx: u32) -> ServiceResult<String> {
            self.hit("export_conflict");
            Ok(String::new())
        }

        async fn delete_conflict(&self, _path: ObjectPath, _kidx: u32) -> ServiceResult<()> {
            self.hit("delete_conflict");
            Ok(())
        }

        async fn get_activities(
            &self,
            brief: bool,
            max_results: u32,
            page_token: Option<u64>,
        ) -> ServiceResult<GetActivitiesReply> {
            self.hit(format!("get_activities {brief} {max_results} {page_token:?}"));
            Ok(GetActivitiesReply {
                page_token: page_token.map(|token| token + 1),
                ..Default::default()
            })
        }

        async fn list_rev_children(&self, _path: ObjectPath) -> ServiceResult<Vec<RevChild>> {
            self.hit("list_rev_children");
            Ok(Vec::new())
        }

        async fn list_rev_history(&self, _path: ObjectPath) -> ServiceResult<Vec<Revision>> {
            self.hit("list_rev_history");
            Ok(Vec::new())
        }

        async fn export_revision(&self, _path: ObjectPath, _index: Vec<u8>) -> ServiceResult<String> {
            self.hit("export_revision");
            Ok(String::new())
        }

        async fn delete_revision(
            &self,
            _path: ObjectPath,
            _index: Option<Vec<u8>>,
        ) -> ServiceResult<()> {
            self.hit("delete_revision");
            Ok(())
        }

        async fn get_sync_status(&self, _path: ObjectPath) -> ServiceResult<GetSyncStatusReply> {
            self.hit("get_sync_status");
            Ok(GetSyncStatusReply::default())
        }

        async fn get_path_status(&self, _paths: Vec<ObjectPath>) -> ServiceResult<Vec<PathStatus>> {
            self.hit("get_path_status");
            Ok(Vec::new())
        }

        async fn pause_syncing(&self) -> ServiceResult<()> {
            self.hit("pause_syncing");
            Ok(())
        }

        async fn resume_syncing(&self) -> ServiceResult<()> {
            self.hit("resume_syncing");
            Ok(())
        }

        async fn relocate_root_anchor(&self, _new_root: String) -> ServiceResult<()> {
            self.hit("relocate_root_anchor");
            Ok(())
        }

        async fn dump_stats(&self, _template: Vec<String>) -> ServiceResult<Vec<StatEntry>> {
            self.hit("dump_stats");
            Ok(Vec::new())
        }

        async fn get_diagnostics(&self) -> ServiceResult<DiagnosticsReport> {
            self.hit("get_diagnostics");
            Ok(DiagnosticsReport::default())
        }

        async fn log_threads(&self) -> ServiceResult<()> {
            self.hit("log_threads");
            Ok(())
        }

        async fn invalidate_device_name_cache(&self) -> ServiceResult<()> {
            self.hit("invalidate_device_name_cache");
            Ok(())
        }

        async fn shutdown(&self) -> ServiceResult<()> {
            self.hit("shutdown");
            Ok(())
        }
    }

    /// Implements nothing beyond the defaults.
    struct BareService;

    #[async_trait]
    impl SyncService for BareService {}

    fn recording() -> (Arc<RecordingService>, Reactor<RecordingService>) {
        let service = Arc::new(RecordingService::default());
        let reactor = Reactor::new(Arc::clone(&service));
        (service, reactor)
    }

    async fn roundtrip<S: SyncService + ?Sized>(reactor: &Reactor<S>, request: &Envelope) -> Envelope {
        let bytes = reactor.react(&request.encode().unwrap()).await.unwrap();
        Envelope::decode(&bytes).unwrap()
    }

    fn error_record(reply: &Envelope) -> ErrorRecord {
        assert!(reply.is_error(), "expected an error reply, got opcode {}", reply.opcode);
        reply.record().unwrap()
    }

    /// Checks that a reply decodes as the typed result record and re-encodes
    /// to the same bytes.
    type ReplyCheck = fn(&Envelope);

    /// A default call for `opcode`, and the check for its reply.
    fn default_call_of(opcode: Opcode) -> (Envelope, ReplyCheck) {
        fn call<C: Call + Default>() -> (Envelope, ReplyCheck) {
            fn check<C: Call>(reply: &Envelope) {
                let record: C::Reply = reply
                    .record()
                    .unwrap_or_else(|e| panic!("{}: {e}", C::OPCODE.name()));
                let again = Envelope::reply(C::OPCODE, &record).unwrap();
                assert_eq!(again.payload, reply.payload, "{}", C::OPCODE.name());
            }
            (Envelope::call(&C::default()).unwrap(), check::<C> as ReplyCheck)
        }

        match opcode {
            Opcode::Heartbeat => call::<HeartbeatCall>(),
            Opcode::GetObjectAttributes => call::<GetObjectAttributesCall>(),
            Opcode::GetChildrenAttributes => call::<GetChildrenAttributesCall>(),
            Opcode::CreateObject => call::<CreateObjectCall>(),
            Opcode::DeleteObject => call::<DeleteObjectCall>(),
            Opcode::MoveObject => call::<MoveObjectCall>(),
            Opcode::ImportFile => call::<ImportFileCall>(),
            Opcode::ExportFile => call::<ExportFileCall>(),
            Opcode::ShareFolder => call::<ShareFolderCall>(),
            Opcode::UnshareFolder => call::<UnshareFolderCall>(),
            Opcode::ListSharedFolders => call::<ListSharedFoldersCall>(),
            Opcode::ListSharedFolderInvitations => call::<ListSharedFolderInvitationsCall>(),
            Opcode::JoinSharedFolder => call::<JoinSharedFolderCall>(),
            Opcode::LeaveSharedFolder => call::<LeaveSharedFolderCall>(),
            Opcode::ExcludeFolder => call::<ExcludeFolderCall>(),
            Opcode::IncludeFolder => call::<IncludeFolderCall>(),
            Opcode::ListExcludedFolders => call::<ListExcludedFoldersCall>(),
            Opcode::ListConflicts => call::<ListConflictsCall>(),
            Opcode::ExportConflict => call::<ExportConflictCall>(),
            Opcode::DeleteConflict => call::<DeleteConflictCall>(),
            Opcode::GetActivities => call::<GetActivitiesCall>(),
            Opcode::ListRevChildren => call::<ListRevChildrenCall>(),
            Opcode::ListRevHistory => call::<ListRevHistoryCall>(),
            Opcode::ExportRevision => call::<ExportRevisionCall>(),
            Opcode::DeleteRevision => call::<DeleteRevisionCall>(),
            Opcode::GetSyncStatus => call::<GetSyncStatusCall>(),
            Opcode::GetPathStatus => call::<GetPathStatusCall>(),
            Opcode::PauseSyncing => call::<PauseSyncingCall>(),
            Opcode::ResumeSyncing => call::<ResumeSyncingCall>(),
            Opcode::RelocateRootAnchor => call::<RelocateRootAnchorCall>(),
            Opcode::DumpStats => call::<DumpStatsCall>(),
            Opcode::GetDiagnostics => call::<GetDiagnosticsCall>(),
            Opcode::LogThreads => call::<LogThreadsCall>(),
            Opcode::InvalidateDeviceNameCache => call::<InvalidateDeviceNameCacheCall>(),
            Opcode::Shutdown => call::<ShutdownCall>(),
        }
    }

    #[tokio::test]
    async fn every_opcode_reaches_its_own_method() {
        for descriptor in REGISTRY {
            let (service, reactor) = recording();
            let (call, check_reply) = default_call_of(descriptor.opcode);
            let reply = roundtrip(&reactor, &call).await;

            assert_eq!(reply.opcode, descriptor.opcode.as_u32(), "{}", descriptor.name);
            check_reply(&reply);
            let calls = service.calls();
            assert_eq!(calls.len(), 1, "{}", descriptor.name);
            assert!(
                calls[0].starts_with(descriptor.name),
                "{} dispatched to {}",
                descriptor.name,
                calls[0]
            );
        }
    }

    #[tokio::test]
    async fn create_object_succeeds_with_empty_reply() {
        let (service, reactor) = recording();
        let reply = roundtrip(
            &reactor,
            &Envelope::call(&CreateObjectCall::new("/a/b", true)).unwrap(),
        )
        .await;

        assert_eq!(reply.operation().unwrap(), Opcode::CreateObject);
        assert_eq!(reply.record::<Empty>().unwrap(), Empty::default());
        assert_eq!(service.calls(), ["create_object /a/b true"]);
    }

    #[tokio::test]
    async fn arguments_are_passed_in_declaration_order() {
        let (service, reactor) = recording();
        roundtrip(
            &reactor,
            &Envelope::call(&MoveObjectCall::new("/from", "/to")).unwrap(),
        )
        .await;
        roundtrip(
            &reactor,
            &Envelope::call(&GetActivitiesCall::new(true, 25, Some(7))).unwrap(),
        )
        .await;

        assert_eq!(
            service.calls(),
            ["move_object /from /to", "get_activities true 25 Some(7)"]
        );
    }

    #[tokio::test]
    async fn multi_field_reply_is_passed_through() {
        let (_service, reactor) = recording();
        let reply = roundtrip(
            &reactor,
            &Envelope::call(&GetActivitiesCall::new(false, 10, Some(41))).unwrap(),
        )
        .await;

        let record: GetActivitiesReply = reply.record().unwrap();
        assert_eq!(record.page_token, Some(42));
    }

    #[tokio::test]
    async fn single_field_reply_is_wrapped() {
        let (_service, reactor) = recording();
        let reply = roundtrip(
            &reactor,
            &Envelope::call(&ExportFileCall::new("/report.pdf")).unwrap(),
        )
        .await;

        let record: ExportReply = reply.record().unwrap();
        assert_eq!(record.dest, "/tmp/export/report.pdf");
    }

    #[tokio::test]
    async fn service_failure_becomes_error_reply() {
        let (_service, reactor) = recording();
        let reply = roundtrip(
            &reactor,
            &Envelope::call(&GetObjectAttributesCall::new("/missing")).unwrap(),
        )
        .await;

        let record = error_record(&reply);
        assert_eq!(record.kind, ErrorKind::NotFound);
        assert_eq!(record.message, "/missing");
    }

    #[tokio::test]
    async fn unknown_opcode_becomes_error_reply() {
        let (service, reactor) = recording();
        let past_end = REGISTRY.len() as u32 + 1;
        let reply = roundtrip(&reactor, &Envelope::new(past_end, b"{}".to_vec())).await;

        let record = error_record(&reply);
        assert_eq!(record.kind, ErrorKind::UnknownOpcode);
        assert!(record.message.contains(&past_end.to_string()));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn reserved_opcode_is_not_callable() {
        let (service, reactor) = recording();
        let reply = roundtrip(&reactor, &Envelope::new(RESERVED_ERROR_OPCODE, b"{}".to_vec())).await;

        assert_eq!(error_record(&reply).kind, ErrorKind::UnknownOpcode);
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_envelope_becomes_error_reply() {
        let (service, reactor) = recording();
        let bytes = reactor.react(&[0, 0, 0]).await.unwrap();
        let reply = Envelope::decode(&bytes).unwrap();

        assert_eq!(error_record(&reply).kind, ErrorKind::MalformedEnvelope);
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn undecodable_arguments_skip_the_service() {
        let (service, reactor) = recording();
        let request = Envelope::new(
            Opcode::CreateObject.as_u32(),
            br#"{"path":5,"dir":true}"#.to_vec(),
        );
        let reply = roundtrip(&reactor, &request).await;

        let record = error_record(&reply);
        assert_eq!(record.kind, ErrorKind::BadArgs);
        assert!(record.message.contains("CreateObjectCall"));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn unimplemented_operation_is_unsupported() {
        let reactor = Reactor::new(Arc::new(BareService));
        let reply = roundtrip(&reactor, &Envelope::call(&DumpStatsCall::default()).unwrap()).await;

        let record = error_record(&reply);
        assert_eq!(record.kind, ErrorKind::Unsupported);
        assert_eq!(record.message, "dump_stats");
    }

    #[tokio::test]
    async fn default_heartbeat_succeeds() {
        let service: Arc<dyn SyncService> = Arc::new(BareService);
        let reactor = Reactor::new(service);
        let reply = roundtrip(&reactor, &Envelope::call(&HeartbeatCall::default()).unwrap()).await;
        assert_eq!(reply.operation().unwrap(), Opcode::Heartbeat);
    }

    /// A reply record whose serialization always fails.
    #[derive(Debug, serde::Deserialize)]
    struct Unencodable;

    impl serde::Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct UnencodableCall {}

    impl Call for UnencodableCall {
        const OPCODE: Opcode = Opcode::Heartbeat;
        type Reply = Unencodable;
    }

    #[tokio::test]
    async fn unencodable_reply_is_a_contract_violation() {
        let request = Envelope::new(Opcode::Heartbeat.as_u32(), b"{}".to_vec());
        let result = invoke(&request, |_: UnencodableCall| async { Ok(Unencodable) }).await;

        match result {
            Err(Rejection::Contract(ReactorError::ContractViolation { operation, .. })) => {
                assert_eq!(operation, "heartbeat");
            }
            _ => panic!("expected a contract violation"),
        }
    }
}
