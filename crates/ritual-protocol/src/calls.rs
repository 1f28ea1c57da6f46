//! Argument and result records of every operation.
//!
//! The binding of each call record to its opcode and reply record lives in
//! the registry.

use serde::{Deserialize, Serialize};

use crate::types::{
    Activity, ChildAttributes, ConflictedPath, DeviceSyncStatus, DiagnosticsReport, Invitation,
    ObjectAttributes, ObjectPath, PathStatus, RevChild, Revision, SharedFolder, StatEntry,
    SubjectPermissions, UnknownFields,
};

macro_rules! bare_records {
    ($( $(#[$doc:meta])* $name:ident, )+) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct $name {
                #[serde(flatten)]
                pub unknown: UnknownFields,
            }
        )+
    };
}

bare_records! {
    /// Result of operations that return nothing.
    Empty,
    HeartbeatCall,
    ListSharedFoldersCall,
    ListSharedFolderInvitationsCall,
    ListExcludedFoldersCall,
    ListConflictsCall,
    PauseSyncingCall,
    ResumeSyncingCall,
    GetDiagnosticsCall,
    LogThreadsCall,
    InvalidateDeviceNameCacheCall,
    /// Asks the daemon to exit once the reply has been sent.
    ShutdownCall,
}

/// Records whose only argument is the path of an existing object.
macro_rules! path_records {
    ($( $(#[$doc:meta])* $name:ident, )+) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct $name {
                pub path: ObjectPath,
                #[serde(flatten)]
                pub unknown: UnknownFields,
            }

            impl $name {
                pub fn new(path: impl Into<ObjectPath>) -> Self {
                    Self {
                        path: path.into(),
                        unknown: UnknownFields::default(),
                    }
                }
            }
        )+
    };
}

path_records! {
    GetObjectAttributesCall,
    GetChildrenAttributesCall,
    /// Deletes a file, or a folder and everything below it.
    DeleteObjectCall,
    /// Converts a shared folder back into a plain folder.
    UnshareFolderCall,
    LeaveSharedFolderCall,
    ExcludeFolderCall,
    IncludeFolderCall,
    ListRevChildrenCall,
    ListRevHistoryCall,
    GetSyncStatusCall,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetObjectAttributesReply {
    pub attributes: ObjectAttributes,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl GetObjectAttributesReply {
    pub fn new(attributes: ObjectAttributes) -> Self {
        Self {
            attributes,
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetChildrenAttributesReply {
    #[serde(default)]
    pub children: Vec<ChildAttributes>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// Creates a file or, with `dir` set, a folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateObjectCall {
    pub path: ObjectPath,
    pub dir: bool,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl CreateObjectCall {
    pub fn new(path: impl Into<ObjectPath>, dir: bool) -> Self {
        Self {
            path: path.into(),
            dir,
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveObjectCall {
    pub path_from: ObjectPath,
    pub path_to: ObjectPath,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl MoveObjectCall {
    pub fn new(path_from: impl Into<ObjectPath>, path_to: impl Into<ObjectPath>) -> Self {
        Self {
            path_from: path_from.into(),
            path_to: path_to.into(),
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportFileCall {
    pub destination: ObjectPath,
    /// Absolute path of the file to import, on the local filesystem.
    pub source: String,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl ImportFileCall {
    pub fn new(destination: impl Into<ObjectPath>, source: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            source: source.into(),
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportFileCall {
    pub source: ObjectPath,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl ExportFileCall {
    pub fn new(source: impl Into<ObjectPath>) -> Self {
        Self {
            source: source.into(),
            unknown: UnknownFields::default(),
        }
    }
}

/// Result of the export operations: where the daemon left the copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportReply {
    pub dest: String,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl ExportReply {
    pub fn new(dest: impl Into<String>) -> Self {
        Self {
            dest: dest.into(),
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareFolderCall {
    pub path: ObjectPath,
    #[serde(default)]
    pub subject_permissions: Vec<SubjectPermissions>,
    /// Note included in the invitation sent to new members.
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub suppress_sharing_rules_warnings: bool,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl ShareFolderCall {
    pub fn new(path: impl Into<ObjectPath>, subject_permissions: Vec<SubjectPermissions>) -> Self {
        Self {
            path: path.into(),
            subject_permissions,
            ..Default::default()
        }
    }

    /// Builder: set the invitation note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Builder: set suppress_sharing_rules_warnings.
    pub fn suppress_warnings(mut self, suppress: bool) -> Self {
        self.suppress_sharing_rules_warnings = suppress;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSharedFoldersReply {
    #[serde(default)]
    pub shared_folders: Vec<SharedFolder>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSharedFolderInvitationsReply {
    #[serde(default)]
    pub invitations: Vec<Invitation>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinSharedFolderCall {
    /// Share identifier from an [`Invitation`].
    pub id: String,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl JoinSharedFolderCall {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListExcludedFoldersReply {
    #[serde(default)]
    pub paths: Vec<ObjectPath>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListConflictsReply {
    #[serde(default)]
    pub conflicts: Vec<ConflictedPath>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConflictCall {
    pub path: ObjectPath,
    /// Conflict branch to export; never `0`.
    pub kidx: u32,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl ExportConflictCall {
    pub fn new(path: impl Into<ObjectPath>, kidx: u32) -> Self {
        Self {
            path: path.into(),
            kidx,
            unknown: UnknownFields::default(),
        }
    }
}

/// Discards one conflict branch, keeping the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteConflictCall {
    pub path: ObjectPath,
    pub kidx: u32,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl DeleteConflictCall {
    pub fn new(path: impl Into<ObjectPath>, kidx: u32) -> Self {
        Self {
            path: path.into(),
            kidx,
            unknown: UnknownFields::default(),
        }
    }
}

/// Requests one page of the activity log, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetActivitiesCall {
    /// Omit per-activity detail.
    #[serde(default)]
    pub brief: bool,
    #[serde(default)]
    pub max_results: u32,
    /// Continuation token from a previous reply; `None` starts from the newest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<u64>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl GetActivitiesCall {
    pub fn new(brief: bool, max_results: u32, page_token: Option<u64>) -> Self {
        Self {
            brief,
            max_results,
            page_token,
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetActivitiesReply {
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// Token for the next page; `None` once the log is exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<u64>,
    /// Some activities name devices whose owners are not yet known.
    #[serde(default)]
    pub has_unresolved_devices: bool,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRevChildrenReply {
    #[serde(default)]
    pub children: Vec<RevChild>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRevHistoryReply {
    #[serde(default)]
    pub revisions: Vec<Revision>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRevisionCall {
    pub path: ObjectPath,
    pub index: Vec<u8>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl ExportRevisionCall {
    pub fn new(path: impl Into<ObjectPath>, index: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            index,
            unknown: UnknownFields::default(),
        }
    }
}

/// Deletes one revision, or all revisions of `path` when `index` is unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteRevisionCall {
    pub path: ObjectPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<u8>>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl DeleteRevisionCall {
    pub fn new(path: impl Into<ObjectPath>, index: Option<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            index,
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetSyncStatusReply {
    /// Whether the daemon can reach the sync status server.
    pub is_server_up: bool,
    #[serde(default)]
    pub status: Vec<DeviceSyncStatus>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPathStatusCall {
    #[serde(default)]
    pub paths: Vec<ObjectPath>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl GetPathStatusCall {
    pub fn new(paths: Vec<ObjectPath>) -> Self {
        Self {
            paths,
            unknown: UnknownFields::default(),
        }
    }
}

/// Status for each requested path, in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPathStatusReply {
    #[serde(default)]
    pub status: Vec<PathStatus>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// Moves the root anchor to a new location on the local filesystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelocateRootAnchorCall {
    pub new_root: String,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl RelocateRootAnchorCall {
    pub fn new(new_root: impl Into<String>) -> Self {
        Self {
            new_root: new_root.into(),
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DumpStatsCall {
    /// Names of the statistics wanted; empty means all.
    #[serde(default)]
    pub template: Vec<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl DumpStatsCall {
    pub fn new(template: Vec<String>) -> Self {
        Self {
            template,
            unknown: UnknownFields::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DumpStatsReply {
    #[serde(default)]
    pub stats: Vec<StatEntry>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetDiagnosticsReply {
    pub diagnostics: DiagnosticsReport,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}
