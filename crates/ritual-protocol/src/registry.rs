//! The operation registry.
//!
//! Opcodes are written out explicitly and the table is append-only: an entry
//! must never be renumbered or removed once shipped, since both sides of a
//! channel identify operations purely by number.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::calls::*;
use crate::envelope::RESERVED_ERROR_OPCODE;
use crate::error::{ProtocolError, ProtocolResult};

/// A plain data record that can travel inside an envelope.
pub trait Record: Serialize + DeserializeOwned + Send + 'static {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Send + 'static {}

/// An argument record bound to its operation.
///
/// The opcode and reply type are fixed at compile time, which is how the
/// client resolves an operation by name without consulting the table.
pub trait Call: Record {
    /// Opcode this call is sent with, and that a successful reply must carry.
    const OPCODE: Opcode;
    /// Result record of the operation.
    type Reply: Record;
}

/// Static description of one registered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Wire opcode.
    pub opcode: Opcode,
    /// Stable snake_case name.
    pub name: &'static str,
    /// Argument record type.
    pub call: &'static str,
    /// Result record type.
    pub reply: &'static str,
}

macro_rules! operations {
    ($( $(#[$doc:meta])* $code:literal => $variant:ident($name:literal, $call:ident, $reply:ident), )+) => {
        /// Wire opcode of every registered operation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum Opcode {
            $( $(#[$doc])* $variant = $code, )+
        }

        impl Opcode {
            /// Looks up the operation registered under `value`.
            #[must_use]
            pub const fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $( $code => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Returns the registry entry for this opcode.
            #[must_use]
            pub const fn descriptor(self) -> &'static OperationDescriptor {
                match self {
                    $(
                        Self::$variant => &OperationDescriptor {
                            opcode: Self::$variant,
                            name: $name,
                            call: stringify!($call),
                            reply: stringify!($reply),
                        },
                    )+
                }
            }
        }

        /// Every registered operation, in opcode order.
        pub static REGISTRY: &[OperationDescriptor] = &[
            $( *Opcode::$variant.descriptor(), )+
        ];

        $(
            impl Call for $call {
                const OPCODE: Opcode = Opcode::$variant;
                type Reply = $reply;
            }
        )+
    };
}

operations! {
    /// Liveness probe.
    1 => Heartbeat("heartbeat", HeartbeatCall, Empty),
    2 => GetObjectAttributes("get_object_attributes", GetObjectAttributesCall, GetObjectAttributesReply),
    3 => GetChildrenAttributes("get_children_attributes", GetChildrenAttributesCall, GetChildrenAttributesReply),
    4 => CreateObject("create_object", CreateObjectCall, Empty),
    5 => DeleteObject("delete_object", DeleteObjectCall, Empty),
    6 => MoveObject("move_object", MoveObjectCall, Empty),
    /// Copy a file from outside the root anchor into it.
    7 => ImportFile("import_file", ImportFileCall, Empty),
    /// Copy a synced file to a temporary location readable by the caller.
    8 => ExportFile("export_file", ExportFileCall, ExportReply),
    9 => ShareFolder("share_folder", ShareFolderCall, Empty),
    10 => UnshareFolder("unshare_folder", UnshareFolderCall, Empty),
    11 => ListSharedFolders("list_shared_folders", ListSharedFoldersCall, ListSharedFoldersReply),
    12 => ListSharedFolderInvitations("list_shared_folder_invitations", ListSharedFolderInvitationsCall, ListSharedFolderInvitationsReply),
    13 => JoinSharedFolder("join_shared_folder", JoinSharedFolderCall, Empty),
    14 => LeaveSharedFolder("leave_shared_folder", LeaveSharedFolderCall, Empty),
    /// Stop syncing a folder on this device (selective sync).
    15 => ExcludeFolder("exclude_folder", ExcludeFolderCall, Empty),
    16 => IncludeFolder("include_folder", IncludeFolderCall, Empty),
    17 => ListExcludedFolders("list_excluded_folders", ListExcludedFoldersCall, ListExcludedFoldersReply),
    18 => ListConflicts("list_conflicts", ListConflictsCall, ListConflictsReply),
    19 => ExportConflict("export_conflict", ExportConflictCall, ExportReply),
    20 => DeleteConflict("delete_conflict", DeleteConflictCall, Empty),
    21 => GetActivities("get_activities", GetActivitiesCall, GetActivitiesReply),
    22 => ListRevChildren("list_rev_children", ListRevChildrenCall, ListRevChildrenReply),
    23 => ListRevHistory("list_rev_history", ListRevHistoryCall, ListRevHistoryReply),
    24 => ExportRevision("export_revision", ExportRevisionCall, ExportReply),
    25 => DeleteRevision("delete_revision", DeleteRevisionCall, Empty),
    26 => GetSyncStatus("get_sync_status", GetSyncStatusCall, GetSyncStatusReply),
    27 => GetPathStatus("get_path_status", GetPathStatusCall, GetPathStatusReply),
    28 => PauseSyncing("pause_syncing", PauseSyncingCall, Empty),
    29 => ResumeSyncing("resume_syncing", ResumeSyncingCall, Empty),
    30 => RelocateRootAnchor("relocate_root_anchor", RelocateRootAnchorCall, Empty),
    31 => DumpStats("dump_stats", DumpStatsCall, DumpStatsReply),
    32 => GetDiagnostics("get_diagnostics", GetDiagnosticsCall, GetDiagnosticsReply),
    /// Write a stack dump of every daemon thread to the daemon log.
    33 => LogThreads("log_threads", LogThreadsCall, Empty),
    34 => InvalidateDeviceNameCache("invalidate_device_name_cache", InvalidateDeviceNameCacheCall, Empty),
    35 => Shutdown("shutdown", ShutdownCall, Empty),
}

impl Opcode {
    /// Returns the wire value of this opcode.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Stable snake_case name of the operation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// Resolves a wire opcode to its operation.
///
/// The reserved error opcode is not an operation and resolves to
/// [`ProtocolError::UnknownOpcode`] like any other unregistered value.
pub fn resolve(opcode: u32) -> ProtocolResult<&'static OperationDescriptor> {
    if opcode == RESERVED_ERROR_OPCODE {
        return Err(ProtocolError::UnknownOpcode { opcode });
    }
    Opcode::from_u32(opcode)
        .map(Opcode::descriptor)
        .ok_or(ProtocolError::UnknownOpcode { opcode })
}

/// Resolves an operation by its snake_case name.
pub fn resolve_name(name: &str) -> Option<&'static OperationDescriptor> {
    REGISTRY.iter().find(|d| d.name == name)
}
