//! Value records shared by several operations.
//!
//! Every record carries an [`UnknownFields`] bag flattened into its JSON
//! object. Fields added by a newer peer land there and are written back out
//! unchanged when the record is re-encoded.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields this build does not know about, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnknownFields(Map<String, Value>);

impl UnknownFields {
    /// Returns the value of an unknown field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets an unknown field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Returns true if no unknown fields were seen.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of unknown fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Path of an object relative to the root anchor.
///
/// Stored as its elements; `"/a/b"` and `"a/b/"` name the same object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPath {
    /// Path elements from the root anchor downwards.
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl ObjectPath {
    /// The root anchor itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a slash-separated path, ignoring empty elements.
    pub fn parse(path: &str) -> Self {
        Self {
            elements: path
                .split('/')
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect(),
            unknown: UnknownFields::default(),
        }
    }

    /// Returns true for the root anchor.
    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }

    /// Last element, if any.
    pub fn name(&self) -> Option<&str> {
        self.elements.last().map(String::as_str)
    }

    /// Returns this path extended by one element.
    pub fn join(&self, element: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.elements.push(element.into());
        child
    }
}

impl From<&str> for ObjectPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for ObjectPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return f.write_str("/");
        }
        for element in &self.elements {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}

/// Kind of a synced object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    #[default]
    File,
    Folder,
    SharedFolder,
}

/// One content branch of a file. Branch `0` is the master branch; others are
/// conflicts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch index.
    pub kidx: u32,
    /// Content length in bytes.
    pub length: u64,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<DateTime<Utc>>,
    /// Device that last contributed to this branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// Attributes of a file or folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectAttributes {
    pub object_type: ObjectType,
    /// Content branches; empty for folders.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<Branch>,
    /// Whether the object is excluded from sync on this device.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub excluded: bool,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl ObjectAttributes {
    /// Creates attributes for an object of the given type.
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            ..Default::default()
        }
    }

    /// Builder: add a branch.
    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    /// Builder: set excluded.
    pub fn with_excluded(mut self, excluded: bool) -> Self {
        self.excluded = excluded;
        self
    }
}

/// A folder child and its attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildAttributes {
    pub name: String,
    pub attributes: ObjectAttributes,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// Access role on a shared folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    #[default]
    Editor,
    Viewer,
}

/// A user or group and the role granted to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectPermissions {
    pub subject: String,
    pub role: Role,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl SubjectPermissions {
    /// Creates a permission entry.
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
            unknown: UnknownFields::default(),
        }
    }
}

/// A shared folder known to this device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedFolder {
    pub name: String,
    pub path: ObjectPath,
    /// Store identifier, hex encoded.
    pub store_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<SubjectPermissions>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// A pending invitation to join a shared folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub share_id: String,
    pub folder_name: String,
    pub sharer: String,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// A file with at least one conflict branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictedPath {
    pub path: ObjectPath,
    /// Number of branches, master included.
    pub branch_count: u32,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// One entry of the activity log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Human readable description.
    pub message: String,
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<ObjectPath>,
    /// Devices or users that caused the activity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// Child of a folder in revision history, possibly deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevChild {
    pub name: String,
    pub dir: bool,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// One stored revision of a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    /// Opaque revision index assigned by the daemon.
    pub index: Vec<u8>,
    pub mtime: DateTime<Utc>,
    pub length: u64,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// Sync progress of an object or device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    Unknown,
    InSync,
    InProgress,
    Offline,
}

/// Sync state of an object on one remote device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSyncStatus {
    pub device: String,
    pub state: SyncState,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// Local sync state of a path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathStatus {
    pub path: ObjectPath,
    pub state: SyncState,
    /// Whether the path has unresolved conflicts.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub conflict: bool,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// A named daemon statistic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub name: String,
    pub value: String,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// Health of one network transport of the daemon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportDiagnostics {
    pub name: String,
    pub healthy: bool,
    pub peer_count: u32,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

/// Snapshot of daemon internals for troubleshooting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub device_id: String,
    pub uptime_seconds: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transports: Vec<TransportDiagnostics>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_parse_and_display() {
        let path = ObjectPath::parse("/a//b/");
        assert_eq!(path.elements, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(path.to_string(), "/a/b");
        assert_eq!(path.name(), Some("b"));
        assert_eq!(ObjectPath::from("a/b"), path);
    }

    #[test]
    fn object_path_root() {
        let root = ObjectPath::root();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "/");
        assert_eq!(root.join("docs").to_string(), "/docs");
    }

    #[test]
    fn object_path_serde_shape() {
        let json = serde_json::to_string(&ObjectPath::parse("/x/y")).unwrap();
        assert_eq!(json, r#"{"elements":["x","y"]}"#);
    }

    #[test]
    fn nested_unknown_fields_are_kept() {
        let json = r#"{"name":"docs","attributes":{"object_type":"folder","acl":"rw"},"inode":7}"#;
        let child: ChildAttributes = serde_json::from_str(json).unwrap();
        assert_eq!(child.attributes.object_type, ObjectType::Folder);
        assert_eq!(child.attributes.unknown.len(), 1);
        assert_eq!(child.unknown.get("inode"), Some(&Value::from(7)));

        let back: Value = serde_json::to_value(&child).unwrap();
        assert_eq!(back["inode"], Value::from(7));
        assert_eq!(back["attributes"]["acl"], Value::from("rw"));
    }

    #[test]
    fn attributes_skip_defaults() {
        let json = serde_json::to_string(&ObjectAttributes::new(ObjectType::File)).unwrap();
        assert_eq!(json, r#"{"object_type":"file"}"#);
    }

    #[test]
    fn revision_index_is_a_byte_string() {
        let revision = Revision {
            index: vec![0, 255, 7],
            mtime: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            length: 42,
            unknown: UnknownFields::default(),
        };
        let json = serde_json::to_string(&revision).unwrap();
        let parsed: Revision = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, revision);
    }
}
