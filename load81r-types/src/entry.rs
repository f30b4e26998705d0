//! Structured payloads: directory listings and stat records.
//!
//! Both arrive as JSON. `LS` sends an array of entries inside a `+DATA`
//! block; `STAT` sends a single object inline in its `+OK` line.

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// File or directory name, no path components.
    pub name: String,
    /// Size in bytes (0 for directories on FAT32).
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Metadata for a single path, as returned by `STAT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// Final path component.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Whether the path is a directory.
    pub is_dir: bool,
}

impl DirEntry {
    /// Decode an `LS` payload.
    pub fn decode_listing(payload: &[u8]) -> Result<Vec<DirEntry>, ProtocolError> {
        serde_json::from_slice(payload).map_err(|e| ProtocolError::MalformedPayload {
            what: "listing",
            reason: e.to_string(),
        })
    }
}

impl FileStat {
    /// Decode a `STAT` record.
    pub fn decode(text: &str) -> Result<FileStat, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedPayload {
            what: "stat",
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing() {
        assert_eq!(DirEntry::decode_listing(b"[]").unwrap(), vec![]);
    }

    #[test]
    fn listing_with_files_and_dirs() {
        let json = br#"[{"name":"nex.lua","size":1234,"is_dir":false},{"name":"games","size":0,"is_dir":true}]"#;
        let entries = DirEntry::decode_listing(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "nex.lua");
        assert_eq!(entries[0].size, 1234);
        assert!(!entries[0].is_dir);
        assert!(entries[1].is_dir);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let json = br#"[{"name":"a","size":1,"is_dir":false,"mtime":7}]"#;
        assert_eq!(DirEntry::decode_listing(json).unwrap()[0].name, "a");
    }

    #[test]
    fn garbage_listing_is_malformed() {
        let err = DirEntry::decode_listing(b"[{\"name\":").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedPayload { what: "listing", .. }
        ));
    }

    #[test]
    fn negative_size_is_malformed() {
        let json = br#"[{"name":"a","size":-1,"is_dir":false}]"#;
        assert!(DirEntry::decode_listing(json).is_err());
    }

    #[test]
    fn stat_record() {
        let stat = FileStat::decode(r#"{"name":"load81","size":0,"is_dir":true}"#).unwrap();
        assert_eq!(stat.name, "load81");
        assert!(stat.is_dir);
    }

    #[test]
    fn stat_garbage_is_malformed() {
        assert!(matches!(
            FileStat::decode("not json"),
            Err(ProtocolError::MalformedPayload { what: "stat", .. })
        ));
    }
}
