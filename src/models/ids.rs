//! Identity newtypes for owners and teams.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a league member, independent of season.
///
/// The upstream provider hands these out as opaque strings (usually a
/// braced GUID such as `{8A2E...}`), so no format is assumed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

impl From<String> for OwnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Season-scoped team number. The same number can belong to different
/// owners in different years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TeamId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_id_serializes_as_plain_string() {
        let id = OwnerId::from("{ABC-123}");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"{ABC-123}\"");

        let parsed: OwnerId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_owner_id_display_and_debug() {
        let id = OwnerId::new("owner-1");
        assert_eq!(format!("{}", id), "owner-1");
        assert!(format!("{:?}", id).contains("owner-1"));
    }

    #[test]
    fn test_team_id_transparent() {
        let json = serde_json::to_string(&TeamId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_owner_ids_order_lexically() {
        let mut ids = vec![OwnerId::from("b"), OwnerId::from("a")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "a");
    }
}
