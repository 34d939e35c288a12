// ABOUTME: Wire message definitions for the remote mirror channel
// Every message is one internally tagged JSON object on the /app namespace

use serde::{Deserialize, Serialize};

// ============================================
// Outbound Messages
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    StartProject(StartProjectPayload),
    CreateFile(FilePayload),
    UpdateFile(FilePayload),
    DeleteFile(PathPayload),
    CreateFolder(PathPayload),
    DeleteFolder(PathPayload),
}

/// Announcement sent first on every (re)connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartProjectPayload {
    pub name: String,
}

/// Create-or-update occurrence for a file. Content is present only when the
/// content policy allowed the read and the read succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilePayload {
    pub path: String,
    pub can_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Path-only occurrence: folder creation and file/folder deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathPayload {
    pub path: String,
}

// ============================================
// Helper constructors
// ============================================

impl OutboundMessage {
    pub fn start_project(name: impl Into<String>) -> Self {
        Self::StartProject(StartProjectPayload { name: name.into() })
    }

    pub fn create_file(path: impl Into<String>, can_read: bool, content: Option<String>) -> Self {
        Self::CreateFile(FilePayload {
            path: path.into(),
            can_read,
            content,
        })
    }

    pub fn update_file(path: impl Into<String>, can_read: bool, content: Option<String>) -> Self {
        Self::UpdateFile(FilePayload {
            path: path.into(),
            can_read,
            content,
        })
    }

    pub fn delete_file(path: impl Into<String>) -> Self {
        Self::DeleteFile(PathPayload { path: path.into() })
    }

    pub fn create_folder(path: impl Into<String>) -> Self {
        Self::CreateFolder(PathPayload { path: path.into() })
    }

    pub fn delete_folder(path: impl Into<String>) -> Self {
        Self::DeleteFolder(PathPayload { path: path.into() })
    }

    /// Wire name of the message, as carried in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartProject(_) => "start_project",
            Self::CreateFile(_) => "create_file",
            Self::UpdateFile(_) => "update_file",
            Self::DeleteFile(_) => "delete_file",
            Self::CreateFolder(_) => "create_folder",
            Self::DeleteFolder(_) => "delete_folder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names_match_catalogue() {
        let json = serde_json::to_string(&OutboundMessage::start_project("demo")).unwrap();
        assert!(json.contains("\"type\":\"start_project\""));
        assert!(json.contains("\"name\":\"demo\""));

        let json =
            serde_json::to_string(&OutboundMessage::delete_folder("./build")).unwrap();
        assert!(json.contains("\"type\":\"delete_folder\""));
        assert!(json.contains("\"path\":\"./build\""));
    }

    #[test]
    fn test_content_field_is_omitted_when_absent() {
        let msg = OutboundMessage::create_file("./big.bin", false, None);
        let json = serde_json::to_string(&msg).unwrap();

        assert!(json.contains("\"can_read\":false"));
        assert!(!json.contains("content"));
    }

    #[test]
    fn test_content_field_is_present_when_included() {
        let msg = OutboundMessage::update_file("./a.txt", true, Some("hello".to_string()));
        let json = serde_json::to_string(&msg).unwrap();

        assert!(json.contains("\"content\":\"hello\""));
    }

    #[test]
    fn test_round_trip_through_tag() {
        let msg = OutboundMessage::create_folder("./src");
        let json = serde_json::to_string(&msg).unwrap();
        let back: OutboundMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(back, msg);
        assert_eq!(back.kind(), "create_folder");
    }
}
