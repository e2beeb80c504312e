//! Session credential payload

use crate::error::{ParleyError, Result};
use serde::Deserialize;
use std::fmt;

/// Short-lived authorization payload permitting the client to join one
/// real-time room instance.
///
/// Produced once per fetch and never persisted. The token is opaque and
/// time-limited; a stale set is discarded rather than reused across restarts.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    pub server_url: String,
    pub room_name: String,
    pub participant_name: String,
    pub participant_token: String,
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("server_url", &self.server_url)
            .field("room_name", &self.room_name)
            .field("participant_name", &self.participant_name)
            .field("participant_token", &"[REDACTED]")
            .finish()
    }
}

impl SessionCredentials {
    /// Check that every field is a non-empty string.
    ///
    /// A response missing any field is treated as malformed rather than
    /// handed to the transport, where it would fail much less legibly.
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("serverUrl", &self.server_url),
            ("roomName", &self.room_name),
            ("participantName", &self.participant_name),
            ("participantToken", &self.participant_token),
        ]
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name);

        match missing {
            Some(field) => Err(ParleyError::MalformedCredentials(format!(
                "field '{}' is missing or empty",
                field
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionCredentials {
        SessionCredentials {
            server_url: "wss://voice.example.com".to_string(),
            room_name: "room_1234".to_string(),
            participant_name: "user".to_string(),
            participant_token: "jwt-token".to_string(),
        }
    }

    #[test]
    fn test_valid_credentials() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_empty_field_is_malformed() {
        let mut creds = sample();
        creds.participant_token = "  ".to_string();
        let err = creds.validate().unwrap_err();
        assert!(matches!(err, ParleyError::MalformedCredentials(_)));
        assert!(err.to_string().contains("participantToken"));
    }

    #[test]
    fn test_deserializes_backend_shape() {
        let json = r#"{
            "serverUrl": "wss://voice.example.com",
            "roomName": "room_1234",
            "participantName": "user",
            "participantToken": "jwt-token"
        }"#;
        let creds: SessionCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds, sample());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", sample());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("jwt-token"));
    }
}
