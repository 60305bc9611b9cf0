//! Input checks applied before messages reach the transcript core

use crate::error::{Result, TranscriptError};
use crate::model::CanonicalMessage;

/// Messages must be ascending by `created_at`; equal timestamps are allowed.
/// Reports the index of the first message older than its predecessor.
pub fn ensure_chronological(messages: &[CanonicalMessage]) -> Result<()> {
    match messages
        .windows(2)
        .position(|pair| pair[1].created_at < pair[0].created_at)
    {
        Some(i) => Err(TranscriptError::OutOfOrder { index: i + 1 }),
        None => Ok(()),
    }
}

/// Validates a user-supplied channel name for headers and archive paths
pub fn validate_channel_name(name: &str) -> std::result::Result<(), String> {
    let name = name.trim_start_matches('#');
    if name.is_empty() {
        return Err("Channel name cannot be empty".to_string());
    }

    if name.chars().count() > 100 {
        return Err("Channel name too long (max 100 characters)".to_string());
    }

    if name.contains(|c: char| c.is_control()) {
        return Err("Channel name contains invalid characters".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;
    use chrono::{TimeZone, Utc};

    fn msg(minute: u32) -> CanonicalMessage {
        CanonicalMessage::new(
            User::new("1", "alice"),
            "hi",
            Utc.with_ymd_and_hms(2026, 10, 17, 12, minute, 0).unwrap(),
        )
    }

    #[test]
    fn test_chronological_input() {
        assert!(ensure_chronological(&[]).is_ok());
        assert!(ensure_chronological(&[msg(1)]).is_ok());
        assert!(ensure_chronological(&[msg(1), msg(1), msg(2)]).is_ok());
    }

    #[test]
    fn test_out_of_order_reports_index() {
        let result = ensure_chronological(&[msg(1), msg(3), msg(2)]);
        assert!(matches!(result, Err(TranscriptError::OutOfOrder { index: 2 })));
    }

    #[test]
    fn test_validate_channel_name() {
        assert!(validate_channel_name("#support").is_ok());
        assert!(validate_channel_name("general").is_ok());
        assert!(validate_channel_name("#").is_err());
        assert!(validate_channel_name("bad\nname").is_err());
        assert!(validate_channel_name(&"x".repeat(101)).is_err());
    }
}
