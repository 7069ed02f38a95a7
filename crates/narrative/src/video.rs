//! Poll model for the long-running cinematic video generation.
//!
//! The backend exposes an operation resource that flips `done` after several
//! polls. The client polls on a fixed cadence and surfaces a staged progress
//! message each time so the host HUD always has something alive to show.

use serde::Deserialize;

use crate::error::NarrativeError;

/// Fixed poll cadence while the operation is running.
pub const POLL_INTERVAL_MS: u32 = 10_000;

/// Video generation operation as reported by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOperation {
    /// Server-side operation name, used to build the poll URL.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub done: bool,
    /// Download URI, present once `done` is true and generation succeeded.
    #[serde(default)]
    pub uri: Option<String>,
}

impl VideoOperation {
    /// Extract the download URI of a finished operation. A finished operation
    /// without a URI means the result was lost upstream; that is retryable.
    pub fn download_uri(&self) -> Result<&str, NarrativeError> {
        self.uri
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| NarrativeError::Transient("the vision was lost in transit".to_string()))
    }
}

pub fn parse_operation(body: &str) -> Result<VideoOperation, NarrativeError> {
    serde_json::from_str(body.trim()).map_err(|e| NarrativeError::Transient(e.to_string()))
}

/// Progress message for the `n`-th observation of the operation (0-based,
/// before the first request has been sent).
pub fn progress_message(country: &str, poll_count: u32) -> String {
    match poll_count {
        0 => format!("Aligning with the heartbeat of {country}..."),
        1 => "Capturing the essence...".to_string(),
        _ => "Synthesizing the landscape...".to_string(),
    }
}

/// Hands out progress messages across the create/poll lifecycle. The caller
/// draws one message before the create request, one right after it, and one
/// per poll wait; the first two therefore fire even when the operation comes
/// back already finished.
#[derive(Debug, Default)]
pub struct ProgressStages {
    next: u32,
}

impl ProgressStages {
    pub fn next_message(&mut self, country: &str) -> String {
        let msg = progress_message(country, self.next);
        self.next += 1;
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::{VideoOperation, parse_operation, progress_message};
    use crate::error::NarrativeError;

    #[test]
    fn pending_operation_parses_without_uri() {
        let op = parse_operation(r#"{"name": "ops/veo-123", "done": false}"#).unwrap();
        assert!(!op.done);
        assert_eq!(op.name.as_deref(), Some("ops/veo-123"));
        assert!(op.uri.is_none());
    }

    #[test]
    fn finished_operation_yields_uri() {
        let op = parse_operation(r#"{"done": true, "uri": "https://cdn/video.mp4"}"#).unwrap();
        assert!(op.done);
        assert_eq!(op.download_uri().unwrap(), "https://cdn/video.mp4");
    }

    #[test]
    fn finished_without_uri_is_transient() {
        let op = VideoOperation {
            done: true,
            ..VideoOperation::default()
        };
        assert!(matches!(
            op.download_uri(),
            Err(NarrativeError::Transient(_))
        ));
    }

    #[test]
    fn empty_uri_counts_as_lost() {
        let op = VideoOperation {
            done: true,
            uri: Some(String::new()),
            ..VideoOperation::default()
        };
        assert!(op.download_uri().is_err());
    }

    #[test]
    fn create_stages_fire_before_any_poll() {
        // The first two messages bracket the create request, so they appear
        // even for an operation that returns with done already true.
        let mut stages = super::ProgressStages::default();
        let first = stages.next_message("Kenya");
        let second = stages.next_message("Kenya");
        assert!(first.contains("Kenya"));
        assert_eq!(second, "Capturing the essence...");
        assert_eq!(stages.next_message("Kenya"), "Synthesizing the landscape...");
    }

    #[test]
    fn progress_messages_advance_through_stages() {
        assert!(progress_message("Kenya", 0).contains("Kenya"));
        assert_eq!(progress_message("Kenya", 1), "Capturing the essence...");
        assert_eq!(
            progress_message("Kenya", 2),
            "Synthesizing the landscape..."
        );
        assert_eq!(progress_message("Kenya", 9), progress_message("Kenya", 2));
    }
}
