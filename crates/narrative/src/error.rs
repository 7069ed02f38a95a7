use std::fmt;

/// The only two failure classes the host has to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeError {
    /// The backend does not know the requested entity (bad country name,
    /// revoked key). Retrying the same request will not help.
    NotFound,
    /// Anything recoverable: network hiccup, malformed payload, generation
    /// still warming up. Safe to retry.
    Transient(String),
}

impl fmt::Display for NarrativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrativeError::NotFound => write!(f, "requested entity was not found"),
            NarrativeError::Transient(msg) => write!(f, "transient narrative failure: {msg}"),
        }
    }
}

impl std::error::Error for NarrativeError {}

/// Classify a raw backend error message the way the original client did:
/// the upstream service reports unknown entities with a fixed phrase, and
/// everything else is treated as retryable.
pub fn classify_message(message: &str) -> NarrativeError {
    if message.contains("Requested entity was not found") {
        NarrativeError::NotFound
    } else {
        NarrativeError::Transient(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{NarrativeError, classify_message};

    #[test]
    fn unknown_entity_phrase_maps_to_not_found() {
        let err = classify_message("Error: Requested entity was not found.");
        assert_eq!(err, NarrativeError::NotFound);
    }

    #[test]
    fn other_messages_are_transient() {
        let err = classify_message("fetch failed: connection reset");
        assert!(matches!(err, NarrativeError::Transient(_)));
    }

    #[test]
    fn display_is_presentable() {
        assert_eq!(
            NarrativeError::NotFound.to_string(),
            "requested entity was not found"
        );
    }
}
