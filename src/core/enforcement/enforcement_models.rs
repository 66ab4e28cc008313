// Enforcement domain models.

/// Everything the engine needs to know about a message it is about to act
/// on. Captured by the telegram layer before the original can disappear.
#[derive(Debug, Clone)]
pub struct FlaggedMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub author_id: u64,
    /// Display name, already HTML-escaped by the adapter.
    pub author_display_name: String,
    /// Public username for the profile link, when the author has one.
    pub author_username: Option<String>,
    /// Captured text or caption (the classifier guarantees one exists).
    pub content: String,
    /// True when `content` came from a caption on a media message.
    pub is_media: bool,
}

/// What the engine did with one positive verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub deleted: bool,
    pub banned: bool,
    /// Cause of the first delete/ban failure, when enforcement degraded into
    /// a failure report.
    pub failure: Option<String>,
    pub owners_notified: usize,
    pub owners_unreachable: usize,
}

impl ActionOutcome {
    /// Nothing to do: the chat has no registered owners.
    pub fn skipped() -> Self {
        Self {
            deleted: false,
            banned: false,
            failure: None,
            owners_notified: 0,
            owners_unreachable: 0,
        }
    }

    pub fn fully_enforced(&self) -> bool {
        self.deleted && self.banned && self.failure.is_none()
    }
}
