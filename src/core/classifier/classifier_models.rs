// Classifier domain models - data structures for the spam verdict pipeline.
//
// These are pure domain types with no Telegram dependencies.
// The telegram layer builds a MessageProfile out of an incoming update and
// the enforcement layer consumes the resulting Verdict.

use serde::{Deserialize, Serialize};

/// The classifier's view of one inbound message.
#[derive(Debug, Clone, Default)]
pub struct MessageProfile {
    /// Message text or caption; `None` when the message carries neither.
    pub text: Option<String>,
    /// Whether the message replies to another message.
    pub is_reply: bool,
    /// Whether the author's account is flagged as premium.
    pub from_premium: bool,
}

/// Knobs distinguishing the two deployed classifier variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Count gambling-vocabulary hits as a spam signal.
    pub enable_betting_signal: bool,
    /// Only act on messages from premium accounts that are not replies.
    /// Narrows false positives on ordinary conversational replies.
    pub require_premium_and_non_reply: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enable_betting_signal: true,
            require_premium_and_non_reply: false,
        }
    }
}

/// Per-signal evidence retained for the moderator notification.
///
/// Every signal keeps both its flag/count and the literal matched
/// substrings so operators can see exactly what fired.
#[derive(Debug, Clone, Default)]
pub struct EvidenceReport {
    /// First match of the broad known-spam pattern, if any.
    pub spam_pattern: Option<String>,
    /// First match of a critical (single-hit) pattern, if any.
    pub critical_match: Option<String>,
    /// Tokens mixing Cyrillic and Latin letters.
    pub mixed_words: Vec<String>,
    /// Gambling-vocabulary hits; `None` when the signal is disabled.
    pub betting_tokens: Option<Vec<String>>,
    /// Number of emoji in the text.
    pub emoji_count: usize,
    /// Emoji count exceeded the critical threshold.
    pub emoji_critical: bool,
    /// Four-or-more checkmark run present (raw or glyph-folded).
    pub checkmark_flood: bool,
}

/// The classifier's decision for one message.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub is_spam: bool,
    pub evidence: EvidenceReport,
}

impl Verdict {
    /// A "not spam" verdict with no evidence attached.
    pub fn clean() -> Self {
        Self {
            is_spam: false,
            evidence: EvidenceReport::default(),
        }
    }
}
