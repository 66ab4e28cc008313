// Vote session domain models.
//
// Sessions live only in memory: a process restart loses open votes, which
// matches the reference behavior.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Votes needed on either side to resolve a session. Fixed, not
/// configurable.
pub const QUORUM: usize = 3;

/// Sessions are keyed by the chat and the ballot message the bot posted.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct SessionKey {
    pub chat_id: i64,
    pub ballot_message_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChoice {
    Confirm,
    Cancel,
}

/// One open ban vote.
#[derive(Debug, Clone)]
pub struct VoteSession {
    pub target_user_id: u64,
    pub target_message_id: i32,
    pub command_message_id: i32,
    pub initiator: u64,
    pub confirms: HashSet<u64>,
    pub cancels: HashSet<u64>,
    pub opened_at: DateTime<Utc>,
}

impl VoteSession {
    /// The initiator counts as the first confirming voter.
    pub fn new(
        initiator: u64,
        target_user_id: u64,
        target_message_id: i32,
        command_message_id: i32,
    ) -> Self {
        let mut confirms = HashSet::new();
        confirms.insert(initiator);
        Self {
            target_user_id,
            target_message_id,
            command_message_id,
            initiator,
            confirms,
            cancels: HashSet::new(),
            opened_at: Utc::now(),
        }
    }

    pub fn tally(&self) -> Tally {
        Tally {
            confirms: self.confirms.len(),
            cancels: self.cancels.len(),
        }
    }
}

/// Current confirm/cancel counts, for re-rendering the ballot keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub confirms: usize,
    pub cancels: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Confirmed,
    Cancelled,
}

/// What happened to a cast vote.
#[derive(Debug, Clone)]
pub enum VoteOutcome {
    /// Vote counted; session stays open with the new tally.
    Recorded(Tally),
    /// The participant already voted; silent no-op.
    Duplicate,
    /// No session under that key (already resolved, or never existed).
    SessionNotFound,
    /// Quorum reached; the session has been removed from the registry and
    /// its final state is handed to the caller for enforcement.
    Resolved {
        resolution: Resolution,
        session: VoteSession,
    },
}
