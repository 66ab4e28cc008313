// Vote session tracker - in-memory registry of open ban votes.
//
// The tracker is an injected value, not process-global state, so tests can
// spin up independent instances. Mutation goes through the dashmap entry
// API: the tally update and the quorum check happen under the same shard
// guard, so two concurrent votes on one session cannot both observe a
// pre-increment tally and exactly one resolution fires. Different sessions
// sit on different keys and never serialize against each other. A target
// index enforces one open session per target message under the same
// entry-API discipline.

use super::vote_models::{
    Resolution, SessionKey, Tally, VoteChoice, VoteOutcome, VoteSession, QUORUM,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("A vote is already open under this ballot")]
    SessionExists,

    #[error("A vote already targets this message")]
    TargetAlreadyContested,
}

#[derive(Default)]
pub struct VoteTracker {
    sessions: DashMap<SessionKey, VoteSession>,
    /// Secondary index from (chat, target message) to the ballot key.
    /// `open` claims the target here before inserting the session, so two
    /// concurrent opens on one target cannot both succeed.
    targets: DashMap<(i64, i32), SessionKey>,
}

impl VoteTracker {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            targets: DashMap::new(),
        }
    }

    /// Open a session. Rejected when the ballot key is taken or another
    /// session in the same chat already targets the same message.
    pub fn open(&self, key: SessionKey, session: VoteSession) -> Result<Tally, VoteError> {
        let target = (key.chat_id, session.target_message_id);
        match self.targets.entry(target) {
            Entry::Occupied(_) => return Err(VoteError::TargetAlreadyContested),
            Entry::Vacant(slot) => {
                slot.insert(key);
            }
        }
        match self.sessions.entry(key) {
            Entry::Occupied(_) => {
                self.targets.remove(&target);
                Err(VoteError::SessionExists)
            }
            Entry::Vacant(slot) => {
                let tally = session.tally();
                slot.insert(session);
                Ok(tally)
            }
        }
    }

    /// Record one participant's vote.
    ///
    /// Duplicates (the participant is already in either set) are silent
    /// no-ops, so confirm and cancel stay disjoint per participant. When a
    /// set reaches quorum the session is removed in the same atomic step and
    /// returned for enforcement.
    pub fn cast(&self, key: SessionKey, voter: u64, choice: VoteChoice) -> VoteOutcome {
        match self.sessions.entry(key) {
            Entry::Vacant(_) => VoteOutcome::SessionNotFound,
            Entry::Occupied(mut entry) => {
                let session = entry.get_mut();
                if session.confirms.contains(&voter) || session.cancels.contains(&voter) {
                    return VoteOutcome::Duplicate;
                }
                match choice {
                    VoteChoice::Confirm => session.confirms.insert(voter),
                    VoteChoice::Cancel => session.cancels.insert(voter),
                };

                let resolution = if session.confirms.len() >= QUORUM {
                    Some(Resolution::Confirmed)
                } else if session.cancels.len() >= QUORUM {
                    Some(Resolution::Cancelled)
                } else {
                    None
                };

                match resolution {
                    Some(resolution) => {
                        let (key, session) = entry.remove_entry();
                        self.targets
                            .remove(&(key.chat_id, session.target_message_id));
                        VoteOutcome::Resolved {
                            resolution,
                            session,
                        }
                    }
                    None => VoteOutcome::Recorded(entry.get().tally()),
                }
            }
        }
    }

    /// Whether any open session in this chat targets the given message.
    pub fn targets_message(&self, chat_id: i64, target_message_id: i32) -> bool {
        self.targets.contains_key(&(chat_id, target_message_id))
    }

    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }
}
