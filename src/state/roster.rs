//! Roster: the registry of live sessions and the usernames they hold.

use crate::state::session::{Phase, SessionId};
use natter_proto::{MAX_USERNAME_LEN, Reply};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;

/// Outcome of a username claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The name now belongs to the claiming session.
    Claimed,
    /// Another session already owns the name.
    Taken,
    /// The name is empty or longer than [`MAX_USERNAME_LEN`] bytes.
    Invalid,
}

/// Write handle for one session, as handed out to the dispatcher.
#[derive(Debug, Clone)]
pub struct Peer {
    /// Session the handle belongs to.
    pub id: SessionId,
    /// Queue of records awaiting the session's writer task.
    pub tx: mpsc::UnboundedSender<Reply>,
}

#[derive(Debug)]
struct Member {
    username: Option<String>,
    phase: Phase,
    tx: mpsc::UnboundedSender<Reply>,
}

/// The set of live sessions and claimed usernames.
///
/// Everything sits behind a single mutex so that `claim_username` can check
/// the name set and flip the session to Chatting as one atomic step. The
/// lock is never held across an await point.
#[derive(Debug, Default)]
pub struct Roster {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<SessionId, Member>,
    names: HashSet<String>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly accepted session in PasswordWait.
    pub fn insert(&self, id: SessionId, tx: mpsc::UnboundedSender<Reply>) {
        let mut inner = self.inner.lock();
        inner.sessions.insert(
            id,
            Member {
                username: None,
                phase: Phase::PasswordWait,
                tx,
            },
        );
    }

    /// Move a session to a new phase. Unknown ids are ignored.
    pub fn set_phase(&self, id: SessionId, phase: Phase) {
        let mut inner = self.inner.lock();
        if let Some(member) = inner.sessions.get_mut(&id) {
            member.phase = phase;
        }
    }

    /// Drop a session, releasing its username if it held one.
    ///
    /// Returns the released username.
    pub fn remove(&self, id: SessionId) -> Option<String> {
        let mut inner = self.inner.lock();
        let member = inner.sessions.remove(&id)?;
        if let Some(name) = &member.username {
            inner.names.remove(name);
        }
        member.username
    }

    /// Validate `name` and, in one atomic step, claim it for the session
    /// and move the session to Chatting.
    pub fn claim_username(&self, id: SessionId, name: &str) -> ClaimOutcome {
        if name.is_empty() || name.len() > MAX_USERNAME_LEN {
            return ClaimOutcome::Invalid;
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.names.contains(name) {
            return ClaimOutcome::Taken;
        }
        let Some(member) = inner.sessions.get_mut(&id) else {
            return ClaimOutcome::Invalid;
        };
        member.username = Some(name.to_string());
        member.phase = Phase::Chatting;
        inner.names.insert(name.to_string());
        ClaimOutcome::Claimed
    }

    /// Point-in-time copy of every Chatting session's write handle.
    ///
    /// Fan-out proceeds against the copy even if members leave in the
    /// meantime; sends to departed peers fail and are ignored.
    pub fn snapshot_chatting(&self) -> Vec<Peer> {
        let inner = self.inner.lock();
        inner
            .sessions
            .iter()
            .filter(|(_, member)| member.phase == Phase::Chatting)
            .map(|(id, member)| Peer {
                id: *id,
                tx: member.tx.clone(),
            })
            .collect()
    }

    /// Number of live sessions in any phase.
    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    /// True when no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::SessionIdGen;

    fn member(roster: &Roster, ids: &SessionIdGen) -> (SessionId, mpsc::UnboundedReceiver<Reply>) {
        let id = ids.next();
        let (tx, rx) = mpsc::unbounded_channel();
        roster.insert(id, tx);
        (id, rx)
    }

    #[test]
    fn test_claim_moves_session_to_chatting() {
        let roster = Roster::new();
        let ids = SessionIdGen::new();
        let (alice, _rx_a) = member(&roster, &ids);
        let (_bob, _rx_b) = member(&roster, &ids);

        assert!(roster.snapshot_chatting().is_empty());
        assert_eq!(roster.claim_username(alice, "alice"), ClaimOutcome::Claimed);

        let snapshot = roster.snapshot_chatting();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, alice);
    }

    #[test]
    fn test_claim_taken() {
        let roster = Roster::new();
        let ids = SessionIdGen::new();
        let (alice, _rx_a) = member(&roster, &ids);
        let (bob, _rx_b) = member(&roster, &ids);

        assert_eq!(roster.claim_username(alice, "dana"), ClaimOutcome::Claimed);
        assert_eq!(roster.claim_username(bob, "dana"), ClaimOutcome::Taken);
    }

    #[test]
    fn test_claim_rejects_empty_and_oversize_names() {
        let roster = Roster::new();
        let ids = SessionIdGen::new();
        let (id, _rx) = member(&roster, &ids);

        assert_eq!(roster.claim_username(id, ""), ClaimOutcome::Invalid);
        assert_eq!(
            roster.claim_username(id, &"x".repeat(MAX_USERNAME_LEN + 1)),
            ClaimOutcome::Invalid
        );
        // Exactly at the cap is fine.
        assert_eq!(
            roster.claim_username(id, &"x".repeat(MAX_USERNAME_LEN)),
            ClaimOutcome::Claimed
        );
    }

    #[test]
    fn test_claim_unknown_session() {
        let roster = Roster::new();
        let ids = SessionIdGen::new();
        let stranger = ids.next();
        assert_eq!(
            roster.claim_username(stranger, "ghost"),
            ClaimOutcome::Invalid
        );
    }

    #[test]
    fn test_remove_releases_username() {
        let roster = Roster::new();
        let ids = SessionIdGen::new();
        let (alice, _rx_a) = member(&roster, &ids);
        let (bob, _rx_b) = member(&roster, &ids);

        assert_eq!(roster.claim_username(alice, "dana"), ClaimOutcome::Claimed);
        assert_eq!(roster.remove(alice), Some("dana".to_string()));
        assert_eq!(roster.claim_username(bob, "dana"), ClaimOutcome::Claimed);
    }

    #[test]
    fn test_remove_before_login_returns_no_name() {
        let roster = Roster::new();
        let ids = SessionIdGen::new();
        let (id, _rx) = member(&roster, &ids);

        assert_eq!(roster.remove(id), None);
        assert_eq!(roster.remove(id), None);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_set_phase_does_not_affect_snapshot_until_chatting() {
        let roster = Roster::new();
        let ids = SessionIdGen::new();
        let (id, _rx) = member(&roster, &ids);

        roster.set_phase(id, Phase::LoginWait);
        assert!(roster.snapshot_chatting().is_empty());
        roster.set_phase(id, Phase::Chatting);
        assert_eq!(roster.snapshot_chatting().len(), 1);
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        let roster = Roster::new();
        let ids = SessionIdGen::new();
        let (alice, rx_a) = member(&roster, &ids);
        roster.claim_username(alice, "alice");

        let snapshot = roster.snapshot_chatting();
        roster.remove(alice);
        drop(rx_a);

        // The copy still holds the departed peer; a send simply fails.
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot[0].tx.send(Reply::Ok).is_err());
    }
}
