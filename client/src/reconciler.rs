use common::messages::Announcement;
use common::Outcome;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reconciled {
    Adopted,
    Unchanged,
}

// Both peers evaluate the board on their own and both may announce. Each side
// announces at most once per session, and an announcement that matches what
// is already displayed changes nothing, so the two signals cannot echo back
// and forth.
#[derive(Debug, Default)]
pub struct TerminationReconciler {
    outcome: Outcome,
    announced: bool,
}

impl TerminationReconciler {
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_resolved()
    }

    // Returns the announcement to broadcast, if this detection warrants one
    pub fn record_local(&mut self, room_id: &str, outcome: Outcome) -> Option<Announcement> {
        if !outcome.is_resolved() || self.announced {
            return None;
        }
        if self.outcome == outcome {
            debug!("Local outcome {} already adopted from peer", outcome);
            return None;
        }
        if self.outcome.is_resolved() {
            warn!(
                "Local evaluation found {} but {} is already displayed",
                outcome, self.outcome
            );
        }
        info!("Detected outcome {} in room {}", outcome, room_id);
        self.outcome = outcome;
        self.announced = true;
        Announcement::new(room_id.to_string(), outcome)
    }

    // Peer announcements are last-write-wins and never re-broadcast
    pub fn receive(&mut self, announcement: &Announcement) -> Reconciled {
        let announced = announcement.outcome();
        if self.outcome == announced {
            debug!("Peer confirmed outcome {}", announced);
            return Reconciled::Unchanged;
        }
        if self.outcome.is_resolved() {
            warn!(
                "Peer announced {} while {} is displayed, adopting the peer's",
                announced, self.outcome
            );
        } else {
            info!("Adopting outcome {} announced by peer", announced);
        }
        self.outcome = announced;
        Reconciled::Adopted
    }

    pub fn reset(&mut self) {
        self.outcome = Outcome::InProgress;
        self.announced = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Symbol;

    fn announcement(winner: Option<Symbol>) -> Announcement {
        Announcement {
            room_id: "room1".to_string(),
            winner,
        }
    }

    #[test]
    fn test_in_progress_is_not_announced() {
        let mut reconciler = TerminationReconciler::default();
        assert!(reconciler
            .record_local("room1", Outcome::InProgress)
            .is_none());
        assert!(!reconciler.is_resolved());
    }

    #[test]
    fn test_local_detection_announces_once() {
        let mut reconciler = TerminationReconciler::default();
        assert_eq!(
            reconciler.record_local("room1", Outcome::Won(Symbol::X)),
            Some(announcement(Some(Symbol::X)))
        );
        assert!(reconciler
            .record_local("room1", Outcome::Won(Symbol::X))
            .is_none());
        assert_eq!(reconciler.outcome(), Outcome::Won(Symbol::X));
    }

    #[test]
    fn test_matching_peer_announcement_is_unchanged() {
        let mut reconciler = TerminationReconciler::default();
        reconciler.record_local("room1", Outcome::Won(Symbol::O));
        let peer = announcement(Some(Symbol::O));
        assert_eq!(reconciler.receive(&peer), Reconciled::Unchanged);
        assert_eq!(reconciler.receive(&peer), Reconciled::Unchanged);
        assert_eq!(reconciler.outcome(), Outcome::Won(Symbol::O));
    }

    #[test]
    fn test_peer_announcement_first_suppresses_local_announcement() {
        let mut reconciler = TerminationReconciler::default();
        assert_eq!(reconciler.receive(&announcement(None)), Reconciled::Adopted);
        assert_eq!(reconciler.outcome(), Outcome::Draw);
        assert!(reconciler.record_local("room1", Outcome::Draw).is_none());
    }

    #[test]
    fn test_conflicting_peer_announcement_wins() {
        let mut reconciler = TerminationReconciler::default();
        reconciler.record_local("room1", Outcome::Draw);
        assert_eq!(
            reconciler.receive(&announcement(Some(Symbol::X))),
            Reconciled::Adopted
        );
        assert_eq!(reconciler.outcome(), Outcome::Won(Symbol::X));
    }

    #[test]
    fn test_reset() {
        let mut reconciler = TerminationReconciler::default();
        reconciler.record_local("room1", Outcome::Draw);
        reconciler.reset();
        assert_eq!(reconciler.outcome(), Outcome::InProgress);
        assert!(reconciler.record_local("room2", Outcome::Draw).is_some());
    }
}
