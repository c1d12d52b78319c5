use crate::machine::Phase;
use crate::relay::Relay;
use crate::session::SessionDescriptor;
use common::messages::{ClientEvent, MatchStart, ParticipantId, RoomId};
use tracing::{info, warn};

// Turns relay pairing notifications into a session. The participant id is the
// identity the relay assigned at registration, and is what `match-start`
// names as the first mover.
#[derive(Debug, Clone)]
pub struct Matchmaker {
    local_id: ParticipantId,
}

impl Matchmaker {
    pub fn new(local_id: ParticipantId) -> Self {
        Matchmaker { local_id }
    }

    // Only a participant without a live game may search
    pub fn request_match(&self, phase: &Phase, relay: &impl Relay) -> Option<Phase> {
        if !matches!(phase, Phase::Idle | Phase::Terminal) {
            warn!("Ignoring match request while {:?}", phase);
            return None;
        }
        if let Err(err) = relay.send(&ClientEvent::RequestMatch) {
            // The search still starts locally; a dead relay surfaces as an indefinite wait
            warn!("Failed to send match request: {}", err);
        }
        info!("{} searching for a match", self.local_id);
        Some(Phase::Searching)
    }

    // Advisory only: the room id from `match-start` is the one that counts
    pub fn pairing_found(&self, phase: &Phase, room_id: RoomId) -> Option<Phase> {
        match phase {
            Phase::Searching => {
                info!("{} paired into room {}", self.local_id, room_id);
                Some(Phase::Matched { room_id })
            }
            _ => {
                warn!("Ignoring pairing for room {} while {:?}", room_id, phase);
                None
            }
        }
    }

    pub fn match_start(&self, phase: &Phase, start: &MatchStart) -> Option<SessionDescriptor> {
        match phase {
            Phase::Searching => {}
            Phase::Matched { room_id } if *room_id == start.room_id => {}
            _ => {
                warn!("Ignoring start of room {} while {:?}", start.room_id, phase);
                return None;
            }
        }
        if start.first_mover_symbol == start.second_mover_symbol {
            warn!(
                "Ignoring start of room {}: both movers were assigned {}",
                start.room_id, start.first_mover_symbol
            );
            return None;
        }
        let moves_first = start.first_mover_id == self.local_id;
        let local_symbol = if moves_first {
            start.first_mover_symbol
        } else {
            start.second_mover_symbol
        };
        info!(
            "{} playing {} in room {} (moves first: {})",
            self.local_id, local_symbol, start.room_id, moves_first
        );
        Some(SessionDescriptor::new(
            start.room_id.clone(),
            local_symbol,
            moves_first,
        ))
    }
}
