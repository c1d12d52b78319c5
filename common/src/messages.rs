use crate::tictactoe::{Move, Outcome, Symbol};
use serde::{Deserialize, Serialize};

pub type RoomId = String;
pub type ParticipantId = String;

// Frames are `{"event": "<name>", "data": <payload>}`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    RequestMatch,
    SubmitMove(SubmitMove),
    AnnounceOutcome(Announcement),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    PairingFound(RoomId),
    MatchStart(MatchStart),
    MoveMade(Move),
    AnnounceOutcome(Announcement),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchStart {
    pub room_id: RoomId,
    pub first_mover_id: ParticipantId,
    pub first_mover_symbol: Symbol,
    pub second_mover_symbol: Symbol,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMove {
    pub room_id: RoomId,
    pub cell_index: usize,
    pub symbol: Symbol,
}

impl SubmitMove {
    pub fn new(room_id: RoomId, mv: Move) -> Self {
        SubmitMove {
            room_id,
            cell_index: mv.cell_index,
            symbol: mv.symbol,
        }
    }

    pub fn to_move(&self) -> Move {
        Move::new(self.cell_index, self.symbol)
    }
}

// `winner` is None for a draw
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub room_id: RoomId,
    pub winner: Option<Symbol>,
}

impl Announcement {
    pub fn new(room_id: RoomId, outcome: Outcome) -> Option<Self> {
        outcome.winner().map(|winner| Announcement { room_id, winner })
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_winner(self.winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_value};

    #[test]
    fn test_request_match_wire_format() {
        assert_eq!(
            to_value(ClientEvent::RequestMatch).unwrap(),
            json!({ "event": "request-match" })
        );
        let parsed: ClientEvent = from_str("{\"event\":\"request-match\"}").unwrap();
        assert_eq!(parsed, ClientEvent::RequestMatch);
    }

    #[test]
    fn test_submit_move_wire_format() {
        let event = ClientEvent::SubmitMove(SubmitMove::new(
            "room1".to_string(),
            Move::new(2, Symbol::X),
        ));
        assert_eq!(
            to_value(event).unwrap(),
            json!({
                "event": "submit-move",
                "data": { "roomId": "room1", "cellIndex": 2, "symbol": "X" }
            })
        );
    }

    #[test]
    fn test_parse_server_events() {
        let found: ServerEvent =
            from_str("{\"event\":\"pairing-found\",\"data\":\"room1\"}").unwrap();
        assert_eq!(found, ServerEvent::PairingFound("room1".to_string()));

        let start: ServerEvent = from_str(
            "{\"event\":\"match-start\",\"data\":{\"roomId\":\"room1\",\"firstMoverId\":\"abc\",\
             \"firstMoverSymbol\":\"O\",\"secondMoverSymbol\":\"X\"}}",
        )
        .unwrap();
        assert_eq!(
            start,
            ServerEvent::MatchStart(MatchStart {
                room_id: "room1".to_string(),
                first_mover_id: "abc".to_string(),
                first_mover_symbol: Symbol::O,
                second_mover_symbol: Symbol::X,
            })
        );

        let moved: ServerEvent =
            from_str("{\"event\":\"move-made\",\"data\":{\"cellIndex\":7,\"symbol\":\"O\"}}")
                .unwrap();
        assert_eq!(moved, ServerEvent::MoveMade(Move::new(7, Symbol::O)));
    }

    #[test]
    fn test_draw_announcement_has_null_winner() {
        let announcement = Announcement::new("room1".to_string(), Outcome::Draw).unwrap();
        assert_eq!(
            to_value(ServerEvent::AnnounceOutcome(announcement.clone())).unwrap(),
            json!({
                "event": "announce-outcome",
                "data": { "roomId": "room1", "winner": null }
            })
        );
        assert_eq!(announcement.outcome(), Outcome::Draw);
    }

    #[test]
    fn test_nothing_to_announce_in_progress() {
        assert!(Announcement::new("room1".to_string(), Outcome::InProgress).is_none());
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(from_str::<ServerEvent>("{\"event\":\"start-game\",\"data\":{}}").is_err());
        assert!(from_str::<ServerEvent>("ping").is_err());
    }
}
