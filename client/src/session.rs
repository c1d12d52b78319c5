use common::messages::RoomId;
use common::Symbol;

// Created when matchmaking completes and dropped on reset. Turn ownership is
// flipped locally after each sent or received move; nothing arbitrates it.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionDescriptor {
    room_id: RoomId,
    local_symbol: Symbol,
    is_local_turn: bool,
}

impl SessionDescriptor {
    pub fn new(room_id: RoomId, local_symbol: Symbol, is_local_turn: bool) -> Self {
        SessionDescriptor {
            room_id,
            local_symbol,
            is_local_turn,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn local_symbol(&self) -> Symbol {
        self.local_symbol
    }

    pub fn is_local_turn(&self) -> bool {
        self.is_local_turn
    }

    pub fn in_room(&self, room_id: &str) -> bool {
        self.room_id == room_id
    }

    pub fn end_local_turn(&mut self) {
        self.is_local_turn = false;
    }

    pub fn start_local_turn(&mut self) {
        self.is_local_turn = true;
    }
}
