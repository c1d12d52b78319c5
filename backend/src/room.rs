use crate::client::{Client, Status};
use common::messages::{ClientEvent, MatchStart, RoomId, ServerEvent};
use common::Symbol;
use hashbrown::HashMap;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

pub type Rooms = Arc<RwLock<HashMap<RoomId, Room>>>;

// The relay has no game logic: a room only knows who is in it
#[derive(Debug, Clone)]
pub struct Room {
    // The participant that was waiting first is stored first
    player_ids: [String; 2],
}

impl Room {
    pub fn new(player_ids: [String; 2]) -> Self {
        Room { player_ids }
    }

    pub fn player_ids(&self) -> &[String; 2] {
        &self.player_ids
    }

    // Given a client's ID, gets the other member of the room
    pub fn opponent_id(&self, id: &str) -> Option<&str> {
        if id == self.player_ids[0] {
            Some(&self.player_ids[1])
        } else if id == self.player_ids[1] {
            Some(&self.player_ids[0])
        } else {
            None
        }
    }
}

pub fn relay_event<R: Rng>(
    id: &str,
    event: ClientEvent,
    clients: &mut HashMap<String, Client>,
    rooms: &mut HashMap<RoomId, Room>,
    rng: &mut R,
) {
    match event {
        ClientEvent::RequestMatch => request_match(id, clients, rooms, rng),
        ClientEvent::SubmitMove(submit) => {
            let event = ServerEvent::MoveMade(submit.to_move());
            forward(id, &submit.room_id, &event, clients, rooms);
        }
        ClientEvent::AnnounceOutcome(announcement) => {
            let room_id = announcement.room_id.clone();
            forward(id, &room_id, &ServerEvent::AnnounceOutcome(announcement), clients, rooms);
        }
    }
}

fn request_match<R: Rng>(
    id: &str,
    clients: &mut HashMap<String, Client>,
    rooms: &mut HashMap<RoomId, Room>,
    rng: &mut R,
) {
    let status = match clients.get(id) {
        Some(c) => c.status.clone(),
        None => {
            error!("Match request from client {} not in list of registered clients", id);
            return;
        }
    };
    match status {
        Status::Searching => {
            info!("client {} is already searching", id);
            return;
        }
        Status::InRoom { room_id } => close_room(&room_id, clients, rooms),
        Status::Idle => {}
    }

    let opponent_id = clients
        .iter()
        .find(|(other_id, c)| {
            other_id.as_str() != id && c.status == Status::Searching && c.sender.is_some()
        })
        .map(|(other_id, _)| other_id.clone());
    match opponent_id {
        Some(opponent_id) => open_room([opponent_id, id.to_string()], clients, rooms, rng),
        None => {
            if let Some(c) = clients.get_mut(id) {
                c.status = Status::Searching;
            }
            info!("client {} waiting for an opponent", id);
        }
    }
}

fn open_room<R: Rng>(
    player_ids: [String; 2],
    clients: &mut HashMap<String, Client>,
    rooms: &mut HashMap<RoomId, Room>,
    rng: &mut R,
) {
    let room_id = Uuid::new_v4().as_simple().to_string();
    let first_mover_id = player_ids[usize::from(rng.gen_bool(0.5))].clone();
    let (first_mover_symbol, second_mover_symbol) = if rng.gen_bool(0.5) {
        (Symbol::X, Symbol::O)
    } else {
        (Symbol::O, Symbol::X)
    };
    let start = ServerEvent::MatchStart(MatchStart {
        room_id: room_id.clone(),
        first_mover_id,
        first_mover_symbol,
        second_mover_symbol,
    });

    for player_id in &player_ids {
        if let Some(client) = clients.get_mut(player_id) {
            client.status = Status::InRoom {
                room_id: room_id.clone(),
            };
            client.send_event(player_id, &ServerEvent::PairingFound(room_id.clone()));
            client.send_event(player_id, &start);
        }
    }
    info!("opened room {} for {:?}", room_id, player_ids);
    rooms.insert(room_id, Room::new(player_ids));
}

fn forward(
    id: &str,
    room_id: &str,
    event: &ServerEvent,
    clients: &HashMap<String, Client>,
    rooms: &HashMap<RoomId, Room>,
) {
    let room = match rooms.get(room_id) {
        Some(v) => v,
        None => {
            warn!("Room with ID {} did not match any existing rooms", room_id);
            return;
        }
    };
    let in_room = matches!(
        clients.get(id).map(|c| &c.status),
        Some(Status::InRoom { room_id: current }) if current == room_id
    );
    let opponent_id = match room.opponent_id(id) {
        Some(v) if in_room => v,
        _ => {
            warn!("Client {} sent {:?} to room {} it is not in", id, event, room_id);
            return;
        }
    };
    match clients.get(opponent_id) {
        Some(opponent) => opponent.send_event(opponent_id, event),
        None => warn!(
            "Opponent {} in room {} is no longer connected",
            opponent_id, room_id
        ),
    }
}

// Anyone still seated in the room goes back to idle
fn close_room(
    room_id: &str,
    clients: &mut HashMap<String, Client>,
    rooms: &mut HashMap<RoomId, Room>,
) {
    let room = match rooms.remove(room_id) {
        Some(v) => v,
        None => return,
    };
    for player_id in room.player_ids() {
        if let Some(c) = clients.get_mut(player_id) {
            if matches!(&c.status, Status::InRoom { room_id: current } if current == room_id) {
                c.status = Status::Idle;
            }
        }
    }
    info!("closed room {}", room_id);
}

pub fn disconnect(
    id: &str,
    clients: &mut HashMap<String, Client>,
    rooms: &mut HashMap<RoomId, Room>,
) {
    if let Some(Client {
        status: Status::InRoom { room_id },
        ..
    }) = clients.remove(id)
    {
        close_room(&room_id, clients, rooms);
    }
}
