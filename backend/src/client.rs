use crate::util;
use common::messages::{RoomId, ServerEvent};
use hashbrown::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, warn};
use warp::ws::Message;

#[derive(Error, Debug)]
#[error("Error sending message")]
pub struct SendError;

pub type Clients = Arc<RwLock<HashMap<String, Client>>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Searching,
    InRoom { room_id: RoomId },
    Idle,
}

#[derive(Debug, Clone)]
pub struct Sender(pub mpsc::UnboundedSender<Result<Message, warp::Error>>);

#[derive(Debug, Clone)]
pub struct Client {
    pub user_id: usize,
    pub status: Status,
    pub sender: Option<Sender>,
}

pub trait SendMsg {
    fn send(&self, msg: &str) -> Result<(), SendError>;
}

impl SendMsg for Sender {
    fn send(&self, msg: &str) -> Result<(), SendError> {
        self.0.send(Ok(Message::text(msg))).map_err(|_| SendError)
    }
}

impl Client {
    pub fn new(user_id: usize) -> Self {
        Client {
            user_id,
            status: Status::Idle,
            sender: None,
        }
    }

    pub fn send_event(&self, id: &str, event: &ServerEvent) {
        let sender = match &self.sender {
            Some(sender) => sender,
            None => {
                warn!("Client {} has no open connection to send {:?}", id, event);
                return;
            }
        };
        let msg = match serde_json::to_string(event) {
            Ok(msg) => msg,
            Err(e) => {
                error!("error serializing {:?}: {}", event, e);
                return;
            }
        };
        // If the message fails to send even after retries, there's not much we can do but proceed
        let _ = util::retry(1, || sender.send(&msg));
    }
}
