use crate::machine::{Command, GameStateMachine, Input, Snapshot};
use crate::relay::ChannelRelay;
use common::messages::{ClientEvent, ParticipantId, ServerEvent};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Registration with the relay failed: {0}")]
    Register(#[from] reqwest::Error),
    #[error("Websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    user_id: usize,
}

// The id is the identity the relay names in `match-start`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Registration {
    pub id: ParticipantId,
    pub url: String,
}

pub async fn register(server: &str, user_id: usize) -> Result<Registration, ConnectError> {
    let registration = reqwest::Client::new()
        .post(format!("{}/register", server.trim_end_matches('/')))
        .json(&RegisterRequest { user_id })
        .send()
        .await?
        .error_for_status()?
        .json::<Registration>()
        .await?;
    info!("registered with relay as {}", registration.id);
    Ok(registration)
}

// Owns the state machine for the lifetime of the connection. Relay events and
// user commands are funneled into one loop, so they are applied one at a time
// in arrival order.
pub async fn run(
    registration: Registration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<Snapshot>,
) -> Result<(), ConnectError> {
    let (ws, _) = connect_async(registration.url.as_str()).await?;
    let (mut ws_sender, mut ws_rcv) = ws.split();
    let (relay_sender, relay_rcv) = mpsc::unbounded_channel::<ClientEvent>();

    tokio::task::spawn(async move {
        let mut relay_rcv = UnboundedReceiverStream::new(relay_rcv);
        while let Some(event) = relay_rcv.next().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!("error serializing {:?}: {}", event, e);
                    continue;
                }
            };
            if let Err(e) = ws_sender.send(Message::text(text)).await {
                error!("error sending websocket msg: {}", e);
                break;
            }
        }
    });

    let mut machine = GameStateMachine::new(registration.id.clone(), ChannelRelay(relay_sender));
    info!("{} connected", registration.id);
    let _ = snapshots.send(machine.snapshot());

    loop {
        let input = tokio::select! {
            msg = ws_rcv.next() => match msg {
                Some(Ok(msg)) => match server_event(&msg) {
                    Some(event) => Input::Event(event),
                    None => continue,
                },
                Some(Err(e)) => {
                    error!("error receiving ws message for id {}: {}", registration.id, e);
                    break;
                }
                None => break,
            },
            command = commands.recv() => match command {
                Some(command) => Input::Command(command),
                None => break,
            },
        };
        machine.handle(input);
        let _ = snapshots.send(machine.snapshot());
    }

    info!("{} disconnected", registration.id);
    Ok(())
}

fn server_event(msg: &Message) -> Option<ServerEvent> {
    if !msg.is_text() {
        return None;
    }
    let text = msg.to_text().ok()?.trim();
    match serde_json::from_str(text) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!("Failed to deserialize relay message {}: {}", text, err);
            None
        }
    }
}
