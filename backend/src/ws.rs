use crate::client::{Client, Clients, Sender};
use crate::room::{self, Rooms};
use common::messages::ClientEvent;
use futures::{FutureExt, StreamExt};
use serde_json::from_str;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

pub async fn client_connection(
    ws: WebSocket,
    id: String,
    clients: Clients,
    mut client: Client,
    rooms: Rooms,
) {
    let (client_ws_sender, mut client_ws_rcv) = ws.split();
    let (client_sender, client_rcv) = mpsc::unbounded_channel();

    let client_rcv = UnboundedReceiverStream::new(client_rcv);
    tokio::task::spawn(client_rcv.forward(client_ws_sender).map(|result| {
        if let Err(e) = result {
            error!("error sending websocket msg: {}", e);
        }
    }));

    let user_id = client.user_id;
    client.sender = Some(Sender(client_sender));
    clients.write().await.insert(id.clone(), client);

    info!("{} connected as user {}", id, user_id);

    while let Some(result) = client_ws_rcv.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                error!("error receiving ws message for id {}: {}", id, e);
                break;
            }
        };
        client_msg(&id, msg, &clients, &rooms).await;
    }

    let mut clients_map = clients.write().await;
    let mut rooms_map = rooms.write().await;
    room::disconnect(&id, &mut clients_map, &mut rooms_map);
    info!("{} disconnected", id);
}

#[tracing::instrument(skip(clients, rooms))]
async fn client_msg(id: &str, msg: Message, clients: &Clients, rooms: &Rooms) {
    info!("received message from {}: {:?}", id, msg);
    let message = match msg.to_str() {
        Ok(v) => v.trim(),
        Err(_) => return,
    };

    if message == "ping" {
        return;
    }

    let event: ClientEvent = match from_str(message) {
        Ok(event) => event,
        Err(err) => {
            warn!("Failed to deserialize message into relay event: {}", err);
            return;
        }
    };

    let mut clients_map = clients.write().await;
    if !clients_map.contains_key(id) {
        error!(
            "Message from client {} did not match any connected clients",
            id
        );
        return;
    }
    let mut rooms_map = rooms.write().await;
    room::relay_event(
        id,
        event,
        &mut clients_map,
        &mut rooms_map,
        &mut rand::thread_rng(),
    );
}
