use common::messages::ClientEvent;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
#[error("Error sending event to the relay")]
pub struct RelayError;

// The outbound half of a relay connection. The state machine owns one of
// these for its whole lifetime instead of reaching for a global socket.
pub trait Relay {
    fn send(&self, event: &ClientEvent) -> Result<(), RelayError>;
}

// Queues events for the websocket writer task
#[derive(Debug, Clone)]
pub struct ChannelRelay(pub mpsc::UnboundedSender<ClientEvent>);

impl Relay for ChannelRelay {
    fn send(&self, event: &ClientEvent) -> Result<(), RelayError> {
        self.0.send(event.clone()).map_err(|_| RelayError)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_relay_queues_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let relay = ChannelRelay(tx);
        relay.send(&ClientEvent::RequestMatch).unwrap();
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::RequestMatch);
    }

    #[test]
    fn test_channel_relay_reports_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let relay = ChannelRelay(tx);
        assert!(relay.send(&ClientEvent::RequestMatch).is_err());
    }
}
