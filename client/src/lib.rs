pub mod machine;
pub mod matchmaking;
pub mod reconciler;
pub mod relay;
pub mod session;
pub mod ws;

pub use machine::{Command, GameStateMachine, IgnoreReason, Input, MoveResult, Phase, Snapshot};
pub use relay::{ChannelRelay, Relay, RelayError};
pub use session::SessionDescriptor;
