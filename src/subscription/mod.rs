// WebSocket fan-out: wire protocol, subscriber registry and per-connection sessions

pub mod protocol;
pub mod registry;
pub mod session;

pub use protocol::{parse_client_message, ClientMessage, ServerMessage};
pub use registry::{BroadcastReport, ConnectionRegistry, SubscriberId, SubscriberTx};
pub use session::{apply_client_message, Session};
