// ABOUTME: Remote mirror channel: wire protocol and persistent session

pub mod protocol;
pub mod session;

pub use protocol::OutboundMessage;
pub use session::RemoteSession;
