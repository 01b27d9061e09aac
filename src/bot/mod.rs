//! Chat surface
//!
//! - `transport`: the [`ChatTransport`] boundary and inbound message type
//! - `telegram`: Bot API implementation of the transport
//! - `handlers`: command routing and reply texts
//! - `session`: the poll/handle/reply loop

pub mod handlers;
pub mod session;
pub mod telegram;
pub mod transport;

pub use handlers::{Command, Handlers, Reply};
pub use session::run_session;
pub use telegram::TelegramTransport;
pub use transport::{ChatTransport, InboundMessage};
