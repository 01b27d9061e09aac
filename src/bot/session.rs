//! One chat session: poll, handle, reply, until told to stop

use tracing::{debug, error, info, warn};

use super::handlers::{Handlers, Reply};
use super::transport::{ChatTransport, InboundMessage};
use crate::error::TrackerResult;

/// Run until `should_continue` returns false. Only a failed `receive` ends
/// the session with `Err`; a reply that cannot be delivered is logged and
/// skipped. Received messages are acknowledged before returning either way.
pub async fn run_session<T, F>(
    transport: &mut T,
    handlers: &Handlers,
    should_continue: F,
) -> TrackerResult<()>
where
    T: ChatTransport + ?Sized,
    F: FnMut() -> bool,
{
    info!("chat session started");

    let outcome = poll_until_stopped(transport, handlers, should_continue).await;
    if let Err(e) = transport.acknowledge().await {
        warn!(error = %e, "failed to acknowledge received messages");
    }

    if outcome.is_ok() {
        info!("chat session stopped");
    }
    outcome
}

async fn poll_until_stopped<T, F>(
    transport: &mut T,
    handlers: &Handlers,
    mut should_continue: F,
) -> TrackerResult<()>
where
    T: ChatTransport + ?Sized,
    F: FnMut() -> bool,
{
    while should_continue() {
        let messages = transport.receive().await?;
        debug!(count = messages.len(), "received messages");

        for message in messages {
            let reply = handlers.handle(&message).await;
            if let Err(e) = send_reply(transport, &message, reply).await {
                error!(chat_id = message.chat_id, error = %e, "failed to deliver reply");
            }
        }
    }
    Ok(())
}

async fn send_reply<T>(transport: &T, message: &InboundMessage, reply: Reply) -> TrackerResult<()>
where
    T: ChatTransport + ?Sized,
{
    match reply {
        Reply::Text(text) => transport.reply_text(message.chat_id, &text).await,
        Reply::Document { bytes, filename } => {
            transport
                .reply_document(message.chat_id, bytes, &filename)
                .await
        }
    }
}
