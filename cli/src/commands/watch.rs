//! `watch`: print live-status socket events until Ctrl-C.

use anyhow::Result;
use tokio::sync::broadcast::error::RecvError;
use tracing::{instrument, warn};
use verifymc_business::socket::SocketMessage;
use verifymc_business::{ReconnectingSocket, SocketEvent, SocketOptions, SocketState};

use crate::context::AppContext;
use crate::output::Output;

fn describe(event: &SocketEvent) -> String {
    match event {
        SocketEvent::Connected => "connected".to_owned(),
        SocketEvent::Disconnected => "disconnected".to_owned(),
        SocketEvent::Error(err) => format!("error: {err}"),
        SocketEvent::Message(SocketMessage::Text(text)) => pretty_json(text),
        SocketEvent::Message(SocketMessage::Binary(data)) => format!("<{} bytes>", data.len()),
    }
}

/// Pretty-print JSON payloads; anything else is shown as sent.
fn pretty_json(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_owned())
}

#[instrument(skip_all, name = "watch", fields(%url))]
pub async fn run_watch(ctx: &AppContext, url: &str) -> Result<()> {
    let out = Output::new();
    let options = SocketOptions::default();
    let socket = ReconnectingSocket::new(url, options).with_session(ctx.session.clone());
    let mut events = socket.subscribe_events();
    let mut state = socket.subscribe_state();

    out.dim(format!("Watching {url} (Ctrl-C to stop)"));
    socket.connect();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => out.print(describe(&event)),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "dropped socket events"),
                Err(RecvError::Closed) => break,
            },
            open = state.changed() => {
                if !open {
                    break;
                }
                if state.read() == SocketState::Disconnected
                    && socket.reconnect_attempts() >= options.max_reconnect_attempts
                {
                    out.warning("Gave up reconnecting");
                    break;
                }
            }
        }
    }

    socket.disconnect();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_events() {
        assert_eq!(describe(&SocketEvent::Connected), "connected");
        assert_eq!(
            describe(&SocketEvent::Message(SocketMessage::Binary(vec![1, 2, 3]))),
            "<3 bytes>"
        );
        assert_eq!(
            describe(&SocketEvent::Message(SocketMessage::Text("plain".to_owned()))),
            "plain"
        );
        assert_eq!(
            describe(&SocketEvent::Message(SocketMessage::Text(r#"{"online":true}"#.to_owned()))),
            "{\n  \"online\": true\n}"
        );
    }
}
