//! WebSocket client session management.

use futures_util::{Sink, SinkExt, StreamExt};
use pixelwall_server::infrastructure::dto::websocket::{ClientMessage, ServerMessage};
use pixelwall_shared::time::get_timestamp_millis;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    command::Command, domain::CooldownHint, error::ClientError, formatter::MessageFormatter,
};

use super::ui::redisplay_prompt;

/// How a session ended without a connection error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// `quit`, Ctrl+C or Ctrl+D
    UserExit,
}

/// Run one WebSocket session until the user quits or the connection drops
///
/// `input_rx` outlives the session so a reconnect keeps the same prompt.
pub async fn run_client_session(
    url: &str,
    user_id: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    cooldown: &mut CooldownHint,
) -> Result<SessionEnd, ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to canvas server!");
    println!(
        "\nYou are '{}'. Commands: place <x> <y> <color> | move <x> <y> | quit\n",
        user_id
    );

    let (mut write, mut read) = ws_stream.split();

    let hello = ClientMessage::Init {
        user_id: Some(user_id.to_string()),
    };
    send(&mut write, &hello).await?;

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let formatted = match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(message) => MessageFormatter::format_server_message(
                                &message,
                                get_timestamp_millis(),
                            ),
                            Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                        };
                        print!("{}", formatted);
                        redisplay_prompt(user_id);
                    }
                    Some(Ok(Message::Binary(data))) => {
                        print!("{}", MessageFormatter::format_binary_message(data.len()));
                        redisplay_prompt(user_id);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Server closed the connection");
                        return Err(ClientError::ConnectionError("Connection lost".to_string()));
                    }
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        return Err(ClientError::ConnectionError(e.to_string()));
                    }
                    Some(Ok(_)) => {}
                }
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    return Ok(SessionEnd::UserExit);
                };
                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e);
                        redisplay_prompt(user_id);
                        continue;
                    }
                };

                let now = get_timestamp_millis();
                if matches!(command, Command::Place { .. }) {
                    match cooldown.remaining_ms(now) {
                        Some(remaining) => {
                            print!("{}", MessageFormatter::format_cooldown_hint(remaining))
                        }
                        None => cooldown.record_placement(now),
                    }
                }

                let Some(message) = command.into_message(user_id) else {
                    return Ok(SessionEnd::UserExit);
                };
                send(&mut write, &message).await?;
                redisplay_prompt(user_id);
            }
        }
    }
}

async fn send<S>(write: &mut S, message: &ClientMessage) -> Result<(), ClientError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = serde_json::to_string(message)
        .map_err(|e| ClientError::ConnectionError(format!("failed to encode frame: {}", e)))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))
}
