//! Prompt commands.
//!
//! ```text
//! place <x> <y> <color>
//! move <x> <y>
//! quit
//! ```

use pixelwall_server::infrastructure::dto::websocket::ClientMessage;
use serde_json::Number;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Place { x: i64, y: i64, color: String },
    Move { x: Number, y: Number },
    Quit,
}

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self, ClientError> {
        let mut words = line.split_whitespace();
        let name = words
            .next()
            .ok_or_else(|| ClientError::InvalidCommand("empty input".to_string()))?;
        let args: Vec<&str> = words.collect();

        match (name, args.as_slice()) {
            ("place", [x, y, color]) => Ok(Command::Place {
                x: parse_int(x)?,
                y: parse_int(y)?,
                color: color.to_string(),
            }),
            ("move", [x, y]) => Ok(Command::Move {
                x: parse_number(x)?,
                y: parse_number(y)?,
            }),
            ("quit" | "exit", []) => Ok(Command::Quit),
            ("place", _) => Err(ClientError::InvalidCommand(
                "usage: place <x> <y> <color>".to_string(),
            )),
            ("move", _) => Err(ClientError::InvalidCommand(
                "usage: move <x> <y>".to_string(),
            )),
            _ => Err(ClientError::InvalidCommand(format!(
                "unknown command '{}'",
                name
            ))),
        }
    }

    /// Frame to send for this command; `None` for `quit`
    pub fn into_message(self, user_id: &str) -> Option<ClientMessage> {
        match self {
            Command::Place { x, y, color } => Some(ClientMessage::PlacePixel {
                x,
                y,
                color,
                user_id: user_id.to_string(),
            }),
            Command::Move { x, y } => Some(ClientMessage::MoveMouse {
                user_id: user_id.to_string(),
                x,
                y,
            }),
            Command::Quit => None,
        }
    }
}

fn parse_int(value: &str) -> Result<i64, ClientError> {
    value
        .parse()
        .map_err(|_| ClientError::InvalidCommand(format!("'{}' is not an integer", value)))
}

/// Integers stay integers on the wire
fn parse_number(value: &str) -> Result<Number, ClientError> {
    if let Ok(int) = value.parse::<i64>() {
        return Ok(Number::from(int));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| ClientError::InvalidCommand(format!("'{}' is not a number", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place() {
        // テスト項目: place コマンドが座標と色に分解される
        // given (前提条件):
        let line = "place 5 5 #ff0000";

        // when (操作):
        let command = Command::parse(line).unwrap();

        // then (期待する結果):
        assert_eq!(
            command,
            Command::Place {
                x: 5,
                y: 5,
                color: "#ff0000".to_string()
            }
        );
    }

    #[test]
    fn test_parse_move_keeps_integer_and_fraction() {
        // テスト項目: move コマンドの座標は整数・小数のどちらも受け付ける
        // given (前提条件):
        let line = "  move 12   34.5 ";

        // when (操作):
        let command = Command::parse(line).unwrap();

        // then (期待する結果):
        let Command::Move { x, y } = command else {
            panic!("expected move");
        };
        assert_eq!(x.as_i64(), Some(12));
        assert_eq!(y.as_f64(), Some(34.5));
    }

    #[test]
    fn test_parse_invalid_commands() {
        // テスト項目: 引数不足・数値でない座標・未知のコマンドはエラーになる
        // given (前提条件):
        let lines = ["place 1 2", "place a 2 #fff", "move 1", "draw 1 2", ""];

        // when (操作):
        let results: Vec<_> = lines.iter().map(|line| Command::parse(line)).collect();

        // then (期待する結果):
        for result in results {
            assert!(matches!(result, Err(ClientError::InvalidCommand(_))));
        }
    }

    #[test]
    fn test_into_message() {
        // テスト項目: コマンドが送信用のフレームに変換され、quit は何も送らない
        // given (前提条件):
        let place = Command::parse("place 1 2 #123456").unwrap();
        let quit = Command::parse("quit").unwrap();

        // when (操作):
        let place_message = place.into_message("abc");
        let quit_message = quit.into_message("abc");

        // then (期待する結果):
        assert_eq!(
            place_message,
            Some(ClientMessage::PlacePixel {
                x: 1,
                y: 2,
                color: "#123456".to_string(),
                user_id: "abc".to_string(),
            })
        );
        assert_eq!(quit_message, None);
    }
}
