//! Message formatting utilities for client display.

use pixelwall_server::infrastructure::dto::{
    conversion::parse_cell_key, websocket::ServerMessage,
};
use pixelwall_shared::time::timestamp_to_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any frame received from the server
    pub fn format_server_message(message: &ServerMessage, received_at: i64) -> String {
        match message {
            ServerMessage::Init { grid } => {
                let mut output = String::new();
                output.push_str("\n\n============================================================\n");
                output.push_str(&format!("Canvas loaded: {} pixels\n", grid.len()));
                let mut cells: Vec<(i64, i64, &str)> = grid
                    .iter()
                    .filter_map(|(key, color)| {
                        parse_cell_key(key).map(|(x, y)| (x, y, color.as_str()))
                    })
                    .collect();
                cells.sort();
                for (x, y, color) in cells.iter().take(10) {
                    output.push_str(&format!("  ({}, {}) {}\n", x, y, color));
                }
                if cells.len() > 10 {
                    output.push_str(&format!("  ... and {} more\n", cells.len() - 10));
                }
                output.push_str("============================================================\n");
                output
            }
            ServerMessage::UpdatePixel { x, y, color } => format!(
                "\n# ({}, {}) -> {} at {}\n",
                x,
                y,
                color,
                timestamp_to_rfc3339(received_at)
            ),
            ServerMessage::MouseMove { user_id, x, y } => {
                format!("\n~ {} is at ({}, {})\n", user_id, x, y)
            }
            ServerMessage::Error { message } => format!("\n! {}\n", message),
        }
    }

    /// Format the local cooldown hint
    pub fn format_cooldown_hint(remaining_ms: i64) -> String {
        format!(
            "(cooldown: about {}s left, the server may refuse this placement)\n",
            (remaining_ms + 999) / 1000
        )
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_init_lists_pixels_in_order() {
        // テスト項目: init は画素数と座標順の一覧として表示される
        // given (前提条件):
        let mut grid = BTreeMap::new();
        grid.insert("10,2".to_string(), "#00ff00".to_string());
        grid.insert("5,5".to_string(), "#ff0000".to_string());
        let message = ServerMessage::Init { grid };

        // when (操作):
        let output = MessageFormatter::format_server_message(&message, 0);

        // then (期待する結果):
        assert!(output.contains("Canvas loaded: 2 pixels"));
        let first = output.find("(5, 5) #ff0000").unwrap();
        let second = output.find("(10, 2) #00ff00").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_format_init_truncates_long_grids() {
        // テスト項目: 画素が多い場合は先頭 10 件だけ表示される
        // given (前提条件):
        let grid = (0..15)
            .map(|i| (format!("{},0", i), "#000000".to_string()))
            .collect();
        let message = ServerMessage::Init { grid };

        // when (操作):
        let output = MessageFormatter::format_server_message(&message, 0);

        // then (期待する結果):
        assert!(output.contains("... and 5 more"));
    }

    #[test]
    fn test_format_error_and_mouse_move() {
        // テスト項目: error と mouse_move が読みやすい形式で表示される
        // given (前提条件):
        let error = ServerMessage::error("Cooldown actief!");
        let cursor = ServerMessage::MouseMove {
            user_id: "b".to_string(),
            x: serde_json::Number::from(12),
            y: serde_json::Number::from(34),
        };

        // when (操作):
        let error_output = MessageFormatter::format_server_message(&error, 0);
        let cursor_output = MessageFormatter::format_server_message(&cursor, 0);

        // then (期待する結果):
        assert_eq!(error_output, "\n! Cooldown actief!\n");
        assert_eq!(cursor_output, "\n~ b is at (12, 34)\n");
    }

    #[test]
    fn test_format_cooldown_hint_rounds_up() {
        // テスト項目: 残り時間は秒単位に切り上げて表示される
        // given (前提条件):
        let remaining_ms = 1_001;

        // when (操作):
        let output = MessageFormatter::format_cooldown_hint(remaining_ms);

        // then (期待する結果):
        assert!(output.contains("about 2s left"));
    }
}
