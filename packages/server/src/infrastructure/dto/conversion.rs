//! Conversion logic between DTOs and domain entities.

use std::collections::BTreeMap;

use crate::domain::Grid;
use crate::infrastructure::dto::websocket::ServerMessage;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Grid> for ServerMessage {
    /// `init` frame carrying the whole grid
    fn from(grid: &Grid) -> Self {
        let grid = grid
            .iter()
            .map(|(coordinate, color)| (coordinate.to_string(), color.as_str().to_string()))
            .collect::<BTreeMap<_, _>>();
        ServerMessage::Init { grid }
    }
}

// ========================================
// DTO → Domain
// ========================================

/// Parse an `init` grid key (`"x,y"`)
pub fn parse_cell_key(key: &str) -> Option<(i64, i64)> {
    let (x, y) = key.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Color, GridSize};

    #[test]
    fn test_domain_grid_to_init_message() {
        // テスト項目: ドメインの Grid が "x,y" をキーとする init フレームに変換される
        // given (前提条件):
        let mut grid = Grid::new(GridSize::new(1000).unwrap());
        grid.set(5, 5, Color::new("#ff0000")).unwrap();
        grid.set(12, 0, Color::new("#2351a5")).unwrap();

        // when (操作):
        let message = ServerMessage::from(&grid);

        // then (期待する結果):
        let ServerMessage::Init { grid } = message else {
            panic!("expected init");
        };
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.get("5,5"), Some(&"#ff0000".to_string()));
        assert_eq!(grid.get("12,0"), Some(&"#2351a5".to_string()));
    }

    #[test]
    fn test_empty_grid_to_init_message() {
        // テスト項目: 空のグリッドは空の grid オブジェクトになる
        // given (前提条件):
        let grid = Grid::new(GridSize::new(10).unwrap());

        // when (操作):
        let json = ServerMessage::from(&grid).to_json().unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"init","grid":{}}"#);
    }

    #[test]
    fn test_parse_cell_key() {
        // テスト項目: "x,y" 形式のキーが座標に変換され、不正な形式は None になる
        // given (前提条件):

        // when (操作):
        let valid = parse_cell_key("5,12");
        let invalid = parse_cell_key("5;12");
        let not_number = parse_cell_key("a,1");

        // then (期待する結果):
        assert_eq!(valid, Some((5, 12)));
        assert_eq!(invalid, None);
        assert_eq!(not_number, None);
    }
}
