//! Entities of the canvas domain.

use std::collections::HashMap;

use super::{
    error::GridError,
    value_object::{Color, Coordinate, GridSize, SessionId, Timestamp},
};

/// Durable form of one grid cell: `(x, y)` is the natural key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelRecord {
    pub x: i64,
    pub y: i64,
    pub color: String,
}

impl PixelRecord {
    pub fn new(x: i64, y: i64, color: impl Into<String>) -> Self {
        Self {
            x,
            y,
            color: color.into(),
        }
    }
}

/// The shared canvas
///
/// Last write wins: setting a cell twice keeps only the second color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: GridSize,
    cells: HashMap<Coordinate, Color>,
}

impl Grid {
    /// Create an empty (all blank) canvas
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: HashMap::new(),
        }
    }

    /// Rebuild a canvas from persisted rows
    ///
    /// Rows outside the canvas bounds are returned separately so the caller
    /// can report them.
    pub fn from_records(
        size: GridSize,
        records: impl IntoIterator<Item = PixelRecord>,
    ) -> (Self, Vec<PixelRecord>) {
        let mut grid = Self::new(size);
        let mut rejected = Vec::new();
        for record in records {
            match Coordinate::new(record.x, record.y, size) {
                Ok(coordinate) => {
                    grid.cells.insert(coordinate, Color::new(record.color));
                }
                Err(_) => rejected.push(record),
            }
        }
        (grid, rejected)
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Set the color of `(x, y)` after checking it lies on the canvas
    pub fn set(&mut self, x: i64, y: i64, color: Color) -> Result<Coordinate, GridError> {
        let coordinate = Coordinate::new(x, y, self.size)?;
        self.cells.insert(coordinate, color);
        Ok(coordinate)
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&Color> {
        self.cells.get(coordinate)
    }

    /// Color at raw `(x, y)`, `None` for blank or off-canvas cells
    pub fn color_at(&self, x: i64, y: i64) -> Option<&Color> {
        Coordinate::new(x, y, self.size)
            .ok()
            .and_then(|coordinate| self.cells.get(&coordinate))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &Color)> {
        self.cells.iter()
    }

    /// All painted cells as persistence rows, ordered by `(x, y)`
    pub fn to_records(&self) -> Vec<PixelRecord> {
        let mut records: Vec<PixelRecord> = self
            .cells
            .iter()
            .map(|(coordinate, color)| {
                PixelRecord::new(
                    i64::from(coordinate.x()),
                    i64::from(coordinate.y()),
                    color.as_str(),
                )
            })
            .collect();
        records.sort_by_key(|record| (record.x, record.y));
        records
    }
}

/// Lifecycle of a connection: `Connected -> Active -> Closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Active,
    Closed,
}

/// One live client connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub connected_at: Timestamp,
    pub state: SessionState,
}

impl Session {
    pub fn new(id: SessionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            connected_at,
            state: SessionState::Connected,
        }
    }

    /// `Connected -> Active`; other states are left as they are
    pub fn activate(&mut self) {
        if self.state == SessionState::Connected {
            self.state = SessionState::Active;
        }
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: u32) -> Grid {
        Grid::new(GridSize::new(size).unwrap())
    }

    #[test]
    fn test_set_pixel_overwrites_previous_color() {
        // テスト項目: 同じ座標に 2 回描くと後の色だけが残る（last-write-wins）
        // given (前提条件):
        let mut grid = grid(10);
        grid.set(5, 5, Color::new("#ff0000")).unwrap();

        // when (操作):
        grid.set(5, 5, Color::new("#00ff00")).unwrap();

        // then (期待する結果):
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.color_at(5, 5), Some(&Color::new("#00ff00")));
    }

    #[test]
    fn test_set_pixel_out_of_bounds_leaves_grid_unchanged() {
        // テスト項目: 範囲外への描画はエラーになり、グリッドは変化しない
        // given (前提条件):
        let mut grid = grid(10);

        // when (操作):
        let result = grid.set(10, 0, Color::new("#ff0000"));

        // then (期待する結果):
        assert!(matches!(result, Err(GridError::OutOfBounds { .. })));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_records_round_trip_through_from_records() {
        // テスト項目: to_records で得た行から同じグリッドを復元できる
        // given (前提条件):
        let mut original = grid(10);
        original.set(1, 2, Color::new("#000000")).unwrap();
        original.set(0, 9, Color::new("#c4c4c4")).unwrap();

        // when (操作):
        let records = original.to_records();
        let (restored, rejected) = Grid::from_records(original.size(), records.clone());

        // then (期待する結果):
        assert_eq!(restored, original);
        assert!(rejected.is_empty());
        assert_eq!(
            records,
            vec![
                PixelRecord::new(0, 9, "#c4c4c4"),
                PixelRecord::new(1, 2, "#000000"),
            ]
        );
    }

    #[test]
    fn test_from_records_skips_rows_outside_canvas() {
        // テスト項目: キャンバス外の行は復元時に除外され、呼び出し元に返される
        // given (前提条件):
        let size = GridSize::new(4).unwrap();
        let rows = vec![
            PixelRecord::new(3, 3, "#2351a5"),
            PixelRecord::new(4, 0, "#ff4500"),
        ];

        // when (操作):
        let (grid, rejected) = Grid::from_records(size, rows);

        // then (期待する結果):
        assert_eq!(grid.len(), 1);
        assert_eq!(rejected, vec![PixelRecord::new(4, 0, "#ff4500")]);
    }

    #[test]
    fn test_session_lifecycle() {
        // テスト項目: Session は Connected -> Active -> Closed と遷移し、Closed からは戻らない
        // given (前提条件):
        let mut session = Session::new(SessionId::generate(), Timestamp::new(1000));
        assert_eq!(session.state, SessionState::Connected);

        // when (操作):
        session.activate();
        let after_activate = session.state;
        session.close();
        session.activate();

        // then (期待する結果):
        assert_eq!(after_activate, SessionState::Active);
        assert!(session.is_closed());
    }
}
