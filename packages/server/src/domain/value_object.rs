//! Value objects of the canvas domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::GridError;

/// Edge length of the square canvas (`x` and `y` are both in `[0, size)`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize(u32);

impl GridSize {
    /// `None` for a zero-sized canvas
    pub fn new(size: u32) -> Option<Self> {
        (size > 0).then_some(Self(size))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        let size = i64::from(self.0);
        (0..size).contains(&x) && (0..size).contains(&y)
    }
}

/// A cell position already checked against a [`GridSize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: u32,
    y: u32,
}

impl Coordinate {
    /// Validate `(x, y)` against the canvas bounds
    pub fn new(x: i64, y: i64, size: GridSize) -> Result<Self, GridError> {
        if !size.contains(x, y) {
            return Err(GridError::OutOfBounds {
                x,
                y,
                size: size.value(),
            });
        }
        // both values are in [0, size) so they fit in u32
        Ok(Self {
            x: x as u32,
            y: y as u32,
        })
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Cell color
///
/// Opaque to the server: whatever the client sends (usually a hex code) is
/// stored and relayed unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Client-supplied user identifier (not authenticated)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-generated identifier of one WebSocket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(value: u32) -> GridSize {
        GridSize::new(value).unwrap()
    }

    #[test]
    fn test_grid_size_rejects_zero() {
        // テスト項目: サイズ 0 のキャンバスは作成できない
        // given (前提条件):

        // when (操作):
        let result = GridSize::new(0);

        // then (期待する結果):
        assert!(result.is_none());
    }

    #[test]
    fn test_coordinate_accepts_bounds() {
        // テスト項目: [0, size) の範囲内の座標は受け付けられる
        // given (前提条件):
        let size = size(1000);

        // when (操作):
        let origin = Coordinate::new(0, 0, size);
        let corner = Coordinate::new(999, 999, size);

        // then (期待する結果):
        assert_eq!(origin.unwrap().to_string(), "0,0");
        assert_eq!(corner.unwrap().to_string(), "999,999");
    }

    #[test]
    fn test_coordinate_rejects_out_of_bounds() {
        // テスト項目: 範囲外（負の値・size 以上）の座標は OutOfBounds エラーになる
        // given (前提条件):
        let size = size(10);

        // when (操作):
        let negative = Coordinate::new(-1, 5, size);
        let too_large = Coordinate::new(5, 10, size);

        // then (期待する結果):
        assert_eq!(
            negative,
            Err(GridError::OutOfBounds {
                x: -1,
                y: 5,
                size: 10
            })
        );
        assert!(matches!(too_large, Err(GridError::OutOfBounds { .. })));
    }

    #[test]
    fn test_session_ids_are_unique() {
        // テスト項目: SessionId は毎回異なる値が生成される
        // given (前提条件):

        // when (操作):
        let first = SessionId::generate();
        let second = SessionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }
}
