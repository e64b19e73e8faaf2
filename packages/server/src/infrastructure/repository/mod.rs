//! Grid Repository 実装
//!
//! - `sqlite`: 本番用（sqlx + SQLite）
//! - `inmemory`: テスト・一時利用向け
//! - `write_queue`: 書き込みを 1 件ずつ直列化するワーカー

pub mod inmemory;
pub mod sqlite;
pub mod write_queue;

pub use inmemory::InMemoryGridRepository;
pub use sqlite::SqliteGridRepository;
pub use write_queue::{PendingWrite, PersistenceQueue, WriteJob};
