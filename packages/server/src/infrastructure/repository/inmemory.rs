//! InMemory Grid Repository 実装
//!
//! ドメイン層が定義する GridRepository trait の具体的な実装。
//! BTreeMap をインメモリ DB として使用します（プロセス終了で消える）。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{GridRepository, PixelRecord, RepositoryError};

/// インメモリ Grid Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryGridRepository {
    /// Key: (x, y), Value: color
    rows: Mutex<BTreeMap<(i64, i64), String>>,
}

impl InMemoryGridRepository {
    /// 新しい InMemoryGridRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の行を持った状態で作成（再起動のシミュレーション用）
    pub fn with_records(records: impl IntoIterator<Item = PixelRecord>) -> Self {
        let rows = records
            .into_iter()
            .map(|record| ((record.x, record.y), record.color))
            .collect();
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// 保存済みの行数
    pub async fn count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl GridRepository for InMemoryGridRepository {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PixelRecord>, RepositoryError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .map(|(&(x, y), color)| PixelRecord::new(x, y, color.as_str()))
            .collect())
    }

    async fn upsert_pixel(&self, record: PixelRecord) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().await;
        rows.insert((record.x, record.y), record.color);
        Ok(())
    }

    async fn replace_all(&self, records: Vec<PixelRecord>) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().await;
        rows.clear();
        rows.extend(
            records
                .into_iter()
                .map(|record| ((record.x, record.y), record.color)),
        );
        Ok(())
    }
}
