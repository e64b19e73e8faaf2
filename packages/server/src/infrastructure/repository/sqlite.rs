//! SQLite Grid Repository 実装
//!
//! テーブル `grid (x INTEGER, y INTEGER, color TEXT)` に 1 セル 1 行で保存します。
//! `(x, y)` が自然キーです。
//!
//! ## 接続
//!
//! プールは遅延接続（`connect_lazy_with`）で作成します。DB が開けない場合も
//! サーバーは起動し、各クエリが `RepositoryError` を返すだけになります。

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::domain::{GridRepository, PixelRecord, RepositoryError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS grid (
    x INTEGER NOT NULL,
    y INTEGER NOT NULL,
    color TEXT NOT NULL,
    PRIMARY KEY (x, y)
)";

// upsert の ON CONFLICT には一意制約が必要（主キーの無い既存テーブル向け）
const CREATE_UNIQUE_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS grid_xy ON grid (x, y)";

const SELECT_ALL: &str = "SELECT x, y, color FROM grid";

const UPSERT: &str = "INSERT INTO grid (x, y, color) VALUES (?1, ?2, ?3)
    ON CONFLICT (x, y) DO UPDATE SET color = excluded.color";

const INSERT: &str = "INSERT INTO grid (x, y, color) VALUES (?1, ?2, ?3)";

const DELETE_ALL: &str = "DELETE FROM grid";

/// SQLite Grid Repository 実装
#[derive(Debug, Clone)]
pub struct SqliteGridRepository {
    pool: SqlitePool,
}

impl SqliteGridRepository {
    /// `database_url`（例: `sqlite://grid.db`, `sqlite::memory:`）から作成
    ///
    /// URL の形式が不正な場合のみエラーになります。ファイルが無ければ作成します。
    pub fn connect_lazy(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?
            .create_if_missing(true);

        // 書き込みはキューで直列化済み。接続 1 本なら `:memory:` も同じ DB を見続ける
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    /// プールを閉じる（シャットダウン時）
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl GridRepository for SqliteGridRepository {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        // 既存テーブルに (x, y) の重複行があると作成できない
        sqlx::query(CREATE_UNIQUE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepositoryError::Unavailable(format!(
                    "unique index on grid (x, y) could not be created: {}",
                    e
                ))
            })?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PixelRecord>, RepositoryError> {
        let rows: Vec<(i64, i64, String)> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::ReadFailed(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(x, y, color)| PixelRecord { x, y, color })
            .collect())
    }

    async fn upsert_pixel(&self, record: PixelRecord) -> Result<(), RepositoryError> {
        sqlx::query(UPSERT)
            .bind(record.x)
            .bind(record.y)
            .bind(record.color)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    async fn replace_all(&self, records: Vec<PixelRecord>) -> Result<(), RepositoryError> {
        let write_failed = |e: sqlx::Error| RepositoryError::WriteFailed(e.to_string());

        // commit 前にエラーで抜けた場合、tx の drop でロールバックされる
        let mut tx = self.pool.begin().await.map_err(write_failed)?;
        sqlx::query(DELETE_ALL)
            .execute(&mut *tx)
            .await
            .map_err(write_failed)?;
        for record in records {
            sqlx::query(INSERT)
                .bind(record.x)
                .bind(record.y)
                .bind(record.color)
                .execute(&mut *tx)
                .await
                .map_err(write_failed)?;
        }
        tx.commit().await.map_err(write_failed)?;
        Ok(())
    }
}
