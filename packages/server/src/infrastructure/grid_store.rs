//! Authoritative grid state plus its durable copy.
//!
//! The in-memory [`Grid`] is the source of truth while the server runs.
//! Every successful placement is handed to the [`PersistenceQueue`], which
//! writes one job at a time in placement order. Storage failures are logged
//! and never undo the in-memory change. After a failed write the next
//! placement rewrites the whole grid, so storage catches up again.

use std::{ops::Deref, sync::Arc};

use tokio::sync::{Mutex, MutexGuard};

use crate::{
    config::PersistStrategy,
    domain::{Color, Coordinate, Grid, GridError, GridRepository, GridSize, PixelRecord},
};

use super::repository::{PersistenceQueue, WriteJob};

/// Result of a placement that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelApplied {
    pub coordinate: Coordinate,
    /// `false` when the write to storage failed (memory still has the pixel)
    pub persisted: bool,
}

/// Read-only view of the grid, held under the grid lock
pub struct GridReadGuard<'a>(MutexGuard<'a, Grid>);

impl Deref for GridReadGuard<'_> {
    type Target = Grid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct GridStore {
    size: GridSize,
    grid: Mutex<Grid>,
    queue: PersistenceQueue,
    strategy: PersistStrategy,
}

impl GridStore {
    /// Read the persisted grid
    ///
    /// A storage failure yields an empty grid so the server can still boot.
    pub async fn load(repository: &dyn GridRepository, size: GridSize) -> Grid {
        let records = match repository.load_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to load grid, starting with a blank canvas: {}", e);
                return Grid::new(size);
            }
        };

        let (grid, rejected) = Grid::from_records(size, records);
        for record in &rejected {
            tracing::warn!(
                "Skipping stored pixel ({}, {}) outside the {}x{} canvas",
                record.x,
                record.y,
                size.value(),
                size.value()
            );
        }
        tracing::info!("Loaded {} pixels from storage", grid.len());
        grid
    }

    /// Prepare storage, load the grid and start the persistence writer
    pub async fn open(
        repository: Arc<dyn GridRepository>,
        size: GridSize,
        strategy: PersistStrategy,
    ) -> Self {
        let strategy = match repository.ensure_schema().await {
            Ok(()) => strategy,
            Err(e) if strategy == PersistStrategy::Upsert => {
                // ON CONFLICT needs the (x, y) unique index
                tracing::warn!(
                    "Failed to prepare grid storage, per-pixel upserts will not work; \
                     falling back to full rewrites: {}",
                    e
                );
                PersistStrategy::FullRewrite
            }
            Err(e) => {
                tracing::warn!("Failed to prepare grid storage: {}", e);
                strategy
            }
        };
        let grid = Self::load(repository.as_ref(), size).await;
        Self::with_grid(grid, repository, strategy)
    }

    /// Start from an already loaded grid
    pub fn with_grid(
        grid: Grid,
        repository: Arc<dyn GridRepository>,
        strategy: PersistStrategy,
    ) -> Self {
        Self {
            size: grid.size(),
            grid: Mutex::new(grid),
            queue: PersistenceQueue::spawn(repository),
            strategy,
        }
    }

    /// Set `(x, y)` to `color` and persist it
    ///
    /// Out-of-range coordinates are rejected before anything changes. The
    /// write is queued while the grid lock is held, so storage sees writes in
    /// the same order as memory.
    pub async fn apply_pixel(
        &self,
        x: i64,
        y: i64,
        color: Color,
    ) -> Result<PixelApplied, GridError> {
        let (coordinate, pending) = {
            let mut grid = self.grid.lock().await;
            let coordinate = grid.set(x, y, color.clone())?;
            let job = match self.strategy {
                PersistStrategy::Upsert if !self.queue.needs_full_write() => {
                    WriteJob::Upsert(PixelRecord::new(
                        i64::from(coordinate.x()),
                        i64::from(coordinate.y()),
                        color.into_string(),
                    ))
                }
                PersistStrategy::Upsert => {
                    tracing::info!("Storage missed an earlier write; rewriting the whole grid");
                    WriteJob::ReplaceAll(grid.to_records())
                }
                PersistStrategy::FullRewrite => WriteJob::ReplaceAll(grid.to_records()),
            };
            (coordinate, self.queue.enqueue(job))
        };

        let persisted = match pending.wait().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Pixel {} kept in memory but not persisted: {}",
                    coordinate,
                    e
                );
                false
            }
        };

        Ok(PixelApplied {
            coordinate,
            persisted,
        })
    }

    /// Copy of the current grid
    pub async fn snapshot(&self) -> Grid {
        self.grid.lock().await.clone()
    }

    /// Hold the grid still while reading it
    ///
    /// Placements wait until the guard is dropped.
    pub async fn read(&self) -> GridReadGuard<'_> {
        GridReadGuard(self.grid.lock().await)
    }

    pub fn size(&self) -> GridSize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{RepositoryError, repository::MockGridRepository};
    use crate::infrastructure::repository::InMemoryGridRepository;

    /// 最初の upsert だけ失敗するリポジトリ
    struct FlakyGridRepository {
        inner: InMemoryGridRepository,
        failed_once: AtomicBool,
    }

    impl FlakyGridRepository {
        fn new() -> Self {
            Self {
                inner: InMemoryGridRepository::new(),
                failed_once: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl GridRepository for FlakyGridRepository {
        async fn ensure_schema(&self) -> Result<(), RepositoryError> {
            self.inner.ensure_schema().await
        }

        async fn load_all(&self) -> Result<Vec<PixelRecord>, RepositoryError> {
            self.inner.load_all().await
        }

        async fn upsert_pixel(&self, record: PixelRecord) -> Result<(), RepositoryError> {
            if !self.failed_once.swap(true, Ordering::SeqCst) {
                return Err(RepositoryError::WriteFailed("database is locked".to_string()));
            }
            self.inner.upsert_pixel(record).await
        }

        async fn replace_all(&self, records: Vec<PixelRecord>) -> Result<(), RepositoryError> {
            self.inner.replace_all(records).await
        }
    }

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - GridStore の load / apply_pixel / snapshot
    //
    // 【なぜこのテストが必要か】
    // - メモリ上のグリッドと永続化された行が一致し続けることが中核の不変条件
    // - 永続化の失敗がサービスを止めないことを保証する
    //
    // 【どのようなシナリオをテストするか】
    // 1. 正常系：配置が保存され、再読み込みで同じグリッドになる
    // 2. 異常系：範囲外の座標（メモリも DB も変化しない）
    // 3. 異常系：読み込み失敗・書き込み失敗
    // 4. 書き込み失敗後の次の配置で DB が追いつく
    // 5. 全置換戦略（スキーマ準備に失敗した場合の切り替えを含む）
    // ========================================

    fn size(value: u32) -> GridSize {
        GridSize::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_apply_pixel_persists_and_survives_reload() {
        // テスト項目: 配置したピクセルが保存され、再起動（再読み込み）後も同じ色になる
        // given (前提条件):
        let repo = Arc::new(InMemoryGridRepository::new());
        let store = GridStore::open(repo.clone(), size(1000), PersistStrategy::Upsert).await;

        // when (操作):
        let applied = store
            .apply_pixel(5, 5, Color::new("#ff0000"))
            .await
            .unwrap();
        let reloaded = GridStore::load(repo.as_ref(), size(1000)).await;

        // then (期待する結果):
        assert!(applied.persisted);
        assert_eq!(reloaded, store.snapshot().await);
        assert_eq!(reloaded.color_at(5, 5), Some(&Color::new("#ff0000")));
    }

    #[tokio::test]
    async fn test_apply_pixel_out_of_bounds_changes_nothing() {
        // テスト項目: 範囲外の座標はエラーになり、メモリにも DB にも反映されない
        // given (前提条件):
        let repo = Arc::new(InMemoryGridRepository::new());
        let store = GridStore::open(repo.clone(), size(10), PersistStrategy::Upsert).await;

        // when (操作):
        let result = store.apply_pixel(10, -1, Color::new("#ff0000")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(GridError::OutOfBounds { .. })));
        assert!(store.snapshot().await.is_empty());
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_load_failure_starts_blank() {
        // テスト項目: 読み込みに失敗しても空のグリッドで起動できる
        // given (前提条件):
        let mut mock = MockGridRepository::new();
        mock.expect_ensure_schema().returning(|| Ok(()));
        mock.expect_load_all()
            .returning(|| Err(RepositoryError::ReadFailed("no such table".to_string())));

        // when (操作):
        let store = GridStore::open(Arc::new(mock), size(10), PersistStrategy::Upsert).await;

        // then (期待する結果):
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_pixel_in_memory() {
        // テスト項目: 書き込みに失敗してもメモリ上の変更はロールバックされない
        // given (前提条件):
        let mut mock = MockGridRepository::new();
        mock.expect_upsert_pixel()
            .times(1)
            .returning(|_| Err(RepositoryError::WriteFailed("database is locked".to_string())));
        let store = GridStore::with_grid(
            Grid::new(size(10)),
            Arc::new(mock),
            PersistStrategy::Upsert,
        );

        // when (操作):
        let applied = store
            .apply_pixel(3, 4, Color::new("#FFFF00"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!applied.persisted);
        assert_eq!(
            store.snapshot().await.color_at(3, 4),
            Some(&Color::new("#FFFF00"))
        );
    }

    #[tokio::test]
    async fn test_next_placement_after_failed_upsert_resyncs_storage() {
        // テスト項目: upsert が 1 度失敗しても、次の配置で失敗したセルも保存される
        // given (前提条件):
        let repo = Arc::new(FlakyGridRepository::new());
        let store = GridStore::open(repo.clone(), size(10), PersistStrategy::Upsert).await;
        let first = store
            .apply_pixel(1, 1, Color::new("#ff0000"))
            .await
            .unwrap();

        // when (操作):
        let second = store
            .apply_pixel(2, 2, Color::new("#2351a5"))
            .await
            .unwrap();
        let reloaded = GridStore::load(repo.as_ref(), size(10)).await;

        // then (期待する結果):
        assert!(!first.persisted);
        assert!(second.persisted);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded, store.snapshot().await);
    }

    #[tokio::test]
    async fn test_resync_returns_to_per_pixel_upserts() {
        // テスト項目: 全置換で追いついた後は 1 セル単位の upsert に戻る
        // given (前提条件):
        let mut mock = MockGridRepository::new();
        mock.expect_upsert_pixel()
            .times(2)
            .returning(|record| {
                if record.x == 1 {
                    Err(RepositoryError::WriteFailed("database is locked".to_string()))
                } else {
                    Ok(())
                }
            });
        mock.expect_replace_all()
            .withf(|records| records.len() == 2)
            .times(1)
            .returning(|_| Ok(()));
        let store = GridStore::with_grid(
            Grid::new(size(10)),
            Arc::new(mock),
            PersistStrategy::Upsert,
        );

        // when (操作):
        store.apply_pixel(1, 1, Color::new("#000000")).await.unwrap();
        let resync = store.apply_pixel(2, 2, Color::new("#000000")).await.unwrap();
        let after = store.apply_pixel(3, 3, Color::new("#000000")).await.unwrap();

        // then (期待する結果):
        assert!(resync.persisted);
        assert!(after.persisted);
    }

    #[tokio::test]
    async fn test_schema_failure_falls_back_to_full_rewrite() {
        // テスト項目: スキーマ準備に失敗した場合、upsert を使わず全置換で保存する
        // given (前提条件):
        let mut mock = MockGridRepository::new();
        mock.expect_ensure_schema().returning(|| {
            Err(RepositoryError::Unavailable(
                "UNIQUE constraint failed: grid.x, grid.y".to_string(),
            ))
        });
        mock.expect_load_all()
            .returning(|| Ok(vec![PixelRecord::new(1, 1, "#000000")]));
        mock.expect_upsert_pixel().never();
        mock.expect_replace_all()
            .withf(|records| {
                records
                    == &vec![
                        PixelRecord::new(1, 1, "#000000"),
                        PixelRecord::new(4, 4, "#ff4500"),
                    ]
            })
            .times(1)
            .returning(|_| Ok(()));

        // when (操作):
        let store = GridStore::open(Arc::new(mock), size(10), PersistStrategy::Upsert).await;
        let applied = store
            .apply_pixel(4, 4, Color::new("#ff4500"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(applied.persisted);
    }

    #[tokio::test]
    async fn test_full_rewrite_writes_whole_grid() {
        // テスト項目: 全置換戦略では毎回グリッド全体が書き込まれる
        // given (前提条件):
        let repo = Arc::new(InMemoryGridRepository::with_records(vec![PixelRecord::new(
            1, 1, "#000000",
        )]));
        let store = GridStore::open(repo.clone(), size(10), PersistStrategy::FullRewrite).await;

        // when (操作):
        store
            .apply_pixel(2, 2, Color::new("#008C45"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            repo.load_all().await.unwrap(),
            vec![
                PixelRecord::new(1, 1, "#000000"),
                PixelRecord::new(2, 2, "#008C45"),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_skips_rows_outside_canvas() {
        // テスト項目: キャンバスが縮小された場合、範囲外の行は読み込まれない
        // given (前提条件):
        let repo = InMemoryGridRepository::with_records(vec![
            PixelRecord::new(1, 1, "#000000"),
            PixelRecord::new(50, 50, "#000000"),
        ]);

        // when (操作):
        let grid = GridStore::load(&repo, size(10)).await;

        // then (期待する結果):
        assert_eq!(grid.len(), 1);
    }
}
