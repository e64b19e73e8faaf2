//! 永続化書き込みキュー
//!
//! ## 責務
//!
//! - グリッドへの書き込みを 1 件ずつ順番に実行する（同時に実行中の書き込みは常に 1 件）
//! - 各書き込みの結果を `oneshot` で呼び出し元に返す
//! - 失敗した書き込みがあれば、次の全置換が成功するまで「未同期」として記録する
//!
//! ## 設計ノート
//!
//! ワーカーは `tokio::spawn` された独立タスクです。呼び出し元のセッションが
//! 切断されて future が drop されても、キューに積まれた書き込みは最後まで実行されます。

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::{mpsc, oneshot};

use crate::domain::{GridRepository, PixelRecord, RepositoryError};

/// キューに積む書き込み
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteJob {
    /// 1 セルの insert-or-replace
    Upsert(PixelRecord),
    /// テーブル全体の置き換え
    ReplaceAll(Vec<PixelRecord>),
}

struct WriteRequest {
    job: WriteJob,
    ack: oneshot::Sender<Result<(), RepositoryError>>,
}

/// 書き込み完了待ちのハンドル
pub struct PendingWrite(oneshot::Receiver<Result<(), RepositoryError>>);

impl PendingWrite {
    /// 書き込みの完了を待つ
    pub async fn wait(self) -> Result<(), RepositoryError> {
        self.0.await.unwrap_or_else(|_| {
            Err(RepositoryError::Unavailable(
                "persistence writer stopped".to_string(),
            ))
        })
    }
}

/// 直列化された書き込みキュー
#[derive(Clone)]
pub struct PersistenceQueue {
    tx: mpsc::UnboundedSender<WriteRequest>,
    out_of_sync: Arc<AtomicBool>,
}

impl PersistenceQueue {
    /// ワーカータスクを起動してキューを作成
    ///
    /// tokio ランタイム上で呼び出す必要があります。
    pub fn spawn(repository: Arc<dyn GridRepository>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let out_of_sync = Arc::new(AtomicBool::new(false));
        writer_loop(rx, repository, out_of_sync.clone());
        Self { tx, out_of_sync }
    }

    /// 失敗した書き込みがあり、まだ全置換で取り戻していないか
    ///
    /// 1 セル単位の書き込みでは失敗したセルが保存されないままになるため、
    /// `true` の間は `WriteJob::ReplaceAll` を積む必要があります。
    pub fn needs_full_write(&self) -> bool {
        self.out_of_sync.load(Ordering::Acquire)
    }

    /// 書き込みをキューの末尾に積む
    ///
    /// 積んだ順番に実行されます。
    pub fn enqueue(&self, job: WriteJob) -> PendingWrite {
        let (ack, done) = oneshot::channel();
        if self.tx.send(WriteRequest { job, ack }).is_err() {
            // ワーカー停止済み: ack は drop され、wait() が Unavailable を返す
            tracing::warn!("Persistence writer is not running; write dropped");
            self.out_of_sync.store(true, Ordering::Release);
        }
        PendingWrite(done)
    }
}

/// キューから 1 件ずつ取り出してリポジトリに書き込むタスク
fn writer_loop(
    mut rx: mpsc::UnboundedReceiver<WriteRequest>,
    repository: Arc<dyn GridRepository>,
    out_of_sync: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(WriteRequest { job, ack }) = rx.recv().await {
            let full_write = matches!(job, WriteJob::ReplaceAll(_));
            let result = match job {
                WriteJob::Upsert(record) => repository.upsert_pixel(record).await,
                WriteJob::ReplaceAll(records) => repository.replace_all(records).await,
            };
            // 書き込みは 1 件ずつなので、成功した全置換はそれ以前の失敗をすべて上書きしている
            match &result {
                Ok(()) if full_write => out_of_sync.store(false, Ordering::Release),
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!("Failed to persist grid: {}", e);
                    out_of_sync.store(true, Ordering::Release);
                }
            }
            // 呼び出し元が待っていなくても書き込みは完了している
            let _ = ack.send(result);
        }
        tracing::debug!("Persistence writer stopped");
    })
}
