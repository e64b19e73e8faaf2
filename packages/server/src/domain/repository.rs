//! Repository trait 定義
//!
//! ドメイン層が必要とするグリッド永続化のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{PixelRecord, RepositoryError};

/// Grid Repository trait
///
/// 永続化されたグリッド（`(x, y, color)` の行の集合）へのインターフェース。
/// 書き込みの直列化は呼び出し側（`GridStore` の書き込みキュー）が保証するため、
/// 実装は 1 回の呼び出しをアトミックに処理することだけに責任を持つ。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GridRepository: Send + Sync {
    /// テーブルが存在しなければ作成する
    async fn ensure_schema(&self) -> Result<(), RepositoryError>;

    /// 全ての行を取得
    async fn load_all(&self) -> Result<Vec<PixelRecord>, RepositoryError>;

    /// 1 セルを insert-or-replace する
    async fn upsert_pixel(&self, record: PixelRecord) -> Result<(), RepositoryError>;

    /// 全ての行を削除し、与えられた行で置き換える（1 トランザクション）
    async fn replace_all(&self, records: Vec<PixelRecord>) -> Result<(), RepositoryError>;
}
