/// 投稿ハンドラー
///
/// 各操作はリクエスト1件をストアへのAPI呼び出し1回に変換する。
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{
    current_timestamp, generate_post_id, Attributes, Post, PostChanges, PostError,
};
use crate::infrastructure::{PostRepository, RepositoryError};

/// 投稿ハンドラーのエラー型
///
/// HTTP境界ではすべて500に集約されるが、ログには種別を残す。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PostHandlerError {
    /// リクエストボディが空
    #[error("Missing request body")]
    MissingBody,

    /// リクエストボディがJSONとして不正
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// ペイロードの形が不正（オブジェクトでない、必須フィールド欠落）
    #[error(transparent)]
    InvalidPost(#[from] PostError),

    /// パスパラメータが欠落
    #[error("Missing path parameter: {0}")]
    MissingPathParameter(&'static str),

    /// 投稿が存在しない
    #[error("Post not found: {0}")]
    NotFound(String),

    /// リポジトリ操作エラー
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl PostHandlerError {
    /// ログ用のエラー種別
    pub fn kind(&self) -> &'static str {
        match self {
            PostHandlerError::MissingBody => "missing_body",
            PostHandlerError::InvalidJson(_) => "invalid_json",
            PostHandlerError::InvalidPost(PostError::NotAnObject) => "not_an_object",
            PostHandlerError::InvalidPost(PostError::MissingField(_)) => "missing_field",
            PostHandlerError::MissingPathParameter(_) => "missing_path_parameter",
            PostHandlerError::NotFound(_) => "not_found",
            PostHandlerError::Repository(_) => "store_unavailable",
        }
    }
}

/// 投稿のCRUD操作を提供するハンドラー
///
/// リポジトリはプロセス起動時に一度だけ構築され、全呼び出しで共有される。
pub struct PostHandler<R>
where
    R: PostRepository,
{
    /// 投稿リポジトリ
    repo: R,
}

impl<R> PostHandler<R>
where
    R: PostRepository,
{
    /// 新しいPostHandlerを作成
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// 投稿を作成
    ///
    /// # 処理フロー
    /// 1. ボディをJSONオブジェクトとしてパース
    /// 2. `id`と`createdAt`をサーバー側で付与
    /// 3. 無条件にPut
    pub async fn create(&self, body: &[u8]) -> Result<Post, PostHandlerError> {
        let draft = parse_body(body)?;
        let post = Post::create(draft, generate_post_id(), current_timestamp())?;

        self.repo.put(&post).await?;

        info!(post_id = post.id().unwrap_or_default(), "投稿を作成");
        Ok(post)
    }

    /// IDで投稿を取得
    ///
    /// 存在しない場合は`NotFound`
    pub async fn get(&self, post_id: &str) -> Result<Post, PostHandlerError> {
        let post = self
            .repo
            .get(post_id)
            .await?
            .ok_or_else(|| PostHandlerError::NotFound(post_id.to_string()))?;

        debug!(post_id = post_id, post = ?post.attributes(), "投稿を取得");
        Ok(post)
    }

    /// 全投稿を取得（1スキャンページ分）
    pub async fn list(&self) -> Result<Vec<Post>, PostHandlerError> {
        let posts = self.repo.scan().await?;

        debug!(count = posts.len(), "投稿一覧を取得");
        Ok(posts)
    }

    /// `content`・`author`を更新し、`updatedAt`を現在時刻にする
    ///
    /// 存在確認は行わない。存在しないIDの場合はストア側で疎なアイテムが作られる。
    ///
    /// # 戻り値
    /// 更新後の3属性
    pub async fn update(
        &self,
        post_id: &str,
        body: &[u8],
    ) -> Result<Attributes, PostHandlerError> {
        let changes = PostChanges::from_body(parse_body(body)?, current_timestamp())?;

        let updated = self.repo.update(post_id, &changes).await?;

        info!(post_id = post_id, updated = ?updated, "投稿を更新");
        Ok(updated)
    }

    /// IDで投稿を削除（存在しなかった場合も成功）
    pub async fn delete(&self, post_id: &str) -> Result<(), PostHandlerError> {
        self.repo.delete(post_id).await?;

        info!(post_id = post_id, "投稿を削除");
        Ok(())
    }
}

/// リクエストボディをJSONとしてパース
fn parse_body(body: &[u8]) -> Result<Value, PostHandlerError> {
    if body.is_empty() {
        return Err(PostHandlerError::MissingBody);
    }

    serde_json::from_slice(body).map_err(|e| PostHandlerError::InvalidJson(e.to_string()))
}
