/// DynamoDBで投稿を管理するための投稿リポジトリ
use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::ReturnValue;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::post::{AUTHOR, CONTENT, UPDATED_AT};
use crate::domain::{Attributes, Post, PostChanges};
use crate::infrastructure::config::DynamoDbConfig;
use crate::infrastructure::item_codec;

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// データのシリアライズ/デシリアライズに失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 投稿永続化用トレイト
///
/// 各メソッドはストアへの単一API呼び出しに対応する。
/// 実装: DynamoDB（本番）、テスト用モック。
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// 投稿を無条件に書き込む（同一IDが存在すれば置換）
    async fn put(&self, post: &Post) -> Result<(), RepositoryError>;

    /// IDで投稿を取得
    ///
    /// # 戻り値
    /// * 見つかった場合は`Ok(Some(Post))`
    /// * 見つからなかった場合は`Ok(None)`
    async fn get(&self, post_id: &str) -> Result<Option<Post>, RepositoryError>;

    /// 全投稿を1ページ分だけスキャン
    ///
    /// ストアの1レスポンス上限を超える分は返らない。
    async fn scan(&self) -> Result<Vec<Post>, RepositoryError>;

    /// `content`・`author`・`updatedAt`を無条件に更新し、更新後の値を返す
    ///
    /// IDが存在しない場合はキーと3属性だけを持つアイテムが作られる（upsert）。
    async fn update(
        &self,
        post_id: &str,
        changes: &PostChanges,
    ) -> Result<Attributes, RepositoryError>;

    /// IDで投稿を削除（存在しなかった場合も成功）
    async fn delete(&self, post_id: &str) -> Result<(), RepositoryError>;
}

/// UpdateItemの更新式
///
/// 属性名はプレースホルダー経由で渡し、予約語との衝突を避ける。
const UPDATE_EXPRESSION: &str = "SET #content = :content, #author = :author, #updatedAt = :updatedAt";

/// PostRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoPostRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// 投稿テーブル名
    table_name: String,
}

impl DynamoPostRepository {
    /// 新しいDynamoPostRepositoryを作成
    ///
    /// # 引数
    /// * `client` - DynamoDBクライアント
    /// * `table_name` - 投稿テーブルの名前
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// 設定からリポジトリを作成
    pub fn from_config(config: &DynamoDbConfig) -> Self {
        Self::new(config.client().clone(), config.posts_table().to_string())
    }

}

#[async_trait]
impl PostRepository for DynamoPostRepository {
    async fn put(&self, post: &Post) -> Result<(), RepositoryError> {
        let item = item_codec::to_item(post)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn get(&self, post_id: &str) -> Result<Option<Post>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(item_codec::key(post_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(DisplayErrorContext(&e).to_string()))?;

        result.item.map(item_codec::from_item).transpose()
    }

    async fn scan(&self) -> Result<Vec<Post>, RepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(DisplayErrorContext(&e).to_string()))?;

        if result.last_evaluated_key.is_some() {
            warn!(
                table = %self.table_name,
                "スキャン結果が1ページを超えているため一部のみ返却"
            );
        }

        let posts = result
            .items
            .unwrap_or_default()
            .into_iter()
            .map(item_codec::from_item)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(table = %self.table_name, count = posts.len(), "スキャン完了");

        Ok(posts)
    }

    async fn update(
        &self,
        post_id: &str,
        changes: &PostChanges,
    ) -> Result<Attributes, RepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(item_codec::key(post_id)))
            .update_expression(UPDATE_EXPRESSION)
            .expression_attribute_names("#content", CONTENT)
            .expression_attribute_names("#author", AUTHOR)
            .expression_attribute_names("#updatedAt", UPDATED_AT)
            .expression_attribute_values(
                ":content",
                item_codec::to_attribute_value(changes.content())?,
            )
            .expression_attribute_values(
                ":author",
                item_codec::to_attribute_value(changes.author())?,
            )
            .expression_attribute_values(
                ":updatedAt",
                item_codec::to_attribute_value(&Value::String(
                    changes.updated_at().to_string(),
                ))?,
            )
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(DisplayErrorContext(&e).to_string()))?;

        match result.attributes {
            Some(attributes) => item_codec::attributes_from_item(attributes),
            None => Ok(Attributes::new()),
        }
    }

    async fn delete(&self, post_id: &str) -> Result<(), RepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(item_codec::key(post_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
