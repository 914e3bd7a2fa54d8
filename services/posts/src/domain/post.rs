/// 投稿（post）ドキュメント
///
/// スキーマレスなJSONオブジェクトをそのまま保持し、サーバーが付与する
/// `id`・`createdAt`・`updatedAt`のみを特別扱いする。
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// 主キー属性名
pub const ID: &str = "id";
/// 作成日時属性名
pub const CREATED_AT: &str = "createdAt";
/// 更新日時属性名
pub const UPDATED_AT: &str = "updatedAt";
/// 本文属性名
pub const CONTENT: &str = "content";
/// 投稿者属性名
pub const AUTHOR: &str = "author";

/// 投稿の属性マップ（挿入順を保持）
pub type Attributes = Map<String, Value>;

/// 投稿ペイロードの検証エラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PostError {
    /// ペイロードがJSONオブジェクトではない
    #[error("Payload is not a JSON object")]
    NotAnObject,

    /// 必須フィールドが欠落
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

/// 保存済み、または保存予定の投稿
///
/// クライアントが送った任意のフィールドはそのまま保持される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Post(Attributes);

impl Post {
    /// クライアントのペイロードからサーバー採番済みの投稿を作成
    ///
    /// ペイロードに`id`や`createdAt`が含まれていても、サーバーの値で上書きする。
    pub fn create(draft: Value, id: String, created_at: String) -> Result<Self, PostError> {
        let Value::Object(mut attributes) = draft else {
            return Err(PostError::NotAnObject);
        };

        attributes.insert(CREATED_AT.to_string(), Value::String(created_at));
        attributes.insert(ID.to_string(), Value::String(id));

        Ok(Self(attributes))
    }

    /// キーのみを持つ投稿（存在しないIDへの更新で生成される疎なアイテム）
    pub fn key_only(id: &str) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert(ID.to_string(), Value::String(id.to_string()));
        Self(attributes)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID).and_then(Value::as_str)
    }

    pub fn created_at(&self) -> Option<&str> {
        self.0.get(CREATED_AT).and_then(Value::as_str)
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.0.get(UPDATED_AT).and_then(Value::as_str)
    }

    /// 任意フィールドの値を取得
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.0
    }

    /// 更新内容を適用（`content`・`author`・`updatedAt`のみ上書き）
    pub fn apply(&mut self, changes: &PostChanges) {
        self.0.extend(changes.to_attributes());
    }
}

/// Update操作で書き換える3属性
#[derive(Debug, Clone, PartialEq)]
pub struct PostChanges {
    content: Value,
    author: Value,
    updated_at: String,
}

impl PostChanges {
    /// リクエストボディから更新内容を取り出す
    ///
    /// `content`と`author`は必須（`null`も値として扱う）。それ以外のフィールドは無視する。
    pub fn from_body(body: Value, updated_at: String) -> Result<Self, PostError> {
        let Value::Object(mut fields) = body else {
            return Err(PostError::NotAnObject);
        };

        let content = fields
            .remove(CONTENT)
            .ok_or(PostError::MissingField(CONTENT))?;
        let author = fields
            .remove(AUTHOR)
            .ok_or(PostError::MissingField(AUTHOR))?;

        Ok(Self {
            content,
            author,
            updated_at,
        })
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn author(&self) -> &Value {
        &self.author
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    /// 更新される属性のみのマップ（ストアのUPDATED_NEWに相当）
    pub fn to_attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(CONTENT.to_string(), self.content.clone());
        attributes.insert(AUTHOR.to_string(), self.author.clone());
        attributes.insert(
            UPDATED_AT.to_string(),
            Value::String(self.updated_at.clone()),
        );
        attributes
    }
}
