/// 投稿とDynamoDBアイテム（型付き属性マップ）の相互変換
///
/// 型の対応: 文字列→S, 数値→N, 真偽値→BOOL, null→NULL, オブジェクト→M, 配列→L
use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::Value;

use crate::domain::{post::ID, Attributes, Post};
use crate::infrastructure::post_repository::RepositoryError;

/// DynamoDBアイテム
pub type Item = HashMap<String, AttributeValue>;

/// 投稿をDynamoDBアイテムに変換
pub fn to_item(post: &Post) -> Result<Item, RepositoryError> {
    serde_dynamo::to_item(post).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// DynamoDBアイテムを投稿に変換
pub fn from_item(item: Item) -> Result<Post, RepositoryError> {
    serde_dynamo::from_item(item).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// 属性マップ（UpdateItemのUPDATED_NEW等）をJSONオブジェクトに変換
pub fn attributes_from_item(item: Item) -> Result<Attributes, RepositoryError> {
    serde_dynamo::from_item(item).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// 単一のJSON値を属性値に変換（式の属性値用）
pub fn to_attribute_value(value: &Value) -> Result<AttributeValue, RepositoryError> {
    serde_dynamo::to_attribute_value(value)
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// GetItem/UpdateItem/DeleteItemに渡す主キー
pub fn key(post_id: &str) -> Item {
    HashMap::from([(ID.to_string(), AttributeValue::S(post_id.to_string()))])
}
