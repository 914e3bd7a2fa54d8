// API Gatewayプロキシ統合のルート
//
// HTTPリクエストをPostHandlerの操作に変換し、結果をHTTPレスポンスに戻す。
// 失敗はすべて500 + プレーンテキストのメッセージに集約する。

use lambda_http::http::header::{HeaderValue, CONTENT_TYPE};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Error, Request, RequestExt, Response};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::application::post_handler::{PostHandler, PostHandlerError};
use crate::infrastructure::PostRepository;

/// 投稿IDのパスパラメータ名
pub const POST_ID_PARAM: &str = "postId";

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain";

/// POST /posts
pub async fn create<R>(handler: &PostHandler<R>, request: Request) -> Result<Response<Body>, Error>
where
    R: PostRepository,
{
    log_request("create", &request);

    match handler.create(request.body()).await {
        Ok(_) => empty_response(StatusCode::CREATED),
        Err(err) => failure(
            "create",
            &err,
            "An error occurred while creating post.".to_string(),
        ),
    }
}

/// GET /posts/{postId}
pub async fn get<R>(handler: &PostHandler<R>, request: Request) -> Result<Response<Body>, Error>
where
    R: PostRepository,
{
    log_request("get", &request);

    let result = match post_id(&request) {
        Some(post_id) => handler.get(&post_id).await,
        None => Err(PostHandlerError::MissingPathParameter(POST_ID_PARAM)),
    };

    match result {
        Ok(post) => json_response(StatusCode::OK, &post),
        Err(err) => failure(
            "get",
            &err,
            "An error occurred while getting post.".to_string(),
        ),
    }
}

/// GET /posts
pub async fn list<R>(handler: &PostHandler<R>, request: Request) -> Result<Response<Body>, Error>
where
    R: PostRepository,
{
    log_request("list", &request);

    match handler.list().await {
        Ok(posts) => json_response(StatusCode::OK, &posts),
        Err(err) => failure(
            "list",
            &err,
            "An error occurred while getting all posts.".to_string(),
        ),
    }
}

/// PUT /posts/{postId}
pub async fn update<R>(handler: &PostHandler<R>, request: Request) -> Result<Response<Body>, Error>
where
    R: PostRepository,
{
    log_request("update", &request);

    let post_id = post_id(&request);
    let result = match post_id.as_deref() {
        Some(post_id) => handler.update(post_id, request.body()).await.map(drop),
        None => Err(PostHandlerError::MissingPathParameter(POST_ID_PARAM)),
    };

    match result {
        Ok(()) => empty_response(StatusCode::OK),
        Err(err) => failure(
            "update",
            &err,
            format!(
                "An error occurred while updating post {}",
                post_id.unwrap_or_default()
            ),
        ),
    }
}

/// DELETE /posts/{postId}
pub async fn delete<R>(handler: &PostHandler<R>, request: Request) -> Result<Response<Body>, Error>
where
    R: PostRepository,
{
    log_request("delete", &request);

    let post_id = post_id(&request);
    let result = match post_id.as_deref() {
        Some(post_id) => handler.delete(post_id).await,
        None => Err(PostHandlerError::MissingPathParameter(POST_ID_PARAM)),
    };

    match result {
        Ok(()) => empty_response(StatusCode::NO_CONTENT),
        Err(err) => failure(
            "delete",
            &err,
            format!(
                "An error occurred while deleting post {}",
                post_id.unwrap_or_default()
            ),
        ),
    }
}

/// パスパラメータから投稿IDを取得
fn post_id(request: &Request) -> Option<String> {
    request
        .path_parameters()
        .first(POST_ID_PARAM)
        .map(str::to_string)
}

/// 受信リクエストをログ出力
fn log_request(operation: &'static str, request: &Request) {
    info!(
        operation = operation,
        method = %request.method(),
        path = %request.uri().path(),
        post_id = post_id(request).as_deref().unwrap_or("-"),
        "リクエスト受信"
    );
    debug!(
        operation = operation,
        body = %String::from_utf8_lossy(request.body()),
        "リクエストボディ"
    );
}

fn empty_response(status: StatusCode) -> Result<Response<Body>, Error> {
    Ok(Response::builder().status(status).body(Body::Empty)?)
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Body>, Error> {
    let json = serde_json::to_string(value)?;

    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
        .body(Body::Text(json))?)
}

/// 500レスポンス（エラー種別はログにのみ残す）
fn failure(
    operation: &'static str,
    err: &PostHandlerError,
    message: String,
) -> Result<Response<Body>, Error> {
    error!(
        operation = operation,
        kind = err.kind(),
        error = %err,
        "投稿操作に失敗"
    );

    Ok(Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))
        .body(Body::Text(message))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::RepositoryError;
    use crate::infrastructure::logging::init_test_logging;
    use crate::infrastructure::post_repository::tests::MockPostRepository;
    use lambda_http::http::Request as HttpRequest;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    // ==================== テストヘルパー ====================

    fn create_test_handler() -> (PostHandler<MockPostRepository>, MockPostRepository) {
        init_test_logging();
        let repo = MockPostRepository::new();
        let handler = PostHandler::new(repo.clone());
        (handler, repo)
    }

    fn request(method: &str, uri: &str, post_id: Option<&str>, body: Body) -> Request {
        let request = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .unwrap();

        match post_id {
            Some(post_id) => request.with_path_parameters(HashMap::from([(
                POST_ID_PARAM.to_string(),
                post_id.to_string(),
            )])),
            None => request,
        }
    }

    fn body_text(response: &Response<Body>) -> String {
        match response.body() {
            Body::Text(text) => text.clone(),
            Body::Binary(bytes) => String::from_utf8(bytes.clone()).unwrap(),
            Body::Empty => String::new(),
            _ => panic!("予期しないBody型"),
        }
    }

    fn content_type(response: &Response<Body>) -> Option<&str> {
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// 一覧に含まれる投稿IDを取得
    async fn listed_ids(handler: &PostHandler<MockPostRepository>) -> Vec<String> {
        let response = list(handler, request("GET", "/posts", None, Body::Empty))
            .await
            .unwrap();
        let posts: Vec<Value> = serde_json::from_str(&body_text(&response)).unwrap();
        posts
            .iter()
            .filter_map(|post| post["id"].as_str().map(str::to_string))
            .collect()
    }

    /// 投稿を作成し、採番されたIDを一覧の差分から取り出す
    async fn create_post(handler: &PostHandler<MockPostRepository>, body: Value) -> String {
        let before = listed_ids(handler).await;

        let response = create(
            handler,
            request("POST", "/posts", None, Body::from(body.to_string())),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 201);

        listed_ids(handler)
            .await
            .into_iter()
            .find(|id| !before.contains(id))
            .unwrap()
    }

    // ==================== create ====================

    #[tokio::test]
    async fn test_create_returns_201_without_body() {
        let (handler, repo) = create_test_handler();

        let response = create(
            &handler,
            request(
                "POST",
                "/posts",
                None,
                Body::from(r#"{"content":"hello","author":"alice"}"#),
            ),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 201);
        assert_eq!(body_text(&response), "");
        assert_eq!(repo.item_count(), 1);
    }

    #[tokio::test]
    async fn test_create_malformed_json_returns_500() {
        let (handler, _) = create_test_handler();

        let response = create(
            &handler,
            request("POST", "/posts", None, Body::from("{\"content\":")),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(content_type(&response), Some("text/plain"));
        assert_eq!(
            body_text(&response),
            "An error occurred while creating post."
        );
    }

    #[tokio::test]
    async fn test_create_store_failure_returns_500() {
        let (handler, repo) = create_test_handler();
        repo.set_next_error(RepositoryError::WriteError("throttled".to_string()));

        let response = create(
            &handler,
            request("POST", "/posts", None, Body::from(r#"{"content":"x"}"#)),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 500);
    }

    // ==================== get ====================

    /// 作成 → 取得のシナリオ
    #[tokio::test]
    async fn test_create_then_get_returns_post() {
        let (handler, _) = create_test_handler();
        let post_id = create_post(&handler, json!({"content": "hello", "author": "alice"})).await;

        let response = get(
            &handler,
            request("GET", &format!("/posts/{}", post_id), Some(&post_id), Body::Empty),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(content_type(&response), Some("application/json"));

        let post: Value = serde_json::from_str(&body_text(&response)).unwrap();
        assert_eq!(post["content"], "hello");
        assert_eq!(post["author"], "alice");
        assert_eq!(post["id"], post_id.as_str());
        assert!(!post["createdAt"].as_str().unwrap().is_empty());
    }

    /// 存在しないIDは404ではなく500
    #[tokio::test]
    async fn test_get_never_created_returns_500() {
        let (handler, _) = create_test_handler();

        let response = get(
            &handler,
            request("GET", "/posts/nope", Some("nope"), Body::Empty),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(body_text(&response), "An error occurred while getting post.");
    }

    #[tokio::test]
    async fn test_get_missing_path_parameter_returns_500() {
        let (handler, _) = create_test_handler();

        let response = get(&handler, request("GET", "/posts", None, Body::Empty))
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
    }

    // ==================== list ====================

    #[tokio::test]
    async fn test_list_empty_returns_empty_array() {
        let (handler, _) = create_test_handler();

        let response = list(&handler, request("GET", "/posts", None, Body::Empty))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(content_type(&response), Some("application/json"));
        assert_eq!(body_text(&response), "[]");
    }

    #[tokio::test]
    async fn test_list_returns_all_posts() {
        let (handler, _) = create_test_handler();
        create_post(&handler, json!({"content": "a"})).await;
        create_post(&handler, json!({"content": "b"})).await;
        create_post(&handler, json!({"content": "c"})).await;

        let response = list(&handler, request("GET", "/posts", None, Body::Empty))
            .await
            .unwrap();

        let posts: Vec<Value> = serde_json::from_str(&body_text(&response)).unwrap();
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|post| post["id"].is_string()));
    }

    #[tokio::test]
    async fn test_list_store_failure_returns_500() {
        let (handler, repo) = create_test_handler();
        repo.set_next_error(RepositoryError::ReadError("access denied".to_string()));

        let response = list(&handler, request("GET", "/posts", None, Body::Empty))
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(
            body_text(&response),
            "An error occurred while getting all posts."
        );
    }

    // ==================== update ====================

    #[tokio::test]
    async fn test_update_returns_200_and_keeps_identity() {
        let (handler, _) = create_test_handler();
        let post_id = create_post(&handler, json!({"content": "old", "author": "alice"})).await;
        let path = format!("/posts/{}", post_id);

        let before = get(&handler, request("GET", &path, Some(&post_id), Body::Empty))
            .await
            .unwrap();
        let before: Value = serde_json::from_str(&body_text(&before)).unwrap();

        let response = update(
            &handler,
            request(
                "PUT",
                &path,
                Some(&post_id),
                Body::from(r#"{"content":"new","author":"bob"}"#),
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_text(&response), "");

        let after = get(&handler, request("GET", &path, Some(&post_id), Body::Empty))
            .await
            .unwrap();
        let after: Value = serde_json::from_str(&body_text(&after)).unwrap();

        assert_eq!(after["content"], "new");
        assert_eq!(after["author"], "bob");
        assert!(after["updatedAt"].is_string());
        assert_eq!(after["id"], before["id"]);
        assert_eq!(after["createdAt"], before["createdAt"]);
    }

    /// 存在しないIDへの更新は200を返し、createdAtの無い疎なアイテムを作る
    #[tokio::test]
    async fn test_update_non_existent_upserts_sparse_item() {
        let (handler, _) = create_test_handler();

        let response = update(
            &handler,
            request(
                "PUT",
                "/posts/xyz",
                Some("xyz"),
                Body::from(r#"{"content":"c","author":"a"}"#),
            ),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 200);

        let response = get(&handler, request("GET", "/posts/xyz", Some("xyz"), Body::Empty))
            .await
            .unwrap();
        let post: Value = serde_json::from_str(&body_text(&response)).unwrap();
        let post = post.as_object().unwrap();

        assert_eq!(post.len(), 4);
        assert_eq!(post["id"], "xyz");
        assert_eq!(post["content"], "c");
        assert_eq!(post["author"], "a");
        assert!(post["updatedAt"].is_string());
        assert!(!post.contains_key("createdAt"));
    }

    #[tokio::test]
    async fn test_update_missing_fields_returns_500() {
        let (handler, repo) = create_test_handler();

        let response = update(
            &handler,
            request(
                "PUT",
                "/posts/p1",
                Some("p1"),
                Body::from(r#"{"content":"only"}"#),
            ),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(
            body_text(&response),
            "An error occurred while updating post p1"
        );
        assert_eq!(repo.item_count(), 0);
    }

    // ==================== delete ====================

    /// 同じIDを繰り返し削除しても204
    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (handler, repo) = create_test_handler();
        let post_id = create_post(&handler, json!({"content": "x"})).await;
        let path = format!("/posts/{}", post_id);

        for _ in 0..2 {
            let response = delete(&handler, request("DELETE", &path, Some(&post_id), Body::Empty))
                .await
                .unwrap();
            assert_eq!(response.status(), 204);
            assert_eq!(body_text(&response), "");
        }

        assert_eq!(repo.item_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_store_failure_returns_500() {
        let (handler, repo) = create_test_handler();
        repo.set_next_error(RepositoryError::WriteError("throttled".to_string()));

        let response = delete(
            &handler,
            request("DELETE", "/posts/p9", Some("p9"), Body::Empty),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(
            body_text(&response),
            "An error occurred while deleting post p9"
        );
    }

    #[tokio::test]
    async fn test_delete_missing_path_parameter_returns_500() {
        let (handler, _) = create_test_handler();

        let response = delete(&handler, request("DELETE", "/posts", None, Body::Empty))
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(
            body_text(&response),
            "An error occurred while deleting post "
        );
    }
}
