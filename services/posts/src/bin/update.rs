/// 投稿更新 Lambdaエントリポイント（PUT /posts/{postId}）
use lambda_http::{run, service_fn, Error, Request};
use posts::application::{routes, PostHandler};
use posts::infrastructure::{init_logging, DynamoDbConfig, DynamoPostRepository};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // 設定とリポジトリはコールドスタート時に一度だけ構築し、全呼び出しで共有する
    let config = DynamoDbConfig::from_env().await?;
    let handler = PostHandler::new(DynamoPostRepository::from_config(&config));

    info!(table = config.posts_table(), "update Lambda関数を初期化");

    run(service_fn(|request: Request| routes::update(&handler, request))).await
}
