/// DynamoDB接続設定
///
/// プロセス起動時に一度だけ構築し、各呼び出しへ参照で渡す不変コンテキスト。
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// 投稿テーブル名を指定する環境変数
pub const POSTS_TABLE_ENV: &str = "DYNAMODB_TABLE";

/// DynamoDB設定のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DynamoDbConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// テーブル名とクライアントを持つDynamoDB設定
#[derive(Debug, Clone)]
pub struct DynamoDbConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    /// 投稿テーブル名
    posts_table: String,
}

impl DynamoDbConfig {
    /// 環境からAWS設定を読み込み、`DYNAMODB_TABLE`からテーブル名を読み取る
    ///
    /// AWS認証情報・リージョン・エンドポイント（`AWS_ENDPOINT_URL`）は
    /// aws-configのデフォルトチェーンで解決される。
    pub async fn from_env() -> Result<Self, DynamoDbConfigError> {
        // テーブル名が無ければAWS設定を読む前に失敗させる
        let posts_table = Self::posts_table_from_env()?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self {
            client,
            posts_table,
        })
    }

    /// 明示的な値で新しいDynamoDbConfigを作成（テスト用）
    pub fn new(client: DynamoDbClient, posts_table: String) -> Self {
        Self {
            client,
            posts_table,
        }
    }

    /// 環境変数から投稿テーブル名を読み取る（空文字は未設定扱い）
    pub fn posts_table_from_env() -> Result<String, DynamoDbConfigError> {
        std::env::var(POSTS_TABLE_ENV)
            .ok()
            .filter(|table| !table.trim().is_empty())
            .ok_or_else(|| DynamoDbConfigError::MissingEnvVar(POSTS_TABLE_ENV.to_string()))
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// 投稿テーブル名を取得
    pub fn posts_table(&self) -> &str {
        &self.posts_table
    }
}
