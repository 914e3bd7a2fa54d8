/// ログ基盤モジュール
///
/// Lambda環境向けの構造化ログ設定を提供する。
/// 出力はJSON形式（CloudWatch Logsでのフィールド検索向け）。
use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// `RUST_LOG`が未設定の場合のログレベル
const DEFAULT_LOG_LEVEL: &str = "info";

/// `RUST_LOG`を優先し、未設定・不正な場合は`default_level`を使うフィルター
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// 投稿Lambda用のJSONログを初期化する
///
/// 2回目以降の呼び出しは何もしない。
pub fn init_logging() {
    INIT.call_once(|| {
        let posts_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter(DEFAULT_LOG_LEVEL))
            .with(posts_layer)
            .init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        // テストバイナリ内で他のサブスクライバーと競合しても失敗させない
        let _ = tracing_subscriber::registry()
            .with(env_filter("debug"))
            .with(fmt_layer)
            .try_init();
    });
}
