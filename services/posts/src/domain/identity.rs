/// 投稿IDとタイムスタンプの生成
///
/// どちらもサーバー側でのみ生成し、クライアントからの値は採用しない。
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// 新しい投稿IDを生成（UUID v4、ハイフン区切りの小文字）
pub fn generate_post_id() -> String {
    Uuid::new_v4().to_string()
}

/// 現在時刻をISO-8601（UTC、マイクロ秒精度、`Z`サフィックス）で返す
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
