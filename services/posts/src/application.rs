// アプリケーション層モジュール
pub mod post_handler;
pub mod routes;

// 再エクスポート
pub use post_handler::{PostHandler, PostHandlerError};
