//! 画像リレー共通ライブラリ
//!
//! このクレートは、画像リレーのクライアントとサーバーの両方で使用される
//! 共通の機能を提供します。HTTPで受け渡す画像番号の規約、DNSサーバー
//! アドレス、設定ファイルの読み込み、ロギングの初期化を含みます。

pub mod config;
pub mod error;
pub mod protocol;
pub mod utils;

// 主要コンポーネントを再エクスポート
pub use error::{CommonError, Result};
pub use config::ConfigError;
pub use protocol::{DnsServerAddr, ImageQueryError, ServerEndpoint};

/// ライブラリのバージョン
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
