//! ネットワークモジュール
//!
//! 画像リクエストを受け付けるHTTPサーバーを提供します。

pub mod http_server;

pub use http_server::bind;
