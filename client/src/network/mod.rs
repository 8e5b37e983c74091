//! ネットワークモジュール
//!
//! 画像サーバーとの通信を担当する機能を提供します。
//! 名前解決は常に指定されたDNSサーバーを経由し、システムのリゾルバは使いません。

mod dialer;
mod fetch_client;

pub use dialer::{DnsError, ResolverBoundDialer, DEFAULT_DNS_TIMEOUT};
pub use fetch_client::{FetchClient, ImageSource, DEFAULT_REQUEST_TIMEOUT};

use thiserror::Error;

/// ネットワークエラー
///
/// 失敗の段階（名前解決・接続・読み込み）ごとに区別し、原因となるエラーを保持します。
#[derive(Error, Debug)]
pub enum NetworkError {
    /// 名前解決エラー
    #[error("{url} の名前解決に失敗しました: {source}")]
    DnsResolution {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 接続エラー
    #[error("HTTPサーバーに接続できません ({url}): {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// タイムアウト
    #[error("HTTPリクエストがタイムアウトしました ({url}): {source}")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 成功以外のステータス
    #[error("HTTPサーバーがステータス {status} を返しました ({url})")]
    HttpStatus { url: String, status: u16 },

    /// レスポンス読み込みエラー
    #[error("HTTPサーバーのレスポンスを読み込めません ({url}): {source}")]
    ResponseRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTPクライアントの構築エラー
    #[error("HTTPクライアントを作成できません: {0}")]
    ClientBuild(#[source] reqwest::Error),
}
