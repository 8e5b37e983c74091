//! サーバーエラー定義

use crate::catalog::CatalogError;
use std::net::SocketAddr;
use thiserror::Error;

/// サーバーエラー
#[derive(Error, Debug)]
pub enum ServerError {
    /// カタログ読み込みエラー
    #[error("画像カタログの読み込みに失敗しました: {0}")]
    Catalog(#[from] CatalogError),

    /// バインドエラー
    #[error("{addr} での待ち受けに失敗しました: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: hyper::Error,
    },

    /// 実行中のHTTPサーバーエラー
    #[error("HTTPサーバーエラー: {0}")]
    Serve(#[source] hyper::Error),
}
