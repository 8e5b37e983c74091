//! クライアントエラー定義

use crate::display::DecodeError;
use crate::network::NetworkError;
use thiserror::Error;

/// 画像取得エラー
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP GET の失敗
    #[error("HTTP GET failed: {0}")]
    Fetch(#[from] NetworkError),

    /// 画像デコードの失敗（再試行しない）
    #[error("Image decode failed: {0}")]
    Decode(#[from] DecodeError),
}
