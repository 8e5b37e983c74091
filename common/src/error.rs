//! エラー型定義
//!
//! 画像リレーアプリケーションで使用する共通エラー型を定義します。

use thiserror::Error;

/// 共通エラー
#[derive(Error, Debug)]
pub enum CommonError {
    /// 無効なパラメータ
    #[error("無効なパラメータ: {0}")]
    InvalidParameterError(String),

    /// ロガーの初期化エラー
    #[error("ロガーの初期化に失敗しました: {0}")]
    LoggerError(String),
}

/// 結果型のエイリアス
pub type Result<T> = std::result::Result<T, CommonError>;
