//! 設定ファイル管理
//!
//! TOML形式の設定ファイルを読み込む機能を提供します。
//! コマンドライン引数で指定されなかった項目の既定値として使われます。

use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 設定エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O エラー
    #[error("設定ファイル {path} の読み込みに失敗しました: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML デシリアライズエラー
    #[error("設定ファイル {path} の解析に失敗しました: {source}")]
    TomlDeError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// 設定値が不正
    #[error("設定値 '{key}' が不正です: {message}")]
    InvalidValue { key: String, message: String },
}

/// TOMLファイルから設定を読み込む
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlDeError {
        path: path.to_path_buf(),
        source,
    })
}

/// パスが指定されていれば読み込み、なければ既定値を返す
pub fn load_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, ConfigError> {
    match path {
        Some(path) => load_toml(path),
        None => Ok(T::default()),
    }
}
