//! ロギング機能
//!
//! `env_logger` を使ったロガーの初期化と、パニック時のログ記録を提供します。

use crate::error::{CommonError, Result};

/// ログレベル
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// トレース情報
    Trace = 0,
    /// デバッグ情報
    Debug = 1,
    /// 一般情報
    #[default]
    Info = 2,
    /// 警告
    Warn = 3,
    /// エラー
    Error = 4,
}

impl LogLevel {
    /// ログレベルを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// 文字列からログレベルを解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Some(LogLevel::Trace),
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" | "WARNING" => Some(LogLevel::Warn),
            "ERROR" | "ERR" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// グローバルロガーを初期化
///
/// `RUST_LOG` が設定されていればそちらが優先されます。
pub fn init_logger(level: LogLevel) -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| CommonError::LoggerError(e.to_string()))
}

/// パニック時のログ記録ハンドラーを設定
pub fn set_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let message = match panic_info.payload().downcast_ref::<&str>() {
            Some(s) => *s,
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => s.as_str(),
                None => "Unknown panic payload",
            },
        };

        let location = match panic_info.location() {
            Some(loc) => format!(" at {}:{}", loc.file(), loc.line()),
            None => String::new(),
        };

        eprintln!("Panic: {}{}", message, location);
        log::error!("Panic: {}{}", message, location);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("err"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert!(LogLevel::Trace < LogLevel::Error);
    }
}
