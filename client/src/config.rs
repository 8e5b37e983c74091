//! クライアント設定
//!
//! コマンドライン引数と設定ファイルからクライアントの設定を組み立てます。
//! 起動時に一度だけ読み込まれ、その後は変更されません。

use crate::network::{DEFAULT_DNS_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use crate::poller::{OnFetchError, PollSettings};
use clap::Parser;
use img_relay_common::config::{load_or_default, ConfigError};
use img_relay_common::{DnsServerAddr, ServerEndpoint};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// 既定のサーバー名
pub const DEFAULT_SERVER: &str = "webserver.demo.com";

/// 既定のサーバーポート
pub const DEFAULT_PORT: u16 = 32612;

/// コマンドライン引数
#[derive(Debug, Default, Parser)]
#[command(name = "img-relay-client", version, about = "画像リレークライアント")]
pub struct ClientArgs {
    /// HTTPサーバー名 [既定: webserver.demo.com]
    #[arg(long)]
    pub server: Option<String>,

    /// HTTPサーバーのポート [既定: 32612]
    #[arg(long)]
    pub port: Option<u16>,

    /// 名前解決に使うDNSサーバー ip:port [既定: 192.168.0.199:53]
    #[arg(long)]
    pub dns: Option<DnsServerAddr>,

    /// 名前解決のタイムアウト（ミリ秒） [既定: 5000]
    #[arg(long)]
    pub dns_timeout_ms: Option<u64>,

    /// HTTPリクエストのタイムアウト（ミリ秒） [既定: 10000]
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// 最初の取得までの待ち時間（ミリ秒） [既定: 2000]
    #[arg(long)]
    pub initial_delay_ms: Option<u64>,

    /// 取得間隔（ミリ秒） [既定: 1000]
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// 取得失敗時の動作 [既定: continue]
    #[arg(long, value_enum)]
    pub on_fetch_error: Option<OnFetchError>,

    /// 反復回数の上限 [既定: 無制限]
    #[arg(long)]
    pub iterations: Option<u64>,

    /// ログレベル [既定: info]
    #[arg(long)]
    pub log_level: Option<String>,

    /// TOML設定ファイル
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// クライアント設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// HTTPサーバー名
    pub server: String,
    /// HTTPサーバーのポート
    pub port: u16,
    /// DNSサーバー
    pub dns: DnsServerAddr,
    /// 名前解決のタイムアウト（ミリ秒）
    pub dns_timeout_ms: u64,
    /// HTTPリクエストのタイムアウト（ミリ秒）
    pub request_timeout_ms: u64,
    /// 最初の取得までの待ち時間（ミリ秒）
    pub initial_delay_ms: u64,
    /// 取得間隔（ミリ秒）
    pub interval_ms: u64,
    /// 取得失敗時の動作
    pub on_fetch_error: OnFetchError,
    /// 反復回数の上限
    pub iterations: Option<u64>,
    /// ログレベル
    pub log_level: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            dns: DnsServerAddr::new(SocketAddr::from(([192, 168, 0, 199], 53))),
            dns_timeout_ms: DEFAULT_DNS_TIMEOUT.as_millis() as u64,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            initial_delay_ms: 2000,
            interval_ms: 1000,
            on_fetch_error: OnFetchError::Continue,
            iterations: None,
            log_level: "info".to_string(),
        }
    }
}

impl ClientSettings {
    /// 引数と設定ファイルから設定を作成
    pub fn resolve(args: ClientArgs) -> Result<Self, ConfigError> {
        let mut settings: ClientSettings = load_or_default(args.config.as_deref())?;

        if let Some(server) = args.server {
            settings.server = server;
        }
        if let Some(port) = args.port {
            settings.port = port;
        }
        if let Some(dns) = args.dns {
            settings.dns = dns;
        }
        if let Some(ms) = args.dns_timeout_ms {
            settings.dns_timeout_ms = ms;
        }
        if let Some(ms) = args.request_timeout_ms {
            settings.request_timeout_ms = ms;
        }
        if let Some(ms) = args.initial_delay_ms {
            settings.initial_delay_ms = ms;
        }
        if let Some(ms) = args.interval_ms {
            settings.interval_ms = ms;
        }
        if let Some(on_fetch_error) = args.on_fetch_error {
            settings.on_fetch_error = on_fetch_error;
        }
        if args.iterations.is_some() {
            settings.iterations = args.iterations;
        }
        if let Some(log_level) = args.log_level {
            settings.log_level = log_level;
        }

        if settings.server.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "server".to_string(),
                message: "サーバー名が空です".to_string(),
            });
        }
        if settings.dns_timeout_ms == 0 || settings.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout".to_string(),
                message: "タイムアウトは1ミリ秒以上にしてください".to_string(),
            });
        }

        Ok(settings)
    }

    /// 接続先
    pub fn endpoint(&self) -> ServerEndpoint {
        ServerEndpoint::new(self.server.clone(), self.port)
    }

    /// 名前解決のタイムアウト
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }

    /// HTTPリクエストのタイムアウト
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// ポーリング設定
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            interval: Duration::from_millis(self.interval_ms),
            on_fetch_error: self.on_fetch_error,
            max_iterations: self.iterations,
        }
    }
}
