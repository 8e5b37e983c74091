//! DNSサーバー固定のダイアラ
//!
//! すべての名前解決を指定されたDNSサーバーに送ります。`/etc/hosts` や
//! システムのリゾルバ設定は参照しません。reqwest の [`Resolve`] を実装しているため、
//! HTTPクライアントの接続処理における唯一の名前解決手段として使えます。

use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use img_relay_common::DnsServerAddr;
use hyper::client::connect::dns::Name;
use reqwest::dns::{Addrs, Resolve, Resolving};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// 名前解決の既定タイムアウト
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_millis(5000);

/// 名前解決エラー
#[derive(Error, Debug)]
pub enum DnsError {
    /// 時間内に応答がない
    #[error("DNSサーバー {server} が {timeout:?} 以内に応答しませんでした ({host})")]
    Timeout {
        host: String,
        server: DnsServerAddr,
        timeout: Duration,
    },

    /// 問い合わせの失敗
    #[error("{host} の名前解決に失敗しました (DNS {server}): {source}")]
    Lookup {
        host: String,
        server: DnsServerAddr,
        #[source]
        source: ResolveError,
    },

    /// アドレスが返らなかった
    #[error("{host} のアドレスが見つかりません (DNS {server})")]
    NoAddress { host: String, server: DnsServerAddr },
}

/// DNSサーバー固定のダイアラ
///
/// クローンは同じリゾルバを共有します。
#[derive(Clone)]
pub struct ResolverBoundDialer {
    /// リゾルバ
    resolver: TokioAsyncResolver,
    /// 問い合わせ先
    server: DnsServerAddr,
    /// 名前解決全体のタイムアウト
    timeout: Duration,
}

impl ResolverBoundDialer {
    /// 新しいダイアラを作成
    ///
    /// UDPで問い合わせ、応答が切り詰められた場合は同じサーバーにTCPで問い合わせます。
    pub fn new(server: DnsServerAddr, timeout: Duration) -> Self {
        let name_servers = vec![
            NameServerConfig::new(server.socket_addr(), Protocol::Udp),
            NameServerConfig::new(server.socket_addr(), Protocol::Tcp),
        ];
        let config = ResolverConfig::from_parts(None, Vec::new(), name_servers);

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.use_hosts_file = false;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            server,
            timeout,
        }
    }

    /// ホスト名を解決する
    ///
    /// IPアドレスの文字列はそのまま返します。それ以外はタイムアウト内に
    /// 応答がなければ [`DnsError::Timeout`] になります。
    pub async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, DnsError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let lookup = tokio::time::timeout(self.timeout, self.resolver.lookup_ip(host))
            .await
            .map_err(|_| self.timeout_error(host))?
            .map_err(|source| match source.kind() {
                ResolveErrorKind::Timeout => self.timeout_error(host),
                _ => DnsError::Lookup {
                    host: host.to_string(),
                    server: self.server,
                    source,
                },
            })?;

        let addrs: Vec<IpAddr> = lookup.iter().collect();
        if addrs.is_empty() {
            return Err(DnsError::NoAddress {
                host: host.to_string(),
                server: self.server,
            });
        }

        Ok(addrs)
    }

    /// 最初に見つかったアドレスを返す
    pub async fn lookup_first(&self, host: &str) -> Result<IpAddr, DnsError> {
        let addrs = self.lookup(host).await?;
        addrs.into_iter().next().ok_or_else(|| DnsError::NoAddress {
            host: host.to_string(),
            server: self.server,
        })
    }

    fn timeout_error(&self, host: &str) -> DnsError {
        DnsError::Timeout {
            host: host.to_string(),
            server: self.server,
            timeout: self.timeout,
        }
    }
}

impl fmt::Debug for ResolverBoundDialer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverBoundDialer")
            .field("server", &self.server)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Resolve for ResolverBoundDialer {
    fn resolve(&self, name: Name) -> Resolving {
        let dialer = self.clone();
        Box::pin(async move {
            let addrs = dialer.lookup(name.as_str()).await?;
            // ポートは接続時にURLのものに置き換えられる
            let addrs: Addrs = Box::new(addrs.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}
