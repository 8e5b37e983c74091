//! HTTP フェッチクライアント
//!
//! [`ResolverBoundDialer`] を名前解決に使う再利用可能なHTTPクライアントです。
//! 設定はこのクライアント自身が保持し、共有のトランスポート設定は変更しません。

use super::{NetworkError, ResolverBoundDialer};
use crate::display::{decode_image, DecodedImage};
use crate::error::FetchError;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// HTTPリクエスト全体の既定タイムアウト
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// フェッチクライアント
#[derive(Debug, Clone)]
pub struct FetchClient {
    /// HTTPクライアント
    http: reqwest::Client,
    /// 名前解決用ダイアラ
    dialer: ResolverBoundDialer,
}

impl FetchClient {
    /// 新しいフェッチクライアントを作成
    ///
    /// `request_timeout` は接続からレスポンス本文の読み込み完了までを制限します。
    pub fn new(dialer: ResolverBoundDialer, request_timeout: Duration) -> Result<Self, NetworkError> {
        let http = reqwest::Client::builder()
            .dns_resolver(Arc::new(dialer.clone()))
            // プロキシ経由だと名前解決が迂回される
            .no_proxy()
            .connect_timeout(request_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(NetworkError::ClientBuild)?;

        Ok(Self { http, dialer })
    }

    /// URLにGETを送りレスポンス本文を返す
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, NetworkError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_send_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // 本文はここで消費され、どの経路でも関数を抜ける前に解放される
        let body = response.bytes().await.map_err(|source| {
            if source.is_timeout() {
                NetworkError::Timeout {
                    url: url.to_string(),
                    source,
                }
            } else {
                NetworkError::ResponseRead {
                    url: url.to_string(),
                    source,
                }
            }
        })?;

        Ok(body.to_vec())
    }

    /// URLから画像を取得してデコードする
    pub async fn fetch_image(&self, url: &Url) -> Result<DecodedImage, FetchError> {
        let body = self.fetch_bytes(url).await?;
        Ok(decode_image(&body)?)
    }
}

/// 送信時のエラーを段階ごとに分類する
fn classify_send_error(url: &Url, source: reqwest::Error) -> NetworkError {
    let url = url.to_string();

    if is_dns_failure(&source) {
        NetworkError::DnsResolution { url, source }
    } else if source.is_timeout() {
        NetworkError::Timeout { url, source }
    } else {
        NetworkError::Unreachable { url, source }
    }
}

/// エラーチェーンに名前解決エラーが含まれるか
fn is_dns_failure(error: &reqwest::Error) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error as &(dyn StdError + 'static));
    while let Some(e) = current {
        if e.downcast_ref::<super::DnsError>().is_some() {
            return true;
        }
        current = e.source();
    }
    false
}

/// ポーリングループが使う画像の取得元
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// 表示用にホスト名を解決する
    async fn resolve_host(&self, host: &str) -> Result<IpAddr, super::DnsError>;

    /// 画像を取得してデコードする
    async fn fetch_image(&self, url: &Url) -> Result<DecodedImage, FetchError>;
}

#[async_trait]
impl ImageSource for FetchClient {
    async fn resolve_host(&self, host: &str) -> Result<IpAddr, super::DnsError> {
        self.dialer.lookup_first(host).await
    }

    async fn fetch_image(&self, url: &Url) -> Result<DecodedImage, FetchError> {
        FetchClient::fetch_image(self, url).await
    }
}
