//! 通信プロトコル定義
//!
//! クライアントとサーバー間のHTTPでのやり取りの規約を定義します。
//! クライアントは `GET /?image=<番号>` を送り、サーバーはJPEG画像を返します。

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// 画像番号を運ぶクエリパラメータ名
pub const IMAGE_QUERY_PARAM: &str = "image";

/// 送受信に使う画像フォーマットのMIMEタイプ
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// 画像番号クエリの解析エラー
///
/// 表示文字列はそのまま `400 Bad Request` の本文として返されます。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageQueryError {
    /// `image` パラメータが存在しない
    #[error("No image number in request")]
    Missing,

    /// `image` パラメータが非負整数ではない
    #[error("Bad image number in request")]
    Malformed { value: String },
}

/// クエリ文字列から画像番号を取り出す
///
/// 同名のパラメータが複数ある場合は最初の値を使います。
pub fn parse_image_query(query: Option<&str>) -> Result<u64, ImageQueryError> {
    let value = query
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == IMAGE_QUERY_PARAM)
                .map(|(_, value)| value.into_owned())
        })
        .ok_or(ImageQueryError::Missing)?;

    value
        .parse::<u64>()
        .map_err(|_| ImageQueryError::Malformed { value })
}

/// 画像サーバーの接続先
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    /// ホスト名
    pub host: String,
    /// ポート番号
    pub port: u16,
}

impl ServerEndpoint {
    /// 新しい接続先を作成
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// ベースURL (`http://host:port`)
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// 指定した番号の画像を要求するURLを組み立てる
    pub fn image_url(&self, counter: u64) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url())?;
        url.query_pairs_mut()
            .append_pair(IMAGE_QUERY_PARAM, &counter.to_string());
        Ok(url)
    }
}

/// 名前解決に使うDNSサーバーのアドレス (`ip:port`)
///
/// 起動時に一度だけ指定され、プロセスの生存期間中は変更されません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DnsServerAddr(SocketAddr);

impl DnsServerAddr {
    /// ソケットアドレスから作成
    pub fn new(addr: SocketAddr) -> Self {
        Self(addr)
    }

    /// ソケットアドレスを取得
    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl FromStr for DnsServerAddr {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ホスト名を許すとシステムのリゾルバに頼ることになるためIPのみ受け付ける
        s.trim().parse::<SocketAddr>().map(Self).map_err(|e| {
            CommonError::InvalidParameterError(format!(
                "DNSサーバーは ip:port 形式で指定してください ({}): {}",
                s, e
            ))
        })
    }
}

impl TryFrom<String> for DnsServerAddr {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DnsServerAddr> for String {
    fn from(value: DnsServerAddr) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DnsServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_query() {
        assert_eq!(parse_image_query(Some("image=5")), Ok(5));
        assert_eq!(parse_image_query(Some("foo=bar&image=12")), Ok(12));
        // 最初の値を使う
        assert_eq!(parse_image_query(Some("image=1&image=2")), Ok(1));
    }

    #[test]
    fn test_parse_image_query_missing() {
        assert_eq!(parse_image_query(None), Err(ImageQueryError::Missing));
        assert_eq!(parse_image_query(Some("")), Err(ImageQueryError::Missing));
        assert_eq!(parse_image_query(Some("img=3")), Err(ImageQueryError::Missing));
        assert_eq!(
            ImageQueryError::Missing.to_string(),
            "No image number in request"
        );
    }

    #[test]
    fn test_parse_image_query_malformed() {
        for query in ["image=abc", "image=", "image=-1", "image=1.5"] {
            let err = parse_image_query(Some(query)).unwrap_err();
            assert!(matches!(err, ImageQueryError::Malformed { .. }), "{}", query);
            assert_eq!(err.to_string(), "Bad image number in request");
        }
    }

    #[test]
    fn test_endpoint_urls() {
        let endpoint = ServerEndpoint::new("webserver.demo.com", 32612);
        assert_eq!(endpoint.base_url(), "http://webserver.demo.com:32612");

        let url = endpoint.image_url(7).unwrap();
        assert_eq!(url.as_str(), "http://webserver.demo.com:32612/?image=7");
        assert_eq!(parse_image_query(url.query()), Ok(7));
    }

    #[test]
    fn test_dns_server_addr() {
        let addr: DnsServerAddr = "192.168.0.199:53".parse().unwrap();
        assert_eq!(addr.socket_addr(), "192.168.0.199:53".parse().unwrap());
        assert_eq!(addr.to_string(), "192.168.0.199:53");

        assert!("dns.example.com:53".parse::<DnsServerAddr>().is_err());
        assert!("192.168.0.199".parse::<DnsServerAddr>().is_err());
    }
}
