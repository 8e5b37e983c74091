//! ポーリングループ
//!
//! 一定間隔でサーバーに画像を要求し、取得できた画像を表示先に渡します。
//! 反復は厳密に逐次で、同時に複数の取得が走ることはありません。

use crate::display::RenderSink;
use crate::network::ImageSource;

use clap::ValueEnum;
use img_relay_common::ServerEndpoint;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use tokio::sync::watch;

/// 取得失敗時の動作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OnFetchError {
    /// 次の反復に進む
    #[default]
    Continue,
    /// ループを終了する
    Stop,
}

/// ポーリング設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// 最初の反復の前に待つ時間（ウィンドウの初期化待ち）
    pub initial_delay: Duration,
    /// 反復ごとに待つ時間
    pub interval: Duration,
    /// 取得失敗時の動作
    pub on_fetch_error: OnFetchError,
    /// 反復回数の上限（`None` なら無制限）
    pub max_iterations: Option<u64>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            interval: Duration::from_secs(1),
            on_fetch_error: OnFetchError::Continue,
            max_iterations: None,
        }
    }
}

/// ループが終了した理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// 停止要求を受けた
    Shutdown,
    /// 反復回数の上限に達した
    IterationLimit,
    /// 取得に失敗し、設定に従って終了した
    FetchFailed { counter: u64, message: String },
}

/// ループの実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// 実行した反復の数（＝最後のカウンタ値）
    pub iterations: u64,
    /// 表示先に渡した画像の数
    pub rendered: u64,
    /// 取得またはデコードに失敗した数
    pub failures: u64,
    /// 終了理由
    pub stop_reason: StopReason,
}

/// ポーリングループ
pub struct Poller<S, R> {
    /// 画像の取得元
    source: S,
    /// 画像の表示先
    sink: R,
    /// 接続先
    endpoint: ServerEndpoint,
    /// ポーリング設定
    settings: PollSettings,
}

impl<S, R> Poller<S, R>
where
    S: ImageSource,
    R: RenderSink,
{
    /// 新しいポーリングループを作成
    pub fn new(source: S, sink: R, endpoint: ServerEndpoint, settings: PollSettings) -> Self {
        Self {
            source,
            sink,
            endpoint,
            settings,
        }
    }

    /// 停止要求（`true` の送信または送信側の破棄）までループを実行
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> PollReport {
        let mut counter: u64 = 0;
        let mut rendered: u64 = 0;
        let mut failures: u64 = 0;

        if !sleep_or_shutdown(self.settings.initial_delay, &mut shutdown).await {
            return report(counter, rendered, failures, StopReason::Shutdown);
        }

        loop {
            if let Some(max) = self.settings.max_iterations {
                if counter >= max {
                    return report(counter, rendered, failures, StopReason::IterationLimit);
                }
            }

            if !sleep_or_shutdown(self.settings.interval, &mut shutdown).await {
                return report(counter, rendered, failures, StopReason::Shutdown);
            }

            counter += 1;
            let mut status = format!("{}: {} ", counter, self.endpoint.host);

            // 表示用の名前解決。失敗しても取得は続ける
            match self.source.resolve_host(&self.endpoint.host).await {
                Ok(ip) => {
                    let _ = write!(status, "{} ", ip);
                }
                Err(e) => {
                    let _ = write!(status, "Error in DNS resolution: {} ", e);
                }
            }

            let url = match self.endpoint.image_url(counter) {
                Ok(url) => url,
                Err(e) => {
                    warn!("{}Error: URLを組み立てられません: {}", status, e);
                    failures += 1;
                    continue;
                }
            };
            debug!("GET {}", url);

            match self.source.fetch_image(&url).await {
                Ok(image) => {
                    info!("{}Got image", status);
                    self.sink.render(image);
                    rendered += 1;
                }
                Err(e) => {
                    warn!("{}Error: {}", status, e);
                    failures += 1;

                    if self.settings.on_fetch_error == OnFetchError::Stop {
                        let reason = StopReason::FetchFailed {
                            counter,
                            message: e.to_string(),
                        };
                        return report(counter, rendered, failures, reason);
                    }
                }
            }
        }
    }
}

fn report(iterations: u64, rendered: u64, failures: u64, stop_reason: StopReason) -> PollReport {
    PollReport {
        iterations,
        rendered,
        failures,
        stop_reason,
    }
}

/// 指定時間待つ。停止要求があれば `false` を返す
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }

    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);

    loop {
        let changed = tokio::select! {
            _ = &mut sleep => return true,
            changed = shutdown.changed() => changed,
        };

        // 送信側が破棄された
        if changed.is_err() || *shutdown.borrow() {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DecodeError, DecodedImage, LatestImage};
    use crate::error::FetchError;
    use crate::network::DnsError;
    use async_trait::async_trait;
    use img_relay_common::protocol::parse_image_query;
    use parking_lot::Mutex;
    use std::net::IpAddr;
    use std::sync::Arc;
    use url::Url;

    /// 奇数番号の要求では不正な本文を返すサーバーの代わり
    #[derive(Default, Clone)]
    struct AlternatingSource {
        requested: Arc<Mutex<Vec<u64>>>,
    }

    #[async_trait]
    impl ImageSource for AlternatingSource {
        async fn resolve_host(&self, _host: &str) -> Result<IpAddr, DnsError> {
            Ok(IpAddr::from([127, 0, 0, 1]))
        }

        async fn fetch_image(&self, url: &Url) -> Result<DecodedImage, FetchError> {
            let number = parse_image_query(url.query()).unwrap();
            self.requested.lock().push(number);

            if number % 2 == 1 {
                let err = image::load_from_memory(b"garbage").unwrap_err();
                return Err(FetchError::Decode(DecodeError::DecodeFailure(err)));
            }
            // 幅で要求番号を識別する
            Ok(DecodedImage::solid(number as u32, 1, [0, 0, 0, 255]))
        }
    }

    fn settings(on_fetch_error: OnFetchError, max_iterations: Option<u64>) -> PollSettings {
        PollSettings {
            initial_delay: Duration::from_secs(2),
            interval: Duration::from_secs(1),
            on_fetch_error,
            max_iterations,
        }
    }

    #[test]
    fn test_default_policy_continues() {
        assert_eq!(OnFetchError::default(), OnFetchError::Continue);
        assert_eq!(PollSettings::default().on_fetch_error, OnFetchError::default());
    }

    fn endpoint() -> ServerEndpoint {
        ServerEndpoint::new("webserver.demo.com", 32612)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_valid_responses_reach_sink() {
        let source = AlternatingSource::default();
        let latest = LatestImage::new();
        let poller = Poller::new(
            source.clone(),
            latest.clone(),
            endpoint(),
            settings(OnFetchError::Continue, Some(10)),
        );

        let (_tx, rx) = watch::channel(false);
        let report = poller.run(rx).await;

        assert_eq!(report.iterations, 10);
        assert_eq!(report.rendered, 5);
        assert_eq!(report.failures, 5);
        assert_eq!(report.stop_reason, StopReason::IterationLimit);
        assert_eq!(latest.generation(), 5);
        assert_eq!(latest.last().map(|i| i.width()), Some(10));
        assert_eq!(*source.requested.lock(), (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_on_fetch_error() {
        let latest = LatestImage::new();
        let poller = Poller::new(
            AlternatingSource::default(),
            latest.clone(),
            endpoint(),
            settings(OnFetchError::Stop, None),
        );

        let (_tx, rx) = watch::channel(false);
        let report = poller.run(rx).await;

        assert_eq!(report.iterations, 1);
        assert_eq!(report.rendered, 0);
        assert!(matches!(report.stop_reason, StopReason::FetchFailed { counter: 1, .. }));
        assert_eq!(latest.generation(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_initial_delay() {
        let source = AlternatingSource::default();
        let poller = Poller::new(
            source.clone(),
            LatestImage::new(),
            endpoint(),
            settings(OnFetchError::Continue, None),
        );

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(poller.run(rx));
        tx.send(true).unwrap();

        let report = handle.await.unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(report.stop_reason, StopReason::Shutdown);
        assert!(source.requested.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dns_failure_does_not_gate_fetch() {
        struct NoDnsSource;

        #[async_trait]
        impl ImageSource for NoDnsSource {
            async fn resolve_host(&self, host: &str) -> Result<IpAddr, DnsError> {
                Err(DnsError::NoAddress {
                    host: host.to_string(),
                    server: "127.0.0.1:53".parse().unwrap(),
                })
            }

            async fn fetch_image(&self, _url: &Url) -> Result<DecodedImage, FetchError> {
                Ok(DecodedImage::solid(2, 2, [0, 0, 0, 255]))
            }
        }

        let latest = LatestImage::new();
        let poller = Poller::new(
            NoDnsSource,
            latest.clone(),
            endpoint(),
            settings(OnFetchError::Stop, Some(3)),
        );

        let (_tx, rx) = watch::channel(false);
        let report = poller.run(rx).await;

        assert_eq!(report.rendered, 3);
        assert_eq!(latest.generation(), 3);
    }
}
