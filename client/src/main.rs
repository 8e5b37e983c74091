//! クライアントエントリポイント
//!
//! 画像リレークライアントのメインエントリポイント

use anyhow::{anyhow, Context as _};
use clap::Parser;
use eframe::egui;
use img_relay_client::display::LatestImage;
use img_relay_client::network::{FetchClient, ResolverBoundDialer};
use img_relay_client::ui::{ImageWindow, WINDOW_SIZE, WINDOW_TITLE};
use img_relay_client::{ClientArgs, ClientSettings, Poller};
use img_relay_common::utils::logging::{init_logger, set_panic_hook, LogLevel};
use tokio::sync::watch;

fn main() -> anyhow::Result<()> {
    let settings = ClientSettings::resolve(ClientArgs::parse()).context("設定の読み込みに失敗しました")?;

    let level = LogLevel::parse(&settings.log_level).unwrap_or_default();
    init_logger(level)?;
    set_panic_hook();

    let endpoint = settings.endpoint();
    log::info!("Will connect to {} using DNS {}", endpoint.base_url(), settings.dns);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("非同期ランタイムの作成に失敗しました")?;

    // リゾルバはランタイム上で作成する
    let client = {
        let _guard = runtime.enter();
        let dialer = ResolverBoundDialer::new(settings.dns, settings.dns_timeout());
        FetchClient::new(dialer, settings.request_timeout())?
    };

    let latest = LatestImage::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(client, latest.clone(), endpoint, settings.poll_settings());
    let poll_task = runtime.spawn(poller.run(shutdown_rx));

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(WINDOW_SIZE, WINDOW_SIZE)),
        ..Default::default()
    };

    // ウィンドウが閉じられるまでメインスレッドで実行
    let gui_result = eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |cc| Box::new(ImageWindow::new(cc, latest))),
    );

    let _ = shutdown_tx.send(true);
    match runtime.block_on(poll_task) {
        Ok(report) => log::info!(
            "ポーリング終了: {}回 (表示 {}, 失敗 {}) {:?}",
            report.iterations,
            report.rendered,
            report.failures,
            report.stop_reason
        ),
        Err(e) => log::error!("ポーリングタスクが異常終了しました: {}", e),
    }

    gui_result.map_err(|e| anyhow!("ウィンドウの実行に失敗しました: {}", e))
}
