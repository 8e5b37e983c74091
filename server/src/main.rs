//! 画像リレーサーバーエントリポイント

use clap::Parser;
use img_relay_common::utils::logging::{self, LogLevel};
use img_relay_server::{App, ServerArgs, ServerSettings};
use std::process;

#[tokio::main]
async fn main() {
    // コマンドライン引数を解析
    let settings = match ServerSettings::resolve(ServerArgs::parse()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("設定の読み込みに失敗しました: {}", e);
            process::exit(1);
        }
    };

    // ロガーを初期化
    let level = LogLevel::parse(&settings.log_level).unwrap_or_default();
    if let Err(e) = logging::init_logger(level) {
        eprintln!("{}", e);
    }
    logging::set_panic_hook();
    log::info!("img-relay-server {}", img_relay_common::VERSION);

    // 画像カタログを読み込む
    let app = match App::new(settings) {
        Ok(app) => app,
        Err(e) => {
            log::error!("{}", e);
            log::error!("Quitting due to errors.");
            process::exit(1);
        }
    };

    // Ctrl-C まで実行
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    if let Err(e) = app.run(shutdown).await {
        log::error!("サーバーの実行中にエラーが発生しました: {}", e);
        process::exit(1);
    }
}
