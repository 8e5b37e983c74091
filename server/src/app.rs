//! サーバーアプリケーション
//!
//! 画像カタログを読み込み、HTTPサーバーを起動します。

use crate::catalog::ImageCatalog;
use crate::config::ServerSettings;
use crate::encoder::ImageEncoder;
use crate::error::ServerError;
use crate::handler::ImageHandler;
use crate::network;

use log::info;
use std::future::Future;
use std::sync::Arc;

/// アプリケーション
pub struct App {
    /// サーバー設定
    settings: ServerSettings,
    /// 画像カタログ
    catalog: Arc<ImageCatalog>,
}

impl App {
    /// 新しいアプリケーションを作成
    ///
    /// カタログを読み込めない、または空の場合は起動しません。
    pub fn new(settings: ServerSettings) -> Result<Self, ServerError> {
        let catalog = ImageCatalog::load(&settings.images_dir)?;
        info!("Collected {} images", catalog.len());

        Ok(Self {
            settings,
            catalog: Arc::new(catalog),
        })
    }

    /// リクエストハンドラを作成
    pub fn handler(&self) -> ImageHandler {
        ImageHandler::new(
            Arc::clone(&self.catalog),
            ImageEncoder::new(self.settings.encoder_config()),
        )
    }

    /// `shutdown` が完了するまでサーバーを実行
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (_, serving) = network::bind(self.settings.listen, self.handler(), shutdown)?;
        serving.await?;
        info!("サーバーを停止しました");
        Ok(())
    }
}
