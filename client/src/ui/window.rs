//! メインウィンドウ
//!
//! 取得した最新の画像を表示するウィンドウを実装します。

use crate::display::{DecodedImage, DisplayRenderer, LatestImage};
use eframe::egui;
use std::sync::Arc;

/// ウィンドウタイトル
pub const WINDOW_TITLE: &str = "Demo";

/// 初期ウィンドウサイズ（ピクセル）
pub const WINDOW_SIZE: f32 = 240.0;

/// 最初の画像が届くまで表示する色 (RGBA)
pub const PLACEHOLDER_COLOR: [u8; 4] = [0, 0, 255, 255];

/// メインウィンドウ
pub struct ImageWindow {
    /// 画面レンダラー
    renderer: DisplayRenderer,
    /// ポーリングタスクとの受け渡し口
    latest: LatestImage,
}

impl ImageWindow {
    /// 新しいメインウィンドウを作成
    pub fn new(cc: &eframe::CreationContext, latest: LatestImage) -> Self {
        let ctx = cc.egui_ctx.clone();
        let mut renderer = DisplayRenderer::new(ctx.clone());

        let size = WINDOW_SIZE as u32;
        renderer.update_from_decoded(&DecodedImage::solid(size, size, PLACEHOLDER_COLOR));

        // 新しい画像が届いたら再描画を要求
        latest.set_notifier(Arc::new(move || ctx.request_repaint()));

        Self { renderer, latest }
    }

    fn apply_latest(&mut self) {
        if let Some(image) = self.latest.take() {
            self.renderer.update_from_decoded(&image);
        }
    }
}

impl eframe::App for ImageWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_latest();

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.renderer.show(ui);
            });
    }
}
