//! ディスプレイモジュール
//!
//! このモジュールは受信した画像のデコードと画面表示を担当します。
//! ポーリングループは [`RenderSink`] に画像を渡し、画面側は [`LatestImage`] から
//! 最新の画像だけを取り出して表示します。

mod decoder;
mod renderer;

pub use decoder::{decode_image, DecodeError, DecodedImage};
pub use renderer::{to_color_image, DisplayRenderer};

use parking_lot::Mutex;
use std::sync::Arc;

/// 画像の表示先
///
/// 新しい画像は直前の画像を即座に置き換えます。キューイングはしません。
pub trait RenderSink: Send + Sync {
    /// 画像を表示する
    fn render(&self, image: DecodedImage);
}

/// 画像更新時の通知
pub type RepaintNotifier = Arc<dyn Fn() + Send + Sync>;

/// 最新画像の受け渡し用スロット
///
/// 生産者（ポーリングループ）と消費者（画面）が1つずつの前提で、
/// 取り出されていない古い画像は新しい画像で上書きされます。
#[derive(Clone, Default)]
pub struct LatestImage {
    inner: Arc<Mutex<Slot>>,
}

#[derive(Default)]
struct Slot {
    /// 未表示の画像
    pending: Option<DecodedImage>,
    /// 最後に渡された画像
    last: Option<DecodedImage>,
    /// 更新回数
    generation: u64,
    /// 更新通知
    notifier: Option<RepaintNotifier>,
}

impl LatestImage {
    /// 新しいスロットを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新時に呼ばれる通知を設定
    pub fn set_notifier(&self, notifier: RepaintNotifier) {
        self.inner.lock().notifier = Some(notifier);
    }

    /// 未表示の画像を取り出す
    pub fn take(&self) -> Option<DecodedImage> {
        self.inner.lock().pending.take()
    }

    /// 最後に渡された画像
    pub fn last(&self) -> Option<DecodedImage> {
        self.inner.lock().last.clone()
    }

    /// これまでの更新回数
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }
}

impl RenderSink for LatestImage {
    fn render(&self, image: DecodedImage) {
        let notifier = {
            let mut slot = self.inner.lock();
            slot.last = Some(image.clone());
            slot.pending = Some(image);
            slot.generation += 1;
            slot.notifier.clone()
        };

        // ロックの外で通知する
        if let Some(notify) = notifier {
            notify();
        }
    }
}
