//! UIモジュール
//!
//! 最新の画像を表示するウィンドウを担当します。

mod window;

pub use window::{ImageWindow, PLACEHOLDER_COLOR, WINDOW_SIZE, WINDOW_TITLE};
