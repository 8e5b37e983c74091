//! 画像デコードモジュール
//!
//! サーバーから受信した画像データをデコードする機能を提供します。

use image::{DynamicImage, ImageError, Rgba, RgbaImage};
use thiserror::Error;

/// デコードエラー
#[derive(Error, Debug)]
pub enum DecodeError {
    /// デコードエラー
    #[error("画像のデコードに失敗しました: {0}")]
    DecodeFailure(#[from] ImageError),
}

/// デコードされた画像
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// 画像データ
    pub image: DynamicImage,
}

impl DecodedImage {
    /// 画像から作成
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// 単色の画像を作成
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba(color),
        )))
    }

    /// 幅
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// 高さ
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// JPEGデータをデコード
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, DecodeError> {
    let image = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)?;
    Ok(DecodedImage::new(image))
}
