//! 画像エンコーダモジュール
//!
//! カタログの画像を送信用のJPEGにエンコードする機能を提供します。

use image::{DynamicImage, ImageError, ImageOutputFormat};
use std::io::Cursor;
use std::time::Instant;
use thiserror::Error;

/// JPEGの既定品質
pub const DEFAULT_QUALITY: u8 = 75;

/// エンコードエラー
#[derive(Error, Debug)]
pub enum EncoderError {
    /// エンコードエラー
    #[error("エンコードエラー: {0}")]
    EncodeError(#[from] ImageError),

    /// 画像がない（デコードに失敗したエントリ）
    #[error("画像 {index} は利用できません")]
    MissingImage { index: usize },
}

/// エンコーダ設定
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    /// JPEG品質（1-100）
    pub quality: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

/// エンコード済み画像
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// エンコードされたデータ
    pub data: Vec<u8>,
    /// 幅
    pub width: u32,
    /// 高さ
    pub height: u32,
}

/// 画像エンコーダ
#[derive(Debug, Clone, Default)]
pub struct ImageEncoder {
    /// エンコーダ設定
    config: EncoderConfig,
}

impl ImageEncoder {
    /// 新しい画像エンコーダを作成
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// 画像をJPEGにエンコード
    pub fn encode(&self, image: &DynamicImage) -> Result<EncodedImage, EncoderError> {
        let start_time = Instant::now();

        // JPEGはアルファをサポートしないのでRGBに変換
        let rgb = match image {
            DynamicImage::ImageRgb8(_) => image.clone(),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };

        let mut buffer = Cursor::new(Vec::new());
        let quality = self.config.quality.clamp(1, 100);
        rgb.write_to(&mut buffer, ImageOutputFormat::Jpeg(quality))?;

        log::debug!("画像エンコード時間: {:?}", start_time.elapsed());

        Ok(EncodedImage {
            data: buffer.into_inner(),
            width: rgb.width(),
            height: rgb.height(),
        })
    }
}
