//! 画面レンダリングモジュール
//!
//! デコードされた画像をGUIに表示するための機能を提供します。

use super::decoder::DecodedImage;
use egui::{vec2, ColorImage, Context, TextureHandle, TextureOptions, Ui, Vec2};

/// ディスプレイレンダラー
pub struct DisplayRenderer {
    /// eguiコンテキスト
    ctx: Context,
    /// 表示用テクスチャ
    texture: Option<TextureHandle>,
    /// 現在の画像サイズ
    image_size: Vec2,
}

impl DisplayRenderer {
    /// 新しいディスプレイレンダラーを作成
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            texture: None,
            image_size: vec2(0.0, 0.0),
        }
    }

    /// デコードされた画像でテクスチャを更新
    pub fn update_from_decoded(&mut self, decoded: &DecodedImage) {
        let color_image = to_color_image(decoded);

        // テクスチャを更新または作成
        if let Some(texture) = &mut self.texture {
            texture.set(color_image, TextureOptions::LINEAR);
        } else {
            self.texture = Some(self.ctx.load_texture(
                "relay_image",
                color_image,
                TextureOptions::LINEAR,
            ));
        }

        self.image_size = vec2(decoded.width() as f32, decoded.height() as f32);
    }

    /// 利用可能な領域にアスペクト比を保って表示
    pub fn show(&self, ui: &mut Ui) {
        let Some(texture) = &self.texture else {
            return;
        };

        let available = ui.available_size();
        let scale = if self.image_size.x > 0.0 && self.image_size.y > 0.0 {
            (available.x / self.image_size.x).min(available.y / self.image_size.y)
        } else {
            1.0
        };

        ui.centered_and_justified(|ui| {
            ui.image(texture.id(), self.image_size * scale);
        });
    }
}

/// 画像をeguiの形式に変換
pub fn to_color_image(decoded: &DecodedImage) -> ColorImage {
    let rgba = decoded.image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    #[test]
    fn test_to_color_image() {
        let decoded = DecodedImage::solid(3, 2, [0, 0, 255, 255]);
        let color_image = to_color_image(&decoded);

        assert_eq!(color_image.size, [3, 2]);
        assert_eq!(color_image.pixels.len(), 6);
        assert_eq!(color_image.pixels[0], Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn test_rgb_source_is_opaque() {
        let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30])));
        let color_image = to_color_image(&DecodedImage::new(image));

        assert_eq!(color_image.size, [2, 2]);
        assert!(color_image.pixels.iter().all(|p| *p == Color32::from_rgb(10, 20, 30)));
    }
}
