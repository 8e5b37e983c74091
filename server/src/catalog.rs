//! 画像カタログ
//!
//! 起動時にディレクトリを走査して画像をデコードし、順序付きの一覧として保持します。
//! 読み込み後は変更されないため、複数のリクエストからロックなしで参照できます。

use image::DynamicImage;
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// カタログ読み込みエラー
#[derive(Error, Debug)]
pub enum CatalogError {
    /// ディレクトリを読み込めない
    #[error("ディレクトリ {path} の読み込みに失敗しました: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 画像が1つもない
    #[error("{location} に画像がありません")]
    Empty { location: String },
}

/// カタログの1エントリ
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// 走査順に割り当てた番号（0始まり）
    pub index: usize,
    /// ファイル名
    pub name: String,
    /// デコード済み画像（デコードに失敗したファイルは `None`）
    pub image: Option<DynamicImage>,
}

/// 画像カタログ
#[derive(Debug)]
pub struct ImageCatalog {
    entries: Vec<CatalogEntry>,
}

impl ImageCatalog {
    /// ディレクトリ内の全エントリから画像カタログを作成
    ///
    /// エントリはファイル名順に並べられます。個々のファイルのデコード失敗は
    /// ログに記録し、番号を保ったまま空のエントリとして追加します。
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let unreadable = |source| CatalogError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = fs::read_dir(dir)
            .map_err(unreadable)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(unreadable)?;
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let entries: Vec<CatalogEntry> = paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();

                let image = match decode_file(path) {
                    Ok(image) => Some(image),
                    Err(e) => {
                        warn!("ファイル {} を画像に変換できませんでした: {}", path.display(), e);
                        None
                    }
                };

                CatalogEntry { index, name, image }
            })
            .collect();

        if entries.is_empty() {
            return Err(CatalogError::Empty {
                location: dir.display().to_string(),
            });
        }

        info!("{} 件の画像を読み込みました ({})", entries.len(), dir.display());
        Ok(Self { entries })
    }

    /// メモリ上の画像からカタログを作成
    pub fn from_images(images: Vec<DynamicImage>) -> Result<Self, CatalogError> {
        if images.is_empty() {
            return Err(CatalogError::Empty {
                location: "memory".to_string(),
            });
        }

        let entries = images
            .into_iter()
            .enumerate()
            .map(|(index, image)| CatalogEntry {
                index,
                name: format!("image-{}", index),
                image: Some(image),
            })
            .collect();

        Ok(Self { entries })
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 常に `false`（空のカタログは作成できない）
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 全エントリ
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// 要求番号に対応するエントリを選ぶ
    ///
    /// 範囲外の番号はエラーにせず、カタログサイズで折り返します。
    pub fn select(&self, number: u64) -> &CatalogEntry {
        // 空のカタログは構築時に拒否している
        let index = wrap_index(number, self.entries.len()).unwrap_or(0);
        &self.entries[index]
    }
}

/// `number mod size` を計算する。`size` が0なら `None`
pub fn wrap_index(number: u64, size: usize) -> Option<usize> {
    if size == 0 {
        return None;
    }
    Some((number % size as u64) as usize)
}

/// ファイル内容からフォーマットを推定してデコード
fn decode_file(path: &Path) -> Result<DynamicImage, image::ImageError> {
    let reader = image::io::Reader::open(path)?.with_guessed_format()?;
    reader.decode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])))
    }

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, 3), Some(0));
        assert_eq!(wrap_index(5, 3), Some(2));
        assert_eq!(wrap_index(u64::MAX, 7), Some((u64::MAX % 7) as usize));
        assert_eq!(wrap_index(5, 0), None);

        for size in 1..10usize {
            for number in 0..50u64 {
                let index = wrap_index(number, size).unwrap();
                assert!(index < size);
                assert_eq!(index as u64, number % size as u64);
            }
        }
    }

    #[test]
    fn test_from_images_rejects_empty() {
        let result = ImageCatalog::from_images(Vec::new());
        assert!(matches!(result, Err(CatalogError::Empty { .. })));
    }

    #[test]
    fn test_select_wraps() {
        let catalog = ImageCatalog::from_images(vec![
            create_test_image(1, 1),
            create_test_image(2, 2),
            create_test_image(3, 3),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.select(1).index, 1);
        assert_eq!(catalog.select(5).index, 2);
        assert_eq!(catalog.select(6).index, 0);
    }

    #[test]
    fn test_load_sorted_with_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        create_test_image(4, 4).save(dir.path().join("b.png")).unwrap();
        create_test_image(8, 8).save(dir.path().join("a.png")).unwrap();
        fs::write(dir.path().join("c.txt"), b"not an image").unwrap();

        let catalog = ImageCatalog::load(dir.path()).unwrap();
        let entries = catalog.entries();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "a.png");
        assert_eq!(entries[0].image.as_ref().map(|i| i.width()), Some(8));
        assert_eq!(entries[1].name, "b.png");
        assert_eq!(entries[2].name, "c.txt");
        assert!(entries[2].image.is_none());
    }

    #[test]
    fn test_load_detects_format_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picture");
        create_test_image(5, 3)
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();

        let catalog = ImageCatalog::load(dir.path()).unwrap();
        let image = catalog.entries()[0].image.as_ref().unwrap();
        assert_eq!((image.width(), image.height()), (5, 3));
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageCatalog::load(dir.path());
        assert!(matches!(result, Err(CatalogError::Empty { .. })));
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageCatalog::load(&dir.path().join("missing"));
        assert!(matches!(result, Err(CatalogError::DirectoryUnreadable { .. })));
    }
}
