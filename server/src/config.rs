//! サーバー設定
//!
//! コマンドライン引数と設定ファイルからサーバーの設定を組み立てます。
//! 引数で指定された値は設定ファイルの値より優先されます。

use crate::encoder::{EncoderConfig, DEFAULT_QUALITY};
use clap::Parser;
use img_relay_common::config::{load_or_default, ConfigError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// 既定の待ち受けアドレス
pub const DEFAULT_LISTEN: &str = "0.0.0.0:3333";

/// 既定の画像ディレクトリ
pub const DEFAULT_IMAGE_DIR: &str = "./images";

/// コマンドライン引数
#[derive(Debug, Default, Parser)]
#[command(name = "img-relay-server", version, about = "画像リレーサーバー")]
pub struct ServerArgs {
    /// 待ち受けアドレス [既定: 0.0.0.0:3333]
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// 画像ディレクトリ [既定: ./images]
    #[arg(long)]
    pub images: Option<PathBuf>,

    /// JPEG品質 1-100 [既定: 75]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// ログレベル [既定: info]
    #[arg(long)]
    pub log_level: Option<String>,

    /// TOML設定ファイル
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// サーバー設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// 待ち受けアドレス
    pub listen: SocketAddr,
    /// 画像ディレクトリ
    pub images_dir: PathBuf,
    /// JPEG品質
    pub quality: u8,
    /// ログレベル
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3333)),
            images_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            quality: DEFAULT_QUALITY,
            log_level: "info".to_string(),
        }
    }
}

impl ServerSettings {
    /// 引数と設定ファイルから設定を作成
    pub fn resolve(args: ServerArgs) -> Result<Self, ConfigError> {
        let mut settings: ServerSettings = load_or_default(args.config.as_deref())?;

        if let Some(listen) = args.listen {
            settings.listen = listen;
        }
        if let Some(images) = args.images {
            settings.images_dir = images;
        }
        if let Some(quality) = args.quality {
            settings.quality = quality;
        }
        if let Some(log_level) = args.log_level {
            settings.log_level = log_level;
        }

        if !(1..=100).contains(&settings.quality) {
            return Err(ConfigError::InvalidValue {
                key: "quality".to_string(),
                message: format!("{} は 1-100 の範囲外です", settings.quality),
            });
        }

        Ok(settings)
    }

    /// エンコーダ設定
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            quality: self.quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = ServerSettings::resolve(ServerArgs::default()).unwrap();
        assert_eq!(settings.listen, DEFAULT_LISTEN.parse().unwrap());
        assert_eq!(settings.images_dir, PathBuf::from("./images"));
        assert_eq!(settings.quality, 75);
    }

    #[test]
    fn test_args_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen = \"127.0.0.1:8080\"\nimages_dir = \"/srv/images\"\nquality = 50").unwrap();

        let args = ServerArgs::parse_from([
            "img-relay-server",
            "--quality",
            "90",
            "--config",
            file.path().to_str().unwrap(),
        ]);
        let settings = ServerSettings::resolve(args).unwrap();

        assert_eq!(settings.listen, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(settings.images_dir, PathBuf::from("/srv/images"));
        assert_eq!(settings.quality, 90);
    }

    #[test]
    fn test_invalid_quality_in_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quality = 0").unwrap();

        let args = ServerArgs {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(
            ServerSettings::resolve(args),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
