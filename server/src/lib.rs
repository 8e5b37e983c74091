//! 画像リレーサーバーライブラリ
//!
//! このクレートは画像リレーサーバーの機能を提供します。

pub mod app;
pub mod catalog;
pub mod config;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod network;

pub use app::App;
pub use catalog::{CatalogEntry, CatalogError, ImageCatalog};
pub use config::{ServerArgs, ServerSettings};
pub use error::ServerError;
pub use handler::ImageHandler;
