//! 画像リレークライアントライブラリ
//!
//! 指定したDNSサーバーでサーバー名を解決し、画像を定期的に取得して
//! ウィンドウに表示します。

pub mod config;
pub mod display;
pub mod error;
pub mod network;
pub mod poller;
pub mod ui;

pub use config::{ClientArgs, ClientSettings};
pub use error::FetchError;
pub use poller::{OnFetchError, PollReport, PollSettings, Poller, StopReason};
