//! 画像リクエストハンドラ
//!
//! `GET /?image=<番号>` を受け取り、番号をカタログサイズで折り返した位置の
//! 画像をJPEGで返します。

use crate::catalog::ImageCatalog;
use crate::encoder::{EncodedImage, EncoderError, ImageEncoder};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Body, Request, Response, StatusCode};
use img_relay_common::protocol::{parse_image_query, IMAGE_CONTENT_TYPE};
use log::{debug, error};
use std::sync::Arc;

/// エンコード失敗時の本文
pub const ENCODE_FAILURE_BODY: &str = "Unable to encode image";

/// 画像リクエストハンドラ
///
/// カタログは読み込み後に変更されないため、クローンしたハンドラ間で共有します。
#[derive(Debug, Clone)]
pub struct ImageHandler {
    /// 画像カタログ
    catalog: Arc<ImageCatalog>,
    /// 画像エンコーダ
    encoder: ImageEncoder,
}

impl ImageHandler {
    /// 新しいハンドラを作成
    pub fn new(catalog: Arc<ImageCatalog>, encoder: ImageEncoder) -> Self {
        Self { catalog, encoder }
    }

    /// カタログを取得
    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    /// リクエストを処理
    ///
    /// JPEGへのエンコードはブロッキング用のスレッドで行います。
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let number = match parse_image_query(request.uri().query()) {
            Ok(number) => number,
            Err(e) => {
                debug!("不正なリクエスト {}: {}", request.uri(), e);
                return text_response(StatusCode::BAD_REQUEST, e.to_string());
            }
        };

        let entry = self.catalog.select(number);
        debug!("画像要求 {} -> {} ({})", number, entry.index, entry.name);

        let index = entry.index;
        let catalog = Arc::clone(&self.catalog);
        let encoder = self.encoder.clone();
        let encoded = tokio::task::spawn_blocking(move || encode_entry(&catalog, index, &encoder)).await;

        match encoded {
            Ok(Ok(encoded)) => {
                let length = encoded.data.len();
                let mut response = Response::new(Body::from(encoded.data));
                let headers = response.headers_mut();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(IMAGE_CONTENT_TYPE));
                headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
                response
            }
            Ok(Err(e)) => {
                error!("画像 {} のエンコードに失敗しました: {}", index, e);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, ENCODE_FAILURE_BODY.to_string())
            }
            Err(e) => {
                error!("画像 {} のエンコードタスクが終了しました: {}", index, e);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, ENCODE_FAILURE_BODY.to_string())
            }
        }
    }
}

/// カタログのエントリをエンコード
fn encode_entry(catalog: &ImageCatalog, index: usize, encoder: &ImageEncoder) -> Result<EncodedImage, EncoderError> {
    let image = catalog.entries()[index]
        .image
        .as_ref()
        .ok_or(EncoderError::MissingImage { index })?;
    encoder.encode(image)
}

/// テキスト本文のレスポンスを作成
fn text_response(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
