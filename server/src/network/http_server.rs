//! HTTP サーバー実装
//!
//! hyper を使ってリクエストを受け付け、すべてのパスを画像ハンドラに渡します。
//! 同時接続の扱いは hyper に任せます。

use crate::error::ServerError;
use crate::handler::ImageHandler;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Server};
use log::{error, info};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;

/// 待ち受けを開始する
///
/// 実際に待ち受けているアドレスと、`shutdown` が完了するまで動き続ける
/// サーバーのフューチャを返します。tokio ランタイム内で呼び出してください。
pub fn bind<F>(
    addr: SocketAddr,
    handler: ImageHandler,
    shutdown: F,
) -> Result<(SocketAddr, impl Future<Output = Result<(), ServerError>>), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let builder = Server::try_bind(&addr).map_err(|source| ServerError::Bind { addr, source })?;

    let make_service = make_service_fn(move |_conn| {
        let handler = handler.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |request: Request<Body>| {
                let handler = handler.clone();
                async move { Ok::<_, Infallible>(handler.handle(request).await) }
            }))
        }
    });

    let server = builder.serve(make_service);
    let local_addr = server.local_addr();
    info!("Listening on endpoint {}", local_addr);

    let serving = async move {
        server.with_graceful_shutdown(shutdown).await.map_err(|e| {
            error!("HTTPサーバーエラー: {}", e);
            ServerError::Serve(e)
        })
    };

    Ok((local_addr, serving))
}
