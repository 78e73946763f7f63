//! The real network behind the cache layer.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use axum::http::{header, Request, Response};
use reqwest::Client;
use tower::{BoxError, Service};

/// `tower::Service` over `reqwest`, buffering each response body.
#[derive(Debug, Clone, Default)]
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Service<Request<Bytes>> for HttpNetwork {
    type Response = Response<Bytes>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Bytes>, BoxError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let client = self.client.clone();
        Box::pin(async move {
            let request = reqwest::Request::try_from(request)?;
            let upstream = client.execute(request).await?;

            let mut builder = Response::builder().status(upstream.status());
            for (name, value) in upstream.headers() {
                // The body is buffered, so framing headers no longer apply.
                if name == header::TRANSFER_ENCODING || name == header::CONNECTION {
                    continue;
                }
                builder = builder.header(name, value);
            }
            let body = upstream.bytes().await?;
            Ok(builder.body(body)?)
        })
    }
}
