#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod codec;
pub mod error;
pub mod keys;
pub mod node;
pub mod poster;
pub(crate) mod serde_helpers;
pub mod signer;
pub mod types;
pub mod units;

use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

pub use node::{ClientConfig, NodeClient, RawClientConfig};
pub use poster::Poster;
pub use types::{Network, TransactionStatus};

pub type Result<T> = std::result::Result<T, Error>;

/// Executes `request`, failing with [`error::Kind::Status`] on any non-2xx answer.
///
/// The node's body is kept verbatim in the error so rejections can be audited.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request, headers),
        fields(method, path, status_code)
    )
)]
pub(crate) async fn request<Response: DeserializeOwned>(
    client: &ReqwestClient,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    #[cfg(feature = "tracing")]
    {
        let span = tracing::Span::current();
        span.record("method", method.as_str());
        span.record("path", path.as_str());
    }

    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    status = %status_code,
                    path = %path,
                    %error,
                    "failed to read body of rejected request"
                );
                #[cfg(not(feature = "tracing"))]
                drop(error);
                String::new()
            }
        };

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "node rejected request"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let json_value = response.json::<Value>().await?;
    crate::serde_helpers::deserialize_with_warnings(json_value)
}
