use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::traits::{HttpRequest, HttpResponse, HttpTransport};
use super::SourceSettings;
use crate::errors::SnapshotError;

/// [`HttpTransport`] backed by a `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client with the source's timeout and certificate policy.
    pub fn new(settings: &SourceSettings) -> Result<Self, SnapshotError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.request_timeout.min(Duration::from_secs(10)))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| {
                SnapshotError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, SnapshotError> {
        debug!("GET {} ({} query params)", request.url, request.query.len());

        let mut builder = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let url = request.url.clone();
        let to_error = |e: reqwest::Error| {
            if e.is_timeout() {
                SnapshotError::Timeout { url: url.clone() }
            } else {
                SnapshotError::Transport {
                    url: url.clone(),
                    message: e.to_string(),
                }
            }
        };

        let response = builder.send().await.map_err(&to_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(&to_error)?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::*;
    use crate::errors::FailureKind;

    /// Accepts connections and never answers.
    async fn silent_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_slow_server_maps_to_timeout() {
        let base_url = silent_server().await;
        let settings = SourceSettings::sse()
            .with_base_url(base_url.clone())
            .with_timeout(Duration::from_millis(200));
        let transport = ReqwestTransport::new(&settings).unwrap();

        let url = format!("{}/v1/sh1/list/exchange/equity", base_url);
        let err = transport.get(HttpRequest::get(url.clone())).await.unwrap_err();

        assert!(matches!(err, SnapshotError::Timeout { url: ref u } if *u == url));
        assert_eq!(err.failure_kind(), FailureKind::Fetch);
    }

    #[tokio::test]
    async fn test_refused_connection_maps_to_transport_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let settings = SourceSettings::szse().with_timeout(Duration::from_secs(5));
        let transport = ReqwestTransport::new(&settings).unwrap();
        let err = transport
            .get(HttpRequest::get(format!("http://{}/api/report/ShowReport", addr)))
            .await
            .unwrap_err();

        assert!(matches!(err, SnapshotError::Transport { .. }));
        assert_eq!(err.failure_kind(), FailureKind::Fetch);
    }
}
