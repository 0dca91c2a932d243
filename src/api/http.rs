//! HTTP implementation of the product source

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::{
    errors::{FetchError, FetchResult},
    port::ProductFetchPort,
    types::ProductPage,
};
use crate::config::Config;

/// Client options for the catalog API
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl From<&Config> for HttpClientOptions {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.request_timeout,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Fetches `GET {base}/products?limit={limit}&page={page}`
#[derive(Debug, Clone)]
pub struct HttpProductClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpProductClient {
    /// Build a client with the configured timeout and user agent
    pub fn new(options: HttpClientOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(&options.user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, &options.base_url, options.timeout))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// The products endpoint, without query parameters
    pub fn endpoint(&self) -> String {
        format!("{}/products", self.base_url)
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::from(error)
        }
    }
}

#[async_trait]
impl ProductFetchPort for HttpProductClient {
    async fn fetch(&self, page: u32, limit: u32) -> FetchResult<ProductPage> {
        debug!("GET {} page={} limit={}", self.endpoint(), page, limit);

        let response = self
            .client
            .get(self.endpoint())
            .query(&[("limit", limit), ("page", page)])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Error fetching products: HTTP {}", status);
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let page: ProductPage = serde_json::from_slice(&body)?;

        debug!(
            "Fetched {} products",
            page.data.as_ref().map_or(0, |data| data.len())
        );
        Ok(page)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned response and hand back the request line
    async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn client_for(base_url: &str, timeout: Duration) -> HttpProductClient {
        let client = Client::builder().no_proxy().timeout(timeout).build().unwrap();
        HttpProductClient::with_client(client, base_url, timeout)
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let body = serde_json::json!({
            "data": [{"id": 1, "name": "Desk"}],
            "meta": {"page": 2, "totalPages": 4, "hasNextPage": true, "hasPreviousPage": true}
        })
        .to_string();
        let (base, server) = serve_once("200 OK", body).await;

        let client = client_for(&base, Duration::from_secs(5));
        let page = client.fetch(2, 20).await.unwrap();

        assert_eq!(page.data.unwrap()[0].name, "Desk");
        assert_eq!(page.meta.unwrap().total_pages, Some(4));
        assert_eq!(server.await.unwrap(), "GET /products?limit=20&page=2 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let (base, server) = serve_once("200 OK", "{}".to_string()).await;
        let client = client_for(&format!("{}/", base), Duration::from_secs(5));

        let page = client.fetch(1, 5).await.unwrap();
        assert_eq!(page, ProductPage::default());
        assert_eq!(server.await.unwrap(), "GET /products?limit=5&page=1 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_fetch_http_status_error() {
        let (base, _server) = serve_once("503 Service Unavailable", "{}".to_string()).await;
        let client = client_for(&base, Duration::from_secs(5));

        let err = client.fetch(1, 20).await.unwrap_err();
        assert_eq!(err, FetchError::HttpStatus(503));
    }

    #[tokio::test]
    async fn test_fetch_decode_error() {
        let (base, _server) = serve_once("200 OK", "<html>oops</html>".to_string()).await;
        let client = client_for(&base, Duration::from_secs(5));

        let err = client.fetch(1, 20).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr), Duration::from_secs(5));
        let err = client.fetch(1, 20).await.unwrap_err();
        assert!(err.is_network(), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let timeout = Duration::from_millis(200);
        let client = client_for(&format!("http://{}", addr), timeout);
        let err = client.fetch(1, 20).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout(timeout));
    }

    #[test]
    fn test_endpoint() {
        let client = HttpProductClient::new(HttpClientOptions {
            base_url: "https://api.example.com/".to_string(),
            timeout: Duration::from_secs(1),
            user_agent: "test".to_string(),
        })
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/products");
    }
}
