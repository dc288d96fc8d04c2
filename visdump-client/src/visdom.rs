//! Client for the Visdom server HTTP API.
//!
//! Visdom exposes its state through a handful of JSON-over-POST endpoints.
//! This client uses two of them:
//!
//! - **`env_state`**: with an empty body, returns the list of environment ids
//! - **`win_data`**: with `{"eid": env, "win": null}`, returns every window of
//!   the environment as a map of window id to window object
//!
//! ## Example
//!
//! ```rust,no_run
//! use visdump_client::VisdomClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = VisdomClient::builder()
//!         .server("http://localhost")
//!         .port(8097)
//!         .build()?;
//!
//!     for env in client.env_list().await? {
//!         let windows = client.window_data(&env).await?;
//!         println!("{}: {} windows", env, windows.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use visdump_types::WindowMap;

use crate::ClientError;

/// Default server address used by Visdom.
pub const DEFAULT_SERVER: &str = "http://localhost";
/// Default Visdom port.
pub const DEFAULT_PORT: u16 = 8097;

/// Visdom client for reading environments and their windows.
#[derive(Debug, Clone)]
pub struct VisdomClient {
    client: Client,
    endpoint: String,
}

impl VisdomClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> VisdomClientBuilder {
        VisdomClientBuilder::default()
    }

    /// The base URL requests are sent to (no trailing slash).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List every environment id known to the server, in server order.
    pub async fn env_list(&self) -> Result<Vec<String>, ClientError> {
        let body = self.post("env_state", &json!({})).await?;
        let envs: Vec<String> =
            serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        debug!("server lists {} environments", envs.len());
        Ok(envs)
    }

    /// Fetch all windows of `env`.
    pub async fn window_data(&self, env: &str) -> Result<WindowMap, ClientError> {
        let body = self
            .post("win_data", &json!({ "eid": env, "win": null }))
            .await?;
        let windows = parse_window_data(&body)?;
        debug!("environment {} holds {} windows", env, windows.len());
        Ok(windows)
    }

    async fn post(&self, route: &str, body: &Value) -> Result<String, ClientError> {
        let url = format!("{}/{}", self.endpoint, route);

        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Http(format!(
                "{} returned status {}",
                route,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

/// Builder for VisdomClient.
#[derive(Debug, Default)]
pub struct VisdomClientBuilder {
    server: Option<String>,
    port: Option<u16>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl VisdomClientBuilder {
    /// Set the server address (e.g., "http://localhost").
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Set the server port (default: 8097).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the path prefix the server is mounted under (default: "/").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<VisdomClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let server = self.server.unwrap_or_else(|| DEFAULT_SERVER.to_string());
        let port = self.port.unwrap_or(DEFAULT_PORT);
        let base_url = self.base_url.unwrap_or_else(|| "/".to_string());

        let endpoint = endpoint_url(&server, port, &base_url)?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(VisdomClient { client, endpoint })
    }
}

// Join server, port and base path the way the Visdom python client does:
// "<server>:<port><base_url>", with a bare "/" base meaning no prefix.
fn endpoint_url(server: &str, port: u16, base_url: &str) -> Result<String, ClientError> {
    let server = server.trim().trim_end_matches('/');
    if server.is_empty() {
        return Err(ClientError::InvalidUrl("empty server address".to_string()));
    }

    let server = if server.contains("://") {
        server.to_string()
    } else {
        format!("http://{}", server)
    };

    let base = base_url.trim().trim_matches('/');
    if base.is_empty() {
        Ok(format!("{}:{}", server, port))
    } else {
        Ok(format!("{}:{}/{}", server, port, base))
    }
}

// `win_data` answers with the window map itself; some server versions wrap it
// in a JSON string, so unwrap one level of string if present.
fn parse_window_data(body: &str) -> Result<WindowMap, ClientError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))?;

    let value = match value {
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|e| ClientError::Parse(e.to_string()))?
        }
        other => other,
    };

    serde_json::from_value(value).map_err(|e| ClientError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response and hand back the raw request.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });

        (port, handle)
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let content_length = text[..split]
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= split + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn client_for(port: u16) -> VisdomClient {
        VisdomClient::builder()
            .server("http://127.0.0.1")
            .port(port)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let client = VisdomClient::builder().build().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8097");
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("http://vis.local", 80, "/").unwrap(),
            "http://vis.local:80"
        );
        assert_eq!(
            endpoint_url("vis.local/", 8097, "/visdom/").unwrap(),
            "http://vis.local:8097/visdom"
        );
        assert_eq!(
            endpoint_url("https://vis.local", 443, "lab").unwrap(),
            "https://vis.local:443/lab"
        );
        assert!(matches!(
            endpoint_url("  ", 8097, "/"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_window_data_plain_and_wrapped() {
        let plain = r#"{"w": {"title": "acc", "content": {"data": [{"x": [1], "y": [2]}]}}}"#;
        let map = parse_window_data(plain).unwrap();
        assert!(map.find_by_title("acc").is_some());

        let wrapped = serde_json::to_string(plain).unwrap();
        let map = parse_window_data(&wrapped).unwrap();
        assert!(map.find_by_title("acc").is_some());

        assert!(matches!(
            parse_window_data("[1, 2, 3]"),
            Err(ClientError::Parse(_))
        ));
        assert!(matches!(
            parse_window_data("not json"),
            Err(ClientError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_env_list() {
        let (port, server) = serve_once("200 OK", r#"["main", "mnist_0", "mnist_1"]"#).await;

        let envs = client_for(port).env_list().await.unwrap();
        assert_eq!(envs, vec!["main", "mnist_0", "mnist_1"]);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /env_state "));
        assert!(request.ends_with("{}"));
    }

    #[tokio::test]
    async fn test_window_data_sends_env() {
        let (port, server) = serve_once(
            "200 OK",
            r#"{"win1": {"title": "loss", "content": {"data": [{"x": [0, 1], "y": [2.5, 1.5]}]}}}"#,
        )
        .await;

        let windows = client_for(port).window_data("mnist_0").await.unwrap();
        let (id, window) = windows.find_by_title("loss").unwrap();
        assert_eq!(id, "win1");
        assert_eq!(window.traces().unwrap()[0].y, Some(vec![2.5, 1.5]));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /win_data "));
        assert!(request.contains(r#""eid":"mnist_0""#));
        assert!(request.contains(r#""win":null"#));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (port, _server) = serve_once("500 Internal Server Error", "boom").await;

        let err = client_for(port).env_list().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_malformed_env_list() {
        let (port, _server) = serve_once("200 OK", r#"{"not": "a list"}"#).await;

        let err = client_for(port).env_list().await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = client_for(port).env_list().await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let client = VisdomClient::builder()
            .server("http://127.0.0.1")
            .port(port)
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();

        let err = client.env_list().await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
    }
}
