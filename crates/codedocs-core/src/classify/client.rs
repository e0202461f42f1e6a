//! HTTP client for the classification service

use std::time::Duration;

use tracing::{debug, info, warn};

use super::message::{RpcRequest, RpcResponse};
use super::{ClassifyError, Language};
use crate::config::Config;
use crate::models::Entry;

/// Client for the documentation generation service
pub struct ClassifierClient {
    http: reqwest::Client,
    endpoint: String,
    language: Language,
}

impl ClassifierClient {
    /// Create a client for `endpoint`
    pub fn new(
        endpoint: impl Into<String>,
        language: Language,
        timeout: Duration,
    ) -> Result<Self, ClassifyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("codedocs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            language,
        })
    }

    /// Create a client from the configured endpoint, language and timeout
    pub fn from_config(config: &Config) -> Result<Self, ClassifyError> {
        let endpoint = config
            .classifier_url
            .as_deref()
            .ok_or(ClassifyError::NotConfigured)?;
        Self::new(
            endpoint,
            config.language,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Use a different language for subsequent requests
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Classify a selection of source text
    ///
    /// No retries; every failure is returned to the caller.
    pub async fn classify(&self, selection: &str) -> Result<Entry, ClassifyError> {
        let request = RpcRequest::generate_doc(self.language, selection)?;
        debug!(
            "Classifying {} chars ({}) via {}",
            request.params.1.len(),
            self.language,
            self.endpoint
        );

        let response = self.http.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Classification service answered {}", status);
            return Err(ClassifyError::Http(status.as_u16()));
        }

        let body = response.text().await?;
        let rpc: RpcResponse = serde_json::from_str(&body)
            .map_err(|e| ClassifyError::Malformed(format!("response is not JSON-RPC: {}", e)))?;

        let entry = rpc.into_entry()?;
        info!("Classified selection as {} '{}'", entry.kind, entry.name);
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Kind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP request with a canned response, returning the request body
    async fn serve_once(status: &'static str, body: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (url, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + length {
                    return text[header_end + 4..].to_string();
                }
            }
        }
        String::new()
    }

    fn client(url: &str) -> ClassifierClient {
        ClassifierClient::new(url, Language::En, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_classify_success() {
        let result = serde_json::json!({
            "type": "Component",
            "status": "Success",
            "data": {"name": "Button", "description": "Clickable", "props": {"label": "text"}, "usage": "<Button />"}
        });
        let body = serde_json::json!({"jsonrpc": "2.0", "id": 3, "result": result.to_string()}).to_string();
        let (url, server) = serve_once("200 OK", body).await;

        let entry = client(&url).classify("const Button = () => {}").await.unwrap();
        assert_eq!(entry.kind, Kind::Component);
        assert_eq!(entry.name, "Button");

        let request: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(request["method"], "Server.generateDoc");
        assert_eq!(request["params"][0], "En");
        assert_eq!(request["params"][1], "\"const Button = () => {}\"");
    }

    #[tokio::test]
    async fn test_classify_reports_service_error() {
        let result = serde_json::json!({"status": "Error", "info": "Unsupported code"});
        let body = serde_json::json!({"jsonrpc": "2.0", "id": 3, "result": result.to_string()}).to_string();
        let (url, _server) = serve_once("200 OK", body).await;

        let err = client(&url).classify("x = 1").await.unwrap_err();
        assert!(matches!(err, ClassifyError::Rejected(ref info) if info == "Unsupported code"));
    }

    #[tokio::test]
    async fn test_classify_http_failure() {
        let (url, _server) = serve_once("502 Bad Gateway", String::new()).await;

        let err = client(&url).classify("x = 1").await.unwrap_err();
        assert!(matches!(err, ClassifyError::Http(502)));
    }

    #[tokio::test]
    async fn test_empty_selection_sends_nothing() {
        let err = client("http://127.0.0.1:9/").classify("\n\n").await.unwrap_err();
        assert!(matches!(err, ClassifyError::EmptySelection));
    }

    #[test]
    fn test_from_config_requires_url() {
        assert!(matches!(
            ClassifierClient::from_config(&Config::default()),
            Err(ClassifyError::NotConfigured)
        ));

        let config = Config {
            classifier_url: Some("http://localhost:1/rpc".to_string()),
            ..Config::default()
        };
        let client = ClassifierClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:1/rpc");
    }
}
