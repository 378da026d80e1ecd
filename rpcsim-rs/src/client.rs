use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client as HttpClient, StatusCode,
};
use serde_json::Value;
use tracing::debug;

use crate::jsonrpc::{ErrorObject, Request, Response};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures of a single JSON-RPC round trip.
#[derive(Debug, thiserror::Error)]
pub enum RpcClientError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(reqwest::Error),

    /// The request could not be delivered or the response body could not be
    /// read, including timeouts.
    #[error("Failed to send {method} to {url}: {error}")]
    FailedToSend {
        url: String,
        method: String,
        error: reqwest::Error,
    },

    /// The server answered with a non-success status code.
    #[error("{url} returned HTTP status {status} for {method}: '{body}'")]
    HttpStatus {
        url: String,
        method: String,
        status: StatusCode,
        body: String,
    },

    /// The body was not a JSON-RPC response.
    #[error("Invalid response from {url} for {method}: {reason}. Body: '{body}'")]
    InvalidResponse {
        url: String,
        method: String,
        reason: String,
        body: String,
    },
}

impl RpcClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RpcClientError::FailedToSend { error, .. } if error.is_timeout())
    }
}

/// Minimal JSON-RPC client for one endpoint. Every call is a single POST
/// bounded by the configured timeout; there are no retries.
#[derive(Clone, Debug)]
pub struct RpcClient {
    url: String,
    client: HttpClient,
}

impl RpcClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RpcClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(RpcClientError::Build)?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Response, RpcClientError> {
        let request = Request::new(method, params);
        debug!(url = %self.url, request = ?request, "sending json-rpc request");

        let send_error = |error| RpcClientError::FailedToSend {
            url: self.url.clone(),
            method: method.to_string(),
            error,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;
        let status = response.status();
        let body = response.text().await.map_err(send_error)?;
        debug!(url = %self.url, %status, %body, "received json-rpc response");

        if !status.is_success() {
            return Err(RpcClientError::HttpStatus {
                url: self.url.clone(),
                method: method.to_string(),
                status,
                body,
            });
        }

        parse_response(body).map_err(|(reason, body)| RpcClientError::InvalidResponse {
            url: self.url.clone(),
            method: method.to_string(),
            reason,
            body,
        })
    }
}

fn parse_response(body: String) -> Result<Response, (String, String)> {
    let raw: Value = match serde_json::from_str(&body) {
        Ok(raw) => raw,
        Err(err) => return Err((format!("malformed JSON ({err})"), body)),
    };
    let Some(object) = raw.as_object() else {
        return Err(("body is not a JSON object".to_string(), body));
    };
    if !object.contains_key("result") && !object.contains_key("error") {
        return Err(("neither 'result' nor 'error' is present".to_string(), body));
    }

    let error = match object.get("error") {
        None | Some(Value::Null) => None,
        Some(error) => match serde_json::from_value::<ErrorObject>(error.clone()) {
            Ok(error) => Some(error),
            Err(err) => return Err((format!("malformed 'error' member ({err})"), body)),
        },
    };

    Ok(Response {
        result: object.get("result").cloned(),
        error,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::Server) -> RpcClient {
        RpcClient::new(&server.url(), DEFAULT_REQUEST_TIMEOUT).expect("client builds")
    }

    #[tokio::test]
    async fn call_sends_jsonrpc_body_and_parses_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "method": "eth_blockNumber",
                "params": [],
                "id": 1,
                "jsonrpc": "2.0",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x32bb5b"}"#)
            .create_async()
            .await;

        let response = client(&server)
            .call("eth_blockNumber", vec![])
            .await
            .expect("call succeeds");

        assert_eq!(response.result(), Some(&json!("0x32bb5b")));
        assert!(response.error.is_none());
        assert_eq!(
            response.raw,
            json!({"jsonrpc": "2.0", "id": 1, "result": "0x32bb5b"})
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn call_keeps_error_member() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"block not found"}}"#,
            )
            .create_async()
            .await;

        let response = client(&server)
            .call("debug_traceBlockByNumber", vec![json!("0x32bb5c")])
            .await
            .expect("error responses are still responses");

        assert!(response.result().is_none());
        let error = response.error.expect("error member is parsed");
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "block not found");
    }

    #[tokio::test]
    async fn call_fails_on_http_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let error = client(&server)
            .call("eth_syncing", vec![])
            .await
            .expect_err("503 must fail");

        match error {
            RpcClientError::HttpStatus { status, body, .. } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn call_fails_on_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let error = client(&server)
            .call("eth_syncing", vec![])
            .await
            .expect_err("html body must fail");

        match error {
            RpcClientError::InvalidResponse { body, .. } => {
                assert_eq!(body, "<html>not json</html>")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn call_fails_without_result_or_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","id":1}"#)
            .create_async()
            .await;

        let error = client(&server)
            .call("eth_syncing", vec![])
            .await
            .expect_err("missing members must fail");

        match error {
            RpcClientError::InvalidResponse { reason, .. } => {
                assert!(reason.contains("neither"), "{reason}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn call_fails_when_endpoint_is_unreachable() {
        let client = RpcClient::new("http://127.0.0.1:1", Duration::from_secs(2))
            .expect("client builds");

        let error = client
            .call("eth_blockNumber", vec![])
            .await
            .expect_err("nothing listens on port 1");

        assert!(matches!(error, RpcClientError::FailedToSend { .. }));
    }

    #[tokio::test]
    async fn call_times_out_when_endpoint_never_answers() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener binds");
        let addr = listener.local_addr().expect("listener has an address");
        let silent = tokio::spawn(async move {
            // Accept and hold the connection without ever writing a response.
            let (_socket, _) = listener.accept().await.expect("client connects");
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = RpcClient::new(&format!("http://{addr}"), Duration::from_millis(300))
            .expect("client builds");
        let error = client
            .call("eth_getBlockByNumber", vec![json!("0x0"), json!(false)])
            .await
            .expect_err("a silent endpoint must not yield a response");

        assert!(matches!(error, RpcClientError::FailedToSend { .. }), "{error}");
        assert!(error.is_timeout(), "{error}");
        silent.abort();
    }
}
