//! Hyper-based HTTP server
//!
//! One endpoint, method-routed only: POST on any path embeds the request
//! text. The path is deliberately not inspected - clients POST to whatever
//! path they like, matching the original wire contract.

use std::convert::Infallible;
use std::sync::Arc;

use hyper::body::to_bytes;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use tokio::net::TcpSocket;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::model::TextEncoder;
use crate::protocol::http::{EmbedRequest, EmbedResponse, ErrorResponse};
use crate::server::config::ServerConfig;

/// Shared state for the Hyper server
#[derive(Clone)]
struct ServerState {
    encoder: Arc<dyn TextEncoder>,
    limiter: Arc<Semaphore>,
    config: Arc<ServerConfig>,
}

/// Start the HTTP server and serve until the process exits
pub async fn start_http_server(
    config: Arc<ServerConfig>,
    encoder: Arc<dyn TextEncoder>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bind_address = config.network.bind_address.clone();

    info!("🚀 Starting HTTP embedding server");
    info!("📡 Binding to {}", bind_address);

    let state = ServerState {
        encoder,
        // In-flight embeds queue here; one permit reproduces the strictly
        // serial, arrival-order processing of the original service.
        limiter: Arc::new(Semaphore::new(config.network.max_in_flight)),
        config,
    };

    let make_svc = make_service_fn(move |_| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let state = state.clone();
                handle_request(req, state)
            }))
        }
    });

    let addr = bind_address.parse()?;

    let socket = TcpSocket::new_v4()?;

    // TCP_NODELAY: Nagle buffers the small JSON responses otherwise
    socket.set_nodelay(true)?;

    // SO_REUSEADDR for faster restart
    socket.set_reuseaddr(true)?;

    socket.bind(addr)?;
    let listener = socket.listen(1024)?;

    let server = Server::from_tcp(listener.into_std()?)?
        .http1_keepalive(true)
        .tcp_nodelay(true)
        .serve(make_svc);

    info!("✅ HTTP server listening on {}", bind_address);
    info!("📍 POST <any path> with {{\"text\": \"...\"}} to embed");

    server.await?;

    Ok(())
}

/// Main request handler - method routing only, the path is not inspected
async fn handle_request(
    req: Request<Body>,
    state: ServerState,
) -> Result<Response<Body>, Infallible> {
    let response = if req.method() == Method::POST {
        handle_embed(req, state).await
    } else {
        handle_method_not_allowed(req.method())
    };

    Ok(response)
}

/// 405 handler for anything that isn't a POST
fn handle_method_not_allowed(method: &Method) -> Response<Body> {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        ErrorResponse::method_not_allowed(method.as_str()),
    )
}

/// Embedding endpoint
///
/// Every failure maps to a structured JSON error instead of tearing down
/// the request: 400 for unreadable or malformed bodies, 413 for oversized
/// ones, 500 for inference failures.
async fn handle_embed(req: Request<Body>, state: ServerState) -> Response<Body> {
    let start_time = std::time::Instant::now();

    let _permit = match state.limiter.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("Server is shutting down"),
            );
        }
    };

    let body_bytes = match to_bytes(req.into_body()).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Failed to read request body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, ErrorResponse::body_read_failed());
        }
    };

    let max_body_bytes = state.config.network.max_body_bytes;
    if body_bytes.len() > max_body_bytes {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorResponse::body_too_large(body_bytes.len(), max_body_bytes),
        );
    }

    let request: EmbedRequest = match serde_json::from_slice(&body_bytes) {
        Ok(req) => req,
        Err(e) => {
            debug!("Rejecting malformed JSON body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, ErrorResponse::invalid_json());
        }
    };

    match state.encoder.encode(&request.text).await {
        Ok(embedding) => {
            if embedding.len() != state.encoder.dimension() {
                warn!(
                    "Model returned {} dimensions, expected {}",
                    embedding.len(),
                    state.encoder.dimension()
                );
            }

            let response = EmbedResponse::new(embedding);
            let json_body = serde_json::to_string(&response).unwrap();

            debug!(
                "Embedded {} chars in {:?}",
                request.text.len(),
                start_time.elapsed()
            );

            Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .body(Body::from(json_body))
                .unwrap()
        }
        Err(e) => {
            error!("❌ Embedding generation failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::internal_error(e.to_string()),
            )
        }
    }
}

/// Helper to create error responses
fn error_response(status: StatusCode, error: ErrorResponse) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&error).unwrap()))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Embedding, EmbeddingError, EmbeddingResult, ModelInfo};
    use async_trait::async_trait;

    /// Stub encoder: first component is the input length, rest zeros, so
    /// tests can tell inputs apart without a real model.
    struct StubEncoder {
        info: ModelInfo,
    }

    impl StubEncoder {
        fn new() -> Self {
            Self {
                info: ModelInfo {
                    identifier: "stub".to_string(),
                    dimension: 4,
                    max_sequence_length: 16,
                    pooling_mode: "mean".to_string(),
                },
            }
        }
    }

    #[async_trait]
    impl TextEncoder for StubEncoder {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        async fn encode(&self, text: &str) -> EmbeddingResult<Embedding> {
            let mut embedding = vec![0.0; self.info.dimension];
            embedding[0] = text.chars().count() as f32;
            Ok(embedding)
        }
    }

    /// Stub encoder whose inference always fails
    struct FailingEncoder {
        info: ModelInfo,
    }

    #[async_trait]
    impl TextEncoder for FailingEncoder {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        async fn encode(&self, _text: &str) -> EmbeddingResult<Embedding> {
            Err(EmbeddingError::InferenceError {
                error: "stub failure".to_string(),
            })
        }
    }

    fn test_state(encoder: Arc<dyn TextEncoder>) -> ServerState {
        let config = Arc::new(ServerConfig::default());
        ServerState {
            encoder,
            limiter: Arc::new(Semaphore::new(config.network.max_in_flight)),
            config,
        }
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_embed_returns_vector_of_model_dimension() {
        let state = test_state(Arc::new(StubEncoder::new()));

        let response = handle_embed(post(r#"{"text": "Hello in Czech is Ahoj!"}"#), state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );

        let json = body_json(response).await;
        let embedding = json["embedding"].as_array().unwrap();
        assert_eq!(embedding.len(), 4);
        assert!(embedding.iter().all(|v| v.as_f64().unwrap().is_finite()));
    }

    #[tokio::test]
    async fn test_missing_text_equals_empty_text() {
        let state = test_state(Arc::new(StubEncoder::new()));

        let from_empty_object =
            body_json(handle_embed(post("{}"), state.clone()).await).await;
        let from_empty_text =
            body_json(handle_embed(post(r#"{"text": ""}"#), state).await).await;

        assert_eq!(from_empty_object, from_empty_text);
    }

    #[tokio::test]
    async fn test_embed_is_deterministic_per_input() {
        let state = test_state(Arc::new(StubEncoder::new()));

        let first = body_json(handle_embed(post(r#"{"text": "ahoj"}"#), state.clone()).await).await;
        let second = body_json(handle_embed(post(r#"{"text": "ahoj"}"#), state.clone()).await).await;
        let other = body_json(handle_embed(post(r#"{"text": "hello world"}"#), state).await).await;

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(
            first["embedding"].as_array().unwrap().len(),
            other["embedding"].as_array().unwrap().len()
        );
    }

    #[tokio::test]
    async fn test_malformed_json_yields_400_and_server_keeps_serving() {
        let state = test_state(Arc::new(StubEncoder::new()));

        let response = handle_embed(post("not-json"), state.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].is_string());

        // The next request still succeeds
        let response = handle_embed(post(r#"{"text": "still alive"}"#), state).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oversized_body_yields_413() {
        let mut config = ServerConfig::default();
        config.network.max_body_bytes = 32;
        let config = Arc::new(config);
        let state = ServerState {
            encoder: Arc::new(StubEncoder::new()),
            limiter: Arc::new(Semaphore::new(1)),
            config,
        };

        let body = format!(r#"{{"text": "{}"}}"#, "x".repeat(100));
        let response = handle_embed(post(&body), state).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_inference_failure_yields_500() {
        let state = test_state(Arc::new(FailingEncoder {
            info: ModelInfo {
                identifier: "stub".to_string(),
                dimension: 4,
                max_sequence_length: 16,
                pooling_mode: "mean".to_string(),
            },
        }));

        let response = handle_embed(post(r#"{"text": "boom"}"#), state).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_non_post_yields_405() {
        let state = test_state(Arc::new(StubEncoder::new()));

        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let request = Request::builder()
                .method(method)
                .uri("/")
                .body(Body::empty())
                .unwrap();

            let response = handle_request(request, state.clone()).await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
    }

    #[tokio::test]
    async fn test_path_is_not_inspected() {
        let state = test_state(Arc::new(StubEncoder::new()));

        for path in ["/", "/embed", "/some/other/path"] {
            let request = Request::builder()
                .method(Method::POST)
                .uri(path)
                .body(Body::from(r#"{"text": "anywhere"}"#))
                .unwrap();

            let response = handle_request(request, state.clone()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
