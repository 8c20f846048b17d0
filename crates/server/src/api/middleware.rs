//! Admission control middleware for the batch route.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::error::ApiError;
use crate::state::AppState;

/// Admission middleware that bounds how many batches run at once.
///
/// The request waits here for a slot. Once admitted it gets a derived
/// `RequestCancellation` and the rest of the stack runs in its own task that
/// owns the admission token. If the client disconnects, this future is
/// dropped: the derived token is cancelled, but the spawned task keeps going
/// until the dispatcher notices or the in-progress fetch hits its deadline,
/// and the slot is released when that task ends.
pub async fn admission_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match state.gate().acquire().await {
        Ok(token) => token,
        Err(e) => {
            warn!("Rejecting request: {}", e);
            return ApiError::from(e).into_response();
        }
    };

    let cancel = CancellationToken::new();
    request
        .extensions_mut()
        .insert(RequestCancellation(cancel.clone()));
    let disconnect = DisconnectGuard::new(cancel);

    let handle = tokio::spawn(async move {
        let _token = token;
        next.run(request).await
    });
    let result = handle.await;
    disconnect.disarm();

    match result {
        Ok(response) => response,
        Err(e) => {
            error!("Batch handler task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Cancels the request token if dropped while still armed.
struct DisconnectGuard {
    token: Option<CancellationToken>,
}

impl DisconnectGuard {
    fn new(token: CancellationToken) -> Self {
        Self { token: Some(token) }
    }

    fn disarm(mut self) {
        self.token = None;
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            info!("Request got cancelled");
            token.cancel();
        }
    }
}

/// Extractor for the per-request cancellation token.
///
/// Falls back to a token that never fires when the admission middleware is
/// not installed.
#[derive(Debug, Clone)]
pub struct RequestCancellation(pub CancellationToken);

impl<S> FromRequestParts<S> for RequestCancellation
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let cancellation = parts
            .extensions
            .get::<RequestCancellation>()
            .cloned()
            .unwrap_or_else(|| RequestCancellation(CancellationToken::new()));
        std::future::ready(Ok(cancellation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::post, Router};
    use fanout_core::{testing::MockTransport, Config, HttpTransport};
    use std::time::Duration;
    use tower::ServiceExt;

    fn create_test_state(capacity: usize) -> Arc<AppState> {
        let mut config = Config::default();
        config.admission.max_concurrent_batches = capacity;
        Arc::new(AppState::new(
            config,
            Arc::new(MockTransport::new()) as Arc<dyn HttpTransport>,
        ))
    }

    fn app(state: Arc<AppState>, router: Router<Arc<AppState>>) -> Router {
        router
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                admission_middleware,
            ))
            .with_state(state)
    }

    fn post_request() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/test")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_handler_sees_request_cancellation() {
        async fn handler(RequestCancellation(cancel): RequestCancellation) -> String {
            cancel.is_cancelled().to_string()
        }

        let state = create_test_state(1);
        let router = app(state.clone(), Router::new().route("/test", post(handler)));

        let response = router.oneshot(post_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.gate().stats().in_flight, 0);
        assert_eq!(state.gate().stats().total_admitted, 1);
    }

    #[tokio::test]
    async fn test_handler_panic_releases_slot() {
        async fn handler() -> &'static str {
            panic!("handler blew up")
        }

        let state = create_test_state(1);
        let router = app(state.clone(), Router::new().route("/test", post(handler)));

        let response = router.oneshot(post_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.gate().stats().in_flight, 0);
        assert!(state.gate().try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_closed_gate_returns_unavailable() {
        async fn handler() -> &'static str {
            "OK"
        }

        let state = create_test_state(1);
        state.gate().close();
        let router = app(state, Router::new().route("/test", post(handler)));

        let response = router.oneshot(post_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_cancels_token_but_not_handler() {
        let (tx, rx) = tokio::sync::oneshot::channel::<bool>();
        let tx = Arc::new(std::sync::Mutex::new(Some(tx)));

        let handler = {
            let tx = Arc::clone(&tx);
            move |RequestCancellation(cancel): RequestCancellation| async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                if let Some(tx) = tx.lock().unwrap().take() {
                    let _ = tx.send(cancel.is_cancelled());
                }
                "done"
            }
        };

        let state = create_test_state(1);
        let router = app(state.clone(), Router::new().route("/test", post(handler)));

        // Client gives up after 100ms.
        let result =
            tokio::time::timeout(Duration::from_millis(100), router.oneshot(post_request())).await;
        assert!(result.is_err());

        // The handler still ran to completion and observed the cancellation.
        assert!(rx.await.unwrap());
        tokio::task::yield_now().await;
        assert_eq!(state.gate().stats().in_flight, 0);
    }

    #[test]
    fn test_extractor_without_middleware_never_cancelled() {
        let request = Request::builder().uri("/").body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        let RequestCancellation(token) = tokio_test::block_on(
            RequestCancellation::from_request_parts(&mut parts, &()),
        )
        .unwrap();
        assert!(!token.is_cancelled());
    }
}
