//! HTTP front-end: the same suggestion capability behind `POST /suggest`.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::error::Result;
use crate::suggest::{suggest_within, Suggester};

#[derive(Clone)]
struct AppState {
    suggester: Arc<dyn Suggester>,
    deadline: Duration,
}

/// Build the router. Other methods on `/suggest` get 405 from axum.
pub fn router(suggester: Arc<dyn Suggester>, deadline: Duration) -> Router {
    Router::new()
        .route("/suggest", post(suggest))
        .route("/health", get(health))
        .with_state(AppState {
            suggester,
            deadline,
        })
}

async fn suggest(
    State(state): State<AppState>,
    body: String,
) -> std::result::Result<String, (StatusCode, &'static str)> {
    tracing::info!("received input: {}", body);

    match suggest_within(state.suggester.as_ref(), &body, state.deadline).await {
        Ok(suggestion) => {
            tracing::info!("generated suggestion: {}", suggestion);
            Ok(format!("{suggestion}\n"))
        }
        Err(e) => {
            tracing::error!("failed to get suggestion: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to get suggestion\n",
            ))
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

/// Listen on `0.0.0.0:port` until `shutdown` resolves, then drain connections.
pub async fn serve<F>(
    port: u16,
    suggester: Arc<dyn Suggester>,
    deadline: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("server listening on port {}", port);

    axum::serve(listener, router(suggester, deadline))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SuggestionsError;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl Suggester for Fixed {
        async fn suggest(&self, input: &str) -> Result<String> {
            match self.0 {
                Some(suffix) => Ok(format!("{input}{suffix}")),
                None => Err(SuggestionsError::EmptySuggestion { backend: "fixed" }),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn app(reply: Option<&'static str>) -> Router {
        router(Arc::new(Fixed(reply)), Duration::from_secs(1))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn suggest_appends_newline() {
        let response = app(Some("ommit"))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/suggest")
                    .body(Body::from("git c"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "git commit\n");
    }

    #[tokio::test]
    async fn suggest_failure_is_500() {
        let response = app(None)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/suggest")
                    .body(Body::from("ls"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn suggest_rejects_get() {
        let response = app(Some("x"))
            .oneshot(
                Request::builder()
                    .uri("/suggest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app(None)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }
}
