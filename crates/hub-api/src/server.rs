//! HTTP server lifecycle: middleware stack, bind, graceful shutdown.

use std::time::Duration;

use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{AppState, Error, HubConfig, Result, router};

/// The router with tracing and CORS applied.
pub fn app(config: &HubConfig, state: AppState) -> Result<Router> {
    let mut app = router(state).layer(TraceLayer::new_for_http());
    if let Some(cors) = cors_layer(&config.server.cors_origins)? {
        app = app.layer(cors);
    }
    Ok(app)
}

/// CORS for the configured origins; none configured means no CORS layer.
fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let values = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o)
                    .map_err(|_| Error::config(format!("invalid CORS origin: {o}")))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .max_age(Duration::from_secs(60 * 60)),
    ))
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: &HubConfig, state: AppState) -> Result<()> {
    let app = app(config, state)?;
    let address = config.bind_address();

    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Project-HUB listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_origins_no_cors() {
        assert!(cors_layer(&[]).unwrap().is_none());
    }

    #[test]
    fn test_wildcard_and_list_origins() {
        assert!(cors_layer(&["*".to_string()]).unwrap().is_some());
        let origins = vec![
            "http://localhost:5173".to_string(),
            "https://hub.uni.edu".to_string(),
        ];
        assert!(cors_layer(&origins).unwrap().is_some());
    }

    #[test]
    fn test_invalid_origin_is_config_error() {
        let err = cors_layer(&["bad\norigin".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
