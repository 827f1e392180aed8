use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use cynllun_core::gateway::{GatewayError, GenerationGateway, RubricRequest};
use cynllun_core::leads::{Lead, LeadStore};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
            details: None,
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
            details: None,
        }
    }

    /// Map a gateway failure to the wire contract: configuration problems
    /// are a 500 with a generic message (never exposing config detail),
    /// everything upstream is a 502 with details.
    pub fn from_gateway(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingApiKey => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "API key not configured".to_string(),
                details: None,
            },
            GatewayError::Upstream { status, details } => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "AI service error".to_string(),
                details: Some(format!("status {status}: {details}")),
            },
            GatewayError::Transport(e) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "AI service error".to_string(),
                details: Some(e.to_string()),
            },
            GatewayError::MalformedResponse(detail) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "AI service error".to_string(),
                details: Some(detail),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = match self.details {
            Some(details) => serde_json::json!({ "error": self.message, "details": details }),
            None => serde_json::json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State and request types
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn GenerationGateway>,
    pub leads: LeadStore,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    context: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    school: Option<String>,
    #[serde(default)]
    plan_type: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/register", post(register))
        .route("/api/rubric", post(rubric))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(
    gateway: Arc<dyn GenerationGateway>,
    leads: LeadStore,
    bind: &str,
    port: u16,
) -> Result<()> {
    let app = build_router(AppState { gateway, leads });
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("cynllun serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("cynllun serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<axum::response::Response, AppError> {
    let context = request
        .context
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing context"))?;

    let activities = state
        .gateway
        .generate_activities(&context)
        .await
        .map_err(AppError::from_gateway)?;

    Ok(Json(serde_json::json!({ "activities": activities })).into_response())
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<axum::response::Response, AppError> {
    let name = request.name.filter(|n| !n.trim().is_empty());
    let email = request.email.filter(|e| !e.trim().is_empty());
    let (Some(name), Some(email)) = (name, email) else {
        return Err(AppError::bad_request("Name and email are required"));
    };

    let lead = Lead::new(name, email, request.school, request.plan_type, request.timestamp);
    state.leads.append(lead).map_err(AppError::internal)?;

    Ok(Json(serde_json::json!({ "success": true })).into_response())
}

async fn rubric(
    State(state): State<AppState>,
    Json(request): Json<RubricRequest>,
) -> Result<axum::response::Response, AppError> {
    if request.is_unanchored() {
        return Err(AppError::bad_request(
            "Please provide an area, outcomes, or task description.",
        ));
    }

    let rubric = state
        .gateway
        .generate_rubric(&request)
        .await
        .map_err(AppError::from_gateway)?;

    Ok(Json(serde_json::json!({ "rubric": rubric })).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    /// Scripted gateway for router tests.
    struct MockGateway {
        activities: Result<String, GatewayError>,
        rubric: Result<String, GatewayError>,
    }

    impl MockGateway {
        fn ok() -> Self {
            Self {
                activities: Ok("1. Pond Dipping\nExplore the stream.".to_string()),
                rubric: Ok(r#"{"title":"T","criteria":[]}"#.to_string()),
            }
        }

        fn failing(err: fn() -> GatewayError) -> Self {
            Self {
                activities: Err(err()),
                rubric: Err(err()),
            }
        }
    }

    #[async_trait]
    impl GenerationGateway for MockGateway {
        async fn generate_activities(&self, _context: &str) -> Result<String, GatewayError> {
            clone_result(&self.activities)
        }

        async fn generate_rubric(&self, _request: &RubricRequest) -> Result<String, GatewayError> {
            clone_result(&self.rubric)
        }
    }

    fn clone_result(r: &Result<String, GatewayError>) -> Result<String, GatewayError> {
        match r {
            Ok(s) => Ok(s.clone()),
            Err(GatewayError::MissingApiKey) => Err(GatewayError::MissingApiKey),
            Err(GatewayError::Upstream { status, details }) => Err(GatewayError::Upstream {
                status: *status,
                details: details.clone(),
            }),
            Err(GatewayError::MalformedResponse(d)) => {
                Err(GatewayError::MalformedResponse(d.clone()))
            }
            Err(GatewayError::Transport(_)) => {
                Err(GatewayError::MalformedResponse("transport".to_string()))
            }
        }
    }

    fn router_with(gateway: MockGateway, tmp: &tempfile::TempDir) -> Router {
        build_router(AppState {
            gateway: Arc::new(gateway),
            leads: LeadStore::new(tmp.path().join("leads.json")),
        })
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn generate_returns_activities() {
        let tmp = tempfile::tempdir().unwrap();
        let app = router_with(MockGateway::ok(), &tmp);

        let resp = post_json(app, "/api/generate", r#"{"context":"TOPIC: Rivers"}"#).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(
            json["activities"].as_str().unwrap().contains("Pond Dipping"),
            "unexpected body: {json}"
        );
    }

    #[tokio::test]
    async fn generate_missing_context_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        let app = router_with(MockGateway::ok(), &tmp);

        let resp = post_json(app, "/api/generate", "{}").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Missing context");
    }

    #[tokio::test]
    async fn generate_without_api_key_is_500() {
        let tmp = tempfile::tempdir().unwrap();
        let app = router_with(MockGateway::failing(|| GatewayError::MissingApiKey), &tmp);

        let resp = post_json(app, "/api/generate", r#"{"context":"x"}"#).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "API key not configured");
    }

    #[tokio::test]
    async fn generate_upstream_failure_is_502_with_details() {
        let tmp = tempfile::tempdir().unwrap();
        let app = router_with(
            MockGateway::failing(|| GatewayError::Upstream {
                status: 529,
                details: "overloaded".to_string(),
            }),
            &tmp,
        );

        let resp = post_json(app, "/api/generate", r#"{"context":"x"}"#).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "AI service error");
        assert!(json["details"].as_str().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn register_appends_lead() {
        let tmp = tempfile::tempdir().unwrap();
        let leads = LeadStore::new(tmp.path().join("leads.json"));
        let app = build_router(AppState {
            gateway: Arc::new(MockGateway::ok()),
            leads: leads.clone(),
        });

        let resp = post_json(
            app,
            "/api/register",
            r#"{"name":"Eleri","email":"eleri@ysgol.cymru","school":"Ysgol y Bont","planType":"ai"}"#,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);

        let stored = leads.load_existing();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].plan_type, "ai");
    }

    #[tokio::test]
    async fn register_missing_email_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        let app = router_with(MockGateway::ok(), &tmp);

        let resp = post_json(app, "/api/register", r#"{"name":"Eleri"}"#).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Name and email are required");
    }

    #[tokio::test]
    async fn rubric_requires_an_anchor() {
        let tmp = tempfile::tempdir().unwrap();
        let app = router_with(MockGateway::ok(), &tmp);

        let resp = post_json(app, "/api/rubric", "{}").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(
            json["error"],
            "Please provide an area, outcomes, or task description."
        );
    }

    #[tokio::test]
    async fn rubric_returns_raw_text() {
        let tmp = tempfile::tempdir().unwrap();
        let app = router_with(MockGateway::ok(), &tmp);

        let resp = post_json(app, "/api/rubric", r#"{"area":"Humanities"}"#).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(json["rubric"].as_str().unwrap().starts_with('{'));
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let tmp = tempfile::tempdir().unwrap();
        let app = router_with(MockGateway::ok(), &tmp);

        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/generate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
