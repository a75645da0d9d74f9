//! REST API server for the career agents
//!
//! Exposes the orchestrator, each sub-agent, the portfolio site renderer and
//! the profile store over HTTP.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::agent::{Agent, OrchestratorAgent, OrchestratorConfig, PortfolioBuilderAgent};
use crate::error::AgentError;
use crate::llm::{ModelSelector, ModelTask, TextGenerator};
use crate::models::Outcome;
use crate::site::{PortfolioBundle, ReactSiteGenerator};
use crate::state::ProfileStore;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub user_id: i64,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub raw_data: Value,
}

fn default_source() -> String {
    "manual".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    pub task: Option<ModelTask>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn failure(err: &AgentError) -> ApiResult {
    let status = match err {
        AgentError::NotFound(_) => StatusCode::NOT_FOUND,
        AgentError::Store(_) => StatusCode::CONFLICT,
        AgentError::Decision(_) | AgentError::InvalidActionInput { .. } => StatusCode::BAD_REQUEST,
        AgentError::AlreadyRunning(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(error = %err, "Request failed");
    }
    (status, Json(ApiResponse::error(err.to_string())))
}

/// Agent error outcomes are reported with the outcome attached
fn outcome_response(outcome: Outcome) -> ApiResult {
    if outcome.is_success() {
        return ok(outcome);
    }

    let message = outcome.error_message().unwrap_or("agent run failed").to_string();
    let mut response = ApiResponse::error(message);
    response.data = serde_json::to_value(&outcome).ok();
    (StatusCode::UNPROCESSABLE_ENTITY, Json(response))
}

/// =============================
/// API State
/// =============================

/// `orchestrator` backs the per-agent run and reset endpoints. Workflow
/// requests get their own orchestrator so they never queue behind each other.
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Mutex<OrchestratorAgent>>,
    pub store: Arc<dyn ProfileStore>,
    generator: Option<Arc<dyn TextGenerator>>,
    config: OrchestratorConfig,
}

impl ApiState {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        config: OrchestratorConfig,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        let orchestrator = OrchestratorAgent::with_config(generator.clone(), config.clone());
        Self {
            orchestrator: Arc::new(Mutex::new(orchestrator)),
            store,
            generator,
            config,
        }
    }

    fn workflow_orchestrator(&self) -> OrchestratorAgent {
        OrchestratorAgent::with_config(self.generator.clone(), self.config.clone())
    }
}

/// =============================
/// Health & Models
/// =============================

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_models(Query(query): Query<ModelsQuery>) -> ApiResult {
    ok(ModelSelector::new().list(query.task))
}

/// =============================
/// Agent Endpoints
/// =============================

async fn run_workflow(State(state): State<ApiState>, Json(body): Json<Value>) -> ApiResult {
    let profile_id = body.get("profile_id").and_then(Value::as_i64);
    let request_type = body
        .get("request_type")
        .and_then(Value::as_str)
        .unwrap_or("full_optimization")
        .to_string();
    info!(%request_type, ?profile_id, "Received workflow request");

    if let Some(id) = profile_id {
        match state.store.get_profile(id).await {
            Ok(Some(_)) => {}
            Ok(None) => return failure(&AgentError::NotFound(format!("profile {}", id))),
            Err(e) => return failure(&e),
        }
    }

    let outcome = state.workflow_orchestrator().run(&body).await;

    if let Some(id) = profile_id {
        if let Err(e) = persist_outcome(state.store.as_ref(), id, &request_type, &outcome).await {
            return failure(&e);
        }
    }

    outcome_response(outcome)
}

async fn persist_outcome(
    store: &dyn ProfileStore,
    profile_id: i64,
    request_type: &str,
    outcome: &Outcome,
) -> crate::Result<()> {
    let payload = serde_json::to_value(outcome)?;
    store.save_analysis(profile_id, request_type, payload.clone(), None).await?;
    if outcome.is_success() {
        store.update_processed_data(profile_id, payload).await?;
    }
    Ok(())
}

async fn run_agent(
    State(state): State<ApiState>,
    Path(agent): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult {
    let mut orchestrator = state.orchestrator.lock().await;
    let outcome = match agent.as_str() {
        "orchestrator" => orchestrator.run(&body).await,
        "profile_analyzer" => orchestrator.profile_analyzer_mut().run(&body).await,
        "content_generator" => orchestrator.content_generator_mut().run(&body).await,
        "portfolio_builder" => orchestrator.portfolio_builder_mut().run(&body).await,
        "optimization" => orchestrator.optimization_agent_mut().run(&body).await,
        other => return failure(&AgentError::NotFound(format!("agent {}", other))),
    };
    outcome_response(outcome)
}

async fn reset_agent(State(state): State<ApiState>, Path(agent): Path<String>) -> ApiResult {
    let mut orchestrator = state.orchestrator.lock().await;
    let status = match agent.as_str() {
        "orchestrator" => {
            orchestrator.reset();
            orchestrator.core().status()
        }
        "profile_analyzer" => {
            orchestrator.profile_analyzer_mut().reset();
            orchestrator.profile_analyzer().core().status()
        }
        "content_generator" => {
            orchestrator.content_generator_mut().reset();
            orchestrator.content_generator().core().status()
        }
        "portfolio_builder" => {
            orchestrator.portfolio_builder_mut().reset();
            orchestrator.portfolio_builder().core().status()
        }
        "optimization" => {
            orchestrator.optimization_agent_mut().reset();
            orchestrator.optimization_agent().core().status()
        }
        other => return failure(&AgentError::NotFound(format!("agent {}", other))),
    };
    ok(status)
}

async fn render_site(Json(body): Json<Value>) -> ApiResult {
    // a throwaway builder keeps site previews out of the shared agent's history
    let outcome = PortfolioBuilderAgent::new().run(&body).await;
    if !outcome.is_success() {
        return outcome_response(outcome);
    }

    match PortfolioBundle::from_outcome(&outcome) {
        Ok(bundle) => ok(ReactSiteGenerator::new().render(&bundle)),
        Err(e) => failure(&e),
    }
}

/// =============================
/// Store Endpoints
/// =============================

async fn create_user(State(state): State<ApiState>, Json(req): Json<CreateUserRequest>) -> ApiResult {
    match state.store.create_user(&req.email, &req.name).await {
        Ok(user) => (StatusCode::CREATED, Json(ApiResponse::success(user))),
        Err(e) => failure(&e),
    }
}

async fn get_user(State(state): State<ApiState>, Path(user_id): Path<i64>) -> ApiResult {
    match state.store.get_user(user_id).await {
        Ok(Some(user)) => ok(user),
        Ok(None) => failure(&AgentError::NotFound(format!("user {}", user_id))),
        Err(e) => failure(&e),
    }
}

async fn create_profile(
    State(state): State<ApiState>,
    Json(req): Json<CreateProfileRequest>,
) -> ApiResult {
    match state.store.create_profile(req.user_id, &req.source, req.raw_data).await {
        Ok(profile) => (StatusCode::CREATED, Json(ApiResponse::success(profile))),
        Err(e) => failure(&e),
    }
}

async fn list_analyses(State(state): State<ApiState>, Path(profile_id): Path<i64>) -> ApiResult {
    match state.store.get_profile(profile_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return failure(&AgentError::NotFound(format!("profile {}", profile_id))),
        Err(e) => return failure(&e),
    }

    match state.store.analyses_for_profile(profile_id).await {
        Ok(analyses) => ok(analyses),
        Err(e) => failure(&e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/models", get(list_models))
        .route("/api/run", post(run_workflow))
        .route("/api/agents/:agent/run", post(run_agent))
        .route("/api/agents/:agent/reset", post(reset_agent))
        .route("/api/portfolio/site", post(render_site))
        .route("/api/users", post(create_user))
        .route("/api/users/:id", get(get_user))
        .route("/api/profiles", post(create_profile))
        .route("/api/profiles/:id/analyses", get(list_analyses))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(state: ApiState, port: u16) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemoryProfileStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> ApiState {
        ApiState::new(None, OrchestratorConfig::default(), Arc::new(InMemoryProfileStore::new()))
    }

    async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, ApiResponse) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let router = create_router(test_state());
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_models_by_task() {
        let router = create_router(test_state());
        let (status, body) = send(router, "GET", "/api/models?task=feature-extraction", None).await;

        assert_eq!(status, StatusCode::OK);
        let models = body.data.unwrap();
        let tasks: Vec<_> = models.as_array().unwrap().iter().map(|m| m["task"].clone()).collect();
        assert!(!tasks.is_empty());
        assert!(tasks.iter().all(|t| t == "feature-extraction"));
    }

    #[tokio::test]
    async fn test_run_agent_and_reset() {
        let state = test_state();

        let (status, body) = send(
            create_router(state.clone()),
            "POST",
            "/api/agents/profile_analyzer/run",
            Some(json!({ "profile_data": { "headline": "Engineer" }, "analysis_type": "headline" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.data.unwrap()["agent"], "ProfileAnalyzer");

        let (status, body) = send(create_router(state.clone()), "POST", "/api/agents/profile_analyzer/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.unwrap()["actions_completed"], 0);

        let (status, _) = send(create_router(state), "POST", "/api/agents/nobody/run", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_persists_outcome_for_profile() {
        let state = test_state();

        let (status, user) = send(
            create_router(state.clone()),
            "POST",
            "/api/users",
            Some(json!({ "email": "jo@example.com", "name": "Jo" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let user_id = user.data.unwrap()["id"].as_i64().unwrap();

        let (status, profile) = send(
            create_router(state.clone()),
            "POST",
            "/api/profiles",
            Some(json!({ "user_id": user_id, "raw_data": { "headline": "Analyst" } })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let profile = profile.data.unwrap();
        assert_eq!(profile["source"], "manual");
        let profile_id = profile["id"].as_i64().unwrap();

        let (status, run) = send(
            create_router(state.clone()),
            "POST",
            "/api/run",
            Some(json!({
                "request_type": "profile_only",
                "profile_id": profile_id,
                "profile_data": { "headline": "Analyst" },
                "user_data": { "target_role": "Data Scientist" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(run.data.unwrap()["status"], "success");

        let (status, analyses) = send(
            create_router(state.clone()),
            "GET",
            &format!("/api/profiles/{}/analyses", profile_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let analyses = analyses.data.unwrap();
        assert_eq!(analyses.as_array().unwrap().len(), 1);
        assert_eq!(analyses[0]["kind"], "profile_only");

        let stored = state.store.get_profile(profile_id).await.unwrap().unwrap();
        assert!(stored.processed_data.is_some());
    }

    #[tokio::test]
    async fn test_workflow_runs_leave_shared_agents_untouched() {
        let state = test_state();
        let request = json!({
            "request_type": "full_optimization",
            "profile_data": { "headline": "Analyst" },
            "user_data": { "name": "Jo", "target_role": "Data Scientist" }
        });

        for _ in 0..3 {
            let (status, body) = send(create_router(state.clone()), "POST", "/api/run", Some(request.clone())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body.data.unwrap()["results"].as_array().unwrap().len(), 4);
        }

        let orchestrator = state.orchestrator.lock().await;
        assert!(orchestrator.core().actions_history().is_empty());
        assert!(orchestrator.core().memory().is_empty());
        assert!(orchestrator.profile_analyzer().core().actions_history().is_empty());
    }

    #[tokio::test]
    async fn test_store_errors_map_to_status_codes() {
        let state = test_state();

        let (status, body) = send(create_router(state.clone()), "GET", "/api/users/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);

        let user = json!({ "email": "dup@example.com", "name": "Dup" });
        send(create_router(state.clone()), "POST", "/api/users", Some(user.clone())).await;
        let (status, _) = send(create_router(state.clone()), "POST", "/api/users", Some(user)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            create_router(state),
            "POST",
            "/api/run",
            Some(json!({ "profile_id": 999 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_render_site() {
        let router = create_router(test_state());
        let (status, body) = send(
            router,
            "POST",
            "/api/portfolio/site",
            Some(json!({ "user_data": { "name": "Ada", "target_role": "Software Engineer" } })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let site = body.data.unwrap();
        assert_eq!(site["entry_point"], "App.jsx");
        assert!(site["files"].get("components/Hero.jsx").is_some());
    }

    #[tokio::test]
    async fn test_bad_agent_input_is_unprocessable() {
        let router = create_router(test_state());
        let (status, body) = send(
            router,
            "POST",
            "/api/agents/profile_analyzer/run",
            Some(json!({ "profile_data": "not an object" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body.success);
        assert_eq!(body.data.unwrap()["status"], "error");
    }
}
