//! Seeker Server
//!
//! Axum server exposing the session orchestrator over SSE, plus the person
//! search endpoint and a health probe. Also runs sessions directly from the
//! CLI without a server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use seeker_core::config::AppConfig;
use seeker_core::error::SearchError;
use seeker_core::planner::{planner_for, PlanProvider};
use seeker_core::plan::Plan;
use seeker_core::search::{SearchProviderKind, SearchResult, SearchService};
use seeker_core::session::Orchestrator;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::{OpenApi, ToSchema};

const DEFAULT_PORT: u16 = 3001;

/// Application state shared by all handlers.
struct AppState {
    config: Arc<AppConfig>,
    orchestrator: Orchestrator,
    search: SearchService,
    /// Pooled HTTP client, also used for per-request planner construction
    client: reqwest::Client,
}

type SharedState = Arc<AppState>;

// === API Types ===

#[derive(Deserialize, ToSchema)]
struct ChatRequest {
    query: String,
}

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Deserialize, ToSchema)]
struct PersonSearchRequest {
    /// Full name of the person to search for
    name: Option<String>,
    /// Email address belonging to the target person
    email: Option<String>,
    /// Search providers to query (e.g. ["brave", "zenserp"])
    search_providers: Option<Vec<String>>,
    /// Whether to include an orchestrator plan in the response
    #[serde(default = "default_true")]
    include_plan: bool,
    /// LLM provider for generating the plan
    #[serde(default = "default_plan_provider")]
    plan_provider: String,
    /// Additional context appended to the search query and plan prompt
    extra_context: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_plan_provider() -> String {
    "google".to_string()
}

#[derive(Serialize, ToSchema)]
struct ProviderSearchResults {
    provider: String,
    #[schema(value_type = Vec<Object>)]
    results: Vec<SearchResult>,
}

#[derive(Serialize, ToSchema)]
struct PersonSearchResponse {
    query: String,
    name: Option<String>,
    email: Option<String>,
    plan_provider: String,
    #[schema(value_type = Option<Object>)]
    orchestrator_plan: Option<Plan>,
    search_results: Vec<ProviderSearchResults>,
}

#[derive(Parser)]
#[command(author, version, about = "Seeker - Multi-Agent Research Engine")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the Seeker server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Run one session in-process, printing each event as a JSON line
    Run {
        /// The query to research
        query: String,
    },
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Seeker API",
        version = "1.0.0",
        description = "API for the Seeker multi-agent research engine"
    ),
    paths(health, person_search),
    components(schemas(
        ChatRequest,
        HealthResponse,
        PersonSearchRequest,
        PersonSearchResponse,
        ProviderSearchResults
    ))
)]
struct ApiDoc;

// === API Handlers ===

/// Health probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Run a session and stream its events as SSE. The chat endpoint is not in
/// the OpenAPI doc; event-stream responses don't fit its schema model.
async fn chat(State(state): State<SharedState>, Json(req): Json<ChatRequest>) -> Response {
    let Some(query) = normalize_query(&req.query) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "query must not be empty" })),
        )
            .into_response();
    };

    info!(query = %query, "starting chat session");

    let events = state
        .orchestrator
        .run(query)
        .map(|event| Event::default().json_data(&event));

    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(detail: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": detail.into() })),
    )
}

fn server_error(detail: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": detail.into() })),
    )
}

/// Search for a person by name/email across the selected search providers,
/// optionally with an orchestrator plan for a deeper follow-up session.
#[utoipa::path(
    post,
    path = "/api/search/person",
    request_body = PersonSearchRequest,
    responses(
        (status = 200, description = "Provider results and optional plan", body = PersonSearchResponse),
        (status = 400, description = "Missing name/email or unknown provider"),
        (status = 500, description = "Plan generation failed")
    )
)]
async fn person_search(
    State(state): State<SharedState>,
    Json(req): Json<PersonSearchRequest>,
) -> Result<Json<PersonSearchResponse>, ApiError> {
    let query = build_person_query(&req.name, &req.email, &req.extra_context);
    if query.is_empty() {
        return Err(bad_request("At least one of 'name' or 'email' is required"));
    }

    let providers = normalize_providers(&req.search_providers, state.config.search_provider)
        .map_err(|e| bad_request(e.to_string()))?;

    let mut search_results = Vec::with_capacity(providers.len());
    for provider in providers {
        let results = state
            .search
            .search(&query, Some(provider))
            .await
            .map_err(|e| server_error(format!("Search via {} failed: {e}", provider.as_str())))?;
        search_results.push(ProviderSearchResults {
            provider: provider.as_str().to_string(),
            results,
        });
    }

    let orchestrator_plan = if req.include_plan {
        let provider: PlanProvider = req
            .plan_provider
            .parse()
            .map_err(|_| bad_request("Unsupported plan provider"))?;
        let planner = planner_for(provider, &state.config, state.client.clone());
        let plan = timeout(state.config.plan_timeout, planner.generate_plan(&query))
            .await
            .map_err(|_| server_error("Failed to generate orchestrator plan: timed out"))?
            .map_err(|e| server_error(format!("Failed to generate orchestrator plan: {e}")))?;
        Some(plan)
    } else {
        None
    };

    Ok(Json(PersonSearchResponse {
        query,
        name: req.name,
        email: req.email,
        plan_provider: req.plan_provider,
        orchestrator_plan,
        search_results,
    }))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Trim the chat query; a whitespace-only query is rejected before a
/// session starts.
fn normalize_query(raw: &str) -> Option<String> {
    let query = raw.trim();
    if query.is_empty() {
        None
    } else {
        Some(query.to_string())
    }
}

/// Join the non-empty parts of the request into one search query.
fn build_person_query(
    name: &Option<String>,
    email: &Option<String>,
    extra_context: &Option<String>,
) -> String {
    [name, email, extra_context]
        .into_iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize the requested provider names: trim, lowercase via parsing,
/// dedupe, fall back to the configured default when none were given.
fn normalize_providers(
    requested: &Option<Vec<String>>,
    default: SearchProviderKind,
) -> Result<Vec<SearchProviderKind>, SearchError> {
    let names = match requested {
        Some(names) if !names.is_empty() => names.clone(),
        _ => return Ok(vec![default]),
    };

    let mut providers = Vec::new();
    for name in names {
        if name.trim().is_empty() {
            continue;
        }
        let provider: SearchProviderKind = name
            .parse()
            .map_err(|_| SearchError::UnknownProvider(name.trim().to_lowercase()))?;
        if !providers.contains(&provider) {
            providers.push(provider);
        }
    }
    if providers.is_empty() {
        providers.push(default);
    }
    Ok(providers)
}

// === Server Entry ===

fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(match state.config.frontend_url.parse() {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(_) => {
                warn!(url = %state.config.frontend_url, "invalid FRONTEND_URL, allowing any origin");
                AllowOrigin::any()
            }
        })
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/search/person", post(person_search))
        .route("/api/openapi.json", get(serve_openapi))
        .layer(cors)
        .with_state(state)
}

async fn run_server(config: Arc<AppConfig>, port: u16) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let state: SharedState = Arc::new(AppState {
        orchestrator: Orchestrator::from_config(config.clone(), client.clone()),
        search: SearchService::new(&config, client.clone()),
        config,
        client,
    });

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "seeker server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Drive one session to completion, printing each event as a JSON line.
async fn run_session(config: Arc<AppConfig>, query: String) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(config, reqwest::Client::new());
    let mut events = orchestrator.run(query);
    while let Some(event) = events.next().await {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Arc::new(AppConfig::from_env());

    match args.command {
        Some(CliCommand::Run { query }) => run_session(config, query).await,
        Some(CliCommand::Serve { port }) => run_server(config, port).await,
        None => run_server(config, DEFAULT_PORT).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query_rejects_blank() {
        assert_eq!(normalize_query("   "), None);
        assert_eq!(
            normalize_query("  Alan Turing "),
            Some("Alan Turing".to_string())
        );
    }

    #[test]
    fn test_build_person_query_joins_parts() {
        let query = build_person_query(
            &Some("Alan Turing".to_string()),
            &Some("alan@example.com".to_string()),
            &Some("  Bletchley Park ".to_string()),
        );
        assert_eq!(query, "Alan Turing alan@example.com Bletchley Park");
    }

    #[test]
    fn test_build_person_query_empty_when_nothing_given() {
        assert_eq!(build_person_query(&None, &None, &None), "");
        assert_eq!(
            build_person_query(&Some("   ".to_string()), &None, &None),
            ""
        );
    }

    #[test]
    fn test_normalize_providers_defaults_when_unset() {
        let providers = normalize_providers(&None, SearchProviderKind::Brave).unwrap();
        assert_eq!(providers, vec![SearchProviderKind::Brave]);
    }

    #[test]
    fn test_normalize_providers_dedupes() {
        let requested = Some(vec![
            "brave".to_string(),
            "Brave ".to_string(),
            "zenserp".to_string(),
        ]);
        let providers = normalize_providers(&requested, SearchProviderKind::Brave).unwrap();
        assert_eq!(
            providers,
            vec![SearchProviderKind::Brave, SearchProviderKind::ZenSerp]
        );
    }

    #[test]
    fn test_normalize_providers_rejects_unknown() {
        let requested = Some(vec!["AskJeeves ".to_string()]);
        let err = normalize_providers(&requested, SearchProviderKind::Brave).unwrap_err();
        assert!(matches!(err, SearchError::UnknownProvider(name) if name == "askjeeves"));
    }

    #[test]
    fn test_person_request_defaults() {
        let req: PersonSearchRequest =
            serde_json::from_str(r#"{ "name": "Alan Turing" }"#).unwrap();
        assert!(req.include_plan);
        assert_eq!(req.plan_provider, "google");
    }
}
