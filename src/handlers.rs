use crate::aggregation::AggregationService;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ListingsQuery, ListingsResponse};
use crate::router::{Service, ServiceRouter};
use crate::upstream::UpstreamClient;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Maps logical services to their base addresses.
    pub router: ServiceRouter,
    /// Shared HTTP client for all upstream calls.
    pub upstream: UpstreamClient,
}

/// Builds the gateway's route table.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/public-api/listings",
            get(get_listings).post(create_listing),
        )
        .route("/public-api/users", post(create_user))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "listings-gateway",
            "version": "0.1.0"
        })),
    )
}

/// GET /public-api/listings
///
/// The aggregated read path: one listings page from the listing service,
/// with each listing's owning user embedded.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `query` - Pagination and optional `user_id` filter, forwarded upstream.
///
/// # Returns
///
/// * `Result<Json<ListingsResponse>, AppError>` - The enriched page or an error.
pub async fn get_listings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingsQuery>,
) -> Result<Json<ListingsResponse>, AppError> {
    tracing::info!("GET /public-api/listings - params: {:?}", query);

    let service = AggregationService::new(&state.router, &state.upstream);
    let listings = service.get_listings(&query).await?;

    Ok(Json(ListingsResponse {
        result: true,
        listings,
    }))
}

/// POST /public-api/listings
///
/// Passthrough create: the JSON body is re-encoded as the form the listing
/// service consumes, and the service's status and body are relayed.
pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let fields = parse_json_object(&body)?;
    let form = to_form_fields(&fields);

    let url = state.router.resolve(Service::Listing, "/listings")?;
    let reply = state
        .upstream
        .post_form(url, &form)
        .await
        .map_err(|e| AppError::from_primary(e, Service::Listing.label()))?;

    Ok((reply.status, Json(reply.body)))
}

/// POST /public-api/users
///
/// Passthrough create with a local guard: a missing or empty `name` is
/// rejected before any upstream call is made.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let fields = parse_json_object(&body)?;
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("JSON body must contain a 'name' key.".to_string()))?;

    let form = vec![("name".to_string(), name.to_string())];
    let url = state.router.resolve(Service::User, "/users")?;
    let reply = state
        .upstream
        .post_form(url, &form)
        .await
        .map_err(|e| AppError::from_primary(e, Service::User.label()))?;

    Ok((reply.status, Json(reply.body)))
}

/// Parses a request body as a JSON object.
///
/// Raw-bytes parsing keeps malformed-body rejections inside the uniform
/// error envelope.
fn parse_json_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::BadRequest("Invalid JSON format.".to_string()))
}

/// Re-encodes parsed JSON fields as the form fields the backends consume.
fn to_form_fields(fields: &Map<String, Value>) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), form_value(value)))
        .collect()
}

fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
