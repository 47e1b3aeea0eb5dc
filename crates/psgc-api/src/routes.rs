// crates/psgc-api/src/routes.rs
use crate::error::ApiError;
use crate::pagination::PageQuery;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use psgc_core::{
    Barangay, CatalogStats, CityMuni, CityMuniKind, LevelEntity, Masterlist, Paginated, Province,
    Region,
};

/// `/api/...` level routes.
pub fn api() -> Router<AppState> {
    Router::new()
        .merge(level::<Region>("/api/regions"))
        .merge(level::<Province>("/api/provinces"))
        .merge(level::<CityMuni>("/api/city-muni"))
        .merge(level::<Barangay>("/api/barangays"))
        .merge(level::<Masterlist>("/api/masterlist"))
        .route("/api/cities", get(list_cities))
        .route("/api/cities/", get(list_cities))
        .route("/api/cities/{code}", get(get_city))
        .route("/api/municipalities", get(list_municipalities))
        .route("/api/municipalities/", get(list_municipalities))
        .route("/api/municipalities/{code}", get(get_municipality))
}

/// Heartbeat and counters.
pub fn service() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/stats", get(stats))
}

fn level<E: LevelEntity>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(list::<E>))
        .route(&format!("{path}/"), get(list::<E>))
        .route(&format!("{path}/{{code}}"), get(get_by_code::<E>))
}

// -----------------------------------------------------------------------------
// HANDLERS
// -----------------------------------------------------------------------------

async fn list<E: LevelEntity>(
    State(state): State<AppState>,
    query: PageQuery,
) -> Result<Json<Paginated<E>>, ApiError> {
    let params = query.into_params();
    let store = state.catalog.level::<E>();
    blocking(move || store.list(&params)).await.map(Json)
}

async fn get_by_code<E: LevelEntity>(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<E>, ApiError> {
    let store = state.catalog.level::<E>();
    blocking(move || store.get_by_code(&code)).await.map(Json)
}

async fn list_cities(
    state: State<AppState>,
    query: PageQuery,
) -> Result<Json<Paginated<CityMuni>>, ApiError> {
    list_kind(state, query, CityMuniKind::City).await
}

async fn list_municipalities(
    state: State<AppState>,
    query: PageQuery,
) -> Result<Json<Paginated<CityMuni>>, ApiError> {
    list_kind(state, query, CityMuniKind::Mun).await
}

async fn get_city(state: State<AppState>, code: Path<String>) -> Result<Json<CityMuni>, ApiError> {
    get_kind(state, code, CityMuniKind::City).await
}

async fn get_municipality(
    state: State<AppState>,
    code: Path<String>,
) -> Result<Json<CityMuni>, ApiError> {
    get_kind(state, code, CityMuniKind::Mun).await
}

async fn list_kind(
    State(state): State<AppState>,
    query: PageQuery,
    kind: CityMuniKind,
) -> Result<Json<Paginated<CityMuni>>, ApiError> {
    let params = query.into_params();
    let store = state.catalog.city_muni();
    blocking(move || store.list_kind(kind, &params)).await.map(Json)
}

async fn get_kind(
    State(state): State<AppState>,
    Path(code): Path<String>,
    kind: CityMuniKind,
) -> Result<Json<CityMuni>, ApiError> {
    let store = state.catalog.city_muni();
    blocking(move || store.get_by_code_kind(kind, &code)).await.map(Json)
}

async fn ping() -> &'static str {
    "."
}

async fn stats(State(state): State<AppState>) -> Result<Json<CatalogStats>, ApiError> {
    let catalog = state.catalog.clone();
    blocking(move || catalog.stats()).await.map(Json)
}

/// Runs a catalog call on the blocking pool; SQLite access is synchronous.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> psgc_core::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("query task failed: {e}"),
        })?
        .map_err(ApiError::from)
}
