#![cfg(feature = "web")]

use axum::{
    Extension, Json, Router,
    extract::{
        FromRequest, FromRequestParts, Request, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Duration;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::cache::{SystemClock, TtlCache};
use crate::cars::{self, Car, CarInput, CarPage, CarQuery};
use crate::config::Config;
use crate::dashboard::{FilterOptions, SalesDashboard, Selection};
use crate::downloader::{self, ChartKind};
use crate::error::{Error, Result};
use crate::favorites;
use crate::graph::{self, GraphOptions};
use crate::login::{self, UserCredentials};
use crate::sale::{SaleRecord, SalesSeries};
use crate::sales::{self, SalesQuery, SalesQueryParams};
use crate::store::Database;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shared state of the web service
pub struct AppState {
    pub db: Database,
    /// Sales loaded once at startup; every dashboard request reads this snapshot
    pub sales: Arc<[SaleRecord]>,
    pub car_cache: TtlCache<CarPage>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Database, car_cache: TtlCache<CarPage>) -> Result<Self> {
        let sales: Arc<[SaleRecord]> = sales::load_sales(&db)?.into();
        info!("loaded {} sales from {}", sales.len(), db.root().display());
        Ok(Self {
            db,
            sales,
            car_cache,
        })
    }

    /// Open the store named by the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let db = Database::open(&config.data_dir)?;
        let cache = TtlCache::new(
            Arc::new(SystemClock),
            Duration::seconds(config.cache_ttl_secs),
        );
        Self::new(db, cache)
    }
}

/// Name of the user a request was authenticated as
#[derive(Clone, Debug)]
pub struct AuthUser(pub String);

/// JSON request body; malformed payloads answer with the JSON error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
struct JsonBody<T>(T);

/// Path parameters; unparsable segments answer with the JSON error shape
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
struct PathParam<T>(T);

/// Query string; unparsable values answer with the JSON error shape
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
struct QueryParams<T>(T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

/// Run Argon2 and other slow synchronous work off the async workers
async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoSalesData | Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidSelection { .. } | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::PasswordHash
            | Error::Export(_)
            | Error::Chart(_)
            | Error::Io(_)
            | Error::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }
        let challenge = matches!(self, Error::Unauthorized(_));

        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if challenge {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"car-inventory\""),
            );
        }
        response
    }
}

/// Build the router over the given state
pub fn router(state: SharedState) -> Router {
    let authenticated = Router::new()
        .route("/login", post(handle_login))
        .route("/favorites", get(get_favorites).post(add_favorite))
        .route("/favorites/:id", delete(remove_favorite))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/register", post(handle_register))
        .route("/cars", get(list_cars).post(create_car))
        .route(
            "/cars/:id",
            get(get_car).put(update_car).delete(delete_car),
        )
        .route("/sales", get(list_sales))
        .route("/api/sales/overview", get(sales_overview))
        .route("/api/sales/export/:chart", get(export_chart))
        .route("/api/sales/chart/:chart", get(chart_image))
        .merge(authenticated)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_requests))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run(config: Config) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    let listener = TcpListener::bind(&config.addr).await?;
    info!("listening on http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    info!(
        "{} {} -> {} in {:?}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

/// Basic-auth gate for the login and favorites routes
async fn require_auth(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let username = blocking(move || login::authenticate(&state.db, header.as_deref())).await?;

    request.extensions_mut().insert(AuthUser(username));
    Ok(next.run(request).await)
}

async fn handle_register(
    State(state): State<SharedState>,
    JsonBody(credentials): JsonBody<UserCredentials>,
) -> Result<impl IntoResponse> {
    blocking(move || {
        login::register_user(&state.db, &credentials.username, &credentials.password)
    })
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

async fn handle_login(Extension(AuthUser(username)): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({ "message": "Login successful", "username": username }))
}

async fn list_cars(
    State(state): State<SharedState>,
    QueryParams(query): QueryParams<CarQuery>,
) -> Result<Json<CarPage>> {
    let key = query.cache_key();
    if let Some(page) = state.car_cache.get(&key) {
        return Ok(Json(page));
    }

    // a write landing after this point makes the page below stale
    let generation = state.car_cache.generation();
    let page = cars::list_cars(&state.db, &query)?;
    state.car_cache.insert_if_current(generation, key, page.clone());
    Ok(Json(page))
}

async fn create_car(
    State(state): State<SharedState>,
    JsonBody(input): JsonBody<CarInput>,
) -> Result<impl IntoResponse> {
    let car = cars::create_car(&state.db, &input)?;
    state.car_cache.invalidate_all();
    Ok((StatusCode::CREATED, Json(car)))
}

async fn get_car(State(state): State<SharedState>, PathParam(id): PathParam<u32>) -> Result<Json<Car>> {
    Ok(Json(cars::get_car(&state.db, id)?))
}

async fn update_car(
    State(state): State<SharedState>,
    PathParam(id): PathParam<u32>,
    JsonBody(input): JsonBody<CarInput>,
) -> Result<Json<Car>> {
    let car = cars::update_car(&state.db, id, &input)?;
    state.car_cache.invalidate_all();
    Ok(Json(car))
}

async fn delete_car(State(state): State<SharedState>, PathParam(id): PathParam<u32>) -> Result<Json<Car>> {
    let car = cars::delete_car(&state.db, id)?;
    state.car_cache.invalidate_all();
    Ok(Json(car))
}

async fn list_sales(
    State(state): State<SharedState>,
    QueryParams(params): QueryParams<SalesQueryParams>,
) -> Result<Json<Vec<SaleRecord>>> {
    let query = SalesQuery::from_params(&params)?;
    Ok(Json(sales::query_sales(&state.sales, &query)))
}

/// Dashboard selectors as they arrive in the query string
#[derive(Debug, Default, Deserialize)]
struct OverviewParams {
    year: Option<String>,
    continent: Option<String>,
    make: Option<String>,
    top: Option<String>,
    format: Option<String>,
}

impl OverviewParams {
    fn selection(&self) -> Result<Selection> {
        Selection::from_query(
            self.year.as_deref(),
            self.continent.as_deref(),
            self.make.as_deref(),
            self.top.as_deref(),
        )
    }

    fn dashboard(&self, state: &AppState) -> Result<SalesDashboard> {
        SalesDashboard::with_selection(state.sales.clone(), self.selection()?)
    }
}

#[derive(Serialize)]
struct OverviewResponse<'a> {
    series: &'a SalesSeries,
    options: &'a FilterOptions,
    selection: SelectionView,
    no_matching_data: bool,
}

/// The applied selection echoed back, every selector in its string form
#[derive(Serialize)]
struct SelectionView {
    year: String,
    continent: String,
    make: String,
    top: usize,
}

impl From<&Selection> for SelectionView {
    fn from(selection: &Selection) -> Self {
        Self {
            year: selection.year.to_string(),
            continent: selection.continent.to_string(),
            make: selection.make.to_string(),
            top: selection.top_models.get(),
        }
    }
}

async fn sales_overview(
    State(state): State<SharedState>,
    QueryParams(params): QueryParams<OverviewParams>,
) -> Result<Response> {
    let dashboard = params.dashboard(&state)?;
    Ok(Json(OverviewResponse {
        series: dashboard.series(),
        options: dashboard.options(),
        selection: dashboard.selection().into(),
        no_matching_data: dashboard.no_matching_data(),
    })
    .into_response())
}

async fn export_chart(
    State(state): State<SharedState>,
    PathParam(chart): PathParam<String>,
    QueryParams(params): QueryParams<OverviewParams>,
) -> Result<Response> {
    let kind: ChartKind = chart.parse()?;
    let dashboard = params.dashboard(&state)?;

    match params.format.as_deref().unwrap_or("csv") {
        "csv" => Ok(attachment(
            "text/csv; charset=utf-8",
            kind.file_name().to_string(),
            downloader::to_csv(dashboard.series(), kind).into_bytes(),
        )),
        "xlsx" => Ok(attachment(
            XLSX_CONTENT_TYPE,
            kind.file_name().replace(".csv", ".xlsx"),
            downloader::to_xlsx(dashboard.series(), kind)?,
        )),
        other => Err(Error::InvalidSelection {
            field: "format",
            value: other.to_string(),
        }),
    }
}

async fn chart_image(
    State(state): State<SharedState>,
    PathParam(chart): PathParam<String>,
    QueryParams(params): QueryParams<OverviewParams>,
) -> Result<Response> {
    let kind: ChartKind = chart.parse()?;
    let dashboard = params.dashboard(&state)?;
    let png = graph::create_graph(dashboard.series(), kind, &GraphOptions::for_chart(kind))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

fn attachment(content_type: &str, file_name: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

async fn get_favorites(
    State(state): State<SharedState>,
    Extension(AuthUser(username)): Extension<AuthUser>,
) -> Result<Json<Vec<Car>>> {
    Ok(Json(favorites::list_favorites(&state.db, &username)?))
}

async fn add_favorite(
    State(state): State<SharedState>,
    Extension(AuthUser(username)): Extension<AuthUser>,
    JsonBody(car): JsonBody<Car>,
) -> Result<impl IntoResponse> {
    favorites::add_favorite(&state.db, &username, car)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Car added to favorites" })),
    ))
}

async fn remove_favorite(
    State(state): State<SharedState>,
    Extension(AuthUser(username)): Extension<AuthUser>,
    PathParam(id): PathParam<u32>,
) -> Result<impl IntoResponse> {
    favorites::remove_favorite(&state.db, &username, id)?;
    Ok(Json(json!({ "message": "Car removed from favorites" })))
}
