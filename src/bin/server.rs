use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use rebar_cut_planner::inventory::{DEFAULT_MIN_LEFTOVER, restock};
use rebar_cut_planner::metrics::PlanMetrics;
use rebar_cut_planner::packer::SequentialIds;
use rebar_cut_planner::strategy::{Project, StrategyComparison, compare_strategies};
use rebar_cut_planner::types::{CuttingPlan, DemandPiece, Length, PlanConfig, RemnantStock};
use rebar_cut_planner::{PlanError, compute_cutting_plan};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    demand: Vec<DemandPiece>,
    #[serde(default)]
    remnants: Vec<RemnantStock>,
    #[serde(default)]
    config: PlanConfig,
}

#[derive(Serialize)]
struct OptimizeResponse {
    plan: CuttingPlan,
    metrics: PlanMetrics,
}

#[derive(Deserialize, Serialize)]
struct CompareRequest {
    projects: Vec<Project>,
    #[serde(default)]
    remnants: Vec<RemnantStock>,
    #[serde(default)]
    config: PlanConfig,
}

#[derive(Deserialize, Serialize)]
struct RestockRequest {
    demand: Vec<DemandPiece>,
    #[serde(default)]
    remnants: Vec<RemnantStock>,
    #[serde(default)]
    config: PlanConfig,
    #[serde(default = "default_min_leftover")]
    min_leftover: Length,
}

fn default_min_leftover() -> Length {
    DEFAULT_MIN_LEFTOVER
}

#[derive(Serialize)]
struct RestockResponse {
    plan: CuttingPlan,
    inventory: Vec<RemnantStock>,
}

fn reject(e: PlanError) -> (StatusCode, String) {
    tracing::warn!(error = %e, "plan rejected");
    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let plan = compute_cutting_plan(&req.demand, &req.remnants, &req.config).map_err(reject)?;
    let metrics = PlanMetrics::from_plan(&plan);

    Ok(Json(OptimizeResponse { plan, metrics }))
}

async fn compare(
    Json(req): Json<CompareRequest>,
) -> Result<Json<StrategyComparison>, (StatusCode, String)> {
    tracing::info!(projects = req.projects.len(), "POST /compare");

    if req.projects.len() < 2 {
        return Err((
            StatusCode::BAD_REQUEST,
            "at least two projects are needed for a comparison".to_string(),
        ));
    }

    compare_strategies(&req.projects, &req.remnants, &req.config)
        .map(Json)
        .map_err(reject)
}

async fn restock_inventory(
    Json(req): Json<RestockRequest>,
) -> Result<Json<RestockResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /restock"
    );

    let plan = compute_cutting_plan(&req.demand, &req.remnants, &req.config).map_err(reject)?;
    let mut ids = SequentialIds::new("leftover");
    let inventory = restock(&req.remnants, &plan, req.min_leftover, &mut ids);

    Ok(Json(RestockResponse { plan, inventory }))
}

fn main() {
    let _sentry = sentry::init((
        std::env::var("SENTRY_DSN").ok(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(serve());
}

async fn serve() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .route("/compare", post(compare))
        .route("/restock", post(restock_inventory))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
