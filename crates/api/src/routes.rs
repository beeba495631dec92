use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use deal_sim::{pnl, pnl_ratio, progress, sample_path, simulate_price, Deal, OutcomeBias, Side};
use serde::{Deserialize, Serialize};

use crate::{state::AppState, ws};

const DEFAULT_PATH_POINTS: usize = 80;
const MAX_PATH_POINTS: usize = 500;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/styles.css", get(styles))
        .route("/static/app.js", get(app_js))
        .route("/deals", post(open_deal).get(list_deals))
        .route("/deals/:id", get(deal_detail))
        .route("/deals/:id/path", get(deal_path))
        .route("/session/luck", get(session_luck).put(put_session_luck))
        .route("/ws/ticks", get(ws::ticks_socket))
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn reject(status: StatusCode, message: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct OpenDealRequest {
    instrument: String,
    side: String,
    stake: f64,
    leverage: u32,
    entry_price: f64,
    duration_seconds: u32,
}

#[derive(Debug, Serialize)]
struct DealView {
    id: String,
    instrument: String,
    side: &'static str,
    stake: f64,
    leverage: u32,
    entry_price: f64,
    start_time_ms: u64,
    duration_seconds: u32,
    expiry_ms: u64,
    price: f64,
    pnl: f64,
    pnl_ratio: f64,
    progress: f64,
}

impl DealView {
    fn evaluate(deal: &Deal, now_ms: u64, bias: OutcomeBias) -> Self {
        let price = simulate_price(deal, now_ms, bias);
        Self {
            id: deal.id.clone(),
            instrument: deal.instrument.clone(),
            side: deal.side.as_str(),
            stake: deal.stake,
            leverage: deal.leverage,
            entry_price: deal.entry_price,
            start_time_ms: deal.start_time_ms,
            duration_seconds: deal.duration_seconds,
            expiry_ms: deal.expiry_ms(),
            price,
            pnl: pnl(deal, price),
            pnl_ratio: pnl_ratio(deal.side, deal.entry_price, price),
            progress: progress(deal, now_ms),
        }
    }
}

#[derive(Debug, Serialize)]
struct DealsResponse {
    deals: Vec<DealView>,
}

async fn open_deal(
    State(state): State<AppState>,
    Json(request): Json<OpenDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let side = Side::parse(&request.side)
        .ok_or_else(|| reject(StatusCode::UNPROCESSABLE_ENTITY, "side must be long or short"))?;

    let ticket = settlement::OrderTicket {
        instrument: request.instrument,
        side,
        stake: request.stake,
        leverage: request.leverage,
        entry_price: request.entry_price,
        duration_seconds: request.duration_seconds,
    };
    let bucket = ticket
        .validate(state.order_limits())
        .map_err(|err| reject(StatusCode::UNPROCESSABLE_ENTITY, err))?;

    let now_ms = unix_now_ms();
    let deal = Deal::new(
        state.next_deal_id(now_ms),
        ticket.instrument,
        ticket.side,
        ticket.stake,
        ticket.leverage,
        ticket.entry_price,
        now_ms,
        bucket.as_secs(),
    )
    .map_err(|err| reject(StatusCode::UNPROCESSABLE_ENTITY, err))?;

    let view = {
        let engine = state.engine();
        let mut engine = engine.lock().await;
        let bias = engine.bias();
        let view = DealView::evaluate(&deal, now_ms, bias);
        engine
            .open_deal(deal.clone())
            .map_err(|err| reject(StatusCode::CONFLICT, err))?;
        view
    };

    let _ = state.publish_tick(crate::state::TickEvent::deal_opened(
        deal.id.clone(),
        deal.instrument.clone(),
        deal.side.as_str(),
        deal.entry_price,
    ));

    let location = format!("/deals/{}", deal.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(view),
    ))
}

async fn list_deals(State(state): State<AppState>) -> Json<DealsResponse> {
    let now_ms = unix_now_ms();
    let engine = state.engine();
    let engine = engine.lock().await;
    let bias = engine.bias();

    let deals = engine
        .book()
        .snapshot()
        .iter()
        .map(|deal| DealView::evaluate(deal, now_ms, bias))
        .collect();

    Json(DealsResponse { deals })
}

async fn deal_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DealView>, ApiError> {
    let now_ms = unix_now_ms();
    let engine = state.engine();
    let engine = engine.lock().await;
    let bias = engine.bias();

    let deal = engine
        .find_deal(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "no deal with this id"))?;

    Ok(Json(DealView::evaluate(deal, now_ms, bias)))
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    points: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PathPointView {
    offset_ms: u64,
    price: f64,
}

#[derive(Debug, Serialize)]
struct PathResponse {
    deal_id: String,
    points: Vec<PathPointView>,
}

async fn deal_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PathQuery>,
) -> Result<Json<PathResponse>, ApiError> {
    let points = query
        .points
        .unwrap_or(DEFAULT_PATH_POINTS)
        .clamp(1, MAX_PATH_POINTS);

    let now_ms = unix_now_ms();
    let engine = state.engine();
    let engine = engine.lock().await;
    let bias = engine.bias();

    let deal = engine
        .find_deal(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "no deal with this id"))?;

    let points = sample_path(deal, now_ms, bias, points)
        .into_iter()
        .map(|point| PathPointView {
            offset_ms: point.offset_ms,
            price: point.price,
        })
        .collect();

    Ok(Json(PathResponse {
        deal_id: id,
        points,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
struct LuckBody {
    luck: String,
}

async fn session_luck(State(state): State<AppState>) -> Json<LuckBody> {
    let engine = state.engine();
    let bias = engine.lock().await.bias();
    Json(LuckBody {
        luck: bias.as_str().to_string(),
    })
}

async fn put_session_luck(
    State(state): State<AppState>,
    Json(body): Json<LuckBody>,
) -> Result<Json<LuckBody>, ApiError> {
    let bias = OutcomeBias::parse(&body.luck).ok_or_else(|| {
        reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            "luck must be one of: win, lose, default",
        )
    })?;

    let engine = state.engine();
    engine.lock().await.set_bias(bias);

    Ok(Json(LuckBody {
        luck: bias.as_str().to_string(),
    }))
}

async fn index() -> Html<&'static str> {
    Html(ui::index_html())
}

async fn styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], ui::styles_css())
}

async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        ui::app_js(),
    )
}
