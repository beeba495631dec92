pub mod routes;
pub mod state;
mod ws;

use axum::Router;
use deal_sim::OutcomeBias;

pub fn module_ready() -> bool {
    true
}

pub fn app(state: state::AppState) -> Router {
    routes::router(state)
}

/// Convenience constructor for an app with an unbiased session.
pub fn app_with_default_bias() -> Router {
    app(state::AppState::new(OutcomeBias::Default))
}
