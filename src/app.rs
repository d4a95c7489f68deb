use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    let context_path = state.config.context_path.clone();
    let routes = Router::new()
        .route("/report", get(handlers::report_index))
        .route("/report/daybreak", get(handlers::daybreak_page))
        .route("/api/daybreak/summary", get(handlers::get_summary))
        .route("/api/daybreak/range", post(handlers::set_range))
        .route("/api/daybreak/refresh", post(handlers::refresh))
        .route("/api/daybreak/chart-view", post(handlers::set_chart_view))
        .route("/api/daybreak/reports/:report_date_time", get(handlers::get_report_detail))
        .with_state(state);

    if context_path.is_empty() {
        routes
    } else {
        Router::new().nest(&context_path, routes)
    }
}
