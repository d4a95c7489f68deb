use crate::errors::AppError;
use crate::models::{ChartViewRequest, DashboardView, PageQuery, RangeRequest};
use crate::state::AppState;
use crate::ui::render_daybreak_page;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Json,
};
use chrono::NaiveDateTime;

pub async fn report_index(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.config.route("/report/daybreak"))
}

/// Every page load starts a new page on today's default range.
pub async fn daybreak_page(State(state): State<AppState>) -> Html<String> {
    let controller = state.pages.open().await;
    let view = controller.view().await;
    Html(render_daybreak_page(&view, &state.config.context_path))
}

pub async fn get_summary(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Json<DashboardView> {
    let controller = state.pages.resume(query.page).await;
    Json(controller.view().await)
}

pub async fn set_range(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Json(payload): Json<RangeRequest>,
) -> Result<Json<DashboardView>, AppError> {
    let controller = state.pages.resume(query.page).await;
    controller.set_range(&payload).await?;
    Ok(Json(controller.view().await))
}

pub async fn refresh(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Json<DashboardView> {
    let controller = state.pages.resume(query.page).await;
    controller.refresh().await;
    Json(controller.view().await)
}

pub async fn set_chart_view(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Json(payload): Json<ChartViewRequest>,
) -> Json<DashboardView> {
    let controller = state.pages.resume(query.page).await;
    controller.set_chart_view(&payload.mode).await;
    Json(controller.view().await)
}

pub async fn get_report_detail(
    State(state): State<AppState>,
    Path(report_date_time): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let report_date_time = report_date_time
        .parse::<NaiveDateTime>()
        .map_err(|_| AppError::bad_request("report date time must look like 2015-01-12T10:30:00"))?;

    let detail = state.pages.detail(report_date_time).await?;
    Ok(Json(detail))
}
