//! Report API endpoints
//!
//! Every handler loads a fresh snapshot through the engine and returns the
//! computed report in the usual envelope. `export_pdf` is the only endpoint
//! answering with a binary body.

use api_types::{
    Envelope,
    report::{CustomRange, PeriodQuery},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{Datelike, Utc};
use engine::{DateRange, Report, ReportRequest, User};

use crate::{ServerError, pdf, server::ServerState};

type ReportResponse = Result<Json<Envelope<Report>>, ServerError>;

async fn respond(state: &ServerState, user: &User, request: ReportRequest) -> ReportResponse {
    let report = state.engine.report(&user.id, &request).await?;
    Ok(Json(Envelope::ok(
        format!("{} retrieved successfully", request.title()),
        report,
    )))
}

pub async fn total(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> ReportResponse {
    respond(&state, &user, ReportRequest::Totals).await
}

pub async fn expense_percentage(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> ReportResponse {
    respond(&state, &user, ReportRequest::ExpensePercentage).await
}

/// Handle `GET /reports?year=&month=`
pub async fn period(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> ReportResponse {
    let (Some(year), Some(month)) = (query.year, query.month) else {
        return Err(ServerError::Generic(
            "year and month are required".to_string(),
        ));
    };
    respond(&state, &user, ReportRequest::Period { year, month }).await
}

pub async fn monthly_trends(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> ReportResponse {
    respond(&state, &user, ReportRequest::MonthlyTrends).await
}

pub async fn category_breakdown(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> ReportResponse {
    respond(&state, &user, ReportRequest::CategoryBreakdown).await
}

/// Budget planning for the current calendar year
pub async fn annual_budget(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> ReportResponse {
    let year = Utc::now().year();
    respond(&state, &user, ReportRequest::AnnualBudget { year }).await
}

pub async fn forecast(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> ReportResponse {
    respond(&state, &user, ReportRequest::Forecast).await
}

pub async fn custom(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CustomRange>,
) -> ReportResponse {
    let range = DateRange::new(payload.start_date, payload.end_date);
    respond(&state, &user, ReportRequest::Custom(range)).await
}

pub async fn budget_alerts(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> ReportResponse {
    respond(&state, &user, ReportRequest::BudgetAlerts).await
}

/// Render the user's records as a PDF attachment
pub async fn export_pdf(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Response, ServerError> {
    let bundle = state.engine.export(&user.id).await?;
    let document = pdf::render(&bundle);

    if let Some(dir) = &state.export_dir {
        let path = dir.join(format!(
            "user_{}_report_{}.pdf",
            user.id,
            uuid::Uuid::new_v4()
        ));
        let written = match tokio::fs::create_dir_all(dir).await {
            Ok(()) => tokio::fs::write(&path, &document).await,
            Err(err) => Err(err),
        };
        match written {
            Ok(()) => tracing::info!("report saved to {}", path.display()),
            Err(err) => tracing::error!("failed to save report to {}: {err}", path.display()),
        }
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"report.pdf\"",
            ),
        ],
        document,
    )
        .into_response())
}
