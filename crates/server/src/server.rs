use axum::{
    Router, middleware,
    routing::{get, post},
};

use std::{path::PathBuf, sync::Arc};

use crate::{auth, budgets, categories, expenses, incomes, reports, user};
use engine::Engine;

/// Runtime settings of the HTTP layer.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub jwt_secret: String,
    /// Lifetime of issued access tokens, in seconds.
    pub token_ttl_secs: u64,
    /// Accounts registered with one of these emails get the admin role.
    pub admin_emails: Vec<String>,
    /// When set, every PDF export is also written to this directory.
    pub export_dir: Option<PathBuf>,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub(crate) auth: Arc<auth::AuthKeys>,
    pub export_dir: Option<PathBuf>,
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/user", get(user::list))
        .route(
            "/user/{id}",
            get(user::get).patch(user::update).delete(user::remove),
        )
        .route("/budget", post(budgets::create).get(budgets::list))
        .route(
            "/budget/{id}",
            get(budgets::get)
                .patch(budgets::update)
                .delete(budgets::remove),
        )
        .route("/category", post(categories::create).get(categories::list))
        .route(
            "/category/{id}",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::remove),
        )
        .route("/income", post(incomes::create).get(incomes::list))
        .route(
            "/income/{id}",
            get(incomes::get)
                .patch(incomes::update)
                .delete(incomes::remove),
        )
        .route("/expense", post(expenses::create).get(expenses::list))
        .route(
            "/expense/{id}",
            get(expenses::get)
                .patch(expenses::update)
                .delete(expenses::remove),
        )
        .route("/reports", get(reports::period))
        .route("/reports/total", get(reports::total))
        .route(
            "/reports/expense_percentage",
            get(reports::expense_percentage),
        )
        .route("/reports/monthly-trends", get(reports::monthly_trends))
        .route(
            "/reports/category-breakdown",
            get(reports::category_breakdown),
        )
        .route("/reports/annual-budget", get(reports::annual_budget))
        .route("/reports/forecast-expenses", get(reports::forecast))
        .route("/reports/custom-report", post(reports::custom))
        .route("/reports/budget-alerts", get(reports::budget_alerts))
        .route("/reports/export-pdf", get(reports::export_pdf))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}

/// Build the application router around `engine`.
pub fn app(engine: Engine, options: ServerOptions) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        auth: Arc::new(auth::AuthKeys::new(
            &options.jwt_secret,
            options.token_ttl_secs,
            &options.admin_emails,
        )),
        export_dir: options.export_dir,
    };
    router(state)
}

pub async fn run(engine: Engine, options: ServerOptions, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, options, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    options: ServerOptions,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, options)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    options: ServerOptions,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, options, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
