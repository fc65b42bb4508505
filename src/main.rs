// src/main.rs
use std::{fs::File, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::http::StatusCode as AxumStatusCode;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

mod aggregate;
mod audit;
mod entries;
mod export;
mod model;
mod notify;
mod report;
mod store;

#[cfg(test)]
mod aggregate_tests;
#[cfg(test)]
mod entries_tests;

use aggregate::{rank_lowest_performers, summarize_window};
use audit::AuditPolicy;
use entries::{EntryService, SaveEntryRequest};
use export::{export_filename, project_for_export, write_csv};
use model::{Branch, Executive};
use notify::{MockNotifier, Notifier, SlackWebhookNotifier};
use report::format_branch_status_update;
use store::{MemoryStore, RecordStore, StoreError};

// --- Configuration ---

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    server_host: String,
    #[serde(default = "default_port")]
    server_port: u16,
    /// Slack incoming-webhook URL. When absent, notifications are captured
    /// locally instead of sent.
    slack_webhook_url: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Config>()
    }
}

// --- Error Handling ---

#[derive(Error, Debug)]
enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Error occurred: {}", self);

        // Details are logged above; clients get a generic message.
        let (status_code, error_message) = match &self {
            AppError::Store(StoreError::NotFound { kind, .. }) => {
                (AxumStatusCode::NOT_FOUND, format!("{} not found.", kind))
            }
            AppError::Store(_) => (
                AxumStatusCode::BAD_GATEWAY,
                "Failed to load or save data. Please try again.".to_string(),
            ),
            AppError::BadRequest(msg) => (AxumStatusCode::BAD_REQUEST, msg.clone()),
        };

        (status_code, error_message).into_response()
    }
}

// --- Application State ---

#[derive(Clone)]
struct AppState {
    store: Arc<dyn RecordStore>,
    entry_service: EntryService,
    notifier: Arc<dyn Notifier>,
}

// --- CLI ---

#[derive(Parser)]
#[command(name = "dailycollect", about = "Branch daily collection tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve,
    /// Print (and optionally post) the branch status report for a date
    Report {
        /// Report date, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Also post the report to the notification channel
        #[arg(long)]
        notify: bool,
    },
    /// Write the collection export for a date window to a CSV file
    Export {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Restrict to a single branch id
        #[arg(long)]
        branch: Option<String>,
        /// Output path, defaults to the derived window filename
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration from environment")?;

    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let notifier: Arc<dyn Notifier> = match &config.slack_webhook_url {
        Some(url) => {
            info!("Slack notifications enabled");
            Arc::new(SlackWebhookNotifier::new(url).context("Invalid SLACK_WEBHOOK_URL")?)
        }
        None => {
            warn!("SLACK_WEBHOOK_URL not set; notifications will be captured locally");
            Arc::new(MockNotifier::new())
        }
    };

    let state = AppState {
        store: store.clone(),
        entry_service: EntryService::new(store.clone()),
        notifier: notifier.clone(),
    };

    match cli.command {
        Command::Serve => serve(state, &config).await,
        Command::Report { date, notify } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let report = build_status_report(&state, date).await?;
            println!("{}", report);
            if notify {
                if notifier.send_message(&report).await.is_err() {
                    anyhow::bail!("Failed to post report; check notification configuration");
                }
                info!("Report for {} posted to channel", date);
            }
            Ok(())
        }
        Command::Export {
            start,
            end,
            branch,
            out,
        } => {
            if start > end {
                anyhow::bail!("--start must not be after --end");
            }
            let (rows, filename) = build_export(&state, start, end, branch.as_deref()).await?;
            let path = out.unwrap_or_else(|| PathBuf::from(&filename));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(&rows, file).context("Failed to write CSV")?;
            info!("Wrote {} rows to {}", rows.len(), path.display());
            Ok(())
        }
    }
}

async fn serve(state: AppState, config: &Config) -> Result<()> {
    let api_routes = Router::new()
        .route("/branches", get(list_branches).post(put_branch))
        .route("/branches/{id}", get(get_branch).delete(delete_branch))
        .route("/executives", get(list_executives).post(put_executive))
        .route("/executives/{id}", get(get_executive).delete(delete_executive))
        .route("/entries", post(save_entry))
        .route("/admin/entries", post(admin_save_entry))
        .route("/reports/summary", get(get_summary_report))
        .route("/reports/window", get(get_window_summary))
        .route("/reports/notify", post(notify_summary_report))
        .route("/reports/lowest", get(get_lowest_performers))
        .route("/export", get(get_export));

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

// --- Shared Handler Logic ---

async fn build_status_report(state: &AppState, date: NaiveDate) -> Result<String, StoreError> {
    let branches = state.store.list_branches().await?;
    let entries = state.store.entries_for_date(date).await?;
    Ok(format_branch_status_update(date, &branches, &entries))
}

async fn build_export(
    state: &AppState,
    start: NaiveDate,
    end: NaiveDate,
    branch_id: Option<&str>,
) -> Result<(Vec<export::ExportRow>, String), StoreError> {
    let mut entries = state.store.entries_in_range(start, end, branch_id).await?;

    // Lookup tables built once per export; orphaned ids fall back to the
    // raw id inside the projection.
    let branch_names: std::collections::HashMap<String, String> = state
        .store
        .list_branches()
        .await?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect();
    let executive_names: std::collections::HashMap<String, String> = state
        .store
        .list_executives(None)
        .await?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect();

    // Rows are grouped by branch name ascending before projection.
    entries.sort_by(|a, b| {
        let an = branch_names.get(&a.branch_id).unwrap_or(&a.branch_id);
        let bn = branch_names.get(&b.branch_id).unwrap_or(&b.branch_id);
        an.cmp(bn)
    });

    let rows = project_for_export(&entries, &branch_names, &executive_names);
    Ok((rows, export_filename(start, end)))
}

// --- Branch / Executive Handlers ---

async fn list_branches(State(state): State<AppState>) -> Result<Json<Vec<Branch>>, AppError> {
    Ok(Json(state.store.list_branches().await?))
}

async fn put_branch(
    State(state): State<AppState>,
    Json(branch): Json<Branch>,
) -> Result<AxumStatusCode, AppError> {
    state.store.put_branch(branch).await?;
    Ok(AxumStatusCode::NO_CONTENT)
}

async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Branch>, AppError> {
    let branch = state
        .store
        .get_branch(&id)
        .await?
        .ok_or(StoreError::NotFound {
            kind: "Branch",
            id,
        })?;
    Ok(Json(branch))
}

async fn delete_branch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<AxumStatusCode, AppError> {
    // Deliberately no cascade: executives and entries keep their branch id.
    state.store.delete_branch(&id).await?;
    Ok(AxumStatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct ExecutiveFilter {
    branch: Option<String>,
}

async fn list_executives(
    State(state): State<AppState>,
    Query(filter): Query<ExecutiveFilter>,
) -> Result<Json<Vec<Executive>>, AppError> {
    Ok(Json(
        state.store.list_executives(filter.branch.as_deref()).await?,
    ))
}

async fn put_executive(
    State(state): State<AppState>,
    Json(executive): Json<Executive>,
) -> Result<AxumStatusCode, AppError> {
    state.store.put_executive(executive).await?;
    Ok(AxumStatusCode::NO_CONTENT)
}

async fn get_executive(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Executive>, AppError> {
    let executive = state
        .store
        .get_executive(&id)
        .await?
        .ok_or(StoreError::NotFound {
            kind: "Executive",
            id,
        })?;
    Ok(Json(executive))
}

async fn delete_executive(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<AxumStatusCode, AppError> {
    state.store.delete_executive(&id).await?;
    Ok(AxumStatusCode::NO_CONTENT)
}

// --- Entry Handlers ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveEntryResponse {
    entry: model::DailyEntry,
    created: bool,
    notified: bool,
}

async fn save_entry(
    State(state): State<AppState>,
    Json(req): Json<SaveEntryRequest>,
) -> Result<Json<SaveEntryResponse>, AppError> {
    save_with_policy(state, req, AuditPolicy::CreationAware).await
}

async fn admin_save_entry(
    State(state): State<AppState>,
    Json(req): Json<SaveEntryRequest>,
) -> Result<Json<SaveEntryResponse>, AppError> {
    save_with_policy(state, req, AuditPolicy::FullCorrection).await
}

async fn save_with_policy(
    state: AppState,
    req: SaveEntryRequest,
    policy: AuditPolicy,
) -> Result<Json<SaveEntryResponse>, AppError> {
    if req.target < 0 || req.achieved < 0 || req.cash < 0 {
        return Err(AppError::BadRequest(
            "Target, ACH and Cash must be non-negative.".to_string(),
        ));
    }

    let outcome = state.entry_service.save_entry(req, policy).await?;

    let branch_name = state
        .store
        .get_branch(&outcome.entry.branch_id)
        .await?
        .map(|b| b.name)
        .unwrap_or_else(|| outcome.entry.branch_id.clone());
    let executive_name = state
        .store
        .get_executive(&outcome.entry.executive_id)
        .await?
        .map(|e| e.name)
        .unwrap_or_else(|| outcome.entry.executive_id.clone());

    let message = report::format_entry_notification(
        &branch_name,
        &executive_name,
        &outcome.entry,
        outcome.created,
    );
    // Send failure never fails the save; it surfaces as notified=false.
    let notified = match state.notifier.send_message(&message).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Entry notification failed: {}", e);
            false
        }
    };

    Ok(Json(SaveEntryResponse {
        entry: outcome.entry,
        created: outcome.created,
        notified,
    }))
}

// --- Report Handlers ---

#[derive(Deserialize)]
struct ReportParams {
    date: Option<NaiveDate>,
}

async fn get_summary_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<String, AppError> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    Ok(build_status_report(&state, date).await?)
}

#[derive(Serialize)]
struct NotifyResponse {
    sent: bool,
    message: String,
}

async fn notify_summary_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<NotifyResponse>, AppError> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    let report = build_status_report(&state, date).await?;

    match state.notifier.send_message(&report).await {
        Ok(()) => Ok(Json(NotifyResponse {
            sent: true,
            message: format!("Report for {} posted to channel.", date),
        })),
        Err(e) => {
            warn!("Report notification failed: {}", e);
            Ok(Json(NotifyResponse {
                sent: false,
                message: "Could not post report; check notification configuration.".to_string(),
            }))
        }
    }
}

#[derive(Deserialize)]
struct RangeParams {
    start: NaiveDate,
    end: NaiveDate,
    branch: Option<String>,
}

/// Aggregated totals over an inclusive date window, optionally narrowed
/// to one branch. Backs the dashboard figures.
async fn get_window_summary(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<aggregate::Summary>, AppError> {
    if params.start > params.end {
        return Err(AppError::BadRequest(
            "start must not be after end.".to_string(),
        ));
    }
    let entries = state
        .store
        .entries_in_range(params.start, params.end, params.branch.as_deref())
        .await?;
    Ok(Json(summarize_window(&entries)))
}

#[derive(Deserialize)]
struct WindowParams {
    start: NaiveDate,
    end: NaiveDate,
    branch: Option<String>,
    /// How many lowest performers to return.
    #[serde(default = "default_rank_count")]
    n: usize,
}

fn default_rank_count() -> usize {
    10
}

async fn get_lowest_performers(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<aggregate::RankedExecutive>>, AppError> {
    if params.start > params.end {
        return Err(AppError::BadRequest(
            "start must not be after end.".to_string(),
        ));
    }
    let entries = state
        .store
        .entries_in_range(params.start, params.end, params.branch.as_deref())
        .await?;
    Ok(Json(rank_lowest_performers(&entries, params.n)))
}

// --- Export Handler ---

async fn get_export(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Response, AppError> {
    if params.start > params.end {
        return Err(AppError::BadRequest(
            "start must not be after end.".to_string(),
        ));
    }
    let (rows, filename) =
        build_export(&state, params.start, params.end, params.branch.as_deref()).await?;

    let mut buf = Vec::new();
    write_csv(&rows, &mut buf)
        .map_err(|e| AppError::Store(StoreError::Backend(format!("CSV write failed: {}", e))))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        buf,
    )
        .into_response())
}
