use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::figment::Provider;
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Build, Rocket, State};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::dialogue::DialoguePipeline;
use crate::render::{self, Regions, RenderOptions};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub pipeline: Arc<DialoguePipeline>,
    pub regions: Arc<RwLock<Regions>>,
    pub render: RenderOptions,
    /// Held while a regeneration runs; extra triggers are turned away.
    in_flight: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: Arc<DialoguePipeline>, regions: Regions, render: RenderOptions) -> Self {
        Self {
            started_at: Utc::now(),
            pipeline,
            regions: Arc::new(RwLock::new(regions)),
            render,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Run the pipeline with a forced fetch and publish the result.
    /// Returns `None` when another regeneration is already running.
    pub async fn regenerate(&self) -> Option<Regions> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("dialogue regeneration already in flight, ignoring trigger");
            return None;
        };

        let run = self.pipeline.generate_dialogue(None).await;
        let mut regions = self.regions.write().await;
        regions.apply_run(&run, self.render);
        Some(regions.clone())
    }
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    generator: String,
    updated_at: Option<DateTime<Utc>>,
}

#[get("/")]
async fn index(state: &State<AppState>) -> RawHtml<String> {
    let regions = state.regions.read().await;
    RawHtml(render::page(&regions, Utc::now()))
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let updated_at = state.regions.read().await.updated_at;
    Json(StatusResponse {
        status: "ok",
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        generator: state.pipeline.provider_name().to_string(),
        updated_at,
    })
}

#[get("/api/v1/regions")]
async fn regions(state: &State<AppState>) -> Json<Regions> {
    Json(state.regions.read().await.clone())
}

/// Page button: regenerate, then show the page again.
#[post("/dialogue")]
async fn dialogue_button(state: &State<AppState>) -> Result<Redirect, Status> {
    match state.regenerate().await {
        Some(_) => Ok(Redirect::to("/")),
        None => Err(Status::Conflict),
    }
}

#[post("/api/v1/dialogue")]
async fn dialogue_api(state: &State<AppState>) -> Result<Json<Regions>, Status> {
    state.regenerate().await.map(Json).ok_or(Status::Conflict)
}

/// Assemble the application on top of any figment provider.
pub fn build_rocket<P: Provider>(state: AppState, provider: P) -> Rocket<Build> {
    rocket::custom(provider).manage(state).mount(
        "/",
        routes![index, health, status, regions, dialogue_button, dialogue_api],
    )
}

/// Launch the HTTP server, binding to `bind`/`port` when given.
///
/// This function blocks until the Rocket server shuts down.
pub async fn launch_rocket(state: AppState, bind: Option<String>, port: Option<u16>) -> Result<()> {
    let mut fig = rocket::Config::figment();
    if let Some(bind) = bind {
        fig = fig.merge(("address", bind));
    }
    if let Some(port) = port {
        fig = fig.merge(("port", port));
    }

    info!("Starting Rocket HTTP server");
    build_rocket(state, fig)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    info!("Rocket HTTP server has shut down");
    Ok(())
}
