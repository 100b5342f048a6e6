/*
newsdialogue - main.rs
Fetches the latest headline, stages the dialogue about it, and either serves the
page over HTTP or writes it once to a file.
*/

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsdialogue::dialogue::{DialoguePipeline, PipelineOptions};
use newsdialogue::ingestion::NewsFetcher;
use newsdialogue::llm::remote::RemoteLlmProvider;
use newsdialogue::llm::scripted::ScriptedProvider;
use newsdialogue::llm::LlmProvider;
use newsdialogue::render::{self, Regions, RenderOptions};
use newsdialogue::server::{launch_rocket, AppState};

#[derive(Parser, Debug)]
#[command(name = "newsdialogue", about = "Sagredo, Salvati and Simplicio read today's tech news")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render the page once to a file and exit instead of serving it
    #[arg(long)]
    render: bool,

    /// Output file for --render (overrides output.page_path)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = match Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    let provider = create_llm_provider(&config)?;
    info!(adapter = config.llm_adapter(), "generator initialized");

    let fetcher = NewsFetcher::from_config(&config.feed)?;
    info!(feed = config.feed.rss_url(), mode = ?config.feed.mode, "news fetcher ready");

    let pipeline = Arc::new(
        DialoguePipeline::new(fetcher, provider).with_options(PipelineOptions {
            clean_news: config.dialogue.clean_news,
        }),
    );
    let render_opts = RenderOptions {
        decorate_icons: config.dialogue.decorate_icons,
    };

    // Initial load: one fetch, and a dialogue if it worked
    let load = pipeline.page_load().await;
    let mut regions = Regions::default();
    regions.apply_page_load(&load, render_opts);

    if args.render {
        let output = args
            .output
            .unwrap_or_else(|| PathBuf::from(config.output.page_path()));
        render::write_page(&regions, &output, Utc::now()).await?;
        info!(path = %output.display(), "page written");
        return Ok(());
    }

    let (bind, port) = config
        .server
        .as_ref()
        .map(|s| (s.bind.clone(), s.port))
        .unwrap_or((None, None));

    let state = AppState::new(pipeline, regions, render_opts);
    if let Err(e) = launch_rocket(state, bind, port).await {
        error!(%e, "Rocket server failed");
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Create the generation backend selected by `llm.adapter`
fn create_llm_provider(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    let adapter = config.llm_adapter();
    match adapter {
        "remote" => {
            let remote_config = config
                .llm
                .as_ref()
                .and_then(|l| l.remote.as_ref())
                .ok_or_else(|| anyhow::anyhow!("Remote adapter selected but [llm.remote] is missing"))?;

            let api_key_env = remote_config
                .api_key_env
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Missing api_key_env in remote config"))?;

            let api_key = std::env::var(api_key_env)
                .with_context(|| format!("LLM API key env var '{}' not set", api_key_env))?;

            let model = remote_config.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string());
            let api_url = remote_config
                .api_url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434/v1/chat/completions".to_string());

            let provider = RemoteLlmProvider::new(api_url, api_key, model).with_defaults(
                remote_config.timeout_seconds,
                remote_config.max_tokens.unwrap_or(1024),
                remote_config.temperature.unwrap_or(0.7),
            );
            Ok(Arc::new(provider))
        }
        "simulated" => Ok(Arc::new(ScriptedProvider::simulated())),
        "failing" => Ok(Arc::new(ScriptedProvider::failing("generator adapter 'failing' always fails"))),
        _ => anyhow::bail!("Unknown LLM adapter type: {}", adapter),
    }
}
