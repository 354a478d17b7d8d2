mod cli;
mod config;
mod error;
mod handlers;
mod models;
mod normalizer;
mod render;
mod services;
mod web;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::process::ExitCode;
use std::sync::Arc;

use cli::{Command, OutputFormat};
use config::AppConfig;
use handlers::{load_previews, AnalysisHandler, Preview, Session};
use models::Attachment;
use render::html::{escape_html, page};
use render::SvgChartBackend;
use services::{LocalAssetStore, OpenRouterService};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    let args = cli::parse_args();

    let mut config = AppConfig::from_env()?;
    if let Some(model) = args.model {
        config.openrouter_model = model;
    }

    let openrouter = Arc::new(OpenRouterService::new(
        config.openrouter_api_key.clone(),
        config.openrouter_model.clone(),
        config.openrouter_base_url.clone(),
        config.max_tokens,
    ));
    log::info!("✅ OpenRouter service initialized with model: {}", openrouter.model());

    let uploader = Arc::new(LocalAssetStore::new(config.upload_dir.clone()));
    log::info!("✅ Upload store at {}", config.upload_dir.display());

    let handler = Arc::new(AnalysisHandler::new(uploader, openrouter));

    match args.command {
        Command::Analyze { prompt, images, format, output } => {
            run_analyze(&handler, prompt, images, format, output).await
        }
        #[cfg(feature = "web-server")]
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.bind_addr.clone());
            run_server(handler, &addr, &config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_analyze(
    handler: &AnalysisHandler,
    prompt: String,
    images: Vec<std::path::PathBuf>,
    format: OutputFormat,
    output: Option<std::path::PathBuf>,
) -> Result<ExitCode> {
    let mut session = Session::new(Box::new(SvgChartBackend::new()));
    session.input.set_prompt(prompt);
    session
        .input
        .set_attachments(images.into_iter().map(Attachment::Path).collect());

    let previews = if format == OutputFormat::Html {
        load_previews(session.input.attachments()).await
    } else {
        Vec::new()
    };

    let outcome = handler.submit(&mut session).await;

    let report = match format {
        OutputFormat::Text => session.renderer.to_text(),
        OutputFormat::Html => {
            let body = format!("{}{}", preview_strip(&previews), session.renderer.to_html());
            page(&body, chrono::Utc::now())
        }
    };

    match output {
        Some(path) => {
            tokio::fs::write(&path, report)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            log::info!("📝 Report written to {}", path.display());
        }
        None => println!("{}", report),
    }

    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn preview_strip(previews: &[Preview]) -> String {
    if previews.is_empty() {
        return String::new();
    }
    let images: String = previews
        .iter()
        .map(|p| {
            format!(
                r#"<img src="{}" alt="{}" style="height:72px;margin:4px;border-radius:6px">"#,
                p.data_url,
                escape_html(&p.name)
            )
        })
        .collect();
    format!(r#"<div class="previews">{}</div>"#, images)
}

#[cfg(feature = "web-server")]
async fn run_server(handler: Arc<AnalysisHandler>, addr: &str, config: &AppConfig) -> Result<()> {
    use tokio::sync::Mutex;
    use web::server::{create_router, AppState};

    let state = Arc::new(AppState {
        handler,
        session: Mutex::new(Session::new(Box::new(SvgChartBackend::new()))),
    });
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind web server on {}", addr))?;

    log::info!("🌐 Web server listening on http://{}", addr);
    println!("\n🌱 EcoReveal is running at http://{}", addr);
    println!("🛑 Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("🛑 Shutting down...");
        })
        .await
        .context("Web server failed")?;

    Ok(())
}
