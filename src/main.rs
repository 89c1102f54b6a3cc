use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use peanutguard::adapters::http::{router, state::HttpState};
use peanutguard::application::{orchestrator::RunOutcome, services::DispatchOutcome};
use peanutguard::config::AppConfig;
use peanutguard::domain::{
    detection::Severity,
    environment::Coordinates,
    image::ImageAsset,
    pipeline::{Phase, PipelineView},
};

#[derive(Parser)]
#[command(name = "peanutguard", version, about = "AI pest identification with weather and NDVI context")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the detection dashboard API (and static front-end).
    Serve,
    /// Run one detection for an image file and print the result.
    Detect {
        image: PathBuf,
        /// Device latitude; without it the configured default position is used.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Phone number to alert with the result.
        #[arg(long)]
        alert: Option<String>,
        /// Corrected pest name to send as feedback.
        #[arg(long)]
        correct: Option<String>,
        /// Comment to send as feedback.
        #[arg(long)]
        comment: Option<String>,
        /// Print the final state as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logs (RUST_LOG=info by default)
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Command line and configuration
    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Detect { image, lat, lon, alert, correct, comment, json } => {
            let fix = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
                _ => None,
            };
            detect(config, image, fix, alert, correct, comment, json).await
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Backend: {}", config.api_url);

    // 1. Use cases wired to the backend client, previews and the browser-reported location
    let pipeline = peanutguard::assemble(&config, None);

    // 2. API state
    let state = HttpState {
        orchestrator: pipeline.orchestrator,
        alerts: pipeline.alerts,
        feedback: pipeline.feedback,
        location: pipeline.location,
    };

    // 3. Router plus the static front-end
    let app = router(state).fallback_service(ServeDir::new(&config.static_dir));

    // 4. Serve
    tracing::info!("Dashboard listening on http://{}", config.bind);
    tracing::info!("Static files served from ./{}", config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("cannot bind {}", config.bind))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn detect(
    config: AppConfig,
    path: PathBuf,
    fix: Option<Coordinates>,
    alert: Option<String>,
    correct: Option<String>,
    comment: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = peanutguard::assemble(&config, fix);
    let asset = ImageAsset::from_path(&path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let orchestrator = pipeline.orchestrator.clone();
    tokio::task::spawn_blocking(move || orchestrator.select_image(asset)).await??;

    let outcome = pipeline.orchestrator.run_detection().await?;
    let view = match outcome {
        RunOutcome::Complete(view) | RunOutcome::Failed { view, .. } => view,
        RunOutcome::Superseded(run) => bail!("run {run} was superseded"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }

    if let Some(phone) = alert {
        match pipeline.alerts.dispatch(&phone, view.result.as_ref(), view.weather.as_ref()).await {
            Ok(DispatchOutcome::Sent(_)) => println!("Alert sent to {phone}"),
            Ok(DispatchOutcome::Skipped) => println!("No alert sent: nothing detected"),
            Ok(DispatchOutcome::Rejected(reason)) => println!("Alert rejected: {reason}"),
            Err(e) => eprintln!("Failed to send alert: {e}"),
        }
    }

    if correct.is_some() || comment.is_some() {
        let record = pipeline.orchestrator.feedback_record(correct, comment);
        match pipeline.feedback.submit(record).await {
            Ok(_) => println!("Thanks for your feedback"),
            Err(e) => eprintln!("Failed to submit feedback: {e}"),
        }
    }

    if let Phase::Failed { message, .. } = &view.phase {
        bail!("detection did not complete: {message}");
    }
    Ok(())
}

fn print_view(view: &PipelineView) {
    if let Some(image) = &view.image {
        println!("Image:       {} ({}, {} bytes)", image.name, image.media_type, image.size_bytes);
    }
    match &view.result {
        Some(result) => {
            println!("Pest:        {}", result.pest_name);
            println!("Confidence:  {}", result.confidence_label());
            println!("Risk:        {}", result.severity);
            println!("             {}", result.description);
            for (i, rec) in result.recommendations.iter().enumerate() {
                println!("  {}. {}", i + 1, rec);
            }
        }
        None => println!("Risk:        {}", Severity::label_or_unknown(None)),
    }
    match &view.weather {
        Some(w) => println!(
            "Weather:     {} °C, {} mm rain (24h). {}",
            w.temp_c, w.rain_mm_next_24h, w.advice
        ),
        None => println!("Weather:     —"),
    }
    match &view.satellite {
        Some(s) => println!("NDVI:        {} {}", s.ndvi, s.description),
        None => println!("NDVI:        —"),
    }
    if let Phase::Failed { stage, message } = &view.phase {
        println!("Failed while {:?}: {}", stage, message);
    }
}
