//! THUNDERWATCH — thunderstorm-risk labeling, training and prediction
//!
//! Entry point. Loads configuration, initialises structured logging, then
//! either runs the full fetch→label→train→predict pipeline (`train`, the
//! default) or scores the configured reading with saved artifacts
//! (`predict`).

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use thunderwatch::config::AppConfig;
use thunderwatch::data::tomorrow::TomorrowClient;
use thunderwatch::pipeline::{likelihood, DatasetBuilder, Predictor, Trainer};
use thunderwatch::types::PredictionResult;

const BANNER: &str = r#"
  _____ _   _ _   _ _   _ ____  _____ ______        ___  _____ ____ _   _
 |_   _| | | | | | | \ | |  _ \| ____|  _ \ \      / / \|_   _/ ___| | | |
   | | | |_| | | | |  \| | | | |  _| | |_) \ \ /\ / / _ \ | || |   | |_| |
   | | |  _  | |_| | |\  | |_| | |___|  _ < \ V  V / ___ \| || |___|  _  |
   |_| |_| |_|\___/|_| \_|____/|_____|_| \_\ \_/\_/_/   \_\_| \____|_| |_|

  Thunderstorm risk pipeline: fetch → label → train → predict
  v0.1.0
"#;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Train,
    Predict,
}

fn parse_mode(arg: Option<&str>) -> Result<Mode> {
    match arg {
        None | Some("train") => Ok(Mode::Train),
        Some("predict") => Ok(Mode::Predict),
        Some(other) => bail!("Unknown command '{other}'. Usage: thunderwatch [train|predict]"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let mode = parse_mode(std::env::args().nth(1).as_deref())?;

    let config_path =
        std::env::var("THUNDERWATCH_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        mode = ?mode,
        locations = cfg.locations.len(),
        model_dir = %cfg.training.model_dir.display(),
        "THUNDERWATCH starting up"
    );

    let result = match mode {
        Mode::Train => run_training(&cfg).await?,
        Mode::Predict => {
            let predictor = Predictor::load(&cfg.training.model_dir)
                .context("Failed to load trained artifacts; run `thunderwatch train` first")?;
            predictor.predict(&cfg.prediction_reading())?
        }
    };

    println!("\nPrediction: {}", serde_json::to_string_pretty(&result)?);

    let score = likelihood::thunderstorm_likelihood(&cfg.prediction_reading());
    info!(
        likelihood = score,
        high = likelihood::is_high(score),
        model_risk = %result.risk_level,
        "Heuristic likelihood for configured reading"
    );
    println!("Heuristic likelihood: {score:.2}");
    Ok(())
}

/// Fetch all locations, train, then score the configured reading with the
/// in-memory artifacts.
async fn run_training(cfg: &AppConfig) -> Result<PredictionResult> {
    if cfg.locations.is_empty() {
        warn!("No [[locations]] configured, dataset will be empty");
    }

    let client = TomorrowClient::new(cfg.weather_api()?)?;
    let dataset = DatasetBuilder::new(&client)
        .with_forecast_hours(cfg.weather.forecast_hours)
        .build(&cfg.locations)
        .await;

    let outcome = Trainer::new(cfg.trainer())
        .train(&dataset)
        .context("Training aborted")?;
    println!("Model accuracy: {:.2}", outcome.accuracy);

    let predictor = Predictor::new(outcome.artifacts)?;
    let reading = cfg.prediction_reading();
    info!(%reading, "Scoring configured reading");
    Ok(predictor.predict(&reading)?)
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("thunderwatch=info"));

    let json_logging = std::env::var("THUNDERWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
