//! Tagtrend CLI
//!
//! Evaluate tag popularity forecasting models over a stream of posts.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tagtrend::{
    identity, Baseline, Ensemble, ForecastConfig, Metrics, MetricsCalculator, Model, Post,
    SgdRegressor, TagModel, TagwiseModel, WindowsManager, ZeroModel, VERSION,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagtrend")]
#[command(version = VERSION)]
#[command(about = "Tag popularity forecasting over time-windowed event streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a model over a posts file
    Evaluate {
        /// JSON file with an array of {"text": ..., "date": ...} posts
        input: PathBuf,

        /// Model to evaluate (baseline, zero, tag, tagwise, ensemble)
        #[arg(long, default_value = "tag")]
        model: String,

        /// Window duration in seconds (defaults to the configured value)
        #[arg(long)]
        window_seconds: Option<i64>,
    },

    /// Evaluate a model across a range of window sizes
    Sweep {
        /// JSON file with an array of {"text": ..., "date": ...} posts
        input: PathBuf,

        /// Model to evaluate (baseline, zero, tag, tagwise, ensemble)
        #[arg(long, default_value = "baseline")]
        model: String,

        /// Smallest window size candidate in seconds
        #[arg(long, default_value = "600")]
        min_size: i64,

        /// Number of candidate sizes
        #[arg(long, default_value = "5")]
        count: usize,

        /// Minimum number of windows the largest candidate must yield
        #[arg(long, default_value = "10")]
        min_windows: i64,
    },

    /// Show effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            input,
            model,
            window_seconds,
        } => cmd_evaluate(&input, &model, window_seconds),
        Commands::Sweep {
            input,
            model,
            min_size,
            count,
            min_windows,
        } => cmd_sweep(&input, &model, min_size, count, min_windows),
        Commands::Config => cmd_config(),
    }
}

/// A raw post record as found in input files.
#[derive(Debug, Deserialize)]
struct RawPost {
    text: String,
    date: String,
}

fn load_posts(input: &Path) -> Vec<Post> {
    let content = std::fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {e}", input.display());
        std::process::exit(1);
    });
    let raw: Vec<RawPost> = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {e}", input.display());
        std::process::exit(1);
    });
    raw.iter()
        .map(|r| {
            Post::parse(&r.text, &r.date, identity).unwrap_or_else(|e| {
                eprintln!("Failed to parse post dated {:?}: {e}", r.date);
                std::process::exit(1);
            })
        })
        .collect()
}

fn build_model(name: &str, config: &ForecastConfig) -> Box<dyn Model> {
    let history = config.history_windows;
    let learning_rate = config.learning_rate;
    match name {
        "baseline" => Box::new(Baseline),
        "zero" => Box::new(ZeroModel),
        "tag" => Box::new(TagModel::new(
            history,
            SgdRegressor::new(learning_rate),
            config.online,
        )),
        "tagwise" => Box::new(TagwiseModel::new(
            history,
            Box::new(move || Box::new(SgdRegressor::new(learning_rate))),
        )),
        "ensemble" => Box::new(Ensemble::new(
            config.ensemble_size,
            config.train_size,
            Box::new(move || {
                Box::new(TagModel::new(history, SgdRegressor::new(learning_rate), true))
            }),
        )),
        other => {
            eprintln!("Unknown model '{other}' (expected baseline, zero, tag, tagwise, ensemble)");
            std::process::exit(1);
        }
    }
}

fn evaluate_once(
    posts: Vec<Post>,
    model_name: &str,
    window_seconds: i64,
    config: &ForecastConfig,
) -> Option<Metrics> {
    let manager = WindowsManager::with_quantum(posts, config.quantum_seconds).unwrap_or_else(|e| {
        eprintln!("Cannot build windows: {e}");
        std::process::exit(1);
    });
    let windows = manager.windows(window_seconds).unwrap_or_else(|e| {
        eprintln!("Bucketing failed: {e}");
        std::process::exit(1);
    });
    if windows.len() < 2 {
        return None;
    }

    let mut model = build_model(model_name, config);
    // Train on the first half, evaluate over the full sequence
    let split = windows.len() / 2;
    model.fit(&windows[..split.max(1)]);
    MetricsCalculator::new(windows).metrics(model.as_mut())
}

fn cmd_evaluate(input: &Path, model_name: &str, window_seconds: Option<i64>) {
    let config = load_config();
    let window_seconds = window_seconds.unwrap_or(config.window_seconds);
    let posts = load_posts(input);
    println!("Posts: {}", posts.len());
    println!("Window: {window_seconds}s, model: {model_name}");

    match evaluate_once(posts, model_name, window_seconds, &config) {
        Some(metrics) => {
            println!("Median RMSE: {:.6}", metrics.med_rmse);
            println!("Mean RMSE:   {:.6}", metrics.avg_rmse);
        }
        None => println!("Not enough windows to evaluate"),
    }
}

fn cmd_sweep(input: &Path, model_name: &str, min_size: i64, count: usize, min_windows: i64) {
    let config = load_config();
    let posts = load_posts(input);
    let manager = WindowsManager::new(posts.clone()).unwrap_or_else(|e| {
        eprintln!("Cannot build windows: {e}");
        std::process::exit(1);
    });

    let sizes = manager.windows_sizes_range(min_size, count, min_windows);
    if sizes.is_empty() {
        println!("No window size candidates for this stream");
        return;
    }

    println!("{:>12}  {:>14}  {:>14}", "window (s)", "median RMSE", "mean RMSE");
    for size in sizes {
        match evaluate_once(posts.clone(), model_name, size, &config) {
            Some(metrics) => println!(
                "{:>12}  {:>14.6}  {:>14.6}",
                size, metrics.med_rmse, metrics.avg_rmse
            ),
            None => println!("{size:>12}  {:>14}  {:>14}", "-", "-"),
        }
    }
}

fn cmd_config() {
    let config = load_config();
    println!("Configuration file: {}", ForecastConfig::config_path().display());
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to render config: {e}"),
    }
}

fn load_config() -> ForecastConfig {
    ForecastConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        ForecastConfig::default()
    })
}
