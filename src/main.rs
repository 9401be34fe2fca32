use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gridworld_qlearn::config::TrainingConfig;
use gridworld_qlearn::render::{render_policy, render_q_table, PrintObserver};

#[derive(Parser)]
#[command(name = "qlearn")]
#[command(about = "Tabular Q-learning on a small grid world", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a grid and print the learned action values
    Learn {
        /// Grid rows separated by '|': ' ' empty, '#' wall, '+' goal, '-' penalty
        layout: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Learn { layout } => learn(layout),
    }
}

fn learn(layout: Option<String>) -> Result<()> {
    let mut config = TrainingConfig::default();
    if let Some(layout) = layout {
        config = config.with_layout(layout);
    }

    let run = gridworld_qlearn::train(&config, &mut PrintObserver)
        .with_context(|| format!("failed to train on layout {:?}", config.layout))?;

    println!("{}", render_q_table(&run.table));
    println!();
    println!("{}", render_policy(&run.env, &run.greedy_policy()));
    Ok(())
}
