//! Tabular Q-learning on a small grid with walls, a goal and a penalty cell.

pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod policy;
pub mod render;
pub mod rl;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use crate::agent::Agent;
pub use crate::config::TrainingConfig;
pub use crate::environment::{Cell, Env, Movement, Pos};
pub use crate::error::{Error, Result};
pub use crate::policy::{DetPolicy, Policy, RandomPolicy, ScriptedPolicy};
pub use crate::rl::{
    EpisodeOutcome, LearningParams, NoopObserver, QTable, StepObserver, Trainer, TrainingSummary,
    Transition,
};

/// What a finished training run leaves behind.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub env: Env,
    pub table: QTable,
    pub summary: TrainingSummary,
}

impl TrainingRun {
    pub fn greedy_policy(&self) -> DetPolicy {
        self.table.greedy_policy(&self.env)
    }
}

/// Builds the environment from `config` and trains a fresh table on it with
/// the uniform random policy.
pub fn train<O>(config: &TrainingConfig, observer: &mut O) -> Result<TrainingRun>
where
    O: StepObserver + ?Sized,
{
    let env = Env::parse(&config.layout)?;
    let params = LearningParams::new(config.params.alpha, config.params.gamma)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut policy = RandomPolicy::new(StdRng::seed_from_u64(rng.gen()));

    let (table, summary) = {
        let mut trainer = Trainer::new(&env, params)?;
        let summary = trainer.learn(config.episodes, &mut rng, &mut policy, observer)?;
        (trainer.into_table(), summary)
    };

    Ok(TrainingRun { env, table, summary })
}
