//! Run-level settings for a training session.

use crate::rl::LearningParams;

/// Five rows: a wall cluster, one penalty cell and one goal cell.
pub const DEFAULT_LAYOUT: &str = "       | ###  -| # #  +| # ####|       ";

pub const DEFAULT_EPISODES: usize = 100;

/// Configuration for a training run.
///
/// ```
/// use gridworld_qlearn::config::TrainingConfig;
///
/// let config = TrainingConfig::default()
///     .with_layout("  +")
///     .with_episodes(10)
///     .with_seed(7);
/// assert_eq!(config.episodes, 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Grid rows separated by `|`
    pub layout: String,
    pub episodes: usize,
    pub params: LearningParams,
    /// Seed for start sampling and move selection; `None` draws from entropy
    pub seed: Option<u64>,
}

impl TrainingConfig {
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_params(mut self, params: LearningParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT.to_string(),
            episodes: DEFAULT_EPISODES,
            params: LearningParams::default(),
            seed: None,
        }
    }
}
