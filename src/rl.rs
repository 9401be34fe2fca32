use ndarray::{s, Array3, ArrayView1};
use ordered_float::OrderedFloat;
use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::agent::Agent;
use crate::environment::{Cell, Env, Movement, Pos};
use crate::error::{Error, Result};
use crate::policy::{DetPolicy, Policy};

/// Learning rate and discount factor of the one-step Q-learning backup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningParams {
    pub alpha: f64,
    pub gamma: f64,
}

impl LearningParams {
    pub const DEFAULT_ALPHA: f64 = 0.1;
    pub const DEFAULT_GAMMA: f64 = 0.9;

    /// Both parameters must lie in (0, 1].
    pub fn new(alpha: f64, gamma: f64) -> Result<Self> {
        check_unit_interval("alpha", alpha)?;
        check_unit_interval("gamma", gamma)?;
        Ok(Self { alpha, gamma })
    }
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            alpha: Self::DEFAULT_ALPHA,
            gamma: Self::DEFAULT_GAMMA,
        }
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

/// Action values indexed as `[y, x, action]`, sized to the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Array3<f64>,
}

impl QTable {
    pub fn new(env: &Env) -> Self {
        Self {
            values: Array3::zeros((env.height(), env.width(), Movement::ALL.len())),
        }
    }

    pub fn height(&self) -> usize {
        self.values.shape()[0]
    }

    pub fn width(&self) -> usize {
        self.values.shape()[1]
    }

    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    // Positions outside the table are a caller bug and panic on indexing.
    fn cell_index(pos: &Pos) -> (usize, usize) {
        (pos.y as usize, pos.x as usize)
    }

    pub fn get_q(&self, pos: &Pos, action: Movement) -> f64 {
        let (y, x) = Self::cell_index(pos);
        self.values[[y, x, action.index()]]
    }

    pub fn set_q(&mut self, pos: &Pos, action: Movement, value: f64) {
        let (y, x) = Self::cell_index(pos);
        self.values[[y, x, action.index()]] = value;
    }

    /// The four action values of `pos`, in canonical action order.
    pub fn get_q_row(&self, pos: &Pos) -> ArrayView1<'_, f64> {
        let (y, x) = Self::cell_index(pos);
        self.values.slice(s![y, x, ..])
    }

    pub fn max_q(&self, pos: &Pos) -> f64 {
        self.get_q_row(pos)
            .iter()
            .copied()
            .map(OrderedFloat)
            .max()
            .map_or(0.0, |v| v.into_inner())
    }

    /// Highest valued move among `legal`; ties go to the earliest in canonical order.
    pub fn greedy_action(&self, pos: &Pos, legal: &[Movement]) -> Option<Movement> {
        legal
            .iter()
            .rev()
            .copied()
            .max_by_key(|a| OrderedFloat(self.get_q(pos, *a)))
    }

    /// Greedy move for every non-terminal walkable cell that has one.
    pub fn greedy_policy(&self, env: &Env) -> DetPolicy {
        let mut policy = DetPolicy::new();
        for pos in env.iter_all_coordinates() {
            if env.get(pos.x, pos.y) != Some(Cell::Empty) {
                continue;
            }
            let legal = Agent::new(env, pos).legal_actions(&Movement::ALL);
            if let Some(action) = self.greedy_action(&pos, &legal) {
                policy.policy.insert(pos, action);
            }
        }
        policy
    }

    /// One-step Q-learning backup into `(from, action)`:
    /// Q(s,a) <- (1 - α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
    pub fn update(
        &mut self,
        from: &Pos,
        action: Movement,
        reward: f64,
        to: &Pos,
        params: &LearningParams,
    ) -> f64 {
        let current = self.get_q(from, action);
        let target = reward + params.gamma * self.max_q(to);
        let value = (1.0 - params.alpha) * current + params.alpha * target;
        self.set_q(from, action, value);
        value
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }
}

/// One executed move together with the value it wrote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub episode: usize,
    pub step: usize,
    pub from: Pos,
    pub action: Movement,
    pub to: Pos,
    pub reward: i32,
    pub q_value: f64,
}

/// Receives every step of training, after the table update.
pub trait StepObserver {
    fn on_step(&mut self, agent: &Agent<'_>, transition: &Transition);
}

pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _agent: &Agent<'_>, _transition: &Transition) {}
}

impl<F> StepObserver for F
where
    F: FnMut(&Agent<'_>, &Transition),
{
    fn on_step(&mut self, agent: &Agent<'_>, transition: &Transition) {
        self(agent, transition)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpisodeOutcome {
    /// Reached a goal or penalty cell.
    Terminal { steps: usize, reward: i32, pos: Pos },
    /// No legal move from `pos`.
    Stuck { steps: usize, pos: Pos },
    /// The policy declined to move from `pos`.
    Halted { steps: usize, pos: Pos },
}

impl EpisodeOutcome {
    pub fn steps(&self) -> usize {
        match self {
            EpisodeOutcome::Terminal { steps, .. }
            | EpisodeOutcome::Stuck { steps, .. }
            | EpisodeOutcome::Halted { steps, .. } => *steps,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub goals: usize,
    pub penalties: usize,
    pub stuck: usize,
    pub halted: usize,
    pub total_steps: usize,
}

impl TrainingSummary {
    fn record(&mut self, outcome: &EpisodeOutcome) {
        self.episodes += 1;
        self.total_steps += outcome.steps();
        match outcome {
            EpisodeOutcome::Terminal { reward, .. } if *reward > 0 => self.goals += 1,
            EpisodeOutcome::Terminal { .. } => self.penalties += 1,
            EpisodeOutcome::Stuck { .. } => self.stuck += 1,
            EpisodeOutcome::Halted { .. } => self.halted += 1,
        }
    }
}

/// Runs episodes over one environment, sharing a single value table.
pub struct Trainer<'e> {
    env: &'e Env,
    table: QTable,
    params: LearningParams,
    episodes_run: usize,
}

impl<'e> Trainer<'e> {
    pub fn new(env: &'e Env, params: LearningParams) -> Result<Self> {
        if !env.has_empty_cell() {
            return Err(Error::NoEmptyCell);
        }
        Ok(Self {
            env,
            table: QTable::new(env),
            params,
            episodes_run: 0,
        })
    }

    pub fn env(&self) -> &'e Env {
        self.env
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    /// Runs one episode from `start` until a terminal cell, a dead end, or
    /// the policy halting.
    pub fn run_episode<P, O>(&mut self, start: Agent<'e>, policy: &mut P, observer: &mut O) -> EpisodeOutcome
    where
        P: Policy + ?Sized,
        O: StepObserver + ?Sized,
    {
        let episode = self.episodes_run;
        self.episodes_run += 1;

        let mut agent = start;
        let mut steps = 0;
        let outcome = loop {
            if agent.at_end() {
                break EpisodeOutcome::Terminal {
                    steps,
                    reward: agent.reward().unwrap_or(0),
                    pos: agent.pos,
                };
            }

            let legal = agent.legal_actions(&Movement::ALL);
            if legal.is_empty() {
                warn!(episode, x = agent.pos.x, y = agent.pos.y, "agent is stuck, ending episode");
                break EpisodeOutcome::Stuck { steps, pos: agent.pos };
            }
            let action = match policy.choose(&agent, &legal) {
                Some(action) => action,
                None => break EpisodeOutcome::Halted { steps, pos: agent.pos },
            };

            let from = agent.pos;
            agent.execute(action);
            steps += 1;

            // Legal moves never leave the grid, so the reward is always present.
            let reward = agent.reward().unwrap_or(0);
            let q_value = self.table.update(&from, action, f64::from(reward), &agent.pos, &self.params);
            let transition = Transition {
                episode,
                step: steps,
                from,
                action,
                to: agent.pos,
                reward,
                q_value,
            };
            trace!(episode, step = steps, %action, reward, q_value, "step");
            observer.on_step(&agent, &transition);
        };

        debug!(episode, ?outcome, "episode finished");
        outcome
    }

    /// Runs one episode from a uniformly sampled empty cell.
    pub fn learn_episode<R, P, O>(&mut self, rng: &mut R, policy: &mut P, observer: &mut O) -> Result<EpisodeOutcome>
    where
        R: Rng + ?Sized,
        P: Policy + ?Sized,
        O: StepObserver + ?Sized,
    {
        let start = self.env.random_state(rng)?;
        Ok(self.run_episode(start, policy, observer))
    }

    /// Runs `episodes` episodes back to back without resetting the table.
    pub fn learn<R, P, O>(
        &mut self,
        episodes: usize,
        rng: &mut R,
        policy: &mut P,
        observer: &mut O,
    ) -> Result<TrainingSummary>
    where
        R: Rng + ?Sized,
        P: Policy + ?Sized,
        O: StepObserver + ?Sized,
    {
        info!(
            episodes,
            alpha = self.params.alpha,
            gamma = self.params.gamma,
            width = self.env.width(),
            height = self.env.height(),
            "starting training"
        );
        let mut summary = TrainingSummary::default();
        for _ in 0..episodes {
            let outcome = self.learn_episode(rng, policy, observer)?;
            summary.record(&outcome);
        }
        info!(?summary, "training finished");
        Ok(summary)
    }
}
