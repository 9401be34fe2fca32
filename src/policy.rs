use std::collections::HashMap;
use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::agent::Agent;
use crate::environment::{
    Movement,
    Pos,
};

/// Picks the next move for an agent out of its legal moves.
pub trait Policy
{
    /// `None` means the policy has nothing to offer and the episode should halt.
    fn choose(&mut self, agent: &Agent<'_>, legal: &[Movement]) -> Option<Movement>;
}

/// Uniform choice over the legal moves. Never looks at the value table.
pub struct RandomPolicy<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomPolicy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Policy for RandomPolicy<R>
{
    fn choose(&mut self, _agent: &Agent<'_>, legal: &[Movement]) -> Option<Movement> {
        legal.choose(&mut self.rng).copied()
    }
}

/// Replays a fixed sequence of moves, halting once it runs out or the next
/// scripted move is not legal.
pub struct ScriptedPolicy {
    moves: VecDeque<Movement>,
}

impl ScriptedPolicy {
    pub fn new<I: IntoIterator<Item = Movement>>(moves: I) -> Self {
        Self { moves: moves.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

impl Policy for ScriptedPolicy
{
    fn choose(&mut self, _agent: &Agent<'_>, legal: &[Movement]) -> Option<Movement> {
        let next = *self.moves.front()?;
        if !legal.contains(&next) {
            return None;
        }
        self.moves.pop_front()
    }
}

// Represents deterministic policy
#[derive(Debug, Default, Clone)]
pub struct DetPolicy {
    pub policy: HashMap<Pos, Movement>,
}

impl DetPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self, pos: &Pos) -> Option<Movement> {
        self.policy.get(pos).copied()
    }
}

impl Policy for DetPolicy
{
    fn choose(&mut self, agent: &Agent<'_>, legal: &[Movement]) -> Option<Movement> {
        self.action(&agent.pos).filter(|a| legal.contains(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Env;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_policy_only_picks_legal_moves() {
        let env = Env::parse(" # |   ").unwrap();
        let agent = Agent::new(&env, Pos::new(0, 0));
        let legal = agent.legal_actions(&Movement::ALL);
        let mut policy = RandomPolicy::new(StdRng::seed_from_u64(3));
        for _ in 0..100 {
            let choice = policy.choose(&agent, &legal).unwrap();
            assert!(legal.contains(&choice));
        }
    }

    #[test]
    fn random_policy_covers_every_legal_move() {
        let env = Env::parse("   |   |   ").unwrap();
        let agent = Agent::new(&env, Pos::new(1, 1));
        let legal = agent.legal_actions(&Movement::ALL);
        let mut policy = RandomPolicy::new(StdRng::seed_from_u64(11));
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[policy.choose(&agent, &legal).unwrap().index()] = true;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn random_policy_on_no_moves_is_none() {
        let env = Env::parse(" ").unwrap();
        let agent = Agent::new(&env, Pos::new(0, 0));
        let mut policy = RandomPolicy::new(StdRng::seed_from_u64(0));
        assert_eq!(policy.choose(&agent, &[]), None);
    }

    #[test]
    fn scripted_policy_halts_on_illegal_move() {
        let env = Env::parse("  +").unwrap();
        let agent = Agent::new(&env, Pos::new(0, 0));
        let legal = agent.legal_actions(&Movement::ALL);
        let mut policy = ScriptedPolicy::new([Movement::Left, Movement::Right]);
        assert_eq!(policy.choose(&agent, &legal), None);
        assert_eq!(policy.remaining(), 2);
    }

    #[test]
    fn scripted_policy_replays_in_order() {
        let env = Env::parse("   ").unwrap();
        let agent = Agent::new(&env, Pos::new(1, 0));
        let legal = agent.legal_actions(&Movement::ALL);
        let mut policy = ScriptedPolicy::new([Movement::Left, Movement::Right]);
        assert_eq!(policy.choose(&agent, &legal), Some(Movement::Left));
        assert_eq!(policy.choose(&agent, &legal), Some(Movement::Right));
        assert_eq!(policy.choose(&agent, &legal), None);
    }
}
