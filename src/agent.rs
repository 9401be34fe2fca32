use crate::environment::{
    Pos,
    Movement,
    Env,
};

/// The agent's position, bound to the environment it moves in.
#[derive(Debug, Clone, Copy)]
pub struct Agent<'e> {
    pub env: &'e Env,
    pub pos: Pos,
}

impl<'e> Agent<'e> {
    pub fn new(env: &'e Env, pos: Pos) -> Self
    {
        Self { env, pos }
    }

    /// True iff the target cell exists and is not a wall.
    pub fn is_legal(&self, movement: Movement) -> bool
    {
        let target = self.pos.offset(movement);
        self.env
            .get(target.x, target.y)
            .map_or(false, |cell| cell.is_walkable())
    }

    /// Filters `actions` down to the legal ones, keeping their order.
    pub fn legal_actions(&self, actions: &[Movement]) -> Vec<Movement>
    {
        actions.iter().copied().filter(|a| self.is_legal(*a)).collect()
    }

    /// Reward of the current cell, `None` when off the grid.
    pub fn reward(&self) -> Option<i32>
    {
        self.env.get(self.pos.x, self.pos.y).map(|cell| cell.reward())
    }

    pub fn at_end(&self) -> bool
    {
        self.reward().map_or(false, |r| r != 0)
    }

    /// Applies the move unchecked. Callers must only pass legal moves.
    pub fn execute(&mut self, movement: Movement) -> &mut Self
    {
        self.pos = self.pos.offset(movement);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Cell;

    fn env() -> Env {
        Env::parse(" # |  +|  -").unwrap()
    }

    #[test]
    fn walls_and_edges_are_illegal() {
        let env = env();
        let agent = Agent::new(&env, Pos::new(0, 0));
        assert!(!agent.is_legal(Movement::Up));
        assert!(!agent.is_legal(Movement::Left));
        assert!(!agent.is_legal(Movement::Right));
        assert!(agent.is_legal(Movement::Down));
        assert_eq!(agent.legal_actions(&Movement::ALL), vec![Movement::Down]);
    }

    #[test]
    fn terminal_cells_are_legal_targets() {
        let env = env();
        let agent = Agent::new(&env, Pos::new(1, 1));
        assert_eq!(
            agent.legal_actions(&Movement::ALL),
            vec![Movement::Right, Movement::Down, Movement::Left]
        );
    }

    #[test]
    fn boxed_in_position_has_no_legal_actions() {
        let env = Env::parse("###|# #|###").unwrap();
        let agent = Agent::new(&env, Pos::new(1, 1));
        assert!(agent.legal_actions(&Movement::ALL).is_empty());
    }

    #[test]
    fn reward_and_at_end_follow_cell() {
        let env = env();
        let mut agent = Agent::new(&env, Pos::new(1, 1));
        assert_eq!(agent.reward(), Some(0));
        assert!(!agent.at_end());

        agent.execute(Movement::Right);
        assert_eq!(env.get(agent.pos.x, agent.pos.y), Some(Cell::Goal));
        assert_eq!(agent.reward(), Some(10));
        assert!(agent.at_end());

        agent.execute(Movement::Down);
        assert_eq!(agent.reward(), Some(-10));
        assert!(agent.at_end());
    }

    #[test]
    fn reward_off_grid_is_none() {
        let env = env();
        let mut agent = Agent::new(&env, Pos::new(0, 0));
        agent.execute(Movement::Up);
        assert_eq!(agent.pos, Pos::new(0, -1));
        assert_eq!(agent.reward(), None);
        assert!(!agent.at_end());
    }
}
