//! Text dumps of the grid, the agent on it, and what was learned.

use std::fmt;

use crate::agent::Agent;
use crate::environment::{Cell, Env, Movement, Pos};
use crate::policy::DetPolicy;
use crate::rl::{QTable, StepObserver, Transition};

/// Placeholder for action values that were never touched.
pub const ZERO_PLACEHOLDER: &str = "----";

fn bordered<F>(width: usize, height: usize, mut symbol: F) -> String
where
    F: FnMut(usize, usize) -> char,
{
    let edge = format!(" {}", "-".repeat(width));
    let mut out = String::with_capacity((width + 3) * (height + 2));
    out.push_str(&edge);
    out.push('\n');
    for y in 0..height {
        out.push('|');
        out.extend((0..width).map(|x| symbol(x, y)));
        out.push_str("|\n");
    }
    out.push_str(&edge);
    out
}

pub fn render_grid(env: &Env) -> String {
    bordered(env.width(), env.height(), |x, y| env.row(y)[x].symbol())
}

/// Grid with the agent stamped on a private copy, so `agent.env` is never written.
pub fn render_agent(agent: &Agent<'_>) -> String {
    let mut grid = agent.env.clone();
    grid.put(agent.pos.x, agent.pos.y, Cell::Agent);
    render_grid(&grid)
}

pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        ZERO_PLACEHOLDER.to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// One grid-shaped block per action, in canonical action order.
pub fn render_q_table(table: &QTable) -> String {
    let mut blocks = Vec::with_capacity(Movement::ALL.len());
    for action in Movement::ALL.iter() {
        let mut block = String::from(action.name());
        for y in 0..table.height() {
            let row: Vec<String> = (0..table.width())
                .map(|x| format_value(table.get_q(&Pos::new(x as isize, y as isize), *action)))
                .collect();
            block.push('\n');
            block.push_str(&row.join("\t"));
        }
        blocks.push(block);
    }
    blocks.join("\n")
}

/// Arrow per empty cell; walls and terminals keep their own symbols.
pub fn render_policy(env: &Env, policy: &DetPolicy) -> String {
    bordered(env.width(), env.height(), |x, y| {
        let pos = Pos::new(x as isize, y as isize);
        match env.row(y)[x] {
            Cell::Empty => policy.action(&pos).map_or(' ', |a| a.arrow()),
            cell => cell.symbol(),
        }
    })
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_grid(self))
    }
}

impl fmt::Display for Agent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_agent(self))
    }
}

impl fmt::Display for QTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_q_table(self))
    }
}

/// Prints the grid after every training step.
pub struct PrintObserver;

impl StepObserver for PrintObserver {
    fn on_step(&mut self, agent: &Agent<'_>, _transition: &Transition) {
        println!("{}", agent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_border() {
        let env = Env::parse(" #|+-").unwrap();
        assert_eq!(render_grid(&env), " --\n| #|\n|+-|\n --");
    }

    #[test]
    fn agent_marker_does_not_leak_into_environment() {
        let env = Env::parse("  +|   ").unwrap();
        let agent = Agent::new(&env, Pos::new(1, 0));
        let before = env.clone();

        assert_eq!(render_agent(&agent), " ---\n| A+|\n|   |\n ---");
        assert_eq!(env, before);
        assert_eq!(env.get(1, 0), Some(Cell::Empty));
        assert_eq!(agent.to_string(), render_agent(&agent));
    }

    #[test]
    fn agent_on_terminal_cell_is_marked() {
        let env = Env::parse(" +").unwrap();
        let agent = Agent::new(&env, Pos::new(1, 0));
        assert_eq!(render_agent(&agent), " --\n| A|\n --");
        assert_eq!(env.get(1, 0), Some(Cell::Goal));
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(0.0), "----");
        assert_eq!(format_value(1.0), "1.00");
        assert_eq!(format_value(0.09), "0.09");
        assert_eq!(format_value(-3.14159), "-3.14");
    }

    #[test]
    fn q_table_report_layout() {
        let env = Env::parse("  +").unwrap();
        let mut table = QTable::new(&env);
        table.set_q(&Pos::new(1, 0), Movement::Right, 1.0);
        table.set_q(&Pos::new(0, 0), Movement::Left, -0.5);

        let expected = "UP\n----\t----\t----\n\
                        RIGHT\n----\t1.00\t----\n\
                        DOWN\n----\t----\t----\n\
                        LEFT\n-0.50\t----\t----";
        assert_eq!(render_q_table(&table), expected);
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn policy_map_shows_arrows() {
        let env = Env::parse("  +|#  ").unwrap();
        let mut policy = DetPolicy::new();
        policy.policy.insert(Pos::new(0, 0), Movement::Right);
        policy.policy.insert(Pos::new(1, 0), Movement::Right);
        policy.policy.insert(Pos::new(1, 1), Movement::Up);
        assert_eq!(render_policy(&env, &policy), " ---\n|>>+|\n|#^ |\n ---");
    }
}
