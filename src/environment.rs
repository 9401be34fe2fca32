use std::fmt;
use std::str::FromStr;

use rand::Rng;
use tracing::trace;

use crate::agent::Agent;
use crate::error::{Error, Result};

pub const GOAL_REWARD: i32 = 10;
pub const PENALTY_REWARD: i32 = -10;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Wall,
    Goal,
    Penalty,
    /// Overlay marker for the agent, only ever written into render copies.
    Agent,
}

impl Cell {
    pub fn reward(&self) -> i32
    {
        match self {
            Cell::Goal => GOAL_REWARD,
            Cell::Penalty => PENALTY_REWARD,
            _ => 0,
        }
    }

    /// Cells an agent may step onto.
    pub fn is_walkable(&self) -> bool
    {
        matches!(self, Cell::Empty | Cell::Goal | Cell::Penalty)
    }

    pub fn symbol(&self) -> char
    {
        match self {
            Cell::Empty => ' ',
            Cell::Wall => '#',
            Cell::Goal => '+',
            Cell::Penalty => '-',
            Cell::Agent => 'A',
        }
    }

    /// Parses a layout character. The agent marker is not a layout cell.
    pub fn from_symbol(symbol: char) -> Option<Cell>
    {
        match symbol {
            ' ' => Some(Cell::Empty),
            '#' => Some(Cell::Wall),
            '+' => Some(Cell::Goal),
            '-' => Some(Cell::Penalty),
            _ => None,
        }
    }
}

// Action
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Movement {
    Up,
    Right,
    Down,
    Left,
}

impl Movement {
    /// Canonical order. Defines the action axis of the value table and the
    /// block order of the report.
    pub const ALL: [Movement; 4] = [Movement::Up, Movement::Right, Movement::Down, Movement::Left];

    /// (dx, dy), with y growing downwards.
    pub fn into_vector(self) -> (isize, isize)
    {
        match self {
            Movement::Up    => ( 0,-1),
            Movement::Right => ( 1, 0),
            Movement::Down  => ( 0, 1),
            Movement::Left  => (-1, 0),
        }
    }

    pub fn index(self) -> usize
    {
        match self {
            Movement::Up    => 0,
            Movement::Right => 1,
            Movement::Down  => 2,
            Movement::Left  => 3,
        }
    }

    pub fn name(self) -> &'static str
    {
        match self {
            Movement::Up    => "UP",
            Movement::Right => "RIGHT",
            Movement::Down  => "DOWN",
            Movement::Left  => "LEFT",
        }
    }

    pub fn arrow(self) -> char
    {
        match self {
            Movement::Up    => '^',
            Movement::Right => '>',
            Movement::Down  => 'v',
            Movement::Left  => '<',
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Grid coordinate. Signed so that a move off the edge is still representable
/// and can be rejected by a bounds check instead of wrapping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: isize,
    pub y: isize,
}

impl Pos {
    pub fn new(x: isize, y: isize) -> Self
    {
        Pos { x, y }
    }

    pub fn offset(self, movement: Movement) -> Pos
    {
        let (dx, dy) = movement.into_vector();
        Pos { x: self.x + dx, y: self.y + dy }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Env {
    map: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
}

impl Env {
    /// Builds an environment from a layout string, rows separated by `|`.
    pub fn parse(layout: &str) -> Result<Self>
    {
        let mut map: Vec<Vec<Cell>> = Vec::new();
        for (row, line) in layout.split('|').enumerate() {
            let cells = line
                .chars()
                .enumerate()
                .map(|(col, symbol)| {
                    Cell::from_symbol(symbol).ok_or(Error::InvalidCell { symbol, row, col })
                })
                .collect::<Result<Vec<Cell>>>()?;
            map.push(cells);
        }
        Self::from_rows(map)
    }

    pub fn from_rows(map: Vec<Vec<Cell>>) -> Result<Self>
    {
        let width = match map.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(Error::EmptyLayout),
        };
        if let Some((row, cells)) = map.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::RaggedLayout { row, expected: width, got: cells.len() });
        }
        let height = map.len();
        Ok(Self { map, width, height })
    }

    pub fn width(&self) -> usize { self.width }

    pub fn height(&self) -> usize { self.height }

    fn in_bounds(&self, x: isize, y: isize) -> bool
    {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Cell at (x, y), `None` outside the grid.
    pub fn get(&self, x: isize, y: isize) -> Option<Cell>
    {
        if self.in_bounds(x, y) {
            Some(self.map[y as usize][x as usize])
        } else {
            None
        }
    }

    /// Overwrites the cell at (x, y). Out-of-bounds writes are ignored.
    pub fn put(&mut self, x: isize, y: isize, cell: Cell)
    {
        if self.in_bounds(x, y) {
            self.map[y as usize][x as usize] = cell;
        }
    }

    pub fn row(&self, y: usize) -> &[Cell]
    {
        &self.map[y]
    }

    pub fn has_empty_cell(&self) -> bool
    {
        self.map.iter().flatten().any(|cell| *cell == Cell::Empty)
    }

    /// Uniformly samples coordinates until an empty cell is hit.
    pub fn random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Agent<'_>>
    {
        if !self.has_empty_cell() {
            return Err(Error::NoEmptyCell);
        }
        let mut attempts = 1;
        loop {
            let x = rng.gen_range(0..self.width) as isize;
            let y = rng.gen_range(0..self.height) as isize;
            if self.get(x, y) == Some(Cell::Empty) {
                trace!(x, y, attempts, "sampled start state");
                return Ok(Agent::new(self, Pos::new(x, y)));
            }
            attempts += 1;
        }
    }

    pub fn iter_all_coordinates(&self) -> EnvIter {
        EnvIter::new(self.width, self.height)
    }
}

impl FromStr for Env {
    type Err = Error;

    fn from_str(layout: &str) -> Result<Self> {
        Env::parse(layout)
    }
}

/// Row-major walk over every coordinate of a grid.
pub struct EnvIter {
    currx: usize,
    curry: usize,
    width: usize,
    height: usize,
}

impl EnvIter {
    fn new(width: usize, height: usize) -> EnvIter {
        EnvIter {
            currx: 0,
            curry: 0,
            width,
            height,
        }
    }
}

impl Iterator for EnvIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        if self.width == 0 || self.curry >= self.height {
            return None;
        }
        let pos = Pos::new(self.currx as isize, self.curry as isize);
        self.currx += 1;
        if self.currx == self.width {
            self.currx = 0;
            self.curry += 1;
        }
        Some(pos)
    }
}
