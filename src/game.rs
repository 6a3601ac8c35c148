use std::collections::VecDeque;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Serialize, Deserialize};
use tracing::debug;
use crate::error::{Result, SnakeError};

//    0 1 2 3 4 5 6 7 8 9
//    _ _ _ _ _ _ _ _ _ _
// 0 |. . . . . H T T . .|
// 1 |. . . . . . . . . .|
// 2 |. . . F . . . . . .|
// 3 |. . . . . . . . . .|
// 4 |. . . . . . F . . .|
// 5 |. . . X . . . . . .|
//    ‾ ‾ ‾ ‾ ‾ ‾ ‾ ‾ ‾ ‾

/// (row, column)
pub type Pos = (i32, i32);

pub const MIN_SIDE: usize = 3;
pub const MAX_HEIGHT: usize = 13;
pub const MAX_WIDTH: usize = 24;
pub const INITIAL_LENGTH: usize = 3;
pub const FOOD_COUNT: usize = 2;

// rejection sampling attempts before falling back to a row-major scan
const PLACEMENT_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Tail,
    Head,
    Food,
    Hazard,
}

impl Cell {
    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Tail => 'T',
            Cell::Head => 'H',
            Cell::Food => 'F',
            Cell::Hazard => 'X',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    /// Indexed in action order: 0 left, 1 up, 2 right, 3 down.
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Direction> {
        Self::ALL.get(index).copied()
    }

    /// (row delta, column delta)
    pub fn delta(self) -> Pos {
        match self {
            Direction::Left => (0, -1),
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
        }
    }

    pub fn turn_left(self) -> Direction {
        Self::ALL[(self.index() + 3) % 4]
    }

    pub fn turn_right(self) -> Direction {
        Self::ALL[(self.index() + 1) % 4]
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "LEFT",
            Direction::Up => "UP",
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
        }
    }

    fn between(from: Pos, to: Pos) -> Option<Direction> {
        Self::ALL.into_iter().find(|d| {
            let (dy, dx) = d.delta();
            (from.0 + dy, from.1 + dx) == to
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Death {
    Wall,
    SelfCollision,
    Starvation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Ate,
    Shrank,
    Died(Death),
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepOutcome::Died(_))
    }
}

pub struct Board {
    height: usize,
    width: usize,
    grid: Vec<Cell>,
    snake: VecDeque<Pos>, // tail at the front, head at the back
    foods: [Pos; FOOD_COUNT],
    hazard: Pos,
    heading: Direction,
    death: Option<Death>,
    rng: StdRng,
}

impl Board {
    pub fn new(height: usize, width: usize) -> Result<Self> {
        Self::with_rng(height, width, StdRng::from_os_rng())
    }

    pub fn with_seed(height: usize, width: usize, seed: u64) -> Result<Self> {
        Self::with_rng(height, width, StdRng::seed_from_u64(seed))
    }

    fn with_rng(height: usize, width: usize, rng: StdRng) -> Result<Self> {
        if !(MIN_SIDE..=MAX_HEIGHT).contains(&height) || !(MIN_SIDE..=MAX_WIDTH).contains(&width) {
            return Err(SnakeError::config(format!(
                "board must be {MIN_SIDE}..={MAX_HEIGHT} rows by {MIN_SIDE}..={MAX_WIDTH} columns, got {height}x{width}"
            )));
        }

        let mut board = Self {
            height,
            width,
            grid: vec![Cell::Empty; height * width],
            snake: VecDeque::with_capacity(height * width),
            foods: [(0, 0); FOOD_COUNT],
            hazard: (0, 0),
            heading: Direction::Right,
            death: None,
            rng,
        };
        board.initialize()?;

        Ok(board)
    }

    /// Board with a known layout. `snake` runs from tail to head; the heading
    /// points from the segment behind the head towards it.
    pub fn from_parts(
        height: usize,
        width: usize,
        snake: &[Pos],
        foods: [Pos; FOOD_COUNT],
        hazard: Pos,
        seed: u64,
    ) -> Result<Self> {
        let mut board = Self::with_seed(height, width, seed)?;
        board.grid.fill(Cell::Empty);
        board.snake.clear();

        if snake.is_empty() {
            return Err(SnakeError::config("snake needs at least one segment"));
        }
        for pair in snake.windows(2) {
            if Direction::between(pair[0], pair[1]).is_none() {
                return Err(SnakeError::config(format!("segments {:?} and {:?} are not adjacent", pair[0], pair[1])));
            }
        }

        for (i, &segment) in snake.iter().enumerate() {
            let value = if i + 1 == snake.len() { Cell::Head } else { Cell::Tail };
            if !board.in_bounds(segment) || !board.set_if_empty(segment, value) {
                return Err(SnakeError::config(format!("segment {:?} is off the board or overlaps", segment)));
            }
            board.snake.push_back(segment);
        }
        for (slot, &pos) in foods.iter().enumerate() {
            if !board.in_bounds(pos) || !board.set_if_empty(pos, Cell::Food) {
                return Err(SnakeError::config(format!("food {:?} is off the board or overlaps", pos)));
            }
            board.foods[slot] = pos;
        }
        if !board.in_bounds(hazard) || !board.set_if_empty(hazard, Cell::Hazard) {
            return Err(SnakeError::config(format!("hazard {:?} is off the board or overlaps", hazard)));
        }
        board.hazard = hazard;

        board.heading = match snake {
            [.., neck, head] => Direction::between(*neck, *head).unwrap_or(Direction::Right),
            _ => Direction::Right,
        };

        Ok(board)
    }

    /// Throws away the current episode and lays out a fresh random board.
    pub fn reset(&mut self) -> Result<()> {
        self.initialize()
    }

    fn initialize(&mut self) -> Result<()> {
        self.grid.fill(Cell::Empty);
        self.snake.clear();
        self.death = None;

        let head = self.place_random(Cell::Head)?;
        let neck = self.place_adjacent(head)?;
        let tail = self.place_adjacent(neck)?;
        self.snake.extend([tail, neck, head]);
        self.heading = Direction::between(neck, head).unwrap_or(Direction::Right);

        for i in 0..FOOD_COUNT {
            self.foods[i] = self.place_random(Cell::Food)?;
        }
        self.hazard = self.place_random(Cell::Hazard)?;

        debug!(head = ?head, heading = self.heading.name(), "board initialized");
        Ok(())
    }

    pub fn height(&self) -> usize {self.height}
    pub fn width(&self) -> usize {self.width}
    pub fn heading(&self) -> Direction {self.heading}
    pub fn alive(&self) -> bool {self.death.is_none()}
    pub fn death(&self) -> Option<Death> {self.death}
    pub fn foods(&self) -> [Pos; FOOD_COUNT] {self.foods}
    pub fn hazard(&self) -> Pos {self.hazard}
    pub fn cells(&self) -> &[Cell] {&self.grid}

    /// Segments ordered from tail to head.
    pub fn snake(&self) -> &VecDeque<Pos> {
        &self.snake
    }

    pub fn length(&self) -> usize {
        self.snake.len()
    }

    pub fn head(&self) -> Pos {
        self.snake.back().copied().unwrap_or_default()
    }

    pub fn tail(&self) -> Pos {
        self.snake.front().copied().unwrap_or_default()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.0 >= 0 && pos.1 >= 0 && (pos.0 as usize) < self.height && (pos.1 as usize) < self.width
    }

    /// `None` outside the grid.
    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        self.in_bounds(pos).then(|| self.grid[self.index(pos)])
    }

    pub fn count(&self, kind: Cell) -> usize {
        self.grid.iter().filter(|&&c| c == kind).count()
    }

    /// Whether moving in `direction` would end the episode right away.
    pub fn would_die(&self, direction: Direction) -> bool {
        self.collision(self.next_head(direction)).is_some()
    }

    pub fn apply_action(&mut self, direction: Direction) -> Result<StepOutcome> {
        if let Some(death) = self.death {
            return Ok(StepOutcome::Died(death));
        }

        let next = self.next_head(direction);
        if let Some(death) = self.collision(next) {
            self.death = Some(death);
            debug!(?death, length = self.length(), "snake died");
            return Ok(StepOutcome::Died(death));
        }

        let outcome = match self.grid[self.index(next)] {
            Cell::Food => {
                self.advance(next, 0);
                self.respawn_food(next)?;
                StepOutcome::Ate
            }
            Cell::Hazard => {
                self.advance(next, 2);
                self.hazard = self.place_random(Cell::Hazard)?;
                StepOutcome::Shrank
            }
            // empty cell or the vacated tail endpoint
            _ => {
                self.advance(next, 1);
                StepOutcome::Moved
            }
        };
        self.heading = direction;

        Ok(outcome)
    }

    /// Terminal classification of entering `next`, `None` when the move is legal.
    fn collision(&self, next: Pos) -> Option<Death> {
        match self.cell(next) {
            None => Some(Death::Wall),
            // the tail endpoint is vacated this tick, except for a two-segment snake
            Some(Cell::Tail | Cell::Head) if next != self.tail() || self.length() == 2 => Some(Death::SelfCollision),
            Some(Cell::Hazard) if self.length() < 2 => Some(Death::Starvation),
            _ => None,
        }
    }

    fn next_head(&self, direction: Direction) -> Pos {
        let head = self.head();
        let (dy, dx) = direction.delta();
        (head.0 + dy, head.1 + dx)
    }

    // drops `shed` segments off the tail, then moves the head onto `next`
    fn advance(&mut self, next: Pos, shed: usize) {
        let head = self.head();
        let i = self.index(head);
        self.grid[i] = Cell::Tail;

        for _ in 0..shed {
            if let Some(old) = self.snake.pop_front() {
                let i = self.index(old);
                self.grid[i] = Cell::Empty;
            }
        }

        self.snake.push_back(next);
        let i = self.index(next);
        self.grid[i] = Cell::Head;
    }

    fn respawn_food(&mut self, eaten: Pos) -> Result<()> {
        if let Some(slot) = self.foods.iter().position(|&f| f == eaten) {
            self.foods[slot] = self.place_random(Cell::Food)?;
        }
        Ok(())
    }

    fn place_adjacent(&mut self, pos: Pos) -> Result<Pos> {
        let candidates: Vec<Pos> = Direction::ALL
            .iter()
            .map(|d| (pos.0 + d.delta().0, pos.1 + d.delta().1))
            .filter(|&p| self.cell(p) == Some(Cell::Empty))
            .collect();

        let chosen = *candidates.choose(&mut self.rng).ok_or_else(|| {
            SnakeError::config(format!(
                "{}x{} board is too small to place the initial snake", self.height, self.width
            ))
        })?;
        let i = self.index(chosen);
        self.grid[i] = Cell::Tail;

        Ok(chosen)
    }

    // Uniform rejection sampling, then the first empty cell in row-major order.
    // The fallback favours low rows on a nearly full board.
    fn place_random(&mut self, value: Cell) -> Result<Pos> {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let pos = (
                self.rng.random_range(0..self.height) as i32,
                self.rng.random_range(0..self.width) as i32,
            );
            if self.set_if_empty(pos, value) {
                return Ok(pos);
            }
        }

        let first_empty = self.grid.iter().position(|&c| c == Cell::Empty).ok_or(SnakeError::NoEmptyCell)?;
        let pos = ((first_empty / self.width) as i32, (first_empty % self.width) as i32);
        self.grid[first_empty] = value;

        Ok(pos)
    }

    fn set_if_empty(&mut self, pos: Pos, value: Cell) -> bool {
        let i = self.index(pos);
        if self.grid[i] != Cell::Empty {
            return false;
        }
        self.grid[i] = value;
        true
    }

    fn index(&self, pos: Pos) -> usize {
        pos.0 as usize * self.width + pos.1 as usize
    }

    /// The head's row and column as the agent sees them, walls drawn as `W`.
    pub fn vision(&self) -> String {
        let head = self.head();
        let mut out = String::new();

        for y in -1..=self.height as i32 {
            for x in -1..=self.width as i32 {
                let c = if y != head.0 && x != head.1 {
                    ' '
                } else {
                    match self.cell((y, x)) {
                        None => 'W',
                        Some(cell) => cell.symbol(),
                    }
                };
                out.push(c);
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // 10x10 board with a hand-placed layout; snake is given tail first
    fn board_with(snake: &[Pos], foods: [Pos; 2], hazard: Pos, heading: Direction) -> Board {
        let mut board = Board::from_parts(10, 10, snake, foods, hazard, 7).unwrap();
        board.heading = heading;
        board
    }

    fn assert_consistent(board: &Board) {
        assert!(board.length() >= 1);
        assert_eq!(board.count(Cell::Head), 1);

        let body: HashSet<Pos> = board.snake().iter().copied().collect();
        assert_eq!(body.len(), board.length(), "snake segments alias a cell");

        let mut on_grid = HashSet::new();
        for y in 0..board.height() as i32 {
            for x in 0..board.width() as i32 {
                if matches!(board.cell((y, x)), Some(Cell::Tail | Cell::Head)) {
                    on_grid.insert((y, x));
                }
            }
        }
        assert_eq!(on_grid, body);
        assert_eq!(board.cell(board.head()), Some(Cell::Head));

        for pair in board.snake().iter().collect::<Vec<_>>().windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!((a.0 - b.0).abs() + (a.1 - b.1).abs(), 1, "segments {:?} and {:?} are not adjacent", a, b);
        }
    }

    fn assert_items(board: &Board) {
        assert_eq!(board.count(Cell::Food), 2);
        assert_eq!(board.count(Cell::Hazard), 1);
        for food in board.foods() {
            assert_eq!(board.cell(food), Some(Cell::Food));
        }
        assert_eq!(board.cell(board.hazard()), Some(Cell::Hazard));
    }

    #[test]
    fn test_new_board_layout() {
        for seed in 0..50 {
            let board = Board::with_seed(10, 10, seed).unwrap();
            assert_eq!(board.length(), INITIAL_LENGTH);
            assert!(board.alive());
            assert_consistent(&board);
            assert_items(&board);

            let snake = board.snake();
            assert_eq!(Direction::between(snake[1], snake[2]), Some(board.heading()));
        }
    }

    #[test]
    fn test_smallest_board_initializes() {
        for seed in 0..50 {
            let board = Board::with_seed(3, 3, seed).unwrap();
            assert_consistent(&board);
            assert_items(&board);
            assert_eq!(board.count(Cell::Empty), 3);
        }
    }

    #[test]
    fn test_dimensions_out_of_range() {
        assert!(matches!(Board::with_seed(2, 10, 0), Err(SnakeError::Configuration(_))));
        assert!(matches!(Board::with_seed(10, 2, 0), Err(SnakeError::Configuration(_))));
        assert!(matches!(Board::with_seed(MAX_HEIGHT + 1, 10, 0), Err(SnakeError::Configuration(_))));
        assert!(matches!(Board::with_seed(10, MAX_WIDTH + 1, 0), Err(SnakeError::Configuration(_))));
        assert!(Board::with_seed(MAX_HEIGHT, MAX_WIDTH, 0).is_ok());
    }

    #[test]
    fn test_from_parts_validates_layout() {
        let foods = [(0, 0), (0, 9)];

        let board = Board::from_parts(10, 10, &[(5, 5), (4, 5)], foods, (9, 9), 0).unwrap();
        assert_eq!(board.heading(), Direction::Up);
        assert_consistent(&board);
        assert_items(&board);

        let gapped = Board::from_parts(10, 10, &[(5, 1), (5, 3)], foods, (9, 9), 0);
        assert!(matches!(gapped, Err(SnakeError::Configuration(_))));

        let overlapping = Board::from_parts(10, 10, &[(0, 1), (0, 0)], foods, (9, 9), 0);
        assert!(matches!(overlapping, Err(SnakeError::Configuration(_))));

        let off_board = Board::from_parts(10, 10, &[(5, 5)], foods, (10, 9), 0);
        assert!(matches!(off_board, Err(SnakeError::Configuration(_))));
    }

    #[test]
    fn test_direction_turns() {
        assert_eq!(Direction::Up.turn_left(), Direction::Left);
        assert_eq!(Direction::Up.turn_right(), Direction::Right);
        assert_eq!(Direction::Left.turn_left(), Direction::Down);
        assert_eq!(Direction::Down.turn_right(), Direction::Left);
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
            assert_eq!(Direction::from_index(i), Some(*d));
        }
        assert_eq!(Direction::from_index(4), None);
    }

    #[test]
    fn test_safe_moves_keep_length() {
        let mut board = board_with(&[(5, 1), (5, 2), (5, 3)], [(0, 0), (0, 9)], (9, 9), Direction::Right);

        for direction in [Direction::Right, Direction::Right, Direction::Down] {
            let outcome = board.apply_action(direction).unwrap();
            assert_eq!(outcome, StepOutcome::Moved);
            assert!(!outcome.is_terminal());
        }

        assert_eq!(board.length(), 3);
        assert_eq!(board.head(), (6, 5));
        assert_eq!(board.snake().iter().copied().collect::<Vec<_>>(), vec![(5, 4), (5, 5), (6, 5)]);
        assert_eq!(board.heading(), Direction::Down);
        assert_eq!(board.cell((5, 3)), Some(Cell::Empty));
        assert_consistent(&board);
        assert_items(&board);
    }

    #[test]
    fn test_slide_into_vacated_tail() {
        // the shortest snake whose head touches its tail endpoint
        let mut board = board_with(&[(1, 1), (1, 2), (2, 2), (2, 1)], [(8, 8), (8, 9)], (9, 9), Direction::Left);

        let outcome = board.apply_action(Direction::Up).unwrap();

        assert_eq!(outcome, StepOutcome::Moved);
        assert_eq!(board.length(), 4);
        assert_eq!(board.head(), (1, 1));
        assert_eq!(board.tail(), (1, 2));
        assert_consistent(&board);
    }

    #[test]
    fn test_two_segment_snake_cannot_enter_tail() {
        let mut board = board_with(&[(5, 4), (5, 5)], [(8, 8), (8, 9)], (9, 9), Direction::Right);

        assert!(board.would_die(Direction::Left));
        let outcome = board.apply_action(Direction::Left).unwrap();

        assert_eq!(outcome, StepOutcome::Died(Death::SelfCollision));
        assert!(!board.alive());
        assert_eq!(board.length(), 2);
    }

    #[test]
    fn test_body_collision() {
        let mut board = board_with(&[(4, 4), (4, 5), (4, 6), (5, 6), (5, 5)], [(8, 8), (8, 9)], (9, 9), Direction::Left);

        let outcome = board.apply_action(Direction::Up).unwrap();
        assert_eq!(outcome, StepOutcome::Died(Death::SelfCollision));
    }

    #[test]
    fn test_wall_leaves_board_untouched() {
        let mut board = board_with(&[(5, 7), (5, 8), (5, 9)], [(0, 0), (0, 9)], (9, 0), Direction::Right);
        let before = board.cells().to_vec();
        let snake_before = board.snake().clone();

        let outcome = board.apply_action(Direction::Right).unwrap();

        assert_eq!(outcome, StepOutcome::Died(Death::Wall));
        assert_eq!(board.cells(), before.as_slice());
        assert_eq!(board.snake(), &snake_before);
        assert_eq!(board.heading(), Direction::Right);

        // dead boards stay dead
        assert_eq!(board.apply_action(Direction::Up).unwrap(), StepOutcome::Died(Death::Wall));
        assert_eq!(board.cells(), before.as_slice());
    }

    #[test]
    fn test_eating_food_grows() {
        let mut board = board_with(&[(5, 1), (5, 2), (5, 3)], [(5, 4), (0, 9)], (9, 9), Direction::Right);

        let outcome = board.apply_action(Direction::Right).unwrap();

        assert_eq!(outcome, StepOutcome::Ate);
        assert_eq!(board.length(), 4);
        assert_eq!(board.tail(), (5, 1));
        assert_eq!(board.head(), (5, 4));
        assert_consistent(&board);
        assert_items(&board);
        assert!(board.foods().contains(&(0, 9)));
    }

    #[test]
    fn test_hazard_shrinks() {
        let mut board = board_with(&[(5, 1), (5, 2), (5, 3), (5, 4)], [(0, 0), (0, 9)], (5, 5), Direction::Right);

        let outcome = board.apply_action(Direction::Right).unwrap();

        assert_eq!(outcome, StepOutcome::Shrank);
        assert_eq!(board.length(), 3);
        assert_eq!(board.snake().iter().copied().collect::<Vec<_>>(), vec![(5, 3), (5, 4), (5, 5)]);
        assert_ne!(board.cell((5, 1)), Some(Cell::Tail));
        assert_ne!(board.cell((5, 2)), Some(Cell::Tail));
        assert_consistent(&board);
        assert_items(&board);
    }

    #[test]
    fn test_hazard_leaves_two_segment_snake_with_head_only() {
        let mut board = board_with(&[(5, 4), (5, 5)], [(0, 0), (0, 9)], (5, 6), Direction::Right);

        let outcome = board.apply_action(Direction::Right).unwrap();

        assert_eq!(outcome, StepOutcome::Shrank);
        assert_eq!(board.length(), 1);
        assert_eq!(board.head(), (5, 6));
        assert_eq!(board.tail(), (5, 6));
        assert_consistent(&board);
        assert_items(&board);
    }

    #[test]
    fn test_hazard_starves_single_segment() {
        let mut board = board_with(&[(5, 5)], [(0, 0), (0, 9)], (5, 6), Direction::Right);

        let outcome = board.apply_action(Direction::Right).unwrap();

        assert_eq!(outcome, StepOutcome::Died(Death::Starvation));
        assert_eq!(board.hazard(), (5, 6));
        assert_eq!(board.cell((5, 6)), Some(Cell::Hazard));
        assert_eq!(board.head(), (5, 5));
    }

    #[test]
    fn test_same_seed_same_trace() {
        let actions = [0usize, 1, 1, 2, 3, 3, 0, 2, 2, 1, 0, 3];

        let trace = |seed: u64| {
            let mut board = Board::with_seed(10, 10, seed).unwrap();
            let mut frames = vec![board.cells().to_vec()];
            for &a in actions.iter().cycle().take(200) {
                let outcome = board.apply_action(Direction::ALL[a]).unwrap();
                if outcome.is_terminal() {
                    board.reset().unwrap();
                }
                frames.push(board.cells().to_vec());
            }
            frames
        };

        assert_eq!(trace(42), trace(42));
        assert_ne!(trace(42), trace(43));
    }

    #[test]
    fn test_invariants_under_random_play() {
        let mut board = Board::with_seed(8, 8, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..5000 {
            let direction = Direction::ALL[rng.random_range(0..4)];
            let predicted = board.would_die(direction);
            let outcome = board.apply_action(direction).unwrap();
            assert_eq!(predicted, outcome.is_terminal());

            if outcome.is_terminal() {
                board.reset().unwrap();
            }
            assert_consistent(&board);
            assert_items(&board);
        }
    }

    #[test]
    fn test_reset_replaces_everything() {
        let mut board = board_with(&[(5, 1), (5, 2), (5, 3), (5, 4), (5, 5)], [(0, 0), (0, 9)], (9, 9), Direction::Right);
        board.apply_action(Direction::Up).unwrap();
        board.apply_action(Direction::Right).unwrap();

        board.reset().unwrap();

        assert!(board.alive());
        assert_eq!(board.length(), INITIAL_LENGTH);
        assert_consistent(&board);
        assert_items(&board);
    }

    #[test]
    fn test_vision_shows_walls_on_head_cross() {
        let board = board_with(&[(0, 1), (0, 2), (0, 3)], [(0, 7), (9, 9)], (5, 3), Direction::Right);
        let vision = board.vision();
        let rows: Vec<&str> = vision.lines().collect();

        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0], "    W       ");
        assert_eq!(rows[1], "W.TTH...F..W");
        assert_eq!(rows[6].chars().nth(4), Some('X'));
    }
}
