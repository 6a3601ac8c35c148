//! Board featurization. Every encoder casts rays from the head and, per ray,
//! records what stopped it (obstacle, food, hazard) and how far it got,
//! normalized by the longer board side.

use clap::ValueEnum;
use serde::{Serialize, Deserialize};
use crate::game::{Board, Cell, Direction};

const VALUES_PER_RAY: usize = 4;

pub trait StateEncoder {
    fn input_size(&self) -> usize;
    fn action_count(&self) -> usize;
    fn encode(&self, board: &Board) -> Vec<f32>;
    /// Absolute direction for `action`, `None` when out of range.
    fn direction(&self, heading: Direction, action: usize) -> Option<Direction>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum EncoderKind {
    /// 4 absolute rays, actions are left/up/right/down
    #[default]
    Rays,
    /// 3 rays relative to the heading, actions are turn left/straight/turn right
    RelativeRays,
}

impl EncoderKind {
    pub fn build(self) -> Box<dyn StateEncoder> {
        match self {
            EncoderKind::Rays => Box::new(RayEncoder),
            EncoderKind::RelativeRays => Box::new(RelativeRayEncoder),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RayEncoder;

impl StateEncoder for RayEncoder {
    fn input_size(&self) -> usize {
        Direction::ALL.len() * VALUES_PER_RAY
    }

    fn action_count(&self) -> usize {
        Direction::ALL.len()
    }

    fn encode(&self, board: &Board) -> Vec<f32> {
        Direction::ALL.iter().flat_map(|&d| cast_ray(board, d)).collect()
    }

    fn direction(&self, _heading: Direction, action: usize) -> Option<Direction> {
        Direction::from_index(action)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeRayEncoder;

impl RelativeRayEncoder {
    fn rays(heading: Direction) -> [Direction; 3] {
        [heading.turn_left(), heading, heading.turn_right()]
    }
}

impl StateEncoder for RelativeRayEncoder {
    fn input_size(&self) -> usize {
        3 * VALUES_PER_RAY
    }

    fn action_count(&self) -> usize {
        3
    }

    fn encode(&self, board: &Board) -> Vec<f32> {
        Self::rays(board.heading()).iter().flat_map(|&d| cast_ray(board, d)).collect()
    }

    fn direction(&self, heading: Direction, action: usize) -> Option<Direction> {
        Self::rays(heading).get(action).copied()
    }
}

/// [obstacle, food, hazard, distance]. The tail endpoint does not stop a ray
/// since it moves out of the way on the next step.
fn cast_ray(board: &Board, direction: Direction) -> [f32; VALUES_PER_RAY] {
    let (dy, dx) = direction.delta();
    let tail = board.tail();
    let scale = board.height().max(board.width()) as f32;

    let mut features = [0.0; VALUES_PER_RAY];
    let mut pos = board.head();
    let mut steps = 0;

    loop {
        pos = (pos.0 + dy, pos.1 + dx);
        let hit = match board.cell(pos) {
            None => Some(0),
            Some(Cell::Tail | Cell::Head) if pos != tail => Some(0),
            Some(Cell::Food) => Some(1),
            Some(Cell::Hazard) => Some(2),
            _ => None,
        };
        if let Some(slot) = hit {
            features[slot] = 1.0;
            break;
        }
        steps += 1;
    }

    features[3] = steps as f32 / scale;
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_approx_eq(a: &[f32], b: &[f32]) {
        let tolerance = 1e-6;
        assert_eq!(a.len(), b.len(), "vectors have different lengths");
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            assert!((x - y).abs() < tolerance, "mismatch at index {}: {} vs {}", i, x, y);
        }
    }

    // two-segment snake heading up, tail right below the head
    fn fixture() -> Board {
        Board::from_parts(10, 10, &[(5, 5), (4, 5)], [(1, 5), (9, 0)], (4, 8), 0).unwrap()
    }

    //    0 1 2 3 4 5 6 7 8 9
    // 0 |. . . . . . . . . .|
    // 1 |. . . . . F . . . .|
    // 2 |. . . . . . . . . .|
    // 3 |. . . . . . . . . .|
    // 4 |. T T T T H . . X .|
    // 5 |. . . . . . . . . .|
    // ...
    // 9 |F . . . . . . . . .|
    #[test]
    fn test_ray_encoder_layout() {
        let board = Board::from_parts(
            10, 10,
            &[(4, 1), (4, 2), (4, 3), (4, 4), (4, 5)],
            [(1, 5), (9, 0)],
            (4, 8),
            0,
        ).unwrap();

        let state = RayEncoder.encode(&board);

        assert_eq!(state.len(), 16);
        assert_vec_approx_eq(&state, &[
            // left: body right next to the head
            1.0, 0.0, 0.0, 0.0,
            // up: food behind two empty cells
            0.0, 1.0, 0.0, 0.2,
            // right: hazard after two empty cells
            0.0, 0.0, 1.0, 0.2,
            // down: wall after five empty cells
            1.0, 0.0, 0.0, 0.5,
        ]);
    }

    #[test]
    fn test_tail_endpoint_does_not_block() {
        let board = fixture();

        let state = RayEncoder.encode(&board);

        // looking down passes over the tail at (5, 5) and reaches the wall
        assert_vec_approx_eq(&state[12..16], &[1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_wall_at_zero_distance() {
        let board = Board::from_parts(10, 10, &[(1, 0), (0, 0)], [(5, 5), (9, 9)], (7, 7), 0).unwrap();

        let state = RayEncoder.encode(&board);

        assert_vec_approx_eq(&state[0..4], &[1.0, 0.0, 0.0, 0.0]);
        assert_vec_approx_eq(&state[4..8], &[1.0, 0.0, 0.0, 0.0]);
        assert!(state.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_distance_uses_longer_side() {
        let board = Board::from_parts(5, 20, &[(2, 0), (2, 1)], [(0, 0), (4, 19)], (0, 19), 0).unwrap();

        let state = RayEncoder.encode(&board);

        // right: 18 empty cells to the wall on a 20-wide board
        assert_vec_approx_eq(&state[8..12], &[1.0, 0.0, 0.0, 0.9]);
    }

    #[test]
    fn test_relative_rays_follow_heading() {
        let board = fixture();
        assert_eq!(board.heading(), Direction::Up);

        let absolute = RayEncoder.encode(&board);
        let relative = RelativeRayEncoder.encode(&board);

        assert_eq!(relative.len(), 12);
        // left of up is left, straight is up, right of up is right
        assert_vec_approx_eq(&relative[0..4], &absolute[0..4]);
        assert_vec_approx_eq(&relative[4..8], &absolute[4..8]);
        assert_vec_approx_eq(&relative[8..12], &absolute[8..12]);
    }

    #[test]
    fn test_action_mapping() {
        assert_eq!(RayEncoder.direction(Direction::Down, 0), Some(Direction::Left));
        assert_eq!(RayEncoder.direction(Direction::Down, 3), Some(Direction::Down));
        assert_eq!(RayEncoder.direction(Direction::Down, 4), None);

        assert_eq!(RelativeRayEncoder.direction(Direction::Right, 0), Some(Direction::Up));
        assert_eq!(RelativeRayEncoder.direction(Direction::Right, 1), Some(Direction::Right));
        assert_eq!(RelativeRayEncoder.direction(Direction::Right, 2), Some(Direction::Down));
        assert_eq!(RelativeRayEncoder.direction(Direction::Right, 3), None);
    }

    #[test]
    fn test_kinds_build_matching_encoders() {
        let rays = EncoderKind::Rays.build();
        assert_eq!((rays.input_size(), rays.action_count()), (16, 4));

        let relative = EncoderKind::RelativeRays.build();
        assert_eq!((relative.input_size(), relative.action_count()), (12, 3));
    }
}
