// TABLE:
// ┌──────────────────────────────────────────────────────────────────────┐
// │                          Entity Layout                               │
// ├────────────────┬─────────────────────────────────────────────────────┤
// │ mod.rs         │ Shape variants + Level (difficulty knobs)           │
// │ player.rs      │ falling / jumping / rotating player                 │
// │ obstacle.rs    │ scrolling ground spikes, top bar, batch generator   │
// └────────────────┴─────────────────────────────────────────────────────┘
// - entities only know geometry and a `Surface` to draw on
// - who collides with what and when things get removed is game.rs' job
pub mod obstacle;
pub mod player;

pub use obstacle::Obstacle;
pub use player::Player;

use rand::distributions::{Distribution, Standard};
use rand::Rng;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shape {
    Rectangle,
    Circle,
    Triangle,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Rectangle, Shape::Circle, Shape::Triangle];
}

/// `rng.gen::<Shape>()` picks uniformly among all variants
impl Distribution<Shape> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Shape {
        Shape::ALL[rng.gen_range(0..Shape::ALL.len())]
    }
}

// level consts
const BASE_OBSTACLE_COUNT: usize = 10;
const BASE_SPACING: f64 = 500.0;
const SPACING_STEP: f64 = 20.0;
const MIN_SPACING: f64 = 300.0;

/// Difficulty is a function of the level index alone.
/// Index 0 is the first level, the HUD shows it 1-based.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Level {
    index: u32,
}

impl Level {
    pub fn new(index: u32) -> Self {
        Level { index }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// what the player sees
    pub fn number(&self) -> u32 {
        self.index + 1
    }

    pub fn obstacle_count(&self) -> usize {
        BASE_OBSTACLE_COUNT + self.index as usize
    }

    /// horizontal distance between consecutive obstacles
    pub fn spacing(&self) -> f64 {
        (BASE_SPACING - self.index as f64 * SPACING_STEP).max(MIN_SPACING)
    }
}
