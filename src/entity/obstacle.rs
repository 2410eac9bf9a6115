use super::Level;
use crate::engine::{Rect, Size, Surface};
use rand::Rng;

// obstacle consts
const SPEED: f64 = 5.0;
// obstacles never poke higher than this
const MIN_TOP: f64 = 200.0;
const MIN_WIDTH: f64 = 20.0;
const MAX_WIDTH: f64 = 70.0;
const TOP_BAR_HEIGHT: f64 = 10.0;

/// Ground spike scrolling right to left.
/// Removal once off screen is up to whoever owns the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    bounding_box: Rect,
}

impl Obstacle {
    pub fn new(bounding_box: Rect) -> Self {
        Obstacle { bounding_box }
    }

    pub fn update(&mut self) {
        self.bounding_box.position.x -= SPEED;
    }

    pub fn draw(&self, surface: &impl Surface, color: &str) {
        surface.fill_rect(&self.bounding_box, color);
    }

    pub fn bounding_box(&self) -> &Rect {
        &self.bounding_box
    }

    /// right edge at or past the left edge of the visible area
    pub fn is_off_screen(&self) -> bool {
        self.bounding_box.right() <= 0.0
    }
}

/// Static bar along the top of the visible area
pub fn top_bar(bounds: Size) -> Rect {
    Rect::new_from_x_y(0.0, 0.0, bounds.width, TOP_BAR_HEIGHT)
}

/// Whole batch for `level`, generated up front.
/// Obstacle `i` starts at `bounds.width + i * spacing` and always reaches the
/// bottom edge.
pub fn generate<R: Rng + ?Sized>(level: &Level, bounds: Size, rng: &mut R) -> Vec<Obstacle> {
    assert!(
        bounds.height > MIN_TOP,
        "visible area must be taller than {} to place obstacles, got {}",
        MIN_TOP,
        bounds.height
    );
    let spacing = level.spacing();

    (0..level.obstacle_count())
        .map(|i| {
            let x = bounds.width + i as f64 * spacing;
            let y = rng.gen_range(MIN_TOP..bounds.height);
            let width = rng.gen_range(MIN_WIDTH..MAX_WIDTH);
            Obstacle::new(Rect::new_from_x_y(x, y, width, bounds.height - y))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::recording::{DrawCall, RecordingSurface};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BOUNDS: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn first_level_batch() {
        let mut rng = StdRng::seed_from_u64(42);
        let obstacles = generate(&Level::default(), BOUNDS, &mut rng);

        assert_eq!(obstacles.len(), 10);
        for (i, obstacle) in obstacles.iter().enumerate() {
            let rect = obstacle.bounding_box();
            assert_eq!(rect.x(), 800.0 + i as f64 * 500.0);
            assert!((200.0..600.0).contains(&rect.y()), "y = {}", rect.y());
            assert!((20.0..70.0).contains(&rect.width()), "width = {}", rect.width());
            assert_eq!(rect.height(), 600.0 - rect.y());
        }
    }

    #[test]
    fn later_levels_pack_more_obstacles_closer() {
        let mut rng = StdRng::seed_from_u64(42);
        let obstacles = generate(&Level::new(15), BOUNDS, &mut rng);

        assert_eq!(obstacles.len(), 25);
        assert_eq!(obstacles[0].bounding_box().x(), 800.0);
        assert_eq!(obstacles[1].bounding_box().x(), 1100.0);
        assert_eq!(obstacles[24].bounding_box().x(), 800.0 + 24.0 * 300.0);
    }

    #[test]
    fn same_seed_same_batch() {
        let first = generate(&Level::default(), BOUNDS, &mut StdRng::seed_from_u64(9));
        let second = generate(&Level::default(), BOUNDS, &mut StdRng::seed_from_u64(9));
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "taller than")]
    fn too_short_an_area_is_a_bug() {
        let bounds = Size {
            width: 800.0,
            height: 150.0,
        };
        generate(&Level::default(), bounds, &mut StdRng::seed_from_u64(1));
    }

    #[test]
    fn scrolls_left_at_constant_speed() {
        let mut obstacle = Obstacle::new(Rect::new_from_x_y(100.0, 300.0, 30.0, 300.0));
        obstacle.update();
        obstacle.update();
        assert_eq!(obstacle.bounding_box().x(), 90.0);
        assert_eq!(obstacle.bounding_box().y(), 300.0);
    }

    #[test]
    fn off_screen_only_once_the_right_edge_is_gone() {
        assert!(!Obstacle::new(Rect::new_from_x_y(-29.0, 300.0, 30.0, 300.0)).is_off_screen());
        assert!(Obstacle::new(Rect::new_from_x_y(-30.0, 300.0, 30.0, 300.0)).is_off_screen());
        assert!(Obstacle::new(Rect::new_from_x_y(-45.0, 300.0, 30.0, 300.0)).is_off_screen());
    }

    #[test]
    fn top_bar_spans_the_width() {
        assert_eq!(top_bar(BOUNDS), Rect::new_from_x_y(0.0, 0.0, 800.0, 10.0));
    }

    #[test]
    fn draws_its_box() {
        let obstacle = Obstacle::new(Rect::new_from_x_y(10.0, 300.0, 30.0, 300.0));
        let surface = RecordingSurface::default();
        obstacle.draw(&surface, "green");
        assert_eq!(
            surface.calls(),
            vec![DrawCall::FillRect {
                rect: Rect::new_from_x_y(10.0, 300.0, 30.0, 300.0),
                color: "green".to_string(),
            }]
        );
    }
}
