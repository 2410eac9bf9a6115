use super::{Level, Shape};
use crate::engine::{Point, Rect, Size, Surface};
use rand::Rng;

// physics consts
const GRAVITY: f64 = 0.8;
const JUMP_SPEED: f64 = -15.0; // negative because top left is origin
const START_X: f64 = 100.0;
const SPAWN_HEIGHT: f64 = 100.0; // spawn this far above the bottom edge
const SIZE: f64 = 40.0;
// degrees per frame, per level index
const ROTATION_PER_LEVEL: f64 = 2.0;

/// Square player box that falls, jumps and spins.
/// Only y moves : the world scrolls past a fixed x.
#[derive(Debug, Clone)]
pub struct Player {
    position: Point,
    size: f64,
    velocity_y: f64,
    // lowest y the top edge can reach
    floor: f64,
    shape: Shape,
    // degrees
    rotation: f64,
    rotation_speed: f64,
}

impl Player {
    pub fn new<R: Rng + ?Sized>(bounds: Size, level: Level, rng: &mut R) -> Self {
        Player {
            position: Point {
                x: START_X,
                y: bounds.height - SPAWN_HEIGHT,
            },
            size: SIZE,
            velocity_y: 0.0,
            floor: bounds.height - SIZE,
            shape: rng.gen(),
            rotation: 0.0,
            rotation_speed: level.index() as f64 * ROTATION_PER_LEVEL,
        }
    }

    /// One frame of motion
    /// - gravity -> velocity, THEN velocity -> position
    /// - resolve against the floor
    /// - spin
    pub fn update(&mut self) {
        self.velocity_y += GRAVITY;
        self.position.y += self.velocity_y;

        if self.position.y > self.floor {
            self.position.y = self.floor;
            self.velocity_y = 0.0;
        }

        self.rotation += self.rotation_speed;
    }

    /// no grounded check : jumping mid-air overrides the current velocity
    pub fn jump(&mut self) {
        self.velocity_y = JUMP_SPEED;
    }

    /// may pick the shape it already has
    pub fn change_shape<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.shape = rng.gen();
    }

    /// Rotates about the box center, the bounding box itself never rotates
    pub fn draw(&self, surface: &impl Surface, color: &str) {
        let half = self.size / 2.0;
        surface.save();
        surface.translate(Point {
            x: self.position.x + half,
            y: self.position.y + half,
        });
        surface.rotate(self.rotation.to_radians());
        surface.translate(Point { x: -half, y: -half });

        match self.shape {
            Shape::Rectangle => {
                surface.fill_rect(&Rect::new_from_x_y(0.0, 0.0, self.size, self.size), color)
            }
            Shape::Circle => surface.fill_circle(Point { x: half, y: half }, half, color),
            Shape::Triangle => surface.fill_polygon(
                &[
                    Point { x: half, y: 0.0 },
                    Point {
                        x: 0.0,
                        y: self.size,
                    },
                    Point {
                        x: self.size,
                        y: self.size,
                    },
                ],
                color,
            ),
        }

        surface.restore();
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(
            self.position,
            Size {
                width: self.size,
                height: self.size,
            },
        )
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity_y
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, y: f64, velocity_y: f64) {
        self.position.y = y;
        self.velocity_y = velocity_y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::recording::{DrawCall, RecordingSurface};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BOUNDS: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    fn player() -> Player {
        Player::new(BOUNDS, Level::default(), &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn spawns_above_the_floor() {
        let player = player();
        assert_eq!(player.position(), Point { x: 100.0, y: 500.0 });
        assert_eq!(player.velocity(), 0.0);
        assert_eq!(player.floor(), 560.0);
        assert_eq!(player.bounding_box(), Rect::new_from_x_y(100.0, 500.0, 40.0, 40.0));
    }

    #[test]
    fn velocity_updates_before_position() {
        let mut player = player();
        player.place(300.0, 2.0);
        player.update();
        assert_relative_eq!(player.velocity(), 2.8, epsilon = 1e-9);
        // moves by the already accelerated velocity
        assert_relative_eq!(player.position().y, 302.8, epsilon = 1e-9);

        player.update();
        assert_relative_eq!(player.velocity(), 3.6, epsilon = 1e-9);
        assert_relative_eq!(player.position().y, 306.4, epsilon = 1e-9);
    }

    #[test]
    fn floor_clamps_position_and_stops_the_fall() {
        for velocity in [0.0, 1.0, 15.0, 100.0] {
            let mut player = player();
            player.place(559.5, velocity);
            player.update();
            assert_eq!(player.position().y, player.floor());
            assert_eq!(player.velocity(), 0.0);
        }
    }

    #[test]
    fn resting_on_the_floor_is_stable() {
        let mut player = player();
        player.place(player.floor(), 0.0);
        for _ in 0..500 {
            player.update();
            assert_eq!(player.position().y, 560.0);
            assert_eq!(player.velocity(), 0.0);
        }
    }

    #[test]
    fn jump_overrides_any_velocity() {
        for velocity in [0.0, 7.5, -3.0, -15.0, -40.0] {
            let mut player = player();
            player.place(200.0, velocity);
            player.jump();
            assert_eq!(player.velocity(), -15.0);
        }
    }

    #[test]
    fn jump_then_fall_back_down() {
        let mut player = player();
        player.place(player.floor(), 0.0);
        player.jump();
        player.update();
        assert!(player.position().y < player.floor());
        for _ in 0..100 {
            player.update();
        }
        assert_eq!(player.position().y, player.floor());
    }

    #[test]
    fn rotation_speed_scales_with_level() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut still = Player::new(BOUNDS, Level::new(0), &mut rng);
        let mut spinning = Player::new(BOUNDS, Level::new(3), &mut rng);
        for _ in 0..10 {
            still.update();
            spinning.update();
        }
        assert_eq!(still.rotation(), 0.0);
        assert_relative_eq!(spinning.rotation(), 60.0);
    }

    #[test]
    fn change_shape_eventually_visits_every_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut player = player();
        let mut seen = vec![player.shape()];
        for _ in 0..100 {
            player.change_shape(&mut rng);
            seen.push(player.shape());
        }
        for shape in Shape::ALL {
            assert!(seen.contains(&shape));
        }
    }

    #[test]
    fn draw_wraps_the_shape_in_a_centered_rotation() {
        let mut player = player();
        player.shape = Shape::Triangle;
        player.rotation = 90.0;
        let surface = RecordingSurface::default();

        player.draw(&surface, "pink");

        let calls = surface.calls();
        assert_eq!(calls.first(), Some(&DrawCall::Save));
        assert_eq!(calls[1], DrawCall::Translate(Point { x: 120.0, y: 520.0 }));
        match calls[2] {
            DrawCall::Rotate(radians) => assert_relative_eq!(radians, std::f64::consts::FRAC_PI_2, epsilon = 1e-9),
            ref other => panic!("expected rotate, got {:?}", other),
        }
        assert_eq!(calls[3], DrawCall::Translate(Point { x: -20.0, y: -20.0 }));
        assert_eq!(
            calls[4],
            DrawCall::FillPolygon {
                points: vec![
                    Point { x: 20.0, y: 0.0 },
                    Point { x: 0.0, y: 40.0 },
                    Point { x: 40.0, y: 40.0 },
                ],
                color: "pink".to_string(),
            }
        );
        assert_eq!(calls.last(), Some(&DrawCall::Restore));
    }

    #[test]
    fn circle_is_inscribed_in_the_box() {
        let mut player = player();
        player.shape = Shape::Circle;
        let surface = RecordingSurface::default();

        player.draw(&surface, "blue");

        assert!(surface.calls().contains(&DrawCall::FillCircle {
            center: Point { x: 20.0, y: 20.0 },
            radius: 20.0,
            color: "blue".to_string(),
        }));
    }
}
