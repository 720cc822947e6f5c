//! Match state and core simulation types

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::volume::VolumeId;
use crate::Side;
use crate::consts::*;
use crate::settings::MatchSettings;

/// Lifecycle phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Ball at center, waiting for the start signal
    AwaitingStart,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// A point was just scored; inputs are locked until the next rally
    ScoringTransition,
    /// Win target reached
    Ended,
}

impl MatchPhase {
    /// Only Playing runs physics, moves paddles and accepts boost/shield
    pub fn is_live(&self) -> bool {
        matches!(self, MatchPhase::Playing)
    }
}

/// The ball. Position is on the floor plane; height is not simulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
        }
    }
}

impl Ball {
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Recenter and pick a diagonal serve with random signs
    pub fn serve(&mut self, rng: &mut Pcg32, speed: f32) {
        let sx = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
        let sy = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
        self.pos = Vec2::ZERO;
        self.vel = Vec2::new(sx * SERVE_X, sy * SERVE_Y).normalize() * speed;
    }
}

/// Range a paddle center may occupy along its movement axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleLimits {
    pub lower: f32,
    pub upper: f32,
}

impl PaddleLimits {
    #[inline]
    pub fn clamp(&self, y: f32) -> f32 {
        y.clamp(self.lower, self.upper)
    }
}

/// A player's paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    pub volume: VolumeId,
    /// Fixed x position
    pub x: f32,
    /// Position along the movement axis
    pub y: f32,
    pub half_extents: Vec2,
    pub limits: PaddleLimits,
}

impl Paddle {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Move by `direction * PADDLE_SPEED * delta_factor`, clamped to the limits
    pub fn move_by(&mut self, direction: f32, delta_factor: f32) {
        self.y = self.limits.clamp(self.y + direction * PADDLE_SPEED * delta_factor);
    }

    pub fn recenter(&mut self) {
        self.y = self.limits.clamp(0.0);
    }
}

/// Points per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub one: u32,
    pub two: u32,
}

impl Score {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::One => self.one,
            Side::Two => self.two,
        }
    }

    pub fn increment(&mut self, side: Side) -> u32 {
        let points = match side {
            Side::One => &mut self.one,
            Side::Two => &mut self.two,
        };
        *points += 1;
        *points
    }

    pub fn winner(&self, win_target: u32) -> Option<Side> {
        if self.one >= win_target {
            Some(Side::One)
        } else if self.two >= win_target {
            Some(Side::Two)
        } else {
            None
        }
    }
}

/// Everything needed to set up a match session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Display names for side One and side Two
    pub names: [String; 2],
    pub settings: MatchSettings,
    /// Seed for serve directions
    pub seed: u64,
}

impl MatchConfig {
    pub fn new(
        name1: impl Into<String>,
        name2: impl Into<String>,
        settings: MatchSettings,
    ) -> Self {
        Self {
            names: [name1.into(), name2.into()],
            settings,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn name(&self, side: Side) -> &str {
        &self.names[side.index()]
    }

    pub fn rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paddle() -> Paddle {
        Paddle {
            side: Side::One,
            volume: VolumeId(0),
            x: PADDLE_DISTANCE,
            y: 0.0,
            half_extents: Vec2::new(PADDLE_HALF_WIDTH, PADDLE_HALF_DEPTH),
            limits: PaddleLimits {
                lower: -4.95,
                upper: 4.95,
            },
        }
    }

    #[test]
    fn test_paddle_clamps_to_limits() {
        let mut paddle = paddle();
        for _ in 0..200 {
            paddle.move_by(1.0, 1.0);
        }
        assert!((paddle.y - 4.95).abs() < 1e-5);
        for _ in 0..200 {
            paddle.move_by(-1.0, 2.0);
        }
        assert!((paddle.y + 4.95).abs() < 1e-5);
        paddle.recenter();
        assert_eq!(paddle.y, 0.0);
    }

    #[test]
    fn test_paddle_speed_scales_with_delta() {
        let mut paddle = paddle();
        paddle.move_by(1.0, 2.0);
        assert!((paddle.y - 2.0 * PADDLE_SPEED).abs() < 1e-6);
    }

    #[test]
    fn test_serve_is_deterministic_and_has_requested_speed() {
        let config = MatchConfig::new("a", "b", MatchSettings::default()).with_seed(42);
        let mut rng1 = config.rng();
        let mut rng2 = config.rng();
        let mut b1 = Ball::default();
        let mut b2 = Ball::default();
        b1.serve(&mut rng1, 0.16);
        b2.serve(&mut rng2, 0.16);
        assert_eq!(b1, b2);
        assert!((b1.speed() - 0.16).abs() < 1e-6);
        assert_eq!(b1.pos, Vec2::ZERO);
        assert!(b1.vel.x.abs() > b1.vel.y.abs());
    }

    #[test]
    fn test_score_winner() {
        let mut score = Score::default();
        assert_eq!(score.increment(Side::Two), 1);
        assert_eq!(score.winner(3), None);
        score.increment(Side::Two);
        score.increment(Side::Two);
        assert_eq!(score.winner(3), Some(Side::Two));
        assert_eq!(score.get(Side::One), 0);
    }
}
