//! Map layouts and the collidable volumes built from them

use glam::Vec2;

use super::state::{Paddle, PaddleLimits};
use super::volume::{VolumeId, VolumeProvider};
use crate::Side;
use crate::consts::*;
use crate::settings::MapKey;

/// Large maps scale the default layout by these factors
const LARGE_DISTANCE_SCALE: f32 = 2.3;
const LARGE_PADDLE_DEPTH_SCALE: f32 = 1.5;
const LARGE_WALL_SCALE: f32 = 2.0;

/// Mid-field walls on the obstacles map
const OBSTACLE_HALF_EXTENTS: Vec2 = Vec2::new(6.0, 0.1);
/// Obstacle offset as a fraction of the wall distance
const OBSTACLE_OFFSET_RATIO: f32 = 0.4;

/// Geometry for one map, before any volumes exist
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaLayout {
    pub map: MapKey,
    pub paddle_distance: f32,
    pub paddle_half_extents: Vec2,
    pub wall_distance: f32,
    pub wall_half_extents: Vec2,
    /// Obstacle centers and half extents
    pub obstacles: Vec<(Vec2, Vec2)>,
    pub shield_half_extents: Vec2,
}

impl ArenaLayout {
    pub fn for_map(map: MapKey) -> Self {
        let base = Self {
            map,
            paddle_distance: PADDLE_DISTANCE,
            paddle_half_extents: Vec2::new(PADDLE_HALF_WIDTH, PADDLE_HALF_DEPTH),
            wall_distance: WALL_DISTANCE,
            wall_half_extents: Vec2::new(WALL_HALF_LENGTH, WALL_HALF_DEPTH),
            obstacles: Vec::new(),
            shield_half_extents: Vec2::new(SHIELD_HALF_WIDTH, SHIELD_HALF_DEPTH),
        };

        match map {
            MapKey::Default => base,
            MapKey::Large => base.scaled_up(),
            MapKey::Obstacles => {
                let mut layout = base.scaled_up();
                let offset = layout.wall_distance * OBSTACLE_OFFSET_RATIO;
                layout.obstacles = vec![
                    (Vec2::new(0.0, -offset), OBSTACLE_HALF_EXTENTS),
                    (Vec2::new(0.0, offset), OBSTACLE_HALF_EXTENTS),
                ];
                layout
            }
        }
    }

    fn scaled_up(mut self) -> Self {
        self.paddle_distance *= LARGE_DISTANCE_SCALE;
        self.paddle_half_extents.y *= LARGE_PADDLE_DEPTH_SCALE;
        self.wall_distance *= LARGE_WALL_SCALE;
        self.wall_half_extents.x *= LARGE_WALL_SCALE;
        self
    }

    /// |x| beyond which the ball is out
    pub fn goal_line(&self) -> f32 {
        self.paddle_distance + GOAL_MARGIN
    }

    pub fn paddle_x(&self, side: Side) -> f32 {
        side.sign() * self.paddle_distance
    }

    /// Shield x position: outward from the paddle, toward the opponent
    pub fn shield_x(&self, side: Side) -> f32 {
        let offset = self.paddle_half_extents.x + self.shield_half_extents.x + SHIELD_GAP;
        self.paddle_x(side) - side.sign() * offset
    }
}

/// What a collidable volume is in gameplay terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    Paddle(Side),
    Wall,
    Obstacle,
    Shield(Side),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collider {
    pub id: VolumeId,
    pub kind: ColliderKind,
}

/// Volumes for one match
#[derive(Debug, Clone)]
pub struct Arena {
    pub layout: ArenaLayout,
    pub paddles: [Paddle; 2],
    /// Top wall first (negative y)
    pub walls: [VolumeId; 2],
    pub obstacles: Vec<VolumeId>,
    /// Shield volumes, created disabled
    pub shields: [VolumeId; 2],
}

impl Arena {
    pub fn build<P: VolumeProvider + ?Sized>(map: MapKey, provider: &mut P) -> Self {
        let layout = ArenaLayout::for_map(map);

        let walls = [
            provider.create_box(Vec2::new(0.0, -layout.wall_distance), layout.wall_half_extents),
            provider.create_box(Vec2::new(0.0, layout.wall_distance), layout.wall_half_extents),
        ];

        let obstacles = layout
            .obstacles
            .iter()
            .map(|&(center, half)| provider.create_box(center, half))
            .collect();

        let paddles = Side::BOTH.map(|side| {
            let x = layout.paddle_x(side);
            let volume = provider.create_box(Vec2::new(x, 0.0), layout.paddle_half_extents);
            Paddle {
                side,
                volume,
                x,
                y: 0.0,
                half_extents: layout.paddle_half_extents,
                limits: paddle_limits(provider, walls, layout.paddle_half_extents.y),
            }
        });

        let shields = Side::BOTH.map(|side| {
            let id = provider.create_box(
                Vec2::new(layout.shield_x(side), 0.0),
                layout.shield_half_extents,
            );
            provider.set_enabled(id, false);
            id
        });

        log::debug!(
            "Built {} arena: paddles at ±{}, walls at ±{}, {} obstacles",
            map.as_str(),
            layout.paddle_distance,
            layout.wall_distance,
            layout.obstacles.len()
        );

        Self {
            layout,
            paddles,
            walls,
            obstacles,
            shields,
        }
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        &self.paddles[side.index()]
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        &mut self.paddles[side.index()]
    }

    /// Push paddle positions to the provider
    pub fn sync_paddles<P: VolumeProvider + ?Sized>(&self, provider: &mut P) {
        for paddle in &self.paddles {
            provider.set_center(paddle.volume, paddle.center());
        }
    }

    /// Collidable volumes in resolution order: paddles, walls, obstacles,
    /// then whichever shields are active
    pub fn colliders(&self, shields_active: [bool; 2]) -> Vec<Collider> {
        let mut colliders = Vec::with_capacity(6 + self.obstacles.len());
        for paddle in &self.paddles {
            colliders.push(Collider {
                id: paddle.volume,
                kind: ColliderKind::Paddle(paddle.side),
            });
        }
        colliders.extend(self.walls.iter().map(|&id| Collider {
            id,
            kind: ColliderKind::Wall,
        }));
        colliders.extend(self.obstacles.iter().map(|&id| Collider {
            id,
            kind: ColliderKind::Obstacle,
        }));
        for side in Side::BOTH {
            if shields_active[side.index()] {
                colliders.push(Collider {
                    id: self.shields[side.index()],
                    kind: ColliderKind::Shield(side),
                });
            }
        }
        colliders
    }

    pub fn dispose<P: VolumeProvider + ?Sized>(self, provider: &mut P) {
        let ids = self
            .paddles
            .iter()
            .map(|p| p.volume)
            .chain(self.walls)
            .chain(self.obstacles)
            .chain(self.shields);
        for id in ids {
            provider.dispose(id);
        }
    }
}

/// Paddle travel range from the wall bounds. Falls back to the layout when
/// the provider cannot report a wall.
fn paddle_limits<P: VolumeProvider + ?Sized>(
    provider: &P,
    walls: [VolumeId; 2],
    paddle_half_depth: f32,
) -> PaddleLimits {
    match (provider.bounds(walls[0]), provider.bounds(walls[1])) {
        (Some(top), Some(bottom)) => PaddleLimits {
            lower: top.center.y + top.half_extents.y + paddle_half_depth,
            upper: bottom.center.y - bottom.half_extents.y - paddle_half_depth,
        },
        _ => {
            log::warn!("Wall bounds unavailable, paddles are unclamped");
            PaddleLimits {
                lower: f32::NEG_INFINITY,
                upper: f32::INFINITY,
            }
        }
    }
}
