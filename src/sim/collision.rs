//! Swept collision and reflection for one tick of ball motion
//!
//! The ball is treated as a point swept along its displacement, extended by
//! its radius. Only the nearest hit is resolved per tick; the leftover travel
//! continues along the reflected direction.

use glam::Vec2;

use super::arena::{Collider, ColliderKind};
use super::events::EffectCue;
use super::modifiers::Modifiers;
use super::state::Ball;
use super::volume::{Ray, RayHit, VolumeId, VolumeProvider};
use crate::consts::BOOST_MULTIPLIER;

/// The contact resolved during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub volume: VolumeId,
    pub kind: ColliderKind,
    pub point: Vec2,
    pub normal: Vec2,
    /// Speed was multiplied by the boost factor
    pub boosted: bool,
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Nearest hit; on equal distance the earliest in the slice wins
pub fn nearest_hit(hits: &[RayHit]) -> Option<RayHit> {
    hits.iter().fold(None, |best: Option<RayHit>, hit| match best {
        Some(b) if b.distance <= hit.distance => Some(b),
        _ => Some(*hit),
    })
}

/// Move the ball for one tick, resolving at most one collision
///
/// `boost_held` is sampled per side at the moment of contact. Cues for the
/// impact, boost and shield changes are appended to `cues`.
pub fn resolve_motion<P: VolumeProvider + ?Sized>(
    ball: &mut Ball,
    delta_factor: f32,
    colliders: &[Collider],
    provider: &mut P,
    modifiers: &mut Modifiers,
    boost_held: [bool; 2],
    cues: &mut Vec<EffectCue>,
) -> Option<Contact> {
    let displacement = ball.vel * delta_factor;
    let travel = displacement.length();
    if travel <= 0.0 || !travel.is_finite() {
        return None;
    }

    let reach = travel + ball.radius;
    let ray = Ray::new(ball.pos, displacement / travel, reach);
    let candidates: Vec<VolumeId> = colliders.iter().map(|c| c.id).collect();
    let hits = provider.cast_ray(&ray, &candidates);

    let Some(hit) = nearest_hit(&hits).filter(|h| h.distance <= reach) else {
        ball.pos += displacement;
        return None;
    };
    let Some(collider) = colliders.iter().find(|c| c.id == hit.volume) else {
        // Provider reported a volume we never asked about
        ball.pos += displacement;
        return None;
    };

    let moved = (hit.distance - ball.radius).max(0.0);
    ball.pos = ray.at(moved);
    ball.vel = reflect_velocity(ball.vel, hit.normal);

    let mut boosted = false;
    match collider.kind {
        ColliderKind::Shield(side) => {
            cues.extend(modifiers.on_shield_hit(side, provider));
        }
        ColliderKind::Paddle(side) if boost_held[side.index()] => {
            ball.vel *= BOOST_MULTIPLIER;
            boosted = true;
            cues.push(modifiers.on_boosted_hit());
            cues.push(EffectCue::PaddleFlash { side });
        }
        _ => {}
    }

    let leftover = (travel - moved).max(0.0);
    ball.pos += ball.vel.normalize_or_zero() * leftover;

    cues.push(EffectCue::Impact { point: hit.point });

    Some(Contact {
        volume: hit.volume,
        kind: collider.kind,
        point: hit.point,
        normal: hit.normal,
        boosted,
    })
}
