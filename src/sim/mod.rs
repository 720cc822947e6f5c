//! Deterministic match simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only moves through `step()`
//! - Seeded RNG only
//! - Stable collider order
//! - No rendering or platform dependencies; geometry goes through a
//!   [`VolumeProvider`]

pub mod arena;
pub mod collision;
pub mod events;
pub mod modifiers;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod volume;

pub use arena::{Arena, ArenaLayout, Collider, ColliderKind};
pub use collision::{Contact, reflect_velocity, resolve_motion};
pub use events::{EffectCue, GameEvent, MatchResult, TickReport};
pub use modifiers::{Boost, Modifiers, Shield};
pub use schedule::{Scheduler, TimerHandle};
pub use state::{Ball, MatchConfig, MatchPhase, Paddle, PaddleLimits, Score};
pub use tick::{MatchSession, TimerPurpose};
pub use volume::{Aabb, Ray, RayHit, VolumeId, VolumeProvider, VolumeRegistry};
