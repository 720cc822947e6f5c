//! Boost and shield modifiers
//!
//! Both are rally-scoped: [`Modifiers::reset_rally`] restores shield hit
//! points and clears the boost counter at the start of every rally.

use glam::Vec2;

use super::arena::{Arena, ArenaLayout};
use super::events::EffectCue;
use super::volume::{VolumeId, VolumeProvider};
use crate::Side;
use crate::consts::*;

/// A deflecting volume in front of a paddle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shield {
    pub side: Side,
    pub volume: VolumeId,
    pub hp: u8,
    /// Out of hit points for the rest of the rally
    pub broken: bool,
    /// Raised and collidable
    pub active: bool,
    /// Let go by its player; stays down until the next rally
    pub spent: bool,
}

impl Shield {
    fn new(side: Side, volume: VolumeId) -> Self {
        Self {
            side,
            volume,
            hp: SHIELD_MAX_HP,
            broken: false,
            active: false,
            spent: false,
        }
    }
}

/// Rally-scoped boost counter. Glow and trail follow the level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Boost {
    pub level: u32,
}

impl Boost {
    pub fn is_visible(&self) -> bool {
        self.level >= BOOST_VISUAL_THRESHOLD
    }

    /// Ball glow intensity
    pub fn glow(&self) -> f32 {
        if !self.is_visible() {
            return 0.0;
        }
        BOOST_GLOW_FACTOR * (self.level * self.level) as f32
    }

    /// Trail intensity in [0, 1)
    pub fn trail(&self) -> f32 {
        if !self.is_visible() {
            return 0.0;
        }
        let level = self.level as f32;
        level / (level + 1.0)
    }
}

/// Shields for both sides plus the shared boost counter
#[derive(Debug, Clone, PartialEq)]
pub struct Modifiers {
    shields: [Shield; 2],
    boost: Boost,
}

impl Modifiers {
    pub fn new(arena: &Arena) -> Self {
        Self {
            shields: Side::BOTH.map(|side| Shield::new(side, arena.shields[side.index()])),
            boost: Boost::default(),
        }
    }

    pub fn shield(&self, side: Side) -> &Shield {
        &self.shields[side.index()]
    }

    pub fn boost(&self) -> Boost {
        self.boost
    }

    pub fn shields_active(&self) -> [bool; 2] {
        self.shields.map(|s| s.active)
    }

    /// Raise a shield once per rally. The caller has already checked the
    /// match is live.
    pub fn request_shield<P: VolumeProvider + ?Sized>(
        &mut self,
        side: Side,
        arena: &Arena,
        provider: &mut P,
    ) -> Option<EffectCue> {
        let shield = &mut self.shields[side.index()];
        if shield.broken || shield.spent || shield.active {
            return None;
        }
        shield.active = true;
        let center = shield_center(&arena.layout, side, arena.paddle(side).y);
        provider.set_center(shield.volume, center);
        provider.set_enabled(shield.volume, true);
        log::debug!("Shield raised for {} ({} hp)", side.as_str(), shield.hp);
        Some(EffectCue::ShieldRaised { side })
    }

    /// Player let go of the shield. It keeps its hit points but cannot be
    /// raised again this rally.
    pub fn release_shield<P: VolumeProvider + ?Sized>(
        &mut self,
        side: Side,
        provider: &mut P,
    ) -> Option<EffectCue> {
        let cue = self.lower(side, provider)?;
        self.shields[side.index()].spent = true;
        Some(cue)
    }

    fn lower<P: VolumeProvider + ?Sized>(
        &mut self,
        side: Side,
        provider: &mut P,
    ) -> Option<EffectCue> {
        let shield = &mut self.shields[side.index()];
        if !shield.active {
            return None;
        }
        shield.active = false;
        provider.set_enabled(shield.volume, false);
        Some(EffectCue::ShieldLowered { side })
    }

    /// Keep active shields in front of their paddles
    pub fn follow_paddles<P: VolumeProvider + ?Sized>(&self, arena: &Arena, provider: &mut P) {
        for shield in self.shields.iter().filter(|s| s.active) {
            let y = arena.paddle(shield.side).y;
            provider.set_center(shield.volume, shield_center(&arena.layout, shield.side, y));
        }
    }

    /// Ball deflected off an active shield
    pub fn on_shield_hit<P: VolumeProvider + ?Sized>(
        &mut self,
        side: Side,
        provider: &mut P,
    ) -> Option<EffectCue> {
        let shield = &mut self.shields[side.index()];
        if !shield.active {
            return None;
        }
        shield.hp = shield.hp.saturating_sub(1);
        if shield.hp > 0 {
            return None;
        }
        shield.broken = true;
        shield.active = false;
        provider.set_enabled(shield.volume, false);
        log::debug!("Shield broken for {}", side.as_str());
        Some(EffectCue::ShieldBroken { side })
    }

    /// Boosted paddle hit
    pub fn on_boosted_hit(&mut self) -> EffectCue {
        self.boost.level += 1;
        EffectCue::BoostChanged {
            level: self.boost.level,
            glow: self.boost.glow(),
        }
    }

    /// Fresh shields and no boost for the next rally
    pub fn reset_rally<P: VolumeProvider + ?Sized>(&mut self, provider: &mut P) {
        for shield in &mut self.shields {
            provider.set_enabled(shield.volume, false);
            *shield = Shield::new(shield.side, shield.volume);
        }
        self.boost = Boost::default();
    }

    /// Lower anything still raised without touching hit points
    pub fn lower_all<P: VolumeProvider + ?Sized>(&mut self, provider: &mut P) -> Vec<EffectCue> {
        Side::BOTH
            .into_iter()
            .filter_map(|side| self.lower(side, provider))
            .collect()
    }
}

fn shield_center(layout: &ArenaLayout, side: Side, paddle_y: f32) -> Vec2 {
    Vec2::new(layout.shield_x(side), paddle_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MapKey;
    use crate::sim::volume::VolumeRegistry;

    fn setup() -> (VolumeRegistry, Arena, Modifiers) {
        let mut registry = VolumeRegistry::new();
        let arena = Arena::build(MapKey::Default, &mut registry);
        let modifiers = Modifiers::new(&arena);
        (registry, arena, modifiers)
    }

    #[test]
    fn test_shield_lifecycle() {
        let (mut registry, arena, mut modifiers) = setup();
        let volume = arena.shields[0];

        assert_eq!(
            modifiers.request_shield(Side::One, &arena, &mut registry),
            Some(EffectCue::ShieldRaised { side: Side::One })
        );
        assert!(registry.is_enabled(volume));
        // Already raised
        assert!(modifiers.request_shield(Side::One, &arena, &mut registry).is_none());

        assert!(modifiers.on_shield_hit(Side::One, &mut registry).is_none());
        assert!(modifiers.on_shield_hit(Side::One, &mut registry).is_none());
        assert_eq!(modifiers.shield(Side::One).hp, 1);
        assert_eq!(
            modifiers.on_shield_hit(Side::One, &mut registry),
            Some(EffectCue::ShieldBroken { side: Side::One })
        );
        let shield = modifiers.shield(Side::One);
        assert!(shield.broken);
        assert!(!shield.active);
        assert!(!registry.is_enabled(volume));

        // Broken for the rest of the rally
        assert!(modifiers.request_shield(Side::One, &arena, &mut registry).is_none());

        modifiers.reset_rally(&mut registry);
        let shield = modifiers.shield(Side::One);
        assert_eq!(shield.hp, SHIELD_MAX_HP);
        assert!(!shield.broken);
        assert!(modifiers.request_shield(Side::One, &arena, &mut registry).is_some());
    }

    #[test]
    fn test_release_keeps_hit_points() {
        let (mut registry, arena, mut modifiers) = setup();
        modifiers.request_shield(Side::Two, &arena, &mut registry);
        modifiers.on_shield_hit(Side::Two, &mut registry);
        assert_eq!(
            modifiers.release_shield(Side::Two, &mut registry),
            Some(EffectCue::ShieldLowered { side: Side::Two })
        );
        assert!(!registry.is_enabled(arena.shields[1]));
        assert_eq!(modifiers.shield(Side::Two).hp, 2);
        assert!(modifiers.release_shield(Side::Two, &mut registry).is_none());
    }

    #[test]
    fn test_released_shield_stays_down_until_next_rally() {
        let (mut registry, arena, mut modifiers) = setup();
        assert!(modifiers.request_shield(Side::One, &arena, &mut registry).is_some());
        modifiers.release_shield(Side::One, &mut registry);
        assert!(modifiers.shield(Side::One).spent);
        assert!(modifiers.request_shield(Side::One, &arena, &mut registry).is_none());
        assert!(!registry.is_enabled(arena.shields[0]));

        // The other side is unaffected
        assert!(modifiers.request_shield(Side::Two, &arena, &mut registry).is_some());

        modifiers.reset_rally(&mut registry);
        assert!(!modifiers.shield(Side::One).spent);
        assert!(modifiers.request_shield(Side::One, &arena, &mut registry).is_some());
    }

    #[test]
    fn test_lower_all_does_not_spend_shields() {
        let (mut registry, arena, mut modifiers) = setup();
        modifiers.request_shield(Side::One, &arena, &mut registry);
        let cues = modifiers.lower_all(&mut registry);
        assert_eq!(cues, vec![EffectCue::ShieldLowered { side: Side::One }]);
        let shield = modifiers.shield(Side::One);
        assert!(!shield.active);
        assert!(!shield.spent);
    }

    #[test]
    fn test_shield_follows_paddle() {
        let (mut registry, mut arena, mut modifiers) = setup();
        modifiers.request_shield(Side::One, &arena, &mut registry);
        arena.paddle_mut(Side::One).y = 2.0;
        modifiers.follow_paddles(&arena, &mut registry);
        let bounds = registry.bounds(arena.shields[0]).expect("shield volume");
        assert_eq!(bounds.center, Vec2::new(arena.layout.shield_x(Side::One), 2.0));
    }

    #[test]
    fn test_boost_levels() {
        let (mut registry, _arena, mut modifiers) = setup();
        assert_eq!(modifiers.boost().glow(), 0.0);
        assert_eq!(modifiers.boost().trail(), 0.0);
        modifiers.on_boosted_hit();
        let cue = modifiers.on_boosted_hit();
        assert_eq!(
            cue,
            EffectCue::BoostChanged {
                level: 2,
                glow: 0.2
            }
        );
        assert!(modifiers.boost().trail() > Boost { level: 1 }.trail());
        modifiers.reset_rally(&mut registry);
        assert_eq!(modifiers.boost().level, 0);
    }
}
