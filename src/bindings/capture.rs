//! Interactive rebinding
//!
//! While a capture is pending the next raw key press is consumed by the
//! editor and never reaches gameplay.

use super::{Action, Conflict, KeyBindings, Slot};
use crate::Side;
use crate::platform::KeyValueStore;

/// Key that aborts a pending capture
pub const CANCEL_CODE: &str = "Escape";

/// What happened to a raw key press offered to the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// No capture pending; the event belongs to gameplay
    NotCapturing,
    /// Capture aborted by the cancel key
    Cancelled,
    /// Code already used by another slot; capture discarded, nothing changed
    Discarded { taken_by: Slot },
    /// Slot rebound to the pressed code
    Assigned { slot: Slot, code: String },
}

impl CaptureOutcome {
    /// Whether the editor swallowed the event
    pub fn consumed(&self) -> bool {
        !matches!(self, CaptureOutcome::NotCapturing)
    }
}

/// Owns the live bindings plus their backing store
#[derive(Debug)]
pub struct BindingEditor<S: KeyValueStore> {
    store: S,
    bindings: KeyBindings,
    pending: Option<Slot>,
    enforce_unique: bool,
}

impl<S: KeyValueStore> BindingEditor<S> {
    /// Load bindings from `store` (defaults when absent or corrupt)
    pub fn new(store: S, enforce_unique: bool) -> Self {
        let bindings = KeyBindings::load(&store);
        Self {
            store,
            bindings,
            pending: None,
            enforce_unique,
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn enforce_unique(&self) -> bool {
        self.enforce_unique
    }

    pub fn set_enforce_unique(&mut self, enforce: bool) {
        self.enforce_unique = enforce;
    }

    /// Slot waiting for a key, if any
    pub fn pending_capture(&self) -> Option<Slot> {
        self.pending
    }

    /// Start capturing for a slot. Replaces any capture already pending.
    pub fn begin_capture(&mut self, side: Side, action: Action) {
        let slot = Slot::new(side, action);
        if let Some(previous) = self.pending.replace(slot) {
            log::debug!("Capture for {} superseded by {}", previous, slot);
        }
    }

    pub fn cancel_capture(&mut self) {
        self.pending = None;
    }

    /// Offer a raw key press to the editor
    pub fn handle_key(&mut self, code: &str) -> CaptureOutcome {
        let Some(slot) = self.pending.take() else {
            return CaptureOutcome::NotCapturing;
        };

        if code == CANCEL_CODE {
            return CaptureOutcome::Cancelled;
        }

        if self.enforce_unique {
            let taken = self
                .bindings
                .slots()
                .find(|(other, bound)| *other != slot && *bound == code)
                .map(|(other, _)| other);
            if let Some(taken_by) = taken {
                log::debug!("{} already bound to {}, capture discarded", code, taken_by);
                return CaptureOutcome::Discarded { taken_by };
            }
        }

        self.bindings.set(slot, code);
        self.persist();
        CaptureOutcome::Assigned {
            slot,
            code: code.to_string(),
        }
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        self.bindings.find_conflicts()
    }

    pub fn reset_side(&mut self, side: Side) {
        self.bindings.reset_side(side);
        self.persist();
    }

    pub fn reset_all(&mut self) {
        self.bindings.reset_all();
        self.persist();
    }

    pub fn swap_sides(&mut self) {
        self.bindings.swap_sides();
        self.persist();
    }

    /// Replace the bindings wholesale and save them
    pub fn replace(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
        self.persist();
    }

    // In-memory state stands even if the write fails
    fn persist(&mut self) {
        if let Err(e) = self.bindings.save(&mut self.store) {
            log::warn!("Failed to save key bindings: {}", e);
        }
    }
}
