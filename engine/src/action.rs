//! Action framework.
//!
//! Actions live in the owning entity's action list. To run one, the turn
//! machine clones it out into the current-action slot, drives `maintain`
//! against the whole game state, and writes it back when it completes.
//! Execution requests (`ActionExec`) are plain data so they can cross the
//! script channel and be replayed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    actions::{Interact, InteractExec, Summon, SummonExec},
    EntityId, Game,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MaintenanceStatus {
    InProgress,
    Complete,
    /// A pause point where the haunt side may inject a response action.
    CheckForInterrupts,
}

/// Pointer input forwarded to a prepped action, in house-global float
/// coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Input {
    Hover(Vec2),
    Press(Vec2),
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputResult {
    Ignored,
    /// Input was used for targeting but did not commit the action.
    Consumed,
    /// Input committed the action; run this.
    Exec(ActionExec),
}

/// One executable ability of an entity.
pub trait Action {
    fn name(&self) -> &str;
    fn icon(&self) -> &str;
    fn ap_cost(&self) -> i32;

    /// Could this action ever fire for this entity right now, ignoring
    /// targeting? Used to decide whether an entity still has moves left.
    fn readyable(&self, g: &Game, ent: EntityId) -> bool;

    /// Are there valid targets available? Implies `readyable`.
    fn preppable(&self, g: &Game, ent: EntityId) -> bool;

    /// Enter targeting mode, caching valid targets and setting highlight
    /// state. Returns false when there is nothing to target.
    fn prep(&mut self, g: &mut Game, ent: EntityId) -> bool;

    fn handle_input(&mut self, g: &Game, input: Input) -> InputResult;

    /// Drive the action forward by `dt` milliseconds. `exec` is passed on
    /// the first call only and carries the committed targeting data.
    fn maintain(
        &mut self,
        g: &mut Game,
        dt: i64,
        exec: Option<&ActionExec>,
    ) -> MaintenanceStatus;

    /// Leave targeting mode and clear any transient state. Also called
    /// after completion before the action is stored back.
    fn cancel(&mut self, g: &mut Game);

    fn interruptible(&self) -> bool {
        true
    }
}

/// Concrete action dispatch. Serializes with the entity that owns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AnyAction {
    Interact(Interact),
    Summon(Summon),
}

impl AnyAction {
    fn inner(&self) -> &dyn Action {
        match self {
            AnyAction::Interact(a) => a,
            AnyAction::Summon(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Action {
        match self {
            AnyAction::Interact(a) => a,
            AnyAction::Summon(a) => a,
        }
    }
}

impl Action for AnyAction {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn icon(&self) -> &str {
        self.inner().icon()
    }

    fn ap_cost(&self) -> i32 {
        self.inner().ap_cost()
    }

    fn readyable(&self, g: &Game, ent: EntityId) -> bool {
        self.inner().readyable(g, ent)
    }

    fn preppable(&self, g: &Game, ent: EntityId) -> bool {
        self.inner().preppable(g, ent)
    }

    fn prep(&mut self, g: &mut Game, ent: EntityId) -> bool {
        self.inner_mut().prep(g, ent)
    }

    fn handle_input(&mut self, g: &Game, input: Input) -> InputResult {
        self.inner_mut().handle_input(g, input)
    }

    fn maintain(
        &mut self,
        g: &mut Game,
        dt: i64,
        exec: Option<&ActionExec>,
    ) -> MaintenanceStatus {
        self.inner_mut().maintain(g, dt, exec)
    }

    fn cancel(&mut self, g: &mut Game) {
        self.inner_mut().cancel(g)
    }

    fn interruptible(&self) -> bool {
        self.inner().interruptible()
    }
}

/// A committed request to run one action of one entity. Everything needed
/// to execute is in here, so execs can come from input handling, from AI
/// or from the script channel and be treated identically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionExec {
    Interact(InteractExec),
    Summon(SummonExec),
}

impl ActionExec {
    pub fn entity(&self) -> EntityId {
        match self {
            ActionExec::Interact(e) => e.ent,
            ActionExec::Summon(e) => e.ent,
        }
    }

    pub fn action_index(&self) -> usize {
        match self {
            ActionExec::Interact(e) => e.action_index,
            ActionExec::Summon(e) => e.action_index,
        }
    }

    /// Stamp the owning slot index onto an exec built during targeting,
    /// where the action does not know its own position in the list.
    pub(crate) fn set_action_index(&mut self, index: usize) {
        match self {
            ActionExec::Interact(e) => e.action_index = index,
            ActionExec::Summon(e) => e.action_index = index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::ivec2;

    #[test]
    fn exec_serialization_is_tagged() {
        let exec = ActionExec::Summon(SummonExec {
            ent: EntityId(3),
            action_index: 1,
            pos: ivec2(7, 8),
        });
        let json = serde_json::to_string(&exec).unwrap();
        assert!(json.contains("\"kind\":\"summon\""));
        let back: ActionExec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, exec);
        assert_eq!(back.entity(), EntityId(3));
        assert_eq!(back.action_index(), 1);
    }
}
