//! Game logic layer: entities, turn structure, visibility and actions.

/// Sight radius entities fall back on when their stats specify none.
pub const DEFAULT_SIGHT: i32 = 4;

/// Milliseconds an entity stays busy per animation it plays.
pub const ANIM_MILLIS: i64 = 500;

mod action;
pub use action::{
    Action, ActionExec, AnyAction, Input, InputResult, MaintenanceStatus,
};

mod actions;
pub use actions::{Interact, InteractExec, Summon, SummonExec};

mod ai;
pub use ai::{ActiveAi, AiReply, AiState};

mod data;
pub use data::{
    ActionDef, Catalog, ConditionDef, EntityDef, Gear, InteractDef, SummonDef,
};

mod entity;
pub use entity::{AnimState, Entity, EntityId, LosCache, Side};

mod game;
pub use game::{Game, LosMode, Purpose};

mod graph;
pub use graph::{CellGraph, Graph, RoomGraph};

mod los;
pub use los::determine_los;

mod script;
pub use script::{
    channels, run_null_script, EngineEvent, ScriptComm, ScriptHandle,
    ScriptReply,
};

mod stats;
pub use stats::{Base, Condition, Dynamic, Kind, Stats};

mod turn;
pub use turn::{ActionState, TurnState};

#[cfg(test)]
mod fixtures;
