//! Central game state.

use anyhow::Result;
use glam::IVec2;
use rand::{rngs::StdRng, SeedableRng};
use util::Grid;
use world::{Floor, HouseDef, LosTexture, LOS_TEXTURE_SIZE};

use crate::{
    ai::{ActiveAi, AiState},
    channels,
    turn::{ActionState, TurnState},
    ActionExec, AnyAction, Catalog, Entity, EntityId, ScriptComm,
    ScriptHandle, Side,
};

/// How a side's fog texture is driven.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum LosMode {
    /// Nothing is visible.
    None,
    /// Everything is visible, fog disabled.
    #[default]
    All,
    /// Merged from the sight fields of the side's entities.
    Entities,
    /// A fixed list of rooms is visible, used by scripted reveals.
    Rooms,
}

/// What the explorers must do to win. The haunt always wins by wiping the
/// explorers out.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Purpose {
    #[default]
    None,
    /// Claim the relic object.
    Relic,
    /// No automatic win, the script decides.
    Mystery,
    /// Interact with every cleanse point.
    Cleanse,
}

/// Per-side visibility state.
pub(crate) struct SideVis {
    pub mode: LosMode,
    /// Room indices for `LosMode::Rooms`.
    pub rooms: Vec<usize>,
    pub tex: LosTexture,
    /// Current-frame merged team sight, before fog smoothing.
    pub merged: Grid<bool>,
}

impl Default for SideVis {
    fn default() -> Self {
        SideVis {
            mode: LosMode::default(),
            rooms: Vec::new(),
            tex: LosTexture::new(),
            merged: Grid::new((LOS_TEXTURE_SIZE, LOS_TEXTURE_SIZE)),
        }
    }
}

/// An action cloned out of its entity while it runs or targets. It is
/// written back into `ent`'s list at `index` when it finishes.
pub(crate) struct Executing {
    pub ent: EntityId,
    pub index: usize,
    pub action: AnyAction,
    /// The committed execution record, absent while only targeting.
    pub exec: Option<ActionExec>,
    /// Whether `maintain` has seen the exec data yet.
    pub started: bool,
}

pub struct Game {
    pub house: HouseDef,
    pub catalog: Catalog,
    pub(crate) ents: Vec<Entity>,
    next_id: u64,
    /// Side controlled by a human, `Side::None` for spectated runs.
    pub human: Side,
    /// Side whose turn it is.
    pub side: Side,
    pub turn: i32,
    pub purpose: Purpose,
    /// Cleanse points not yet handled.
    pub active_cleanses: Vec<EntityId>,
    pub active_relic: Option<EntityId>,
    pub(crate) relic_claimed: bool,
    pub(crate) winner: Option<Side>,
    /// True while the human player may still act this round.
    pub player_active: bool,

    pub(crate) explorer_vis: SideVis,
    pub(crate) haunt_vis: SideVis,

    pub selected: Option<EntityId>,
    pub hovered: Option<EntityId>,

    pub(crate) minion_ai: AiState,
    pub(crate) haunt_ai: AiState,
    pub(crate) explorer_ai: AiState,
    pub(crate) active_ai: ActiveAi,

    pub turn_state: TurnState,
    pub action_state: ActionState,
    pub(crate) current_exec: Option<ActionExec>,
    pub(crate) current_action: Option<Executing>,
    pub(crate) prepping: Option<Executing>,

    pub(crate) comm: ScriptComm,
    removed_drawables: Vec<EntityId>,
    pub(crate) rng: StdRng,
}

impl Game {
    /// Build a game and the endpoint for its scenario script thread. The
    /// house is validated and door pairs are completed before play.
    pub fn new(
        mut house: HouseDef,
        catalog: Catalog,
        human: Side,
    ) -> Result<(Game, ScriptHandle)> {
        house.validate()?;
        house.normalize();
        let (comm, handle) = channels();
        let g = Game {
            house,
            catalog,
            ents: Vec::new(),
            next_id: 0,
            human,
            // The first round transition flips this, explorers act first.
            side: Side::Haunt,
            turn: 0,
            purpose: Purpose::default(),
            active_cleanses: Vec::new(),
            active_relic: None,
            relic_claimed: false,
            winner: None,
            player_active: false,
            explorer_vis: SideVis::default(),
            haunt_vis: SideVis::default(),
            selected: None,
            hovered: None,
            minion_ai: AiState::default(),
            haunt_ai: AiState::default(),
            explorer_ai: AiState::default(),
            active_ai: ActiveAi::default(),
            turn_state: TurnState::Init,
            action_state: ActionState::NoAction,
            current_exec: None,
            current_action: None,
            prepping: None,
            comm,
            removed_drawables: Vec::new(),
            rng: StdRng::from_entropy(),
        };
        // Request the script's init hook; the turn machine sits in Init
        // until it is acknowledged.
        g.comm.send(crate::EngineEvent::Sync);
        Ok((g, handle))
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // Play currently happens on the ground floor.
    pub(crate) fn floor(&self) -> &Floor {
        &self.house.floors[0]
    }

    pub fn ents(&self) -> &[Entity] {
        &self.ents
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.ents.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.ents.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn ent_index(&self, id: EntityId) -> Option<usize> {
        self.ents.iter().position(|e| e.id == id)
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Instantiate a catalog entity into the house. Stats fill to capacity
    /// and gear conditions land before the entity's first round.
    pub fn spawn_at(&mut self, name: &str, pos: IVec2) -> Result<EntityId> {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        let mut ent = self.catalog.make_entity(name, id, pos)?;
        let gear_condition = self
            .catalog
            .entities
            .get(name)
            .and_then(|d| d.gear.as_ref())
            .map(|g| g.condition.clone());
        if let Some(stats) = &mut ent.stats {
            if let Some(cname) = gear_condition {
                if !cname.is_empty() {
                    stats.apply_condition(
                        self.catalog.condition_def(&cname)?.clone(),
                    );
                }
            }
            stats.on_begin();
        }
        log::info!("spawning {name} at {pos}");
        self.ents.push(ent);
        Ok(id)
    }

    /// Is the cell unusable for placement: outside every room, covered
    /// by furniture, or inside a living entity's footprint?
    pub fn is_cell_occupied(&self, p: IVec2) -> bool {
        let Some(room) = self.floor().room_at(p) else {
            return true;
        };
        if room.furniture_at(p - room.pos).is_some() {
            return true;
        }
        self.ents
            .iter()
            .filter(|e| e.alive())
            .any(|e| e.footprint().any(|c| c == p))
    }

    /// Entities whose removal the display layer has not consumed yet.
    pub fn drain_removed_drawables(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.removed_drawables)
    }

    /// Drop dead entities from play, remembering them for the display
    /// layer.
    pub(crate) fn sweep_dead(&mut self) {
        let mut removed = Vec::new();
        self.ents.retain(|e| {
            if e.alive() {
                true
            } else {
                log::info!("{} has fallen", e.name);
                removed.push(e.id);
                false
            }
        });
        self.removed_drawables.extend(removed);
    }

    /// Open or close a door pair on the ground floor. Both halves flip
    /// together and every sight cache is invalidated. Returns false on an
    /// unpaired or out-of-range door.
    pub fn set_door_opened(
        &mut self,
        room: usize,
        door: usize,
        opened: bool,
    ) -> bool {
        let Some((room2, door2)) = self.floor().find_matching_door(room, door)
        else {
            log::error!("door {door} of room {room} has no matching half");
            return false;
        };
        let floor = &mut self.house.floors[0];
        floor.rooms[room].doors[door].set_opened(opened);
        floor.rooms[room2].doors[door2].set_opened(opened);
        self.recalc_los();
        true
    }

    pub(crate) fn script_send(&self, event: crate::EngineEvent) {
        self.comm.send(event);
    }
}
