//! Game entities: explorers, haunt minions and interactable objects.

use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};
use util::Grid;
use world::LOS_TEXTURE_SIZE;

use crate::{AnyAction, Stats, DEFAULT_SIGHT};

/// Stable handle to an entity. Ids are never reused within a game, so a
/// stale handle resolves to nothing rather than to a different entity.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
)]
pub struct EntityId(pub u64);

#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    /// Neutral, used for objects and for spectating runs with no human
    /// player.
    #[default]
    None,
    Explorers,
    Haunt,
}

/// Coarse animation clock. Actions that wait for an animation poll for
/// `Ready`.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AnimState {
    #[default]
    Ready,
    /// Milliseconds left in the current animation.
    Busy(i64),
    Killed,
}

const INVALID_POS: IVec2 = ivec2(-1, -1);

/// Cached sight field for one entity, recomputed only when the entity has
/// moved since the last query. `min`/`max` bound the marked cells so team
/// merges only scan the touched region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LosCache {
    pub grid: Grid<bool>,
    /// Position the cache was computed at, `(-1, -1)` when stale.
    pub pos: IVec2,
    pub min: IVec2,
    pub max: IVec2,
}

impl Default for LosCache {
    fn default() -> Self {
        LosCache {
            grid: Grid::new((LOS_TEXTURE_SIZE, LOS_TEXTURE_SIZE)),
            pos: INVALID_POS,
            min: IVec2::ZERO,
            max: IVec2::ZERO,
        }
    }
}

impl LosCache {
    pub fn invalidate(&mut self) {
        self.pos = INVALID_POS;
    }

    pub fn is_stale_at(&self, pos: IVec2) -> bool {
        self.pos != pos
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub side: Side,
    /// Footprint origin in house-global cells.
    pub pos: IVec2,
    pub dims: IVec2,
    pub stats: Option<Stats>,
    pub actions: Vec<AnyAction>,
    /// Scenery that can be interacted with but never acts.
    pub object: bool,
    pub anim: AnimState,
    pub los: Option<LosCache>,
    /// Set while this entity's master AI may issue it actions.
    #[serde(skip)]
    pub ai_active: bool,
}

impl Entity {
    pub fn sight(&self) -> i32 {
        self.stats
            .as_ref()
            .map_or(DEFAULT_SIGHT, |s| s.sight())
    }

    pub fn alive(&self) -> bool {
        self.anim != AnimState::Killed
            && self.stats.as_ref().map_or(true, |s| s.hp_cur() > 0)
    }

    pub fn ready(&self) -> bool {
        self.anim == AnimState::Ready
    }

    /// Start a named animation and go busy for its duration.
    pub fn play_anim(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        log::debug!("{}: playing animation {name}", self.name);
        if self.anim != AnimState::Killed {
            self.anim = AnimState::Busy(crate::ANIM_MILLIS);
        }
    }

    /// Advance the animation clock by `dt` milliseconds.
    pub fn think(&mut self, dt: i64) {
        if let AnimState::Busy(left) = self.anim {
            let left = left - dt;
            self.anim = if left <= 0 {
                AnimState::Ready
            } else {
                AnimState::Busy(left)
            };
        }
    }

    /// Can this entity see any cell of the given footprint?
    pub fn has_los(&self, pos: IVec2, dims: IVec2) -> bool {
        let Some(los) = &self.los else {
            return false;
        };
        for x in pos.x..pos.x + dims.x.max(1) {
            for y in pos.y..pos.y + dims.y.max(1) {
                if los.grid.get(ivec2(x, y)).copied().unwrap_or(false) {
                    return true;
                }
            }
        }
        false
    }

    pub fn footprint(&self) -> impl Iterator<Item = IVec2> + '_ {
        let (pos, dims) = (self.pos, self.dims);
        (0..dims.x.max(1)).flat_map(move |x| {
            (0..dims.y.max(1)).map(move |y| pos + ivec2(x, y))
        })
    }
}
