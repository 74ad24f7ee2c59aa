//! Summon action: conjure a new entity onto an empty cell.

use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};
use util::footprint_gap;

use crate::{
    Action, ActionExec, EntityId, Game, Input, InputResult,
    MaintenanceStatus, SummonDef,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Summon {
    def: SummonDef,
    /// Uses left, negative for unlimited.
    pub current_ammo: i32,
    #[serde(skip)]
    ent: EntityId,
    /// Set once the spawn is committed and we are waiting out the
    /// caster's animation.
    #[serde(skip)]
    pending: Option<SummonExec>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SummonExec {
    pub ent: EntityId,
    pub action_index: usize,
    pub pos: IVec2,
}

impl Summon {
    pub fn new(def: SummonDef) -> Summon {
        let current_ammo = if def.ammo > 0 { def.ammo } else { -1 };
        Summon {
            def,
            current_ammo,
            ..Default::default()
        }
    }

    pub fn range(&self) -> i32 {
        self.def.range
    }

    /// Is the cell a legal summon target for this caster?
    pub fn valid_cell(&self, g: &Game, ent: EntityId, cell: IVec2) -> bool {
        let Some(caster) = g.entity(ent) else {
            return false;
        };
        if g.is_cell_occupied(cell) {
            return false;
        }
        if footprint_gap(caster.pos, caster.dims, cell, IVec2::ONE)
            > self.def.range
        {
            return false;
        }
        if self.def.personal_los && !caster.has_los(cell, IVec2::ONE) {
            return false;
        }
        true
    }

    fn validate(&self, g: &Game, exec: &SummonExec) -> Result<(), String> {
        if self.current_ammo == 0 {
            return Err(format!("{} is out of ammo", self.def.name));
        }
        let Some(caster) = g.entity(exec.ent) else {
            return Err(format!("no caster {:?}", exec.ent));
        };
        if exec.action_index >= caster.actions.len() {
            return Err(format!("bad action index {}", exec.action_index));
        }
        let Some(stats) = &caster.stats else {
            return Err(format!("caster {:?} has no stats", exec.ent));
        };
        if stats.ap_cur() < self.def.ap {
            return Err(format!("caster {:?} lacks ap", exec.ent));
        }
        if !self.valid_cell(g, exec.ent, exec.pos) {
            return Err(format!("cell {} is not summonable", exec.pos));
        }
        Ok(())
    }

    fn start(&mut self, g: &mut Game, exec: &SummonExec) -> Result<(), String> {
        self.validate(g, exec)?;
        let caster = g
            .entity_mut(exec.ent)
            .ok_or_else(|| format!("no caster {:?}", exec.ent))?;
        if let Some(stats) = &mut caster.stats {
            stats.apply_damage(-self.def.ap, 0);
        }
        caster.play_anim(&self.def.animation);
        if self.current_ammo > 0 {
            self.current_ammo -= 1;
        }
        self.pending = Some(exec.clone());
        Ok(())
    }
}

impl Action for Summon {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn icon(&self) -> &str {
        &self.def.icon
    }

    fn ap_cost(&self) -> i32 {
        self.def.ap
    }

    fn readyable(&self, g: &Game, ent: EntityId) -> bool {
        self.current_ammo != 0
            && g.entity(ent)
                .and_then(|e| e.stats.as_ref())
                .is_some_and(|s| s.ap_cur() >= self.def.ap)
    }

    fn preppable(&self, g: &Game, ent: EntityId) -> bool {
        self.readyable(g, ent)
    }

    fn prep(&mut self, g: &mut Game, ent: EntityId) -> bool {
        if !self.preppable(g, ent) {
            return false;
        }
        self.ent = ent;
        true
    }

    fn handle_input(&mut self, g: &Game, input: Input) -> InputResult {
        let Input::Press(v) = input else {
            return InputResult::Ignored;
        };
        let cell = ivec2(v.x.floor() as i32, v.y.floor() as i32);
        if self.valid_cell(g, self.ent, cell) {
            InputResult::Exec(ActionExec::Summon(SummonExec {
                ent: self.ent,
                action_index: 0,
                pos: cell,
            }))
        } else {
            InputResult::Consumed
        }
    }

    fn maintain(
        &mut self,
        g: &mut Game,
        _dt: i64,
        exec: Option<&ActionExec>,
    ) -> MaintenanceStatus {
        if let Some(exec) = exec {
            let ActionExec::Summon(exec) = exec else {
                log::error!("summon got a mismatched execution record");
                return MaintenanceStatus::Complete;
            };
            let exec = exec.clone();
            if let Err(err) = self.start(g, &exec) {
                log::error!("summon voided: {err}");
                return MaintenanceStatus::Complete;
            }
            return MaintenanceStatus::InProgress;
        }

        let Some(pending) = &self.pending else {
            log::error!("summon resumed with nothing pending");
            return MaintenanceStatus::Complete;
        };
        // Wait out the caster's animation before the spawn pops in.
        if !g.entity(pending.ent).is_some_and(|e| e.ready()) {
            return MaintenanceStatus::InProgress;
        }
        let pos = pending.pos;
        if let Err(err) = g.spawn_at(&self.def.ent_name, pos) {
            log::error!("summon voided: {err}");
        }
        self.pending = None;
        MaintenanceStatus::Complete
    }

    fn cancel(&mut self, _g: &mut Game) {
        self.pending = None;
        self.ent = EntityId::default();
    }
}
