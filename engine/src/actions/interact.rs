//! Interact action: inspect an object or toggle a door.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use util::{footprint_gap, Rect};

use crate::{
    Action, ActionExec, EntityId, Game, Input, InputResult, InteractDef,
    MaintenanceStatus,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Interact {
    def: InteractDef,
    // Targeting state, rebuilt by prep.
    #[serde(skip)]
    ent: EntityId,
    #[serde(skip)]
    targets: Vec<EntityId>,
    #[serde(skip)]
    doors: Vec<(usize, usize)>,
}

/// Exactly one of `target` and `toggle_door` must be set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InteractExec {
    pub ent: EntityId,
    pub action_index: usize,
    pub target: Option<EntityId>,
    /// Room and door index of the half being toggled.
    pub toggle_door: Option<(usize, usize)>,
}

impl Interact {
    pub fn new(def: InteractDef) -> Interact {
        Interact {
            def,
            ..Default::default()
        }
    }

    /// Object entities this entity could inspect right now: in range, in
    /// its own sight, and not mid-animation.
    fn find_targets(&self, g: &Game, ent: EntityId) -> Vec<EntityId> {
        let Some(e) = g.entity(ent) else {
            return Vec::new();
        };
        g.ents()
            .iter()
            .filter(|t| {
                t.object
                    && t.ready()
                    && footprint_gap(e.pos, e.dims, t.pos, t.dims)
                        <= self.def.range
                    && e.has_los(t.pos, t.dims)
            })
            .map(|t| t.id)
            .collect()
    }

    /// Doors whose threshold region touches the entity's footprint.
    /// Permanently open archways are not toggleable.
    fn find_doors(&self, g: &Game, ent: EntityId) -> Vec<(usize, usize)> {
        let Some(e) = g.entity(ent) else {
            return Vec::new();
        };
        let foot = Rect::from_cells(e.pos, e.dims);
        let mut found = Vec::new();
        for (ri, room) in g.floor().rooms.iter().enumerate() {
            for (di, door) in room.doors.iter().enumerate() {
                if !door.always_open && room.door_rect(door).overlaps(&foot) {
                    found.push((ri, di));
                }
            }
        }
        found
    }

    fn set_highlights(&self, g: &mut Game, on: bool) {
        for &(ri, di) in &self.doors {
            if let Some(room) = g.house.floors[0].rooms.get_mut(ri) {
                if let Some(door) = room.doors.get_mut(di) {
                    door.highlight_threshold = on;
                }
            }
        }
    }

    fn find_action_index(g: &Game, exec: &InteractExec) -> Option<usize> {
        g.entity(exec.ent)
            .filter(|e| exec.action_index < e.actions.len())
            .map(|_| exec.action_index)
    }

    /// Build an exec for inspecting a specific object, used by AI.
    pub fn exec_on_object(
        &self,
        g: &Game,
        ent: EntityId,
        index: usize,
        target: EntityId,
    ) -> Option<ActionExec> {
        self.find_targets(g, ent).contains(&target).then(|| {
            ActionExec::Interact(InteractExec {
                ent,
                action_index: index,
                target: Some(target),
                toggle_door: None,
            })
        })
    }

    /// Build an exec toggling the first reachable door, used by AI.
    pub fn exec_on_door(
        &self,
        g: &Game,
        ent: EntityId,
        index: usize,
    ) -> Option<ActionExec> {
        self.find_doors(g, ent).first().map(|&door| {
            ActionExec::Interact(InteractExec {
                ent,
                action_index: index,
                target: None,
                toggle_door: Some(door),
            })
        })
    }

    /// Like `exec_on_door` but only opens doors, so an AI caller does not
    /// ping-pong a door it just opened.
    pub fn exec_on_closed_door(
        &self,
        g: &Game,
        ent: EntityId,
        index: usize,
    ) -> Option<ActionExec> {
        self.find_doors(g, ent)
            .into_iter()
            .find(|&(ri, di)| !g.floor().rooms[ri].doors[di].is_opened())
            .map(|door| {
                ActionExec::Interact(InteractExec {
                    ent,
                    action_index: index,
                    target: None,
                    toggle_door: Some(door),
                })
            })
    }

    /// Candidate object targets, exposed for AI planning.
    pub fn targets(&self, g: &Game, ent: EntityId) -> Vec<EntityId> {
        self.find_targets(g, ent)
    }

    fn run(&mut self, g: &mut Game, exec: &InteractExec) -> Result<(), String> {
        let Some(_) = Self::find_action_index(g, exec) else {
            return Err(format!("no such actor or action: {exec:?}"));
        };
        match (exec.target, exec.toggle_door) {
            (Some(_), Some(_)) | (None, None) => Err(format!(
                "need exactly one of target and toggle-door: {exec:?}"
            )),
            (Some(target), None) => self.run_inspect(g, exec, target),
            (None, Some(door)) => self.run_toggle(g, exec, door),
        }
    }

    fn run_inspect(
        &mut self,
        g: &mut Game,
        exec: &InteractExec,
        target: EntityId,
    ) -> Result<(), String> {
        if !self.find_targets(g, exec.ent).contains(&target) {
            return Err(format!(
                "target {target:?} is not inspectable by {:?}",
                exec.ent
            ));
        }
        let actor = g
            .entity_mut(exec.ent)
            .ok_or_else(|| format!("no actor {:?}", exec.ent))?;
        let Some(stats) = &mut actor.stats else {
            return Err(format!("actor {:?} has no stats", exec.ent));
        };
        if stats.ap_cur() < self.def.ap {
            return Err(format!("actor {:?} lacks ap", exec.ent));
        }
        stats.apply_damage(-self.def.ap, 0);
        actor.play_anim(&self.def.animation);

        if let Some(t) = g.entity_mut(target) {
            t.play_anim("inspect");
        }
        if g.active_relic == Some(target) {
            g.active_relic = None;
            g.relic_claimed = true;
            log::info!("the relic has been claimed");
        }
        g.active_cleanses.retain(|&id| id != target);
        Ok(())
    }

    fn run_toggle(
        &mut self,
        g: &mut Game,
        exec: &InteractExec,
        (ri, di): (usize, usize),
    ) -> Result<(), String> {
        if !self.find_doors(g, exec.ent).contains(&(ri, di)) {
            return Err(format!(
                "door ({ri}, {di}) is out of reach of {:?}",
                exec.ent
            ));
        }
        // Unpaired doors open into nothing and must void before any AP
        // is spent.
        if g.floor().find_matching_door(ri, di).is_none() {
            return Err(format!("door ({ri}, {di}) has no matching half"));
        }
        let opened = g.floor().rooms[ri].doors[di].is_opened();
        {
            let actor = g
                .entity_mut(exec.ent)
                .ok_or_else(|| format!("no actor {:?}", exec.ent))?;
            let Some(stats) = &mut actor.stats else {
                return Err(format!("actor {:?} has no stats", exec.ent));
            };
            if stats.ap_cur() < self.def.ap {
                return Err(format!("actor {:?} lacks ap", exec.ent));
            }
            stats.apply_damage(-self.def.ap, 0);
        }
        if !g.set_door_opened(ri, di, !opened) {
            return Err(format!("door ({ri}, {di}) has no matching half"));
        }
        Ok(())
    }
}

impl Action for Interact {
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
        g.entity(ent)
            .and_then(|e| e.stats.as_ref())
            .is_some_and(|s| s.ap_cur() >= self.def.ap)
    }

    fn preppable(&self, g: &Game, ent: EntityId) -> bool {
        self.readyable(g, ent)
            && (!self.find_targets(g, ent).is_empty()
                || !self.find_doors(g, ent).is_empty())
    }

    fn prep(&mut self, g: &mut Game, ent: EntityId) -> bool {
        if !self.preppable(g, ent) {
            return false;
        }
        self.ent = ent;
        self.targets = self.find_targets(g, ent);
        self.doors = self.find_doors(g, ent);
        self.set_highlights(g, true);
        true
    }

    fn handle_input(&mut self, g: &Game, input: Input) -> InputResult {
        let Input::Press(v) = input else {
            return InputResult::Ignored;
        };
        let cell = glam::ivec2(v.x.floor() as i32, v.y.floor() as i32);
        if let Some(&target) = self.targets.iter().find(|&&id| {
            g.entity(id)
                .is_some_and(|t| t.footprint().any(|c| c == cell))
        }) {
            return InputResult::Exec(ActionExec::Interact(InteractExec {
                ent: self.ent,
                action_index: 0,
                target: Some(target),
                toggle_door: None,
            }));
        }
        if let Some(&(ri, di)) = self.doors.iter().find(|&&(ri, di)| {
            let room = &g.floor().rooms[ri];
            room.door_rect(&room.doors[di]).contains(Vec2::new(v.x, v.y))
        }) {
            return InputResult::Exec(ActionExec::Interact(InteractExec {
                ent: self.ent,
                action_index: 0,
                target: None,
                toggle_door: Some((ri, di)),
            }));
        }
        InputResult::Consumed
    }

    fn maintain(
        &mut self,
        g: &mut Game,
        _dt: i64,
        exec: Option<&ActionExec>,
    ) -> MaintenanceStatus {
        let Some(ActionExec::Interact(exec)) = exec else {
            log::error!("interact resumed without an execution record");
            return MaintenanceStatus::Complete;
        };
        let exec = exec.clone();
        if let Err(err) = self.run(g, &exec) {
            log::error!("interact voided: {err}");
        }
        MaintenanceStatus::Complete
    }

    fn cancel(&mut self, g: &mut Game) {
        self.set_highlights(g, false);
        self.targets.clear();
        self.doors.clear();
        self.ent = EntityId::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use glam::ivec2;

    fn prepped(g: &mut Game, ent: EntityId) -> Interact {
        let mut action = match &g.entity(ent).unwrap().actions[0] {
            crate::AnyAction::Interact(a) => a.clone(),
            _ => panic!("expected interact in slot 0"),
        };
        assert!(action.prep(g, ent));
        action
    }

    fn ap_of(g: &Game, ent: EntityId) -> i32 {
        g.entity(ent).unwrap().stats.as_ref().unwrap().ap_cur()
    }

    #[test]
    fn prep_needs_ap() {
        let mut g = fixtures::sighted_game();
        let ent = g.spawn_at("explorer", ivec2(3, 3)).unwrap();
        g.spawn_at("relic", ivec2(4, 3)).unwrap();
        g.merge_los(crate::Side::Explorers);

        let action = prepped(&mut g, ent).clone();
        assert!(action.preppable(&g, ent));

        // The inspect costs 2 AP; with 1 left it is not even preppable.
        g.entity_mut(ent)
            .unwrap()
            .stats
            .as_mut()
            .unwrap()
            .set_ap(1);
        assert!(!action.preppable(&g, ent));
        assert!(!action.readyable(&g, ent));
    }

    #[test]
    fn inspecting_spends_ap_and_claims_the_relic() {
        let mut g = fixtures::sighted_game();
        let ent = g.spawn_at("explorer", ivec2(3, 3)).unwrap();
        let relic = g.spawn_at("relic", ivec2(4, 3)).unwrap();
        g.purpose = crate::Purpose::Relic;
        g.active_relic = Some(relic);
        g.merge_los(crate::Side::Explorers);

        let mut action = prepped(&mut g, ent);
        let exec = action.exec_on_object(&g, ent, 0, relic).unwrap();
        assert_eq!(
            action.maintain(&mut g, 16, Some(&exec)),
            MaintenanceStatus::Complete
        );
        action.cancel(&mut g);

        assert_eq!(ap_of(&g, ent), 3);
        assert_eq!(g.active_relic, None);
    }

    #[test]
    fn door_toggle_flips_both_halves() {
        let mut g = fixtures::sighted_game();
        // Right next to the west half of the door pair.
        let ent = g.spawn_at("explorer", ivec2(9, 4)).unwrap();
        g.merge_los(crate::Side::Explorers);

        let mut action = prepped(&mut g, ent);
        let exec = action.exec_on_door(&g, ent, 0).unwrap();
        action.maintain(&mut g, 16, Some(&exec));
        action.cancel(&mut g);

        assert!(g.floor().rooms[0].doors[0].is_opened());
        assert!(g.floor().rooms[1].doors[0].is_opened());
        assert_eq!(ap_of(&g, ent), 3);

        // Sight caches were invalidated by the toggle.
        assert!(g.ents()[0].los.as_ref().unwrap().is_stale_at(ivec2(9, 4)));
    }

    #[test]
    fn malformed_execs_void_without_effect() {
        let mut g = fixtures::sighted_game();
        let ent = g.spawn_at("explorer", ivec2(3, 3)).unwrap();
        let relic = g.spawn_at("relic", ivec2(4, 3)).unwrap();
        g.merge_los(crate::Side::Explorers);
        let mut action = prepped(&mut g, ent);

        // Both fields set.
        let exec = ActionExec::Interact(InteractExec {
            ent,
            action_index: 0,
            target: Some(relic),
            toggle_door: Some((0, 0)),
        });
        assert_eq!(
            action.maintain(&mut g, 16, Some(&exec)),
            MaintenanceStatus::Complete
        );
        assert_eq!(ap_of(&g, ent), 5);

        // Neither field set.
        let exec = ActionExec::Interact(InteractExec {
            ent,
            action_index: 0,
            ..Default::default()
        });
        action.maintain(&mut g, 16, Some(&exec));
        assert_eq!(ap_of(&g, ent), 5);

        // Out-of-reach door.
        let exec = ActionExec::Interact(InteractExec {
            ent,
            action_index: 0,
            target: None,
            toggle_door: Some((1, 0)),
        });
        action.maintain(&mut g, 16, Some(&exec));
        assert_eq!(ap_of(&g, ent), 5);
        assert!(!g.floor().rooms[1].doors[0].is_opened());
    }

    #[test]
    fn unpaired_doors_void_without_spending_ap() {
        // A door on an outer wall survives normalization with a warning
        // but has no matching half to toggle.
        let house = world::HouseDef {
            name: "deadend".into(),
            floors: vec![world::Floor {
                rooms: vec![world::Room {
                    name: "hall".into(),
                    pos: ivec2(0, 0),
                    size: ivec2(12, 12),
                    doors: vec![world::Door {
                        facing: world::WallFacing::NearLeft,
                        pos: 4,
                        width: 2,
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
            }],
        };
        let (mut g, _h) =
            Game::new(house, fixtures::catalog(), crate::Side::None).unwrap();
        let ent = g.spawn_at("explorer", ivec2(0, 4)).unwrap();

        let mut action = prepped(&mut g, ent);
        let exec = action.exec_on_door(&g, ent, 0).unwrap();
        assert_eq!(
            action.maintain(&mut g, 16, Some(&exec)),
            MaintenanceStatus::Complete
        );
        assert_eq!(ap_of(&g, ent), 5);
        assert!(!g.floor().rooms[0].doors[0].is_opened());
    }

    #[test]
    fn out_of_sight_targets_are_rejected() {
        let mut g = fixtures::sighted_game();
        let ent = g.spawn_at("explorer", ivec2(9, 4)).unwrap();
        // Behind the closed door in the east room.
        let relic = g.spawn_at("relic", ivec2(10, 4)).unwrap();
        g.merge_los(crate::Side::Explorers);

        let action = match &g.entity(ent).unwrap().actions[0] {
            crate::AnyAction::Interact(a) => a.clone(),
            _ => unreachable!(),
        };
        // In range but unseen, so it is not a target.
        assert!(action.exec_on_object(&g, ent, 0, relic).is_none());
    }
}
