//! Built-in side controllers.
//!
//! AI runs in two layers matching the activation order: every entity of
//! the active side gets a per-entity activation flag at round start, then
//! the side-level controllers are armed. The turn machine polls the
//! active controller once per tick; a controller picks the next entity
//! with its flag still up, asks it for an action, and clears the flag
//! when the entity has nothing left to do. When every controller has
//! wound down the poll yields and the round can end.

use glam::{ivec2, IVec2};
use pathfinding::prelude::dijkstra;
use rand::seq::SliceRandom;

use crate::{
    ActionExec, AnyAction, CellGraph, EntityId, Game, Graph, Side,
};

#[derive(Clone, Debug, Default)]
pub struct AiState {
    active: bool,
}

impl AiState {
    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn active(&self) -> bool {
        self.active
    }
}

/// Which controller the turn machine is currently polling. Minions act
/// before their master.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ActiveAi {
    #[default]
    None,
    Minion,
    HauntMaster,
    Explorers,
}

pub enum AiReply {
    Exec(ActionExec),
    /// Every controller is done for this round.
    Yield,
}

impl Game {
    /// Arm the controllers for the side that just started its round. The
    /// per-entity flags must already be up.
    pub(crate) fn activate_side_ai(&mut self, side: Side) {
        match side {
            Side::Haunt => {
                self.minion_ai.activate();
                self.haunt_ai.activate();
                self.active_ai = ActiveAi::Minion;
            }
            Side::Explorers => {
                self.explorer_ai.activate();
                self.active_ai = ActiveAi::Explorers;
            }
            Side::None => self.active_ai = ActiveAi::None,
        }
    }

    pub(crate) fn any_ai_active(&self) -> bool {
        self.minion_ai.active()
            || self.haunt_ai.active()
            || self.explorer_ai.active()
    }

    /// One poll of the active controller. Never blocks; at worst it winds
    /// a controller down and yields.
    pub(crate) fn poll_ai(&mut self) -> AiReply {
        loop {
            match self.active_ai {
                ActiveAi::None => return AiReply::Yield,
                ActiveAi::Minion => {
                    if let Some(exec) = self.next_entity_exec(Side::Haunt, false)
                    {
                        return AiReply::Exec(exec);
                    }
                    self.minion_ai.deactivate();
                    self.active_ai = ActiveAi::HauntMaster;
                }
                ActiveAi::HauntMaster => {
                    if let Some(exec) = self.next_entity_exec(Side::Haunt, true)
                    {
                        return AiReply::Exec(exec);
                    }
                    self.haunt_ai.deactivate();
                    self.active_ai = ActiveAi::None;
                }
                ActiveAi::Explorers => {
                    if let Some(exec) =
                        self.next_entity_exec(Side::Explorers, false)
                    {
                        return AiReply::Exec(exec);
                    }
                    self.explorer_ai.deactivate();
                    self.active_ai = ActiveAi::None;
                }
            }
        }
    }

    /// Pull the next action from the side's entities with their
    /// activation flag up, clearing flags of entities that are out of
    /// moves. `masters` selects summoners, the minion pass skips them.
    fn next_entity_exec(
        &mut self,
        side: Side,
        masters: bool,
    ) -> Option<ActionExec> {
        loop {
            let idx = self.ents.iter().position(|e| {
                e.side == side
                    && !e.object
                    && e.ai_active
                    && e.alive()
                    && self.is_master(e.id) == masters
            })?;
            let id = self.ents[idx].id;
            if let Some(exec) = self.entity_decide(id) {
                return Some(exec);
            }
            self.ents[idx].ai_active = false;
        }
    }

    fn is_master(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|e| {
            e.actions
                .iter()
                .any(|a| matches!(a, AnyAction::Summon(_)))
        })
    }

    fn entity_decide(&mut self, id: EntityId) -> Option<ActionExec> {
        let actions = self.entity(id)?.actions.clone();
        for (index, action) in actions.iter().enumerate() {
            let exec = match action {
                AnyAction::Interact(interact) => {
                    if !crate::Action::readyable(action, self, id) {
                        continue;
                    }
                    self.nearest_object_exec(id, index, interact)
                        .or_else(|| interact.exec_on_closed_door(self, id, index))
                }
                AnyAction::Summon(summon) => {
                    if !crate::Action::readyable(action, self, id) {
                        continue;
                    }
                    self.summon_cell_exec(id, index, summon)
                }
            };
            if let Some(mut exec) = exec {
                exec.set_action_index(index);
                return Some(exec);
            }
        }
        None
    }

    /// Inspect the reachable object with the shortest path from the
    /// actor, measured on the cell graph with actor and target footprints
    /// ignored.
    fn nearest_object_exec(
        &self,
        id: EntityId,
        index: usize,
        interact: &crate::Interact,
    ) -> Option<ActionExec> {
        let targets = interact.targets(self, id);
        let from = self.to_vertex(self.entity(id)?.pos);
        let mut best: Option<(u32, EntityId)> = None;
        for target in targets {
            let Some(t) = self.entity(target) else {
                continue;
            };
            let side = self.entity(id)?.side;
            let graph = CellGraph::excluding(self, side, [id, target]);
            let goal = self.to_vertex(t.pos);
            let cost = dijkstra(
                &from,
                |&v| {
                    let (verts, weights) = graph.adjacent(v);
                    verts
                        .into_iter()
                        .zip(weights)
                        .map(|(v, w)| (v, (w * 2.0) as u32))
                        .collect::<Vec<_>>()
                },
                |&v| v == goal,
            )
            .map(|(_, c)| c);
            let Some(cost) = cost else {
                continue;
            };
            if best.map_or(true, |(c, _)| cost < c) {
                best = Some((cost, target));
            }
        }
        let (_, target) = best?;
        interact.exec_on_object(self, id, index, target)
    }

    /// Pick a random legal cell near the caster to summon onto.
    fn summon_cell_exec(
        &mut self,
        id: EntityId,
        index: usize,
        summon: &crate::Summon,
    ) -> Option<ActionExec> {
        let pos = self.entity(id)?.pos;
        let range = summon.range();
        let mut cells: Vec<IVec2> = (-range..=range)
            .flat_map(|x| (-range..=range).map(move |y| pos + ivec2(x, y)))
            .collect();
        cells.shuffle(&mut self.rng);
        let cell = cells
            .into_iter()
            .find(|&c| summon.valid_cell(self, id, c))?;
        Some(ActionExec::Summon(crate::SummonExec {
            ent: id,
            action_index: index,
            pos: cell,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn controllers_wind_down_in_order() {
        let mut g = fixtures::sighted_game();
        g.activate_side_ai(Side::Haunt);
        assert!(g.any_ai_active());
        assert_eq!(g.active_ai, ActiveAi::Minion);

        // No haunt entities at all, one poll drains every controller.
        assert!(matches!(g.poll_ai(), AiReply::Yield));
        assert!(!g.any_ai_active());
        assert_eq!(g.active_ai, ActiveAi::None);
    }

    #[test]
    fn master_summons_then_runs_dry() {
        let mut g = fixtures::sighted_game();
        g.reseed(7);
        let master = g.spawn_at("master", ivec2(5, 5)).unwrap();
        g.merge_los(Side::Haunt);
        g.entity_mut(master).unwrap().ai_active = true;
        g.activate_side_ai(Side::Haunt);

        let AiReply::Exec(exec) = g.poll_ai() else {
            panic!("master should summon");
        };
        assert_eq!(exec.entity(), master);
        let ActionExec::Summon(s) = &exec else {
            panic!("expected a summon exec");
        };
        assert!((s.pos - ivec2(5, 5)).abs().max_element() <= 3);

        // Starve the master of AP; the controller winds down.
        g.entity_mut(master)
            .unwrap()
            .stats
            .as_mut()
            .unwrap()
            .set_ap(0);
        assert!(matches!(g.poll_ai(), AiReply::Yield));
        assert!(!g.entity(master).unwrap().ai_active);
    }

    #[test]
    fn explorer_heads_for_the_nearest_object() {
        let mut g = fixtures::sighted_game();
        let ent = g.spawn_at("explorer", ivec2(5, 5)).unwrap();
        let near = g.spawn_at("relic", ivec2(6, 5)).unwrap();
        let _far = g.spawn_at("relic", ivec2(2, 8)).unwrap();
        g.merge_los(Side::Explorers);
        g.entity_mut(ent).unwrap().ai_active = true;
        g.activate_side_ai(Side::Explorers);

        let AiReply::Exec(exec) = g.poll_ai() else {
            panic!("explorer should inspect");
        };
        let ActionExec::Interact(i) = &exec else {
            panic!("expected an interact exec");
        };
        assert_eq!(i.target, Some(near));
    }
}
