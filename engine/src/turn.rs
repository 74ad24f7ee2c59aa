//! The per-tick turn machine.

use serde::{Deserialize, Serialize};

use crate::{
    game::Executing, Action, ActionExec, AiReply, EngineEvent, EntityId,
    Game, Input, InputResult, LosMode, MaintenanceStatus, Purpose,
    ScriptReply, Side,
};

/// Main turn flow. `Init` happens once, then the machine cycles
/// `Start -> AiAction <-> ScriptOnAction -> End -> Start`.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TurnState {
    /// Waiting for the script to acknowledge game start.
    #[default]
    Init,
    /// Waiting for the script's round-start hook.
    Start,
    /// Polling the active side for its next action.
    AiAction,
    /// Waiting for the script to react to a completed action.
    ScriptOnAction,
    /// Waiting for the script's round-end hook.
    End,
}

/// What the action machinery is doing, orthogonal to `TurnState`.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ActionState {
    #[default]
    NoAction,
    /// An exec is committed and waits to be resolved into its action.
    WaitingAction,
    /// The player is targeting with a prepped action.
    PreppingAction,
    /// An action is running, `maintain` is called every tick.
    DoingAction,
}

impl Game {
    /// Advance the game by `dt` milliseconds. This is the only mutation
    /// entry point the embedding loop needs to call.
    pub fn think(&mut self, dt: i64) {
        self.poll_script();
        self.resolve_exec();
        self.maintain_current(dt);

        for e in &mut self.ents {
            e.think(dt);
        }
        // Fog keeps moving during animations and wait states.
        for side in [Side::Explorers, Side::Haunt] {
            self.merge_los(side);
            self.decay_fog(side, dt);
        }

        if self.winner().is_some()
            || self.turn_state != TurnState::AiAction
            || self.action_state == ActionState::DoingAction
            || self.current_exec.is_some()
        {
            return;
        }
        // Let animations settle before the next decision.
        if self.ents.iter().any(|e| !e.ready()) {
            return;
        }

        match self.poll_ai() {
            AiReply::Exec(exec) => self.current_exec = Some(exec),
            AiReply::Yield => {
                if !self.player_active
                    && self.action_state == ActionState::NoAction
                    && !self.any_ai_active()
                {
                    self.turn_state = TurnState::End;
                    self.script_send(EngineEvent::Sync);
                }
            }
        }
    }

    /// Drain at most one script reply and run the waiting-state
    /// transitions.
    fn poll_script(&mut self) {
        let waiting = matches!(
            self.turn_state,
            TurnState::Init
                | TurnState::Start
                | TurnState::ScriptOnAction
                | TurnState::End
        );
        if !waiting {
            return;
        }
        let Some(reply) = self.comm.try_recv() else {
            return;
        };
        match self.turn_state {
            TurnState::Init | TurnState::End => {
                if self.on_round() {
                    self.turn_state = TurnState::Start;
                    self.script_send(EngineEvent::Sync);
                }
            }
            TurnState::Start => self.turn_state = TurnState::AiAction,
            TurnState::ScriptOnAction => {
                if let ScriptReply::Exec(exec) = reply {
                    if self.current_exec.is_some() {
                        log::error!(
                            "script injected {exec:?} while one is pending, \
                             dropping it"
                        );
                    } else {
                        self.current_exec = Some(exec);
                    }
                }
                self.turn_state = TurnState::AiAction;
            }
            TurnState::AiAction => {}
        }
    }

    /// Move a committed exec into the owning entity's action, cloned out
    /// for the duration of the run.
    fn resolve_exec(&mut self) {
        if self.turn_state != TurnState::AiAction
            || self.action_state == ActionState::DoingAction
            || self.action_state == ActionState::PreppingAction
        {
            return;
        }
        let Some(exec) = self.current_exec.take() else {
            return;
        };
        let ent = exec.entity();
        let index = exec.action_index();
        let action = self
            .entity(ent)
            .and_then(|e| e.actions.get(index))
            .cloned();
        let Some(action) = action else {
            log::error!("dropping exec for missing action: {exec:?}");
            self.action_state = ActionState::NoAction;
            return;
        };
        self.current_action = Some(Executing {
            ent,
            index,
            action,
            exec: Some(exec),
            started: false,
        });
        self.action_state = ActionState::DoingAction;
    }

    fn maintain_current(&mut self, dt: i64) {
        let Some(mut cur) = self.current_action.take() else {
            return;
        };
        let exec = if cur.started { None } else { cur.exec.clone() };
        cur.started = true;
        let status = cur.action.maintain(self, dt, exec.as_ref());
        match status {
            MaintenanceStatus::InProgress
            | MaintenanceStatus::CheckForInterrupts => {
                self.current_action = Some(cur);
            }
            MaintenanceStatus::Complete => {
                cur.action.cancel(self);
                if let Some(e) = self.entity_mut(cur.ent) {
                    if cur.index < e.actions.len() {
                        e.actions[cur.index] = cur.action;
                    }
                }
                self.action_state = ActionState::NoAction;
                self.turn_state = TurnState::ScriptOnAction;
                if let Some(exec) = cur.exec {
                    self.script_send(EngineEvent::Action(exec));
                }
                self.check_win_conditions();
            }
        }
    }

    /// Round transition bookkeeping. A no-op returning false while an
    /// action is running or any controller is still active.
    pub(crate) fn on_round(&mut self) -> bool {
        if self.current_action.is_some()
            || self.action_state == ActionState::DoingAction
        {
            log::error!("round transition attempted mid-action");
            return false;
        }
        if self.any_ai_active() {
            log::debug!("round transition deferred, a controller is active");
            return false;
        }

        self.turn += 1;
        self.side = if self.side == Side::Explorers {
            Side::Haunt
        } else {
            Side::Explorers
        };
        log::info!("turn {}: {:?} act", self.turn, self.side);

        let side = self.side;
        for e in &mut self.ents {
            if e.side == side {
                if let Some(stats) = &mut e.stats {
                    stats.on_round();
                }
            }
        }
        // Deaths resolve before anything gets to act, including deaths
        // from condition ticks just applied.
        self.sweep_dead();
        self.check_win_conditions();

        for e in &mut self.ents {
            if e.side == side && !e.object {
                e.ai_active = true;
            }
        }
        if self.human == side {
            self.player_active = true;
            self.active_ai = crate::ActiveAi::None;
        } else {
            self.player_active = false;
            self.activate_side_ai(side);
        }

        self.selected = None;
        self.hovered = None;
        true
    }

    /// The human player is done for this round.
    pub fn end_turn(&mut self) {
        self.player_active = false;
    }

    pub(crate) fn check_win_conditions(&mut self) {
        // No purpose set means the scenario script owns the outcome.
        if self.purpose == Purpose::None {
            return;
        }
        let explorers_win = match self.purpose {
            Purpose::Cleanse => self.active_cleanses.is_empty(),
            Purpose::Relic => self.relic_claimed,
            Purpose::Mystery | Purpose::None => false,
        };
        let haunt_wins = !self
            .ents
            .iter()
            .any(|e| e.side == Side::Explorers && !e.object && e.alive());
        if explorers_win && haunt_wins {
            log::error!("both sides satisfied their win condition");
        }
        if self.winner.is_none() {
            if haunt_wins {
                self.winner = Some(Side::Haunt);
                log::info!("the haunt wins");
            } else if explorers_win {
                self.winner = Some(Side::Explorers);
                log::info!("the explorers win");
            }
        }
    }

    /// Put the player's chosen action into targeting mode. Returns false
    /// when the action cannot be prepped right now.
    pub fn select_action(&mut self, ent: EntityId, index: usize) -> bool {
        if !self.player_active
            || self.action_state == ActionState::DoingAction
        {
            return false;
        }
        self.cancel_prep();
        let Some(mut action) =
            self.entity(ent).and_then(|e| e.actions.get(index)).cloned()
        else {
            return false;
        };
        if !action.prep(self, ent) {
            return false;
        }
        self.prepping = Some(Executing {
            ent,
            index,
            action,
            exec: None,
            started: false,
        });
        self.action_state = ActionState::PreppingAction;
        true
    }

    /// Drop out of targeting mode.
    pub fn cancel_prep(&mut self) {
        if let Some(mut prep) = self.prepping.take() {
            prep.action.cancel(self);
            if let Some(e) = self.entity_mut(prep.ent) {
                if prep.index < e.actions.len() {
                    e.actions[prep.index] = prep.action;
                }
            }
        }
        if self.action_state == ActionState::PreppingAction {
            self.action_state = ActionState::NoAction;
        }
    }

    /// Route pointer input to the prepped action. A committing press
    /// produces the exec and leaves targeting mode.
    pub fn handle_input(&mut self, input: Input) -> InputResult {
        let Some(mut prep) = self.prepping.take() else {
            return InputResult::Ignored;
        };
        let result = prep.action.handle_input(self, input);
        match result {
            InputResult::Exec(mut exec) => {
                exec.set_action_index(prep.index);
                prep.action.cancel(self);
                if let Some(e) = self.entity_mut(prep.ent) {
                    if prep.index < e.actions.len() {
                        e.actions[prep.index] = prep.action;
                    }
                }
                self.current_exec = Some(exec.clone());
                self.action_state = ActionState::WaitingAction;
                InputResult::Exec(exec)
            }
            other => {
                self.prepping = Some(prep);
                other
            }
        }
    }

    /// Entity whose footprint covers the cell, for hover and selection.
    pub fn entity_at(&self, pos: glam::IVec2) -> Option<EntityId> {
        self.ents
            .iter()
            .find(|e| e.alive() && e.footprint().any(|c| c == pos))
            .map(|e| e.id)
    }

    /// Convenience setup used by scenario starters: reveal by entity
    /// sight on both sides.
    pub fn fog_of_war(&mut self) {
        self.set_los_mode(Side::Explorers, LosMode::Entities, &[]);
        self.set_los_mode(Side::Haunt, LosMode::Entities, &[]);
    }
}
