//! Entity stats and timed conditions.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Broad category of a condition. At most one condition of each named kind
/// is active at a time, the strongest one wins.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Ap,
    Hp,
    Sight,
    Fire,
    Poison,
    Panic,
    #[default]
    Unspecified,
}

/// Per-round capacities. Conditions contribute these as additive
/// modifiers, so the fields can go negative in a modifier even though the
/// modified result is clamped to zero.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(default, rename_all = "kebab-case")]
pub struct Base {
    pub ap_max: i32,
    pub hp_max: i32,
    pub sight: i32,
}

impl Add for Base {
    type Output = Base;

    fn add(self, rhs: Base) -> Base {
        Base {
            ap_max: self.ap_max + rhs.ap_max,
            hp_max: self.hp_max + rhs.hp_max,
            sight: self.sight + rhs.sight,
        }
    }
}

impl AddAssign for Base {
    fn add_assign(&mut self, rhs: Base) {
        *self = *self + rhs;
    }
}

/// Current pools, always clamped to `[0, max]` when read.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dynamic {
    pub ap: i32,
    pub hp: i32,
}

/// A timed stat effect. `modifier` shifts the capacities while the
/// condition lasts and `per_round` is applied to the pools at the start of
/// each of the bearer's rounds. `rounds < 0` never expires.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Condition {
    pub name: String,
    pub kind: Kind,
    pub strength: i32,
    pub modifier: Base,
    pub per_round: Dynamic,
    pub rounds: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Stats {
    base: Base,
    dynamic: Dynamic,
    conditions: Vec<Condition>,
}

impl Stats {
    pub fn new(base: Base) -> Stats {
        Stats {
            base,
            dynamic: Dynamic {
                ap: base.ap_max,
                hp: base.hp_max,
            },
            conditions: Vec::new(),
        }
    }

    /// Base capacities with all condition modifiers applied.
    fn modified_base(&self) -> Base {
        let mut base = self.base;
        for c in &self.conditions {
            base += c.modifier;
        }
        base.ap_max = base.ap_max.max(0);
        base.hp_max = base.hp_max.max(0);
        base.sight = base.sight.max(0);
        base
    }

    pub fn ap_max(&self) -> i32 {
        self.modified_base().ap_max
    }

    pub fn hp_max(&self) -> i32 {
        self.modified_base().hp_max
    }

    pub fn sight(&self) -> i32 {
        self.modified_base().sight
    }

    pub fn ap_cur(&self) -> i32 {
        self.dynamic.ap.clamp(0, self.ap_max())
    }

    pub fn hp_cur(&self) -> i32 {
        self.dynamic.hp.clamp(0, self.hp_max())
    }

    pub fn set_ap(&mut self, ap: i32) {
        self.dynamic.ap = ap.clamp(0, self.ap_max());
    }

    pub fn set_hp(&mut self, hp: i32) {
        self.dynamic.hp = hp.clamp(0, self.hp_max());
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Shift the current pools. Negative deltas are damage.
    pub fn apply_damage(&mut self, dap: i32, dhp: i32) {
        self.set_ap(self.dynamic.ap + dap);
        self.set_hp(self.dynamic.hp + dhp);
    }

    /// Add a condition. A condition replaces a weaker one of the same kind
    /// and is discarded against a stronger one; unspecified kinds stack
    /// freely.
    pub fn apply_condition(&mut self, c: Condition) {
        if c.kind != Kind::Unspecified {
            if let Some(old) =
                self.conditions.iter_mut().find(|o| o.kind == c.kind)
            {
                if c.strength >= old.strength {
                    *old = c;
                }
                return;
            }
        }
        self.conditions.push(c);
    }

    pub fn remove_condition(&mut self, name: &str) {
        self.conditions.retain(|c| c.name != name);
    }

    /// Scenario start: both pools fill to capacity.
    pub fn on_begin(&mut self) {
        self.dynamic.hp = self.hp_max();
        self.on_round();
    }

    /// Start of the bearer's round: AP refills, conditions tick their
    /// per-round effect and expire.
    pub fn on_round(&mut self) {
        self.dynamic.ap = self.ap_max();
        let mut delta = Dynamic::default();
        for c in &mut self.conditions {
            delta.ap += c.per_round.ap;
            delta.hp += c.per_round.hp;
            if c.rounds > 0 {
                c.rounds -= 1;
            }
        }
        self.conditions.retain(|c| c.rounds != 0);
        self.apply_damage(delta.ap, delta.hp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Base {
        Base {
            ap_max: 5,
            hp_max: 10,
            sight: 4,
        }
    }

    #[test]
    fn pools_clamp_to_capacity() {
        let mut s = Stats::new(base());
        assert_eq!(s.ap_cur(), 5);
        assert_eq!(s.hp_cur(), 10);

        s.apply_damage(-2, -30);
        assert_eq!(s.ap_cur(), 3);
        assert_eq!(s.hp_cur(), 0);

        s.apply_damage(100, 100);
        assert_eq!(s.ap_cur(), 5);
        assert_eq!(s.hp_cur(), 10);
    }

    #[test]
    fn modifiers_shift_capacity() {
        let mut s = Stats::new(base());
        s.apply_condition(Condition {
            name: "slowed".into(),
            kind: Kind::Ap,
            strength: 1,
            modifier: Base {
                ap_max: -2,
                ..Default::default()
            },
            rounds: -1,
            ..Default::default()
        });
        assert_eq!(s.ap_max(), 3);
        // The pool reads clamped even though it was filled before the
        // condition landed.
        assert_eq!(s.ap_cur(), 3);

        // A weaker condition of the same kind is discarded.
        s.apply_condition(Condition {
            name: "sluggish".into(),
            kind: Kind::Ap,
            strength: 0,
            modifier: Base {
                ap_max: -1,
                ..Default::default()
            },
            rounds: -1,
            ..Default::default()
        });
        assert_eq!(s.ap_max(), 3);

        // A stronger one replaces it.
        s.apply_condition(Condition {
            name: "paralyzed".into(),
            kind: Kind::Ap,
            strength: 5,
            modifier: Base {
                ap_max: -5,
                ..Default::default()
            },
            rounds: -1,
            ..Default::default()
        });
        assert_eq!(s.ap_max(), 0);
        assert_eq!(s.conditions().len(), 1);
    }

    #[test]
    fn per_round_damage_and_expiry() {
        let mut s = Stats::new(base());
        s.apply_condition(Condition {
            name: "burning".into(),
            kind: Kind::Fire,
            strength: 1,
            per_round: Dynamic { ap: 0, hp: -3 },
            rounds: 2,
            ..Default::default()
        });

        s.on_round();
        assert_eq!(s.hp_cur(), 7);
        s.on_round();
        assert_eq!(s.hp_cur(), 4);
        // Expired after two rounds.
        assert!(s.conditions().is_empty());
        s.on_round();
        assert_eq!(s.hp_cur(), 4);
    }

    #[test]
    fn round_refills_ap_not_hp() {
        let mut s = Stats::new(base());
        s.apply_damage(-5, -4);
        s.on_round();
        assert_eq!(s.ap_cur(), 5);
        assert_eq!(s.hp_cur(), 6);

        s.on_begin();
        assert_eq!(s.hp_cur(), 10);
    }
}
