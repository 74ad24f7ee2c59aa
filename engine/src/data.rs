//! Definition catalog the scenario is built from.
//!
//! Definitions are plain data loaded from scenario files; the catalog
//! instantiates live entities and actions from them. Nothing here is
//! global, each game owns its own catalog.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::{
    stats::{Base, Condition},
    AnyAction, Entity, EntityId, Interact, LosCache, Side, Summon,
};

pub type ConditionDef = Condition;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InteractDef {
    pub name: String,
    pub display_name: String,
    pub ap: i32,
    pub range: i32,
    pub animation: String,
    pub icon: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SummonDef {
    pub name: String,
    pub display_name: String,
    pub ap: i32,
    /// Number of uses, zero or negative for unlimited.
    pub ammo: i32,
    pub range: i32,
    /// Target cell must be in the caster's own sight, not just the team's.
    pub personal_los: bool,
    /// Catalog name of the entity placed on the target cell.
    pub ent_name: String,
    pub animation: String,
    pub icon: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionDef {
    Interact(InteractDef),
    Summon(SummonDef),
}

/// Starting kit for an explorer: an extra action and a passive condition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Gear {
    pub name: String,
    pub action: String,
    pub condition: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EntityDef {
    pub name: String,
    pub side: Side,
    pub dims: IVec2,
    pub stats: Option<Base>,
    pub actions: Vec<String>,
    pub object: bool,
    pub gear: Option<Gear>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Catalog {
    pub entities: BTreeMap<String, EntityDef>,
    pub actions: BTreeMap<String, ActionDef>,
    pub conditions: BTreeMap<String, ConditionDef>,
}

impl Catalog {
    pub fn action_def(&self, name: &str) -> Result<&ActionDef> {
        self.actions
            .get(name)
            .ok_or_else(|| anyhow!("unknown action {name:?}"))
    }

    pub fn condition_def(&self, name: &str) -> Result<&ConditionDef> {
        self.conditions
            .get(name)
            .ok_or_else(|| anyhow!("unknown condition {name:?}"))
    }

    pub fn make_action(&self, name: &str) -> Result<AnyAction> {
        Ok(match self.action_def(name)? {
            ActionDef::Interact(def) => {
                AnyAction::Interact(Interact::new(def.clone()))
            }
            ActionDef::Summon(def) => {
                AnyAction::Summon(Summon::new(def.clone()))
            }
        })
    }

    /// Instantiate an entity at a position. The caller assigns the id from
    /// the game's counter.
    pub fn make_entity(
        &self,
        name: &str,
        id: EntityId,
        pos: IVec2,
    ) -> Result<Entity> {
        let def = self
            .entities
            .get(name)
            .ok_or_else(|| anyhow!("unknown entity {name:?}"))?;
        let mut actions = Vec::new();
        for a in &def.actions {
            actions.push(self.make_action(a)?);
        }
        // Gear may carry only a condition and no extra action.
        if let Some(gear) = &def.gear {
            if !gear.action.is_empty() {
                actions.push(self.make_action(&gear.action)?);
            }
        }
        Ok(Entity {
            id,
            name: def.name.clone(),
            side: def.side,
            pos,
            dims: def.dims.max(IVec2::ONE),
            stats: def.stats.map(crate::Stats::new),
            actions,
            object: def.object,
            los: (!def.object).then(LosCache::default),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use glam::ivec2;

    #[test]
    fn catalog_instantiation() {
        let catalog = fixtures::catalog();
        let ent = catalog
            .make_entity("explorer", EntityId(1), ivec2(2, 2))
            .unwrap();
        assert_eq!(ent.side, Side::Explorers);
        assert!(ent.stats.is_some());
        assert!(!ent.actions.is_empty());
        assert!(ent.los.is_some());

        let obj = catalog
            .make_entity("relic", EntityId(2), ivec2(4, 4))
            .unwrap();
        assert!(obj.object);
        assert!(obj.los.is_none());

        assert!(catalog
            .make_entity("nonesuch", EntityId(3), ivec2(0, 0))
            .is_err());
        assert!(catalog.make_action("nonesuch").is_err());
    }

    #[test]
    fn gear_may_carry_only_a_condition() {
        let mut catalog = fixtures::catalog();
        let mut def = catalog.entities["explorer"].clone();
        def.name = "novice".into();
        def.gear = Some(Gear {
            name: "charm".into(),
            condition: "brave".into(),
            ..Default::default()
        });
        catalog.entities.insert("novice".into(), def);

        let ent = catalog
            .make_entity("novice", EntityId(1), ivec2(2, 2))
            .unwrap();
        // Just the innate inspect, nothing from the actionless gear.
        assert_eq!(ent.actions.len(), 1);
    }

    #[test]
    fn summon_ammo_from_def() {
        let catalog = fixtures::catalog();
        let AnyAction::Summon(s) = catalog.make_action("summon-wisp").unwrap()
        else {
            panic!("expected a summon");
        };
        assert_eq!(s.current_ammo, 2);
    }
}
