//! Built-in demo scenario: three rooms, two mediums on a cleansing job,
//! a poltergeist in the study.

use anyhow::Result;
use engine::{
    ActionDef, Base, Catalog, Condition, EntityDef, Game, Gear, InteractDef,
    Kind, Purpose, Side, SummonDef,
};
use glam::ivec2;
use world::{Door, Floor, Furniture, HouseDef, Room, WallFacing};

pub fn house() -> HouseDef {
    HouseDef {
        name: "willow hill manor".into(),
        floors: vec![Floor {
            rooms: vec![
                Room {
                    name: "parlor".into(),
                    pos: ivec2(0, 0),
                    size: ivec2(8, 8),
                    doors: vec![Door {
                        facing: WallFacing::FarRight,
                        pos: 2,
                        width: 2,
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                Room {
                    name: "hall".into(),
                    pos: ivec2(8, 0),
                    size: ivec2(6, 8),
                    doors: vec![
                        Door {
                            facing: WallFacing::NearLeft,
                            pos: 2,
                            width: 2,
                            ..Default::default()
                        },
                        // The study half of this pair is filled in by
                        // house normalization.
                        Door {
                            facing: WallFacing::FarRight,
                            pos: 4,
                            width: 2,
                            ..Default::default()
                        },
                    ],
                    ..Default::default()
                },
                Room {
                    name: "study".into(),
                    pos: ivec2(14, 0),
                    size: ivec2(8, 8),
                    furniture: vec![Furniture {
                        name: "bookcase".into(),
                        pos: ivec2(3, 1),
                        dims: ivec2(1, 4),
                        blocks_los: true,
                    }],
                    ..Default::default()
                },
            ],
        }],
    }
}

pub fn catalog() -> Catalog {
    let mut catalog = Catalog::default();
    catalog.actions.insert(
        "inspect".into(),
        ActionDef::Interact(InteractDef {
            name: "inspect".into(),
            display_name: "Inspect".into(),
            ap: 2,
            range: 3,
            animation: "inspect".into(),
            icon: "eye".into(),
        }),
    );
    catalog.actions.insert(
        "pry".into(),
        ActionDef::Interact(InteractDef {
            name: "pry".into(),
            display_name: "Pry Open".into(),
            ap: 1,
            range: 1,
            animation: String::new(),
            icon: "crowbar".into(),
        }),
    );
    catalog.actions.insert(
        "summon-shade".into(),
        ActionDef::Summon(SummonDef {
            name: "summon-shade".into(),
            display_name: "Summon Shade".into(),
            ap: 2,
            ammo: 3,
            range: 4,
            personal_los: true,
            ent_name: "shade".into(),
            animation: "conjure".into(),
            icon: "shade".into(),
        }),
    );
    catalog.conditions.insert(
        "steady-nerves".into(),
        Condition {
            name: "steady-nerves".into(),
            kind: Kind::Panic,
            strength: 1,
            modifier: Base {
                hp_max: 2,
                ..Default::default()
            },
            rounds: -1,
            ..Default::default()
        },
    );
    catalog.entities.insert(
        "medium".into(),
        EntityDef {
            name: "medium".into(),
            side: Side::Explorers,
            dims: ivec2(1, 1),
            stats: Some(Base {
                ap_max: 2,
                hp_max: 10,
                sight: 5,
            }),
            actions: vec!["inspect".into()],
            gear: Some(Gear {
                name: "lantern".into(),
                action: "pry".into(),
                condition: "steady-nerves".into(),
            }),
            ..Default::default()
        },
    );
    catalog.entities.insert(
        "poltergeist".into(),
        EntityDef {
            name: "poltergeist".into(),
            side: Side::Haunt,
            dims: ivec2(1, 1),
            stats: Some(Base {
                ap_max: 6,
                hp_max: 8,
                sight: 6,
            }),
            actions: vec!["summon-shade".into()],
            ..Default::default()
        },
    );
    catalog.entities.insert(
        "shade".into(),
        EntityDef {
            name: "shade".into(),
            side: Side::Haunt,
            dims: ivec2(1, 1),
            stats: Some(Base {
                ap_max: 3,
                hp_max: 4,
                sight: 4,
            }),
            actions: vec!["pry".into()],
            ..Default::default()
        },
    );
    catalog.entities.insert(
        "altar".into(),
        EntityDef {
            name: "altar".into(),
            side: Side::None,
            dims: ivec2(1, 1),
            object: true,
            ..Default::default()
        },
    );
    catalog
}

/// Place the cast and arm the cleansing objective. One altar sits in the
/// open, the other waits behind the hall door.
pub fn populate(g: &mut Game) -> Result<()> {
    g.fog_of_war();

    let near_altar = g.spawn_at("altar", ivec2(2, 3))?;
    let far_altar = g.spawn_at("altar", ivec2(9, 3))?;
    g.spawn_at("medium", ivec2(3, 3))?;
    g.spawn_at("medium", ivec2(7, 3))?;
    g.spawn_at("poltergeist", ivec2(16, 6))?;

    g.purpose = Purpose::Cleanse;
    g.active_cleanses = vec![near_altar, far_altar];
    Ok(())
}
