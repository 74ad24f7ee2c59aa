//! Shared construction helpers for the crate's tests.

use glam::ivec2;
use world::{Door, Floor, HouseDef, Room, WallFacing};

use crate::{
    stats::{Base, Condition, Kind},
    ActionDef, Catalog, EntityDef, Game, Gear, InteractDef, ScriptHandle,
    Side, SummonDef,
};

pub fn one_room_floor() -> Floor {
    Floor {
        rooms: vec![Room {
            name: "hall".into(),
            pos: ivec2(0, 0),
            size: ivec2(12, 12),
            ..Default::default()
        }],
    }
}

/// Two 10x10 rooms side by side with a 2-wide door pair at rows 4-5 of
/// the shared wall.
pub fn two_room_floor(opened: bool) -> Floor {
    Floor {
        rooms: vec![
            Room {
                name: "west".into(),
                pos: ivec2(0, 0),
                size: ivec2(10, 10),
                doors: vec![Door {
                    facing: WallFacing::FarRight,
                    pos: 4,
                    width: 2,
                    opened,
                    ..Default::default()
                }],
                ..Default::default()
            },
            Room {
                name: "east".into(),
                pos: ivec2(10, 0),
                size: ivec2(10, 10),
                doors: vec![Door {
                    facing: WallFacing::NearLeft,
                    pos: 4,
                    width: 2,
                    opened,
                    ..Default::default()
                }],
                ..Default::default()
            },
        ],
    }
}

pub fn house() -> HouseDef {
    HouseDef {
        name: "testhouse".into(),
        floors: vec![two_room_floor(false)],
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
            display_name: "Pry".into(),
            ap: 1,
            range: 1,
            animation: String::new(),
            icon: "crowbar".into(),
        }),
    );
    catalog.actions.insert(
        "summon-wisp".into(),
        ActionDef::Summon(SummonDef {
            name: "summon-wisp".into(),
            display_name: "Summon Wisp".into(),
            ap: 2,
            ammo: 2,
            range: 3,
            personal_los: true,
            ent_name: "wisp".into(),
            animation: "conjure".into(),
            icon: "wisp".into(),
        }),
    );
    catalog.conditions.insert(
        "brave".into(),
        Condition {
            name: "brave".into(),
            kind: Kind::Panic,
            strength: 1,
            modifier: Base {
                hp_max: 1,
                ..Default::default()
            },
            rounds: -1,
            ..Default::default()
        },
    );
    catalog.entities.insert(
        "explorer".into(),
        EntityDef {
            name: "explorer".into(),
            side: Side::Explorers,
            dims: ivec2(1, 1),
            stats: Some(Base {
                ap_max: 5,
                hp_max: 10,
                sight: 4,
            }),
            actions: vec!["inspect".into()],
            gear: Some(Gear {
                name: "lantern".into(),
                action: "pry".into(),
                condition: "brave".into(),
            }),
            ..Default::default()
        },
    );
    catalog.entities.insert(
        "wisp".into(),
        EntityDef {
            name: "wisp".into(),
            side: Side::Haunt,
            dims: ivec2(1, 1),
            stats: Some(Base {
                ap_max: 3,
                hp_max: 5,
                sight: 4,
            }),
            actions: vec!["pry".into()],
            ..Default::default()
        },
    );
    catalog.entities.insert(
        "master".into(),
        EntityDef {
            name: "master".into(),
            side: Side::Haunt,
            dims: ivec2(1, 1),
            stats: Some(Base {
                ap_max: 5,
                hp_max: 8,
                sight: 5,
            }),
            actions: vec!["pry".into(), "summon-wisp".into()],
            ..Default::default()
        },
    );
    catalog.entities.insert(
        "relic".into(),
        EntityDef {
            name: "relic".into(),
            side: Side::None,
            dims: ivec2(1, 1),
            object: true,
            ..Default::default()
        },
    );
    catalog.entities.insert(
        "crate".into(),
        EntityDef {
            name: "crate".into(),
            side: Side::None,
            dims: ivec2(2, 1),
            object: true,
            ..Default::default()
        },
    );
    catalog
}

pub fn game() -> Game {
    let (g, _handle) = Game::new(house(), catalog(), Side::None).unwrap();
    g
}

/// Game with entity-driven fog on both sides.
pub fn sighted_game() -> Game {
    let mut g = game();
    g.fog_of_war();
    g
}

pub fn game_with_script() -> (Game, ScriptHandle) {
    Game::new(house(), catalog(), Side::None).unwrap()
}

pub fn game_with_script_human(side: Side) -> (Game, ScriptHandle) {
    Game::new(house(), catalog(), side).unwrap()
}
