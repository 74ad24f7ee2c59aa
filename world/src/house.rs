//! House definitions and connectivity queries.

use anyhow::{bail, Result};
use glam::{ivec2, vec2, IVec2};
use serde::{Deserialize, Serialize};
use util::Rect;

/// Which wall of a room a door sits on.
///
/// `NearLeft` is the `x == 0` wall and `NearRight` the `y == 0` wall;
/// `FarRight` and `FarLeft` are the opposite walls. Doors on `NearLeft` and
/// `FarRight` walls span along the y axis, the other two along x.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum WallFacing {
    #[default]
    NearLeft,
    NearRight,
    FarLeft,
    FarRight,
}

impl WallFacing {
    /// The facing of the paired door half in the adjacent room.
    pub fn opposite(self) -> WallFacing {
        use WallFacing::*;
        match self {
            NearLeft => FarRight,
            FarRight => NearLeft,
            NearRight => FarLeft,
            FarLeft => NearRight,
        }
    }

    pub fn runs_along_y(self) -> bool {
        matches!(self, WallFacing::NearLeft | WallFacing::FarRight)
    }
}

/// One half of a door pair. The matching half lives in the adjacent room
/// on the same wall segment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Door {
    pub facing: WallFacing,
    /// Offset along the wall, in room-local coordinates.
    pub pos: i32,
    pub width: i32,
    pub opened: bool,
    pub always_open: bool,
    /// Targeting UI highlight, not part of the house definition proper.
    #[serde(skip)]
    pub highlight_threshold: bool,
}

impl Door {
    pub fn is_opened(&self) -> bool {
        self.opened || self.always_open
    }

    pub fn set_opened(&mut self, opened: bool) {
        if !self.always_open {
            self.opened = opened;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Furniture {
    pub name: String,
    /// Room-local footprint origin.
    pub pos: IVec2,
    pub dims: IVec2,
    pub blocks_los: bool,
}

impl Furniture {
    pub fn contains(&self, local: IVec2) -> bool {
        local.x >= self.pos.x
            && local.x < self.pos.x + self.dims.x
            && local.y >= self.pos.y
            && local.y < self.pos.y + self.dims.y
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Room {
    pub name: String,
    /// House-global origin.
    pub pos: IVec2,
    pub size: IVec2,
    pub doors: Vec<Door>,
    pub furniture: Vec<Furniture>,
}

impl Room {
    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= self.pos.x
            && p.y >= self.pos.y
            && p.x < self.pos.x + self.size.x
            && p.y < self.pos.y + self.size.y
    }

    /// First furniture whose footprint covers the room-local point.
    pub fn furniture_at(&self, local: IVec2) -> Option<&Furniture> {
        self.furniture.iter().find(|f| f.contains(local))
    }

    /// House-global start of the wall span covered by a door, along the
    /// axis the door runs on.
    pub fn door_span_start(&self, door: &Door) -> i32 {
        if door.facing.runs_along_y() {
            self.pos.y + door.pos
        } else {
            self.pos.x + door.pos
        }
    }

    /// Click region around a door's threshold, in house-global float
    /// coordinates. The rect straddles the wall by half a cell so both
    /// sides of the threshold hit it.
    pub fn door_rect(&self, door: &Door) -> Rect {
        let (dx, dy) = (self.size.x, self.size.y);
        let r = match door.facing {
            WallFacing::FarLeft => Rect::from_cells(
                ivec2(door.pos, dy - 1),
                ivec2(door.width, 1),
            )
            .translate(vec2(0.0, 0.5)),
            WallFacing::FarRight => Rect::from_cells(
                ivec2(dx - 1, door.pos),
                ivec2(1, door.width),
            )
            .translate(vec2(0.5, 0.0)),
            WallFacing::NearLeft => {
                Rect::from_cells(ivec2(0, door.pos), ivec2(1, door.width))
                    .translate(vec2(-0.5, 0.0))
            }
            WallFacing::NearRight => {
                Rect::from_cells(ivec2(door.pos, 0), ivec2(door.width, 1))
                    .translate(vec2(0.0, -0.5))
            }
        };
        r.translate(vec2(self.pos.x as f32, self.pos.y as f32))
    }

    fn wall_len(&self, facing: WallFacing) -> i32 {
        if facing.runs_along_y() {
            self.size.y
        } else {
            self.size.x
        }
    }
}

/// Room connectivity at a boundary crossing.
///
/// `p` lies inside `r` and `p2` inside `r2`, both house-global. Only the
/// doors of `r` are consulted, so the query is asymmetric by construction;
/// callers that need both directions must call twice with the arguments
/// swapped.
pub fn connected(r: &Room, r2: &Room, p: IVec2, p2: IVec2) -> bool {
    // Rooms never overlap, so origin equality identifies a room.
    if r.pos == r2.pos {
        return true;
    }
    let l = p - r.pos;
    let l2 = p2 - r2.pos;
    let facing = if l.x == 0 && l2.x != 0 {
        WallFacing::NearLeft
    } else if l.y == 0 && l2.y != 0 {
        WallFacing::NearRight
    } else if l.x != 0 && l2.x == 0 {
        WallFacing::FarRight
    } else if l.y != 0 && l2.y == 0 {
        WallFacing::FarLeft
    } else {
        // Not a wall crossing between these rooms; never treat it as an
        // open door.
        return false;
    };
    for door in &r.doors {
        if door.facing != facing {
            continue;
        }
        let pos = if facing.runs_along_y() { l.y } else { l.x };
        if pos >= door.pos && pos < door.pos + door.width {
            return door.is_opened();
        }
    }
    false
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Floor {
    pub rooms: Vec<Room>,
}

impl Floor {
    pub fn room_at(&self, p: IVec2) -> Option<&Room> {
        self.rooms.iter().find(|r| r.contains(p))
    }

    pub fn room_index_at(&self, p: IVec2) -> Option<usize> {
        self.rooms.iter().position(|r| r.contains(p))
    }

    /// Is the room at `other` index adjacent across the wall a door with
    /// this facing sits on?
    fn adjacent_across(&self, room: usize, facing: WallFacing, other: usize) -> bool {
        let r = &self.rooms[room];
        let n = &self.rooms[other];
        match facing {
            WallFacing::NearLeft => n.pos.x + n.size.x == r.pos.x,
            WallFacing::FarRight => n.pos.x == r.pos.x + r.size.x,
            WallFacing::NearRight => n.pos.y + n.size.y == r.pos.y,
            WallFacing::FarLeft => n.pos.y == r.pos.y + r.size.y,
        }
    }

    /// Find the paired half of a door: same global wall span, opposite
    /// facing, in the room adjacent across the wall.
    pub fn find_matching_door(
        &self,
        room: usize,
        door: usize,
    ) -> Option<(usize, usize)> {
        let r = self.rooms.get(room)?;
        let d = r.doors.get(door)?;
        let want = d.facing.opposite();
        let span = r.door_span_start(d);

        for (ri, r2) in self.rooms.iter().enumerate() {
            if ri == room || !self.adjacent_across(room, d.facing, ri) {
                continue;
            }
            for (di, d2) in r2.doors.iter().enumerate() {
                if d2.facing == want
                    && d2.width == d.width
                    && r2.door_span_start(d2) == span
                {
                    return Some((ri, di));
                }
            }
        }
        None
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HouseDef {
    pub name: String,
    pub floors: Vec<Floor>,
}

impl HouseDef {
    /// Reject definitions the engine cannot run on: empty houses,
    /// non-positive rooms, overlapping rooms, and doors hanging off their
    /// wall.
    pub fn validate(&self) -> Result<()> {
        if self.floors.is_empty() {
            bail!("house {:?} has no floors", self.name);
        }
        for floor in &self.floors {
            for (i, r) in floor.rooms.iter().enumerate() {
                if r.size.x <= 0 || r.size.y <= 0 {
                    bail!("room {:?} has non-positive size", r.name);
                }
                for r2 in &floor.rooms[i + 1..] {
                    let disjoint = r.pos.x + r.size.x <= r2.pos.x
                        || r2.pos.x + r2.size.x <= r.pos.x
                        || r.pos.y + r.size.y <= r2.pos.y
                        || r2.pos.y + r2.size.y <= r.pos.y;
                    if !disjoint {
                        bail!("rooms {:?} and {:?} overlap", r.name, r2.name);
                    }
                }
                for d in &r.doors {
                    if d.width <= 0
                        || d.pos < 0
                        || d.pos + d.width > r.wall_len(d.facing)
                    {
                        bail!(
                            "door at {}+{} does not fit the {:?} wall of room {:?}",
                            d.pos,
                            d.width,
                            d.facing,
                            r.name
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Complete door pairs: every door whose adjacent room lacks the
    /// matching half gets one inserted with the same span and open state.
    pub fn normalize(&mut self) {
        for floor in &mut self.floors {
            let mut inserts: Vec<(usize, Door)> = Vec::new();
            for ri in 0..floor.rooms.len() {
                for di in 0..floor.rooms[ri].doors.len() {
                    if floor.find_matching_door(ri, di).is_some() {
                        continue;
                    }
                    let d = floor.rooms[ri].doors[di].clone();
                    let span = floor.rooms[ri].door_span_start(&d);
                    let facing = d.facing.opposite();
                    let Some(ni) = (0..floor.rooms.len()).find(|&ni| {
                        ni != ri
                            && floor.adjacent_across(ri, d.facing, ni)
                            && {
                                let n = &floor.rooms[ni];
                                let origin = if facing.runs_along_y() {
                                    n.pos.y
                                } else {
                                    n.pos.x
                                };
                                span >= origin
                                    && span + d.width
                                        <= origin + n.wall_len(facing)
                            }
                    }) else {
                        log::warn!(
                            "door on room {:?} opens into nothing",
                            floor.rooms[ri].name
                        );
                        continue;
                    };
                    let n = &floor.rooms[ni];
                    let origin =
                        if facing.runs_along_y() { n.pos.y } else { n.pos.x };
                    inserts.push((
                        ni,
                        Door {
                            facing,
                            pos: span - origin,
                            width: d.width,
                            opened: d.opened,
                            always_open: d.always_open,
                            highlight_threshold: false,
                        },
                    ));
                }
            }
            for (ri, door) in inserts {
                log::debug!(
                    "normalize: adding {:?} door half to room {:?}",
                    door.facing,
                    floor.rooms[ri].name
                );
                floor.rooms[ri].doors.push(door);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::ivec2;
    use pretty_assertions::assert_eq;

    // Two 10x10 rooms side by side, a 2-wide door pair at y=4..6 on the
    // shared wall.
    fn two_rooms(opened: bool) -> Floor {
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

    #[test]
    fn room_and_furniture_lookup() {
        let mut floor = two_rooms(true);
        floor.rooms[0].furniture.push(Furniture {
            name: "bookcase".into(),
            pos: ivec2(2, 2),
            dims: ivec2(2, 1),
            blocks_los: true,
        });

        assert_eq!(floor.room_index_at(ivec2(3, 3)), Some(0));
        assert_eq!(floor.room_index_at(ivec2(12, 3)), Some(1));
        assert_eq!(floor.room_index_at(ivec2(25, 3)), None);

        let west = &floor.rooms[0];
        assert!(west.furniture_at(ivec2(3, 2)).is_some());
        assert!(west.furniture_at(ivec2(4, 2)).is_none());
    }

    #[test]
    fn connected_through_door_pair() {
        let floor = two_rooms(true);
        let (w, e) = (&floor.rooms[0], &floor.rooms[1]);
        // Crossing at a covered wall offset, both directions.
        assert!(connected(w, e, ivec2(9, 4), ivec2(10, 4)));
        assert!(connected(e, w, ivec2(10, 4), ivec2(9, 4)));
        // Same room is trivially connected.
        assert!(connected(w, w, ivec2(1, 1), ivec2(2, 1)));
        // Outside the door span.
        assert!(!connected(w, e, ivec2(9, 7), ivec2(10, 7)));

        let floor = two_rooms(false);
        let (w, e) = (&floor.rooms[0], &floor.rooms[1]);
        assert!(!connected(w, e, ivec2(9, 4), ivec2(10, 4)));
        assert!(!connected(e, w, ivec2(10, 4), ivec2(9, 4)));
    }

    #[test]
    fn matching_door_lookup() {
        let floor = two_rooms(true);
        assert_eq!(floor.find_matching_door(0, 0), Some((1, 0)));
        assert_eq!(floor.find_matching_door(1, 0), Some((0, 0)));
    }

    #[test]
    fn normalize_completes_pairs() {
        let mut house = HouseDef {
            name: "test".into(),
            floors: vec![two_rooms(true)],
        };
        // Drop the east half of the pair.
        house.floors[0].rooms[1].doors.clear();
        assert_eq!(house.floors[0].find_matching_door(0, 0), None);

        house.normalize();
        assert_eq!(house.floors[0].find_matching_door(0, 0), Some((1, 0)));
        let east_door = &house.floors[0].rooms[1].doors[0];
        assert_eq!(east_door.facing, WallFacing::NearLeft);
        assert_eq!(east_door.pos, 4);
        assert_eq!(east_door.width, 2);
        assert!(east_door.opened);

        // Running it again adds nothing.
        house.normalize();
        assert_eq!(house.floors[0].rooms[1].doors.len(), 1);
    }

    #[test]
    fn validation_catches_overlap() {
        let mut house = HouseDef {
            name: "bad".into(),
            floors: vec![two_rooms(true)],
        };
        assert!(house.validate().is_ok());

        house.floors[0].rooms[1].pos = ivec2(5, 5);
        assert!(house.validate().is_err());
    }

    #[test]
    fn door_rect_straddles_wall() {
        let floor = two_rooms(true);
        let west = &floor.rooms[0];
        let rect = west.door_rect(&west.doors[0]);
        // Right wall of the west room, pushed half a cell outward.
        assert!(rect.contains(glam::vec2(9.6, 4.5)));
        assert!(rect.contains(glam::vec2(10.2, 5.5)));
        assert!(!rect.contains(glam::vec2(9.6, 7.0)));
    }
}
