//! Pathfinding graph views over the house.

use glam::{ivec2, IVec2};
use util::HashSet;
use world::connected;

use crate::{EntityId, Game, Side};

/// The contract pathfinding consumers run against.
pub trait Graph {
    fn num_vertex(&self) -> usize;
    fn adjacent(&self, v: usize) -> (Vec<usize>, Vec<f32>);
}

impl Game {
    /// Total cell count across the floor's rooms. Also the sentinel
    /// returned by `to_vertex` for positions outside every room.
    pub fn num_vertex(&self) -> usize {
        self.floor()
            .rooms
            .iter()
            .map(|r| (r.size.x * r.size.y) as usize)
            .sum()
    }

    /// Resolve a vertex to its room index and house-global cell. Vertices
    /// are numbered room by room, each room's cells in raster order.
    pub fn from_vertex(&self, v: usize) -> Option<(usize, IVec2)> {
        let mut rem = v;
        for (ri, room) in self.floor().rooms.iter().enumerate() {
            let area = (room.size.x * room.size.y) as usize;
            if rem < area {
                let local = ivec2(
                    rem as i32 % room.size.x,
                    rem as i32 / room.size.x,
                );
                return Some((ri, room.pos + local));
            }
            rem -= area;
        }
        None
    }

    /// Inverse of `from_vertex`. Positions outside every room map to
    /// `num_vertex()`.
    pub fn to_vertex(&self, pos: IVec2) -> usize {
        let mut offset = 0;
        for room in &self.floor().rooms {
            if room.contains(pos) {
                let local = pos - room.pos;
                return offset + (local.x + local.y * room.size.x) as usize;
            }
            offset += (room.size.x * room.size.y) as usize;
        }
        offset
    }
}

/// Cell-level movement graph for one side. Cells are walkable when
/// unoccupied, bright enough in the side's fog texture, inside a room,
/// clear of furniture, and reachable through open doors.
pub struct CellGraph<'a> {
    g: &'a Game,
    side: Side,
    exclude: HashSet<EntityId>,
}

impl<'a> CellGraph<'a> {
    pub fn new(g: &'a Game, side: Side) -> CellGraph<'a> {
        CellGraph {
            g,
            side,
            exclude: HashSet::default(),
        }
    }

    /// Ignore the listed entities in occupancy checks, used when the
    /// pathing entity will vacate its own footprint.
    pub fn excluding(
        g: &'a Game,
        side: Side,
        exclude: impl IntoIterator<Item = EntityId>,
    ) -> CellGraph<'a> {
        CellGraph {
            g,
            side,
            exclude: exclude.into_iter().collect(),
        }
    }

    fn blocked(&self, t: IVec2) -> bool {
        if !self.g.cell_visible(self.side, t) {
            return true;
        }
        let Some(room) = self.g.floor().room_at(t) else {
            return true;
        };
        if room.furniture_at(t - room.pos).is_some() {
            return true;
        }
        self.g
            .ents()
            .iter()
            .filter(|e| e.alive() && !self.exclude.contains(&e.id))
            .any(|e| e.footprint().any(|c| c == t))
    }
}

impl Graph for CellGraph<'_> {
    fn num_vertex(&self) -> usize {
        self.g.num_vertex()
    }

    fn adjacent(&self, v: usize) -> (Vec<usize>, Vec<f32>) {
        let mut verts = Vec::new();
        let mut weights = Vec::new();
        let Some((_, p)) = self.g.from_vertex(v) else {
            return (verts, weights);
        };
        let floor = self.g.floor();
        let Some(room) = floor.room_at(p) else {
            return (verts, weights);
        };

        // Viable orthogonal moves recorded for the diagonal pass.
        let mut moves = [[0.0f32; 3]; 3];
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let t = p + ivec2(dx, dy);
            if self.blocked(t) {
                continue;
            }
            let room2 = match floor.room_at(t) {
                Some(r) => r,
                None => continue,
            };
            if room2.pos != room.pos && !connected(room, room2, p, t) {
                continue;
            }
            moves[(dx + 1) as usize][(dy + 1) as usize] = 1.0;
            verts.push(self.g.to_vertex(t));
            weights.push(1.0);
        }
        for (dx, dy) in [(-1, -1), (-1, 1), (1, -1), (1, 1)] {
            // A diagonal is only offered when both contributing
            // orthogonal moves are viable, no clipping through corners.
            let w_x = moves[(dx + 1) as usize][1];
            let w_y = moves[1][(dy + 1) as usize];
            if w_x == 0.0 || w_y == 0.0 {
                continue;
            }
            let t = p + ivec2(dx, dy);
            if self.blocked(t) {
                continue;
            }
            let room2 = match floor.room_at(t) {
                Some(r) => r,
                None => continue,
            };
            if room2.pos != room.pos
                && !(connected(room, room2, p, t)
                    && connected(room2, room, t, p))
            {
                continue;
            }
            verts.push(self.g.to_vertex(t));
            weights.push((w_x + w_y) / 2.0);
        }
        (verts, weights)
    }
}

/// Room-level graph for coarse planning. Rooms are adjacent when they
/// share a door pair, open or not.
pub struct RoomGraph<'a> {
    g: &'a Game,
}

impl<'a> RoomGraph<'a> {
    pub fn new(g: &'a Game) -> RoomGraph<'a> {
        RoomGraph { g }
    }
}

impl Graph for RoomGraph<'_> {
    fn num_vertex(&self) -> usize {
        self.g.floor().rooms.len()
    }

    fn adjacent(&self, v: usize) -> (Vec<usize>, Vec<f32>) {
        let floor = self.g.floor();
        let mut verts = Vec::new();
        let Some(room) = floor.rooms.get(v) else {
            return (verts, Vec::new());
        };
        for di in 0..room.doors.len() {
            if let Some((ri, _)) = floor.find_matching_door(v, di) {
                if !verts.contains(&ri) {
                    verts.push(ri);
                }
            }
        }
        let weights = vec![1.0; verts.len()];
        (verts, weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, LosMode};

    #[test]
    fn vertex_mapping_is_a_bijection() {
        let g = fixtures::game();
        let n = g.num_vertex();
        assert_eq!(n, 200);
        for v in 0..n {
            let (_, pos) = g.from_vertex(v).unwrap();
            assert_eq!(g.to_vertex(pos), v);
        }
        assert!(g.from_vertex(n).is_none());
        // Positions outside every room hit the sentinel.
        assert_eq!(g.to_vertex(ivec2(-3, -3)), n);
    }

    #[quickcheck_macros::quickcheck]
    fn any_in_room_cell_maps_to_one_vertex(x: i8, y: i8) -> bool {
        let g = fixtures::game();
        let pos = ivec2(x as i32, y as i32);
        let v = g.to_vertex(pos);
        match g.from_vertex(v) {
            Some((_, p)) => p == pos,
            None => v == g.num_vertex(),
        }
    }

    fn neighbors_of(g: &Game, p: IVec2) -> Vec<IVec2> {
        let graph = CellGraph::new(g, Side::Explorers);
        let (verts, _) = graph.adjacent(g.to_vertex(p));
        verts
            .into_iter()
            .map(|v| g.from_vertex(v).unwrap().1)
            .collect()
    }

    #[test]
    fn open_floor_has_eight_neighbors() {
        let mut g = fixtures::game();
        g.set_los_mode(Side::Explorers, LosMode::All, &[]);
        g.merge_los(Side::Explorers);
        let n = neighbors_of(&g, ivec2(5, 5));
        assert_eq!(n.len(), 8);
    }

    #[test]
    fn occupied_cells_block_and_forbid_corner_cuts() {
        let mut g = fixtures::game();
        g.set_los_mode(Side::Explorers, LosMode::All, &[]);
        g.merge_los(Side::Explorers);
        g.spawn_at("wisp", ivec2(6, 5)).unwrap();
        g.spawn_at("wisp", ivec2(5, 6)).unwrap();

        let n = neighbors_of(&g, ivec2(5, 5));
        assert!(!n.contains(&ivec2(6, 5)));
        assert!(!n.contains(&ivec2(5, 6)));
        // Both orthogonal contributors are blocked, so the diagonal
        // between them is off the table even though the cell is free.
        assert!(!n.contains(&ivec2(6, 6)));
        assert!(n.contains(&ivec2(4, 5)));
        assert!(n.contains(&ivec2(4, 4)));
    }

    #[test]
    fn exclusions_unblock_own_footprint() {
        let mut g = fixtures::game();
        g.set_los_mode(Side::Explorers, LosMode::All, &[]);
        g.merge_los(Side::Explorers);
        let id = g.spawn_at("wisp", ivec2(6, 5)).unwrap();

        let graph = CellGraph::excluding(&g, Side::Explorers, [id]);
        let (verts, _) = graph.adjacent(g.to_vertex(ivec2(5, 5)));
        let cells: Vec<IVec2> = verts
            .into_iter()
            .map(|v| g.from_vertex(v).unwrap().1)
            .collect();
        assert!(cells.contains(&ivec2(6, 5)));
    }

    #[test]
    fn doors_gate_cross_room_edges() {
        let mut g = fixtures::game();
        g.set_los_mode(Side::Explorers, LosMode::All, &[]);
        g.merge_los(Side::Explorers);

        // Door closed: no edge across the shared wall.
        let n = neighbors_of(&g, ivec2(9, 4));
        assert!(!n.contains(&ivec2(10, 4)));

        g.set_door_opened(0, 0, true);
        let n = neighbors_of(&g, ivec2(9, 4));
        assert!(n.contains(&ivec2(10, 4)));
        // The diagonal into (10, 3) fails the reverse connectivity check,
        // the far door half does not cover row 3.
        assert!(!n.contains(&ivec2(10, 3)));
    }

    #[test]
    fn unseen_cells_are_not_walkable() {
        let mut g = fixtures::game();
        g.set_los_mode(Side::Explorers, LosMode::None, &[]);
        g.merge_los(Side::Explorers);
        let n = neighbors_of(&g, ivec2(5, 5));
        assert!(n.is_empty());
    }

    #[test]
    fn room_graph_links_door_pairs() {
        let g = fixtures::game();
        let rooms = RoomGraph::new(&g);
        assert_eq!(rooms.num_vertex(), 2);
        let (verts, weights) = rooms.adjacent(0);
        assert_eq!(verts, vec![1]);
        assert_eq!(weights, vec![1.0]);
        let (verts, _) = rooms.adjacent(1);
        assert_eq!(verts, vec![0]);
    }
}
