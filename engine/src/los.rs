//! Visibility engine: per-entity ray cast sight, team merges and fog
//! decay.

use glam::{ivec2, IVec2};
use util::{bresenham_into, Grid};
use world::{
    connected, Floor, LOS_MIN_VISIBILITY, LOS_VISIBILITY_THRESHOLD,
};

use crate::{game::SideVis, Game, LosMode, Side};

/// Compute the visibility field from `origin` with sight radius `dist`
/// into `grid`, which is cleared first.
///
/// One ray is cast to every cell on the perimeter of the radius-`dist`
/// square around the origin. Rays stop at the first cell they cannot pass
/// but keep everything marked so far, which yields a radial field shaped
/// by walls, doors and furniture.
pub fn determine_los(
    floor: &Floor,
    origin: IVec2,
    dist: i32,
    grid: &mut Grid<bool>,
) {
    grid.fill(false);
    if let Some(cell) = grid.get_mut(origin) {
        *cell = true;
    }
    if dist <= 0 {
        return;
    }

    let min = origin - IVec2::splat(dist);
    let max = origin + IVec2::splat(dist);
    let mut line = Vec::new();
    for x in min.x..=max.x {
        do_los(floor, origin, ivec2(x, min.y), dist, grid, &mut line);
        do_los(floor, origin, ivec2(x, max.y), dist, grid, &mut line);
    }
    for y in min.y..=max.y {
        do_los(floor, origin, ivec2(min.x, y), dist, grid, &mut line);
        do_los(floor, origin, ivec2(max.x, y), dist, grid, &mut line);
    }
}

/// Can sight pass from `a` in `room_a` to `b` in `room_b`? Open-door
/// connectivity is read from the first room's door list, so both rooms
/// get a say only through separate calls. Side cells probed by diagonal
/// steps can fall outside every room at house corners; only real walls
/// block, so those read as clear.
fn sees_into(floor: &Floor, a: IVec2, b: IVec2) -> bool {
    match (floor.room_at(a), floor.room_at(b)) {
        (Some(ra), Some(rb)) => connected(ra, rb, a, b),
        _ => true,
    }
}

fn do_los(
    floor: &Floor,
    origin: IVec2,
    target: IVec2,
    mut dist: i32,
    grid: &mut Grid<bool>,
    line: &mut Vec<IVec2>,
) {
    bresenham_into(origin, target, line);
    let mut prev = origin;
    for &p in &line[1..] {
        if !grid.contains(p) {
            return;
        }
        let Some(room) = floor.room_at(p) else {
            return;
        };
        if p.x != prev.x && p.y != prev.y {
            // Diagonal step. Sight must clear both of the orthogonally
            // adjacent cells, otherwise a diagonal ray could slip through
            // the corner between two closed doors.
            let side_a = ivec2(p.x, prev.y);
            let side_b = ivec2(prev.x, p.y);
            if !(sees_into(floor, prev, side_a)
                && sees_into(floor, side_a, p)
                && sees_into(floor, prev, side_b)
                && sees_into(floor, side_b, p))
            {
                return;
            }
        } else if !sees_into(floor, prev, p) {
            return;
        }
        // Sight-blocking furniture is itself unseen.
        if room
            .furniture_at(p - room.pos)
            .is_some_and(|f| f.blocks_los)
        {
            return;
        }
        grid[p] = true;
        dist -= 1;
        if dist <= 0 {
            return;
        }
        prev = p;
    }
}

impl Game {
    /// Force every entity's sight cache to recompute on its next refresh.
    /// Called when the world changes shape, e.g. a door toggles.
    pub fn recalc_los(&mut self) {
        for e in &mut self.ents {
            if let Some(los) = &mut e.los {
                los.invalidate();
            }
        }
    }

    /// Refresh one entity's cached sight field. A no-op when the entity
    /// has no stats or cache, or when it has not moved since the last
    /// computation, unless `force` is set.
    pub(crate) fn update_ent_los(&mut self, index: usize, force: bool) {
        let ent = &mut self.ents[index];
        if ent.stats.is_none() {
            return;
        }
        let Some(mut los) = ent.los.take() else {
            return;
        };
        let pos = ent.pos;
        if !force && !los.is_stale_at(pos) {
            self.ents[index].los = Some(los);
            return;
        }
        let sight = ent.sight();
        determine_los(&self.house.floors[0], pos, sight, &mut los.grid);
        los.pos = pos;

        let size = los.grid.size();
        let (mut min, mut max) = (size, IVec2::ZERO);
        for (p, &v) in los.grid.iter() {
            if v {
                min = min.min(p);
                max = max.max(p);
            }
        }
        if min.x > max.x {
            min = IVec2::ZERO;
            max = IVec2::ZERO;
        }
        los.min = min;
        los.max = max;
        self.ents[index].los = Some(los);
    }

    fn vis(&self, side: Side) -> &SideVis {
        match side {
            Side::Haunt => &self.haunt_vis,
            _ => &self.explorer_vis,
        }
    }

    fn vis_mut(&mut self, side: Side) -> &mut SideVis {
        match side {
            Side::Haunt => &mut self.haunt_vis,
            _ => &mut self.explorer_vis,
        }
    }

    pub fn set_los_mode(&mut self, side: Side, mode: LosMode, rooms: &[usize]) {
        let vis = self.vis_mut(side);
        vis.mode = mode;
        vis.rooms = rooms.to_vec();
    }

    /// Is the cell currently in the side's merged team sight?
    pub fn team_los(&self, side: Side, p: IVec2) -> bool {
        self.vis(side)
            .merged
            .get(p)
            .copied()
            .unwrap_or(false)
    }

    /// Cell visibility as the side's fog texture reports it, which is what
    /// pathing and targeting consult.
    pub fn cell_visible(&self, side: Side, p: IVec2) -> bool {
        self.vis(side).tex.visible(p)
    }

    pub fn los_tex(&self, side: Side) -> &world::LosTexture {
        &self.vis(side).tex
    }

    /// Rebuild the side's merged team sight and snap the fog texture
    /// across the visibility threshold: newly seen texels come up to the
    /// threshold, texels that dropped out of sight fall just below it.
    /// Targeting and pathing queries flip in the same tick; the smooth
    /// ramp toward full bright or the memory floor is `decay_fog`'s job.
    pub(crate) fn merge_los(&mut self, side: Side) {
        // Refresh stale per-entity caches first.
        for i in 0..self.ents.len() {
            if self.ents[i].side == side {
                self.update_ent_los(i, false);
            }
        }

        let mode = self.vis(side).mode;
        let mut merged = std::mem::take(&mut self.vis_mut(side).merged);
        merged.fill(false);
        match mode {
            LosMode::None => {}
            LosMode::All => merged.fill(true),
            LosMode::Rooms => {
                let floor = &self.house.floors[0];
                for &ri in &self.vis(side).rooms {
                    let Some(room) = floor.rooms.get(ri) else {
                        continue;
                    };
                    for x in room.pos.x..room.pos.x + room.size.x {
                        for y in room.pos.y..room.pos.y + room.size.y {
                            if let Some(c) = merged.get_mut(ivec2(x, y)) {
                                *c = true;
                            }
                        }
                    }
                }
            }
            LosMode::Entities => {
                for e in &self.ents {
                    if e.side != side {
                        continue;
                    }
                    let Some(los) = &e.los else {
                        continue;
                    };
                    for x in los.min.x..=los.max.x {
                        for y in los.min.y..=los.max.y {
                            let p = ivec2(x, y);
                            if los.grid[p] {
                                merged[p] = true;
                            }
                        }
                    }
                }
            }
        }

        let vis = self.vis_mut(side);
        let mut changed = false;
        for (p, &seen) in merged.iter() {
            let v = vis.tex[p];
            if seen && v < LOS_VISIBILITY_THRESHOLD {
                vis.tex[p] = LOS_VISIBILITY_THRESHOLD;
                changed = true;
            } else if !seen && v >= LOS_VISIBILITY_THRESHOLD {
                vis.tex[p] = LOS_VISIBILITY_THRESHOLD - 1;
                changed = true;
            }
        }
        vis.merged = merged;
        if changed {
            vis.tex.mark_dirty();
        }
    }

    /// Smooth the fog texture over time: in-sight cells brighten toward
    /// full intensity, cells that have fallen out of sight darken toward
    /// the memory floor. Cells never seen at all stay fully dark.
    pub(crate) fn decay_fog(&mut self, side: Side, dt: i64) {
        let amt = ((dt / 5).max(1) as i32).min(255) as u8;
        let vis = self.vis_mut(side);
        let mut changed = false;
        let size = vis.merged.size();
        for x in 0..size.x {
            for y in 0..size.y {
                let p = ivec2(x, y);
                let v = vis.tex[p];
                if vis.merged[p] {
                    if v < 255 {
                        vis.tex[p] = v.saturating_add(amt);
                        changed = true;
                    }
                } else if v > LOS_MIN_VISIBILITY {
                    vis.tex[p] = v.saturating_sub(amt).max(LOS_MIN_VISIBILITY);
                    changed = true;
                }
            }
        }
        if changed {
            vis.tex.mark_dirty();
        }
    }
}
