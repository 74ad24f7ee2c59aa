//! Integer board geometry.

use glam::{IVec2, Vec2};

/// Rasterize the line from `a` to `b` into `out` with Bresenham's
/// algorithm.
///
/// Both endpoints are always included and consecutive points differ by at
/// most one along each axis, so a walker can detect diagonal steps by
/// comparing to the previous point. `out` is cleared first so callers can
/// reuse one buffer across many rays.
pub fn bresenham_into(a: IVec2, b: IVec2, out: &mut Vec<IVec2>) {
    out.clear();

    let (mut x, mut y, mut x2, mut y2) = (a.x, a.y, b.x, b.y);
    let mut dx = (x2 - x).abs();
    let mut dy = (y2 - y).abs();

    let steep = dy > dx;
    if steep {
        std::mem::swap(&mut x, &mut y);
        std::mem::swap(&mut x2, &mut y2);
        std::mem::swap(&mut dx, &mut dy);
    }

    let mut err = dx >> 1;
    let mut cy = y;
    let xstep = if x2 < x { -1 } else { 1 };
    let ystep = if y2 < y { -1 } else { 1 };

    let mut cx = x;
    while cx != x2 {
        if steep {
            out.push(IVec2::new(cy, cx));
        } else {
            out.push(IVec2::new(cx, cy));
        }
        err -= dy;
        if err < 0 {
            cy += ystep;
            err += dx;
        }
        cx += xstep;
    }
    if steep {
        out.push(IVec2::new(cy, x2));
    } else {
        out.push(IVec2::new(x2, cy));
    }
}

/// Separation between two axis-aligned integer footprints.
///
/// Zero along an axis where the footprints overlap, otherwise the gap
/// between the nearest edges. The result is the larger of the two axis
/// gaps, so touching or overlapping footprints are at distance zero. This
/// is the metric all in-range checks use, not Euclidean distance.
pub fn footprint_gap(pos: IVec2, dims: IVec2, pos2: IVec2, dims2: IVec2) -> i32 {
    let xdist = if pos.x >= pos2.x + dims2.x {
        pos.x - (pos2.x + dims2.x)
    } else if pos2.x >= pos.x + dims.x {
        pos2.x - (pos.x + dims.x)
    } else {
        0
    };

    let ydist = if pos.y >= pos2.y + dims2.y {
        pos.y - (pos2.y + dims2.y)
    } else if pos2.y >= pos.y + dims.y {
        pos2.y - (pos.y + dims.y)
    } else {
        0
    };

    xdist.max(ydist)
}

/// Axis-aligned float rectangle, used for click regions that straddle cell
/// boundaries such as door thresholds.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, x2: f32, y2: f32) -> Rect {
        Rect { x, y, x2, y2 }
    }

    /// Rectangle covering an integer cell span.
    pub fn from_cells(pos: IVec2, dims: IVec2) -> Rect {
        Rect::new(
            pos.x as f32,
            pos.y as f32,
            (pos.x + dims.x) as f32,
            (pos.y + dims.y) as f32,
        )
    }

    pub fn translate(self, v: Vec2) -> Rect {
        Rect::new(self.x + v.x, self.y + v.y, self.x2 + v.x, self.y2 + v.y)
    }

    fn overlap_x(&self, other: &Rect) -> bool {
        (other.x >= self.x && other.x <= self.x2)
            || (other.x2 >= self.x && other.x2 <= self.x2)
    }

    fn overlap_y(&self, other: &Rect) -> bool {
        (other.y >= self.y && other.y <= self.y2)
            || (other.y2 >= self.y && other.y2 <= self.y2)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        (self.overlap_x(other) || other.overlap_x(self))
            && (self.overlap_y(other) || other.overlap_y(self))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.overlaps(&Rect::new(p.x, p.y, p.x, p.y))
    }
}
