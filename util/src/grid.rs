//! Dense 2D grid addressed by board coordinates.

use std::ops::{Index, IndexMut};

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A rectangular buffer of cells with `(0, 0)` at one corner.
///
/// Out-of-bounds reads go through `get`, which returns `None`; direct
/// indexing panics on bad coordinates like slice indexing does.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    size: IVec2,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(size: impl Into<IVec2>) -> Grid<T> {
        let size = size.into();
        assert!(size.x >= 0 && size.y >= 0, "negative grid size");
        Grid {
            size,
            data: vec![T::default(); (size.x * size.y) as usize],
        }
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.size.x && pos.y < self.size.y
    }

    fn idx(&self, pos: IVec2) -> usize {
        (pos.x + pos.y * self.size.x) as usize
    }

    pub fn get(&self, pos: IVec2) -> Option<&T> {
        self.contains(pos).then(|| &self.data[self.idx(pos)])
    }

    pub fn get_mut(&mut self, pos: IVec2) -> Option<&mut T> {
        self.contains(pos).then(|| {
            let i = self.idx(pos);
            &mut self.data[i]
        })
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> + '_ {
        let w = self.size.x;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, t)| (IVec2::new(i as i32 % w, i as i32 / w), t))
    }
}

/// An empty grid, mainly useful as a `mem::take` placeholder.
impl<T: Clone + Default> Default for Grid<T> {
    fn default() -> Self {
        Grid::new(IVec2::ZERO)
    }
}

impl<T: Clone + Default> Index<IVec2> for Grid<T> {
    type Output = T;

    fn index(&self, pos: IVec2) -> &T {
        assert!(self.contains(pos), "grid index {pos} out of bounds");
        &self.data[self.idx(pos)]
    }
}

impl<T: Clone + Default> IndexMut<IVec2> for Grid<T> {
    fn index_mut(&mut self, pos: IVec2) -> &mut T {
        assert!(self.contains(pos), "grid index {pos} out of bounds");
        let i = self.idx(pos);
        &mut self.data[i]
    }
}
