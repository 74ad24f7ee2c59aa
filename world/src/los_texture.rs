//! Fog-of-war intensity texture.

use derive_more::{Deref, DerefMut};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use util::Grid;

/// Side length of the square intensity texture, in board cells.
pub const LOS_TEXTURE_SIZE: i32 = 64;

/// Intensity at or above which a cell counts as currently visible.
pub const LOS_VISIBILITY_THRESHOLD: u8 = 200;

/// Floor intensity for cells that have been seen at least once. Fog decay
/// never drops a remembered cell below this, so explored areas stay dimly
/// readable.
pub const LOS_MIN_VISIBILITY: u8 = 32;

/// Per-cell visibility intensity for one side, smoothed over time by fog
/// decay rather than flipping binary.
#[derive(Clone, Debug, Deref, DerefMut, PartialEq, Serialize, Deserialize)]
pub struct LosTexture {
    #[deref]
    #[deref_mut]
    pix: Grid<u8>,
    #[serde(skip)]
    dirty: bool,
}

impl Default for LosTexture {
    fn default() -> Self {
        LosTexture::new()
    }
}

impl LosTexture {
    pub fn new() -> LosTexture {
        LosTexture {
            pix: Grid::new((LOS_TEXTURE_SIZE, LOS_TEXTURE_SIZE)),
            dirty: false,
        }
    }

    /// Is the cell bright enough to act on? Out-of-bounds cells are never
    /// visible.
    pub fn visible(&self, p: IVec2) -> bool {
        self.pix
            .get(p)
            .is_some_and(|&v| v >= LOS_VISIBILITY_THRESHOLD)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Poll-and-clear flag for renderers that re-upload the texture only
    /// when it changed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::ivec2;

    #[test]
    fn visibility_threshold() {
        let mut tex = LosTexture::new();
        assert!(!tex.visible(ivec2(3, 3)));

        tex[ivec2(3, 3)] = LOS_VISIBILITY_THRESHOLD;
        assert!(tex.visible(ivec2(3, 3)));
        tex[ivec2(3, 3)] = LOS_VISIBILITY_THRESHOLD - 1;
        assert!(!tex.visible(ivec2(3, 3)));

        // Out of bounds is never visible.
        assert!(!tex.visible(ivec2(-1, 0)));
        assert!(!tex.visible(ivec2(LOS_TEXTURE_SIZE, 0)));
    }

    #[test]
    fn dirty_flag_polls_and_clears() {
        let mut tex = LosTexture::new();
        assert!(!tex.take_dirty());
        tex.mark_dirty();
        assert!(tex.take_dirty());
        assert!(!tex.take_dirty());
    }
}
