//! Miscellaneous low-level utilities with no game knowledge.

mod geom;
pub use geom::{bresenham_into, footprint_gap, Rect};

mod grid;
pub use grid::Grid;

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<K> = rustc_hash::FxHashSet<K>;
