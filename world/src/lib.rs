//! Static spatial model of the house: rooms, doors, furniture, and the
//! fog-of-war intensity texture.

mod house;
pub use house::{connected, Door, Floor, Furniture, HouseDef, Room, WallFacing};

mod los_texture;
pub use los_texture::{
    LosTexture, LOS_MIN_VISIBILITY, LOS_TEXTURE_SIZE, LOS_VISIBILITY_THRESHOLD,
};
