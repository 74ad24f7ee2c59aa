mod interact;
pub use interact::{Interact, InteractExec};

mod summon;
pub use summon::{Summon, SummonExec};
