pub mod decompose;
pub mod efficiency;
pub mod peak;
pub mod shanten;
pub mod ukeire;
pub mod wait;
