pub mod range;
pub mod registry;
pub mod target;
