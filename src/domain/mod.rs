pub mod actor;
pub mod obstacle;
pub mod tuning;
pub mod vec2;
