pub mod display;
pub mod input;
pub mod ticker;
