pub mod button;
pub mod health;
pub mod screen;
