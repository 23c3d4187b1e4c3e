pub mod position;
pub mod tick;
