pub mod field;
pub mod intensity;
