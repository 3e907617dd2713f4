pub mod generator;
pub mod mesh;
pub mod operators;
