pub mod forward;
pub mod solver;
pub mod timing;
