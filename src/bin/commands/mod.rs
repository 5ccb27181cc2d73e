pub mod cov;
pub mod map;
pub mod merge;
