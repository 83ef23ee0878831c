pub mod classifier;
pub mod facts;
pub mod fs;
