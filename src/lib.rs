pub mod advisor;
pub mod ai;
pub mod engine;
pub mod rules;
pub mod types;
