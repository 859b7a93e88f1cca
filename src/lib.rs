pub mod collision;
pub mod compute;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod formation;
pub mod pool;
