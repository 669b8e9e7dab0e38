pub mod assets;
pub mod cli;
pub mod config;
pub mod error;
pub mod persistence;
pub mod world;
