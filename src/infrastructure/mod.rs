pub mod config;
pub mod entities;
