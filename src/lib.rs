//! Chat session client for the Qianji assistant - library exports
//!
//! (c) Softlandia 2025

pub mod api;
pub mod core;
pub mod infrastructure;

pub use crate::api::gateway::HttpChatGateway;
pub use crate::core::services::{ChatController, FlowOptions, FlowOutcome};
