//! Command handlers

pub mod add;
pub mod config;
pub mod generate;
pub mod list;
pub mod render;
pub mod show;
pub mod status;
