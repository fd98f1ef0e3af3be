//! Core system components for the speed governor
pub mod command;
pub mod config;
pub mod estimator;
pub mod event;
pub mod pid;
pub mod pulse;
pub mod resources;
pub mod state;
pub mod timebase;
