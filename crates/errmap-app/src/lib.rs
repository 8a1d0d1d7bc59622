//! Application service layer - config, scanning, export, measuring workflow

pub mod clock;
pub mod config;
pub mod export;
pub mod repository;
pub mod scanner;
pub mod workflow;
