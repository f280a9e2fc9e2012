// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod chapter;
pub mod leaderboard;
pub mod mcq;
pub mod performance;
pub mod preferences;
pub mod result;
pub mod subject;
