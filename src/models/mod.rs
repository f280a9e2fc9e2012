// src/models/mod.rs

pub mod admin;
pub mod attempt;
pub mod badge;
pub mod chapter;
pub mod leaderboard;
pub mod mcq;
pub mod performance;
pub mod preferences;
pub mod subject;
pub mod user;
