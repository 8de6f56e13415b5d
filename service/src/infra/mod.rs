//! Infrastructure layer.

pub mod ai;
pub mod database;

pub use self::{
    ai::{Ai, Gemini},
    database::{Database, Local, Persistence, Remote},
};
