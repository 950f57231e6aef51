//! API handlers module

pub mod demo;
pub mod health;
