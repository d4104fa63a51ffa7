//! API handlers for the blip service.

pub mod auth;
pub mod health;
pub mod posts;
