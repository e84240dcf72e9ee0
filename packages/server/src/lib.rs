//! Real-time room chat server library.
//!
//! Authenticated WebSocket participants join a room, and every chat frame they
//! send is persisted and then fanned out to the other live connections of that
//! room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
