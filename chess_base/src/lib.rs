//! # Base types for gambit
//!
//! This is an auxiliary crate for `gambit`, which contains the plain value types: squares, colors,
//! pieces and square sets. It carries no game logic.
//!
//! Normally you don't want to use this crate directly. Use `gambit` instead, which re-exports
//! everything declared here.

pub mod bitboard;
pub mod geometry;
pub mod types;
