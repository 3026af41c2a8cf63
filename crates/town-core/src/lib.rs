//! Simulation kernel for the town of Maplemere: a tick-driven pipeline of
//! independent subsystem passes over a shared roster of NPC entities.
//!
//! The kernel is single-threaded, synchronous, and fully deterministic given
//! `(config.seed, roster)`: every random draw is derived from seeded hashing
//! rather than an RNG state object.

pub mod biology;
pub mod clock;
pub mod emotion;
pub mod memory;
pub mod npc;
pub mod rng;
pub mod schedule;
pub mod social;
pub mod world;

pub use world::TownWorld;
