//! # Evodrive - Self-Driving Cars by Hill Climbing
//!
//! A population of cars learns to weave through traffic on a multi-lane road.
//! Each car reads a fan of sensor rays into a tiny threshold network whose
//! outputs press the pedals and turn the wheel.
//!
//! ## Features
//!
//! - Ray-cast sensing against road borders and other cars
//! - Arcade kinematics with permanent crash damage
//! - Threshold neural networks seeded from the best car of the last generation
//! - Elitism plus lerp-toward-random mutation
//! - JSON configuration and network persistence
//! - Serializable snapshots for external renderers
//!
//! ## Core Modules
//!
//! - [`simulation::geometry`] - Segment and polygon intersection
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::sensor`] - Ray-casting sensor
//! - [`simulation::car`] - Car kinematics and damage
//! - [`simulation::population`] - Tick loop and generational seeding

/// Core simulation logic and data structures.
pub mod simulation {
    /// Threshold neural networks and mutation.
    pub mod brain;
    /// Car kinematics, footprints and damage.
    pub mod car;
    /// Steering state and control sources.
    pub mod controls;
    /// Error types.
    pub mod error;
    /// Segment and polygon intersection primitives.
    pub mod geometry;
    /// Simulation parameters.
    pub mod params;
    /// Learning cars, traffic and the generational loop.
    pub mod population;
    /// Multi-lane road layout.
    pub mod road;
    /// Ray-casting sensor.
    pub mod sensor;
    /// Read-only views for renderers.
    pub mod snapshot;
    /// Persistence boundary for seed networks.
    pub mod storage;
}
