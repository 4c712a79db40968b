//! # Control library.
//!
//! This library allows other crates in the workspace (and the executables of this crate) to
//! access the planning and control core, the perception boundary and the telemetry builders.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy - maps, path planning, trajectories and trajectory control
pub mod auto;

/// Per-cycle data of the executable
pub mod data_store;

/// Parameters of the executable
pub mod params;

/// Simulation client - a simulated vision source driven by the commands sent to the robots
pub mod sim_client;

/// Telemetry snapshot building and recording
pub mod tm;

/// Vision client - converts detection frames into world snapshots and publishes them
pub mod vision_client;

/// World state snapshots and the store publishing them
pub mod world;
