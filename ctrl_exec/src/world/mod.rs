//! # World state
//!
//! The perceived state of the field: the ball and the robots of both teams, as last seen by
//! vision. A [`WorldState`] is an immutable snapshot. The [`WorldStateStore`] holds the latest
//! snapshot and lets one writer (the vision client) replace it while any number of readers (the
//! control loop, telemetry) take consistent snapshots without locking.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod state;
mod store;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use state::{
    BallState, RobotId, RobotIdError, TeamColour, TeamState, WorldState, MAX_ROBOTS_PER_TEAM,
};
pub use store::WorldStateStore;
