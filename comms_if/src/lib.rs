//! # Communications interface crate.
//!
//! Provides the interface structures exchanged between the control core and the collaborators
//! around it: decoded perception data coming in, and telemetry snapshots going out.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Definitions for data produced by equipment (like the vision system)
pub mod eqpt;

/// Telemetry snapshot definitions
pub mod tm;
