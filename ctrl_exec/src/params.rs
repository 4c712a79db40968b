//! # Control Executable Parameters
//!
//! This module provides parameters for the control executable, loaded from `ctrl_exec.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{
    sim_client::SimParams,
    world::{RobotId, TeamColour},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CtrlExecParams {
    /// Target period of one control cycle
    pub cycle_period_s: f64,

    /// Stop after this many seconds, or run until interrupted if not set
    pub run_duration_s: Option<f64>,

    /// Team of the robot being controlled
    pub team: TeamColour,

    /// Id of the robot being controlled
    pub robot_id: RobotId,

    /// Position the controlled robot shall drive to
    pub target_m: [f64; 2],

    /// Write telemetry snapshots to the session directory
    #[serde(default)]
    pub record_tm: bool,

    /// Options of the simulated vision source
    #[serde(default)]
    pub sim: SimParams,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_minimal() {
        let params: CtrlExecParams = util::params::from_str(
            r#"
            cycle_period_s = 0.02
            team = "Yellow"
            robot_id = 2
            target_m = [7.25, 5.25]
            "#,
        )
        .unwrap();

        assert_eq!(params.team, TeamColour::Yellow);
        assert_eq!(params.robot_id, RobotId::new(2));
        assert!(params.run_duration_s.is_none());
        assert!(!params.record_tm);
        assert!(params.sim.robots.is_empty());
    }
}
