//! World state snapshot types

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::auto::loc::State2;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of robot slots in a team. Robot ids at or above this are not tracked.
pub const MAX_ROBOTS_PER_TEAM: usize = 16;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Identifier of a robot within its team.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u8")]
pub struct RobotId(u8);

/// The ball as last seen.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct BallState {
    pub position_m: Vector2<f64>,
    pub velocity_ms: Vector2<f64>,
    pub t_s: f64,

    /// False if the ball was not seen, in which case position and velocity are zero
    pub valid: bool,
}

/// The robots of one team.
///
/// Each slot is indexed by robot id, and is `None` if that robot is not currently seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamState {
    pub colour: TeamColour,
    robots: [Option<State2>; MAX_ROBOTS_PER_TEAM],
}

/// One snapshot of the perceived field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldState {
    /// Capture time of the vision data this snapshot was built from
    pub t_s: f64,

    pub ball: BallState,
    pub blue: TeamState,
    pub yellow: TeamState,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamColour {
    Blue,
    Yellow,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RobotIdError {
    #[error("Robot ID {0} is outside the range 0-255")]
    OutOfRange(u32),

    #[error("Robot ID {0} has no slot in a team of {}", MAX_ROBOTS_PER_TEAM)]
    NoTeamSlot(u8),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotId {
    pub fn new(id: u8) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// The index of this robot's slot in a [`TeamState`].
    pub fn slot(&self) -> Result<usize, RobotIdError> {
        let slot = self.0 as usize;
        if slot < MAX_ROBOTS_PER_TEAM {
            Ok(slot)
        } else {
            Err(RobotIdError::NoTeamSlot(self.0))
        }
    }
}

impl TryFrom<u32> for RobotId {
    type Error = RobotIdError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        u8::try_from(id)
            .map(RobotId)
            .map_err(|_| RobotIdError::OutOfRange(id))
    }
}

impl From<RobotId> for u8 {
    fn from(id: RobotId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RobotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for TeamColour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamColour::Blue => write!(f, "blue"),
            TeamColour::Yellow => write!(f, "yellow"),
        }
    }
}

impl BallState {
    /// A ball which has not been seen.
    pub fn invalid(t_s: f64) -> Self {
        Self {
            position_m: Vector2::zeros(),
            velocity_ms: Vector2::zeros(),
            t_s,
            valid: false,
        }
    }

    /// A ball seen at a position, with unknown velocity.
    pub fn seen(position_m: Vector2<f64>, t_s: f64) -> Self {
        Self {
            position_m,
            velocity_ms: Vector2::zeros(),
            t_s,
            valid: true,
        }
    }
}

impl TeamState {
    /// A team with no robots present.
    pub fn empty(colour: TeamColour) -> Self {
        Self {
            colour,
            robots: [None; MAX_ROBOTS_PER_TEAM],
        }
    }

    /// The state of the robot, or `None` if it is not present or has no slot.
    pub fn robot(&self, id: RobotId) -> Option<&State2> {
        id.slot().ok().and_then(|i| self.robots[i].as_ref())
    }

    pub fn is_present(&self, id: RobotId) -> bool {
        self.robot(id).is_some()
    }

    /// Set the state of a robot, marking it present.
    pub fn set_robot(&mut self, id: RobotId, state: State2) -> Result<(), RobotIdError> {
        self.robots[id.slot()?] = Some(state);
        Ok(())
    }

    /// Mark a robot as no longer present.
    pub fn clear_robot(&mut self, id: RobotId) -> Result<(), RobotIdError> {
        self.robots[id.slot()?] = None;
        Ok(())
    }

    /// Every slot of the team in id order, with the state if the robot is present.
    pub fn slots(&self) -> impl Iterator<Item = (RobotId, Option<&State2>)> + '_ {
        self.robots
            .iter()
            .enumerate()
            .map(|(i, s)| (RobotId(i as u8), s.as_ref()))
    }

    /// Only the robots which are present.
    pub fn present(&self) -> impl Iterator<Item = (RobotId, &State2)> + '_ {
        self.slots().filter_map(|(id, s)| s.map(|s| (id, s)))
    }

    pub fn num_present(&self) -> usize {
        self.robots.iter().filter(|r| r.is_some()).count()
    }
}

impl WorldState {
    /// A valid world with nothing in it: no ball and no robots.
    pub fn empty(t_s: f64) -> Self {
        Self {
            t_s,
            ball: BallState::invalid(t_s),
            blue: TeamState::empty(TeamColour::Blue),
            yellow: TeamState::empty(TeamColour::Yellow),
        }
    }

    pub fn team(&self, colour: TeamColour) -> &TeamState {
        match colour {
            TeamColour::Blue => &self.blue,
            TeamColour::Yellow => &self.yellow,
        }
    }

    pub fn team_mut(&mut self, colour: TeamColour) -> &mut TeamState {
        match colour {
            TeamColour::Blue => &mut self.blue,
            TeamColour::Yellow => &mut self.yellow,
        }
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::empty(0.0)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
