//! # Equipment Interface
//!
//! This module defines the interface structures received from equipment, already decoded from
//! their wire formats.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod vision;
