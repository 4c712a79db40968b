//! Cyclic module interface
//!
//! Modules run by the control loop (for example `TrajCtrl`) implement [`State`]. The executable
//! owns each module, initialises it once from its parameters, then calls [`State::proc`] once per
//! control cycle.

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module processed once per control cycle.
pub trait State {
    /// Parameters or other data needed to set the module up
    type InitData;
    type InitError;

    /// What the module consumes each cycle
    type InputData;

    /// What the module produces each cycle, usually a command
    type OutputData;

    /// Diagnostics produced alongside the output, for logging and telemetry
    type StatusReport;

    type ProcError;

    /// (Re)initialise the module.
    ///
    /// A module which fails to initialise must be left as it was before the call.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError>;

    /// Run one cycle of the module.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
