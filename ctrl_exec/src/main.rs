//! Main control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Start the vision client, publishing world snapshots from a background thread
//!     - Main loop, until the run duration elapses or Ctrl-C is pressed:
//!         - Take the latest world snapshot
//!         - Plan a route for the controlled robot when it has none to follow
//!         - Trajectory control processing
//!         - Send the command to the robot
//!         - Telemetry
//!
//! # Modules
//!
//! All modules (e.g. `traj_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use nalgebra::Vector2;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use ctrl_lib::{
    auto::{
        limits::Limits,
        loc::State2,
        map::CostGrid,
        nav::{self, NavParams, PathPlanner},
        traj::{Trajectory, TrajectoryChain},
        traj_ctrl::{self, TrajCtrl, TrajCtrlMode},
    },
    data_store::DataStore,
    params::CtrlExecParams,
    sim_client::SimVision,
    tm::{self, TmRecorder},
    vision_client::VisionClient,
    world::WorldStateStore,
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive cycles without new vision data after which a warning is issued.
const STALE_VISION_WARN_LIMIT: u64 = 10;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("SSL Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: CtrlExecParams =
        util::params::load("ctrl_exec.toml").wrap_err("Could not load exec params")?;

    let nav_params: NavParams =
        util::params::load("nav.toml").wrap_err("Could not load nav params")?;

    let traj_ctrl_params: traj_ctrl::Params =
        util::params::load("traj_ctrl.toml").wrap_err("Could not load traj_ctrl params")?;

    info!("Exec parameters loaded");

    let cycle_frequency_hz = 1.0 / exec_params.cycle_period_s;
    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let target_m = Vector2::new(exec_params.target_m[0], exec_params.target_m[1]);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    let grid = nav_params
        .build_grid()
        .wrap_err("Failed to build the navigation grid")?;
    let planner = PathPlanner::new(nav_params.planner);
    info!(
        "Navigation grid is {}x{} cells of {} m",
        grid.width(),
        grid.height(),
        nav_params.cell_size_m
    );

    let mut traj_ctrl =
        TrajCtrl::new(traj_ctrl_params).wrap_err("Failed to initialise TrajCtrl")?;
    info!("TrajCtrl init complete");

    let mut tm_recorder = match exec_params.record_tm {
        true => Some(
            TmRecorder::new(session.file_path("tm.jsonl"))
                .wrap_err("Failed to create the telemetry recorder")?,
        ),
        false => None,
    };

    info!("Module initialisation complete\n");

    // ---- INITIALISE VISION ----

    let store = Arc::new(WorldStateStore::new());
    let run = Arc::new(AtomicBool::new(true));

    // Ctrl-C clears the run flag, so the shutdown below still stops the robots
    {
        let run = run.clone();
        ctrlc::set_handler(move || {
            warn!("Interrupt received, stopping");
            run.store(false, Ordering::Relaxed);
        })
        .wrap_err("Failed to set the interrupt handler")?;
    }

    let sim = SimVision::new(exec_params.sim.clone());
    let cmd_sink = sim.command_sink();

    let vision_jh = VisionClient::new(store.clone()).spawn(sim, run.clone());
    info!("VisionClient started with the simulated source");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    while run.load(Ordering::Relaxed) {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_frequency_hz, store.current(), cycle_start_instant);
        ds.select_robot(exec_params.team, exec_params.robot_id);

        if let Some(d) = exec_params.run_duration_s {
            if ds.sim_time_s >= d {
                info!("Run duration of {} s reached, stopping", d);
                break;
            }
        }

        if ds.is_1_hz_cycle && ds.num_consec_stale_vision > STALE_VISION_WARN_LIMIT {
            warn!(
                "No new vision data for {} cycles",
                ds.num_consec_stale_vision
            );
        }

        // ---- PLANNING ----

        // TrajCtrl is off until a route is loaded and again after an abort. Planning is retried on
        // the 1Hz, so a missing route doesn't flood the log.
        if traj_ctrl.mode() == TrajCtrlMode::Off && ds.is_1_hz_cycle {
            match ds.robot_state {
                Some(state) => {
                    match plan_chain(
                        &state,
                        ds.sim_time_s,
                        &planner,
                        &grid,
                        nav_params.cell_size_m,
                        &traj_ctrl.params().limits,
                        target_m,
                    ) {
                        Ok(chain) => {
                            info!(
                                "Route to ({:.2}, {:.2}) loaded, arriving at t = {:.3} s",
                                target_m.x,
                                target_m.y,
                                chain.tf_s()
                            );
                            traj_ctrl
                                .begin(chain)
                                .wrap_err("Could not load the trajectory")?;
                        }
                        Err(e) => warn!(
                            "Cannot plan from ({:.2}, {:.2}): {}",
                            state.pose.position_m.x, state.pose.position_m.y, e
                        ),
                    }
                }
                None => debug!(
                    "Waiting for {} robot {} to be seen",
                    exec_params.team, exec_params.robot_id
                ),
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        if let (Some(state), Some(dt_s)) = (ds.robot_state, ds.cycle_dt_s()) {
            let input = traj_ctrl::InputData {
                pose: state.pose,
                t_s: ds.sim_time_s,
                dt_s,
            };
            ds.traj_ctrl_input = Some(input);

            match traj_ctrl.proc(&input) {
                Ok((o, r)) => {
                    ds.traj_ctrl_output = o;
                    ds.traj_ctrl_status_rpt = r;
                }
                Err(e) => {
                    warn!("Error during TrajCtrl processing, replanning: {}", e);
                    traj_ctrl.abort();
                }
            }
        }

        if ds.is_1_hz_cycle && traj_ctrl.mode() == TrajCtrlMode::Following {
            info!(
                "Tracking errors: {:.3} m, {:.3} rad",
                ds.traj_ctrl_status_rpt.pos_error_m, ds.traj_ctrl_status_rpt.head_error_rad
            );
        }

        // Send command to the robot, a stop command if it is not seen this cycle
        cmd_sink.send(exec_params.team, exec_params.robot_id, ds.traj_ctrl_output);

        // ---- TELEMETRY ----

        if let Some(ref mut recorder) = tm_recorder {
            let snapshot = tm::build_snapshot(
                &ds.world,
                ds.sim_time_s,
                vec![tm::ctrl_entry(
                    exec_params.team,
                    exec_params.robot_id,
                    &ds.traj_ctrl_status_rpt,
                    &ds.traj_ctrl_output,
                )],
            );

            if let Err(e) = recorder.record(&snapshot) {
                warn!("Telemetry error: {}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    info!("Stopping");

    cmd_sink.stop_all();
    run.store(false, Ordering::Relaxed);

    match vision_jh.join() {
        Ok(stats) => info!(
            "VisionClient published {} frames, dropped {}",
            stats.num_published, stats.num_dropped
        ),
        Err(_) => error!("The vision thread panicked"),
    }

    if let Some(mut recorder) = tm_recorder {
        recorder
            .flush()
            .wrap_err("Could not flush the telemetry recorder")?;
        info!(
            "{} telemetry snapshots written to {:?}",
            recorder.num_records(),
            recorder.path()
        );
    }

    info!("End of execution");

    Ok(())
}

/// Plan a route from the controlled robot to the target and build the trajectory along it.
///
/// The trajectory starts at `t_s`, from the robot's measured position and heading.
fn plan_chain(
    state: &State2,
    t_s: f64,
    planner: &PathPlanner,
    grid: &CostGrid,
    cell_size_m: f64,
    limits: &Limits,
    target_m: Vector2<f64>,
) -> Result<TrajectoryChain, Report> {
    let route =
        nav::plan_route_from(planner, grid, cell_size_m, state.pose.position_m, target_m)?;

    let chain =
        TrajectoryChain::from_waypoints(&route, state.pose.heading_rad(), t_s, limits)?;

    Ok(chain)
}
