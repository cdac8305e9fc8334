//! Run execution and caching service.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ad_core::ReactorState;
use ad_feed::InfluentBuilder;
use ad_results::{
    Extractor, RunManifest, RunStatus, RunStore, TimeseriesRecord, compute_run_id, write_records,
};
use ad_scenario::{IntegratorMethod, Scenario};
use ad_sim::{
    Adm1Kinetics, Divergence, IntegratorType, SimError, SimOptions, SimProgress,
    SimulationTrace, Simulator, SubstepIntegrator,
};
use ad_substrates::SubstrateDatabase;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage};
use crate::scenario_service;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
    /// Start from this checkpoint instead of the scenario's `initial_state`.
    pub initial_override: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
            initial_override: None,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub options: RunOptions,
}

/// Wall-clock breakdown of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub load_time_s: f64,
    pub build_time_s: f64,
    pub simulate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
    pub substeps_per_step: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub run_dir: PathBuf,
    pub timing: RunTimingSummary,
}

/// Trace of a finished or stopped simulation.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub trace: SimulationTrace,
    pub divergence: Option<Divergence>,
}

impl SimulationOutcome {
    pub fn status(&self) -> RunStatus {
        match &self.divergence {
            None => RunStatus::Complete,
            Some(d) => RunStatus::Diverged {
                index: d.index,
                time_days: d.time_days,
                reason: d.reason.clone(),
            },
        }
    }
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

pub fn sim_options(scenario: &Scenario) -> SimOptions {
    let method = match scenario.integrator.method {
        IntegratorMethod::RK4 => IntegratorType::RK4,
        IntegratorMethod::ForwardEuler => IntegratorType::ForwardEuler,
    };
    SimOptions {
        integrator: SubstepIntegrator {
            method,
            max_substep_days: scenario.integrator.max_substep_days,
        },
        progress_every: scenario.progress_every,
        ..SimOptions::default()
    }
}

/// Wire the ADM1 kinetics and influent builder for `scenario`.
pub fn build_simulator(
    scenario: &Scenario,
    db: &SubstrateDatabase,
) -> AppResult<Simulator<Adm1Kinetics>> {
    let reactor = scenario.reactor_params();
    let builder = InfluentBuilder::new(
        db,
        scenario.feed_slots(),
        scenario.feeding_interval()?,
        &reactor.chemistry(),
    )?;
    let kinetics = Adm1Kinetics::new(reactor)?;
    Ok(Simulator::new(kinetics, builder, sim_options(scenario)))
}

/// Simulate `scenario` from `initial`; a divergence is an outcome, not an error.
pub fn simulate(
    scenario: &Scenario,
    db: &SubstrateDatabase,
    initial: &ReactorState,
    progress: Option<&mut dyn FnMut(SimProgress)>,
) -> AppResult<SimulationOutcome> {
    let mut simulator = build_simulator(scenario, db)?;
    let grid = scenario.time_grid()?;
    let schedule = scenario.feed_schedule()?;

    let mut trace = SimulationTrace::with_capacity(grid.len());
    match simulator.run_into(&grid, initial, &schedule, &mut trace, progress) {
        Ok(()) => Ok(SimulationOutcome {
            trace,
            divergence: None,
        }),
        Err(SimError::Divergence(d)) => Ok(SimulationOutcome {
            trace,
            divergence: Some(*d),
        }),
        Err(e) => Err(e.into()),
    }
}

fn integrator_label(scenario: &Scenario) -> String {
    format!(
        "{:?} (max sub-step {} d)",
        scenario.integrator.method, scenario.integrator.max_substep_days
    )
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
///
/// A diverged run is still stored (prefix plus last valid state) before
/// [`AppError::Diverged`] is returned.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingScenario,
        started,
        Some("Loading scenario".to_string()),
    );
    let load_start = Instant::now();
    let scenario = scenario_service::load_scenario(request.scenario_path)?;

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingSubstrates,
        started,
        Some(format!("Loading {}", scenario.substrates.display())),
    );
    let substrates = scenario_service::load_substrates(&scenario.substrates)?;
    scenario_service::check_slots(&scenario, &substrates.db)?;
    let initial = scenario_service::load_initial_state(
        &scenario,
        request.options.initial_override.as_deref(),
    )?;
    timing.load_time_s = load_start.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
    );
    let run_id = compute_run_id(
        &scenario,
        &initial,
        &substrates.source,
        &request.options.solver_version,
    );
    let store = RunStore::for_scenario(request.scenario_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
        );
        let cache_start = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = cache_start.elapsed().as_secs_f64();
        timing.steps = manifest.steps;
        timing.total_time_s = started.elapsed().as_secs_f64();
        debug!(run_id = %run_id, "cache hit");

        if let RunStatus::Diverged {
            index,
            time_days,
            reason,
        } = &manifest.status
        {
            return Err(AppError::Diverged {
                run_id,
                index: *index,
                time_days: *time_days,
                reason: reason.clone(),
            });
        }

        emit_progress(
            &mut progress_cb,
            RunStage::Completed,
            started,
            Some("Loaded cached run".to_string()),
        );
        return Ok(RunResponse {
            run_dir: store.run_dir(&run_id),
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    emit_progress(
        &mut progress_cb,
        RunStage::Simulating,
        started,
        Some(format!("Simulating {} d", scenario.time.end_days)),
    );
    let build_start = Instant::now();
    let grid = scenario.time_grid()?;
    timing.steps = grid.len().saturating_sub(1);
    timing.substeps_per_step = sim_options(&scenario)
        .integrator
        .substeps(scenario.time.step_days);
    timing.build_time_s = build_start.elapsed().as_secs_f64();

    let sim_start = Instant::now();
    let outcome = {
        let forward: &mut dyn FnMut(SimProgress) = &mut |p: SimProgress| {
            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(RunProgressEvent {
                    stage: RunStage::Simulating,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                    message: None,
                    simulation: Some(p),
                });
            }
        };
        simulate(&scenario, &substrates.db, &initial, Some(forward))?
    };
    timing.simulate_time_s = sim_start.elapsed().as_secs_f64();
    debug!(
        run_id = %run_id,
        states = outcome.trace.len(),
        seconds = timing.simulate_time_s,
        "simulation finished"
    );

    emit_progress(
        &mut progress_cb,
        RunStage::SavingResults,
        started,
        Some("Saving results".to_string()),
    );
    let save_start = Instant::now();
    let extractor = Extractor::new(scenario.reactor_params());
    let records: Vec<TimeseriesRecord> = extractor
        .extract_trace(&outcome.trace)
        .into_iter()
        .map(|(time_d, values)| TimeseriesRecord { time_d, values })
        .collect();

    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_name: scenario.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: request.options.solver_version.clone(),
        integrator: integrator_label(&scenario),
        steps: outcome.trace.len().saturating_sub(1),
        end_days: outcome.trace.times.last().copied().unwrap_or(0.0),
        status: outcome.status(),
    };
    let run_dir = store.save_run(&manifest, &records, outcome.trace.last())?;
    timing.save_time_s = save_start.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    if let Some(d) = outcome.divergence {
        warn!(
            run_id = %run_id,
            index = d.index,
            time_days = d.time_days,
            reason = %d.reason,
            "stored diverged run prefix"
        );
        return Err(AppError::Diverged {
            run_id,
            index: d.index,
            time_days: d.time_days,
            reason: d.reason,
        });
    }

    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some("Run complete".to_string()),
    );
    info!(run_id = %run_id, steps = manifest.steps, "run stored");

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        run_dir,
        timing,
    })
}

/// Stored runs of the scenario at `scenario_path`, oldest first.
pub fn list_runs(scenario_path: &Path) -> AppResult<Vec<RunManifest>> {
    let scenario = scenario_service::load_scenario(scenario_path)?;
    let store = RunStore::for_scenario(scenario_path)?;
    Ok(store.list_runs(Some(&scenario.name))?)
}

/// Load a stored run's manifest and records.
pub fn load_run(
    scenario_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TimeseriesRecord>)> {
    let store = RunStore::for_scenario(scenario_path)?;
    let manifest = store.load_manifest(run_id)?;
    let records = store.load_timeseries(run_id)?;
    Ok((manifest, records))
}

/// Checkpoint path of a stored run, for continuing from it.
pub fn final_state_path(scenario_path: &Path, run_id: &str) -> AppResult<PathBuf> {
    let store = RunStore::for_scenario(scenario_path)?;
    if !store.has_run(run_id) {
        return Err(AppError::RunNotFound(run_id.to_string()));
    }
    let path = store.final_state_path(run_id);
    if !path.exists() {
        return Err(AppError::InvalidInput(format!(
            "run {run_id} has no final state"
        )));
    }
    Ok(path)
}

/// Write a stored run as a CSV table; returns the number of rows.
pub fn export_run_csv(scenario_path: &Path, run_id: &str, out_path: &Path) -> AppResult<usize> {
    let (_, records) = load_run(scenario_path, run_id)?;
    let file = File::create(out_path)?;
    write_records(BufWriter::new(file), &records)?;
    Ok(records.len())
}
