use ad_app::{
    AppResult, LabelTable, RunOptions, RunProgressEvent, RunRequest, RunStage, SubstrateReport,
    run_service, scenario_service,
};
use ad_results::RunStatus;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "digestflow")]
#[command(about = "Anaerobic digestion batch simulator (ADM1)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario and the files it references
    Validate {
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
    },
    /// List or search substrates in a database
    Substrates {
        /// Path to the substrate YAML/JSON file
        db_path: PathBuf,
        /// Case-insensitive match on id, name and class
        query: Option<String>,
    },
    /// Render the substrate database as Markdown
    Report {
        /// Path to the substrate YAML/JSON file
        db_path: PathBuf,
        /// Display-label translation table (YAML)
        #[arg(long)]
        labels: Option<PathBuf>,
        /// Only these substrate ids, in this order
        #[arg(long = "id")]
        ids: Vec<String>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a scenario
    Run {
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Start from this checkpoint instead of the scenario's initial state
        #[arg(long)]
        initial: Option<PathBuf>,
    },
    /// List stored runs for a scenario
    Runs {
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
    },
    /// Export the monitored variables of a stored run as CSV
    Export {
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Output CSV file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Substrates { db_path, query } => cmd_substrates(&db_path, query.as_deref()),
        Commands::Report {
            db_path,
            labels,
            ids,
            output,
        } => cmd_report(&db_path, labels.as_deref(), &ids, output.as_deref()),
        Commands::Run {
            scenario_path,
            no_cache,
            initial,
        } => cmd_run(&scenario_path, !no_cache, initial),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
        Commands::Export {
            scenario_path,
            run_id,
            output,
        } => cmd_export(&scenario_path, &run_id, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let summary = scenario_service::validate_scenario_files(scenario_path)?;
    println!("✓ Scenario '{}' is valid", summary.name);
    println!("  Substrates in database: {}", summary.substrate_count);
    println!(
        "  Feed slots: {} ({} enabled: {})",
        summary.slot_count,
        summary.enabled_slots.len(),
        summary.enabled_slots.join(", ")
    );
    println!(
        "  Feed windows: {} of {} h",
        summary.window_count, summary.interval_hours
    );
    println!(
        "  Time grid: {} points to day {}",
        summary.grid_points, summary.end_days
    );
    match &summary.initial_state {
        Some(path) => println!("  Initial state: {}", path.display()),
        None => println!("  Initial state: none (pass --initial when running)"),
    }
    Ok(())
}

fn cmd_substrates(db_path: &Path, query: Option<&str>) -> AppResult<()> {
    let loaded = scenario_service::load_substrates(db_path)?;
    let matches = loaded.db.search(query.unwrap_or(""));

    if matches.is_empty() {
        println!("No substrates found");
    } else {
        for s in matches {
            println!("  {:<22} {:<14} {}", s.id, s.name, s.class);
        }
    }
    Ok(())
}

fn cmd_report(
    db_path: &Path,
    labels: Option<&Path>,
    ids: &[String],
    output: Option<&Path>,
) -> AppResult<()> {
    let loaded = scenario_service::load_substrates(db_path)?;
    let labels = match labels {
        Some(path) => LabelTable::load(path)?,
        None => LabelTable::empty(),
    };
    let report = SubstrateReport::new(labels);
    let selection = if ids.is_empty() { None } else { Some(ids) };
    let markdown = report.render(&loaded.db, selection)?;

    match output {
        Some(path) => {
            std::fs::write(path, markdown)?;
            println!("✓ Report written to {}", path.display());
        }
        None => print!("{markdown}"),
    }
    Ok(())
}

fn cmd_run(scenario_path: &Path, use_cache: bool, initial: Option<PathBuf>) -> AppResult<()> {
    println!("Running scenario: {}", scenario_path.display());
    if let Some(path) = &initial {
        println!("  Initial state: {}", path.display());
    }

    let request = RunRequest {
        scenario_path,
        options: RunOptions {
            use_cache,
            initial_override: initial,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let result = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let emit_now = last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    );
    clear_progress_line();
    let response = result?;
    info!(
        run_id = %response.run_id,
        cached = response.loaded_from_cache,
        seconds = response.timing.total_time_s,
        "run finished"
    );

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }
    print_timing_summary(&response.timing);

    let (_manifest, records) = run_service::load_run(scenario_path, &response.run_id)?;
    if let Some(last) = records.last() {
        let v = &last.values;
        println!("\nDay {}:", last.time_d);
        println!("  Biogas:  {:.1} m3/d ({:.1} m3/d CH4)", v.q_gas_m3_d, v.q_ch4_m3_d);
        println!("  pH:      {:.2}", v.ph);
        println!("  FOS/TAC: {:.3}", v.fos_tac);
        println!("  VFA:     {:.3} g/l  TAC: {:.3} g/l", v.vfa_g_l, v.tac_g_l);
    }
    println!("  Stored in: {}", response.run_dir.display());

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (event.stage, event.simulation, event.fraction_complete()) {
        (RunStage::Simulating, Some(p), Some(fraction)) => {
            let width = 28usize;
            let filled = ((fraction * width as f64).round() as usize).min(width);
            print!(
                "\r[{}{}] {:>6.2}%  day={:.2}  step={}/{}  elapsed={:.1}s",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled)),
                fraction * 100.0,
                p.time_days,
                p.step,
                p.total,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &ad_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);

    println!("\nTiming summary:");
    println!("  Load:     {:.3}s", timing.load_time_s);
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    } else {
        println!(
            "  Simulate: {:.3}s ({:.1}%)",
            timing.simulate_time_s,
            100.0 * timing.simulate_time_s / total
        );
        println!("  Save:     {:.3}s", timing.save_time_s);
        println!(
            "  Steps:    {} ({} sub-steps each)",
            timing.steps, timing.substeps_per_step
        );
    }
    println!("  Total:    {:.3}s", timing.total_time_s);
}

fn cmd_runs(scenario_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(scenario_path)?;

    if runs.is_empty() {
        println!("No stored runs for {}", scenario_path.display());
    } else {
        println!("Stored runs:");
        for manifest in runs {
            let status = match &manifest.status {
                RunStatus::Complete => "complete".to_string(),
                RunStatus::Diverged { index, .. } => format!("diverged at step {index}"),
            };
            println!(
                "  {} ({}, {} steps to day {}, {})",
                manifest.run_id, manifest.timestamp, manifest.steps, manifest.end_days, status
            );
        }
    }
    Ok(())
}

fn cmd_export(scenario_path: &Path, run_id: &str, output: Option<&Path>) -> AppResult<()> {
    match output {
        Some(path) => {
            let rows = run_service::export_run_csv(scenario_path, run_id, path)?;
            info!(run_id, rows, path = %path.display(), "exported run");
            println!("✓ Exported {} rows to {}", rows, path.display());
        }
        None => {
            let (_manifest, records) = run_service::load_run(scenario_path, run_id)?;
            ad_results::write_records(io::stdout().lock(), &records)?;
        }
    }
    Ok(())
}
