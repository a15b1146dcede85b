//! SIC/XE simulator CLI.
//!
//! This binary is the host front end for the simulator. It provides:
//! 1. **Run:** Load an object program and run it to a halt (or single-step N instructions).
//! 2. **Load:** Show program metadata, control sections, the symbol table, and diagnostics.
//! 3. **Disasm:** List the loaded text regions instruction by instruction.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sicsim_core::Simulator;
use sicsim_core::common::reg::Register;
use sicsim_core::config::Config;
use sicsim_core::sim::loader::LoadReport;
use sicsim_core::sim::simulator::StopReason;

#[derive(Parser, Debug)]
#[command(
    name = "sicsim",
    author,
    version,
    about = "SIC/XE instruction-level simulator",
    long_about = "Load relocatable SIC/XE object programs and execute them.\n\nExamples:\n  sicsim run prog.obj\n  sicsim run prog.obj --steps 10 --trace\n  sicsim load prog.obj\n  sicsim disasm prog.obj"
)]
struct Cli {
    /// JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and execute an object program.
    Run {
        /// Object program.
        file: PathBuf,

        /// Execute at most this many instructions one step at a time instead of running.
        #[arg(long)]
        steps: Option<u64>,

        /// Override the run iteration ceiling.
        #[arg(long)]
        max_steps: Option<u64>,

        /// Log every instruction.
        #[arg(long)]
        trace: bool,

        /// Print the final machine snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Load an object program and describe it.
    Load {
        /// Object program.
        file: PathBuf,
    },

    /// Disassemble the text regions of an object program.
    Disasm {
        /// Object program.
        file: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let trace = matches!(cli.command, Commands::Run { trace: true, .. });
    let default_level = if trace { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    tracing::debug!(?config, "configuration");

    match cli.command {
        Commands::Run {
            file,
            steps,
            max_steps,
            trace,
            json,
        } => {
            if let Some(limit) = max_steps {
                config.general.max_steps = limit;
            }
            config.general.trace_instructions |= trace;
            cmd_run(&config, &file, steps, json)
        }
        Commands::Load { file } => {
            let (sim, report) = load(&config, &file)?;
            print_report(&report);
            println!("Entry point: {:06X}", sim.state.program().entry_point);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Disasm { file } => {
            let (sim, report) = load(&config, &file)?;
            print_diagnostics(&report);
            for line in report.program.listing(&sim.state) {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(config: &Config, file: &Path) -> Result<(Simulator, LoadReport)> {
    let mut sim = Simulator::new(config);
    let report = sim
        .load_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    Ok((sim, report))
}

fn cmd_run(config: &Config, file: &Path, steps: Option<u64>, json: bool) -> Result<ExitCode> {
    let (mut sim, report) = load(config, file)?;
    print_diagnostics(&report);

    let stop = match steps {
        Some(n) => {
            let mut executed = 0;
            while executed < n && sim.step() {
                executed += 1;
            }
            sim.stop_reason().cloned()
        }
        None => Some(sim.run().stop),
    };

    for entry in sim.log() {
        println!("{entry}");
    }

    if json {
        let snapshot = serde_json::to_string_pretty(&sim.state.snapshot())
            .context("Failed to serialize snapshot")?;
        println!("{snapshot}");
    } else {
        print_registers(&sim);
    }

    Ok(match stop {
        Some(StopReason::Normal) | None => ExitCode::SUCCESS,
        Some(reason) => {
            eprintln!("{reason}");
            ExitCode::FAILURE
        }
    })
}

fn print_diagnostics(report: &LoadReport) {
    for diagnostic in &report.diagnostics {
        eprintln!("[loader] {diagnostic}");
    }
}

fn print_report(report: &LoadReport) {
    let program = &report.program;
    println!("Program:     {}", program.name);
    println!("Header addr: {:06X}", program.header_address);
    println!("Load addr:   {:06X}", program.load_address);
    println!("Length:      {:06X}", program.total_length);
    println!();
    println!("Control sections:");
    for section in &program.sections {
        println!(
            "  {:<6}  {:06X}  {:06X}",
            section.name, section.load_address, section.length
        );
    }
    println!("External symbols:");
    for (name, address) in program.estab.iter() {
        println!("  {name:<6}  {address:06X}");
    }
    print_diagnostics(report);
}

fn print_registers(sim: &Simulator) {
    let state = &sim.state;
    for reg in Register::ALL {
        if reg == Register::F {
            println!("{:>2} = {}", reg, state.get_f());
        } else {
            println!("{:>2} = {:06X}", reg, state.reg(reg));
        }
    }
    if let Some(device) = state.last_device() {
        println!("Last device: {device}");
    }
    if let Some(address) = sim.last_execution().and_then(|e| e.effective_address) {
        println!("Last TA: {address:06X}");
    }
}
