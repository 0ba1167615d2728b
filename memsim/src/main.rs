use std::fs::File;
use std::io::BufReader;
use std::time::{Duration, Instant};

use clap::Parser;
use memlib::config::SimConfig;
use memlib::io::get_reader;
use memlib::simulator::Simulator;
use memlib::trace::TraceReader;

#[derive(Parser, Debug)]
#[command(about = String::from("Virtual memory and cache hierarchy simulator"))]
struct Args {
    config: String,
    trace: String,

    /// Print one line per access, then the TLB and page table contents
    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    performance: bool,
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    let config_file = File::open(&args.config)
        .map_err(|e| format!("Couldn't open the config file at path {}: {e}", args.config))?;
    let config = SimConfig::from_json(BufReader::new(config_file))
        .map_err(|e| format!("Couldn't parse the config file: {e}"))?;
    let mut simulator =
        Simulator::new(&config).map_err(|e| format!("Invalid configuration: {e}"))?;
    let trace_file = File::open(&args.trace)
        .map_err(|e| format!("Couldn't open the trace file at path {}: {e}", args.trace))?;
    let reader = get_reader(trace_file).map_err(|e| format!("Couldn't read the trace file: {e}"))?;

    let mut simulation_time = Duration::new(0, 0);
    for item in TraceReader::new(reader) {
        match item {
            Ok(event) => {
                let step_start = Instant::now();
                let record = simulator.step(event);
                simulation_time += step_start.elapsed();
                if args.verbose {
                    println!("{record}");
                }
            }
            Err(e) => {
                // A malformed line ends the run; everything counted so far
                // is still reported below
                eprintln!("{e}");
                break;
            }
        }
    }

    let report = simulator.report();
    println!(
        "{}",
        serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Couldn't serialise the output {e}"))?
    );

    if args.verbose {
        println!("\nTLB Entries (Valid-Bit Dirty-Bit VPN PPN)");
        for entry in simulator.tlb().entries() {
            println!("{entry}");
        }
        println!("\nPage Table Entries (Present-Bit Dirty-Bit VPN PPN)");
        for entry in simulator.page_table().entries() {
            println!("{entry}");
        }
    }

    if args.performance {
        let total_time = start.elapsed();
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!(
            "Total execution time (includes parsing, configuration, and output): {}s",
            total_time.as_nanos() as f64 / 1e9
        );
    }
    Ok(())
}
