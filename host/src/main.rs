use eyecoord_core::{calculate_visual_angle, LogError, MemoryStore, Settings, SettingsStore};
use host::{load_script, run_script, JsonFileStore, SessionReport};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Instant;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    println!("👁  Eye Coordination Session Runner");
    println!("{}", "=".repeat(70));
    println!();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: {} run <script_file> [--seed <n>] [--store <file>] [output_file]", args[0]);
                std::process::exit(1);
            }

            let script_file = &args[2];
            let mut seed = None;
            let mut store_file = None;
            let mut output_file = None;

            let mut rest = args[3..].iter();
            while let Some(arg) = rest.next() {
                match arg.as_str() {
                    "--seed" | "-s" => {
                        let value = rest.next().unwrap_or_else(|| {
                            eprintln!("❌ Error: --seed requires a value");
                            std::process::exit(1);
                        });
                        seed = Some(value.parse::<u64>().unwrap_or_else(|e| {
                            eprintln!("❌ Error: invalid seed '{}': {}", value, e);
                            std::process::exit(1);
                        }));
                    }
                    "--store" => {
                        store_file = Some(rest.next().unwrap_or_else(|| {
                            eprintln!("❌ Error: --store requires a file path");
                            std::process::exit(1);
                        }));
                    }
                    other => output_file = Some(other),
                }
            }

            let seed = seed.unwrap_or_else(rand::random);
            match store_file {
                Some(path) => run_command(script_file, JsonFileStore::new(path), seed, output_file),
                None => run_command(script_file, MemoryStore::new(), seed, output_file),
            }
        }

        "angle" => {
            if args.len() < 3 {
                eprintln!("Usage: {} angle <pixels> [--distance <cm>] [--ppi <n>]", args[0]);
                std::process::exit(1);
            }
            angle_command(&args[2], &args[3..]);
        }

        "defaults" => {
            defaults_command();
        }

        "--help" | "-h" => {
            print_usage(&args[0]);
            std::process::exit(0);
        }

        _ => {
            eprintln!("❌ Unknown command: {}", command);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <script_file> [--seed <n>] [--store <file>] [output_file]");
    eprintln!("      Run a scripted training session and export the diplopia log");
    eprintln!("      - script_file: JSON file with viewport, duration, settings and events");
    eprintln!("      - --seed: Optional RNG seed for reproducible motion");
    eprintln!("      - --store: Optional JSON file holding persisted settings");
    eprintln!("      - output_file: Optional CSV path");
    eprintln!("                     Defaults to: eye-coordination-log-<date>.csv");
    eprintln!();
    eprintln!("  angle <pixels> [--distance <cm>] [--ppi <n>]");
    eprintln!("      Convert an on-screen offset into degrees of visual angle");
    eprintln!();
    eprintln!("  defaults");
    eprintln!("      Print the default settings document");
    eprintln!();
    eprintln!("Example workflow:");
    eprintln!("  1. Run a session: {} run session.json --seed 7", program);
    eprintln!("  2. Check a mark:  {} angle 200 --distance 60 --ppi 110", program);
}

fn run_command<S: SettingsStore>(script_file: &str, store: S, seed: u64, output_file: Option<&str>) {
    println!("📋 Running session script");
    println!("  Script file: {}", script_file);
    println!("  Seed: {}", seed);
    println!();

    let script = load_script(Path::new(script_file)).unwrap_or_else(|e| {
        eprintln!("❌ Error loading script '{}': {}", script_file, e);
        std::process::exit(1);
    });

    println!("📦 Loaded script");
    println!("  Viewport: {}x{}", script.viewport.width, script.viewport.height);
    println!("  Duration: {}s at {} fps", script.duration_s, script.fps);
    println!("  Events: {}", script.events.len());
    println!();

    let start = Instant::now();
    let report = run_script(&script, store, seed).unwrap_or_else(|e| {
        eprintln!("❌ Session failed: {}", e);
        std::process::exit(1);
    });
    println!("  Run time: {:.2}s", start.elapsed().as_secs_f64());
    println!();

    print_report(&report);

    let export = match report.log.export(report.started_at.date_naive()) {
        Ok(export) => export,
        Err(LogError::Empty) => {
            println!("ℹ️  No data to export");
            println!("{}", "=".repeat(70));
            return;
        }
    };

    let file_to_save = output_file.unwrap_or(export.file_name.as_str());
    match fs::write(file_to_save, &export.contents) {
        Ok(()) => {
            println!("💾 Log saved to: {}", file_to_save);
            println!("{}", "=".repeat(70));
        }
        Err(e) => {
            eprintln!("❌ Error saving log: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &SessionReport) {
    println!("✅ Session complete");
    println!("  Axis mode: {}", report.axis_mode);
    println!("  Frames: {}", report.frames);
    println!("  Retargets: {}", report.retargets);
    println!(
        "  Final position: ({:.1}, {:.1}), {:+.1}°",
        report.final_position.x, report.final_position.y, report.final_eccentricity_deg
    );
    println!("  Max containment violation: {:.3} px", report.max_containment_violation);
    println!("  Diplopia marks: {}", report.entries().len());
    for entry in report.entries() {
        println!("    - {}", entry.summary());
    }
    println!();
}

fn angle_command(pixels: &str, options: &[String]) {
    let defaults = Settings::default();
    let mut distance = defaults.viewing_distance_cm;
    let mut ppi = defaults.screen_ppi;

    let px = parse_number("pixels", pixels);
    let mut rest = options.iter();
    while let Some(flag) = rest.next() {
        let target = match flag.as_str() {
            "--distance" | "-d" => &mut distance,
            "--ppi" => &mut ppi,
            other => {
                eprintln!("❌ Unknown option: {}", other);
                std::process::exit(1);
            }
        };
        let value = rest.next().unwrap_or_else(|| {
            eprintln!("❌ Error: {} requires a value", flag);
            std::process::exit(1);
        });
        *target = parse_number(flag, value);
    }

    let degrees = calculate_visual_angle(px, distance, ppi);
    println!("📐 {} px at {} cm on a {} PPI screen", px, distance, ppi);
    println!("  Visual angle: {:.1}°", degrees);
    println!("{}", "=".repeat(70));
}

fn defaults_command() {
    match Settings::default().to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("❌ Error encoding settings: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_number(name: &str, raw: &str) -> f64 {
    raw.parse::<f64>().unwrap_or_else(|e| {
        eprintln!("❌ Error: invalid {} '{}': {}", name, raw, e);
        std::process::exit(1);
    })
}
