use std::env;
use std::net::SocketAddr;

use contracts::SimConfig;
use town_api::{serve, EngineApi};

fn print_usage() {
    println!("town-cli <command>");
    println!("commands:");
    println!("  status");
    println!("  step [n]");
    println!("  run-to <tick>");
    println!("  snapshot [ticks]");
    println!("    runs the default town and prints the narrative snapshot");
    println!("  simulate <sim_id> <seed> [ticks] [roster.json] [checkpoint_dir]");
    println!("    runs a deterministic simulation and saves a final checkpoint");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8080");
}

fn parse_u64(value: Option<&String>, label: &str) -> Result<u64, String> {
    let raw = value.ok_or_else(|| format!("missing {}", label))?;
    raw.parse::<u64>()
        .map_err(|_| format!("invalid {}: {}", label, raw))
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn default_roster_path() -> Option<String> {
    std::env::var("TOWN_ROSTER_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_simulation(args: &[String]) -> Result<(), String> {
    let sim_id = args
        .get(2)
        .cloned()
        .ok_or_else(|| "missing sim_id".to_string())?;
    let seed = parse_u64(args.get(3), "seed")?;
    let target_tick = args
        .get(4)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| format!("invalid ticks: {value}"))
        })
        .transpose()?
        .unwrap_or(48 * 7);
    let roster_path = args.get(5).cloned().or_else(default_roster_path);
    let checkpoint_dir = args
        .get(6)
        .cloned()
        .unwrap_or_else(|| "town_checkpoints".to_string());

    let config = SimConfig {
        sim_id: sim_id.clone(),
        seed,
        max_days: ((target_tick + 47) / 48).max(1) as u32,
        roster_path,
        ..SimConfig::default()
    };

    let mut api = EngineApi::from_config(config);
    if let Some(error) = api.world().roster_error() {
        eprintln!("warning: {error}");
    }
    api.attach_checkpoint_store(&checkpoint_dir)
        .map_err(|err| format!("failed to attach checkpoint store: {err}"))?;

    let (_, committed) = api.run_to_tick(target_tick);
    let status = api.status().clone();
    api.pause();

    let meta = api
        .save_checkpoint("simulate-final", "end of simulate run")
        .map_err(|err| format!("failed to save final checkpoint: {err}"))?;

    println!(
        "simulated sim_id={} seed={} committed={} tick={}/{} events={} checkpoint={}@{}",
        sim_id,
        seed,
        committed,
        status.current_tick,
        status.max_ticks,
        api.events().len(),
        meta.name,
        checkpoint_dir,
    );
    Ok(())
}

fn run_snapshot(args: &[String]) -> Result<(), String> {
    let ticks = args
        .get(2)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| format!("invalid ticks: {value}"))
        })
        .transpose()?
        .unwrap_or(48);

    let config = SimConfig {
        roster_path: default_roster_path(),
        ..SimConfig::default()
    };
    let mut api = EngineApi::from_config(config);
    if let Some(error) = api.world().roster_error() {
        eprintln!("warning: {error}");
    }
    api.run_to_tick(ticks);
    println!("{}", api.narrative_snapshot());
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let mut api = EngineApi::from_config(SimConfig {
        roster_path: default_roster_path(),
        ..SimConfig::default()
    });

    match command {
        Some("status") => {
            println!("{}", api.status());
        }
        Some("step") => {
            let ticks = args.get(2).and_then(|v| v.parse::<u64>().ok()).unwrap_or(1);
            let (status, committed) = api.step(ticks);
            println!("stepped={} {}", committed, status);
        }
        Some("run-to") => match parse_u64(args.get(2), "tick") {
            Ok(target_tick) => {
                let (status, committed) = api.run_to_tick(target_tick);
                println!("committed={} {}", committed, status);
            }
            Err(err) => {
                eprintln!("error: {}", err);
                print_usage();
                std::process::exit(2);
            }
        },
        Some("snapshot") => {
            if let Err(err) = run_snapshot(&args) {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        Some("simulate") => {
            if let Err(err) = run_simulation(&args) {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => {
                println!("serving api on http://{addr}");
                if let Err(err) = serve(addr).await {
                    eprintln!("server error: {err}");
                    std::process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("error: {}", err);
                print_usage();
                std::process::exit(2);
            }
        },
        _ => {
            print_usage();
        }
    }
}
