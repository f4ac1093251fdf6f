use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use reflex_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use reflex_autopilot::config::{
    config_fingerprint, preset_config, preset_manifest, preset_names, resolve_config,
    resolve_presets,
};
use reflex_autopilot::runner::{run_trace, write_tape};
use reflex_autopilot::trace::load_trace;
use reflex_autopilot::util::{
    parse_seed, parse_seed_csv, parse_seed_file, seed_range, seed_to_hex,
};
use reflex_core::describe::{describe_agent, snapshot_fields};
use reflex_core::{ReflexAgent, SeededRng};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "reflex-autopilot")]
#[command(about = "Replay and sweep harness for the adaptive reflex platformer agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List built-in agent presets
    ListPresets,
    /// Export every preset with its config fingerprint
    PresetManifest {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the snapshot layout and an agent's state, optionally after a replay
    Describe {
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        trace: Option<PathBuf>,
        #[arg(long, default_value = "0xDEADBEEF")]
        seed: String,
    },
    /// Replay a snapshot trace through one agent and write its action tape
    Replay {
        #[arg(long)]
        trace: PathBuf,
        #[arg(long)]
        seed: String,
        #[arg(long)]
        preset: Option<String>,
        /// JSON agent config; overrides --preset
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay one trace across presets and seeds in parallel
    Benchmark {
        #[arg(long)]
        trace: PathBuf,
        #[arg(long)]
        presets: Option<String>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        save_tapes: bool,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli { command } = Cli::parse();

    match command {
        Commands::ListPresets => {
            for name in preset_names() {
                let cfg = preset_config(name)?;
                println!("{name:12} {}", cfg.description);
            }
        }
        Commands::PresetManifest { output } => {
            let manifest = preset_manifest()?;
            let encoded = serde_json::to_vec_pretty(&manifest)?;
            if let Some(path) = output {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, encoded)
                    .with_context(|| format!("failed writing {}", path.display()))?;
                println!("wrote={}", path.display());
                println!("presets={}", manifest.len());
            } else {
                println!("{}", String::from_utf8_lossy(&encoded));
            }
        }
        Commands::Describe {
            preset,
            config,
            trace,
            seed,
        } => {
            let cfg = resolve_config(preset.as_deref(), config.as_deref())?;
            let seed = parse_seed(&seed)?;
            let mut agent = ReflexAgent::new(&cfg, SeededRng::new(seed));
            if let Some(path) = trace {
                for frame in load_trace(&path)? {
                    agent.decide(&frame);
                }
            }
            let report = serde_json::json!({
                "config_id": &cfg.id,
                "config_fingerprint": config_fingerprint(&cfg)?,
                "snapshot": snapshot_fields(),
                "agent": describe_agent(&agent),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Replay {
            trace,
            seed,
            preset,
            config,
            output,
        } => {
            let cfg = resolve_config(preset.as_deref(), config.as_deref())?;
            let seed = parse_seed(&seed)?;
            let frames = load_trace(&trace)?;
            tracing::info!(
                config = %cfg.id,
                seed = %seed_to_hex(seed),
                frames = frames.len(),
                "replaying trace"
            );
            let artifact = run_trace(&cfg, seed, &frames)?;
            let m = &artifact.metrics;
            let output_path = output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "checkpoints/{}-{}-jumps{}-frames{}.tape",
                    m.config_id,
                    seed_to_hex(seed).replace("0x", "seed"),
                    m.jumps_started,
                    m.frame_count
                ))
            });
            write_tape(&output_path, &artifact.tape())?;

            println!("config={}", m.config_id);
            println!("config_fingerprint={}", m.config_fingerprint);
            println!("seed={}", seed_to_hex(seed));
            println!("frames={}", m.frame_count);
            println!("advance_frames={}", m.advance_frames);
            println!("jump_frames={}", m.jump_frames);
            println!(
                "jumps={} panic={} obstacle={} danger={} exploration={}",
                m.jumps_started,
                m.panic_jumps,
                m.obstacle_jumps,
                m.danger_jumps,
                m.exploration_jumps
            );
            println!("peak_recent_crashes={}", m.peak_recent_crashes);
            println!("posture={}", m.final_posture.as_str());
            println!(
                "params=lookahead:{} jump_hold:{} random_prob:{:.4} stuck:{}",
                m.final_params.lookahead_max,
                m.final_params.jump_hold_max,
                m.final_params.random_jump_prob,
                m.final_params.stuck_threshold
            );
            println!("rng={:#010x}", m.final_rng_state);
            println!("output={}", output_path.display());
        }
        Commands::Benchmark {
            trace,
            presets,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            out_dir,
            save_tapes,
            jobs,
        } => {
            let presets = resolve_presets(presets.as_deref())?;
            let seeds = match (seeds, seed_file, seed_start) {
                (Some(csv), None, None) => parse_seed_csv(&csv)?,
                (None, Some(path), None) => parse_seed_file(&path)?,
                (None, None, Some(start)) => seed_range(parse_seed(&start)?, seed_count),
                (None, None, None) => seed_range(0xDEAD_BEEF, seed_count),
                _ => {
                    return Err(anyhow!(
                        "use only one of --seeds, --seed-file, or --seed-start"
                    ))
                }
            };
            let frames = load_trace(&trace)?;
            let out_dir = out_dir.unwrap_or_else(|| {
                let stamp = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                PathBuf::from(format!("benchmarks/{stamp}"))
            });

            let report = run_benchmark(
                BenchmarkConfig {
                    presets,
                    seeds,
                    trace_label: trace.display().to_string(),
                    out_dir: out_dir.clone(),
                    save_tapes,
                    jobs,
                },
                &frames,
            )?;

            println!("runs={}", report.run_count);
            for (idx, row) in report.preset_rankings.iter().enumerate() {
                println!(
                    "rank={} preset={} panic={:.2} jumps={:.2} jump_frames={:.2} strained={:.3}",
                    idx + 1,
                    row.preset,
                    row.avg_panic_jumps,
                    row.avg_jumps_started,
                    row.avg_jump_frames,
                    row.strained_rate
                );
            }
            println!("summary={}", out_dir.join("summary.json").display());
        }
    }

    Ok(())
}
