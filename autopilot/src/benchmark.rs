use crate::config::preset_config;
use crate::runner::{run_trace, write_tape, RunMetrics};
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use reflex_core::adapt::Posture;
use reflex_core::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub presets: Vec<String>,
    pub seeds: Vec<u32>,
    pub trace_label: String,
    pub out_dir: PathBuf,
    pub save_tapes: bool,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub preset: String,
    pub config_fingerprint: String,
    pub seed: u32,
    pub seed_hex: String,
    pub frame_count: u32,
    pub jump_frames: u32,
    pub jumps_started: u32,
    pub panic_jumps: u32,
    pub obstacle_jumps: u32,
    pub danger_jumps: u32,
    pub exploration_jumps: u32,
    pub peak_recent_crashes: u32,
    pub final_posture: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresetAggregate {
    pub preset: String,
    pub config_fingerprint: String,
    pub runs: usize,
    pub avg_jump_frames: f64,
    pub avg_jumps_started: f64,
    pub avg_panic_jumps: f64,
    pub max_panic_jumps: u32,
    pub avg_obstacle_jumps: f64,
    pub avg_danger_jumps: f64,
    pub avg_exploration_jumps: f64,
    pub avg_peak_recent_crashes: f64,
    /// Share of runs that ended in a wary or cautious posture.
    pub strained_rate: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub trace: String,
    pub frame_count: usize,
    pub jobs: Option<usize>,
    pub presets: Vec<String>,
    pub seeds: Vec<u32>,
    pub run_count: usize,
    pub preset_rankings: Vec<PresetAggregate>,
    pub runs: Vec<RunRecord>,
}

struct InternalRun {
    preset: String,
    metrics: RunMetrics,
    tape: Vec<u8>,
}

/// Replays one trace for every (preset, seed) pair in parallel. Presets are
/// ranked by fewest panic jumps, then by least time spent in the air.
pub fn run_benchmark(config: BenchmarkConfig, frames: &[Snapshot]) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if config.presets.is_empty() {
        return Err(anyhow!("benchmark requires at least one preset"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_jobs: Vec<(String, u32)> = config
        .presets
        .iter()
        .flat_map(|preset| config.seeds.iter().map(move |seed| (preset.clone(), *seed)))
        .collect();

    let run_one = |(preset, seed): &(String, u32)| -> Result<InternalRun> {
        let agent_config = preset_config(preset)?;
        let artifact = run_trace(&agent_config, *seed, frames)
            .with_context(|| format!("benchmark run failed for preset={preset} seed={seed:#x}"))?;
        let tape = artifact.tape();
        Ok(InternalRun {
            preset: preset.clone(),
            metrics: artifact.metrics,
            tape,
        })
    };

    tracing::info!(
        runs = run_jobs.len(),
        frames = frames.len(),
        jobs = ?config.jobs,
        "starting benchmark"
    );

    let run_results: Vec<Result<InternalRun>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };

    let runs = run_results.into_iter().collect::<Result<Vec<_>>>()?;

    let mut grouped: HashMap<&str, Vec<&InternalRun>> = HashMap::new();
    for run in &runs {
        grouped.entry(run.preset.as_str()).or_default().push(run);
    }

    let mut rankings: Vec<PresetAggregate> = grouped
        .into_iter()
        .map(|(preset, preset_runs)| aggregate(preset, &preset_runs))
        .collect();
    rankings.sort_by(|a, b| {
        a.avg_panic_jumps
            .total_cmp(&b.avg_panic_jumps)
            .then_with(|| a.avg_jump_frames.total_cmp(&b.avg_jump_frames))
            .then_with(|| a.preset.cmp(&b.preset))
    });

    let mut run_records: Vec<RunRecord> = runs
        .iter()
        .map(|run| RunRecord {
            preset: run.preset.clone(),
            config_fingerprint: run.metrics.config_fingerprint.clone(),
            seed: run.metrics.seed,
            seed_hex: seed_to_hex(run.metrics.seed),
            frame_count: run.metrics.frame_count,
            jump_frames: run.metrics.jump_frames,
            jumps_started: run.metrics.jumps_started,
            panic_jumps: run.metrics.panic_jumps,
            obstacle_jumps: run.metrics.obstacle_jumps,
            danger_jumps: run.metrics.danger_jumps,
            exploration_jumps: run.metrics.exploration_jumps,
            peak_recent_crashes: run.metrics.peak_recent_crashes,
            final_posture: run.metrics.final_posture.as_str().to_string(),
        })
        .collect();
    run_records.sort_by(|a, b| a.preset.cmp(&b.preset).then_with(|| a.seed.cmp(&b.seed)));

    if config.save_tapes {
        save_tapes(&config.out_dir, &runs)?;
    }
    write_runs_csv(&config.out_dir.join("runs.csv"), &run_records)?;
    write_rankings_csv(&config.out_dir.join("rankings.csv"), &rankings)?;

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        trace: config.trace_label,
        frame_count: frames.len(),
        jobs: config.jobs,
        presets: config.presets,
        seeds: config.seeds,
        run_count: run_records.len(),
        preset_rankings: rankings,
        runs: run_records,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    tracing::info!(runs = report.run_count, out = %config.out_dir.display(), "benchmark done");
    Ok(report)
}

fn aggregate(preset: &str, runs: &[&InternalRun]) -> PresetAggregate {
    let count = runs.len() as f64;
    let avg = |metric: fn(&RunMetrics) -> u32| -> f64 {
        runs.iter().map(|r| metric(&r.metrics) as f64).sum::<f64>() / count
    };
    let strained = runs
        .iter()
        .filter(|r| matches!(r.metrics.final_posture, Posture::Wary | Posture::Cautious))
        .count();

    PresetAggregate {
        preset: preset.to_string(),
        config_fingerprint: runs
            .first()
            .map(|r| r.metrics.config_fingerprint.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        runs: runs.len(),
        avg_jump_frames: avg(|m| m.jump_frames),
        avg_jumps_started: avg(|m| m.jumps_started),
        avg_panic_jumps: avg(|m| m.panic_jumps),
        max_panic_jumps: runs
            .iter()
            .map(|r| r.metrics.panic_jumps)
            .max()
            .unwrap_or_default(),
        avg_obstacle_jumps: avg(|m| m.obstacle_jumps),
        avg_danger_jumps: avg(|m| m.danger_jumps),
        avg_exploration_jumps: avg(|m| m.exploration_jumps),
        avg_peak_recent_crashes: avg(|m| m.peak_recent_crashes),
        strained_rate: strained as f64 / count,
    }
}

fn save_tapes(out_dir: &Path, runs: &[InternalRun]) -> Result<()> {
    let tape_dir = out_dir.join("tapes");
    for run in runs {
        let path = tape_dir.join(format!(
            "{}-seed{:08x}-jumps{}.tape",
            run.preset, run.metrics.seed, run.metrics.jumps_started
        ));
        write_tape(&path, &run.tape)?;
    }
    Ok(())
}

fn write_runs_csv(path: &Path, rows: &[RunRecord]) -> Result<()> {
    let mut csv = String::from(
        "preset,config_fingerprint,seed_hex,seed,frame_count,jump_frames,jumps_started,panic_jumps,obstacle_jumps,danger_jumps,exploration_jumps,peak_recent_crashes,final_posture\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            row.preset,
            row.config_fingerprint,
            row.seed_hex,
            row.seed,
            row.frame_count,
            row.jump_frames,
            row.jumps_started,
            row.panic_jumps,
            row.obstacle_jumps,
            row.danger_jumps,
            row.exploration_jumps,
            row.peak_recent_crashes,
            row.final_posture
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

fn write_rankings_csv(path: &Path, rows: &[PresetAggregate]) -> Result<()> {
    let mut csv = String::from(
        "rank,preset,config_fingerprint,runs,avg_jump_frames,avg_jumps_started,avg_panic_jumps,max_panic_jumps,avg_obstacle_jumps,avg_danger_jumps,avg_exploration_jumps,avg_peak_recent_crashes,strained_rate\n",
    );
    for (idx, row) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{},{:.2},{:.2},{:.2},{},{:.2},{:.2},{:.2},{:.2},{:.4}\n",
            idx + 1,
            row.preset,
            row.config_fingerprint,
            row.runs,
            row.avg_jump_frames,
            row.avg_jumps_started,
            row.avg_panic_jumps,
            row.max_panic_jumps,
            row.avg_obstacle_jumps,
            row.avg_danger_jumps,
            row.avg_exploration_jumps,
            row.avg_peak_recent_crashes,
            row.strained_rate
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
