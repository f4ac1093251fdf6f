use anyhow::Result;
use reflex_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use reflex_autopilot::runner::{decode_actions, run_trace};
use reflex_autopilot::trace::{load_trace, write_trace};
use reflex_core::snapshot::parse_ascii_grid;
use reflex_core::{Action, AgentConfig, Snapshot};
use std::fs;

const STAGE: &str = "
    ................................................
    ................................................
    ................................................
    ................................................
    ..........................#.....................
    ..........................#.....................
    ...............#..........#.....................
    ...............#..........#.....................
    #########....####################....###########
    #########....####################....###########
";

/// The stage walked one column per tick, a long stall on open ground past
/// the last pit, then one knock-back.
fn stage_trace() -> Vec<Snapshot> {
    let grid = parse_ascii_grid(STAGE);
    let mut frames = Vec::new();
    let mut progress = 100.0;
    for tick in 0..120 {
        progress += match tick {
            40..=99 => 0.0,
            100 => -1.5,
            _ => 1.0,
        };
        let mut frame = Snapshot::new(Some(grid.clone()), progress, 100.0);
        frame.remaining_time_ms = Some(40);
        frames.push(frame);
    }
    frames
}

#[test]
fn replay_is_deterministic_per_seed() -> Result<()> {
    let frames = stage_trace();
    let cfg = AgentConfig::default();
    let a = run_trace(&cfg, 0xDEAD_BEEF, &frames)?;
    let b = run_trace(&cfg, 0xDEAD_BEEF, &frames)?;
    assert_eq!(a.actions, b.actions);
    assert_eq!(a.metrics.final_rng_state, b.metrics.final_rng_state);
    assert_eq!(a.metrics.frame_count, 120);
    assert!(a.metrics.jumps_started > 0);
    assert!(a.actions.contains(&Action::Advance));
    Ok(())
}

#[test]
fn stage_hazards_and_stall_both_trigger_jumps() -> Result<()> {
    let frames = stage_trace();
    for seed in [0xDEAD_BEEF, 0xC0FF_EE11, 0x1234_5678] {
        let artifact = run_trace(&AgentConfig::default(), seed, &frames)?;
        let m = &artifact.metrics;
        assert!(m.obstacle_jumps > 0, "seed={seed:#x}");
        assert_eq!(m.advance_frames + m.jump_frames, m.frame_count);
        assert!(m.peak_recent_crashes >= 1, "seed={seed:#x}");
    }
    Ok(())
}

#[test]
fn trace_file_round_trip_feeds_the_runner() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("stage.jsonl");
    let frames = stage_trace();
    write_trace(&path, &frames)?;

    let loaded = load_trace(&path)?;
    let from_file = run_trace(&AgentConfig::default(), 9, &loaded)?;
    let direct = run_trace(&AgentConfig::default(), 9, &frames)?;
    assert_eq!(from_file.actions, direct.actions);
    assert_eq!(decode_actions(&from_file.tape())?, direct.actions);
    Ok(())
}

#[test]
fn benchmark_smoke_outputs_expected_files() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let frames = stage_trace();
    let report = run_benchmark(
        BenchmarkConfig {
            presets: vec!["default".to_string(), "cautious".to_string()],
            seeds: vec![0xDEAD_BEEF, 0xC0FF_EE11, 3],
            trace_label: "stage".to_string(),
            out_dir: tmp.path().to_path_buf(),
            save_tapes: true,
            jobs: Some(2),
        },
        &frames,
    )?;

    assert_eq!(report.run_count, 6);
    assert_eq!(report.preset_rankings.len(), 2);
    assert!(report.preset_rankings.iter().all(|r| r.runs == 3));
    assert!(tmp.path().join("summary.json").exists());
    assert!(tmp.path().join("runs.csv").exists());
    assert!(tmp.path().join("rankings.csv").exists());
    assert_eq!(fs::read_dir(tmp.path().join("tapes"))?.count(), 6);

    let runs_csv = fs::read_to_string(tmp.path().join("runs.csv"))?;
    assert_eq!(runs_csv.lines().count(), 7);
    Ok(())
}

#[test]
fn benchmark_rejects_bad_inputs() {
    let frames = stage_trace();
    let tmp = tempfile::tempdir().expect("tempdir");
    let base = BenchmarkConfig {
        presets: vec!["default".to_string()],
        seeds: vec![1],
        trace_label: "stage".to_string(),
        out_dir: tmp.path().to_path_buf(),
        save_tapes: false,
        jobs: None,
    };
    assert!(run_benchmark(
        BenchmarkConfig {
            seeds: Vec::new(),
            ..base.clone()
        },
        &frames
    )
    .is_err());
    assert!(run_benchmark(
        BenchmarkConfig {
            jobs: Some(0),
            ..base.clone()
        },
        &frames
    )
    .is_err());
    assert!(run_benchmark(
        BenchmarkConfig {
            presets: vec!["warp".to_string()],
            ..base
        },
        &frames
    )
    .is_err());
}
