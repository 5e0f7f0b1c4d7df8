use std::fs;
use std::process::Command;

fn lifesim() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lifesim"));
    cmd.env("RUST_LOG", "off")
        .env_remove("LIFESIM_SEED")
        .env_remove("LIFESIM_CONFIG");
    cmd
}

#[test]
fn headless_run_writes_exports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, r#"{ "initial_food": 10, "world_radius": 600.0 }"#)
        .expect("write config");
    let frame = dir.path().join("out/frame.json");
    let stats = dir.path().join("out/stats.json");
    let summary = dir.path().join("out/summary.json");

    let status = lifesim()
        .args(["--races", "snake,random", "--population", "6", "--ticks", "25"])
        .args(["--tick-rate", "0", "--seed", "42", "--spawn", "scattered", "--debug"])
        .arg("--config")
        .arg(&config_path)
        .arg("--frame-out")
        .arg(&frame)
        .arg("--stats-out")
        .arg(&stats)
        .arg("--summary-out")
        .arg(&summary)
        .status()
        .expect("failed to run lifesim binary");
    assert!(status.success(), "headless run failed");

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary).expect("summary")).expect("json");
    assert_eq!(summary["ticks_simulated"], 25);
    assert_eq!(summary["initial_lifelets"], 6);
    let races: Vec<_> = summary["population"]
        .as_array()
        .expect("population")
        .iter()
        .map(|entry| entry["race"].as_str().expect("race").to_owned())
        .collect();
    assert_eq!(races, ["Random", "Snake"]);

    let stats: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&stats).expect("stats")).expect("json");
    assert_eq!(stats["tick"], 25);
    let frame = fs::read_to_string(&frame).expect("frame");
    assert!(frame.contains("overlay_text"));
}

#[test]
fn unknown_race_is_rejected() {
    let output = lifesim()
        .args(["--races", "dragons", "--ticks", "1"])
        .output()
        .expect("failed to run lifesim binary");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown race"));
}

#[test]
fn list_races_prints_registry() {
    let output = lifesim()
        .arg("--list-races")
        .output()
        .expect("failed to run lifesim binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for race in lifesim_races::BUILTIN_RACES {
        assert!(stdout.contains(race), "missing {race}");
    }
}
