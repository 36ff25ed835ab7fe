use std::process::Command;

const DEMO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../scenarios/demo.toml");

#[test]
fn run_prints_every_token() {
    let output = Command::new(env!("CARGO_BIN_EXE_eightway"))
        .args(["run", DEMO, "--frames", "120", "--seed", "4"])
        .output()
        .expect("failed to invoke eightway binary");

    assert!(output.status.success(), "eightway run should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("frames 120 "));
    assert!(stdout.contains("Player at"));
    assert_eq!(stdout.matches(" facing ").count(), 7);
    assert!(stdout.lines().skip(1).all(|line| line.contains("] steps ")));
    assert_eq!(stdout.matches("Follower(").count(), 2);
    assert_eq!(stdout.matches("Event(").count(), 4);
}

#[test]
fn path_reports_first_step_and_route() {
    let output = Command::new(env!("CARGO_BIN_EXE_eightway"))
        .args(["path", DEMO, "--from", "1,1", "--to", "5,3"])
        .output()
        .expect("failed to invoke eightway binary");

    assert!(output.status.success(), "eightway path should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("first step"));
    assert!(stdout.contains("-> (5, 3)"));
}

#[test]
fn missing_scenario_fails_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_eightway"))
        .args(["run", "does-not-exist.toml"])
        .output()
        .expect("failed to invoke eightway binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read scenario"));
}
