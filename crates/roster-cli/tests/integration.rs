#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn roster(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("roster").unwrap();
    cmd.current_dir(dir.path()).env("ROSTER_ROOT", dir.path());
    cmd
}

fn init_roster(dir: &TempDir) {
    roster(dir)
        .args(["init", "--organization", "Riverside"])
        .assert()
        .success();
}

fn add_member(dir: &TempDir, name: &str, email: &str) {
    roster(dir)
        .args(["member", "create", "--name", name, "--email", email])
        .assert()
        .success();
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// roster init / config
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);

    assert!(dir.path().join(".roster/config.yaml").exists());
    assert!(dir.path().join(".roster/members").is_dir());
    assert!(dir.path().join(".roster/assessments").is_dir());
    assert!(dir.path().join(".roster/verticals/masoom/manifest.yaml").exists());

    let config = std::fs::read_to_string(dir.path().join(".roster/config.yaml")).unwrap();
    let parsed: serde_yaml::Value = serde_yaml::from_str(&config).unwrap();
    assert_eq!(parsed["organization"]["name"].as_str(), Some("Riverside"));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    roster(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .roster/config.yaml"));
}

#[test]
fn commands_before_init_fail() {
    let dir = TempDir::new().unwrap();
    roster(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("roster init"));
}

#[test]
fn config_thresholds_are_validated() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    roster(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
    roster(&dir)
        .args(["config", "set-thresholds", "--skill", "1.5"])
        .assert()
        .failure();
    roster(&dir)
        .args(["config", "set-thresholds", "--will", "0.6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("will >= 0.6"));
}

// ---------------------------------------------------------------------------
// roster member
// ---------------------------------------------------------------------------

#[test]
fn member_create_and_list() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha Rao", "asha@example.org");

    roster(&dir)
        .args(["member", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("asha@example.org"));

    let members = json_stdout(roster(&dir).args(["member", "list", "--json"]));
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["status"], "active");
}

#[test]
fn member_duplicate_email_fails() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    roster(&dir)
        .args(["member", "create", "--name", "Other", "--email", "ASHA@example.org"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn member_invalid_email_fails() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    roster(&dir)
        .args(["member", "create", "--name", "Asha", "--email", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid email"));
}

#[test]
fn member_deactivate_hides_from_list() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    roster(&dir)
        .args(["member", "deactivate", "asha@example.org"])
        .assert()
        .success();
    roster(&dir)
        .args(["member", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No members."));
    roster(&dir)
        .args(["member", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("inactive"));
}

#[test]
fn certification_award_sets_expiry() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    roster(&dir)
        .args(["cert", "create", "first-aid", "--name", "First aid", "--validity-months", "12"])
        .assert()
        .success();
    roster(&dir)
        .args(["member", "award-cert", "asha@example.org", "first-aid", "--on", "2026-01-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid until 2027-01-15"));
}

// ---------------------------------------------------------------------------
// roster member import
// ---------------------------------------------------------------------------

const DUPLICATE_CSV: &str = "name,email,phone\nNew Name,asha@example.org,98450 12345\n";

fn import(dir: &TempDir, flags: &[&str]) -> serde_json::Value {
    let file = dir.path().join("members.csv");
    std::fs::write(&file, DUPLICATE_CSV).unwrap();
    let mut cmd = roster(dir);
    cmd.args(["--json", "member", "import"]).arg(&file).args(flags);
    json_stdout(&mut cmd)
}

#[test]
fn import_duplicate_skip_existing() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    let report = import(&dir, &["--skip-existing"]);
    assert_eq!(report["rows"][0]["status"], "skipped");
    assert_eq!(report["summary"]["skipped"], 1);
}

#[test]
fn import_duplicate_update_existing() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    let report = import(&dir, &["--update-existing"]);
    assert_eq!(report["rows"][0]["status"], "updated");

    let member = json_stdout(roster(&dir).args(["--json", "member", "show", "asha@example.org"]));
    assert_eq!(member["name"], "New Name");
    assert_eq!(member["phone"], "919845012345");
}

#[test]
fn import_duplicate_without_flags_is_error() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    let report = import(&dir, &[]);
    assert_eq!(report["rows"][0]["status"], "error");
    assert_eq!(report["summary"]["errors"], 1);
}

#[test]
fn import_writes_annotated_report() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    let file = dir.path().join("in.csv");
    let out = dir.path().join("out.csv");
    std::fs::write(&file, "name,email\nAsha,asha@example.org\n,missing@example.org\n").unwrap();
    roster(&dir)
        .args(["member", "import"])
        .arg(&file)
        .arg("--report")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 created"));
    let report = std::fs::read_to_string(out).unwrap();
    assert!(report.starts_with("name,email,status,messages"));
    assert!(report.contains("name is required"));
}

// ---------------------------------------------------------------------------
// roster assess
// ---------------------------------------------------------------------------

fn take_star(dir: &TempDir) -> serde_json::Value {
    let mut cmd = roster(dir);
    cmd.args(["--json", "assess", "take", "asha@example.org"])
        .write_stdin("high-energy-field-work\nteens\nadvanced\nhigh\nhigh\n");
    json_stdout(&mut cmd)
}

#[test]
fn assess_take_categorizes_star() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");

    let a = take_star(&dir);
    assert_eq!(a["status"], "completed");
    assert_eq!(a["category"], "star");
    assert!(a["skill_score"].as_f64().unwrap() >= 0.7);
    assert!(a["will_score"].as_f64().unwrap() >= 0.7);
    assert_eq!(a["matches"].as_array().unwrap().len(), 3);
    assert_eq!(a["roadmap"].as_array().unwrap().len(), 6);
}

#[test]
fn assess_take_back_and_invalid_input() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");

    let mut cmd = roster(&dir);
    cmd.args(["--json", "assess", "take", "asha@example.org"])
        .write_stdin("creative_content\nback\nbehind_the_scenes\nnonsense\nchildren\nbeginner\nlow\nlow\n");
    let a = json_stdout(&mut cmd);
    assert_eq!(a["answers"]["energy_focus"], "behind_the_scenes");
    assert_eq!(a["category"], "dead_wood");
}

#[test]
fn assess_take_keeps_answers_when_save_fails() {
    use std::io::{BufRead, BufReader, Write};
    use std::process::{Command as StdCommand, Stdio};
    use std::time::{Duration, Instant};

    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    let members = json_stdout(roster(&dir).args(["member", "list", "--json"]));
    let id = members[0]["id"].as_str().unwrap().to_string();
    let manifest = dir.path().join(format!(".roster/assessments/{id}/manifest.yaml"));

    let mut child = StdCommand::new(assert_cmd::cargo::cargo_bin("roster"))
        .args(["--json", "assess", "take", "asha@example.org"])
        .current_dir(dir.path())
        .env("ROSTER_ROOT", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // `take` writes the in-progress attempt before reading answers.
    let deadline = Instant::now() + Duration::from_secs(30);
    while !manifest.is_file() {
        assert!(Instant::now() < deadline, "assessment was never started");
        std::thread::sleep(Duration::from_millis(20));
    }
    // A directory in place of the manifest makes the save fail.
    std::fs::remove_file(&manifest).unwrap();
    std::fs::create_dir(&manifest).unwrap();

    let mut stdin = child.stdin.take().unwrap();
    stdin
        .write_all(b"high-energy-field-work\nteens\nadvanced\nhigh\nhigh\n")
        .unwrap();
    stdin.flush().unwrap();

    let mut stderr = BufReader::new(child.stderr.take().unwrap());
    let mut line = String::new();
    loop {
        line.clear();
        assert!(stderr.read_line(&mut line).unwrap() > 0, "no save error reported");
        if line.contains("could not save assessment") {
            break;
        }
    }

    std::fs::remove_dir(&manifest).unwrap();
    stdin.write_all(b"\n").unwrap();
    drop(stdin);

    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    let a: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(a["status"], "completed");
    assert_eq!(a["category"], "star");
    assert_eq!(a["answers"]["skill_level"], "advanced");
}

#[test]
fn assess_take_with_short_input_fails() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    roster(&dir)
        .args(["assess", "take", "asha@example.org"])
        .write_stdin("teaching_mentoring\nadults\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input ended"));
}

#[test]
fn assess_answer_then_submit() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    roster(&dir).args(["assess", "start", "asha@example.org"]).assert().success();
    roster(&dir)
        .args(["assess", "submit", "asha@example.org"])
        .assert()
        .failure();

    for (q, v) in [
        ("energy-focus", "policy_advocacy"),
        ("age-group", "adults"),
        ("skill-level", "expert"),
        ("time-commitment", "low"),
        ("travel-willingness", "low"),
    ] {
        roster(&dir)
            .args(["assess", "answer", "asha@example.org", q, v])
            .assert()
            .success();
    }
    let a = json_stdout(roster(&dir).args(["--json", "assess", "submit", "asha@example.org"]));
    assert_eq!(a["category"], "cynic");
}

#[test]
fn milestones_survive_retake() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    take_star(&dir);

    roster(&dir)
        .args(["assess", "complete", "asha@example.org", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/6 months complete"));
    roster(&dir)
        .args(["assess", "complete", "asha@example.org", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already complete"));

    let retake = take_star(&dir);
    assert_eq!(retake["version"], 2);
    assert_eq!(retake["roadmap"][0]["completed"], true);

    let history = json_stdout(roster(&dir).args(["--json", "assess", "history", "asha@example.org"]));
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[test]
fn assign_vertical_and_mentor() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    add_member(&dir, "Guide", "guide@example.org");
    take_star(&dir);

    roster(&dir)
        .args(["assess", "assign-vertical", "asha@example.org", "road-safety"])
        .assert()
        .success();
    roster(&dir)
        .args(["assess", "assign-vertical", "asha@example.org", "unknown"])
        .assert()
        .failure();
    roster(&dir)
        .args(["assess", "assign-mentor", "asha@example.org", "asha@example.org"])
        .assert()
        .failure();
    roster(&dir)
        .args(["assess", "assign-mentor", "asha@example.org", "guide@example.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assigned mentor 'Guide'"));
}

// ---------------------------------------------------------------------------
// roster vertical / succession / message
// ---------------------------------------------------------------------------

#[test]
fn vertical_kpi_performance() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    roster(&dir)
        .args(["vertical", "add-kpi", "health", "camps", "--name", "Health camps", "--target", "10"])
        .assert()
        .success();
    roster(&dir)
        .args(["vertical", "record", "health", "camps", "--period", "2026-q3", "--value", "8"])
        .assert()
        .success();
    let perf = json_stdout(roster(&dir).args(["--json", "vertical", "performance", "health"]));
    assert_eq!(perf["score"].as_f64(), Some(80.0));
    assert_eq!(perf["band"], "on_track");
}

#[test]
fn succession_vote_and_tally() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    add_member(&dir, "Ravi", "ravi@example.org");
    add_member(&dir, "Voter", "voter@example.org");

    let steps: &[&[&str]] = &[
        &["succession", "create", "chair-2026", "--title", "Chair", "--position", "chair"],
        &[
            "succession", "nominate", "chair-2026", "--position", "chair", "--nominee",
            "asha@example.org", "--by", "ravi@example.org",
        ],
        &["succession", "nomination", "chair-2026", "N1", "accepted"],
        &["succession", "schedule", "chair-2026", "--position", "chair", "--at", "2026-11-01T10:00:00Z"],
        &["succession", "open-voting", "chair-2026"],
        &[
            "succession", "vote", "chair-2026", "M1", "--voter", "voter@example.org",
            "--candidate", "asha@example.org",
        ],
    ];
    for args in steps {
        roster(&dir).args(*args).assert().success();
    }
    roster(&dir)
        .args([
            "succession", "vote", "chair-2026", "M1", "--voter", "voter@example.org",
            "--candidate", "ravi@example.org",
        ])
        .assert()
        .failure();

    let tally = json_stdout(roster(&dir).args(["--json", "succession", "tally", "chair-2026", "M1"]));
    assert_eq!(tally[0]["votes"], 1);
}

#[test]
fn broadcast_dry_run_lists_recipients() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    roster(&dir)
        .args([
            "member", "create", "--name", "Asha", "--email", "asha@example.org", "--phone",
            "98450 12345", "--chapter", "pune",
        ])
        .assert()
        .success();
    roster(&dir)
        .args(["message", "broadcast", "--chapter", "pune", "--text", "hi", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("919845012345"));
}

#[test]
fn broadcast_without_messaging_config_fails() {
    let dir = TempDir::new().unwrap();
    init_roster(&dir);
    add_member(&dir, "Asha", "asha@example.org");
    roster(&dir)
        .args(["message", "broadcast", "--all", "--text", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("messaging is not configured"));
}
