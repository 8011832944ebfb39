use std::process::Command;

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_things")
}

fn version_output() -> std::process::Output {
    Command::new(bin_path())
        .arg("--version")
        .env_remove("THINGS_HOME")
        .output()
        .unwrap()
}

#[test]
fn version_prints_one_line_and_exits_zero() {
    let out = version_output();
    assert!(out.status.success(), "exited with {:?}", out.status);
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("things "), "{stdout}");
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.trim().len() > "things ".len());
}

#[test]
fn version_is_deterministic() {
    let first = version_output();
    let second = version_output();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn version_works_with_a_broken_config() {
    let home = tempfile::TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), "auth_token = [").unwrap();
    let out = Command::new(bin_path())
        .arg("--version")
        .env("THINGS_HOME", home.path())
        .output()
        .unwrap();
    assert!(out.status.success());
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let out = Command::new(bin_path()).arg("--bogus").output().unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(!out.stderr.is_empty());
}

#[test]
fn completion_bash_emits() {
    let out = Command::new(bin_path())
        .args(["completion", "bash"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(!out.stdout.is_empty());
}

#[test]
fn version_reports_the_baked_identifier() {
    let stdout = String::from_utf8(version_output().stdout).unwrap();
    assert_eq!(stdout, format!("things {}\n", things_version::THINGS_VERSION));

    // Set when the packager builds with `THINGS_VERSION=<id>`.
    let injected = option_env!("THINGS_VERSION")
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(injected) = injected {
        assert_eq!(stdout.trim_end(), format!("things {injected}"));
    }
}
