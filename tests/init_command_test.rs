use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn ssedit(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ssedit").expect("binary");
    cmd.current_dir(temp_dir.path());
    cmd
}

#[test]
fn init_creates_valid_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".ssedit").join("config.yaml");

    ssedit(&temp_dir)
        .args(["init", "--path"])
        .arg(temp_dir.path())
        .assert()
        .success();

    assert!(config_path.exists(), "config.yaml should be created");

    let content = fs::read_to_string(&config_path).expect("read config");
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&content).expect("config.yaml should be valid YAML");

    assert!(yaml.get("defaultProfile").is_some());
    assert!(yaml.get("settings").is_some());

    let settings = yaml.get("settings").unwrap();
    assert!(settings.get("allowWriteDefault").is_some());
    assert!(settings.get("output").is_some());

    let profiles = yaml.get("profiles").unwrap();
    let default_profile = profiles.get("default").unwrap();
    assert!(default_profile.get("server").is_some());
    assert!(default_profile.get("port").is_some());
    assert!(default_profile.get("schema").is_some());
}

#[test]
fn init_with_custom_profile_name() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".ssedit").join("config.yaml");

    ssedit(&temp_dir)
        .args(["init", "--path"])
        .arg(temp_dir.path())
        .args(["--profile", "production"])
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content).expect("valid YAML");

    assert_eq!(
        yaml.get("defaultProfile").and_then(|v| v.as_str()),
        Some("production")
    );
    assert!(
        yaml.get("profiles")
            .and_then(|p| p.get("production"))
            .is_some()
    );
}

#[test]
fn init_fails_if_exists_without_force() {
    let temp_dir = TempDir::new().unwrap();

    ssedit(&temp_dir)
        .args(["init", "--path"])
        .arg(temp_dir.path())
        .assert()
        .success();

    ssedit(&temp_dir)
        .args(["init", "--path"])
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn init_succeeds_with_force() {
    let temp_dir = TempDir::new().unwrap();

    ssedit(&temp_dir)
        .args(["init", "--path"])
        .arg(temp_dir.path())
        .assert()
        .success();

    ssedit(&temp_dir)
        .args(["init", "--force", "--path"])
        .arg(temp_dir.path())
        .assert()
        .success();
}
