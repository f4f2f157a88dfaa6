use assert_cmd::Command;

#[test]
fn help_lists_all_commands() {
    let mut cmd = Command::cargo_bin("ssedit").expect("binary");
    cmd.arg("--help");
    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&output);

    for name in [
        "status", "tables", "columns", "rows", "form", "insert", "update", "delete", "sql",
        "export", "init", "config",
    ] {
        assert!(stdout.contains(name), "missing command: {}", name);
    }
}

#[test]
fn help_subcommand_shows_command_help() {
    let mut cmd = Command::cargo_bin("ssedit").expect("binary");
    cmd.args(["help", "rows"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&output);

    assert!(stdout.contains("--limit"));
    assert!(stdout.contains("--offset"));
}

#[test]
fn no_arguments_shows_usage() {
    let mut cmd = Command::cargo_bin("ssedit").expect("binary");
    let output = cmd.assert().failure().get_output().stderr.clone();
    let stderr = String::from_utf8_lossy(&output);
    assert!(stderr.contains("Usage"));
}
