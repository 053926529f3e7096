use assert_cmd::Command;

#[test]
fn help_lists_service_flags() {
    let output = Command::cargo_bin("wordtrial")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--server-url"));
    assert!(stdout.contains("--seconds"));
}
