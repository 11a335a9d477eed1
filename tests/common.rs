use assert_cmd::cargo_bin_cmd;

/// Run the program with default settings, checking that it succeeds
pub fn assert_flexmex_runs(args: &[&str]) {
    cargo_bin_cmd!("flexmex")
        .env("FLEXMEX_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .success();
}

/// Run the program with default settings, checking that it fails
#[allow(dead_code)]
pub fn assert_flexmex_fails(args: &[&str]) {
    cargo_bin_cmd!("flexmex")
        .env("FLEXMEX_USE_DEFAULT_SETTINGS", "1")
        .args(args)
        .assert()
        .failure()
        .code(1);
}

/// Run the program with default settings and return what it printed to stdout
#[allow(dead_code)]
pub fn get_flexmex_stdout(args: &[&str]) -> String {
    let output = cargo_bin_cmd!("flexmex")
        .env("FLEXMEX_USE_DEFAULT_SETTINGS", "1")
        .env("FLEXMEX_LOG_LEVEL", "off")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());

    String::from_utf8(output.stdout).unwrap()
}
