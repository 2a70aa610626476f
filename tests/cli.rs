use structopt::StructOpt;

use textdigest::digest::to_sha512;
use textdigest::settings::{try_setup_from, CMDOpt, CfgLoggingLevelName, Task};
use textdigest::task::{execute, Outcome};

#[test]
fn sha512_command_prints_digest_of_argument() {
    let options = CMDOpt::from_iter_safe(["textdigest", "sha512", "--log-level", "off", "abc"]).unwrap();
    let (cfg, job) = try_setup_from(options).unwrap();
    assert_eq!(cfg.config_value.logging.level_name, CfgLoggingLevelName::Off);
    let mut output = Vec::new();
    let outcome = execute(job, &cfg.config_value.input, &mut output).unwrap();
    assert_eq!(outcome, Outcome::Printed);
    assert_eq!(String::from_utf8(output).unwrap().trim_end(), to_sha512("abc"));
}

#[test]
fn verify_command_round_trip() {
    let expected = to_sha512("integrity");
    let options = CMDOpt::from_iter_safe(["textdigest", "verify", expected.as_str(), "integrity"]).unwrap();
    let (cfg, job) = try_setup_from(options).unwrap();
    let mut output = Vec::new();
    assert_eq!(
        execute(job, &cfg.config_value.input, &mut output).unwrap(),
        Outcome::Matched
    );
}

#[test]
fn missing_input_parses_to_prompt_task() {
    let options = CMDOpt::from_iter_safe(["textdigest", "sha512"]).unwrap();
    let (_, job) = try_setup_from(options).unwrap();
    assert_eq!(job, Task::Digest { input: None, json: false });
}

#[test]
fn unknown_log_level_is_rejected() {
    assert!(CMDOpt::from_iter_safe(["textdigest", "sha512", "--log-level", "loud", "abc"]).is_err());
}

#[test]
fn verify_requires_expected_digest() {
    assert!(CMDOpt::from_iter_safe(["textdigest", "verify"]).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let directory = tempfile::tempdir().unwrap();
    let config_file = directory.path().join("absent.toml");
    let options = CMDOpt::from_iter_safe([
        "textdigest",
        "sha512",
        "--config-file",
        config_file.to_str().unwrap(),
        "abc",
    ])
    .unwrap();
    assert!(matches!(try_setup_from(options), Err(Some(_))));
}
