use std::process::exit;

use textdigest::task::Outcome;
use textdigest::{logging, settings, task};

const EXIT_MISMATCH: i32 = 2;

fn main() {
    let mut logging_state = logging::setup();
    let (cfg, job) = match settings::try_setup() {
        Ok(cfg_and_task) => cfg_and_task,
        Err(maybe_error) => {
            if let Some(error) = maybe_error {
                eprintln!("{}", error);
                exit(1)
            } else {
                exit(0)
            }
        }
    };
    if let Err(reason) = logging::update(&cfg.config_value.logging, &mut logging_state) {
        eprintln!("{}", reason);
        exit(1)
    };
    tracing::trace!(msg = "starting", task = ?task_name(&job), config_file = ?cfg.filename);
    let outcome = task::execute(job, &cfg.config_value.input, &mut std::io::stdout().lock());
    // `exit` skips destructors, flush buffered log lines first.
    drop(logging_state);
    match outcome {
        Ok(Outcome::Mismatched) => exit(EXIT_MISMATCH),
        Ok(_) => (),
        Err(reason) => {
            eprintln!("{:#}", reason);
            exit(1)
        }
    }
}

fn task_name(task: &settings::Task) -> &'static str {
    match task {
        settings::Task::Digest { .. } => "sha512",
        settings::Task::Verify { .. } => "verify",
    }
}
