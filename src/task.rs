use std::io::Write;

use anyhow::{bail, Context};
use serde_derive::Serialize;
use tracing::{info, warn};

use crate::digest;
use crate::input::{self, InputSource};
use crate::settings::{CfgInput, Task};

const ALGORITHM: &str = "sha512";

#[derive(Debug, Serialize)]
struct DigestReport<'a> {
    algorithm: &'static str,
    digest: &'a str,
    input_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Printed,
    Matched,
    Mismatched,
}

pub fn execute(task: Task, config: &CfgInput, output: &mut impl Write) -> anyhow::Result<Outcome> {
    match task {
        Task::Digest { input, json } => {
            let (hex_digest, input_bytes) =
                input::digest_source(InputSource::from_argument(input), config)?;
            if json {
                let report = DigestReport {
                    algorithm: ALGORITHM,
                    digest: &hex_digest,
                    input_bytes,
                };
                let report = serde_json::to_string(&report).context("could not encode report to JSON")?;
                writeln!(output, "{}", report)?;
            } else {
                writeln!(output, "{}", hex_digest)?;
            };
            info!(msg = "printed digest", input_bytes);
            Ok(Outcome::Printed)
        }
        Task::Verify { expected, input } => {
            let expected = expected.trim().to_lowercase();
            if !digest::is_sha512_hex(&expected) {
                bail!(
                    "expected digest {:?} is not a {}-character hex-encoded sha512",
                    expected,
                    digest::DIGEST_HEX_LENGTH
                );
            };
            let (hex_digest, input_bytes) =
                input::digest_source(InputSource::from_argument(input), config)?;
            if hex_digest == expected {
                writeln!(output, "OK")?;
                info!(msg = "digest matched", input_bytes);
                Ok(Outcome::Matched)
            } else {
                writeln!(output, "MISMATCH")?;
                warn!(msg = "digest mismatched", input_bytes);
                Ok(Outcome::Mismatched)
            }
        }
    }
}
