use std::path::PathBuf;

use structopt::clap::{crate_authors, crate_description, crate_name, crate_version};
use structopt::StructOpt;

use tracing::{info, trace};

use config::{Config, ConfigError, Environment, File};

use serde_derive::{Deserialize, Serialize};

use thiserror::Error;

use crate::samples;

#[derive(Debug, Clone, StructOpt)]
#[
    structopt(
        name = crate_name!(),
        about = crate_description!(),
        version = crate_version!(),
        author = crate_authors!()
    )
]
pub enum CMDOpt {
    #[structopt(about = "Prints hex-encoded sha512 of input")]
    Sha512(CMDSha512),
    #[structopt(about = "Checks input against an expected hex-encoded sha512")]
    Verify(CMDVerify),
    Sample(CMDSample),
}

#[derive(Debug, Clone, StructOpt)]
pub struct CMDCommon {
    #[structopt(long, parse(from_os_str), env = "TEXTDIGEST_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
    #[structopt(long, env = "TEXTDIGEST_LOG_LEVEL")]
    pub log_level: Option<CfgLoggingLevelName>,
}

#[derive(Debug, Clone, StructOpt)]
pub struct CMDSha512 {
    #[structopt(flatten)]
    pub common: CMDCommon,
    #[structopt(long, help = "Prints a JSON object instead of the bare digest")]
    pub json: bool,
    #[structopt(help = "input to be hashed. `-` reads standard input. If empty, It prompts to ask input.")]
    pub input: Option<String>,
}

#[derive(Debug, Clone, StructOpt)]
pub struct CMDVerify {
    #[structopt(flatten)]
    pub common: CMDCommon,
    #[structopt(help = "expected hex-encoded sha512")]
    pub expected: String,
    #[structopt(help = "input to be checked. `-` reads standard input. If empty, It prompts to ask input.")]
    pub input: Option<String>,
}

#[derive(Debug, Clone, StructOpt)]
#[structopt(about = "Configuration samples")]
pub enum CMDSample {
    #[structopt(about = "Configuration with default values set.")]
    Config,
}

/// What the binary does once configuration is loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Digest {
        input: Option<String>,
        json: bool,
    },
    Verify {
        expected: String,
        input: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cfg {
    pub config_value: CfgValue,
    pub filename: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum CfgError {
    #[error("Could not read configuration file {filename:?}: {message:?}")]
    ReadFile {
        filename: PathBuf,
        message: ConfigError,
    },
    #[error("Could not deserialize configuration file {filename:?}: {message:?}")]
    Deserialize {
        filename: PathBuf,
        message: ConfigError,
    },
    #[error("Could not load configuration from environment: {message:?}")]
    Environment { message: ConfigError },
    #[error("{0}")]
    Check(String),
}

trait CheckValue {
    type Error;
    fn check_value(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CfgValue {
    #[serde(default)]
    pub logging: CfgLogging,
    #[serde(default)]
    pub input: CfgInput,
}

impl TryFrom<PathBuf> for CfgValue {
    type Error = CfgError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        let mut config_value = Config::builder()
            .add_source(File::from(path.clone()).required(true))
            .add_source(Environment::with_prefix(crate_name!()))
            .build()
            .map_err(|reason| CfgError::ReadFile {
                filename: path.clone(),
                message: reason,
            })?
            .try_deserialize::<CfgValue>()
            .map_err(|reason| CfgError::Deserialize {
                filename: path.clone(),
                message: reason,
            })?;
        config_value.check_value()?;
        info!(msg = "loaded configuration", filename = ?path);
        trace!(config = ?config_value);
        Ok(config_value)
    }
}

impl CfgValue {
    pub fn from_environment() -> Result<Self, CfgError> {
        let mut config_value = Config::builder()
            .add_source(Environment::with_prefix(crate_name!()))
            .build()
            .and_then(|config| config.try_deserialize::<CfgValue>())
            .map_err(|reason| CfgError::Environment { message: reason })?;
        config_value.check_value()?;
        trace!(config = ?config_value);
        Ok(config_value)
    }
}

impl CheckValue for CfgValue {
    type Error = CfgError;
    fn check_value(&mut self) -> Result<(), Self::Error> {
        self.logging
            .check_value()
            .map_err(|reason| CfgError::Check(reason.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CfgLogging {
    #[serde(default)]
    pub level_name: CfgLoggingLevelName,
    #[serde(default = "CfgLoggingDefault::output")]
    pub output: PathBuf,
}

#[derive(Debug, Error)]
pub enum CfgLoggingCheckError {
    #[error("Logging output {output:?} exists but is not a directory")]
    OutputIsNotADirectory { output: PathBuf },
}

struct CfgLoggingDefault {}
impl CfgLoggingDefault {
    fn output() -> PathBuf {
        PathBuf::from("stderr")
    }
}

impl Default for CfgLogging {
    fn default() -> Self {
        Self {
            level_name: Default::default(),
            output: CfgLoggingDefault::output(),
        }
    }
}

impl CheckValue for CfgLogging {
    type Error = CfgLoggingCheckError;
    fn check_value(&mut self) -> Result<(), Self::Error> {
        match self.output.to_str() {
            Some("stdout") | Some("stderr") | Some("off") => Ok(()),
            _ if self.output.exists() && !self.output.is_dir() => {
                Err(CfgLoggingCheckError::OutputIsNotADirectory {
                    output: self.output.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CfgInput {
    #[serde(default = "CfgInputDefault::trim")]
    pub trim: bool,
    #[serde(default = "CfgInputDefault::allow_empty")]
    pub allow_empty: bool,
}

struct CfgInputDefault {}
impl CfgInputDefault {
    fn trim() -> bool {
        false
    }
    fn allow_empty() -> bool {
        true
    }
}

impl Default for CfgInput {
    fn default() -> Self {
        Self {
            trim: CfgInputDefault::trim(),
            allow_empty: CfgInputDefault::allow_empty(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CfgLoggingLevelName {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Off,
}

impl Default for CfgLoggingLevelName {
    fn default() -> Self {
        Self::Warning
    }
}

impl std::str::FromStr for CfgLoggingLevelName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str().trim() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "off" => Ok(Self::Off),
            unknown => Err(format!("Unknown log level name {:?}", unknown)),
        }
    }
}

impl CfgLoggingLevelName {
    pub fn to_level_filter(&self) -> tracing_subscriber::filter::LevelFilter {
        use tracing_subscriber::filter::LevelFilter;
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Error => LevelFilter::ERROR,
            Self::Warning => LevelFilter::WARN,
            Self::Off => LevelFilter::OFF,
        }
    }
}

impl TryFrom<PathBuf> for Cfg {
    type Error = CfgError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        let filename = if path.is_relative() {
            std::env::current_dir()
                .map(|directory| directory.join(&path))
                .unwrap_or_else(|_| path.clone())
        } else {
            path.clone()
        };
        Ok(Cfg {
            config_value: CfgValue::try_from(path)?,
            filename: Some(filename),
        })
    }
}

impl TryFrom<CMDCommon> for Cfg {
    type Error = CfgError;

    fn try_from(command_line_options: CMDCommon) -> Result<Self, Self::Error> {
        let mut cfg = match command_line_options.config_file {
            Some(config_file) => Cfg::try_from(config_file)?,
            None => Cfg {
                config_value: CfgValue::from_environment()?,
                filename: None,
            },
        };
        if let Some(level_name) = command_line_options.log_level {
            cfg.config_value.logging.level_name = level_name;
        };
        Ok(cfg)
    }
}

pub fn try_setup() -> Result<(Cfg, Task), Option<String>> {
    try_setup_from(CMDOpt::from_args())
}

/// Returns `Err(None)` when the command is already handled and the process should exit successfully.
pub fn try_setup_from(options: CMDOpt) -> Result<(Cfg, Task), Option<String>> {
    let (common, task) = match options {
        CMDOpt::Sample(sample_name) => {
            samples::print(sample_name);
            return Err(None);
        }
        CMDOpt::Sha512(CMDSha512 {
            common,
            json,
            input,
        }) => (common, Task::Digest { input, json }),
        CMDOpt::Verify(CMDVerify {
            common,
            expected,
            input,
        }) => (common, Task::Verify { expected, input }),
    };
    let cfg = Cfg::try_from(common).map_err(|reason| Some(reason.to_string()))?;
    Ok((cfg, task))
}
