use crate::settings::CfgLogging;

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::Filtered, filter::LevelFilter, fmt::format::JsonFields, layer::SubscriberExt,
    reload, util::SubscriberInitExt, Layer, Registry,
};

type JsonLayer = Filtered<
    tracing_subscriber::fmt::Layer<
        Registry,
        JsonFields,
        tracing_subscriber::fmt::format::Format<tracing_subscriber::fmt::format::Json>,
        NonBlocking,
    >,
    LevelFilter,
    Registry,
>;

/// Keeps the background writer alive and the JSON layer reloadable.
#[derive(Debug)]
pub struct LoggingState {
    worker_guard: WorkerGuard,
    json_handle: reload::Handle<JsonLayer, Registry>,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("could not open log directory {directory:?}: {message}")]
    OpenLogDirectory {
        directory: PathBuf,
        message: InitError,
    },
    #[error("could not update logging options: {message}")]
    Reload { message: reload::Error },
}

/// Destination named by `logging.output`.
#[derive(Debug, Clone, PartialEq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    Off,
    /// Daily rolling `textdigest.log.<date>` files inside the directory.
    Directory(PathBuf),
}

impl From<&Path> for LogOutput {
    fn from(output: &Path) -> Self {
        match output.to_str() {
            Some("stdout") => Self::Stdout,
            Some("stderr") => Self::Stderr,
            Some("off") => Self::Off,
            _ => Self::Directory(output.to_path_buf()),
        }
    }
}

impl LogOutput {
    fn writer(&self) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
        Ok(match self {
            Self::Stdout => tracing_appender::non_blocking(std::io::stdout()),
            Self::Stderr => tracing_appender::non_blocking(std::io::stderr()),
            Self::Off => tracing_appender::non_blocking(Discard),
            Self::Directory(directory) => {
                let appender = RollingFileAppender::builder()
                    .rotation(Rotation::DAILY)
                    .filename_prefix(env!("CARGO_PKG_NAME").to_owned() + ".log")
                    .build(directory)
                    .map_err(|reason| LoggingError::OpenLogDirectory {
                        directory: directory.clone(),
                        message: reason,
                    })?;
                tracing_appender::non_blocking(appender)
            }
        })
    }
}

#[derive(Debug)]
struct Discard;
impl Write for Discard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Installs the global subscriber. Nothing is logged until [`update`] sets a level.
pub fn setup() -> LoggingState {
    let (stderr_writer, worker_guard) = tracing_appender::non_blocking(std::io::stderr());
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_level(true)
        .with_file(false)
        .with_line_number(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(stderr_writer)
        .with_filter(LevelFilter::OFF);
    let (json_layer, json_handle) = reload::Layer::new(json_layer);
    tracing_subscriber::registry().with(json_layer).init();
    LoggingState {
        worker_guard,
        json_handle,
    }
}

/// Applies the configured level and output. On error the previous writer stays in place.
pub fn update(config: &CfgLogging, state: &mut LoggingState) -> Result<(), LoggingError> {
    let output = LogOutput::from(config.output.as_path());
    let (writer, worker_guard) = output.writer()?;
    state
        .json_handle
        .modify(|json_layer| {
            *json_layer.filter_mut() = config.level_name.to_level_filter();
            *json_layer.inner_mut().writer_mut() = writer;
        })
        .map_err(|reason| LoggingError::Reload { message: reason })?;
    state.worker_guard = worker_guard;
    tracing::debug!(
        msg = "logging options updated",
        level = ?config.level_name,
        output = ?output,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names() {
        assert_eq!(LogOutput::from(Path::new("stdout")), LogOutput::Stdout);
        assert_eq!(LogOutput::from(Path::new("stderr")), LogOutput::Stderr);
        assert_eq!(LogOutput::from(Path::new("off")), LogOutput::Off);
        assert_eq!(
            LogOutput::from(Path::new("/var/log/textdigest")),
            LogOutput::Directory(PathBuf::from("/var/log/textdigest"))
        );
    }

    #[test]
    fn directory_output_writes_rolling_file() {
        let directory = tempfile::tempdir().unwrap();
        let output = LogOutput::Directory(directory.path().join("logs"));
        let (_writer, guard) = output.writer().unwrap();
        drop(guard);
        assert!(directory.path().join("logs").is_dir());
    }

    #[test]
    fn uncreatable_directory_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let directory = file.path().join("logs");
        let output = LogOutput::Directory(directory.clone());
        match output.writer() {
            Err(LoggingError::OpenLogDirectory {
                directory: reported,
                ..
            }) => assert_eq!(reported, directory),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("log directory under a regular file was accepted"),
        }
    }
}
