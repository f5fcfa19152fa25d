use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

const DEFAULT_LOG_FILTER: &str = "warn,watsonx_demo=info";
const DEFAULT_LOG_FILE_PATH: &str = "logs/watsonx-demo.log";
const FALLBACK_LOG_FILE_NAME: &str = "watsonx-demo.log";

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogOutput {
    Stderr,
    File,
    Both,
}

impl LogOutput {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Stderr => "stderr",
            Self::File => "file",
            Self::Both => "both",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogSettings {
    format: LogFormat,
    output: LogOutput,
    file_path: PathBuf,
}

impl LogSettings {
    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let lowered = |raw: Option<String>| raw.map(|value| value.trim().to_ascii_lowercase());

        let format = match lowered(get_var("LOG_FORMAT")).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        let output = match lowered(get_var("LOG_OUTPUT")).as_deref() {
            Some("file") => LogOutput::File,
            Some("both") => LogOutput::Both,
            _ => LogOutput::Stderr,
        };
        let file_path = get_var("LOG_FILE_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH));

        Self {
            format,
            output,
            file_path,
        }
    }
}

fn daily_file_writer(path: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| OsStr::new(FALLBACK_LOG_FILE_NAME));

    fs::create_dir_all(dir)?;
    Ok(tracing_appender::non_blocking(
        tracing_appender::rolling::daily(dir, file_name),
    ))
}

fn install(format: LogFormat, writer: BoxMakeWriter) -> InitResult {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

/// Installs the global subscriber. Logs always go to stderr, a daily-rotated
/// file, or both; stdout is left to the program's own output.
///
/// Hold the returned guard until exit so buffered file output is flushed.
pub fn init() -> Option<WorkerGuard> {
    let settings = LogSettings::from_env_with(|key| env::var(key).ok());

    if settings.output == LogOutput::Stderr {
        let _ = install(settings.format, BoxMakeWriter::new(std::io::stderr));
        return None;
    }

    match daily_file_writer(&settings.file_path) {
        Ok((file_writer, guard)) => {
            let writer = if settings.output == LogOutput::Both {
                BoxMakeWriter::new(std::io::stderr.and(file_writer))
            } else {
                BoxMakeWriter::new(file_writer)
            };
            install(settings.format, writer).ok().map(|()| guard)
        }
        Err(err) => {
            eprintln!(
                "watsonx-demo: failed to initialize LOG_OUTPUT={} at '{}': {}; using stderr instead",
                settings.output.as_str(),
                settings.file_path.display(),
                err
            );
            let _ = install(settings.format, BoxMakeWriter::new(std::io::stderr));
            None
        }
    }
}
