//! Writing the rendered result set to its destination.

use serde::Serialize;
use std::fmt::{self, Debug};
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, error, info};

use crate::error::{ConfigError, Result};
use crate::formatter::JsonFormatter;

/// Where the export goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output
    Stdout,

    /// A file, created or truncated on export
    File(PathBuf),
}

/// Outcome of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of records written
    pub records: usize,

    /// True when JSON rendering failed and the fallback dump was written
    pub degraded: bool,
}

impl Destination {
    /// Interpret the `-file` flag: empty means standard output
    pub fn from_flag(flag: &str) -> Self {
        if flag.is_empty() {
            Destination::Stdout
        } else {
            Destination::File(PathBuf::from(flag))
        }
    }

    /// Whether output lands on an interactive terminal
    pub fn is_terminal(&self) -> bool {
        match self {
            Destination::Stdout => std::io::stdout().is_terminal(),
            Destination::File(_) => false,
        }
    }

    /// Open the destination for writing
    ///
    /// # Returns
    /// * `Result<Box<dyn AsyncWrite>>` - Buffered writer, or a configuration
    ///   error when the file cannot be created
    pub async fn open(&self) -> Result<Box<dyn AsyncWrite + Unpin + Send>> {
        match self {
            Destination::Stdout => Ok(Box::new(tokio::io::stdout())),
            Destination::File(path) => {
                let file = File::create(path).await.map_err(|e| ConfigError::OutputFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                debug!("Created output file: {}", path.display());
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => write!(f, "stdout"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Render `records` and write them to `out`
///
/// JSON rendering failures are logged and the `Debug` dump is written instead;
/// only write failures are returned as errors.
pub async fn write_records<T, W>(
    records: &[T],
    out: &mut W,
    formatter: &JsonFormatter,
) -> Result<ExportSummary>
where
    T: Serialize + Debug,
    W: AsyncWrite + Unpin + ?Sized,
{
    let rendered = formatter.render(records);

    if let Some(ref e) = rendered.degraded {
        error!(
            kind = "serialization",
            operation = "export",
            error = %e,
            "err converting to json, writing raw dump instead"
        );
    }

    out.write_all(rendered.text.as_bytes()).await?;
    out.flush().await?;

    Ok(ExportSummary {
        records: records.len(),
        degraded: rendered.degraded.is_some(),
    })
}

/// Export `records` to `destination`
///
/// The destination is opened only here, after the lookups succeeded, so a
/// failed run never leaves an output file behind.
pub async fn export<T>(
    records: &[T],
    destination: &Destination,
    formatter: &JsonFormatter,
) -> Result<ExportSummary>
where
    T: Serialize + Debug,
{
    let mut out = destination.open().await?;
    let summary = write_records(records, &mut out, formatter).await?;

    info!(
        records = summary.records,
        destination = %destination,
        degraded = summary.degraded,
        "export written"
    );
    Ok(summary)
}
