//! # Stopmotion
//!
//! Rewrites G-code for stop-motion capture: every linear move that runs
//! entirely below the surface plane is split into short steps, and before each
//! step the tool retracts, visits a home point, dwells and comes back.
//!
//! ## Architecture
//!
//! Stopmotion is organized as a workspace with multiple crates:
//!
//! 1. **stopmotion-core** - Points, subdivision, error types
//! 2. **stopmotion-processor** - Line classification, pause loops, renumbering
//! 3. **stopmotion-settings** - Config files and validation
//! 4. **stopmotion** - Stream driver and command line binary

use anyhow::Context as _;
use std::io::{self, BufRead, Write};
use stopmotion_processor::is_numbered;
use tracing::{info, warn};

pub use stopmotion_core::{GcodeError, Point};
pub use stopmotion_processor::{LineProcessor, ProcessorConfig, ProcessorStats};
pub use stopmotion_settings::{Config, ErrorPolicy, OutputSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, since stdout carries the rewritten G-code
/// - RUST_LOG environment variable support
/// - Base level raised by each `-v` (warn, info, debug, trace)
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Totals for one [`convert`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Lines read from the source
    pub lines_read: u64,
    /// Lines written to the sink
    pub lines_written: u64,
    /// Lines that failed and were skipped
    pub lines_failed: u64,
    /// The sink closed before the source was exhausted
    pub sink_closed: bool,
}

/// Run every line of `reader` through `processor` and write the results.
///
/// `source` names the input in error messages. Output lines are written as
/// they are produced. Unnumbered lines that are not valid UTF-8 are copied
/// through untouched; a numbered one is a failed line under `policy`. A
/// closed sink (broken pipe) ends the run without error and sets
/// [`ConvertStats::sink_closed`].
pub fn convert<R, W>(
    processor: &mut LineProcessor,
    source: &str,
    mut reader: R,
    writer: &mut W,
    policy: ErrorPolicy,
) -> anyhow::Result<ConvertStats>
where
    R: BufRead,
    W: Write,
{
    let mut stats = ConvertStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let line_number = stats.lines_read + 1;
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("{}:{}: failed to read line", source, line_number))?;
        if read == 0 {
            break;
        }
        stats.lines_read += 1;

        let bytes = trim_line_ending(&buf);
        let mut write_error = None;
        let mut written = 0u64;
        let result = match std::str::from_utf8(bytes) {
            Ok(line) => processor
                .process(line, |out| {
                    if write_error.is_none() {
                        match write_line(&mut *writer, out.as_bytes()) {
                            Ok(()) => written += 1,
                            Err(e) => write_error = Some(e),
                        }
                    }
                })
                .map_err(anyhow::Error::from),
            Err(err) => {
                let valid = std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default();
                if is_numbered(valid) {
                    Err(anyhow::Error::new(err).context("numbered line is not valid UTF-8"))
                } else {
                    match write_line(writer, bytes) {
                        Ok(()) => written += 1,
                        Err(e) => write_error = Some(e),
                    }
                    Ok(())
                }
            }
        };
        stats.lines_written += written;

        if let Err(err) = result {
            match policy {
                ErrorPolicy::Abort => {
                    return Err(err).with_context(|| {
                        format!(
                            "{}:{}: failed to process '{}'",
                            source,
                            line_number,
                            String::from_utf8_lossy(bytes)
                        )
                    });
                }
                ErrorPolicy::Skip => {
                    warn!(source, line = line_number, error = %err, "skipping line");
                    stats.lines_failed += 1;
                }
            }
        }

        match write_error {
            None => {}
            Some(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                stats.sink_closed = true;
                return Ok(stats);
            }
            Some(e) => return Err(e).context("failed to write output"),
        }
    }

    match writer.flush() {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => stats.sink_closed = true,
        other => other.context("failed to flush output")?,
    }

    info!(
        source,
        read = stats.lines_read,
        written = stats.lines_written,
        failed = stats.lines_failed,
        "finished input"
    );
    Ok(stats)
}

/// Strip `\n` or `\r\n`; a lone trailing `\r` is kept
fn trim_line_ending(line: &[u8]) -> &[u8] {
    match line.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => line,
    }
}

fn write_line<W: Write>(writer: &mut W, line: &[u8]) -> io::Result<()> {
    writer.write_all(line)?;
    writer.write_all(b"\n")
}
