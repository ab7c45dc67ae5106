use anyhow::{bail, Context as _};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use tracing::{debug, info};

use stopmotion::{convert, init_logging, Config, ErrorPolicy, LineProcessor, Point};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

/// Split below-surface G01 moves and insert a retract/home/dwell loop before each step
#[derive(Debug, Parser)]
#[command(name = "stopmotion", version, long_version = LONG_VERSION)]
struct Cli {
    /// Input G-code files, processed in order; reads stdin when empty or for `-`
    inputs: Vec<PathBuf>,

    /// Path to configuration file (.toml or .json)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// First line number to emit
    #[arg(long)]
    initial_line: Option<u64>,

    /// Increment between emitted line numbers
    #[arg(long)]
    line_step: Option<u64>,

    /// Maximum length of one step of a split move
    #[arg(long)]
    step_length: Option<f64>,

    /// Z to retract to before travelling home
    #[arg(long, allow_negative_numbers = true)]
    retract_height: Option<f64>,

    /// Z to plunge back to after returning
    #[arg(long, allow_negative_numbers = true)]
    engage_height: Option<f64>,

    /// Home point as X,Y,Z
    #[arg(long, value_parser = parse_home, allow_hyphen_values = true)]
    home: Option<Point>,

    /// Dwell duration for the G04 pause
    #[arg(long)]
    dwell: Option<u32>,

    /// What to do with a line that fails to process (abort or skip)
    #[arg(long)]
    on_error: Option<ErrorPolicy>,

    /// Write the effective configuration to PATH and exit
    #[arg(long, value_name = "PATH")]
    dump_config: Option<PathBuf>,

    /// Enable verbose logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_home(value: &str) -> Result<Point, String> {
    let coords = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate: {}", e))?;

    match coords.as_slice() {
        &[x, y, z] => Ok(Point::new(x, y, z)),
        _ => Err(format!("expected X,Y,Z, got {} value(s)", coords.len())),
    }
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        let processor = &mut config.processor;
        if let Some(v) = self.initial_line {
            processor.initial_line = v;
        }
        if let Some(v) = self.line_step {
            processor.line_step = v;
        }
        if let Some(v) = self.step_length {
            processor.step_length = v;
        }
        if let Some(v) = self.retract_height {
            processor.retract_height = v;
        }
        if let Some(v) = self.engage_height {
            processor.engage_height = v;
        }
        if let Some(v) = self.home {
            processor.home = v;
        }
        if let Some(v) = self.dwell {
            processor.dwell = v;
        }
        if let Some(v) = self.on_error {
            config.output.on_error = v;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    debug!(?config, "effective configuration");

    if let Some(path) = &cli.dump_config {
        config
            .save_to_file(path)
            .with_context(|| format!("writing config to {}", path.display()))?;
        info!(path = %path.display(), "configuration written");
        return Ok(());
    }

    let policy = config.output.on_error;
    let mut processor = LineProcessor::new(config.processor)?;

    let inputs = if cli.inputs.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        cli.inputs
    };

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let mut failed = 0;

    for input in &inputs {
        let stats = if input.as_os_str() == "-" {
            convert(&mut processor, "<stdin>", io::stdin().lock(), &mut writer, policy)?
        } else {
            let file = File::open(input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            let source = input.display().to_string();
            convert(&mut processor, &source, BufReader::new(file), &mut writer, policy)?
        };

        failed += stats.lines_failed;
        if stats.sink_closed {
            debug!("output closed, stopping");
            break;
        }
    }

    let totals = processor.stats();
    info!(
        lines_in = totals.lines_in,
        lines_out = totals.lines_out,
        moves_split = totals.moves_split,
        loops_inserted = totals.loops_inserted,
        "done"
    );

    if failed > 0 {
        bail!("{} line(s) could not be processed and were skipped", failed);
    }
    Ok(())
}
