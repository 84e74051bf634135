use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use timescales::{HolidaySource, Instant, Period, ScaleConfig, SelectorKind, ZonedInstant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Print instants of a time scale", long_about = None)]
struct Args {
    /// JSON scale config (overrides the individual scale flags)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base unit: microseconds, milliseconds, seconds, minutes, hours, days, weeks, months, years
    #[arg(short, long, default_value = "days")]
    period: Period,

    /// Instant of position 0 (YYYY-MM-DD[THH:MM[:SS[.ffffff]]])
    #[arg(short, long, default_value = "1970-01-01")]
    anchor: String,

    /// Base units per step
    #[arg(short, long, default_value_t = 1)]
    frequency: i64,

    /// Zone name or +HHMM offset; switches to calendar arithmetic
    #[arg(short, long)]
    zone: Option<String>,

    /// Keep only weekdays or weekend days
    #[arg(long, value_parser = parse_selector)]
    selector: Option<SelectorKind>,

    /// File of YYYYMMDD holiday dates to skip
    #[arg(long)]
    holidays: Option<PathBuf>,

    /// Number of instants to print
    #[arg(short = 'n', long, default_value_t = 10)]
    count: usize,

    /// Start at the step containing this instant instead of the anchor
    #[arg(long)]
    from: Option<String>,

    /// Walk backwards in time
    #[arg(short, long)]
    reverse: bool,

    /// Print interval labels next to instants
    #[arg(short, long)]
    labels: bool,
}

fn parse_selector(s: &str) -> std::result::Result<SelectorKind, String> {
    match s {
        "weekdays" => Ok(SelectorKind::Weekdays),
        "weekend" | "weekend_days" | "weekend-days" => Ok(SelectorKind::WeekendDays),
        other => Err(format!("unknown selector: {}", other)),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ScaleConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScaleConfig {
            period: args.period,
            frequency: args.frequency,
            anchor: args.anchor.clone(),
            zone: args.zone.clone(),
            selector: args.selector,
            holidays: args
                .holidays
                .clone()
                .map(|path| HolidaySource::File { path }),
        },
    };

    let mut scale = config.build().context("Failed to build scale")?;
    if let Some(from) = &args.from {
        let start = match scale.current_zoned_instant().zone() {
            zone if zone.is_utc() => Instant::parse(from),
            zone => ZonedInstant::parse(from, zone.clone()).map(Instant::from),
        }
        .with_context(|| format!("Invalid --from instant '{}'", from))?;
        scale = scale
            .shifted_to(start)
            .context("Failed to move scale to --from")?;
    }
    info!("Printing {} instants of {}", args.count, scale.describe());

    let mut out = BufWriter::new(io::stdout());
    if args.reverse {
        let mut it = scale.rev_iter();
        for _ in 0..args.count {
            write_line(&mut out, it.current_zoned(), args.labels.then(|| it.label()))?;
            it.step_forward();
        }
    } else {
        let mut it = scale.iter();
        for _ in 0..args.count {
            write_line(&mut out, it.current_zoned(), args.labels.then(|| it.label()))?;
            it.step_forward();
        }
    }
    out.flush()?;
    Ok(())
}

fn write_line(
    out: &mut impl Write,
    at: ZonedInstant,
    label: Option<String>,
) -> Result<()> {
    match label {
        Some(label) => writeln!(out, "{}\t{}", at, label)?,
        None => writeln!(out, "{}", at)?,
    }
    Ok(())
}
