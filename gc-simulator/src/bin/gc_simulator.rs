//! 分代 GC 模拟器命令行

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use tracing::Level;

use gc_simulator::{
    EventSink, JsonLinesSink, Simulation, SimulationConfig, SimulationReport, TracingSink,
};

fn cli() -> Command {
    Command::new("gc_simulator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Simulated generational garbage collector")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("objects")
                .long("objects")
                .short('n')
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .help("Number of objects to create"),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .short('i')
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .help("Run a collection cycle every COUNT creations"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .short('s')
                .value_name("SEED")
                .value_parser(value_parser!(u64))
                .help("Seed for a reproducible run"),
        )
        .arg(
            Arg::new("test-mode")
                .long("test-mode")
                .short('t')
                .action(ArgAction::SetTrue)
                .help("Skip compaction sleeps and allow a fixed fragmentation level"),
        )
        .arg(
            Arg::new("mock-fragmentation")
                .long("mock-fragmentation")
                .value_name("LEVEL")
                .value_parser(value_parser!(f64))
                .requires("test-mode")
                .help("Fragmentation level reported by every cycle (test mode only)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the final report as JSON"),
        )
        .arg(
            Arg::new("events")
                .long("events")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Write the event log as JSON lines ('-' for stdout, moves the report to stderr)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Log every simulation event"),
        )
}

/// 命令行参数覆盖配置文件
fn load_config(matches: &ArgMatches) -> anyhow::Result<SimulationConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(objects) = matches.get_one::<usize>("objects") {
        config.total_objects = *objects;
    }
    if let Some(interval) = matches.get_one::<usize>("interval") {
        config.cycle_interval = *interval;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    if matches.get_flag("test-mode") {
        config.test_mode = true;
    }
    if let Some(level) = matches.get_one::<f64>("mock-fragmentation") {
        config.mock_fragmentation = Some(*level);
    }

    config.validate()?;
    Ok(config)
}

fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// 事件日志占用 stdout 时，报告改写到 stderr
fn events_on_stdout(matches: &ArgMatches) -> bool {
    matches
        .get_one::<PathBuf>("events")
        .is_some_and(|path| is_stdout(path))
}

fn event_writer(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if is_stdout(path) {
        return Ok(Box::new(io::stdout()));
    }
    let file =
        File::create(path).with_context(|| format!("creating event log {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn write_report(out: &mut dyn Write, report: &SimulationReport) -> io::Result<()> {
    writeln!(out, "=== Simulation Report ===")?;
    writeln!(out, "Objects created:     {}", report.total_created)?;
    writeln!(out, "Collection cycles:   {}", report.cycles)?;
    writeln!(out, "Objects collected:   {}", report.total_collected)?;
    writeln!(out, "Promotions:          {}", report.total_promoted)?;
    writeln!(
        out,
        "Survivors:           young={} middle={} old={}",
        report.young_count, report.middle_count, report.old_count
    )?;
    writeln!(
        out,
        "Leaked objects:      {} ({} no longer in any generation)",
        report.leak_count,
        report.detached_leaks.len()
    )?;
    writeln!(
        out,
        "Avg fragmentation:   {:.2}%",
        report.avg_fragmentation * 100.0
    )?;
    writeln!(
        out,
        "Compactions:         {} ({} ms simulated)",
        report.compactions, report.total_compaction_ms
    )?;
    writeln!(out, "Survival threshold:  {}", report.survival_threshold)
}

fn emit_report(
    out: &mut dyn Write,
    report: &SimulationReport,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        write_report(out, report)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = load_config(&matches)?;
    let sink: Box<dyn EventSink> = match matches.get_one::<PathBuf>("events") {
        Some(path) => Box::new((TracingSink, JsonLinesSink::new(event_writer(path)?))),
        None => Box::new(TracingSink),
    };

    let mut sim = Simulation::new(config)?.with_sink(sink);
    let report = sim.run();
    sim.flush_events().context("flushing event log")?;

    let json = matches.get_flag("json");
    if events_on_stdout(&matches) {
        emit_report(&mut io::stderr().lock(), &report, json)
    } else {
        emit_report(&mut io::stdout().lock(), &report, json)
    }
}
