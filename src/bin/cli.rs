//! Binary entry point for the dsgraph CLI.
#![forbid(unsafe_code)]

#[path = "cli/config.rs"]
mod config;
#[path = "cli/ui.rs"]
mod ui;

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use dsgraph::{
    admin::{
        dump_file, efficiency, stats, summarize, verify, EfficiencyReport, StatsReport,
        SummaryReport, VerifyLevel, VerifyReport, VerifySeverity,
    },
    cli::{generate, CliError, GenerateConfig, GenerateSummary},
    storage::{BuildOptions, TraversalStrategy},
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use config::CliConfig;
use ui::{format_duration, Marker, Theme, Ui};

#[derive(Parser, Debug)]
#[command(
    name = "dsgraph",
    version,
    about = "Build and inspect direct subsumption graphs of kill-vectors",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "DSGRAPH_CONFIG",
        help = "CLI config file (defaults to <config dir>/dsgraph/config.toml)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = Theme::Auto,
        help = "Color theme for text output"
    )]
    theme: Theme,

    #[arg(long, short, global = true, help = "Plain output without spinners or decoration")]
    quiet: bool,

    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG applies otherwise"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GenerateCmd {
    #[arg(value_name = "INPUT", help = "Result file with one kill-vector line per unit")]
    input: PathBuf,

    #[arg(value_name = "OUTPUT", help = "Graph file to write (defaults to INPUT_graph.dat)")]
    output: Option<PathBuf>,

    #[arg(long, value_name = "N", help = "Identifier of the first test")]
    bias: Option<i64>,

    #[arg(long, value_name = "N", help = "Number of tests (bits per kill-vector)")]
    tests: Option<usize>,

    #[arg(long, value_enum, help = "Walk order used while linking clusters")]
    strategy: Option<StrategyArg>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Build a graph file from a kill-vector result file")]
    Generate(GenerateCmd),

    #[command(about = "Display counts and pair statistics of a graph file")]
    Stats {
        #[arg(value_name = "GRAPH")]
        graph: PathBuf,
    },

    #[command(about = "Check a graph file for structural and dominance errors")]
    Verify {
        #[arg(value_name = "GRAPH")]
        graph: PathBuf,

        #[arg(long, value_enum, default_value_t = VerifyLevelArg::Full)]
        level: VerifyLevelArg,
    },

    #[command(about = "Print a graph file as text (ignores --format)")]
    Dump {
        #[arg(value_name = "GRAPH")]
        graph: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum StrategyArg {
    BottomUp,
    TopDown,
    Unordered,
}

impl From<StrategyArg> for TraversalStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::BottomUp => TraversalStrategy::BottomUp,
            StrategyArg::TopDown => TraversalStrategy::TopDown,
            StrategyArg::Unordered => TraversalStrategy::Unordered,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum VerifyLevelArg {
    Fast,
    Full,
}

impl From<VerifyLevelArg> for VerifyLevel {
    fn from(level: VerifyLevelArg) -> Self {
        match level {
            VerifyLevelArg::Fast => VerifyLevel::Fast,
            VerifyLevelArg::Full => VerifyLevel::Full,
        }
    }
}

#[derive(Debug, Serialize)]
struct PhaseMillis {
    classify: f64,
    sort: f64,
    link: f64,
    close: f64,
    write: f64,
}

#[derive(Debug, Serialize)]
struct GenerateReport {
    input: String,
    output: String,
    strategy: String,
    bias: i64,
    tests: usize,
    lines: u64,
    skipped_lines: u64,
    timings_ms: PhaseMillis,
    summary: SummaryReport,
    efficiency: EfficiencyReport,
}

impl GenerateReport {
    fn new(cfg: &GenerateConfig, done: &GenerateSummary) -> Self {
        let outcome = &done.outcome;
        let timings = &outcome.timings;
        Self {
            input: cfg.input.display().to_string(),
            output: done.output.display().to_string(),
            strategy: cfg.options.strategy.to_string(),
            bias: cfg.options.bias,
            tests: cfg.options.test_count,
            lines: outcome.ingest.lines,
            skipped_lines: outcome.ingest.skipped,
            timings_ms: PhaseMillis {
                classify: millis(timings.classify),
                sort: millis(timings.sort),
                link: millis(timings.link),
                close: millis(timings.close),
                write: millis(done.write),
            },
            summary: summarize(&outcome.graph),
            efficiency: efficiency(&outcome.graph, Some(outcome.comparisons)),
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let ui = Ui::new(cli.theme, cli.quiet);

    match cli.command {
        Command::Generate(cmd) => {
            let config = CliConfig::load(cli.config)?;
            tracing::debug!(config = ?config.path(), "cli.config.loaded");
            let gen_cfg = build_generate_config(cmd, &config)?;
            let task = ui.task(format!("Building graph from {}", gen_cfg.input.display()));
            let done = generate(&gen_cfg)?;
            task.finish();
            let report = GenerateReport::new(&gen_cfg, &done);
            emit(&cli.format, &report, |_| print_generate_text(&ui, &report))?;
        }
        Command::Stats { graph } => {
            let report = stats(&graph)?;
            emit(&cli.format, &report, |_| print_stats_text(&ui, &report))?;
        }
        Command::Verify { graph, level } => {
            let report = verify(&graph, level.into())?;
            emit(&cli.format, &report, |_| print_verify_text(&ui, &report))?;
            if !report.success {
                std::process::exit(2);
            }
        }
        Command::Dump { graph } => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            dump_file(&graph, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn build_generate_config(cmd: GenerateCmd, config: &CliConfig) -> Result<GenerateConfig, CliError> {
    let defaults = config.generate();
    let tests = cmd.tests.or(defaults.tests).ok_or_else(|| {
        CliError::Message(
            "number of tests is required (pass --tests or set generate.tests in the config)".into(),
        )
    })?;
    let options = BuildOptions::new()
        .test_count(tests)
        .bias(cmd.bias.or(defaults.bias).unwrap_or(0))
        .strategy(
            cmd.strategy
                .map(TraversalStrategy::from)
                .or(defaults.strategy)
                .unwrap_or_default(),
        );
    options.validate()?;

    let mut gen_cfg = GenerateConfig::new(cmd.input);
    gen_cfg.output = cmd.output;
    if let Some(suffix) = &defaults.output_suffix {
        gen_cfg.output_suffix = suffix.clone();
    }
    gen_cfg.options = options;
    Ok(gen_cfg)
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: Fn(OutputFormat),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(OutputFormat::Text),
    }
    Ok(())
}

fn summary_rows(summary: &SummaryReport) -> Vec<(&'static str, u64)> {
    vec![
        ("units", summary.units),
        ("killed", summary.killed),
        ("clusters", summary.clusters),
        ("levels", summary.levels),
        ("direct edges", summary.edges),
        ("roots", summary.roots),
        ("leafs", summary.leafs),
    ]
}

fn efficiency_rows(report: &EfficiencyReport) -> Vec<(&'static str, String)> {
    vec![
        ("unit pairs", report.unit_pairs.to_string()),
        ("cluster pairs", report.cluster_pairs.to_string()),
        ("cross-level pairs", report.cross_level_pairs.to_string()),
        (
            "comparisons",
            report
                .comparisons
                .map_or_else(|| "n/a".to_string(), |c| c.to_string()),
        ),
        ("direct edges", report.edges.to_string()),
    ]
}

fn print_generate_text(ui: &Ui, report: &GenerateReport) {
    let ms = |value: f64| format_duration(Duration::from_secs_f64(value / 1_000.0));
    ui.section(
        "Phases",
        [
            ("classify", ms(report.timings_ms.classify)),
            ("sort", ms(report.timings_ms.sort)),
            ("link", ms(report.timings_ms.link)),
            ("close", ms(report.timings_ms.close)),
            ("write", ms(report.timings_ms.write)),
        ],
    );
    ui.section(
        "Input",
        [
            ("file", report.input.clone()),
            ("lines", report.lines.to_string()),
            ("skipped", report.skipped_lines.to_string()),
            ("tests", report.tests.to_string()),
            ("bias", report.bias.to_string()),
            ("strategy", report.strategy.clone()),
        ],
    );
    ui.section("Summary", summary_rows(&report.summary));
    ui.section("Efficiency", efficiency_rows(&report.efficiency));
    ui.success(&format!("Wrote graph to {}", report.output));
}

fn print_stats_text(ui: &Ui, report: &StatsReport) {
    ui.section(
        "File",
        [
            ("path", report.path.clone()),
            ("size", format!("{} bytes", report.size_bytes)),
        ],
    );
    ui.section("Summary", summary_rows(&report.summary));
    ui.section("Efficiency", efficiency_rows(&report.efficiency));
}

fn print_verify_text(ui: &Ui, report: &VerifyReport) {
    ui.section(
        "Verify",
        [
            ("level", format!("{:?}", report.level).to_lowercase()),
            ("vertices", report.counts.vertices.to_string()),
            ("edges", report.counts.edges.to_string()),
            ("units", report.counts.units.to_string()),
            ("levels", report.counts.levels.to_string()),
            ("dominance tests", report.counts.dominance_tests.to_string()),
        ],
    );
    ui.list(
        "Findings",
        report.findings.iter().map(|finding| {
            let marker = match finding.severity {
                VerifySeverity::Error => Marker::Error,
                VerifySeverity::Warning => Marker::Warning,
                VerifySeverity::Info => Marker::Plain,
            };
            (marker, finding.message.clone())
        }),
    );
    if report.success {
        ui.success("graph is consistent");
    } else {
        ui.failure("graph verification failed");
    }
}
