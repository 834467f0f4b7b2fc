mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use fragpack_core::SolverConfig;
use fragpack_highs::HighsSolver;
use fragpack_packing::report::{packed_rows, write_csv_file};
use fragpack_packing::{
    DEFAULT_TOLERANCE, FragmentPacker, Item, PackingOptions, PackingParams, Summary, verify,
};
use std::fs;
use std::path::PathBuf;

const DEFAULT_OUTPUT: &str = "data/min_fibp_packed_items.csv";
const VERIFY_TOLERANCE: f64 = 1e-6;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Minimum-fragmentation bin packing with HiGHS"
)]
struct Cli {
    /// Log filter (overrides FRAGPACK_TRACE), for example `debug` or `fragpack_packing=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a packing instance, print the summary and write the packed items CSV
    Solve(SolveArgs),
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// JSON parameter file with bin_count, bin_capacity and items
    #[arg(long)]
    params: Option<PathBuf>,

    /// Override the number of bins
    #[arg(long)]
    bin_count: Option<i64>,

    /// Override the capacity of every bin
    #[arg(long)]
    bin_capacity: Option<f64>,

    /// Item as ID=SIZE; repeat to give the full item list
    #[arg(long = "item", value_name = "ID=SIZE", value_parser = parse_item)]
    items: Vec<Item>,

    /// Packed items CSV path
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Skip writing the CSV
    #[arg(long)]
    no_csv: bool,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Solver time limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Relative MIP gap at which the solver stops
    #[arg(long)]
    mip_gap: Option<f64>,

    /// Solver thread count
    #[arg(long)]
    threads: Option<u32>,

    /// Solver random seed
    #[arg(long)]
    seed: Option<u32>,

    /// Turn off the solver's presolve
    #[arg(long)]
    no_presolve: bool,

    /// Amounts at or below this are treated as empty
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Skip the aggregate capacity pre-check
    #[arg(long)]
    no_precheck: bool,

    /// Check the packing invariants of an optimal result after printing it
    #[arg(long)]
    verify: bool,

    /// Let HiGHS print its own log to the console
    #[arg(long)]
    solver_log: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref())?;
    match cli.command {
        Command::Solve(args) => solve_command(args),
    }
}

fn solve_command(args: SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params = resolve_params(&args)?;
    let instance = params.to_instance()?;

    let mut packer = FragmentPacker::new(HighsSolver::new()).with_options(packing_options(&args));
    let outcome = packer.solve(&instance)?;

    let summary = Summary::from_outcome(&outcome);
    match args.format {
        OutputFormat::Table => print!("{}", render_table(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    // Only an optimal run carries a complete assignment to check.
    if args.verify && outcome.is_optimal() {
        verify(&outcome, &instance, VERIFY_TOLERANCE)?;
    }

    if !args.no_csv {
        write_csv_file(&args.output, &outcome.assignment).map_err(|err| {
            format!("failed to write {}: {err}", args.output.display())
        })?;
        tracing::debug!(
            component = "cli",
            operation = "write_csv",
            status = "success",
            path = %args.output.display(),
            rows = outcome.assignment.fragment_count() as u64,
            "Wrote packed items"
        );
        if args.format == OutputFormat::Table {
            println!("artifact: {}", args.output.display());
        }
    }

    Ok(())
}

/// Parameters from `--params` (or the reference set) with flag overrides.
fn resolve_params(args: &SolveArgs) -> Result<PackingParams, Box<dyn std::error::Error>> {
    let mut params = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
            PackingParams::from_json_str(&text)?
        }
        None => PackingParams::reference(),
    };
    if let Some(bin_count) = args.bin_count {
        params.bin_count = bin_count;
    }
    if let Some(bin_capacity) = args.bin_capacity {
        params.bin_capacity = bin_capacity;
    }
    if !args.items.is_empty() {
        params.items = args.items.clone();
    }
    Ok(params)
}

fn packing_options(args: &SolveArgs) -> PackingOptions {
    let mut config = SolverConfig::new();
    if let Some(limit) = args.time_limit {
        config = config.with_time_limit(limit);
    }
    if let Some(gap) = args.mip_gap {
        config = config.with_mip_gap(gap);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if let Some(seed) = args.seed {
        config = config.with_random_seed(seed);
    }
    if args.no_presolve {
        config = config.with_presolve(false);
    }
    if args.solver_log {
        config = config.with_log_to_console(true);
    }

    PackingOptions::new()
        .with_tolerance(args.tolerance)
        .with_precheck(!args.no_precheck)
        .with_solver_config(config)
}

fn parse_item(value: &str) -> Result<Item, String> {
    let (id, size) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected ID=SIZE, got '{value}'"))?;
    let size: f64 = size
        .trim()
        .parse()
        .map_err(|err| format!("invalid size '{size}' for item '{id}': {err}"))?;
    Ok(Item::new(id.trim(), size))
}

fn render_table(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!("status: {}\n", summary.status));
    out.push_str(&format!(
        "number_of_fragments: {}\n",
        summary
            .number_of_fragments
            .map_or_else(|| "-".to_string(), |value| format!("{value}"))
    ));
    out.push_str(&format!(
        "{:>5} {:<16} {:>12}\n",
        "bin", "item", "packed_size"
    ));
    for row in packed_rows(&summary.packed_items) {
        out.push_str(&format!(
            "{:>5} {:<16} {:>12}\n",
            row.bin, row.item, row.packed_size
        ));
    }
    out
}
