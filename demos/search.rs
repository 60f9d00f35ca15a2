use clap::{Parser, ValueEnum};
use log::info;
use treenum::sampler::{SamplerConfig, ShapeDistribution};
use treenum::{Enumerator, PrimitiveSet};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Exhaustive,
    Random,
    Uniform,
}

/// Enumerate or sample equations for a small symbolic regression problem.
#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Search mode
    #[arg(long, value_enum, default_value = "random")]
    mode: Mode,

    /// Number of shapes to search over
    #[arg(short, default_value_t = 1000)]
    n: u64,

    /// Number of equations to print
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// One seed per sample (comma-separated); overrides --seed and --count
    #[arg(long, value_delimiter = ',')]
    seeds: Vec<u64>,

    /// Operators as `name/arity`
    #[arg(long = "op", default_values_t = ["add/2".to_string(), "mul/2".to_string(), "sin/1".to_string()])]
    ops: Vec<String>,

    /// Variables
    #[arg(long = "var", default_values_t = ["x".to_string(), "y".to_string()])]
    vars: Vec<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    info!("args = {:?}", args);

    let mut pset = PrimitiveSet::new();
    for op in &args.ops {
        let (name, arity) = op
            .rsplit_once('/')
            .ok_or_else(|| color_eyre::eyre::eyre!("operator '{}' is not of the form name/arity", op))?;
        pset.add_operator(name, arity.parse()?)?;
    }
    for var in &args.vars {
        pset.add_variable(var.as_str());
    }

    let en = Enumerator::new(pset);
    info!("Q({}) = {}", args.n, en.count_q_prefix(args.n)?);

    let formulas = match args.mode {
        Mode::Exhaustive => en.exhaustive_search(args.n, args.count)?,
        Mode::Random | Mode::Uniform => {
            let distribution = match args.mode {
                Mode::Uniform => ShapeDistribution::UniformShape,
                _ => ShapeDistribution::Weighted,
            };
            let mut config = SamplerConfig::new().with_distribution(distribution);
            if let Some(seed) = args.seed {
                config = config.with_seed(seed);
            }
            let mut count = args.count;
            if !args.seeds.is_empty() {
                count = args.seeds.len();
                config = config.with_seeds(args.seeds.clone());
            }
            en.random_search(args.n, count, &config)?
        }
    };

    for formula in formulas {
        println!("{}", formula);
    }

    let stats = en.cache_stats();
    info!("a_i cache: {}", stats.leaves);
    info!("l_i_b cache: {}", stats.slots);

    Ok(())
}
