use anyhow::{bail, Context};
use clap::Parser;
use randexp::{Range, RandExp, RangeSet};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "randexp")]
#[command(about = "Print random strings that match a regular expression")]
struct Cli {
    /// The regular expression to generate from
    pattern: String,

    /// Randomly flip the case of ASCII letters
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Reuse one seed for the whole process
    #[arg(short = 'f', long)]
    fixed_seed: bool,

    /// Number of strings to print
    #[arg(short = 'n', long, default_value = "1")]
    count: usize,

    /// Extra repetitions allowed for `*`, `+` and `{n,}`
    #[arg(long, default_value = "10")]
    max_repetition: u32,

    /// Codepoints classes may produce, as `LOW-HIGH` or a single number (repeatable)
    #[arg(long = "range", value_parser = parse_range)]
    ranges: Vec<Range>,
}

// Accepts `32-126` or `65`.
fn parse_range(s: &str) -> anyhow::Result<Range> {
    let (low, high) = s.split_once('-').unwrap_or((s, s));
    let low: u32 = low.trim().parse().with_context(|| format!("invalid range start in {s:?}"))?;
    let high: u32 = high.trim().parse().with_context(|| format!("invalid range end in {s:?}"))?;
    if low > high {
        bail!("range {s:?} ends before it starts");
    }
    Ok(Range::new(low, high))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "randexp=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut re = RandExp::new(&cli.pattern)?;
    re.config.ignore_case = cli.ignore_case;
    re.config.fixed_seed = cli.fixed_seed;
    re.config.max_repetition = cli.max_repetition;
    if !cli.ranges.is_empty() {
        let mut char_range = RangeSet::new();
        for range in cli.ranges {
            char_range.add(range);
        }
        re.config.char_range = char_range;
    }

    for _ in 0..cli.count {
        println!("{}", re.generate()?);
    }
    Ok(())
}
