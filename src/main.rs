use anyhow::Context as _;
use clap::Parser;
use favro::adapters::{ExternalCompiler, ParserAdapter, ReferenceParser};
use favro::config::GrammarConfig;
use favro::harness::Harness;
use favro::stream::{SchemaStream, DEFAULT_PREFIX};
use favro::Session;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate random Avro protocols and check that every parser accepts them.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Verbose output: print every generated protocol.
    #[arg(short, long)]
    verbose: bool,

    /// Number of schemas to create; -1 loops forever.
    #[arg(long, default_value_t = 1000, allow_negative_numbers = true)]
    count: i64,

    /// RNG seed. Defaults to the current time; the seed in use is logged.
    #[arg(long)]
    seed: Option<u64>,

    /// Generate small protocols with lowercase names.
    #[arg(long)]
    simplified: bool,

    /// Only generate primitives below this nesting depth.
    #[arg(long)]
    max_depth: Option<usize>,

    /// Define named types in the protocol's `types` list instead of inline.
    #[arg(long)]
    hoist_types: bool,

    /// Prefix of generated protocol names.
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Apache Avro Java build directory (containing `classes/` and `lib/`).
    #[arg(long, default_value = "../avro/build")]
    avro_build: PathBuf,

    /// Scratch directory for the external compiler.
    #[arg(long, default_value = "/tmp/favro")]
    scratch: PathBuf,

    /// Only run the in-process reference parser.
    #[arg(long)]
    no_external: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the UNIX epoch")?;
    let seed = args.seed.unwrap_or_else(|| now.as_nanos() as u64);
    log::info!("seed: {seed}");

    let grammar = if args.simplified {
        GrammarConfig::simplified()
    } else {
        GrammarConfig::full()
    }
    .max_depth(args.max_depth)
    .hoist_named_types(args.hoist_types);

    let mut adapters: Vec<Box<dyn ParserAdapter>> = Vec::new();
    if !args.no_external {
        let external = ExternalCompiler::avro_java(&args.avro_build, &args.scratch)
            .with_context(|| {
                format!(
                    "setting up the Avro Java compiler from {}",
                    args.avro_build.display()
                )
            })?;
        adapters.push(Box::new(external));
    }
    adapters.push(Box::new(ReferenceParser::new()));

    let mut harness = Harness::new();
    harness.verbose(args.verbose);

    let session = Session::new().seed(seed).grammar(grammar);
    let stream = SchemaStream::new(session, args.count.into())
        .prefix(args.prefix)
        .start_time(now.as_secs());

    let mut stdout = std::io::stdout().lock();
    harness
        .run_stream(stream, &mut adapters, &mut stdout)
        .context("differential run aborted")?;
    Ok(())
}
