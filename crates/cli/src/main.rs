use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

use descent::api::{multiplicity, multiplicity_with, Job};
use descent::prelude::{BigInt, CanonicalFormOracle, RefinementOracle};
use descent::{special, DescentCfg, FaceMode};

mod report;
mod sidecar;

use report::{ConeInput, Report};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Exact multiplicities of rational cones by face-lattice descent")]
struct Cmd {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    action: Action,
}

#[derive(Args, Clone, Debug, Default)]
struct EngineArgs {
    /// Use automorphisms (orbit seeding, isomorphism merging)
    #[arg(long, global = true)]
    exploit_automs: bool,
    /// Merge faces only on full canonical-form equality
    #[arg(long, global = true)]
    strict: bool,
    /// Use BigInt arithmetic from the start
    #[arg(long, global = true)]
    bigint: bool,
    /// Worker threads (default: rayon's choice)
    #[arg(long, global = true)]
    threads: Option<usize>,
    /// Force the face representation
    #[arg(long, value_enum, global = true)]
    mode: Option<ModeArg>,
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Also write the report to this file, with a run sidecar next to it
    #[arg(long, global = true)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Facet,
    Generator,
}

#[derive(Subcommand)]
enum Action {
    /// Cone from a JSON file `{generators, support_hyperplanes, grading}`
    Run {
        #[arg(long)]
        input: PathBuf,
    },
    /// Built-in family: simplex, cube or cross
    Family {
        #[arg(long)]
        name: String,
        #[arg(long)]
        dim: usize,
    },
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.engine.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let (input, label) = match &cmd.action {
        Action::Run { input } => (ConeInput::read(input)?, input.display().to_string()),
        Action::Family { name, dim } => {
            let Some(p) = special::family(name, *dim) else {
                bail!("unknown family {name:?} (expected simplex, cube or cross)");
            };
            (ConeInput::from(p), format!("{name}:{dim}"))
        }
    };
    let report = execute(&input, &cmd.engine)?;
    let text = serde_json::to_string_pretty(&report)?;
    println!("{text}");
    if let Some(out) = &cmd.engine.out {
        std::fs::write(out, &text).with_context(|| format!("writing {}", out.display()))?;
        sidecar::write_sidecar(out, &label, &cmd.engine)?;
    }
    Ok(())
}

fn cfg_from(args: &EngineArgs) -> DescentCfg {
    DescentCfg {
        exploit_automorphisms: args.exploit_automs,
        strict_type_check: args.strict,
        face_mode: args.mode.map(|m| match m {
            ModeArg::Facet => FaceMode::Facet,
            ModeArg::Generator => FaceMode::Generator,
        }),
        verbose: args.verbose,
        ..DescentCfg::default()
    }
}

fn execute(input: &ConeInput, args: &EngineArgs) -> Result<Report> {
    let job = Job {
        gens: &input.generators,
        supp_hyps: &input.support_hyperplanes,
        grading: &input.grading,
        cfg: cfg_from(args),
        oracle: args
            .exploit_automs
            .then(|| Arc::new(RefinementOracle) as Arc<dyn CanonicalFormOracle>),
    };
    let compute = || {
        if args.bigint {
            multiplicity_with::<BigInt>(&job)
        } else {
            multiplicity(&job)
        }
    };
    let started = std::time::Instant::now();
    let result = match args.threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("building thread pool")?
            .install(compute),
        None => compute(),
    }
    .context("computing multiplicity")?;
    tracing::info!(
        multiplicity = %result.multiplicity,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "done"
    );
    Ok(Report::new(&result, input.expected.as_ref()))
}
