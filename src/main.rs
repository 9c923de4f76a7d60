//! powertrain-batch entry point: config → pipeline → export → dispatch.

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{info, warn};

use powertrain_batch::cli::CliOptions;
use powertrain_batch::config::BatchConfig;
use powertrain_batch::duty_cycle::DutyCycleSummary;
use powertrain_batch::logging;
use powertrain_batch::pipeline::BatchPlan;
use powertrain_batch::runner::{BatchInputs, build_plan, write_plan_file};

fn main() -> anyhow::Result<()> {
    let cli = CliOptions::parse();
    logging::init(cli.verbose);

    let cfg = cli.load_config()?;
    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("{} configuration error(s)", errors.len());
    }

    let inputs = BatchInputs::load(&cfg)?;
    let plan = build_plan(&cfg, &inputs)?;
    print_summary(&plan);

    if let Some(path) = &cli.plan_out {
        write_plan_file(&plan, path)
            .with_context(|| format!("failed to write plan to {}", path.display()))?;
        eprintln!("Plan written to {}", path.display());
    }

    if cli.dry_run {
        info!("dry run, nothing sent");
        return Ok(());
    }
    if plan.sets.is_empty() {
        warn!("no configuration survived filtering, nothing to send");
        return Ok(());
    }

    send(&cfg, &cli, &plan, &inputs.duty)
}

fn print_summary(plan: &BatchPlan<'_>) {
    let s = plan.stats;
    println!(
        "{} enumerated, {} within budget, {} power capable",
        s.enumerated, s.within_budget, s.power_capable
    );
    for set in &plan.sets {
        let budget = if set.source.within_budget {
            "ok"
        } else {
            "over budget"
        };
        println!("{}  [{budget}]", set.config().describe());
    }
}

#[cfg(feature = "dispatch")]
fn send(
    cfg: &BatchConfig,
    cli: &CliOptions,
    plan: &BatchPlan<'_>,
    duty: &DutyCycleSummary,
) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    let reply = rt.block_on(powertrain_batch::runner::send_plan(
        cfg,
        plan,
        duty,
        cli.skip_upload,
    ))?;
    println!("{reply}");
    Ok(())
}

#[cfg(not(feature = "dispatch"))]
fn send(
    _cfg: &BatchConfig,
    _cli: &CliOptions,
    _plan: &BatchPlan<'_>,
    _duty: &DutyCycleSummary,
) -> anyhow::Result<()> {
    bail!("built without the `dispatch` feature; rerun with --dry-run")
}
