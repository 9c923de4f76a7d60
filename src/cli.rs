//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{BatchConfig, ConfigError};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "powertrain-batch",
    version,
    about = "Enumerate hybrid powertrain configurations and submit them for batch simulation"
)]
pub struct CliOptions {
    /// Load configuration from a TOML file.
    #[arg(long, env = "POWERTRAIN_BATCH_CONFIG", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Use a built-in preset (baseline, three_bay).
    #[arg(long)]
    pub preset: Option<String>,

    /// Engine and battery catalog CSV.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Duty-cycle profile.
    #[arg(long)]
    pub duty_cycle: Option<PathBuf>,

    /// Override the number of generator bays.
    #[arg(long)]
    pub bays: Option<usize>,

    /// Simulation service root URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model source file to upload before dispatch.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Write the batch plan to a CSV file.
    #[arg(long)]
    pub plan_out: Option<PathBuf>,

    /// Build the plan but send nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the model upload even when a model file is configured.
    #[arg(long)]
    pub skip_upload: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliOptions {
    /// Resolves the configuration: `--config`, then `--preset`, then the
    /// baseline; command-line overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file or preset cannot be loaded.
    pub fn load_config(&self) -> Result<BatchConfig, ConfigError> {
        let mut cfg = if let Some(path) = &self.config {
            BatchConfig::from_toml_file(path)?
        } else if let Some(name) = &self.preset {
            BatchConfig::from_preset(name)?
        } else {
            BatchConfig::baseline()
        };
        self.apply(&mut cfg);
        Ok(cfg)
    }

    fn apply(&self, cfg: &mut BatchConfig) {
        if let Some(path) = &self.catalog {
            cfg.inputs.catalog = Some(path.clone());
        }
        if let Some(path) = &self.duty_cycle {
            cfg.inputs.duty_cycle = Some(path.clone());
        }
        if let Some(bays) = self.bays {
            cfg.enumeration.bay_count = bays;
        }
        if let Some(url) = &self.base_url {
            cfg.dispatch.base_url = url.clone();
        }
        if let Some(path) = &self.model {
            cfg.model.path = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions, clap::Error> {
        CliOptions::try_parse_from(std::iter::once("powertrain-batch").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_baseline() {
        let opts = parse(&[]).expect("parse should succeed");
        let cfg = opts.load_config().expect("baseline loads");
        assert_eq!(cfg.enumeration.bay_count, 2);
        assert!(!opts.dry_run);
    }

    #[test]
    fn preset_and_overrides() {
        let opts = parse(&[
            "--preset",
            "three_bay",
            "--catalog",
            "catalog.csv",
            "--bays",
            "4",
            "-vv",
        ])
        .expect("parse should succeed");
        let cfg = opts.load_config().expect("preset loads");
        assert_eq!(cfg.enumeration.bay_count, 4);
        assert_eq!(cfg.enumeration.battery_counts, [0, 1, 5]);
        assert_eq!(
            cfg.inputs.catalog.as_deref().and_then(|p| p.to_str()),
            Some("catalog.csv")
        );
        assert_eq!(opts.verbose, 2);
    }

    #[test]
    fn config_and_preset_conflict() {
        assert!(parse(&["--config", "a.toml", "--preset", "baseline"]).is_err());
    }

    #[test]
    fn unknown_preset_fails_to_load() {
        let opts = parse(&["--preset", "bogus"]).expect("parse should succeed");
        assert!(opts.load_config().is_err());
    }
}
