//! Subcommands and the options they share.

pub mod diff;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stubsync_core::{PartialConfig, SyncConfig};

/// Options common to every subcommand. Flags override values from `--config`.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// YAML config file; flags given on the command line take precedence.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Namespace prefixed to generated module paths [default: crate].
    #[arg(long)]
    pub base: Option<String>,

    /// Directory of the module declaring the server trait.
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Destination directory; repeat or comma-separate. The first is the primary.
    #[arg(long, value_name = "DIR", value_delimiter = ',')]
    pub dst: Vec<PathBuf>,

    /// OpenAPI document (YAML or JSON).
    #[arg(long, value_name = "FILE")]
    pub doc: Option<PathBuf>,

    /// Prefix of the aggregator type names.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Name of the server trait [default: StrictServerInterface].
    #[arg(long)]
    pub interface: Option<String>,

    /// Directory with .tera files replacing the built-in templates.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Verbose logging.
    #[arg(long)]
    pub debug: bool,
}

impl ConfigArgs {
    fn flags(&self) -> PartialConfig {
        PartialConfig {
            base: self.base.clone(),
            src: self.src.clone(),
            dst: self.dst.clone(),
            doc: self.doc.clone(),
            prefix: self.prefix.clone(),
            debug: self.debug.then_some(true),
            interface: self.interface.clone(),
            templates: self.templates.clone(),
            ..Default::default()
        }
    }

    /// Layer the flags over the config file (if any), resolve, and set up logging.
    pub fn load(&self) -> Result<SyncConfig> {
        let file = match &self.config {
            Some(path) => PartialConfig::load(path)
                .with_context(|| format!("could not load {}", path.display()))?,
            None => PartialConfig::default(),
        };
        let config = file.merge(self.flags()).resolve()?;
        init_logging(config.debug);
        Ok(config)
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.target(env_logger::Target::Stderr).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stubsync.yaml");
        std::fs::write(
            &path,
            "src: src/oapigen\ndst: [src/a, src/b]\ndoc: openapi.yaml\nprefix: file\n",
        )
        .unwrap();

        let args = ConfigArgs {
            config: Some(path),
            prefix: Some("flag".into()),
            debug: true,
            ..Default::default()
        };
        let config = args.load().expect("load");
        assert_eq!(config.prefix, "flag");
        assert_eq!(config.dst_dirs, vec![PathBuf::from("src/a"), PathBuf::from("src/b")]);
        assert!(config.debug);
    }

    #[test]
    fn unset_debug_flag_keeps_file_value() {
        let args = ConfigArgs::default();
        assert_eq!(args.flags().debug, None);
    }
}
