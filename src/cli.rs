use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::InstallConfig;

#[derive(Parser, Debug)]
#[command(name = "notifyd-install")]
#[command(version, about = "Install the headsetcontrol-notifyd user service")]
pub struct Args {
    /// Path to installer configuration (TOML)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Sub‑commands (install if omitted)
    #[command(subcommand)]
    pub sub: Option<Cmd>,
}

/// Overrides shared by every sub-command that touches the unit.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Target {
    /// Unit template to render
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Directory the unit is installed into
    #[arg(long)]
    pub unit_dir: Option<PathBuf>,

    /// Unit file name
    #[arg(long)]
    pub unit_name: Option<String>,

    /// Install for this login instead of the invoking user
    #[arg(long)]
    pub user: Option<String>,

    /// Never fall back to sudo for the unit directory
    #[arg(long)]
    pub no_sudo: bool,
}

impl Target {
    /// Apply command-line overrides on top of file/default configuration.
    pub fn apply(&self, cfg: &mut InstallConfig) {
        if let Some(t) = &self.template {
            cfg.template = t.clone();
        }
        if let Some(d) = &self.unit_dir {
            cfg.unit_dir = d.clone();
        }
        if let Some(n) = &self.unit_name {
            cfg.unit_name = n.clone();
        }
        if self.no_sudo {
            cfg.use_sudo = false;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Render the template, copy it into place, reload and enable --now (default)
    Install {
        #[command(flatten)]
        target: Target,

        /// Render into a scratch file and leave the template untouched
        #[arg(long)]
        keep_template: bool,

        /// Enable the unit without starting it
        #[arg(long)]
        no_start: bool,

        /// Print the rendered unit and exit without changing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Stop, disable and remove the unit
    Uninstall {
        #[command(flatten)]
        target: Target,
    },
    /// Report whether the unit is active (Exit 0 = active)
    Status {
        #[command(flatten)]
        target: Target,
    },
    /// Write the bundled unit template
    Template {
        /// Destination (defaults to the configured template path)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cmd {
    /// What runs when no sub-command is given
    pub fn default_install() -> Self {
        Cmd::Install {
            target: Target::default(),
            keep_template: false,
            no_start: false,
            dry_run: false,
        }
    }
}
