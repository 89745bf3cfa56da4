use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use log::error;

use notifyd_install::cli::{self, Cmd};
use notifyd_install::error::GENERIC_FAILURE;
use notifyd_install::install::{preview, write_default_template};
use notifyd_install::{Identity, InstallConfig, Installer, InstallerError};

fn main() {
    let args = cli::Args::parse();
    init_logging(args.verbose);

    match real_main(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e:#}");
            let code = e
                .downcast_ref::<InstallerError>()
                .map(InstallerError::exit_code)
                .unwrap_or(GENERIC_FAILURE);
            std::process::exit(code);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

/// Returns the process exit code on success.
fn real_main(args: cli::Args) -> Result<i32> {
    let mut cfg = InstallConfig::discover(args.config.as_deref())
        .context("Failed to load installer configuration")?;

    match args.sub.unwrap_or_else(Cmd::default_install) {
        Cmd::Install {
            target,
            keep_template,
            no_start,
            dry_run,
        } => {
            target.apply(&mut cfg);
            cfg.validate()?;
            if keep_template {
                cfg.render_in_place = false;
            }
            let identity = Identity::resolve(target.user.as_deref())?;

            if dry_run {
                let unit = preview(&cfg, &identity.login)?;
                std::io::stdout()
                    .write_all(&unit)
                    .context("Failed to write preview")?;
                return Ok(0);
            }

            let mut installer = Installer::with_systemctl(cfg, identity);
            if no_start {
                installer = installer.no_start();
            }
            let report = installer.install()?;
            println!(
                "{} installed for {} at {}",
                installer.config().unit_name,
                report.user,
                report.unit_path.display()
            );
            Ok(0)
        }
        Cmd::Uninstall { target } => {
            target.apply(&mut cfg);
            cfg.validate()?;
            let identity = Identity::resolve(target.user.as_deref())?;
            let installer = Installer::with_systemctl(cfg, identity);
            if !installer.uninstall()? {
                println!("{} was not installed", installer.config().unit_name);
            }
            Ok(0)
        }
        Cmd::Status { target } => {
            target.apply(&mut cfg);
            cfg.validate()?;
            let identity = Identity::resolve(target.user.as_deref())?;
            let installer = Installer::with_systemctl(cfg, identity);
            let status = installer.status()?;
            println!("{}: {}", installer.config().unit_name, status.state);
            Ok(status.code)
        }
        Cmd::Template { path, force } => {
            let path = path.unwrap_or(cfg.template);
            write_default_template(&path, force)?;
            println!("Wrote {}", path.display());
            Ok(0)
        }
    }
}
