use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spdlog::{info, warn};

use folio::build::bundler::Bundler;
use folio::build::plugins::BuildPaths;
use folio::environment::BuildEnv;
use folio::logger::configure_logger;
use folio::server::server_run;

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "folio.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    /// development, production or test. Defaults to $FOLIO_ENV, then production
    #[arg(short, long)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mounts the site and serves it
    Serve,
    /// Bundles the client sources into the public directory
    Build,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = args.env.as_deref().map(BuildEnv::parse).unwrap_or_else(BuildEnv::from_env);

    let config = match open_config(args.config_path.map(PathBuf::from)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run folio --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(config.log.as_ref()) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    match args.command {
        Command::Serve => {
            info!("Starting Folio in {} mode =-=-=-=-=-=-=-=-=-=-", env);
            info!("Listening on {}:{}", config.server.address, config.server.port);
            server_run(config, env).await?;
        }
        Command::Build => {
            let report = Bundler::new(env, BuildPaths::from_config(&config.paths)).run()?;
            if report.skipped {
                info!("Nothing built");
            } else {
                info!("Built {} files", report.written.len());
            }
        }
    }

    Ok(())
}
