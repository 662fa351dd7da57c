use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use obsigo::Config;
use std::fs;
use std::path::PathBuf;

/// Command line interface for obsigo.
#[derive(Debug, Parser)]
#[command(name = "obsigo", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "obsigo.toml")]
    config: PathBuf,

    #[command(subcommand)]
    action: Action,
}

/// Available actions, dispatched one per invocation.
#[derive(Debug, Subcommand)]
enum Action {
    /// Scaffold the Hugo site if it does not exist yet
    Init,
    /// Convert the vault and build the site
    Build,
    /// Convert, watch the vault for changes, and run the Hugo dev server
    Serve,
    /// Convert, build, and deploy to Netlify
    Netlify,
    /// Convert, build, and deploy to Vercel
    Vercel,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    config.validate().context("invalid configuration")?;
    log::debug!("configuration: {:?}", config);

    match cli.action {
        Action::Init => init(&config),
        Action::Build => build(&config),
        Action::Serve => serve(&config),
        Action::Netlify => netlify(&config),
        Action::Vercel => vercel(&config),
    }
}

/// Scaffolds the Hugo site directory unless one already exists.
fn init(config: &Config) -> Result<()> {
    if config.hugo.join("hugo.toml").exists() {
        log::info!("hugo site already initialized: {}", config.hugo.display());
        return Ok(());
    }

    fs::create_dir_all(&config.hugo)
        .with_context(|| format!("failed to create site directory: {}", config.hugo.display()))?;

    obsigo::run("hugo", &["new", "site", "."], &config.hugo)
}

/// Converts the vault and builds the site.
fn build(config: &Config) -> Result<()> {
    obsigo::convert_all(config).context("conversion failed")?;
    obsigo::run("hugo", &[], &config.hugo)
}

/// Converts, then serves with live re-conversion until hugo exits.
fn serve(config: &Config) -> Result<()> {
    obsigo::convert_all(config).context("conversion failed")?;

    // Watcher lives as long as the dev server runs
    let _watcher = obsigo::VaultWatcher::spawn(config.clone())?;

    obsigo::run("hugo", &["server"], &config.hugo)
}

/// Converts, builds, and deploys to Netlify.
fn netlify(config: &Config) -> Result<()> {
    obsigo::convert_all(config).context("conversion failed")?;
    obsigo::run("hugo", &[], &config.hugo)?;

    let netlify = config
        .netlify
        .as_ref()
        .context("netlify section missing from configuration")?;

    let public = config.public.to_str().context("public path is not UTF8")?;
    obsigo::run(
        "netlify",
        &[
            "deploy",
            "--prod",
            "--site",
            &netlify.site,
            "--auth",
            netlify.token.reveal(),
            "--dir",
            public,
        ],
        &config.hugo,
    )
}

/// Converts, builds, and deploys to Vercel.
fn vercel(config: &Config) -> Result<()> {
    obsigo::convert_all(config).context("conversion failed")?;
    obsigo::run("hugo", &[], &config.hugo)?;

    let vercel = config
        .vercel
        .as_ref()
        .context("vercel section missing from configuration")?;

    obsigo::write_vercel_project(config, vercel)?;

    let public = config.public.to_str().context("public path is not UTF8")?;
    obsigo::run(
        "vercel",
        &["--prod", "--token", vercel.token.reveal(), "--cwd", public],
        &config.hugo,
    )
}
