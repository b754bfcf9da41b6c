use anyhow::Context;
use clap::{ArgAction, Parser};
use particle_playground::{
    Config,
    input::InputState,
    replay::{self, ReplaySummary, Script},
    session::{self, FileSessionStore, SessionStore},
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "particle-playground")]
#[command(version, about = "Replay pointer scripts against the particle sandbox")]
struct Cli {
    /// JSON event script to replay
    #[arg(long, short = 's', value_name = "FILE")]
    script: Option<PathBuf>,

    /// Start from a stored session
    #[arg(long, short = 'l', value_name = "NAME", conflicts_with = "import")]
    load: Option<String>,

    /// Start from an exported session file (.json or .json.gz)
    #[arg(long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Store the result under this name
    #[arg(long, value_name = "NAME")]
    save: Option<String>,

    /// Export the result to a file; a .gz extension compresses it
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// List stored sessions
    #[arg(long, action = ArgAction::SetTrue)]
    list: bool,

    /// Use this config file instead of the default location
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the session directory
    #[arg(long, value_name = "DIR")]
    session_dir: Option<PathBuf>,
}

impl Cli {
    fn builds_sandbox(&self) -> bool {
        self.script.is_some() || self.load.is_some() || self.import.is_some()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = &cli.session_dir {
        config.session.storage_dir = Some(dir.clone());
    }

    if cli.list {
        let store = FileSessionStore::from_config(&config)?;
        let sessions = store.list().context("Failed to list sessions")?;
        if sessions.is_empty() {
            println!("No stored sessions in {}", store.dir().display());
        }
        for entry in sessions {
            println!(
                "{}\t{}\t{} particles\t{} joints\t{}",
                entry.id,
                entry.name,
                entry.particle_count,
                entry.joint_count,
                entry.saved_at.to_rfc3339()
            );
        }
    }

    if !cli.builds_sandbox() {
        if !cli.list {
            print_usage();
        }
        return Ok(());
    }

    let mut input = InputState::sandbox(&config).map_err(anyhow::Error::msg)?;

    if let Some(name) = &cli.load {
        let store = FileSessionStore::from_config(&config)?;
        let data = store
            .load(name)
            .with_context(|| format!("Failed to load session '{}'", name))?
            .with_context(|| format!("No stored session named '{}'", name))?;
        input.load_session(data);
    } else if let Some(path) = &cli.import {
        let data = session::import_session(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        input.load_session(data);
    }

    let summary = match &cli.script {
        Some(path) => {
            let script = Script::load(path)?;
            replay::run(&mut input, &script, Instant::now())
        }
        None => ReplaySummary::capture(&input, 0),
    };
    println!("{}", summary);

    if cli.save.is_some() || cli.export.is_some() {
        let name = cli.save.as_deref().unwrap_or("export");
        let data = input
            .snapshot_session(name)
            .context("Sandbox has no particle system")?;

        if let Some(name) = &cli.save {
            let mut store = FileSessionStore::from_config(&config)?;
            let id = store
                .save(&data)
                .with_context(|| format!("Failed to save session '{}'", name))?;
            println!("Saved session '{}' as {}", name, id);
        }

        if let Some(path) = &cli.export {
            session::export_session(&data, path)
                .with_context(|| format!("Failed to export to {}", path.display()))?;
            println!("Exported session to {}", path.display());
        }
    }

    Ok(())
}

fn print_usage() {
    println!("particle-playground: pointer interaction sandbox for particle physics");
    println!();
    println!("Usage:");
    println!("  particle-playground --script events.json         Replay an event script");
    println!("  particle-playground --script events.json --save bridge");
    println!("  particle-playground --load bridge --export bridge.json.gz");
    println!("  particle-playground --list                        List stored sessions");
    println!("  particle-playground --help                        Show help");
    println!();
    println!("Config: $XDG_CONFIG_HOME/particle-playground/config.toml");
}
