//! `milelog` - CLI for guided business mileage logging
//!
//! This binary runs the interactive journey recorder and exposes the stored
//! journeys for listing, printing, deleting and exporting.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use milelog::cli::{Cli, Command, ConfigCommand, ExportCommand, RecordCommand};
use milelog::export::{file_name, format_file, format_share};
use milelog::location::{
    CoordinateLabels, Coordinates, FixedPosition, LabelResolver, PositionSource,
    PostcodesIoResolver, UnavailablePosition,
};
use milelog::session::render_history;
use milelog::{
    init_logging, Config, Error, ExportVariant, FileSink, JourneyId, JourneyMachine,
    JourneyRecord, JourneyStore, Locator, Session, ShareChain, ShareOutcome, SqliteStore,
    SystemClock,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Record(cmd) => handle_record(&config, cmd).await,
        Command::List(cmd) => handle_list(&config, cmd.json),
        Command::Show(cmd) => {
            let record = find_journey(&open_store(&config)?, cmd.journey_id())?;
            println!("{}", ExportVariant::from(cmd.variant).render(&record));
            Ok(())
        }
        Command::Delete(cmd) => {
            let id = cmd.journey_id();
            let mut store = open_store(&config)?;
            find_journey(&store, id)?;
            store.remove(id)?;
            println!("Deleted journey {id}");
            Ok(())
        }
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = config.database_path();
    SqliteStore::open(&path, config.storage.slot_name.clone())
        .with_context(|| format!("opening journey store {}", path.display()))
}

fn find_journey(store: &SqliteStore, id: JourneyId) -> anyhow::Result<JourneyRecord> {
    Ok(store.get(id)?.ok_or(Error::JourneyNotFound(id.0))?)
}

async fn handle_record(config: &Config, cmd: RecordCommand) -> anyhow::Result<()> {
    let position: Box<dyn PositionSource> = match (cmd.lat, cmd.lon) {
        (Some(lat), Some(lon)) => Box::new(FixedPosition::new(Coordinates::new(lat, lon)?)),
        _ => match config.fixed_position() {
            Some(coords) => Box::new(FixedPosition::new(coords)),
            None => Box::new(UnavailablePosition),
        },
    };

    let labels: Box<dyn LabelResolver> = if cmd.offline {
        Box::new(CoordinateLabels)
    } else {
        Box::new(PostcodesIoResolver::new(
            config.location.resolver_url.as_str(),
            config.lookup_timeout(),
        )?)
    };

    let locator = Locator::new(position, labels);
    debug!(?locator, "Starting session");

    let machine = JourneyMachine::new(
        open_store(config)?,
        locator,
        Box::new(SystemClock::new(config.journey.date_format.as_str())),
    );
    let mut session = Session::new(
        machine,
        ShareChain::clipboard(config.export.clipboard_crlf_retry),
        FileSink::new(config.export_dir()),
    );

    let stdin = std::io::stdin();
    session.run(stdin.lock(), std::io::stdout()).await?;
    Ok(())
}

fn handle_list(config: &Config, json: bool) -> anyhow::Result<()> {
    let records = open_store(config)?.list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        let mut out = std::io::stdout().lock();
        render_history(&records, &mut out)?;
        out.flush()?;
    }
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let record = find_journey(&open_store(config)?, cmd.journey_id())?;

    if !cmd.share && !cmd.file {
        println!("{}", format_share(&record));
        return Ok(());
    }

    if cmd.share {
        let text = format_share(&record);
        match ShareChain::clipboard(config.export.clipboard_crlf_retry).share(&text) {
            ShareOutcome::Delivered { sink } => println!("Copied journey {} ({sink})", record.id),
            ShareOutcome::Notice(notice) => {
                eprintln!("{notice}");
                println!("{text}");
            }
        }
    }

    if cmd.file {
        let dir = cmd.dir.clone().unwrap_or_else(|| config.export_dir());
        let path = FileSink::new(dir).save(&file_name(&record), &format_file(&record))?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Slot:               {}", config.storage.slot_name);
                println!();
                println!("[Location]");
                println!("  Resolver:           {}", config.location.resolver_url);
                println!("  Timeout (secs):     {}", config.location.timeout_secs);
                match config.fixed_position() {
                    Some(coords) => println!("  Fixed position:     {coords}"),
                    None => println!("  Fixed position:     (none)"),
                }
                println!();
                println!("[Journey]");
                println!("  Date format:        {}", config.journey.date_format);
                println!();
                println!("[Export]");
                println!("  Directory:          {}", config.export_dir().display());
                println!(
                    "  CRLF retry:         {}",
                    config.export.clipboard_crlf_retry
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
