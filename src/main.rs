/*!
# bToDo - Calendar and reminders with an encrypted store

This file contains the main application flow: it sets up logging, loads the
configuration, unlocks the store and hands the parsed command to the matching
operation in [`btodo::ops`].

## Usage

```
btodo [OPTIONS] <COMMAND>

Commands:
  add       Add an event
  list      List events for a day or a month (defaults to today)
  edit      Change an existing event
  move      Move an event to another day
  delete    Delete an event
  extract   Write an event's attachment to a file
  due       Show reminders that are due
  watch     Watch for reminders and print them as they fall due
  export    Export events as an iCalendar file
  backup    Write or verify an encrypted backup of the store
  settings  Show or change display settings

Options:
      --log-format <LOG_FORMAT>  Log output format [possible values: text, json]
      --log-level <LOG_LEVEL>    Log level filter (overridden by RUST_LOG) [default: info]
```

## Configuration

- `BTODO_DATA_FILE`: Location of the encrypted store
- `BTODO_POLL_INTERVAL`: Seconds between reminder polls in `watch`
- `BTODO_LOG_FORMAT`: `text` or `json` when `--log-format` is not given
*/

use btodo::cli::{CliArgs, Command, SettingsAction};
use btodo::constants::{
    ENV_VAR_LOG_FORMAT, LOG_FORMAT_JSON, LOG_FORMAT_TEXT, TRACING_ROOT_SPAN_NAME,
    TRACING_SERVICE_NAME,
};
use btodo::crypto::obtain_secret;
use btodo::errors::AppResult;
use btodo::{ops, Config, EventStore};
use chrono::Local;
use std::env;
use std::io::{self, Write};
use std::process;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

fn main() {
    let args = CliArgs::parse_args();

    let log_format = args
        .log_format
        .clone()
        .or_else(|| env::var(ENV_VAR_LOG_FORMAT).ok())
        .unwrap_or_else(|| LOG_FORMAT_TEXT.to_string());
    init_tracing(&log_format, &args.log_level);

    let correlation_id = Uuid::new_v4().to_string();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = root_span.enter();

    if let Err(e) = run(args) {
        error!(error = %e, recoverable = e.is_recoverable(), "Command failed");
        eprintln!("Error: {}", e);
        if e.is_unlock_failure() {
            eprintln!("The data file was left untouched.");
        }
        process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(format: &str, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if format == LOG_FORMAT_JSON {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_span_list(true)
                    .with_current_span(true)
                    .with_writer(io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .init();
    }
}

fn run(args: CliArgs) -> AppResult<()> {
    debug!("CLI arguments: {:?}", args);

    let config = Config::load()?;
    config.validate()?;
    debug!("Configuration: {:?}", config);

    let mut out = io::stdout();

    // Verifying a backup never opens the live store.
    if let Command::Backup {
        verify: Some(path), ..
    } = &args.command
    {
        let secret = obtain_secret(true)?;
        ops::verify_backup(path, &secret, &mut out)?;
        return Ok(());
    }

    let secret = obtain_secret(!EventStore::needs_new_secret(&config.data_file)?)?;
    let mut store = EventStore::open(config.data_file.clone(), &secret)?;
    let now = Local::now().naive_local();

    match args.command {
        Command::Add {
            title,
            fields,
            date,
        } => {
            let event = ops::add_event(&mut store, &date, &title, &fields)?;
            writeln!(out, "Added {} on {}: {}", event.id(), event.date(), event)?;
        }
        Command::List { date, month } => {
            ops::list_events(
                &store,
                date.as_deref(),
                month.as_deref(),
                now.date(),
                &mut out,
            )?;
        }
        Command::Edit {
            target,
            title,
            fields,
        } => {
            let event = ops::edit_event(&mut store, &target, title.as_deref(), &fields)?;
            writeln!(out, "Updated {} on {}: {}", event.id(), event.date(), event)?;
        }
        Command::Move { target, to } => {
            let event = ops::move_event(&mut store, &target, &to)?;
            writeln!(out, "Moved to {} as {}: {}", event.date(), event.id(), event)?;
        }
        Command::Delete { target } => {
            ops::delete_event(&mut store, &target)?;
            writeln!(out, "Deleted {} from {}", target.id, target.date)?;
        }
        Command::Extract {
            target,
            name,
            output,
        } => {
            ops::extract_attachment(&store, &target, &name, &output, &mut out)?;
        }
        Command::Due { at, mark } => {
            ops::show_due(&mut store, at.as_deref(), now, mark, &mut out)?;
        }
        Command::Watch { once, log_only } => {
            let delivered = ops::watch(&mut store, config.poll_interval(), once, log_only)?;
            info!("{} reminders delivered", delivered);
        }
        Command::Export { output, from, to } => {
            ops::export_calendar(&store, &output, from.as_deref(), to.as_deref(), &mut out)?;
        }
        Command::Backup { output, .. } => {
            if let Some(output) = output {
                ops::create_backup(&store, &output, &mut out)?;
            }
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => ops::show_settings(&store, &mut out)?,
            SettingsAction::Set { style, accent } => {
                let settings = ops::update_settings(&mut store, style.as_deref(), accent.as_deref())?;
                writeln!(
                    out,
                    "Settings saved: {} ({}), accent {}",
                    settings.style_name(),
                    settings.theme(),
                    settings.accent_color()
                )?;
            }
        },
    }

    info!("Command completed");
    Ok(())
}
