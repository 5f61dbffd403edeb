//! Command-line interface definitions.
//!
//! Arguments are kept as strings here and parsed by the operations in
//! [`crate::ops`], so invalid dates and times surface as `ValidationError`s
//! through the usual error path.

use crate::constants::{APP_DESCRIPTION, APP_NAME, DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// A calendar and reminder keeper with an encrypted local store
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION)]
#[command(author, version, long_about = None)]
pub struct CliArgs {
    /// Log output format
    #[arg(long, global = true, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: Option<String>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add an event
    Add {
        /// Event title
        title: String,

        #[command(flatten)]
        fields: EventFields,

        /// Day of the event (YYYY-MM-DD or YYYYMMDD)
        #[arg(short, long)]
        date: String,
    },

    /// List events for a day or a month (defaults to today)
    #[command(group(ArgGroup::new("scope").args(["date", "month"])))]
    List {
        /// Day to list (YYYY-MM-DD or YYYYMMDD)
        #[arg(short, long)]
        date: Option<String>,

        /// Month to list (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Change an existing event
    Edit {
        #[command(flatten)]
        target: EventTarget,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: EventFields,
    },

    /// Move an event to another day
    Move {
        #[command(flatten)]
        target: EventTarget,

        /// New day (YYYY-MM-DD or YYYYMMDD)
        #[arg(long)]
        to: String,
    },

    /// Delete an event
    Delete {
        #[command(flatten)]
        target: EventTarget,
    },

    /// Write an event's attachment to a file
    Extract {
        #[command(flatten)]
        target: EventTarget,

        /// File name of the attachment as shown by `list`
        #[arg(long)]
        name: String,

        /// Where to write the contents
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show reminders that are due
    Due {
        /// Reference time (YYYY-MM-DD HH:MM); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Record the listed reminders as delivered
        #[arg(long)]
        mark: bool,
    },

    /// Watch for reminders and print them as they fall due
    Watch {
        /// Poll once and exit
        #[arg(long)]
        once: bool,

        /// Send reminders to the log instead of standard output
        #[arg(long)]
        log_only: bool,
    },

    /// Export events as an iCalendar file
    Export {
        /// Destination .ics file
        #[arg(short, long)]
        output: PathBuf,

        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Write or verify an encrypted backup of the store
    #[command(group(ArgGroup::new("backup_mode").required(true).args(["output", "verify"])))]
    Backup {
        /// Where to write the backup
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Existing backup to check
        #[arg(long)]
        verify: Option<PathBuf>,
    },

    /// Show or change display settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change style and accent color
    Set {
        /// Style name, e.g. "Default Dark"
        #[arg(long)]
        style: Option<String>,

        /// Accent color as #RRGGBB
        #[arg(long)]
        accent: Option<String>,
    },
}

/// Identifies one stored event.
#[derive(Args, Debug, Clone)]
pub struct EventTarget {
    /// Day the event is on (YYYY-MM-DD or YYYYMMDD)
    #[arg(short, long)]
    pub date: String,

    /// Event id as shown by `list`
    #[arg(long)]
    pub id: String,
}

/// Optional editable fields shared by `add` and `edit`.
#[derive(Args, Debug, Clone, Default)]
pub struct EventFields {
    /// Time of day (HH:MM or hh:mm AM/PM)
    #[arg(short, long, conflicts_with = "all_day")]
    pub time: Option<String>,

    /// Make the event all-day
    #[arg(long)]
    pub all_day: bool,

    /// Free-text description
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,

    /// Remind this many minutes before the event
    #[arg(short, long, conflicts_with = "no_remind")]
    pub remind: Option<u32>,

    /// Turn the reminder off
    #[arg(long)]
    pub no_remind: bool,

    /// Store a copy of this file with the event (repeatable)
    #[arg(long = "attach", value_name = "PATH")]
    pub attach: Vec<PathBuf>,

    /// Remove the attachment with this file name (repeatable)
    #[arg(long = "detach", value_name = "NAME")]
    pub detach: Vec<String>,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_command() {
        let args = CliArgs::parse_from([
            "btodo", "add", "Meeting", "--date", "2025-05-05", "--time", "14:00", "--remind", "15",
        ]);

        match args.command {
            Command::Add { title, fields, date } => {
                assert_eq!(title, "Meeting");
                assert_eq!(date, "2025-05-05");
                assert_eq!(fields.time.as_deref(), Some("14:00"));
                assert_eq!(fields.remind, Some(15));
                assert!(!fields.all_day);
            }
            other => panic!("Expected Add, got {:?}", other),
        }
        assert_eq!(args.log_level, "info");
        assert!(args.log_format.is_none());
    }

    #[test]
    fn test_global_logging_flags() {
        let args = CliArgs::parse_from([
            "btodo", "list", "--log-format", "json", "--log-level", "debug",
        ]);
        assert_eq!(args.log_format.as_deref(), Some("json"));
        assert_eq!(args.log_level, "debug");

        assert!(CliArgs::try_parse_from(["btodo", "--log-format", "xml", "list"]).is_err());
    }

    #[test]
    fn test_list_scope_is_exclusive() {
        let args = CliArgs::parse_from(["btodo", "list", "--month", "2025-05"]);
        assert!(matches!(args.command, Command::List { month: Some(_), date: None }));

        let result =
            CliArgs::try_parse_from(["btodo", "list", "--month", "2025-05", "--date", "2025-05-05"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_conflicting_flags() {
        let result = CliArgs::try_parse_from([
            "btodo", "edit", "--date", "2025-05-05", "--id", "x", "--time", "10:00", "--all-day",
        ]);
        assert!(result.is_err());

        let result = CliArgs::try_parse_from([
            "btodo", "edit", "--date", "2025-05-05", "--id", "x", "--remind", "5", "--no-remind",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_attachment_flags() {
        let args = CliArgs::parse_from([
            "btodo", "edit", "--date", "2025-05-05", "--id", "x", "--attach", "/tmp/a.png",
            "--attach", "/tmp/b.pdf", "--detach", "old.txt",
        ]);
        match args.command {
            Command::Edit { fields, .. } => {
                assert_eq!(
                    fields.attach,
                    vec![PathBuf::from("/tmp/a.png"), PathBuf::from("/tmp/b.pdf")]
                );
                assert_eq!(fields.detach, vec!["old.txt".to_string()]);
            }
            other => panic!("Expected Edit, got {:?}", other),
        }

        let args = CliArgs::parse_from([
            "btodo", "extract", "--date", "2025-05-05", "--id", "x", "--name", "a.png", "-o",
            "/tmp/out.png",
        ]);
        assert!(matches!(args.command, Command::Extract { ref name, .. } if name == "a.png"));
        assert!(CliArgs::try_parse_from(["btodo", "extract", "--date", "2025-05-05", "--id", "x"])
            .is_err());
    }

    #[test]
    fn test_backup_requires_mode() {
        assert!(CliArgs::try_parse_from(["btodo", "backup"]).is_err());
        assert!(CliArgs::try_parse_from(["btodo", "backup", "--output", "/tmp/b.enc"]).is_ok());
        assert!(CliArgs::try_parse_from([
            "btodo", "backup", "--output", "/tmp/b.enc", "--verify", "/tmp/c.enc"
        ])
        .is_err());
    }

    #[test]
    fn test_settings_subcommands() {
        let args = CliArgs::parse_from([
            "btodo", "settings", "set", "--style", "Default Dark", "--accent", "#112233",
        ]);
        match args.command {
            Command::Settings {
                action: SettingsAction::Set { style, accent },
            } => {
                assert_eq!(style.as_deref(), Some("Default Dark"));
                assert_eq!(accent.as_deref(), Some("#112233"));
            }
            other => panic!("Expected settings set, got {:?}", other),
        }
    }
}
