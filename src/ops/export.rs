//! iCalendar export to a file.

use crate::errors::AppResult;
use crate::event::parse_date;
use crate::store::atomic::write_atomic;
use crate::store::{DateRange, EventStore};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes events between `from` and `to` (inclusive, both optional) to
/// `output` as an `.ics` file. Returns the number of events exported.
pub fn export_calendar(
    store: &EventStore,
    output: &Path,
    from: Option<&str>,
    to: Option<&str>,
    out: &mut dyn Write,
) -> AppResult<usize> {
    let range = match (from.map(parse_date).transpose()?, to.map(parse_date).transpose()?) {
        (Some(start), Some(end)) => DateRange::between(start, end)?,
        (Some(start), None) => DateRange::starting(start),
        (None, Some(end)) => DateRange::through(end),
        (None, None) => DateRange::all(),
    };

    let ics = store.export_ics(range)?;
    write_atomic(output, ics.as_bytes())?;

    let count = store.calendar().events_in(range).count();
    info!("Exported {} events to {:?}", count, output);
    writeln!(out, "Exported {} events to {}", count, output.display())?;
    Ok(count)
}
