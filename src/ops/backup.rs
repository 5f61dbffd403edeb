//! Backup creation and verification.

use crate::crypto::Secret;
use crate::errors::AppResult;
use crate::store::{BackupReport, EventStore};
use std::io::Write;
use std::path::Path;

/// Writes an encrypted copy of the store to `output` and prints its checksum.
pub fn create_backup(
    store: &EventStore,
    output: &Path,
    out: &mut dyn Write,
) -> AppResult<BackupReport> {
    let report = store.backup_to(output)?;
    print_report("Backup written", &report, out)?;
    Ok(report)
}

/// Decrypts `path` with `secret` and prints what it holds.
///
/// # Errors
///
/// Returns `CryptoError::Authentication` for a wrong secret or a damaged
/// backup; the live store is never touched.
pub fn verify_backup(path: &Path, secret: &Secret, out: &mut dyn Write) -> AppResult<BackupReport> {
    let report = EventStore::verify_backup(path, secret)?;
    print_report("Backup verified", &report, out)?;
    Ok(report)
}

fn print_report(heading: &str, report: &BackupReport, out: &mut dyn Write) -> AppResult<()> {
    writeln!(out, "{}: {}", heading, report.path.display())?;
    writeln!(out, "  events:   {}", report.events)?;
    writeln!(out, "  size:     {} bytes", report.size)?;
    writeln!(out, "  blake3:   {}", report.checksum)?;
    Ok(())
}
