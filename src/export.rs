// src/export.rs
use crate::models::PasswordStore;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const CSV_HEADER: [&str; 4] = ["site", "username", "password", "last_updated"];

/// Quotes a field only when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn write_row<W: Write>(out: &mut W, fields: [&str; 4]) -> io::Result<()> {
    let line: Vec<Cow<'_, str>> = fields.iter().map(|f| csv_field(f)).collect();
    write!(out, "{}\r\n", line.join(","))
}

/// Writes every entry, in insertion order, below a header row.
/// Returns the number of data rows written.
pub fn export_csv<W: Write>(store: &PasswordStore, out: &mut W) -> io::Result<usize> {
    write_row(out, CSV_HEADER)?;
    let mut count = 0;
    for (site, record) in &store.entries {
        write_row(out, [site.as_str(), &record.username, &record.password, &record.last_updated])?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

pub fn export_csv_to_path(store: &PasswordStore, out_path: &Path) -> io::Result<usize> {
    log::info!("Exporting {} entries to {:?}", store.entries.len(), out_path);
    let mut writer = BufWriter::new(File::create(out_path)?);
    let written = export_csv(store, &mut writer)?;
    log::info!("Exported {} rows to {:?}", written, out_path);
    Ok(written)
}
