//! Trace file opening with transparent decompression.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use crate::error::TraceError;

/// Opens a trace file for reading, decoding `.xz` and `.gz` transparently.
///
/// The extension decides the codec; everything else is read as plain text.
/// The returned reader is always buffered.
pub fn open_trace_reader(path: &Path) -> Result<Box<dyn BufRead>, TraceError> {
    let file = File::open(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    Ok(match ext.as_deref() {
        Some("xz") => Box::new(BufReader::new(XzDecoder::new(file))),
        Some("gz") => Box::new(BufReader::new(GzDecoder::new(file))),
        _ => Box::new(BufReader::new(file)),
    })
}
