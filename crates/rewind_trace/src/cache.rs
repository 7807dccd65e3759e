//! On-disk cache for parsed traces.
//!
//! A parsed [`TraceStore`] is persisted next to the input as
//! `<INPUT>.cached`: a binary header (magic bytes, format version, content
//! hashes of the source file and the retained signal list) followed by the
//! bincode-encoded store. All reads are fail-safe: a missing, corrupt, or
//! stale cache is a cache miss, never an error.

use std::path::{Path, PathBuf};

use rewind_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::TraceError;
use crate::store::TraceStore;
use crate::timescale::TimeUnit;

/// Magic bytes identifying a Rewind trace cache.
const CACHE_MAGIC: [u8; 4] = *b"RWND";

/// Current cache format version. Increment on breaking changes to the
/// header or payload encoding.
const CACHE_FORMAT_VERSION: u32 = 1;

/// Header prepended to the cached payload for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheHeader {
    magic: [u8; 4],
    format_version: u32,
    /// Hash of the raw bytes of the source trace file.
    source_hash: ContentHash,
    /// Hash of the retained signal list the store was built with.
    siglist_hash: ContentHash,
    /// Checksum of the payload that follows the header.
    checksum: ContentHash,
}

/// The sibling cache path for a trace file: `<INPUT>.cached`.
pub fn cache_path(input: &Path) -> PathBuf {
    let mut os = input.as_os_str().to_os_string();
    os.push(".cached");
    PathBuf::from(os)
}

fn siglist_hash(siglist: Option<&[String]>) -> ContentHash {
    let mut names: Vec<&str> = siglist
        .map(|list| list.iter().map(|s| s.as_str()).collect())
        .unwrap_or_default();
    names.sort_unstable();
    ContentHash::from_strs(&names)
}

/// Loads the parsed trace from cache, or parses the file and writes the
/// cache for next time.
///
/// `regen` forces a re-parse and overwrites any existing cache. The cache
/// is keyed on the source bytes and the retained signal list; a change to
/// either invalidates it.
pub fn load_or_parse(
    input: &Path,
    siglist: Option<&[String]>,
    regen: bool,
    requested: Option<TimeUnit>,
) -> Result<TraceStore, TraceError> {
    let source_hash = ContentHash::from_bytes(&std::fs::read(input)?);
    let list_hash = siglist_hash(siglist);
    let cache = cache_path(input);

    if !regen {
        if let Some(store) = read_cache(&cache, source_hash, list_hash) {
            return Ok(store);
        }
    }

    let store = TraceStore::parse(input, siglist, requested)?;
    write_cache(&cache, &store, source_hash, list_hash)?;
    Ok(store)
}

/// Reads and validates a cache file. Any problem is a cache miss.
fn read_cache(
    path: &Path,
    source_hash: ContentHash,
    list_hash: ContentHash,
) -> Option<TraceStore> {
    let raw = std::fs::read(path).ok()?;
    if raw.len() < 4 {
        return None;
    }
    let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
    if raw.len() < 4 + header_len {
        return None;
    }

    let header: CacheHeader =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .ok()?
            .0;

    if header.magic != CACHE_MAGIC
        || header.format_version != CACHE_FORMAT_VERSION
        || header.source_hash != source_hash
        || header.siglist_hash != list_hash
    {
        return None;
    }

    let payload = &raw[4 + header_len..];
    if ContentHash::from_bytes(payload) != header.checksum {
        return None;
    }

    bincode::serde::decode_from_slice(payload, bincode::config::standard())
        .ok()
        .map(|(store, _)| store)
}

/// Writes the cache file: 4-byte header length (little-endian) + header +
/// payload.
fn write_cache(
    path: &Path,
    store: &TraceStore,
    source_hash: ContentHash,
    list_hash: ContentHash,
) -> Result<(), TraceError> {
    let payload = bincode::serde::encode_to_vec(store, bincode::config::standard())
        .map_err(|e| TraceError::ParseError {
            line: 0,
            message: format!("cache encode failed: {e}"),
        })?;

    let header = CacheHeader {
        magic: CACHE_MAGIC,
        format_version: CACHE_FORMAT_VERSION,
        source_hash,
        siglist_hash: list_hash,
        checksum: ContentHash::from_bytes(&payload),
    };
    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| TraceError::ParseError {
            line: 0,
            message: format!("cache encode failed: {e}"),
        })?;

    let mut out = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    out.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(&payload);
    std::fs::write(path, &out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VCD: &str = "\
$timescale 1ns $end
$scope module top $end
$var wire 1 ! clk $end
$var wire 4 \" data $end
$upscope $end
$enddefinitions $end
#0
0!
b0000 \"
#10
1!
b1010 \"
";

    fn write_trace(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("trace.vcd");
        std::fs::write(&path, VCD).unwrap();
        path
    }

    #[test]
    fn cache_path_is_sibling() {
        assert_eq!(
            cache_path(Path::new("/tmp/run.vcd")),
            PathBuf::from("/tmp/run.vcd.cached")
        );
    }

    #[test]
    fn parse_writes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_trace(&dir);
        let store = load_or_parse(&path, None, false, None).unwrap();
        assert_eq!(store.end_time(), 10);
        assert!(cache_path(&path).exists());
    }

    #[test]
    fn cache_roundtrips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_trace(&dir);
        let first = load_or_parse(&path, None, false, None).unwrap();
        let second = load_or_parse(&path, None, false, None).unwrap();

        let clk = second.symbol("top.clk").unwrap();
        assert_eq!(second.end_time(), first.end_time());
        assert_eq!(
            second.value_at(clk, 10).as_bits(),
            first.value_at(second.symbol("top.clk").unwrap(), 10).as_bits()
        );
        assert_eq!(second.timescale(), first.timescale());
        assert_eq!(second.symbol_count(), first.symbol_count());
    }

    #[test]
    fn changed_source_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_trace(&dir);
        load_or_parse(&path, None, false, None).unwrap();

        // Append another time marker; the cache must not be reused.
        let mut text = std::fs::read_to_string(&path).unwrap();
        text.push_str("#20\n0!\n");
        std::fs::write(&path, text).unwrap();

        let store = load_or_parse(&path, None, false, None).unwrap();
        assert_eq!(store.end_time(), 20);
    }

    #[test]
    fn changed_siglist_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_trace(&dir);
        let all = load_or_parse(&path, None, false, None).unwrap();
        assert_eq!(all.symbol_count(), 2);

        let keep = vec!["top.clk".to_string()];
        let filtered = load_or_parse(&path, Some(&keep), false, None).unwrap();
        assert_eq!(filtered.symbol_count(), 1);
    }

    #[test]
    fn corrupt_cache_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_trace(&dir);
        load_or_parse(&path, None, false, None).unwrap();
        std::fs::write(cache_path(&path), b"garbage").unwrap();

        let store = load_or_parse(&path, None, false, None).unwrap();
        assert_eq!(store.end_time(), 10);
    }

    #[test]
    fn regen_overwrites_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_trace(&dir);
        load_or_parse(&path, None, false, None).unwrap();
        let before = std::fs::metadata(cache_path(&path)).unwrap().len();
        // Corrupt the cache, then regen; it must be rewritten valid.
        std::fs::write(cache_path(&path), b"junk").unwrap();
        load_or_parse(&path, None, true, None).unwrap();
        let after = std::fs::metadata(cache_path(&path)).unwrap().len();
        assert_eq!(before, after);
    }

    #[test]
    fn missing_input_is_io_error() {
        let err = load_or_parse(Path::new("/nonexistent/t.vcd"), None, false, None).unwrap_err();
        assert!(matches!(err, TraceError::Io(_)));
    }
}
