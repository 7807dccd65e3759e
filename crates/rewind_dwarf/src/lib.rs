//! Address-to-source resolution through ELF/DWARF.
//!
//! Wraps an [`addr2line::Loader`] over the debugged binary to map program
//! counter values onto `(function, file, line)`, and keeps a copy of the
//! `.text` section so the `where` view can show the raw instruction words
//! around the PC next to the source window.

#![warn(missing_docs)]

pub mod error;

use std::path::Path;

use object::{Object, ObjectSection};

pub use error::BinaryError;

/// Instruction word size used for the text window. The traced cores are
/// fixed-width RISC machines.
const WORD_BYTES: u64 = 4;

/// A resolved program-counter location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// The queried address.
    pub addr: u64,
    /// The enclosing function, demangled when possible.
    pub function: Option<String>,
    /// The source file path from the line table.
    pub file: String,
    /// The 1-based source line.
    pub line: u32,
}

/// Address-to-source resolver over one debugged binary.
pub struct DwarfResolver {
    loader: addr2line::Loader,
    text_addr: u64,
    text: Vec<u8>,
}

impl std::fmt::Debug for DwarfResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DwarfResolver")
            .field("text_addr", &self.text_addr)
            .field("text_len", &self.text.len())
            .finish()
    }
}

impl DwarfResolver {
    /// Loads a binary and prepares its DWARF context and text section.
    pub fn load(path: &Path) -> Result<Self, BinaryError> {
        let loader = addr2line::Loader::new(path).map_err(|e| BinaryError::Load {
            reason: e.to_string(),
        })?;

        let data = std::fs::read(path).map_err(|e| BinaryError::Load {
            reason: e.to_string(),
        })?;
        let file = object::File::parse(&*data).map_err(|e| BinaryError::Load {
            reason: e.to_string(),
        })?;
        let (text_addr, text) = match file.section_by_name(".text") {
            Some(section) => {
                let bytes = section.data().map_err(|e| BinaryError::Load {
                    reason: e.to_string(),
                })?;
                (section.address(), bytes.to_vec())
            }
            None => (0, Vec::new()),
        };

        Ok(Self {
            loader,
            text_addr,
            text,
        })
    }

    /// Resolves an address to its function, file, and line.
    pub fn resolve(&self, addr: u64) -> Result<Resolved, BinaryError> {
        let location = self
            .loader
            .find_location(addr)
            .map_err(|e| BinaryError::Load {
                reason: e.to_string(),
            })?
            .ok_or(BinaryError::Unresolved { addr })?;
        let (Some(file), Some(line)) = (location.file, location.line) else {
            return Err(BinaryError::Unresolved { addr });
        };

        let function = self.function_name(addr);
        Ok(Resolved {
            addr,
            function,
            file: file.to_string(),
            line,
        })
    }

    fn function_name(&self, addr: u64) -> Option<String> {
        if let Ok(mut frames) = self.loader.find_frames(addr) {
            while let Ok(Some(frame)) = frames.next() {
                if let Some(function) = frame.function {
                    if let Ok(name) = function.demangle() {
                        return Some(name.into_owned());
                    }
                }
            }
        }
        self.loader.find_symbol(addr).map(|s| s.to_string())
    }

    /// The source lines around the address, current line marked.
    ///
    /// `context` lines are shown on each side of the resolved line.
    pub fn source_window(&self, addr: u64, context: u32) -> Result<String, BinaryError> {
        let resolved = self.resolve(addr)?;
        let text =
            std::fs::read_to_string(&resolved.file).map_err(|e| BinaryError::SourceUnavailable {
                path: resolved.file.clone(),
                reason: e.to_string(),
            })?;
        Ok(format_source_window(&text, resolved.line, context))
    }

    /// The raw instruction words around the address, current word marked.
    pub fn asm_window(&self, addr: u64, context: u32) -> Result<String, BinaryError> {
        format_asm_window(&self.text, self.text_addr, addr, context)
            .ok_or(BinaryError::OutsideText { addr })
    }

    /// The full `where` view: a header line, the source window, and the
    /// instruction window.
    pub fn where_view(&self, addr: u64, context: u32) -> Result<String, BinaryError> {
        let resolved = self.resolve(addr)?;
        let mut out = match &resolved.function {
            Some(func) => format!(
                "{:#x} in {func}(), {}:{}\n",
                resolved.addr, resolved.file, resolved.line
            ),
            None => format!("{:#x} at {}:{}\n", resolved.addr, resolved.file, resolved.line),
        };
        out.push_str(&self.source_window(addr, context)?);
        if let Ok(asm) = self.asm_window(addr, context) {
            out.push('\n');
            out.push_str(&asm);
        }
        Ok(out)
    }
}

/// Formats a window of `context` lines either side of `line` (1-based),
/// marking the current line.
fn format_source_window(text: &str, line: u32, context: u32) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let current = line.max(1) as usize;
    let first = current.saturating_sub(context as usize).max(1);
    let last = (current + context as usize).min(lines.len().max(1));

    let mut out = String::new();
    for n in first..=last {
        let Some(content) = lines.get(n - 1) else {
            break;
        };
        if n == current {
            out.push_str(&format!("{n:>5}  {content} <----\n"));
        } else {
            out.push_str(&format!("{n:>5}  {content}\n"));
        }
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Formats `context` instruction words either side of `addr` as
/// `address: word` lines, marking the current word. Returns `None` when
/// `addr` lies outside the text bytes.
fn format_asm_window(text: &[u8], text_addr: u64, addr: u64, context: u32) -> Option<String> {
    let end = text_addr + text.len() as u64;
    if addr < text_addr {
        return None;
    }
    let aligned = addr - (addr - text_addr) % WORD_BYTES;
    if aligned + WORD_BYTES > end {
        return None;
    }
    let span = context as u64 * WORD_BYTES;
    let first = aligned.saturating_sub(span).max(text_addr);
    let last = (aligned + span).min(end - WORD_BYTES);

    let mut out = String::new();
    let mut at = first;
    while at <= last {
        let offset = (at - text_addr) as usize;
        let bytes: [u8; 4] = text[offset..offset + 4].try_into().ok()?;
        let word = u32::from_le_bytes(bytes);
        if at == aligned {
            out.push_str(&format!("{at:#010x}: {word:08x} <----\n"));
        } else {
            out.push_str(&format!("{at:#010x}: {word:08x}\n"));
        }
        at += WORD_BYTES;
    }
    if out.ends_with('\n') {
        out.pop();
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_binary_fails() {
        let err = DwarfResolver::load(Path::new("/nonexistent/prog.elf")).unwrap_err();
        assert!(matches!(err, BinaryError::Load { .. }));
    }

    #[test]
    fn load_non_elf_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_elf");
        std::fs::write(&path, b"plain text, not an object file").unwrap();
        let err = DwarfResolver::load(&path).unwrap_err();
        assert!(matches!(err, BinaryError::Load { .. }));
    }

    #[test]
    fn source_window_marks_current_line() {
        let text = "one\ntwo\nthree\nfour\nfive\n";
        let window = format_source_window(text, 3, 1);
        assert_eq!(window, "    2  two\n    3  three <----\n    4  four");
    }

    #[test]
    fn source_window_clamps_at_file_start() {
        let text = "one\ntwo\nthree\n";
        let window = format_source_window(text, 1, 2);
        assert!(window.starts_with("    1  one <----"));
        assert!(window.contains("    3  three"));
    }

    #[test]
    fn source_window_clamps_at_file_end() {
        let text = "one\ntwo\n";
        let window = format_source_window(text, 2, 3);
        assert!(window.ends_with("    2  two <----"));
    }

    #[test]
    fn asm_window_marks_current_word() {
        // Four little-endian words starting at 0x1000.
        let text: Vec<u8> = [0x11111111u32, 0x22222222, 0x33333333, 0x44444444]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        let window = format_asm_window(&text, 0x1000, 0x1004, 1).unwrap();
        assert_eq!(
            window,
            "0x00001000: 11111111\n0x00001004: 22222222 <----\n0x00001008: 33333333"
        );
    }

    #[test]
    fn asm_window_aligns_misaligned_addresses() {
        let text: Vec<u8> = [0xaaaaaaaau32, 0xbbbbbbbb]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        let window = format_asm_window(&text, 0x1000, 0x1006, 0).unwrap();
        assert_eq!(window, "0x00001004: bbbbbbbb <----");
    }

    #[test]
    fn asm_window_rejects_out_of_range() {
        let text = vec![0u8; 8];
        assert!(format_asm_window(&text, 0x1000, 0x0, 1).is_none());
        assert!(format_asm_window(&text, 0x1000, 0x1008, 1).is_none());
        assert!(format_asm_window(&[], 0, 0, 1).is_none());
    }

    #[test]
    fn asm_window_clamps_to_section() {
        let text: Vec<u8> = [0x1u32, 0x2, 0x3].iter().flat_map(|w| w.to_le_bytes()).collect();
        let window = format_asm_window(&text, 0x100, 0x100, 4).unwrap();
        assert!(window.starts_with("0x00000100: 00000001 <----"));
        assert!(window.ends_with("0x00000108: 00000003"));
    }
}
