//! Streaming VCD parser.
//!
//! Consumes a VCD text stream in one pass: header keywords (`$scope`,
//! `$upscope`, `$var`, `$timescale`, `$enddefinitions`) build the symbol
//! table, then value-change lines append to per-symbol timelines. Keywords
//! may span multiple lines up to their `$end`; unknown keywords are
//! skipped. Only the signals named in an optional retain list are stored,
//! which keeps memory proportional to the model rather than the trace.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use rewind_common::{Logic, Value};

use crate::error::TraceError;
use crate::timescale::{TimeUnit, Timescale};

/// Per-symbol event timeline produced by the parser.
#[derive(Clone, Debug)]
pub struct SymbolData {
    /// Declared bit width from `$var`.
    pub width: u32,
    /// The VCD variable type (e.g. `wire`, `reg`).
    pub var_type: String,
    /// Event times, strictly increasing.
    pub times: Vec<u64>,
    /// Event values, parallel to `times`.
    pub values: Vec<Value>,
}

/// The raw result of parsing a VCD stream.
#[derive(Clone, Debug)]
pub struct ParsedTrace {
    /// The `$timescale` declaration, if the file had one.
    pub timescale: Option<Timescale>,
    /// Retained symbols in registration order.
    pub symbols: Vec<SymbolData>,
    /// Hierarchical name (range-stripped) to symbol index. Aliased nets
    /// map multiple names onto one symbol.
    pub names: HashMap<String, usize>,
    /// The last time marker seen in the file.
    pub end_time: u64,
}

/// Parses a VCD stream, retaining only the signals in `siglist` (all
/// signals when `None`).
///
/// Timestamps are multiplied by the timescale conversion factor for
/// `requested` and rounded; with no requested unit they stay in the file's
/// native units.
///
/// # Errors
///
/// Fails with [`TraceError::SignalsMissing`] when a requested signal never
/// appears in the definitions, and with [`TraceError::ParseError`] on
/// malformed `$var` bodies or time markers.
pub fn parse_trace<R: BufRead>(
    reader: R,
    siglist: Option<&[String]>,
    requested: Option<TimeUnit>,
) -> Result<ParsedTrace, TraceError> {
    Parser::new(siglist, requested).run(reader, false)
}

/// Runs the definition pass only and returns every hierarchical signal
/// name in the file, in declaration order.
pub fn scan_signals<R: BufRead>(reader: R) -> Result<Vec<String>, TraceError> {
    let parsed = Parser::new(None, None).run(reader, true)?;
    let mut names: Vec<(usize, String)> = parsed
        .names
        .into_iter()
        .map(|(name, idx)| (idx, name))
        .collect();
    names.sort();
    Ok(names.into_iter().map(|(_, name)| name).collect())
}

struct Parser<'a> {
    wanted: Option<HashSet<&'a str>>,
    requested: Option<TimeUnit>,
    timescale: Option<Timescale>,
    multiplier: f64,
    scope: Vec<String>,
    symbols: Vec<SymbolData>,
    names: HashMap<String, usize>,
    codes: HashMap<String, usize>,
    time: u64,
    end_time: u64,
    in_definitions: bool,
    line_num: usize,
}

impl<'a> Parser<'a> {
    fn new(siglist: Option<&'a [String]>, requested: Option<TimeUnit>) -> Self {
        Self {
            wanted: siglist.map(|list| list.iter().map(|s| s.as_str()).collect()),
            requested,
            timescale: None,
            multiplier: 1.0,
            scope: Vec::new(),
            symbols: Vec::new(),
            names: HashMap::new(),
            codes: HashMap::new(),
            time: 0,
            end_time: 0,
            in_definitions: true,
            line_num: 0,
        }
    }

    fn run<R: BufRead>(mut self, reader: R, defs_only: bool) -> Result<ParsedTrace, TraceError> {
        let mut pending_keyword: Option<String> = None;
        let mut pending_body = String::new();

        for line_result in reader.lines() {
            let line = line_result?;
            self.line_num += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            // A keyword collecting lines until its $end.
            if let Some(kw) = pending_keyword.take() {
                if let Some(pos) = trimmed.find("$end") {
                    pending_body.push(' ');
                    pending_body.push_str(trimmed[..pos].trim());
                    self.keyword(&kw, pending_body.trim())?;
                    pending_body.clear();
                } else {
                    pending_body.push(' ');
                    pending_body.push_str(trimmed);
                    pending_keyword = Some(kw);
                }
                continue;
            }

            if self.in_definitions {
                if trimmed.starts_with("$enddefinitions") {
                    self.in_definitions = false;
                    self.check_wanted()?;
                    if defs_only {
                        break;
                    }
                    continue;
                }
                if let Some(kw) = extract_keyword(trimmed) {
                    if trimmed.contains("$end") {
                        self.keyword(&kw, &extract_keyword_body(trimmed))?;
                    } else {
                        pending_body = extract_keyword_body(trimmed);
                        pending_keyword = Some(kw);
                    }
                }
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('#') {
                let raw: u64 = rest.parse().map_err(|_| TraceError::ParseError {
                    line: self.line_num,
                    message: format!("invalid time marker: {trimmed}"),
                })?;
                self.time = (raw as f64 * self.multiplier).round() as u64;
                self.end_time = self.end_time.max(self.time);
                continue;
            }

            if trimmed.starts_with('$') {
                // $dumpvars, $dumpoff, a bare $end, ...
                continue;
            }

            self.value_change(trimmed);
        }

        if self.in_definitions {
            self.check_wanted()?;
        }

        Ok(ParsedTrace {
            timescale: self.timescale,
            symbols: self.symbols,
            names: self.names,
            end_time: self.end_time,
        })
    }

    fn keyword(&mut self, kw: &str, body: &str) -> Result<(), TraceError> {
        match kw {
            "timescale" => {
                let ts = Timescale::parse(body, self.line_num)?;
                self.multiplier = ts.multiplier(self.requested);
                self.timescale = Some(ts);
            }
            "scope" => {
                let parts: Vec<&str> = body.split_whitespace().collect();
                match parts.len() {
                    0 => {}
                    1 => self.scope.push(parts[0].to_string()),
                    _ => self.scope.push(parts[1].to_string()),
                }
            }
            "upscope" => {
                self.scope.pop();
            }
            "var" => self.var_def(body)?,
            _ => {
                // $comment, $date, $version, ...
            }
        }
        Ok(())
    }

    fn var_def(&mut self, body: &str) -> Result<(), TraceError> {
        // "<type> <width> <code> <name> [<range>]"
        let parts: Vec<&str> = body.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(TraceError::ParseError {
                line: self.line_num,
                message: format!("invalid $var: {body}"),
            });
        }
        let var_type = parts[0];
        let width: u32 = parts[1].parse().map_err(|_| TraceError::ParseError {
            line: self.line_num,
            message: format!("invalid width in $var: {}", parts[1]),
        })?;
        let code = parts[2];
        let raw_name = parts[3..].concat();
        let var_name = strip_range(&raw_name);

        let full_name = if self.scope.is_empty() {
            var_name.to_string()
        } else {
            format!("{}.{var_name}", self.scope.join("."))
        };

        if let Some(wanted) = &self.wanted {
            if !wanted.contains(full_name.as_str()) {
                return Ok(());
            }
        }

        let idx = match self.codes.get(code) {
            Some(&idx) => idx, // an alias of an already-registered net
            None => {
                let idx = self.symbols.len();
                self.symbols.push(SymbolData {
                    width,
                    var_type: var_type.to_string(),
                    times: Vec::new(),
                    values: Vec::new(),
                });
                self.codes.insert(code.to_string(), idx);
                idx
            }
        };
        self.names.insert(full_name, idx);
        Ok(())
    }

    fn check_wanted(&self) -> Result<(), TraceError> {
        let Some(wanted) = &self.wanted else {
            return Ok(());
        };
        let mut missing: Vec<String> = wanted
            .iter()
            .filter(|name| !self.names.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            missing.sort();
            Err(TraceError::SignalsMissing { names: missing })
        }
    }

    fn value_change(&mut self, line: &str) {
        let first = line.as_bytes()[0];
        match first {
            b'b' | b'B' => {
                let rest = &line[1..];
                let mut parts = rest.split_whitespace();
                let (Some(bits), Some(code)) = (parts.next(), parts.next()) else {
                    return;
                };
                if let Some(&idx) = self.codes.get(code) {
                    let value = extend_bits(bits, self.symbols[idx].width);
                    self.append(idx, value);
                }
            }
            b'r' | b'R' => {
                // Real values carry no four-state projection; the event is
                // recorded so change queries still see it.
                let rest = &line[1..];
                let mut parts = rest.split_whitespace();
                let (Some(_), Some(code)) = (parts.next(), parts.next()) else {
                    return;
                };
                if let Some(&idx) = self.codes.get(code) {
                    let width = self.symbols[idx].width;
                    self.append(idx, Value::unknown(width));
                }
            }
            b'0' | b'1' | b'x' | b'X' | b'z' | b'Z' => {
                let code = &line[1..];
                if let Some(&idx) = self.codes.get(code) {
                    let value = Value::from_bits_lossy(&line[..1]);
                    self.append(idx, value);
                }
            }
            _ => {}
        }
    }

    fn append(&mut self, idx: usize, value: Value) {
        let sym = &mut self.symbols[idx];
        match sym.times.last() {
            Some(&last) if last == self.time => {
                // A re-dump at the same instant replaces the value.
                *sym.values.last_mut().unwrap() = value;
            }
            Some(&last) if last > self.time => {}
            _ => {
                sym.times.push(self.time);
                sym.values.push(value);
            }
        }
    }
}

/// Extracts a keyword name from a line starting with `$`.
fn extract_keyword(line: &str) -> Option<String> {
    let rest = line.strip_prefix('$')?;
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '$')
        .unwrap_or(rest.len());
    let kw = &rest[..end];
    if kw.is_empty() {
        None
    } else {
        Some(kw.to_lowercase())
    }
}

/// Extracts the body text between the keyword and `$end` on a single line.
fn extract_keyword_body(line: &str) -> String {
    let after = match line.find(|c: char| c.is_whitespace()) {
        Some(pos) => &line[pos..],
        None => return String::new(),
    };
    let body = match after.find("$end") {
        Some(pos) => &after[..pos],
        None => after,
    };
    body.trim().to_string()
}

/// Strips a trailing `[msb:lsb]` (or `[idx]`) range from a `$var` name.
fn strip_range(name: &str) -> &str {
    if name.ends_with(']') {
        if let Some(open) = name.rfind('[') {
            return &name[..open];
        }
    }
    name
}

/// Widens a VCD bit string to the declared width.
///
/// Short values are left-extended: with `0` normally, with `x`/`z` when the
/// most significant dumped bit is `x`/`z`. Over-long values keep their low
/// `width` bits.
fn extend_bits(bits: &str, width: u32) -> Value {
    let len = bits.chars().count() as u32;
    if len == width {
        return Value::from_bits_lossy(bits);
    }
    if len > width {
        let skip = (len - width) as usize;
        let tail: String = bits.chars().skip(skip).collect();
        return Value::from_bits_lossy(&tail);
    }
    let fill = match bits.chars().next().and_then(Logic::from_char) {
        Some(Logic::X) => 'x',
        Some(Logic::Z) => 'z',
        _ => '0',
    };
    let mut full = String::with_capacity(width as usize);
    for _ in 0..(width - len) {
        full.push(fill);
    }
    full.push_str(bits);
    Value::from_bits_lossy(&full)
}
