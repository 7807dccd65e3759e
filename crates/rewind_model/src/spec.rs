//! Model specs: built-in models and TOML model files.
//!
//! The `MODEL` argument on the command line is either a built-in name
//! (matched case-insensitively) or a path to a TOML file describing the
//! modules. Every string field in a spec substitutes `{key}` placeholders
//! from repeated `--model-arg key=value` flags, so a single file can
//! describe a parameterized grid of cores.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ModelError;
use crate::memory::{MemoryModule, Segment};
use crate::model::ModelDef;
use crate::module::{BasicModule, CoreModule};

/// Parses repeated `key=value` model arguments.
pub fn parse_model_args(args: &[String]) -> Result<HashMap<String, String>, ModelError> {
    let mut map = HashMap::new();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            return Err(ModelError::BadSpec {
                reason: format!("model argument '{arg}' is not of the form key=value"),
            });
        };
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

/// Resolves a model name to an unbound [`ModelDef`].
///
/// Built-ins are tried first (case-insensitively); otherwise the name is
/// treated as a path to a TOML model file.
pub fn resolve_model(name: &str, args: &HashMap<String, String>) -> Result<ModelDef, ModelError> {
    match name.to_lowercase().as_str() {
        "test" => builtin_test(),
        _ => {
            let path = Path::new(name);
            if path.exists() {
                load_model_file(path, args)
            } else {
                Err(ModelError::UnknownModel {
                    name: name.to_string(),
                })
            }
        }
    }
}

/// The built-in test model: one basic module and one memory over the
/// `logic` scope, clocked every 100 time units.
fn builtin_test() -> Result<ModelDef, ModelError> {
    let mut def = ModelDef::new(100);
    def.add_module(Box::new(BasicModule::new(
        "r0_data",
        vec!["logic.data".into(), "logic.data_valid".into()],
    )))?;
    def.add_module(Box::new(MemoryModule::new(
        "memory",
        "logic.waddr".into(),
        "logic.wdata".into(),
        "logic.tx_en".into(),
        true,
    )))?;
    Ok(def)
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    edge_time: u64,
    #[serde(default, rename = "module")]
    modules: Vec<ModuleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ModuleEntry {
    Basic {
        name: String,
        signals: Vec<String>,
    },
    Memory {
        name: String,
        addr: String,
        wdata: String,
        enable: String,
        #[serde(default = "default_true")]
        enable_high: bool,
        size: Option<u64>,
        #[serde(default)]
        segments: Vec<SegmentEntry>,
        #[serde(default = "default_true")]
        show_signals: bool,
    },
    Core {
        name: String,
        pc: String,
        #[serde(default)]
        signals: Vec<String>,
    },
}

/// A segment is a single hex address or an inclusive `[lo, hi]` hex pair.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SegmentEntry {
    Single(String),
    Range([String; 2]),
}

fn default_true() -> bool {
    true
}

fn parse_hex(s: &str) -> Result<u64, ModelError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|_| ModelError::BadSpec {
        reason: format!("'{s}' is not a hex address"),
    })
}

fn parse_segment(entry: &SegmentEntry) -> Result<Segment, ModelError> {
    match entry {
        SegmentEntry::Single(addr) => Ok(Segment::single(parse_hex(addr)?)),
        SegmentEntry::Range([lo, hi]) => {
            let (lo, hi) = (parse_hex(lo)?, parse_hex(hi)?);
            if lo > hi {
                return Err(ModelError::BadSpec {
                    reason: format!("segment range {lo:#x}..{hi:#x} is inverted"),
                });
            }
            Ok(Segment { lo, hi })
        }
    }
}

/// Substitutes `{key}` placeholders from the model arguments.
fn subst(text: &str, args: &HashMap<String, String>) -> String {
    let mut out = text.to_string();
    for (key, value) in args {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

fn load_model_file(path: &Path, args: &HashMap<String, String>) -> Result<ModelDef, ModelError> {
    let text = std::fs::read_to_string(path)?;
    let file: ModelFile = toml::from_str(&text).map_err(|e| ModelError::BadSpec {
        reason: e.to_string(),
    })?;

    let mut def = ModelDef::new(file.edge_time);
    for entry in &file.modules {
        match entry {
            ModuleEntry::Basic { name, signals } => {
                let signals = signals.iter().map(|s| subst(s, args)).collect();
                def.add_module(Box::new(BasicModule::new(subst(name, args), signals)))?;
            }
            ModuleEntry::Memory {
                name,
                addr,
                wdata,
                enable,
                enable_high,
                size,
                segments,
                show_signals,
            } => {
                let segments = segments
                    .iter()
                    .map(parse_segment)
                    .collect::<Result<Vec<_>, _>>()?;
                let mut memory = MemoryModule::new(
                    subst(name, args),
                    subst(addr, args),
                    subst(wdata, args),
                    subst(enable, args),
                    *enable_high,
                )
                .with_segments(segments)
                .show_signals(*show_signals);
                if let Some(size) = size {
                    memory = memory.with_size(*size);
                }
                def.add_module(Box::new(memory))?;
            }
            ModuleEntry::Core { name, pc, signals } => {
                let signals = signals.iter().map(|s| subst(s, args)).collect();
                def.add_module(Box::new(CoreModule::new(
                    subst(name, args),
                    subst(pc, args),
                    signals,
                )))?;
            }
        }
    }
    Ok(def)
}
