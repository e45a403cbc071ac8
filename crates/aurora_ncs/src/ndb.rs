//! NDB debug-symbol sidecar parsing.

use std::path::Path;

use derive_more::derive::{Constructor, Deref};
use tracing::instrument;

use crate::error::{Error, Result};

/// A source file referenced by the symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdbFile {
    pub index: u32,
    pub name: String,
}

/// A named span of code offsets (functions and variable liveness).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdbSymbol {
    pub start: u32,
    pub end: u32,
    pub name: String,
}

impl NdbSymbol {
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// One source line mapped to a range of code offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub file: u32,
    pub line: u32,
    pub start: u32,
    pub end: u32,
}

impl LineSpan {
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// The source-line spans of a script, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Constructor, Deref, Default)]
pub struct LineTable(Vec<LineSpan>);

impl LineTable {
    /// The first span containing `offset`.
    pub fn span_at(&self, offset: u32) -> Option<&LineSpan> {
        self.0.iter().find(|s| s.contains(offset))
    }
}

/// Parsed companion symbols for a compiled script.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ndb {
    pub files: Vec<NdbFile>,
    pub functions: Vec<NdbSymbol>,
    pub variables: Vec<NdbSymbol>,
    pub lines: LineTable,
}

impl Ndb {
    /// Parse symbols from text.
    #[instrument(skip(text), err)]
    pub fn parse(text: &str) -> Result<Ndb> {
        let mut lines = text.lines();

        let signature = lines.next().unwrap_or("").trim_end();
        if signature != "NDB V1.0" {
            return Err(Error::bad_magic("NDB V1.0", signature.as_bytes()));
        }

        let mut files = Vec::new();
        let mut functions = Vec::new();
        let mut variables = Vec::new();
        let mut spans = Vec::new();

        for line in lines {
            let mut parts = line.split_whitespace();
            let Some(tag) = parts.next() else { continue };
            match tag {
                // counts line; only useful as a capacity hint
                "N" => {
                    let counts: Vec<usize> =
                        parts.map_while(|p| p.parse().ok()).collect();
                    if let [f, func, v, l] = counts[..] {
                        files.reserve(f);
                        functions.reserve(func);
                        variables.reserve(v);
                        spans.reserve(l);
                    }
                }
                "f" => {
                    let index = parse_number(parts.next(), line)?;
                    let name = parts.collect::<Vec<_>>().join(" ");
                    files.push(NdbFile { index, name });
                }
                "fn" => functions.push(parse_symbol(&mut parts, line)?),
                "v" => variables.push(parse_symbol(&mut parts, line)?),
                "l" => {
                    spans.push(LineSpan {
                        file: parse_number(parts.next(), line)?,
                        line: parse_number(parts.next(), line)?,
                        start: parse_number(parts.next(), line)?,
                        end: parse_number(parts.next(), line)?,
                    });
                }
                // unknown record tags are skipped, newer emitters add some
                _ => {}
            }
        }

        Ok(Ndb {
            files,
            functions,
            variables,
            lines: LineTable::new(spans),
        })
    }

    /// Open and parse a `.ndb` file.
    pub fn open(path: impl AsRef<Path>) -> Result<Ndb> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// The function whose code range contains `offset`.
    pub fn function_at(&self, offset: u32) -> Option<&NdbSymbol> {
        self.functions.iter().find(|f| f.contains(offset))
    }
}

fn parse_symbol(
    parts: &mut std::str::SplitWhitespace,
    line: &str,
) -> Result<NdbSymbol> {
    let start = parse_number(parts.next(), line)?;
    let end = parse_number(parts.next(), line)?;
    let name = parts.collect::<Vec<_>>().join(" ");
    Ok(NdbSymbol { start, end, name })
}

fn parse_number(token: Option<&str>, line: &str) -> Result<u32> {
    let token =
        token.ok_or_else(|| Error::Malformed(format!("truncated NDB record: {line:?}")))?;
    let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => token.parse(),
    };
    parsed.map_err(|_| Error::Malformed(format!("bad number {token:?} in NDB record: {line:?}")))
}
