use std::io::BufRead;

use regex::Regex;

use crate::error::TraceError;

/// Whether an access reads or writes memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    pub fn is_write(self) -> bool {
        self == AccessMode::Write
    }
}

/// One parsed trace line: an access mode and a 32-bit virtual address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    pub mode: AccessMode,
    pub vaddr: u32,
}

/// Reads trace lines of the form `R 0x<hex>` / `W 0x<hex>` from any
/// buffered source.
///
/// Blank lines are skipped; the first line that doesn't match the grammar
/// yields a [`TraceError::MalformedLine`], after which the caller is expected
/// to stop - statistics gathered so far remain valid
pub struct TraceReader<R> {
    reader: R,
    pattern: Regex,
    line: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        // addresses are capped at 8 hex digits so they always fit in a u32
        let pattern = Regex::new(r"^\s*([RrWw])\s+0[xX]([0-9a-fA-F]{1,8})\s*$").unwrap();
        Self {
            reader,
            pattern,
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceEvent, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = String::new();
        loop {
            buf.clear();
            self.line += 1;
            match self.reader.read_line(&mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(TraceError::Io(e))),
            }
            let line = buf.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            return Some(match self.pattern.captures(line) {
                Some(caps) => {
                    let mode = match &caps[1] {
                        "R" | "r" => AccessMode::Read,
                        _ => AccessMode::Write,
                    };
                    let vaddr = u32::from_str_radix(&caps[2], 16).unwrap();
                    Ok(TraceEvent { mode, vaddr })
                }
                None => Err(TraceError::MalformedLine {
                    line: self.line,
                    content: line.to_string(),
                }),
            });
        }
    }
}
