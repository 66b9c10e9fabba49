//! Bus transaction scripts.
//!
//! One transaction per line, `#` starts a comment:
//!
//! ```text
//! R 0x0040            read
//! R 0x0040 = 0xBEEF   read and check the data
//! W 0x0040 0xBEEF     write
//! W 0x0041 0xEF00 U   write the upper byte lane only (L, U or LU)
//! X                   reset the cache
//! ```

use std::fmt;

use regex::Regex;

use crate::SimError;
use crate::io::BusPort;
use crate::mem::ByteLanes;
use crate::system::{CacheSystem, Completion};

/// A single scripted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceOp {
    Read { addr: u32, expect: Option<u16> },
    Write { addr: u32, data: u16, lanes: ByteLanes },
    Reset,
}

impl TraceOp {
    /// Issue over a threaded bus port.
    pub fn issue(&self, port: &BusPort) -> Result<Completion, SimError> {
        match *self {
            TraceOp::Read { addr, .. } => port.read(addr),
            TraceOp::Write { addr, data, lanes } => port.write(addr, data, lanes),
            TraceOp::Reset => port.reset(),
        }
    }

    /// Issue directly on a system.
    pub fn apply(&self, system: &mut CacheSystem) -> Result<Completion, SimError> {
        match *self {
            TraceOp::Read { addr, .. } => system.read(addr),
            TraceOp::Write { addr, data, lanes } => system.write(addr, data, lanes),
            TraceOp::Reset => system.reset(),
        }
    }

    /// Returns the expected value if a checked read returned something else.
    pub fn mismatch(&self, completion: &Completion) -> Option<u16> {
        match *self {
            TraceOp::Read { expect: Some(expect), .. } if expect != completion.data => Some(expect),
            _ => None,
        }
    }
}

impl fmt::Display for TraceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceOp::Read { addr, expect: None } => write!(f, "R ${:08X}", addr),
            TraceOp::Read { addr, expect: Some(expect) } => write!(f, "R ${:08X} = ${:04X}", addr, expect),
            TraceOp::Write { addr, data, lanes } if lanes.is_all() => write!(f, "W ${:08X} ${:04X}", addr, data),
            TraceOp::Write { addr, data, lanes } => write!(f, "W ${:08X} ${:04X} {:?}", addr, data, lanes),
            TraceOp::Reset => write!(f, "X"),
        }
    }
}

/// An op and the script line it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceLine {
    pub line: usize,
    pub op:   TraceOp,
}

pub struct Trace {
    pub ops: Vec<TraceLine>
}

impl Trace {
    pub fn parse_from_str(str: &str) -> Result<Trace, ParseError> {
        let read_regex = Regex::new(r"^[Rr]\s+([^\s=]+)(?:\s*=\s*(\S+))?$").unwrap();
        let write_regex = Regex::new(r"^[Ww]\s+(\S+)\s+(\S+)(?:\s+([LUlu]+))?$").unwrap();
        let reset_regex = Regex::new(r"^[Xx]$").unwrap();

        let mut ops = Vec::new();
        for (idx, raw_line) in str.lines().enumerate() {
            let line = idx + 1;
            let text = raw_line.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }
            let op = if let Some(captures) = read_regex.captures(text) {
                let Some(addr_str) = captures.get(1) else {
                    return Err(ParseError::InvalidRead { line });
                };
                let addr = parse_number(addr_str.as_str(), line)?;
                let expect = match captures.get(2) {
                    Some(expect_str) => Some(parse_data(expect_str.as_str(), line)?),
                    None => None,
                };
                TraceOp::Read { addr, expect }
            } else if let Some(captures) = write_regex.captures(text) {
                let (Some(addr_str), Some(data_str)) = (captures.get(1), captures.get(2)) else {
                    return Err(ParseError::InvalidWrite { line });
                };
                let addr = parse_number(addr_str.as_str(), line)?;
                let data = parse_data(data_str.as_str(), line)?;
                let lanes = match captures.get(3) {
                    Some(lanes_str) => parse_lanes(lanes_str.as_str()),
                    None => ByteLanes::all(),
                };
                TraceOp::Write { addr, data, lanes }
            } else if reset_regex.is_match(text) {
                TraceOp::Reset
            } else if text.starts_with(['R', 'r']) {
                return Err(ParseError::InvalidRead { line });
            } else if text.starts_with(['W', 'w']) {
                return Err(ParseError::InvalidWrite { line });
            } else {
                return Err(ParseError::UnknownOp { line });
            };
            ops.push(TraceLine { line, op });
        }
        Ok(Trace { ops })
    }
}

fn parse_number(s: &str, line: usize) -> Result<u32, ParseError> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if let Some(hex) = s.strip_prefix('$') {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|_| ParseError::InvalidNumber { line })
}

fn parse_data(s: &str, line: usize) -> Result<u16, ParseError> {
    let value = parse_number(s, line)?;
    u16::try_from(value).map_err(|_| ParseError::DataTooWide { line })
}

fn parse_lanes(s: &str) -> ByteLanes {
    let mut lanes = ByteLanes::empty();
    if s.contains(['L', 'l']) {
        lanes.insert(ByteLanes::Lower);
    }
    if s.contains(['U', 'u']) {
        lanes.insert(ByteLanes::Upper);
    }
    lanes
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    UnknownOp { line: usize },
    InvalidRead { line: usize },
    InvalidWrite { line: usize },
    InvalidNumber { line: usize },
    DataTooWide { line: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownOp { line } => write!(f, "line {}: unknown operation", line),
            ParseError::InvalidRead { line } => write!(f, "line {}: malformed read", line),
            ParseError::InvalidWrite { line } => write!(f, "line {}: malformed write", line),
            ParseError::InvalidNumber { line } => write!(f, "line {}: invalid number", line),
            ParseError::DataTooWide { line } => write!(f, "line {}: data wider than 16 bits", line),
        }
    }
}

impl std::error::Error for ParseError {}
