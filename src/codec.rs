use std::io::{self, Write};

use crate::Record;

pub const HEADER: &str = "access-location,nanoseconds";

pub fn encode_header(wtr: &mut impl Write) -> io::Result<()> {
    writeln!(wtr, "{HEADER}")
}

/// `arr[<index>],<nanoseconds>\n`
pub fn encode_record(wtr: &mut impl Write, record: Record) -> io::Result<()> {
    writeln!(wtr, "arr[{}],{}", record.index, record.duration)
}

/// Parses one data row, with or without its trailing newline.
pub fn decode_record(line: &str) -> Option<Record> {
    let line = line.trim_end_matches(['\n', '\r']);
    let (location, duration) = line.split_once(',')?;
    let index = location.strip_prefix("arr[")?.strip_suffix(']')?;
    let index = index.parse().ok()?;
    let duration = duration.parse().ok()?;
    Some(Record { index, duration })
}
