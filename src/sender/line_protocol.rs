use crate::config::Precision;
use crate::domain::{FieldValue, Point};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Encodes one point as a line protocol line, without the trailing newline.
///
/// Returns `None` when nothing writable remains: a point needs at least one
/// field, and non-finite floats are not representable.
pub fn encode_point(point: &Point, precision: Precision) -> Option<String> {
    let mut line = String::with_capacity(64 + point.fields.len() * 16);
    escape_name(&mut line, &point.measurement, &[',', ' ']);

    for (key, value) in &point.tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        line.push(',');
        escape_name(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape_name(&mut line, value, &[',', '=', ' ']);
    }

    let mut separator = ' ';
    for (key, value) in &point.fields {
        if key.is_empty() {
            continue;
        }
        if let FieldValue::Float(f) = value
            && !f.is_finite()
        {
            continue;
        }
        line.push(separator);
        separator = ',';
        escape_name(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        write_field_value(&mut line, value);
    }
    if separator == ' ' {
        return None;
    }

    line.push(' ');
    let _ = write!(line, "{}", timestamp(&point.timestamp, precision));
    Some(line)
}

/// Encodes a batch, one point per line. Points that cannot be encoded are
/// left out.
pub fn encode_batch(points: &[Point], precision: Precision) -> String {
    let mut body = String::new();
    for line in points.iter().filter_map(|p| encode_point(p, precision)) {
        body.push_str(&line);
        body.push('\n');
    }
    body
}

pub fn timestamp(time: &DateTime<Utc>, precision: Precision) -> i64 {
    match precision {
        Precision::Nanoseconds => unix_nanos(time),
        Precision::Microseconds => time.timestamp_micros(),
        Precision::Milliseconds => time.timestamp_millis(),
        Precision::Seconds => time.timestamp(),
    }
}

/// Nanoseconds since the epoch, saturating outside the range an `i64` can
/// hold (roughly years 1677 to 2262).
pub fn unix_nanos(time: &DateTime<Utc>) -> i64 {
    time.timestamp_nanos_opt().unwrap_or(if time.timestamp() < 0 {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn write_field_value(line: &mut String, value: &FieldValue) {
    match value {
        FieldValue::Integer(i) => {
            let _ = write!(line, "{i}i");
        }
        FieldValue::UInteger(u) => {
            let _ = write!(line, "{u}u");
        }
        FieldValue::Float(f) => {
            let _ = write!(line, "{f}");
        }
        FieldValue::Boolean(b) => {
            let _ = write!(line, "{b}");
        }
        FieldValue::String(s) => {
            line.push('"');
            escape_into(line, s, &['"', '\\']);
            line.push('"');
        }
    }
}

/// Escapes a measurement, tag or field key. Line breaks and tabs are written
/// as `\n`, `\r` and `\t` so a point always stays on one line, and a
/// trailing backslash is doubled so it cannot escape the following separator.
fn escape_name(out: &mut String, raw: &str, special: &[char]) {
    for c in raw.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => {
                if special.contains(&c) {
                    out.push('\\');
                }
                out.push(c);
            }
        }
    }
    if raw.ends_with('\\') {
        out.push('\\');
    }
}

fn escape_into(out: &mut String, raw: &str, special: &[char]) {
    for c in raw.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
