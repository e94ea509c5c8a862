//! Property sub-parser (component E, spec.md §4.1).
//!
//! Reads `K`/`V`/`D` records until a line equal to `PROPS-END`, dispatching
//! the handful of svn properties the core cares about. Everything else is
//! silently ignored, matching spec.md's tolerance for unknown property
//! keys.

use crate::context::{NodeCtx, RevCtx};
use crate::error::ParseError;
use crate::mode::Mode;
use crate::reader::LineReader;
use std::io::Read;

/// Which scope a property block is being parsed into.
pub enum PropTarget<'a> {
    Revision(&'a mut RevCtx),
    Node(&'a mut NodeCtx),
}

/// Parse a `K/V/D ... PROPS-END` block from `reader`, dispatching recognized
/// keys into `target`.
pub fn parse_properties<R: Read>(
    reader: &mut LineReader<R>,
    target: &mut PropTarget,
) -> Result<(), ParseError> {
    // Scoped to a single property block: svn:executable and svn:special
    // share this flag (spec.md §4.1's documented simplification), so a
    // block that sets both is rejected rather than silently picking one.
    let mut type_was_set = false;

    loop {
        let line = reader
            .read_line()?
            .ok_or_else(|| ParseError::format("EOF inside property block"))?
            .to_vec();

        if line == b"PROPS-END" {
            return Ok(());
        }

        let (tag, len) = parse_tag_len(&line)?;
        match tag {
            b'K' => {
                let key = read_value(reader, len)?;
                let kv_line = reader
                    .read_line()?
                    .ok_or_else(|| ParseError::format("EOF after property key, expected V record"))?
                    .to_vec();
                let (vtag, vlen) = parse_tag_len(&kv_line)?;
                if vtag != b'V' {
                    return Err(ParseError::format(format!(
                        "expected a V record after K, found {:?}",
                        vtag as char
                    )));
                }
                let value = read_value(reader, vlen)?;
                dispatch(target, &key, Some(&value), &mut type_was_set)?;
            }
            b'D' => {
                let key = read_value(reader, len)?;
                dispatch(target, &key, None, &mut type_was_set)?;
            }
            other => {
                return Err(ParseError::format(format!(
                    "unknown property record type {:?}",
                    other as char
                )));
            }
        }
    }
}

/// Parse a `<T> <len>` header line, e.g. `K 15`.
fn parse_tag_len(line: &[u8]) -> Result<(u8, usize), ParseError> {
    if line.len() < 3 || line[1] != b' ' {
        return Err(ParseError::format(format!(
            "malformed property record header {:?}",
            String::from_utf8_lossy(line)
        )));
    }
    let tag = line[0];
    let len_str = std::str::from_utf8(&line[2..])
        .map_err(|_| ParseError::format("non-utf8 property record length"))?;
    let len: usize = len_str
        .parse()
        .map_err(|_| ParseError::format(format!("malformed property record length {:?}", len_str)))?;
    Ok((tag, len))
}

/// Read exactly `len` bytes of value plus the mandatory trailing newline.
fn read_value<R: Read>(reader: &mut LineReader<R>, len: usize) -> Result<Vec<u8>, ParseError> {
    let mut buf = vec![0u8; len];
    reader.read_binary(&mut buf)?;
    match reader.read_char()? {
        Some(b'\n') => Ok(buf),
        _ => Err(ParseError::format(
            "missing trailing newline after property value",
        )),
    }
}

fn dispatch(
    target: &mut PropTarget,
    key: &[u8],
    value: Option<&[u8]>,
    type_was_set: &mut bool,
) -> Result<(), ParseError> {
    match target {
        PropTarget::Revision(rev) => dispatch_revision(rev, key, value),
        PropTarget::Node(node) => dispatch_node(node, key, value, type_was_set),
    }
}

fn dispatch_revision(rev: &mut RevCtx, key: &[u8], value: Option<&[u8]>) -> Result<(), ParseError> {
    match key {
        b"svn:log" => match value {
            Some(v) => {
                rev.log = v.to_vec();
                Ok(())
            }
            None => Err(ParseError::format("svn:log cannot be unset")),
        },
        b"svn:author" => {
            rev.author = value.map(|v| v.to_vec()).unwrap_or_default();
            Ok(())
        }
        b"svn:date" => match value {
            Some(v) => {
                match parse_svn_date(v) {
                    Some(ts) => rev.timestamp = ts,
                    None => tracing::warn!(
                        "unparseable svn:date {:?}, keeping prior timestamp",
                        String::from_utf8_lossy(v)
                    ),
                }
                Ok(())
            }
            None => Err(ParseError::format("svn:date cannot be unset")),
        },
        _ => Ok(()),
    }
}

fn dispatch_node(
    node: &mut NodeCtx,
    key: &[u8],
    value: Option<&[u8]>,
    type_was_set: &mut bool,
) -> Result<(), ParseError> {
    match key {
        b"svn:executable" => set_type(node, Mode::Executable, value.is_some(), type_was_set),
        b"svn:special" => set_type(node, Mode::Symlink, value.is_some(), type_was_set),
        _ => Ok(()),
    }
}

fn set_type(
    node: &mut NodeCtx,
    mode_if_set: Mode,
    present: bool,
    type_was_set: &mut bool,
) -> Result<(), ParseError> {
    if present {
        if *type_was_set {
            return Err(ParseError::TypeSetTwice);
        }
        node.kind = Some(mode_if_set);
        *type_was_set = true;
    } else if !*type_was_set {
        node.kind = Some(Mode::RegularFile);
    }
    Ok(())
}

/// svn dump timestamps are ISO-8601/RFC-3339 (`2011-11-20T19:12:49.130445Z`).
pub(crate) fn parse_svn_date(bytes: &[u8]) -> Option<i64> {
    let s = std::str::from_utf8(bytes).ok()?;
    chrono::DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.timestamp())
}
