//! Transient per-scope state: `DumpCtx`, `RevCtx`, `NodeCtx` (spec.md §3).
//!
//! These used to be file-scope mutable globals in the source (spec.md §9).
//! Here they are plain fields owned by [`crate::parser::DumpTranslator`],
//! reset/consumed at the scope boundaries spec.md §3 describes.

use crate::mode::{Mode, NodeAction};
use crate::path::Path;

/// Dump-wide metadata. Lives for one [`crate::parser::DumpTranslator::read`]
/// call.
#[derive(Debug, Default)]
pub struct DumpCtx {
    pub version: u32,
    pub uuid: String,
}

/// Per-revision metadata. Reset on each `Revision-number` header and
/// consumed when the next revision or EOF is seen.
#[derive(Debug, Default)]
pub struct RevCtx {
    pub revision: u32,
    pub timestamp: i64,
    pub log: Vec<u8>,
    pub author: Vec<u8>,
}

impl RevCtx {
    pub fn reset(&mut self, revision: u32) {
        self.revision = revision;
        self.timestamp = 0;
        self.log.clear();
        self.author.clear();
    }
}

/// Per-node transient state. Reset on each `Node-path` header and consumed
/// by a `Content-length` header or by the next `Node-path`/
/// `Revision-number`/EOF.
#[derive(Debug, Default, Clone)]
pub struct NodeCtx {
    pub action: NodeAction,
    pub kind: Option<Mode>,
    pub dst: Option<Path>,
    pub src: Option<Path>,
    pub src_rev: Option<u32>,
    pub prop_length: Option<u64>,
    pub text_length: Option<u64>,
    pub text_delta: bool,
    pub prop_delta: bool,
}

impl NodeCtx {
    pub fn reset(&mut self, dst: Path) {
        *self = NodeCtx {
            dst: Some(dst),
            ..NodeCtx::default()
        };
    }
}
