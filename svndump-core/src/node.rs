//! Node resolver (component F, spec.md §4.2): applies one completed node
//! record against the repo tree and emitter.

use crate::context::NodeCtx;
use crate::emitter::Emitter;
use crate::error::ParseError;
use crate::mode::{Mode, NodeAction};
use crate::path::StringPool;
use crate::properties::{parse_properties, PropTarget};
use crate::reader::LineReader;
use crate::tree::RepoTree;
use std::io::{Read, Write};

/// Finalize `node`: resolve its action and mode, run its property block (if
/// any) and stream its text body (if any) to `emitter`, then commit the
/// result to `tree`.
///
/// Called once a node's `Content-length` header (or the scope-closing
/// sentinel that ends it without a body) has been seen.
pub fn finalize_node<R: Read, W: Write>(
    node: &mut NodeCtx,
    pool: &mut StringPool,
    tree: &mut RepoTree,
    emitter: &mut Emitter<W>,
    reader: &mut LineReader<R>,
) -> Result<(), ParseError> {
    let dst = node.dst.clone().expect("node_ctx reset always sets dst");
    let dst_display = pool.display(&dst);

    if node.text_delta {
        return Err(ParseError::TextDelta { path: dst_display });
    }

    let mut mark = if node.text_length.is_some() {
        emitter.next_blob_mark()
    } else {
        0
    };

    let mut action = node.action;

    if action == NodeAction::Delete {
        if node.text_length.is_some() || node.prop_length.is_some() || node.src.is_some() {
            return Err(ParseError::DeleteWithBody { path: dst_display });
        }
        tree.delete(pool, &dst);
        return Ok(());
    }

    if action == NodeAction::Replace {
        tree.delete(pool, &dst);
        action = NodeAction::Add;
    }

    if let (Some(src), Some(src_rev)) = (node.src.clone(), node.src_rev) {
        if src_rev > 0 {
            tree.copy(pool, src_rev, &src, &dst);
            if action == NodeAction::Add {
                action = NodeAction::Change;
            }
        }
    }

    if node.text_length.is_some() && node.kind == Some(Mode::Dir) {
        return Err(ParseError::TextOnDirectory { path: dst_display });
    }

    // Captured before mode resolution overwrites `node.kind` with the prior
    // tree state, so a non-delta property block can revert to it below.
    let pre_property_kind = node.kind;

    match action {
        NodeAction::Change if dst.is_root() => {
            if node.kind != Some(Mode::Dir) {
                return Err(ParseError::RootChangeNotDir);
            }
        }
        NodeAction::Change => {
            if node.text_length.is_none() {
                mark = tree.read_path(&dst);
            }
            let prior = tree.read_mode(&dst);
            if let (Some(prior_mode), Some(claimed)) = (prior, node.kind) {
                if prior_mode.is_dir() != claimed.is_dir() {
                    return Err(ParseError::ModeConflict {
                        path: dst_display.clone(),
                        expected: prior_mode.kind_name(),
                        found: claimed.kind_name(),
                    });
                }
            }
            node.kind = prior.or(node.kind);
        }
        NodeAction::Add => {
            if node.kind != Some(Mode::Dir) && node.text_length.is_none() {
                return Err(ParseError::AddRequiresText { path: dst_display });
            }
        }
        NodeAction::Unknown => {
            return Err(ParseError::UnresolvedAction { path: dst_display });
        }
        NodeAction::Delete | NodeAction::Replace => unreachable!("handled above"),
    }

    if let Some(prop_length) = node.prop_length {
        if !node.prop_delta {
            node.kind = pre_property_kind;
        }
        if prop_length > 0 {
            let mut target = PropTarget::Node(node);
            parse_properties(reader, &mut target)?;
        }
    }

    let effective_mode = node.kind.unwrap_or(Mode::RegularFile);
    tree.add(pool, &dst, effective_mode, mark);

    if let Some(text_length) = node.text_length {
        emitter.blob(mark, text_length, reader)?;
    }

    Ok(())
}
