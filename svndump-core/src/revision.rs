//! Revision framer (component H, spec.md §4.4).

use crate::context::RevCtx;
use crate::emitter::Emitter;
use crate::tree::RepoTree;
use std::io::{self, Write};

/// Freeze the working tree as `rev.revision` and, for revisions `>= 1`, hand
/// the accumulated file changes to the emitter as one commit. Revision 0
/// carries only dump-wide properties (`UUID`) and never commits.
pub fn finalize_revision<W: Write>(
    rev: &RevCtx,
    uuid: &str,
    url: &str,
    tree: &mut RepoTree,
    emitter: &mut Emitter<W>,
) -> io::Result<()> {
    let changes = tree.commit(rev.revision);
    if rev.revision == 0 {
        return Ok(());
    }
    let author = String::from_utf8_lossy(&rev.author).into_owned();
    emitter.commit(
        rev.revision,
        &author,
        &rev.log,
        uuid,
        url,
        rev.timestamp,
        &changes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_zero_commits_tree_but_emits_nothing() {
        let mut tree = RepoTree::new();
        let mut emitter = Emitter::new(Vec::new(), "master");
        let rev = RevCtx::default();
        finalize_revision(&rev, "uuid", "https://example/repo", &mut tree, &mut emitter).unwrap();
        assert!(emitter.into_inner().is_empty());
    }

    #[test]
    fn revision_one_emits_a_commit() {
        let mut tree = RepoTree::new();
        let mut emitter = Emitter::new(Vec::new(), "master");
        let mut rev = RevCtx::default();
        rev.reset(1);
        rev.author = b"jane".to_vec();
        rev.log = b"init".to_vec();
        finalize_revision(&rev, "uuid", "https://example/repo", &mut tree, &mut emitter).unwrap();
        let out = String::from_utf8(emitter.into_inner()).unwrap();
        assert!(out.contains("commit refs/heads/master"));
        assert!(out.contains("jane"));
    }
}
