//! Repo tree (component C, spec.md §6): tracks per-path mode and content
//! mark across revisions, and accumulates the file-level changes a
//! revision's nodes produce so the revision framer can hand them to the
//! emitter.

use crate::mode::Mode;
use crate::path::{Path, StringPool};
use std::collections::BTreeMap;

/// The mode and content mark stored for a path in the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    mode: Mode,
    mark: u32,
}

/// One file-level mutation queued for the next commit record. Directories
/// never appear here — git has no directory objects, so only file
/// adds/changes/deletes are tracked for export.
#[derive(Debug, Clone)]
pub enum FileChange {
    Modify { path: String, mode: Mode, mark: u32 },
    Delete { path: String },
}

/// Tracks `(revision, path) -> (mode, mark)` and the pending file changes
/// for the revision currently being built.
pub struct RepoTree {
    /// Frozen snapshots, indexed by revision number: `snapshots[r]` is the
    /// tree state immediately after revision `r` committed.
    snapshots: Vec<BTreeMap<Vec<u32>, Entry>>,
    /// The in-progress tree, mutated by the nodes of the current revision.
    working: BTreeMap<Vec<u32>, Entry>,
    /// File-level changes accumulated since the last `commit`.
    pending: Vec<FileChange>,
}

impl Default for RepoTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RepoTree {
    pub fn new() -> Self {
        Self {
            snapshots: vec![BTreeMap::new()],
            working: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn key(path: &Path) -> Vec<u32> {
        path.ids().to_vec()
    }

    /// The mode currently recorded for `path`, or `None` if it doesn't
    /// exist in the working tree.
    pub fn read_mode(&self, path: &Path) -> Option<Mode> {
        self.working.get(&Self::key(path)).map(|e| e.mode)
    }

    /// The content mark currently recorded for `path`, or `0` ("no
    /// content") if it doesn't exist.
    pub fn read_path(&self, path: &Path) -> u32 {
        self.working.get(&Self::key(path)).map(|e| e.mark).unwrap_or(0)
    }

    /// Remove `path` and everything beneath it from the working tree.
    pub fn delete(&mut self, pool: &StringPool, path: &Path) {
        let prefix = Self::key(path);
        let victims: Vec<_> = self
            .working
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(prefix.as_slice()))
            .map(|(k, _)| k.clone())
            .collect();
        for k in victims {
            self.working.remove(&k);
        }
        self.pending.push(FileChange::Delete {
            path: pool.display(path),
        });
    }

    /// Copy the subtree rooted at `(src_rev, src)` to `dst` in the working
    /// tree, queuing an `M` line (reusing the source's mark, no new blob)
    /// for every file underneath.
    pub fn copy(&mut self, pool: &StringPool, src_rev: u32, src: &Path, dst: &Path) {
        let Some(snapshot) = self.snapshots.get(src_rev as usize) else {
            return;
        };
        let prefix = Self::key(src);
        let entries: Vec<_> = snapshot
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(prefix.as_slice()))
            .map(|(k, e)| (k.clone(), *e))
            .collect();

        let dst_prefix = Self::key(dst);
        for (k, entry) in entries {
            let mut new_key = dst_prefix.clone();
            new_key.extend_from_slice(&k[prefix.len()..]);
            if !entry.mode.is_dir() {
                let new_path = Path::from_ids(new_key.clone());
                self.pending.push(FileChange::Modify {
                    path: pool.display(&new_path),
                    mode: entry.mode,
                    mark: entry.mark,
                });
            }
            self.working.insert(new_key, entry);
        }
    }

    /// Record `path` as having mode `mode` and content mark `mark`. Queues
    /// an `M` line unless `mode` is `Dir`.
    pub fn add(&mut self, pool: &StringPool, path: &Path, mode: Mode, mark: u32) {
        self.working.insert(Self::key(path), Entry { mode, mark });
        if !mode.is_dir() {
            self.pending.push(FileChange::Modify {
                path: pool.display(path),
                mode,
                mark,
            });
        }
    }

    /// Freeze the working tree as revision `rev` and return the file-level
    /// changes accumulated since the previous commit. The caller decides
    /// whether to actually emit a commit record (revision 0 never does —
    /// spec.md §3).
    pub fn commit(&mut self, rev: u32) -> Vec<FileChange> {
        let idx = rev as usize;
        if self.snapshots.len() <= idx {
            self.snapshots.resize(idx + 1, BTreeMap::new());
        }
        self.snapshots[idx] = self.working.clone();
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(pool: &mut StringPool, s: &str) -> Path {
        pool.intern_path(s).unwrap()
    }

    #[test]
    fn add_then_read_mode_round_trips() {
        let mut pool = StringPool::new();
        let mut tree = RepoTree::new();
        let p = path(&mut pool, "README");
        tree.add(&pool, &p, Mode::RegularFile, 1);
        assert_eq!(tree.read_mode(&p), Some(Mode::RegularFile));
        assert_eq!(tree.read_path(&p), 1);
    }

    #[test]
    fn delete_removes_subtree() {
        let mut pool = StringPool::new();
        let mut tree = RepoTree::new();
        let dir = path(&mut pool, "trunk");
        let file = path(&mut pool, "trunk/a.txt");
        tree.add(&pool, &dir, Mode::Dir, 0);
        tree.add(&pool, &file, Mode::RegularFile, 1);
        tree.delete(&pool, &dir);
        assert_eq!(tree.read_mode(&file), None);
    }

    #[test]
    fn copy_reuses_source_mark_for_every_file() {
        let mut pool = StringPool::new();
        let mut tree = RepoTree::new();
        let a = path(&mut pool, "A");
        tree.add(&pool, &a, Mode::RegularFile, 7);
        tree.commit(1);

        let b = path(&mut pool, "B");
        tree.copy(&pool, 1, &a, &b);
        assert_eq!(tree.read_mode(&b), Some(Mode::RegularFile));
        assert_eq!(tree.read_path(&b), 7);
    }

    #[test]
    fn commit_returns_and_clears_pending_changes() {
        let mut pool = StringPool::new();
        let mut tree = RepoTree::new();
        let a = path(&mut pool, "A");
        tree.add(&pool, &a, Mode::RegularFile, 1);
        let changes = tree.commit(1);
        assert_eq!(changes.len(), 1);
        assert!(tree.commit(2).is_empty());
    }

    #[test]
    fn directory_adds_produce_no_file_change() {
        let mut pool = StringPool::new();
        let mut tree = RepoTree::new();
        let dir = path(&mut pool, "trunk");
        tree.add(&pool, &dir, Mode::Dir, 0);
        assert!(tree.commit(1).is_empty());
    }
}
