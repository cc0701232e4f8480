//! Git operations abstraction layer
//!
//! The [Repository] trait covers exactly the version-control primitives
//! the bump orchestration needs: branch bookkeeping, index moves, tree
//! checkout from a prior commit, no-fast-forward merge and the
//! merge-collapse step. Two implementations exist:
//!
//! - [repository::Git2Repository]: the real backend using the `git2` crate
//! - [mock::MockRepository]: an in-memory backend for testing the
//!   orchestration sequence without touching a real repository

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::{Path, PathBuf};

use git2::Oid;

use crate::error::Result;

/// Version-control backend consumed by the orchestrator and its
/// collaborators.
///
/// All implementors must be `Send + Sync`.
pub trait Repository: Send + Sync {
    /// Name of the currently checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// OID of the current HEAD commit
    fn head_oid(&self) -> Result<Oid>;

    /// Whether the working tree has no modified or staged entries.
    ///
    /// Untracked files do not count as dirty.
    fn is_worktree_clean(&self) -> Result<bool>;

    /// All paths known to the index, relative to the repository root
    fn tracked_paths(&self) -> Result<Vec<PathBuf>>;

    /// All tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Create a branch at the current HEAD, discarding any stale branch
    /// of the same name. Does not switch to it.
    fn force_create_branch(&self, name: &str) -> Result<()>;

    /// Check out an existing local branch.
    ///
    /// The checkout is safe, never forced: uncommitted index and
    /// working tree changes are carried over, not discarded.
    fn switch_branch(&self, name: &str) -> Result<()>;

    /// Delete a local branch
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Whether a path exists in the working tree or the index
    fn path_exists(&self, path: &Path) -> Result<bool>;

    /// Rename a tracked path in both the working tree and the index
    fn move_path(&self, from: &Path, to: &Path) -> Result<()>;

    /// Commit the current index on top of HEAD
    fn commit_index(&self, message: &str) -> Result<Oid>;

    /// Stage the tree contents of HEAD's first parent on top of the
    /// current tree, the equivalent of `git checkout HEAD^ -- .`.
    ///
    /// Paths absent from the parent tree are left in place.
    fn stage_parent_tree(&self) -> Result<()>;

    /// Merge a branch into the current branch, always creating a merge
    /// commit even when a fast-forward would be possible
    fn merge_no_ff(&self, branch: &str, message: &str) -> Result<Oid>;

    /// Drop the merge commit at the current branch tip, resetting the
    /// branch to the merge's second parent (the merged branch's tip).
    ///
    /// Fails if the tip is not a merge commit.
    fn drop_merge_commit(&self) -> Result<()>;

    /// Whether a remote with the given name is configured
    fn has_remote(&self, name: &str) -> Result<bool>;

    /// Add a remote
    fn add_remote(&self, name: &str, url: &str) -> Result<()>;

    /// Fetch all tags from a remote
    fn fetch_tags(&self, remote: &str) -> Result<()>;

    /// The repository metadata directory (`.git`), home of the
    /// first-run marker file
    fn metadata_dir(&self) -> PathBuf;
}
