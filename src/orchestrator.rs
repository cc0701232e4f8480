//! The version-bump orchestration sequence.
//!
//! Migrating the version-named files is a plain set of renames; the
//! value of this module is the exact order of version-control
//! operations around them. A single rename commit would let rename
//! detection tie the new files to the old ones, so `git log --follow`
//! and `git bisect` would conflate the two version lines. Instead the
//! bump is shaped as a two-commit fragment on a transient branch:
//!
//! 1. move every eligible file to its target-version name and commit
//! 2. check the pre-move tree back out on top of the move and commit
//!
//! The fragment is merged back without fast-forward, the transient
//! branch is deleted, and the merge commit is collapsed away so the
//! restore commit becomes the branch tip. The result reads as: the
//! old-version files untouched, the new-version files a fresh
//! addition, both lines independently traceable.
//!
//! There is no rollback inside the sequence. Any failure aborts the
//! run and leaves the intermediate state behind for inspection; only
//! the caller's branch guard restores the original branch pointer.

use std::path::PathBuf;

use git2::Oid;

use crate::error::{KernelBumpError, Result};
use crate::git::Repository;
use crate::paths::{self, VersionToken};
use crate::version::KernelVersion;

/// Transient branch hosting the move/restore commit pair.
///
/// Force-created at the start of every run, so a leftover from an
/// earlier aborted run is silently discarded.
pub const WORKING_BRANCH: &str = "__kernel_files_mover";

/// Immutable context for one bump run, built once after
/// flag/environment/interactive resolution.
#[derive(Debug, Clone)]
pub struct BumpContext {
    pub source: KernelVersion,
    pub target: KernelVersion,
    /// Descriptive only; never alters the orchestration
    pub platform: Option<String>,
    pub config_only: bool,
}

/// Result of a successful bump run.
#[derive(Debug, Clone)]
pub struct BumpOutcome {
    /// (source path, target path) for every file moved
    pub moved: Vec<(PathBuf, PathBuf)>,
    pub move_commit: Oid,
    pub restore_commit: Oid,
}

/// Drive the full move/restore/merge/collapse sequence.
///
/// Preconditions (enforced by the caller): clean working tree, kernel
/// source root, validated version pair.
pub fn run(repo: &dyn Repository, ctx: &BumpContext) -> Result<BumpOutcome> {
    let original_branch = repo.current_branch()?;

    repo.force_create_branch(WORKING_BRANCH)?;
    repo.switch_branch(WORKING_BRANCH)?;

    let moved = move_version_files(repo, ctx)?;

    let move_commit = repo.commit_index(&move_message(ctx))?;

    repo.stage_parent_tree()?;
    let restore_commit = repo.commit_index(&restore_message(ctx))?;

    repo.switch_branch(&original_branch)?;
    repo.merge_no_ff(WORKING_BRANCH, &merge_message())?;

    repo.delete_branch(WORKING_BRANCH)?;
    repo.drop_merge_commit()?;

    Ok(BumpOutcome {
        moved,
        move_commit,
        restore_commit,
    })
}

/// Move every tracked path matching the source version to its
/// target-version name.
///
/// A collision with an existing target path is fatal; moves staged
/// before the collision stay staged for manual inspection.
fn move_version_files(
    repo: &dyn Repository,
    ctx: &BumpContext,
) -> Result<Vec<(PathBuf, PathBuf)>> {
    let token = VersionToken::new(&ctx.source)?;
    let tracked = repo.tracked_paths()?;
    let eligible = paths::resolve(&tracked, &token, ctx.config_only);

    let mut moved = Vec::with_capacity(eligible.len());
    for (from, _kind) in eligible {
        let to = token.rewrite(&from, &ctx.target).ok_or_else(|| {
            KernelBumpError::version(format!(
                "cannot rewrite '{}' for version {}",
                from.display(),
                ctx.target
            ))
        })?;

        if repo.path_exists(&to)? {
            return Err(KernelBumpError::Collision(to));
        }

        repo.move_path(&from, &to)?;
        moved.push((from, to));
    }

    Ok(moved)
}

fn move_message(ctx: &BumpContext) -> String {
    format!(
        "Move kernel files from {source} to {target}\n\
         \n\
         This commit is automatically generated: it only renames the\n\
         version-tagged files and the tree is not expected to build at\n\
         this point.\n\
         \n\
         When bisecting across this range, skip this commit with\n\
         `git bisect skip`.\n",
        source = ctx.source,
        target = ctx.target
    )
}

fn restore_message(ctx: &BumpContext) -> String {
    format!(
        "Restore {source} kernel files\n\
         \n\
         Brings the pre-move contents back on top of the rename so the\n\
         {target} files appear as fresh additions rather than detected\n\
         renames, keeping both version lines independently traceable\n\
         with `git log --follow`.\n\
         \n\
         See https://stackoverflow.com/q/16937359 for the discussion\n\
         this history shape is based on.\n",
        source = ctx.source,
        target = ctx.target
    )
}

fn merge_message() -> String {
    format!("Merge branch '{}'", WORKING_BRANCH)
}
