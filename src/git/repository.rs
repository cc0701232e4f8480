use std::fs;
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{
    BranchType, ObjectType, Oid, Repository as Git2Repo, StatusOptions, TreeWalkMode,
    TreeWalkResult,
};

use crate::error::{KernelBumpError, Result};

/// Real [super::Repository] backend built on the `git2` crate.
pub struct Git2Repository {
    repo: Git2Repo,
    workdir: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository.
    ///
    /// Bare repositories are rejected: the bump operates on a working
    /// tree.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                KernelBumpError::precondition("repository is bare, no working tree to bump")
            })?
            .to_path_buf();

        Ok(Git2Repository { repo, workdir })
    }

    /// Root of the working tree
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>> {
        Ok(self.repo.head()?.peel_to_commit()?)
    }
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        head.shorthand()
            .map(|s| s.to_string())
            .ok_or_else(|| KernelBumpError::branch("HEAD is not on a named branch"))
    }

    fn head_oid(&self) -> Result<Oid> {
        let head = self.repo.head()?;
        head.target()
            .ok_or_else(|| KernelBumpError::branch("HEAD is detached or invalid"))
    }

    fn is_worktree_clean(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses.is_empty())
    }

    fn tracked_paths(&self) -> Result<Vec<PathBuf>> {
        let index = self.repo.index()?;
        Ok(index
            .iter()
            .filter_map(|entry| String::from_utf8(entry.path).ok())
            .map(PathBuf::from)
            .collect())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;
        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn force_create_branch(&self, name: &str) -> Result<()> {
        let head = self.head_commit()?;
        self.repo.branch(name, &head, true).map_err(|e| {
            KernelBumpError::branch(format!("Cannot create branch '{}': {}", name, e))
        })?;
        Ok(())
    }

    fn switch_branch(&self, name: &str) -> Result<()> {
        let reference = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|e| KernelBumpError::branch(format!("Cannot find branch '{}': {}", name, e)))?
            .into_reference();
        let target = reference.peel(ObjectType::Commit)?;

        // Safe checkout against the current HEAD as baseline: committed
        // differences update the working tree, while staged changes from
        // an aborted run are carried over instead of being discarded.
        self.repo.checkout_tree(&target, None)?;
        self.repo.set_head(&format!("refs/heads/{}", name))?;
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|e| KernelBumpError::branch(format!("Cannot find branch '{}': {}", name, e)))?;
        branch.delete()?;
        Ok(())
    }

    fn path_exists(&self, path: &Path) -> Result<bool> {
        if self.workdir.join(path).exists() {
            return Ok(true);
        }
        let index = self.repo.index()?;
        Ok(index.get_path(path, 0).is_some())
    }

    fn move_path(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(self.workdir.join(from), self.workdir.join(to))?;

        let mut index = self.repo.index()?;
        index.remove_path(from)?;
        index.add_path(to)?;
        index.write()?;
        Ok(())
    }

    fn commit_index(&self, message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;

        let signature = self.repo.signature()?;
        let parent = self.head_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;
        Ok(oid)
    }

    fn stage_parent_tree(&self) -> Result<()> {
        let head = self.head_commit()?;
        let parent = head.parent(0).map_err(|e| {
            KernelBumpError::branch(format!("HEAD has no parent to restore from: {}", e))
        })?;
        let tree = parent.tree()?;

        // Write every blob of the parent tree back into the working tree
        // and stage it. Paths only present in HEAD's tree are not touched,
        // matching `git checkout <parent> -- .` overlay semantics.
        let mut index = self.repo.index()?;
        let mut walk_err: Option<KernelBumpError> = None;

        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() != Some(ObjectType::Blob) {
                return TreeWalkResult::Ok;
            }
            let name = match entry.name() {
                Some(n) => n,
                None => return TreeWalkResult::Ok,
            };
            let rel = PathBuf::from(dir).join(name);

            let restore = (|| -> Result<()> {
                let blob = self.repo.find_blob(entry.id())?;
                let dest = self.workdir.join(&rel);
                if let Some(dir) = dest.parent() {
                    fs::create_dir_all(dir)?;
                }
                fs::write(&dest, blob.content())?;
                index.add_path(&rel)?;
                Ok(())
            })();

            match restore {
                Ok(()) => TreeWalkResult::Ok,
                Err(e) => {
                    walk_err = Some(e);
                    TreeWalkResult::Abort
                }
            }
        })?;

        if let Some(e) = walk_err {
            return Err(e);
        }

        index.write()?;
        Ok(())
    }

    fn merge_no_ff(&self, branch: &str, message: &str) -> Result<Oid> {
        let ours = self.head_commit()?;
        let theirs = self
            .repo
            .find_branch(branch, BranchType::Local)
            .map_err(|e| KernelBumpError::branch(format!("Cannot find branch '{}': {}", branch, e)))?
            .into_reference()
            .peel_to_commit()?;

        let mut merged = self.repo.merge_commits(&ours, &theirs, None)?;
        if merged.has_conflicts() {
            return Err(KernelBumpError::branch(format!(
                "Merge of '{}' produced conflicts",
                branch
            )));
        }

        let tree_oid = merged.write_tree_to(&self.repo)?;
        let tree = self.repo.find_tree(tree_oid)?;
        let signature = self.repo.signature()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&ours, &theirs],
        )?;

        // Bring index and working tree in line with the merge result
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().force()))?;
        Ok(oid)
    }

    fn drop_merge_commit(&self) -> Result<()> {
        let head = self.head_commit()?;
        if head.parent_count() != 2 {
            return Err(KernelBumpError::branch(
                "branch tip is not a merge commit, nothing to collapse",
            ));
        }

        let restore = head.parent(1)?;
        self.repo
            .reset(restore.as_object(), git2::ResetType::Hard, None)?;
        Ok(())
    }

    fn has_remote(&self, name: &str) -> Result<bool> {
        Ok(self.repo.find_remote(name).is_ok())
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.repo.remote(name, url)?;
        Ok(())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| KernelBumpError::config(format!("Cannot find remote: {}", e)))?;

        remote.fetch(&["+refs/tags/*:refs/tags/*"], None, None)?;
        Ok(())
    }

    fn metadata_dir(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }
}

// SAFETY: Git2Repository wraps git2::Repository which is Send + Sync.
// git2 library is thread-safe for read operations via libgit2's thread-safe design.
unsafe impl Sync for Git2Repository {}
