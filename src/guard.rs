use std::fs;
use std::path::Path;

use git2::Oid;

use crate::error::{KernelBumpError, Result};
use crate::git::Repository;
use crate::ui;

/// Refuse to run with modified or staged entries in the working tree.
///
/// Untracked files are tolerated.
pub fn ensure_clean(repo: &dyn Repository) -> Result<()> {
    if repo.is_worktree_clean()? {
        Ok(())
    } else {
        Err(KernelBumpError::precondition(
            "working tree has uncommitted changes, commit or stash them first",
        ))
    }
}

/// Weak sanity check that the repository root looks like a kernel
/// source tree: a Makefile carrying a VERSION assignment.
pub fn ensure_kernel_root(workdir: &Path) -> Result<()> {
    let makefile = workdir.join("Makefile");
    if !makefile.exists() {
        return Err(KernelBumpError::precondition(
            "no Makefile at the repository root, this does not look like a kernel source tree",
        ));
    }

    let contents = fs::read_to_string(&makefile)?;
    let has_version_marker = contents
        .lines()
        .any(|line| line.trim_start().starts_with("VERSION") && line.contains('='));

    if has_version_marker {
        Ok(())
    } else {
        Err(KernelBumpError::precondition(
            "Makefile has no VERSION marker, this does not look like a kernel source tree",
        ))
    }
}

/// Scoped guarantee that the repository ends up back on the branch it
/// started on.
///
/// Captures the starting branch and HEAD commit before any mutation.
/// On drop (success, propagated error or early return alike) it
/// switches back to the original branch if the current branch differs.
/// Restores only the branch pointer: commits, branches and staged
/// moves left by a failed run stay behind for manual inspection.
pub struct BranchGuard<'a> {
    repo: &'a dyn Repository,
    original_branch: String,
    original_head: Oid,
}

impl<'a> BranchGuard<'a> {
    pub fn acquire(repo: &'a dyn Repository) -> Result<Self> {
        let original_branch = repo.current_branch()?;
        let original_head = repo.head_oid()?;
        Ok(BranchGuard {
            repo,
            original_branch,
            original_head,
        })
    }

    pub fn original_branch(&self) -> &str {
        &self.original_branch
    }

    pub fn original_head(&self) -> Oid {
        self.original_head
    }
}

impl Drop for BranchGuard<'_> {
    fn drop(&mut self) {
        let current = match self.repo.current_branch() {
            Ok(branch) => branch,
            Err(_) => return,
        };

        if current != self.original_branch {
            if let Err(e) = self.repo.switch_branch(&self.original_branch) {
                ui::display_warning(&format!(
                    "could not switch back to branch '{}': {}",
                    self.original_branch, e
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    #[test]
    fn test_ensure_clean() {
        let repo = MockRepository::with_tree("master", &[("Makefile", "VERSION = 6\n")]);
        assert!(ensure_clean(&repo).is_ok());

        repo.set_dirty();
        assert!(ensure_clean(&repo).is_err());
    }

    #[test]
    fn test_ensure_kernel_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_kernel_root(dir.path()).is_err());

        std::fs::write(dir.path().join("Makefile"), "all:\n\ttrue\n").unwrap();
        assert!(ensure_kernel_root(dir.path()).is_err());

        std::fs::write(
            dir.path().join("Makefile"),
            "VERSION = 6\nPATCHLEVEL = 1\nSUBLEVEL = 21\n",
        )
        .unwrap();
        assert!(ensure_kernel_root(dir.path()).is_ok());
    }

    #[test]
    fn test_guard_restores_branch_on_drop() {
        let repo = MockRepository::with_tree("master", &[("Makefile", "VERSION = 6\n")]);
        repo.force_create_branch("work").unwrap();

        {
            let guard = BranchGuard::acquire(&repo).unwrap();
            assert_eq!(guard.original_branch(), "master");
            repo.switch_branch("work").unwrap();
        }

        assert_eq!(repo.current_branch().unwrap(), "master");
    }

    #[test]
    fn test_guard_restore_keeps_staged_changes() {
        let repo = MockRepository::with_tree("master", &[("config-6.1.21-x86_64", "cfg")]);
        repo.force_create_branch("work").unwrap();

        {
            let _guard = BranchGuard::acquire(&repo).unwrap();
            repo.switch_branch("work").unwrap();
            repo.move_path(
                Path::new("config-6.1.21-x86_64"),
                Path::new("config-6.1.26-x86_64"),
            )
            .unwrap();
        }

        // Back on the original branch with the staged move intact
        assert_eq!(repo.current_branch().unwrap(), "master");
        assert_eq!(
            repo.worktree_content("config-6.1.26-x86_64").as_deref(),
            Some("cfg")
        );
        assert!(repo.worktree_content("config-6.1.21-x86_64").is_none());
    }

    #[test]
    fn test_guard_noop_when_branch_unchanged() {
        let repo = MockRepository::with_tree("master", &[("Makefile", "VERSION = 6\n")]);
        let head = repo.head_oid().unwrap();

        {
            let guard = BranchGuard::acquire(&repo).unwrap();
            assert_eq!(guard.original_head(), head);
        }

        // No switch_branch call recorded
        assert!(!repo
            .operations()
            .iter()
            .any(|op| op.starts_with("switch_branch")));
    }
}
