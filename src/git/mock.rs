use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use git2::Oid;

use crate::error::{KernelBumpError, Result};

type Tree = BTreeMap<PathBuf, String>;

#[derive(Debug, Clone)]
struct MockCommit {
    oid: Oid,
    message: String,
    tree: Tree,
    parents: Vec<usize>,
}

#[derive(Debug, Default)]
struct MockState {
    commits: Vec<MockCommit>,
    branches: HashMap<String, usize>,
    current: String,
    worktree: Tree,
    tags: Vec<String>,
    remotes: Vec<String>,
    dirty: bool,
    metadata_dir: PathBuf,
    log: Vec<String>,
}

/// Mock repository for testing the orchestration sequence without a
/// real git repository.
///
/// Keeps a small in-memory commit graph and records every mutating
/// operation in an operation log so tests can assert the exact order
/// of version-control calls.
pub struct MockRepository {
    state: Mutex<MockState>,
}

fn fabricate_oid(n: usize) -> Oid {
    Oid::from_str(&format!("{:040x}", n + 1)).expect("valid hex oid")
}

impl MockRepository {
    /// Create a repository with a single initial commit on `branch`
    /// containing the given tree.
    pub fn with_tree(branch: &str, files: &[(&str, &str)]) -> Self {
        let tree: Tree = files
            .iter()
            .map(|(p, c)| (PathBuf::from(p), c.to_string()))
            .collect();

        let mut state = MockState {
            worktree: tree.clone(),
            current: branch.to_string(),
            metadata_dir: std::env::temp_dir(),
            ..MockState::default()
        };
        state.commits.push(MockCommit {
            oid: fabricate_oid(0),
            message: "Initial commit".to_string(),
            tree,
            parents: Vec::new(),
        });
        state.branches.insert(branch.to_string(), 0);

        MockRepository {
            state: Mutex::new(state),
        }
    }

    pub fn add_tag(&self, name: impl Into<String>) {
        self.state.lock().unwrap().tags.push(name.into());
    }

    pub fn set_dirty(&self) {
        self.state.lock().unwrap().dirty = true;
    }

    pub fn set_metadata_dir(&self, dir: impl Into<PathBuf>) {
        self.state.lock().unwrap().metadata_dir = dir.into();
    }

    /// The recorded operation log, oldest first
    pub fn operations(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.state.lock().unwrap().branches.contains_key(name)
    }

    /// Paths present in the working tree, sorted
    pub fn worktree_paths(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().worktree.keys().cloned().collect()
    }

    pub fn worktree_content(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .worktree
            .get(Path::new(path))
            .cloned()
    }

    /// Commit messages reachable from a branch tip via first parents,
    /// newest first.
    pub fn branch_messages(&self, branch: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut messages = Vec::new();
        let mut at = state.branches.get(branch).copied();
        while let Some(idx) = at {
            let commit = &state.commits[idx];
            messages.push(commit.message.clone());
            at = commit.parents.first().copied();
        }
        messages
    }

    /// Number of parents of the branch tip commit
    pub fn tip_parent_count(&self, branch: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .branches
            .get(branch)
            .map(|idx| state.commits[*idx].parents.len())
            .unwrap_or(0)
    }

    fn head_index(state: &MockState) -> Result<usize> {
        state
            .branches
            .get(&state.current)
            .copied()
            .ok_or_else(|| KernelBumpError::branch(format!("Branch not found: {}", state.current)))
    }
}

impl super::Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().current.clone())
    }

    fn head_oid(&self) -> Result<Oid> {
        let state = self.state.lock().unwrap();
        let idx = Self::head_index(&state)?;
        Ok(state.commits[idx].oid)
    }

    fn is_worktree_clean(&self) -> Result<bool> {
        Ok(!self.state.lock().unwrap().dirty)
    }

    fn tracked_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self.worktree_paths())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.state.lock().unwrap().tags.clone())
    }

    fn force_create_branch(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let head = Self::head_index(&state)?;
        state.branches.insert(name.to_string(), head);
        state.log.push(format!("force_create_branch {}", name));
        Ok(())
    }

    fn switch_branch(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let from = Self::head_index(&state)?;
        let to = state
            .branches
            .get(name)
            .copied()
            .ok_or_else(|| KernelBumpError::branch(format!("Branch not found: {}", name)))?;

        // Safe checkout semantics: paths that match the current tip
        // follow the target tree, uncommitted changes are carried over.
        let from_tree = state.commits[from].tree.clone();
        let mut worktree = state.commits[to].tree.clone();
        for (path, content) in &state.worktree {
            if from_tree.get(path) != Some(content) {
                worktree.insert(path.clone(), content.clone());
            }
        }
        for path in from_tree.keys() {
            if !state.worktree.contains_key(path) {
                worktree.remove(path);
            }
        }

        state.current = name.to_string();
        state.worktree = worktree;
        state.log.push(format!("switch_branch {}", name));
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .branches
            .remove(name)
            .ok_or_else(|| KernelBumpError::branch(format!("Branch not found: {}", name)))?;
        state.log.push(format!("delete_branch {}", name));
        Ok(())
    }

    fn path_exists(&self, path: &Path) -> Result<bool> {
        Ok(self.state.lock().unwrap().worktree.contains_key(path))
    }

    fn move_path(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let content = state.worktree.remove(from).ok_or_else(|| {
            KernelBumpError::precondition(format!("not a tracked path: {}", from.display()))
        })?;
        state.worktree.insert(to.to_path_buf(), content);
        state
            .log
            .push(format!("move_path {} -> {}", from.display(), to.display()));
        Ok(())
    }

    fn commit_index(&self, message: &str) -> Result<Oid> {
        let mut state = self.state.lock().unwrap();
        let head = Self::head_index(&state)?;
        let oid = fabricate_oid(state.commits.len());
        let commit = MockCommit {
            oid,
            message: message.to_string(),
            tree: state.worktree.clone(),
            parents: vec![head],
        };
        state.commits.push(commit);
        let idx = state.commits.len() - 1;
        let current = state.current.clone();
        state.branches.insert(current, idx);
        state.log.push("commit_index".to_string());
        Ok(oid)
    }

    fn stage_parent_tree(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let head = Self::head_index(&state)?;
        let parent = state.commits[head]
            .parents
            .first()
            .copied()
            .ok_or_else(|| KernelBumpError::branch("HEAD has no parent to restore from"))?;
        let parent_tree = state.commits[parent].tree.clone();
        for (path, content) in parent_tree {
            state.worktree.insert(path, content);
        }
        state.log.push("stage_parent_tree".to_string());
        Ok(())
    }

    fn merge_no_ff(&self, branch: &str, message: &str) -> Result<Oid> {
        let mut state = self.state.lock().unwrap();
        let ours = Self::head_index(&state)?;
        let theirs = state
            .branches
            .get(branch)
            .copied()
            .ok_or_else(|| KernelBumpError::branch(format!("Branch not found: {}", branch)))?;

        let oid = fabricate_oid(state.commits.len());
        let tree = state.commits[theirs].tree.clone();
        state.commits.push(MockCommit {
            oid,
            message: message.to_string(),
            tree: tree.clone(),
            parents: vec![ours, theirs],
        });
        let idx = state.commits.len() - 1;
        let current = state.current.clone();
        state.branches.insert(current, idx);
        state.worktree = tree;
        state.log.push(format!("merge_no_ff {}", branch));
        Ok(oid)
    }

    fn drop_merge_commit(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let head = Self::head_index(&state)?;
        let parents = state.commits[head].parents.clone();
        if parents.len() != 2 {
            return Err(KernelBumpError::branch(
                "branch tip is not a merge commit, nothing to collapse",
            ));
        }
        let restore = parents[1];
        let current = state.current.clone();
        state.branches.insert(current, restore);
        state.worktree = state.commits[restore].tree.clone();
        state.log.push("drop_merge_commit".to_string());
        Ok(())
    }

    fn has_remote(&self, name: &str) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .remotes
            .iter()
            .any(|r| r == name))
    }

    fn add_remote(&self, name: &str, _url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.remotes.push(name.to_string());
        state.log.push(format!("add_remote {}", name));
        Ok(())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push(format!("fetch_tags {}", remote));
        Ok(())
    }

    fn metadata_dir(&self) -> PathBuf {
        self.state.lock().unwrap().metadata_dir.clone()
    }
}
