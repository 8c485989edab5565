//! Mock implementation of `GitOps` for testing the workflow.
//!
//! Records every state-changing call in `calls` so tests can assert on
//! which steps ran and in what order.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wgr_git::{Error as GitError, GitOps, Oid, Result as GitResult};

pub struct MockGitOps {
    _dir: Option<TempDir>,
    pub workdir: PathBuf,
    pub current_branch: RefCell<String>,
    pub local_branches: RefCell<HashSet<String>>,
    pub remote_branches: RefCell<HashSet<String>>,
    pub settings: RefCell<HashMap<String, String>>,
    pub changed: RefCell<Vec<String>>,
    pub added: RefCell<Vec<String>>,
    pub calls: RefCell<Vec<String>>,
    pub fail_on: Option<&'static str>,
}

impl Default for MockGitOps {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitOps {
    /// Clone URL that `clone_into` refuses.
    pub const UNREACHABLE: &'static str = "file:///unreachable.git";

    /// Mock backed by its own temporary working directory.
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut mock = Self::at(dir.path());
        mock._dir = Some(dir);
        mock
    }

    /// Mock whose working directory is `path`.
    pub fn at(path: &Path) -> Self {
        Self {
            _dir: None,
            workdir: path.to_path_buf(),
            current_branch: RefCell::new("master".to_string()),
            local_branches: RefCell::new(HashSet::new()),
            remote_branches: RefCell::new(HashSet::new()),
            settings: RefCell::new(HashMap::new()),
            changed: RefCell::new(Vec::new()),
            added: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }

    pub fn with_local_branch(self, name: &str) -> Self {
        self.local_branches.borrow_mut().insert(name.to_string());
        self
    }

    /// `name` includes the remote, e.g. `origin/topic`.
    pub fn with_remote_branch(self, name: &str) -> Self {
        self.remote_branches.borrow_mut().insert(name.to_string());
        self
    }

    pub fn with_current_branch(self, name: &str) -> Self {
        *self.current_branch.borrow_mut() = name.to_string();
        self
    }

    /// Make the named operation fail.
    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Simulate the mutation adding a file.
    pub fn touch(&self, path: &str) {
        self.added.borrow_mut().push(path.to_string());
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == call)
    }

    pub fn called_prefix(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, op: &'static str, call: String) -> GitResult<()> {
        self.calls.borrow_mut().push(call);
        if self.fail_on == Some(op) {
            return Err(GitError::Git2(git2::Error::from_str(&format!(
                "mock {op} failure"
            ))));
        }
        Ok(())
    }
}

impl GitOps for MockGitOps {
    fn clone_into(url: &str, path: &Path) -> GitResult<Self> {
        if url == Self::UNREACHABLE {
            return Err(GitError::CloneFailed {
                url: url.to_string(),
                message: "unreachable".into(),
            });
        }
        let mock = Self::at(path);
        mock.calls.borrow_mut().push(format!("clone:{url}"));
        Ok(mock)
    }

    fn open(path: &Path) -> GitResult<Self> {
        if !path.is_dir() {
            return Err(GitError::NotARepository);
        }
        Ok(Self::at(path))
    }

    fn workdir(&self) -> Option<&Path> {
        Some(&self.workdir)
    }

    fn current_branch(&self) -> GitResult<String> {
        Ok(self.current_branch.borrow().clone())
    }

    fn remote_url(&self, remote: &str) -> GitResult<String> {
        Err(GitError::RemoteNotFound(remote.to_string()))
    }

    fn set_config(&self, key: &str, value: &str) -> GitResult<()> {
        self.record("set_config", format!("set_config:{key}"))?;
        self.settings
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn config(&self, key: &str) -> GitResult<Option<String>> {
        Ok(self.settings.borrow().get(key).cloned())
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.local_branches.borrow().contains(name)
    }

    fn remote_branch_exists(&self, remote: &str, name: &str) -> bool {
        self.remote_branches
            .borrow()
            .contains(&format!("{remote}/{name}"))
    }

    fn list_branches(&self) -> GitResult<Vec<String>> {
        let mut names: Vec<String> = self.local_branches.borrow().iter().cloned().collect();
        names.extend(self.remote_branches.borrow().iter().cloned());
        Ok(names)
    }

    fn checkout(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.record("checkout", format!("checkout:{branch}"))?;
        if !self.branch_exists(branch) {
            if !self.remote_branch_exists(remote, branch) {
                return Err(GitError::BranchNotFound(branch.to_string()));
            }
            self.calls.borrow_mut().push(format!("track:{remote}/{branch}"));
            self.local_branches.borrow_mut().insert(branch.to_string());
        }
        *self.current_branch.borrow_mut() = branch.to_string();
        Ok(())
    }

    fn create_and_checkout(&self, branch: &str) -> GitResult<()> {
        self.record("create", format!("create:{branch}"))?;
        self.local_branches.borrow_mut().insert(branch.to_string());
        *self.current_branch.borrow_mut() = branch.to_string();
        Ok(())
    }

    fn stage_all(&self) -> GitResult<()> {
        self.record("stage_all", "stage_all".into())
    }

    fn changed_paths(&self) -> GitResult<Vec<String>> {
        self.record("status", "status".into())?;
        Ok(self.changed.borrow().clone())
    }

    fn added_paths(&self) -> GitResult<Vec<String>> {
        Ok(self.added.borrow().clone())
    }

    fn create_commit(&self, message: &str) -> GitResult<Oid> {
        self.record("commit", format!("commit:{message}"))?;
        self.changed.borrow_mut().clear();
        self.added.borrow_mut().clear();
        Ok(Oid::zero())
    }

    fn push(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.record("push", format!("push:{remote}:{branch}"))
    }
}
