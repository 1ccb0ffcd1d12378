//! The VCS driver seam (§6): four operations the core requires of whatever
//! supplies the three byte streams, parameterized by a deadline so every
//! blocking call can time out in a controlled way.

use std::time::{Duration, Instant};

/// A stage number as git's own `:1:`/`:2:`/`:3:` index convention uses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Base,
    Local,
    Remote,
}

impl Stage {
    pub fn index(&self) -> u8 {
        match self {
            Stage::Base => 1,
            Stage::Local => 2,
            Stage::Remote => 3,
        }
    }
}

/// A deadline shared across one invocation's blocking calls. Cheap to
/// clone; carries no cancellation flag of its own beyond "has the clock run
/// out", matching the single-threaded cooperative model (§5).
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Deadline { expires_at: Instant::now() + timeout }
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// What the core requires from a version-control system. Implemented by
/// [`crate::vcs_git`]'s `GitDriver` in the root package; unit-tested here
/// against an in-memory fake so `semerge-core` never links `git` itself.
pub trait VcsDriver {
    /// Confirm the working directory is inside a repository under version
    /// control.
    fn is_repository(&self, deadline: Deadline) -> Result<bool, crate::error::SemergeError>;

    /// List paths with unresolved merge conflicts.
    fn conflicted_files(&self, deadline: Deadline) -> Result<Vec<String>, crate::error::SemergeError>;

    /// Read one stage of one file. Returns `None` when that stage has no
    /// content (e.g. the file did not exist on that side).
    fn read_stage(&self, path: &str, stage: Stage, deadline: Deadline) -> Result<Option<Vec<u8>>, crate::error::SemergeError>;

    /// Mark a path as resolved.
    fn stage_file(&self, path: &str, deadline: Deadline) -> Result<(), crate::error::SemergeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeDriver {
        files: HashMap<String, (Option<Vec<u8>>, Option<Vec<u8>>, Option<Vec<u8>>)>,
        staged: std::cell::RefCell<Vec<String>>,
    }

    impl VcsDriver for FakeDriver {
        fn is_repository(&self, _deadline: Deadline) -> Result<bool, crate::error::SemergeError> {
            Ok(true)
        }

        fn conflicted_files(&self, _deadline: Deadline) -> Result<Vec<String>, crate::error::SemergeError> {
            Ok(self.files.keys().cloned().collect())
        }

        fn read_stage(&self, path: &str, stage: Stage, _deadline: Deadline) -> Result<Option<Vec<u8>>, crate::error::SemergeError> {
            let (b, l, r) = self.files.get(path).ok_or_else(|| crate::error::SemergeError::VcsFailure { message: format!("unknown path {path}") })?;
            Ok(match stage {
                Stage::Base => b.clone(),
                Stage::Local => l.clone(),
                Stage::Remote => r.clone(),
            })
        }

        fn stage_file(&self, path: &str, _deadline: Deadline) -> Result<(), crate::error::SemergeError> {
            self.staged.borrow_mut().push(path.to_string());
            Ok(())
        }
    }

    #[test]
    fn reads_each_stage() {
        let mut files = HashMap::new();
        files.insert("a.py".to_string(), (Some(b"base".to_vec()), Some(b"local".to_vec()), Some(b"remote".to_vec())));
        let driver = FakeDriver { files, staged: std::cell::RefCell::new(Vec::new()) };
        let dl = Deadline::after(Duration::from_secs(1));
        assert_eq!(driver.read_stage("a.py", Stage::Base, dl).unwrap(), Some(b"base".to_vec()));
        assert_eq!(driver.read_stage("a.py", Stage::Remote, dl).unwrap(), Some(b"remote".to_vec()));
    }

    #[test]
    fn staging_records_path() {
        let driver = FakeDriver { files: HashMap::new(), staged: std::cell::RefCell::new(Vec::new()) };
        let dl = Deadline::after(Duration::from_secs(1));
        driver.stage_file("a.py", dl).unwrap();
        assert_eq!(driver.staged.borrow().as_slice(), ["a.py"]);
    }

    #[test]
    fn deadline_expires() {
        let dl = Deadline::after(Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert!(dl.is_expired());
    }
}
