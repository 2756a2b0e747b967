//! Directory-scoped execution.
//!
//! The working directory is an explicit [`WorkingContext`] value rather than
//! the process-wide cwd. [`WorkingContext::with_directory`] switches it for
//! the duration of a closure and restores it on every exit path, including
//! unwinding.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{BuildError, BuildResult};

/// The directory build steps run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingContext {
    current: PathBuf,
}

impl WorkingContext {
    /// Start from an explicit directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            current: dir.into(),
        }
    }

    /// Start from the process's current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cwd cannot be determined.
    pub fn from_process() -> std::io::Result<Self> {
        std::env::current_dir().map(Self::new)
    }

    /// The directory currently in effect.
    #[must_use]
    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Resolve `path` against the current directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current.join(path)
        }
    }

    /// Run `f` with `path` as the current directory.
    ///
    /// The previous directory is restored after `f` returns, whether it
    /// succeeded or not, and also if it panics.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DirectoryNotFound`] without running `f` (and
    /// without touching the context) if `path` is not an accessible
    /// directory; otherwise returns whatever `f` returns.
    pub fn with_directory<T>(
        &mut self,
        path: &Path,
        f: impl FnOnce(&mut Self) -> BuildResult<T>,
    ) -> BuildResult<T> {
        let target = self.resolve(path);
        check_directory(&target)?;

        let previous = std::mem::replace(&mut self.current, target);
        trace!(dir = %self.current.display(), "entered directory scope");
        let scope = DirectoryScope {
            ctx: self,
            previous,
        };
        f(&mut *scope.ctx)
    }
}

/// Restores the recorded directory when dropped.
struct DirectoryScope<'a> {
    ctx: &'a mut WorkingContext,
    previous: PathBuf,
}

impl Drop for DirectoryScope<'_> {
    fn drop(&mut self) {
        let previous = std::mem::take(&mut self.previous);
        trace!(dir = %previous.display(), "restored directory scope");
        self.ctx.current = previous;
    }
}

fn check_directory(path: &Path) -> BuildResult<()> {
    let not_found = |source| BuildError::DirectoryNotFound {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(not_found)?;
    if !metadata.is_dir() {
        return Err(not_found(std::io::Error::other("not a directory")));
    }
    // Resolving an entry needs search permission, the same as entering.
    std::fs::metadata(path.join(".")).map_err(not_found)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enters_and_restores() {
        let root = tempfile::tempdir().unwrap();
        let child = root.path().join("child");
        std::fs::create_dir(&child).unwrap();

        let mut ctx = WorkingContext::new(root.path());
        let seen = ctx
            .with_directory(Path::new("child"), |scope| Ok(scope.current().to_path_buf()))
            .unwrap();

        assert_eq!(seen, child);
        assert_eq!(ctx.current(), root.path());
    }

    #[test]
    fn test_restores_when_closure_fails() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = WorkingContext::new("/");

        let result: BuildResult<()> = ctx.with_directory(root.path(), |scope| {
            Err(BuildError::AlreadyExists {
                path: scope.current().join("config.mk"),
            })
        });

        assert!(matches!(result, Err(BuildError::AlreadyExists { .. })));
        assert_eq!(ctx.current(), Path::new("/"));
    }

    #[test]
    fn test_missing_directory_leaves_context_and_skips_closure() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = WorkingContext::new(root.path());
        let mut ran = false;

        let result = ctx.with_directory(Path::new("missing"), |_| {
            ran = true;
            Ok(())
        });

        assert!(matches!(result, Err(BuildError::DirectoryNotFound { .. })));
        assert!(!ran);
        assert_eq!(ctx.current(), root.path());
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("plain"), "").unwrap();
        let mut ctx = WorkingContext::new(root.path());

        let result = ctx.with_directory(Path::new("plain"), |_| Ok(()));
        assert!(matches!(result, Err(BuildError::DirectoryNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_unsearchable_directory_is_not_found() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let locked = root.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("Install.yml"), "module: null\n").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();

        // Permission bits do not bind root.
        let searchable = std::fs::metadata(locked.join("Install.yml")).is_ok();
        let mut ctx = WorkingContext::new(root.path());
        let mut ran = false;
        let result = ctx.with_directory(Path::new("locked"), |_| {
            ran = true;
            Ok(())
        });

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        if searchable {
            return;
        }
        match result {
            Err(BuildError::DirectoryNotFound { path, .. }) => assert_eq!(path, locked),
            other => panic!("expected DirectoryNotFound, got {other:?}"),
        }
        assert!(!ran);
        assert_eq!(ctx.current(), root.path());
    }

    #[test]
    fn test_nested_scopes_unwind_in_order() {
        let root = tempfile::tempdir().unwrap();
        let inner = root.path().join("a").join("b");
        std::fs::create_dir_all(&inner).unwrap();
        let mut ctx = WorkingContext::new(root.path());

        ctx.with_directory(Path::new("a"), |outer| {
            outer.with_directory(Path::new("b"), |scope| {
                assert_eq!(scope.current(), inner.as_path());
                Ok(())
            })?;
            assert_eq!(outer.current(), root.path().join("a").as_path());
            Ok(())
        })
        .unwrap();

        assert_eq!(ctx.current(), root.path());
    }

    #[test]
    fn test_restores_on_panic() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = WorkingContext::new("/");

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = ctx.with_directory(root.path(), |_| -> BuildResult<()> {
                panic!("build step blew up")
            });
        }));

        assert!(outcome.is_err());
        assert_eq!(ctx.current(), Path::new("/"));
    }

    #[test]
    fn test_process_cwd_untouched() {
        let root = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();
        let mut ctx = WorkingContext::from_process().unwrap();

        ctx.with_directory(root.path(), |_| Ok(())).unwrap();

        assert_eq!(std::env::current_dir().unwrap(), before);
        assert_eq!(ctx.current(), before.as_path());
    }

    #[test]
    fn test_resolve() {
        let ctx = WorkingContext::new("/srv/madpack");
        assert_eq!(ctx.resolve(Path::new("methods")), PathBuf::from("/srv/madpack/methods"));
        assert_eq!(ctx.resolve(Path::new("/etc")), PathBuf::from("/etc"));
    }
}
