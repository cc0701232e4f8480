use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for kernel-bump operations
#[derive(Error, Debug)]
pub enum KernelBumpError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Target path already exists: {}", .0.display())]
    Collision(PathBuf),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in kernel-bump
pub type Result<T> = std::result::Result<T, KernelBumpError>;

impl KernelBumpError {
    /// Create a precondition error with context
    pub fn precondition(msg: impl Into<String>) -> Self {
        KernelBumpError::Precondition(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        KernelBumpError::Version(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        KernelBumpError::Config(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        KernelBumpError::Branch(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KernelBumpError::precondition("working tree is not clean");
        assert_eq!(
            err.to_string(),
            "Precondition failed: working tree is not clean"
        );
    }

    #[test]
    fn test_collision_includes_path() {
        let err = KernelBumpError::Collision(PathBuf::from("config-6.1.26-x86_64"));
        assert!(err.to_string().contains("config-6.1.26-x86_64"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KernelBumpError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(KernelBumpError::version("test")
            .to_string()
            .contains("Version"));
        assert!(KernelBumpError::branch("test")
            .to_string()
            .contains("Branch"));
        assert!(KernelBumpError::config("test")
            .to_string()
            .contains("Configuration"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (KernelBumpError::precondition("x"), "Precondition failed"),
            (KernelBumpError::version("x"), "Version error"),
            (KernelBumpError::config("x"), "Configuration error"),
            (KernelBumpError::branch("x"), "Branch error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
