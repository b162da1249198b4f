//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and manifest snippets to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest(manifests::LAYERED);
//!     fixture.command().arg("flatten").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::manifests;
    pub use super::TestFixture;
}

/// Common manifest YAML snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// Three layers of headers sharing a common base.
    pub const LAYERED: &str = r#"
depsets:
  base:
    order: postorder
    direct: [base.h]
  net:
    order: postorder
    direct: [net.h]
    transitive: [base]
  log:
    order: postorder
    direct: [log.h]
    transitive: [base]
  app:
    order: postorder
    direct: [app.h]
    transitive: [net, log]
"#;

    /// A compiler command line built from a set, spilling to a param file
    /// when it gets long.
    pub const COMPILE: &str = r#"
depsets:
  includes:
    order: preorder
    direct: [include/a, include/b]
  sources:
    direct: [src/main.c, src/util.c]
command:
  - literal: cc
  - all:
      depset: includes
      format_each: "-I%s"
  - all:
      depset: sources
  - formatted: { value: app, template: "-o%s" }
param_file:
  mode: when_too_long
  path: build/app.params
"#;

    /// Two sets that include each other.
    pub const CYCLIC: &str = r#"
depsets:
  a:
    direct: [a]
    transitive: [b]
  b:
    direct: [b]
    transitive: [a]
"#;

    /// A preorder set that includes a postorder one.
    pub const ORDER_MISMATCH: &str = r#"
depsets:
  child:
    order: postorder
    direct: [c]
  parent:
    order: preorder
    direct: [p]
    transitive: [child]
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "depsets: [unclosed";
}

/// A test fixture that provides a temporary directory with an optional
/// `depset.yaml` manifest.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().with_manifest(manifests::COMPILE);
///
/// fixture.command()
///     .arg("args")
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `depset.yaml` manifest with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.temp_dir
            .child("depset.yaml")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the manifest file.
    #[allow(dead_code)]
    pub fn manifest_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("depset.yaml")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// Environment variables that would change the manifest or threshold are
    /// cleared so the host environment cannot leak into the test.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("depset");
        cmd.current_dir(self.path())
            .env_remove("DEPSET_MANIFEST")
            .env_remove("DEPSET_PARAM_FILE_THRESHOLD")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_manifest() {
        let fixture = TestFixture::new().with_manifest(manifests::LAYERED);
        assert!(fixture.manifest_path().exists());
    }

    #[test]
    fn test_manifests_are_valid_yaml() {
        let manifests = [
            manifests::LAYERED,
            manifests::COMPILE,
            manifests::CYCLIC,
            manifests::ORDER_MISMATCH,
        ];

        for manifest in manifests {
            let result: Result<serde_yaml::Value, _> = serde_yaml::from_str(manifest);
            assert!(result.is_ok(), "Manifest should be valid YAML: {}", manifest);
        }
    }
}
