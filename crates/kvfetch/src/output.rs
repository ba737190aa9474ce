//! Writing the fetched bundle to disk as YAML.

use kvfetch_secrets::SecretBundle;
use miette::Diagnostic;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default output file, relative to the working directory
pub const DEFAULT_OUTPUT_FILE: &str = "secrets.yaml";

/// Errors that can occur while writing the output file.
#[derive(Error, Debug, Diagnostic)]
pub enum OutputError {
    /// The bundle could not be serialized.
    #[error("failed to marshal secrets to YAML: {source}")]
    #[diagnostic(code(kvfetch::output::serialize))]
    Serialize {
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The output file could not be written.
    #[error("failed to write YAML to file {}: {source}", .path.display())]
    #[diagnostic(
        code(kvfetch::output::write),
        help("Check that the directory exists and is writable")
    )]
    Write {
        /// Path of the output file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Serialize `bundle` to YAML and write it to `path`, replacing any
/// existing file.
///
/// # Errors
/// Returns [`OutputError::Serialize`] or [`OutputError::Write`].
pub fn write_bundle(bundle: &SecretBundle, path: &Path) -> Result<(), OutputError> {
    let yaml = serde_yaml::to_string(bundle).map_err(|source| OutputError::Serialize { source })?;

    write_file(path, yaml.as_bytes()).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        secrets = bundle.len(),
        bytes = yaml.len(),
        "Wrote secrets file"
    );
    Ok(())
}

#[cfg(unix)]
fn write_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvfetch_secrets::SecureSecret;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(serde::Deserialize)]
    struct Written {
        secrets: BTreeMap<String, String>,
    }

    fn bundle_of(pairs: &[(&str, &str)]) -> SecretBundle {
        let mut bundle = SecretBundle::new();
        for (key, value) in pairs {
            bundle.insert((*key).to_string(), SecureSecret::from(*value));
        }
        bundle
    }

    fn read_back(path: &Path) -> BTreeMap<String, String> {
        let content = std::fs::read_to_string(path).unwrap();
        serde_yaml::from_str::<Written>(&content).unwrap().secrets
    }

    #[test]
    fn test_write_bundle_yaml_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_FILE);

        write_bundle(&bundle_of(&[("keyA", "v1")]), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "secrets:\n  keyA: v1\n");
    }

    #[test]
    fn test_write_bundle_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_FILE);
        std::fs::write(&path, "secrets:\n  stale: value\n  other: longer-old-content\n").unwrap();

        write_bundle(&bundle_of(&[("fresh", "new")]), &path).unwrap();

        let secrets = read_back(&path);
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets["fresh"], "new");
    }

    #[test]
    fn test_write_bundle_preserves_special_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_FILE);
        let multiline = "-----BEGIN KEY-----\nabc\n-----END KEY-----";

        write_bundle(
            &bundle_of(&[("PEM", multiline), ("COLON", "a: b"), ("NUM", "0123")]),
            &path,
        )
        .unwrap();

        let secrets = read_back(&path);
        assert_eq!(secrets["PEM"], multiline);
        assert_eq!(secrets["COLON"], "a: b");
        assert_eq!(secrets["NUM"], "0123");
    }

    #[test]
    fn test_write_bundle_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_FILE);

        write_bundle(&SecretBundle::new(), &path).unwrap();

        assert!(read_back(&path).is_empty());
    }

    #[test]
    fn test_write_bundle_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join(DEFAULT_OUTPUT_FILE);

        let err = write_bundle(&bundle_of(&[("k", "v")]), &path).unwrap_err();

        assert!(matches!(err, OutputError::Write { .. }));
        assert!(err.to_string().contains("failed to write YAML to file"));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_bundle_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_FILE);

        write_bundle(&bundle_of(&[("k", "v")]), &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        // umask may only clear bits
        assert_eq!(mode & 0o777 & !0o644, 0);
    }
}
