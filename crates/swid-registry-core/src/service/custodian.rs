//! Artifact custody: private key and document files.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use swid_crypto::PrivateKeyPem;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// File stem for a display name: spaces and path separators become `_`
pub fn artifact_stem(display_name: &str) -> String {
    display_name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            _ => c,
        })
        .collect()
}

/// Writes registration artifacts into an output directory
///
/// Files are derived copies of the stored record and may be regenerated.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactCustodian;

impl ArtifactCustodian {
    pub fn new() -> Self {
        Self
    }

    /// Path of the private key file for a display name
    pub fn private_key_path(&self, output_dir: &Path, display_name: &str) -> PathBuf {
        output_dir.join(format!("{}_private_key.pem", artifact_stem(display_name)))
    }

    /// Path of the document file for a display name
    pub fn document_path(&self, output_dir: &Path, display_name: &str) -> PathBuf {
        output_dir.join(format!("{}.json", artifact_stem(display_name)))
    }

    /// Write the private key, readable by the owner only on Unix
    ///
    /// Fails with `AlreadyExists` rather than replace another identity's key.
    pub async fn write_private_key(
        &self,
        output_dir: &Path,
        display_name: &str,
        key: &PrivateKeyPem,
    ) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;
        let path = self.private_key_path(output_dir, display_name);

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path).await?;
        file.write_all(key.expose().as_bytes()).await?;
        file.flush().await?;

        debug!("Private key written to {}", path.display());
        Ok(path)
    }

    /// Write the document pretty-printed with 4-space indentation
    pub async fn write_document(
        &self,
        output_dir: &Path,
        display_name: &str,
        document: &serde_json::Value,
    ) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;
        let path = self.document_path(output_dir, display_name);

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut serializer).map_err(io::Error::from)?;

        tokio::fs::write(&path, buf).await?;

        debug!("Document written to {}", path.display());
        Ok(path)
    }
}
