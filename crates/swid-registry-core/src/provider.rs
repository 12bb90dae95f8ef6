//! Identity providers.

use crate::{errors::MintError, traits::IdentityProvider, types::*};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use swid_crypto::{did_from_private_key_pem, Ed25519KeyPair};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Marker preceding the identifier in the key tool's output
pub const KEY_TOOL_DID_MARKER: &str = "Generated DID:key:";

/// File the key tool writes the private key to, relative to its working directory
pub const KEY_TOOL_ARTIFACT: &str = "private_key.pem";

/// Mints Ed25519 `did:key` identities in process
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeIdentityProvider;

impl NativeIdentityProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityProvider for NativeIdentityProvider {
    async fn mint(&self) -> Result<MintedIdentity, MintError> {
        let keypair = Ed25519KeyPair::generate();
        let private_key = keypair.to_pkcs8_pem()?;
        let identifier = keypair.did();

        debug!("Minted identity {}", identifier);

        Ok(MintedIdentity {
            identifier,
            private_key,
        })
    }
}

/// Mints identities by running an external key tool
///
/// The tool prints a `Generated DID:key: <did>` line and writes the private
/// key to [`KEY_TOOL_ARTIFACT`] in its working directory. The artifact is
/// read then deleted, so mints through one provider are serialized.
pub struct KeyToolProvider {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
    artifact: PathBuf,
    lock: Mutex<()>,
}

impl KeyToolProvider {
    pub fn new(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        let working_dir = working_dir.into();
        Self {
            program: program.into(),
            args,
            artifact: working_dir.join(KEY_TOOL_ARTIFACT),
            working_dir,
            lock: Mutex::new(()),
        }
    }

    /// Path the tool's private key is read from
    pub fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    async fn remove_artifact(&self) -> std::io::Result<()> {
        match tokio::fs::remove_file(&self.artifact).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Extract the identifier from key tool output
pub fn parse_tool_identifier(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .find_map(|line| line.trim_start().strip_prefix(KEY_TOOL_DID_MARKER))
        .map(str::trim)
        .filter(|did| !did.is_empty())
}

#[async_trait]
impl IdentityProvider for KeyToolProvider {
    async fn mint(&self) -> Result<MintedIdentity, MintError> {
        let _guard = self.lock.lock().await;

        // A leftover artifact belongs to an earlier run
        if tokio::fs::try_exists(&self.artifact).await? {
            warn!("Removing stale key artifact {}", self.artifact.display());
            self.remove_artifact().await?;
        }

        debug!("Running key tool {}", self.program.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MintError::ToolFailed(format!("{}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            // The tool may have written a key before failing
            self.remove_artifact().await?;
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MintError::ToolFailed(format!(
                "{}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(identifier) = parse_tool_identifier(&stdout).map(str::to_string) else {
            self.remove_artifact().await?;
            return Err(MintError::IdentifierMissing);
        };

        let pem = match tokio::fs::read_to_string(&self.artifact).await {
            Ok(pem) => PrivateKeyPem::new(pem),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MintError::KeyArtifactMissing(self.artifact.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        self.remove_artifact().await?;

        let derived = did_from_private_key_pem(pem.expose())?;
        if derived != identifier {
            warn!(
                "Key tool reported {} but its key derives {}",
                identifier, derived
            );
            return Err(MintError::IdentifierMismatch {
                reported: identifier,
                derived,
            });
        }

        info!("Key tool minted identity {}", identifier);

        Ok(MintedIdentity {
            identifier,
            private_key: pem,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_native_provider_mints_matching_key() {
        let provider = NativeIdentityProvider::new();
        let minted = provider.mint().await.unwrap();

        assert!(minted.identifier.starts_with("did:key:z6Mk"));
        assert_eq!(
            did_from_private_key_pem(minted.private_key.expose()).unwrap(),
            minted.identifier
        );
    }

    #[tokio::test]
    async fn test_native_provider_mints_distinct_identities() {
        let provider = NativeIdentityProvider::new();
        let a = provider.mint().await.unwrap();
        let b = provider.mint().await.unwrap();
        assert_ne!(a.identifier, b.identifier);
    }

    #[test]
    fn test_parse_tool_identifier() {
        let stdout = "Exporting key...\nGenerated DID:key: did:key:z6MkTest\nDone\n";
        assert_eq!(parse_tool_identifier(stdout), Some("did:key:z6MkTest"));
        assert_eq!(parse_tool_identifier("no identifier here"), None);
        assert_eq!(parse_tool_identifier("Generated DID:key:   \n"), None);
    }

    #[cfg(unix)]
    fn shell_tool(script: &str, dir: &Path) -> KeyToolProvider {
        KeyToolProvider::new("sh", vec!["-c".to_string(), script.to_string()], dir)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_key_tool_artifact_is_consumed() {
        let dir = tempfile::tempdir().unwrap();
        let keypair = Ed25519KeyPair::generate();
        let pem = keypair.to_pkcs8_pem().unwrap();
        let script = format!(
            "printf '%s' '{}' > {} && echo 'Generated DID:key: {}'",
            pem.expose(),
            KEY_TOOL_ARTIFACT,
            keypair.did()
        );
        let provider = shell_tool(&script, dir.path());

        let minted = provider.mint().await.unwrap();

        assert_eq!(minted.identifier, keypair.did());
        assert_eq!(minted.private_key.expose(), pem.expose());
        assert!(!provider.artifact_path().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_key_tool_failure_modes() {
        let dir = tempfile::tempdir().unwrap();

        let failing = shell_tool("echo boom >&2; exit 3", dir.path());
        assert!(matches!(
            failing.mint().await,
            Err(MintError::ToolFailed(msg)) if msg.contains("boom")
        ));

        let silent = shell_tool("echo key > private_key.pem", dir.path());
        assert!(matches!(
            silent.mint().await,
            Err(MintError::IdentifierMissing)
        ));
        assert!(!silent.artifact_path().exists());

        let keyless = shell_tool("echo 'Generated DID:key: did:key:z6MkTest'", dir.path());
        assert!(matches!(
            keyless.mint().await,
            Err(MintError::KeyArtifactMissing(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_key_tool_identifier_must_match_key() {
        let dir = tempfile::tempdir().unwrap();
        let keypair = Ed25519KeyPair::generate();
        let other = Ed25519KeyPair::generate();
        let script = format!(
            "printf '%s' '{}' > {} && echo 'Generated DID:key: {}'",
            keypair.to_pkcs8_pem().unwrap().expose(),
            KEY_TOOL_ARTIFACT,
            other.did()
        );
        let provider = shell_tool(&script, dir.path());

        match provider.mint().await {
            Err(MintError::IdentifierMismatch { reported, derived }) => {
                assert_eq!(reported, other.did());
                assert_eq!(derived, keypair.did());
            }
            result => panic!("expected mismatch, got {:?}", result.map(|m| m.identifier)),
        }
        assert!(!provider.artifact_path().exists());
    }
}
