//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the listener is bound.

use std::path::PathBuf;

use tracing::warn;

/// Load `.env` from the working directory (or a parent) if one exists.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Check the static asset directory served under `/assets`.
///
/// A missing directory only produces a warning since every view renders
/// without it; a path that exists but is not a directory is an error.
pub async fn ensure_env(static_dir: &str) -> anyhow::Result<()> {
    match tokio::fs::metadata(static_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("{static_dir} exists but is not a directory")),
        Err(_) => {
            warn!(%static_dir, "static asset directory not found; /assets requests will 404");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ensure_env;

    #[tokio::test]
    async fn missing_static_dir_is_tolerated() {
        assert!(ensure_env("/definitely/not/here/assets").await.is_ok());
    }

    #[tokio::test]
    async fn static_path_pointing_at_file_is_rejected() {
        let file = std::env::temp_dir().join(format!("catalog-env-{}", std::process::id()));
        tokio::fs::write(&file, b"x").await.unwrap();
        let res = ensure_env(file.to_str().unwrap()).await;
        tokio::fs::remove_file(&file).await.ok();
        assert!(res.is_err());
    }
}
