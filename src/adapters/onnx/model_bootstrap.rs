use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

/// Garantiza que los pesos del modelo estén en disco; los descarga una vez si hay URL configurada.
pub async fn ensure_model(model_path: &str, model_url: Option<&str>) -> Result<PathBuf> {
    let path = PathBuf::from(model_path);
    if path.exists() {
        return Ok(path);
    }

    let Some(url) = model_url.filter(|u| !u.trim().is_empty()) else {
        bail!("modelo no encontrado en {} y no hay detector.model_url configurado", model_path);
    };

    info!("⬇️ Descargando modelo desde {} ...", url);
    download(url, &path).await?;
    info!("✅ Modelo guardado en {}", path.display());
    Ok(path)
}

async fn download(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(600))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    let res = client.get(url).send().await.context("descarga del modelo fallida")?;
    let status = res.status();
    if !status.is_success() {
        return Err(anyhow!("descarga del modelo fallida: HTTP {}", status));
    }
    let bytes = res.bytes().await?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = dest.with_extension("part");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, dest).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_model_is_used_as_is() {
        let path = std::env::temp_dir().join(format!("barn-sentry-model-{}.onnx", std::process::id()));
        tokio::fs::write(&path, b"onnx").await.unwrap();

        let found = ensure_model(path.to_str().unwrap(), None).await.unwrap();
        assert_eq!(found, path);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn missing_model_without_url_is_an_error() {
        let err = ensure_model("/nonexistent/dir/best.onnx", Some("  ")).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/best.onnx"));
    }
}
