use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use base64::Engine;
use jiff::Timestamp;
use url::Url;

/// File name used when `--output` is given without a path
pub fn default_file_name(now: Timestamp) -> PathBuf {
    PathBuf::from(format!("generated-image-{}.png", now.as_millisecond()))
}

/// Write the image behind `url` to `path`
pub async fn save(client: &reqwest::Client, url: &Url, path: &Path) -> anyhow::Result<()> {
    let bytes = fetch(client, url).await?;

    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("failed to write image to {}", path.display()))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "image saved");

    Ok(())
}

async fn fetch(client: &reqwest::Client, url: &Url) -> anyhow::Result<Vec<u8>> {
    match url.scheme() {
        "data" => decode_data_uri(url.as_str()),
        "http" | "https" => {
            let response = client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("failed to download {url}"))?
                .error_for_status()?;

            Ok(response.bytes().await?.to_vec())
        }
        scheme => bail!("cannot download images from '{scheme}' URLs"),
    }
}

/// Decode a `data:<mime>;base64,<payload>` URI
fn decode_data_uri(uri: &str) -> anyhow::Result<Vec<u8>> {
    let (meta, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .context("malformed data URI")?;

    if !meta.ends_with(";base64") {
        bail!("only base64 data URIs can be saved");
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .context("data URI payload is not valid base64")
}
