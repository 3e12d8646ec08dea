//! Best-effort image download helpers
//!
//! Saving is never allowed to fail a submission: callers degrade to
//! handing the URL back to the window, and a total failure is only logged.

use chrono::Utc;
use std::path::PathBuf;

/// Filename for a saved image: `prompt-battle-<timestamp>.<ext>`
pub fn download_filename(timestamp_millis: i64, extension: &str) -> String {
    format!("prompt-battle-{}.{}", timestamp_millis, extension)
}

/// Picks a file extension by sniffing the image bytes, defaulting to png
pub fn image_extension(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => "jpg",
        Ok(image::ImageFormat::WebP) => "webp",
        _ => "png",
    }
}

/// Fetches the image binary, failing on non-success statuses
pub async fn fetch_image_bytes(url: &str) -> Result<Vec<u8>, String> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| format!("Download failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!(
            "Download failed with status: {}",
            response.status()
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("Failed to read response: {}", e))?;
    Ok(bytes.to_vec())
}

/// Writes image bytes into the download directory and returns the path
pub async fn write_to_downloads(bytes: &[u8], filename: &str) -> Result<PathBuf, String> {
    let dir = crate::paths::get_download_dir()?;
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| format!("Failed to create directory: {}", e))?;
    let path = dir.join(filename);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| format!("Failed to write file: {}", e))?;
    Ok(path)
}

/// Fetches an image and saves it into the download directory without
/// user interaction. Returns the saved path.
pub async fn save_to_downloads(url: &str) -> Result<PathBuf, String> {
    let bytes = fetch_image_bytes(url).await?;
    let filename = download_filename(Utc::now().timestamp_millis(), image_extension(&bytes));
    write_to_downloads(&bytes, &filename).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    const JPEG_MAGIC: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];

    #[test]
    fn test_download_filename_pattern() {
        let filename = download_filename(1722945600000, "png");
        assert_eq!(filename, "prompt-battle-1722945600000.png");

        let stem = filename
            .strip_prefix("prompt-battle-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .unwrap();
        assert!(stem.parse::<i64>().is_ok());
    }

    #[test]
    fn test_extension_from_png_magic() {
        assert_eq!(image_extension(PNG_MAGIC), "png");
    }

    #[test]
    fn test_extension_from_jpeg_magic() {
        assert_eq!(image_extension(JPEG_MAGIC), "jpg");
    }

    #[test]
    fn test_unknown_bytes_default_to_png() {
        assert_eq!(image_extension(b"not an image"), "png");
        assert_eq!(image_extension(&[]), "png");
    }
}
