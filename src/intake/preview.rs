use std::io::Cursor;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use uuid::Uuid;

use crate::{
    models::{FilePreview, SelectedFile},
    settings::Settings,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Downscales an image so its longer edge is at most `max_edge` and encodes it
/// as a PNG `data:` URL.
pub fn thumbnail_data_url(bytes: &[u8], max_edge: u32) -> Result<String> {
    let img = image::load_from_memory(bytes).context("preview decode failed")?;
    let thumbnail = img.thumbnail(max_edge, max_edge);

    let mut encoded = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut encoded, ImageFormat::Png)
        .context("preview encode failed")?;

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(encoded.into_inner())
    ))
}

/// Builds one preview per accepted file, preserving order.
///
/// Decoding runs on the blocking pool, all files at once. A file whose type
/// has no client-side preview, or that fails to read or decode, gets a
/// placeholder with no URL; acceptance never depends on the preview.
pub async fn generate_previews(
    files: Vec<(Uuid, SelectedFile)>,
    settings: &Settings,
) -> Vec<FilePreview> {
    let max_edge = settings.preview_max_edge;
    let mut pending = Vec::with_capacity(files.len());

    for (id, file) in files {
        let previewable = file
            .extension()
            .map(|ext| settings.is_previewable(&ext))
            .unwrap_or(false);

        if !previewable {
            pending.push((id, file.name, None));
            continue;
        }

        let bytes = match file.read().await {
            Ok(bytes) => bytes,
            Err(err) => {
                log_warn!("preview read failed for {}: {err}", file.name);
                pending.push((id, file.name, None));
                continue;
            }
        };

        let handle = tokio::task::spawn_blocking(move || thumbnail_data_url(&bytes, max_edge));
        pending.push((id, file.name, Some(handle)));
    }

    let mut previews = Vec::with_capacity(pending.len());
    for (id, file_name, handle) in pending {
        let thumbnail_url = match handle {
            None => None,
            Some(handle) => match handle.await {
                Ok(Ok(url)) => {
                    log_debug!("generated preview for {file_name}");
                    Some(url)
                }
                Ok(Err(err)) => {
                    log_warn!("no preview for {file_name}: {err:#}");
                    None
                }
                Err(err) => {
                    log_warn!("preview worker for {file_name} failed to join: {err}");
                    None
                }
            },
        };

        previews.push(FilePreview {
            id,
            file_name,
            thumbnail_url,
        });
    }

    previews
}
