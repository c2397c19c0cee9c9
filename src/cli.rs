use std::{
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use image::{imageops::FilterType, ImageFormat};
use log::{info, warn};

use crate::{
    client::HttpPredictionClient,
    models::{ImageDimensions, PredictionBox, ProcessingResult, ResultStatus, SelectedFile},
    overlay::{paint, OverlayRenderer},
    report::{export_report, export_stem},
    session::{SessionController, SessionSnapshot},
    settings::Settings,
};

#[derive(Debug, Parser)]
#[command(name = "dentoscan", version, about = "Submit dental radiographs for analysis")]
pub struct Cli {
    /// JSON settings file; missing keys take their defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the detection service base URL.
    #[arg(long, global = true, env = "DENTOSCAN_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload radiographs and print their diagnostic reports.
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write `<file>.txt` reports and `<file>.overlay.png` images here.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Width the processed image is rendered at before painting overlays.
        #[arg(long, default_value_t = 600)]
        render_width: u32,

        /// Print the batch summary as JSON instead of report cards.
        #[arg(long)]
        json: bool,
    },
    /// Check that the detection service is up.
    Health,
}

pub async fn execute(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }

    let client = HttpPredictionClient::new(&settings.api_base_url, settings.request_timeout())
        .context("Failed to set up the detection service client")?;

    match cli.command {
        Command::Health => health(&client).await,
        Command::Analyze {
            files,
            out_dir,
            render_width,
            json,
        } => {
            analyze(
                settings,
                client,
                files,
                out_dir.as_deref(),
                render_width,
                json,
            )
            .await
        }
    }
}

async fn health(client: &HttpPredictionClient) -> Result<()> {
    if client.health().await? {
        println!("{} is healthy", client.base_url());
        Ok(())
    } else {
        bail!("{} is not healthy", client.base_url())
    }
}

async fn analyze(
    settings: Settings,
    client: HttpPredictionClient,
    paths: Vec<PathBuf>,
    out_dir: Option<&Path>,
    render_width: u32,
    json: bool,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = SelectedFile::from_path(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        files.push(file);
    }

    let controller = SessionController::new(Arc::new(settings), Arc::new(client.clone()));
    let snapshot = controller.select_files(files).await;
    print_notices(&snapshot);

    let summary = controller.analyze().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for result in &summary.results {
            print_card(result);
        }
        println!(
            "{} succeeded, {} failed",
            summary.succeeded, summary.failed
        );
    }

    if let Some(dir) = out_dir {
        for result in &summary.results {
            if result.status() != ResultStatus::Success {
                continue;
            }
            export_report(result, dir)
                .with_context(|| format!("Failed to export report for {}", result.file_name))?;
            if let Err(err) = export_overlay(&client, result, dir, render_width).await {
                warn!("no overlay image for {}: {err:#}", result.file_name);
            }
        }
    }

    Ok(())
}

fn print_notices(snapshot: &SessionSnapshot) {
    if let Some(notice) = &snapshot.notice {
        eprintln!("{notice}");
    }
    if let Some(banner) = &snapshot.banner {
        eprintln!("{banner}");
    }
}

fn print_card(result: &ProcessingResult) {
    println!("== {} [{}]", result.file_name, result.status().as_str());
    if let Some(error) = result.error() {
        println!("{error}");
    }
    if let Some(predictions) = result.predictions() {
        for prediction in predictions {
            println!("  {}", prediction.label());
        }
    }
    if let Some(report) = result.report() {
        println!("{report}");
    }
    println!();
}

async fn export_overlay(
    client: &HttpPredictionClient,
    result: &ProcessingResult,
    dir: &Path,
    render_width: u32,
) -> Result<()> {
    let Some(url) = result.image_url() else {
        return Ok(());
    };
    let bytes = client.fetch_image(url).await?;
    let predictions = result.predictions().unwrap_or_default().to_vec();
    let native = result.image_dimensions();

    let png = tokio::task::spawn_blocking(move || {
        render_overlay_png(&bytes, &predictions, native, render_width)
    })
    .await
    .context("overlay task failed to join")??;

    let path = dir.join(format!("{}.overlay.png", export_stem(&result.file_name)));
    tokio::fs::write(&path, png)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("wrote overlay image {}", path.display());
    Ok(())
}

/// Lays the processed image out at `render_width`, the way the result card
/// shows it, and burns the overlays into it.
pub fn render_overlay_png(
    bytes: &[u8],
    predictions: &[PredictionBox],
    native: Option<ImageDimensions>,
    render_width: u32,
) -> Result<Vec<u8>> {
    let image = image::load_from_memory(bytes).context("Failed to decode processed image")?;
    let natural = ImageDimensions::new(image.width(), image.height());

    let mut renderer = OverlayRenderer::new();
    let rendered = renderer.on_image_load(natural, Some(f64::from(render_width)));
    let mut raster = image
        .resize_exact(
            rendered.width.round().max(1.0) as u32,
            rendered.height.round().max(1.0) as u32,
            FilterType::Triangle,
        )
        .to_rgba8();

    // The processed PNG is at detector resolution when the service omits it.
    let boxes = renderer.render(Some(predictions), native.or(Some(natural)));
    paint(&mut raster, &boxes);

    let mut out = Cursor::new(Vec::new());
    raster
        .write_to(&mut out, ImageFormat::Png)
        .context("Failed to encode overlay image")?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn parses_analyze_arguments() {
        let cli = Cli::parse_from([
            "dentoscan",
            "--api-url",
            "http://scanner.local:9000",
            "analyze",
            "a.dcm",
            "b.rvg",
            "--render-width",
            "800",
        ]);
        assert_eq!(cli.api_url.as_deref(), Some("http://scanner.local:9000"));
        match cli.command {
            Command::Analyze {
                files,
                render_width,
                json,
                out_dir,
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(render_width, 800);
                assert!(!json);
                assert!(out_dir.is_none());
            }
            Command::Health => panic!("expected analyze"),
        }
    }

    #[test]
    fn overlay_png_is_rendered_at_requested_width() {
        let predictions = vec![PredictionBox {
            class_label: "cavity".into(),
            center_x: 100.0,
            center_y: 50.0,
            width: 40.0,
            height: 20.0,
            confidence: 0.9,
        }];

        let bytes = render_overlay_png(
            &png(200, 100),
            &predictions,
            Some(ImageDimensions::new(200, 100)),
            400,
        )
        .unwrap();

        let painted = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(painted.dimensions(), (400, 200));
        assert_eq!(*painted.get_pixel(160, 80), Rgba([255, 0, 0, 255]));
        assert_eq!(*painted.get_pixel(200, 100), Rgba([0, 0, 0, 255]));
    }
}
