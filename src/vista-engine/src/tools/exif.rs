//! Image metadata tool.
//!
//! Downloads the image under discussion and reports what can be read from
//! the file itself, formatted the way `exiftool` prints tags.

use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageFormat, ImageReader};
use reqwest::Client;
use serde_json::{Value, json};

use super::{ToolContext, ToolHandler, ToolResult};
use crate::client::ToolDefinition;
use crate::error::Result;
use crate::http_client::create_download_client;

/// Name the model calls the tool by.
pub const EXIF_TOOL_NAME: &str = "exiftool";

/// Largest image the tool will download (20 MB).
const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Width of the tag name column, as exiftool pads it.
const KEY_WIDTH: usize = 32;

/// Handler for the `exiftool` tool.
#[derive(Debug, Clone)]
pub struct ExifToolHandler {
    client: Client,
}

impl ExifToolHandler {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_download_client()?,
        })
    }

    async fn download(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!(
                "HTTP error: {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            ));
        }

        if let Some(length) = response.content_length() {
            if length > MAX_IMAGE_BYTES {
                return Err(format!(
                    "Image too large: {length} bytes exceeds limit of {MAX_IMAGE_BYTES} bytes"
                ));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read response: {e}"))?;
        if bytes.len() as u64 > MAX_IMAGE_BYTES {
            return Err(format!(
                "Image too large: {} bytes exceeds limit of {MAX_IMAGE_BYTES} bytes",
                bytes.len()
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ToolHandler for ExifToolHandler {
    fn name(&self) -> &str {
        EXIF_TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            EXIF_TOOL_NAME,
            "Extract exif data from the image being described.",
            json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        )
    }

    async fn execute(&self, arguments: Value, context: &ToolContext) -> Result<ToolResult> {
        let url = arguments
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or(&context.image_url)
            .to_string();

        let bytes = match self.download(&url).await {
            Ok(bytes) => bytes,
            Err(message) => {
                tracing::warn!(url = %url, error = %message, "Image download failed");
                return Ok(ToolResult::error(message));
            }
        };

        match describe_image_bytes(&file_name(&url), &bytes) {
            Ok(report) => Ok(ToolResult::success(report)),
            Err(message) => {
                tracing::warn!(url = %url, error = %message, "Unreadable image");
                Ok(ToolResult::error(message))
            }
        }
    }
}

/// Builds an exiftool-style report for an image held in memory.
pub fn describe_image_bytes(name: &str, bytes: &[u8]) -> std::result::Result<String, String> {
    let format =
        image::guess_format(bytes).map_err(|e| format!("Unrecognized image format: {e}"))?;
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| format!("Failed to read image header: {e}"))?;

    let megapixels = f64::from(width) * f64::from(height) / 1_000_000.0;
    let tags = [
        ("File Name", name.to_string()),
        ("File Size", human_size(bytes.len() as u64)),
        ("File Type", file_type(format)),
        (
            "File Type Extension",
            format.extensions_str().first().copied().unwrap_or("").to_string(),
        ),
        ("MIME Type", format.to_mime_type().to_string()),
        ("Image Width", width.to_string()),
        ("Image Height", height.to_string()),
        ("Image Size", format!("{width}x{height}")),
        ("Megapixels", trim_float(megapixels)),
    ];

    Ok(tags
        .iter()
        .map(|(key, value)| format!("{key:<KEY_WIDTH$}: {value}"))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn file_name(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

fn file_type(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

fn human_size(bytes: u64) -> String {
    const KB: f64 = 1000.0;
    let size = bytes as f64;
    if size < KB {
        format!("{bytes} bytes")
    } else if size < KB * KB {
        format!("{} kB", (size / KB).round())
    } else {
        format!("{:.1} MB", size / (KB * KB))
    }
}

fn trim_float(value: f64) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("png encodes");
        cursor.into_inner()
    }

    #[test]
    fn test_report_for_png() {
        let bytes = png_bytes(640, 480);
        let report = describe_image_bytes("cat.png", &bytes).expect("report");
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], format!("{:<32}: cat.png", "File Name"));
        assert!(report.contains("File Type                       : PNG"));
        assert!(report.contains("MIME Type                       : image/png"));
        assert!(report.contains("Image Width                     : 640"));
        assert!(report.contains("Image Height                    : 480"));
        assert!(report.contains("Image Size                      : 640x480"));
        assert!(report.contains("Megapixels                      : 0.307"));
    }

    #[test]
    fn test_not_an_image() {
        assert!(describe_image_bytes("x", b"hello world").is_err());
    }

    #[test]
    fn test_helpers() {
        assert_eq!(human_size(512), "512 bytes");
        assert_eq!(human_size(12_400), "12 kB");
        assert_eq!(human_size(2_500_000), "2.5 MB");
        assert_eq!(trim_float(2.0), "2");
        assert_eq!(file_name("https://example.com/a/b/photo.jpg?x=1"), "photo.jpg");
        assert_eq!(file_name("https://example.com/"), "image");
    }

    #[tokio::test]
    async fn test_execute_downloads_injected_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/lighthouse.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(4, 3)))
            .mount(&server)
            .await;

        let handler = ExifToolHandler::new().expect("handler");
        let url = format!("{}/img/lighthouse.png", server.uri());
        let result = handler
            .execute(json!({ "url": url }), &ToolContext::new("unused"))
            .await
            .expect("tool runs");

        assert!(result.success);
        assert!(result.output.contains("lighthouse.png"));
        assert!(result.output.contains("Image Size                      : 4x3"));
    }

    #[tokio::test]
    async fn test_execute_reports_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let handler = ExifToolHandler::new().expect("handler");
        let context = ToolContext::new(format!("{}/missing.jpg", server.uri()));
        let result = handler
            .execute(json!({}), &context)
            .await
            .expect("tool runs");

        assert!(!result.success);
        assert!(result.output.contains("404"));
    }
}
