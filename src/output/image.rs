use base64::{Engine, engine::general_purpose::STANDARD};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image is not a data URL")]
    NotDataUrl,

    #[error("image data URL is not base64 encoded")]
    NotBase64,

    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("unable to write image: {0}")]
    Io(#[from] io::Error),

    #[error("image viewer exited with {0}")]
    Viewer(std::process::ExitStatus),
}

/// Image bytes decoded from a `data:<mime>;base64,<data>` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File extension for the MIME type, e.g. `png` for `image/png`
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/svg+xml" => "svg",
            mime => mime
                .split_once('/')
                .map(|(_, subtype)| subtype)
                .filter(|s| !s.is_empty() && s.chars().all(char::is_alphanumeric))
                .unwrap_or("img"),
        }
    }
}

/// Decode a base64 data URL as returned by Stash scrapers
pub fn decode_data_url(data: &str) -> Result<DecodedImage, ImageError> {
    let rest = data.trim().strip_prefix("data:").ok_or(ImageError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ImageError::NotDataUrl)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(ImageError::NotBase64)?;
    // Parameters such as `;charset=...` are not needed to pick an extension
    let mime_type = mime_type.split(';').next().unwrap_or_default().trim();

    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned)?;

    Ok(DecodedImage {
        mime_type: if mime_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            mime_type.to_string()
        },
        bytes,
    })
}

/// Shows decoded images to the user
pub trait ImageViewer {
    /// Open the image and return a guard that keeps it available while it is being viewed
    fn show(&self, image: &DecodedImage) -> Result<ImageSession, ImageError>;
}

/// A displayed image; its temporary file is removed when the session is dropped
pub struct ImageSession {
    file: Option<NamedTempFile>,
}

impl ImageSession {
    pub fn new(file: NamedTempFile) -> Self {
        Self { file: Some(file) }
    }

    /// Keep the image on disk after the session ends and return its path
    ///
    /// Used when nobody is around to say when viewing is done, so the viewer
    /// still finds the file after it has been handed over.
    pub fn keep(mut self) -> Result<Option<PathBuf>, ImageError> {
        let Some(file) = self.file.take() else {
            return Ok(None);
        };
        let (_, path) = file.keep().map_err(io::Error::from)?;
        debug!(path = %path.display(), "keeping image");
        Ok(Some(path))
    }
}

impl Drop for ImageSession {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            debug!(path = %file.path().display(), "removing temporary image");
            if let Err(e) = file.close() {
                eprintln!("[Warning] Unable to remove temporary image: {}", e);
            }
        }
    }
}

/// Opens images with the platform's default image viewer
pub struct SystemViewer;

impl SystemViewer {
    fn command(path: &std::path::Path) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg("--").arg(path);
            cmd
        }

        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(path);
            cmd
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl ImageViewer for SystemViewer {
    fn show(&self, image: &DecodedImage) -> Result<ImageSession, ImageError> {
        let mut file = Builder::new()
            .prefix("scrape_url-")
            .suffix(&format!(".{}", image.extension()))
            .tempfile()?;
        file.write_all(&image.bytes)?;
        file.flush()?;
        debug!(path = %file.path().display(), mime = %image.mime_type, "opening image");

        let status = Self::command(file.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(ImageError::Viewer(status));
        }

        Ok(ImageSession::new(file))
    }
}
