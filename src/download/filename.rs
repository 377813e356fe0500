//! Filename derivation, sanitization, and race-free file creation.
//!
//! Names come from the `Content-Disposition` header, then the last URL path
//! segment, then a `download_<timestamp>` fallback. Collisions are resolved
//! at creation time with create-new semantics, so two workers racing for the
//! same name always end up with distinct files.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use url::Url;

use super::constants::{MAX_EXTENSION_BYTES, MAX_FILENAME_BYTES, MAX_NAME_SUFFIX};

/// Picks the on-disk name for a response.
///
/// Priority: `Content-Disposition` filename, decoded last URL segment,
/// then `download_<unix-ts><ext>` with the extension guessed from
/// `Content-Type`.
pub(crate) fn choose_filename(
    url: &Url,
    content_disposition: Option<&str>,
    content_type: Option<&str>,
) -> String {
    content_disposition
        .and_then(parse_content_disposition)
        .map(|name| sanitize_filename(&name))
        .filter(|name| is_usable_name(name))
        .or_else(|| filename_from_url(url))
        .unwrap_or_else(|| {
            timestamp_filename(content_type.map_or(".bin", extension_from_content_type))
        })
}

/// Guess file extension from Content-Type header.
pub(crate) fn extension_from_content_type(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match mime.as_str() {
        "application/pdf" => ".pdf",
        "audio/mpeg" | "audio/mp3" => ".mp3",
        "text/html" => ".html",
        "text/plain" => ".txt",
        "application/json" => ".json",
        "application/xml" | "text/xml" => ".xml",
        "application/zip" => ".zip",
        _ => ".bin",
    }
}

/// Parses Content-Disposition header to extract filename.
///
/// Handles:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example.pdf` (RFC 5987)
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        // charset'language'encoded_value
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                return Some(decoded.into_owned());
            }
        }
    }

    if let Some(pos) = header.find("filename=") {
        let value = header[pos + 9..].trim();
        if let Some(stripped) = value.strip_prefix('"') {
            if let Some(end) = stripped.find('"') {
                let name = &stripped[..end];
                return (!name.is_empty()).then(|| name.to_string());
            }
        } else {
            let end = value.find(';').unwrap_or(value.len());
            let filename = value[..end].trim();
            if !filename.is_empty() {
                return Some(filename.to_string());
            }
        }
    }

    None
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |`) and control characters; dot-segments are
/// rewritten so the result never leaves the target directory. Long names
/// are shortened to [`MAX_FILENAME_BYTES`], keeping the extension.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    let safe = if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    };
    truncate_filename(safe)
}

fn truncate_filename(name: String) -> String {
    if name.len() <= MAX_FILENAME_BYTES {
        return name;
    }
    let (stem, ext) = split_stem(&name);
    let ext = if ext.len() <= MAX_EXTENSION_BYTES { ext } else { "" };
    let mut end = (MAX_FILENAME_BYTES - ext.len()).min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{ext}", &stem[..end])
}

/// Decoded, sanitized last path segment of `url`, if it has one.
pub(crate) fn filename_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    let name = sanitize_filename(&decoded);
    is_usable_name(&name).then_some(name)
}

fn unix_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn timestamp_filename(extension: &str) -> String {
    format!("download_{}{extension}", unix_millis())
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

fn is_usable_name(name: &str) -> bool {
    !name.trim_matches('_').is_empty()
}

fn split_stem(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename, ""),
    }
}

async fn try_create(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
}

/// Creates a new file under `dir` named after `filename`, never overwriting.
///
/// Tries `name.ext`, then `name_1.ext` .. `name_999.ext`, then a timestamped
/// name. Each candidate is claimed with create-new semantics, so the check
/// and the creation are one atomic step.
///
/// # Errors
///
/// Returns the underlying I/O error for anything other than a name
/// collision, or `AlreadyExists` if every candidate is taken.
pub(crate) async fn create_unique_file(dir: &Path, filename: &str) -> io::Result<(File, PathBuf)> {
    let filename = {
        let sanitized = sanitize_filename(filename);
        if is_usable_name(&sanitized) {
            sanitized
        } else {
            "download.bin".to_string()
        }
    };

    let base_path = dir.join(&filename);
    match try_create(&base_path).await {
        Ok(file) => return Ok((file, base_path)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e),
    }

    let (stem, ext) = split_stem(&filename);
    for i in 1..=MAX_NAME_SUFFIX {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        match try_create(&candidate).await {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
    }

    let fallback = dir.join(format!("{stem}_{}{ext}", unix_millis()));
    let file = try_create(&fallback).await?;
    Ok((file, fallback))
}
