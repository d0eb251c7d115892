use std::path::Path;

/// Fallback for unknown or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Infer a MIME type from a file extension.
///
/// The table is fixed; anything it does not know maps to
/// [`OCTET_STREAM`]. Matching is case-insensitive.
pub fn mime_for_path<P: AsRef<Path>>(path: P) -> &'static str {
    let ext = match path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return OCTET_STREAM,
    };

    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        _ => OCTET_STREAM,
    }
}
