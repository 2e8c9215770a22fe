use std::path::Path;
use tokio::fs as async_fs;
use tracing::trace;

const REDACTION_MASK: &str = "********";
const ENV_FILE_NAME: &str = ".env";

/// Reads a file as text for inclusion in the context document. Never fails:
/// non-UTF-8 content and read errors both come back as placeholder text so a
/// single bad file cannot abort the build.
pub async fn render_file_content(path: &Path) -> String {
    let display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    match async_fs::read(path).await {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(content) => {
                if is_env_file(&display_name) {
                    trace!("Redacting env values in {}", display_name);
                    redact_env_values(&content)
                } else {
                    content
                }
            }
            Err(_) => format!("Binary or non-UTF-8 content not displayed ({})", display_name),
        },
        Err(e) => format!("Error reading file ({}): {}", display_name, e),
    }
}

/// Matches the bare secrets file and its per-environment variants
/// (`.env`, `.env.production`, ...), case-insensitively.
pub fn is_env_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower == ENV_FILE_NAME || lower.starts_with(".env.")
}

/// Masks the value of every `KEY=value` assignment whose key is non-empty and
/// not a comment. Comment lines and lines without `=` pass through unchanged.
/// This is a content transform only; the file itself stays included.
pub fn redact_env_values(content: &str) -> String {
    let mut lines = Vec::new();
    for line in content.lines() {
        match line.split_once('=') {
            Some((key, _)) => {
                let key = key.trim();
                if key.is_empty() || key.starts_with('#') {
                    lines.push(line.to_string());
                } else {
                    lines.push(format!("{}={}", key, REDACTION_MASK));
                }
            }
            None => lines.push(line.to_string()),
        }
    }
    lines.join("\n")
}
