use crate::collector::collect_files;
use crate::config::Config;
use crate::instructions::InstructionsProvider;
use crate::render::render_file_content;
use chrono::Local;
use std::env;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

const NO_CUSTOM_INSTRUCTIONS: &str = "<!-- No custom instructions content -->";

/// Composes the final context document. Tag names and nesting order are fixed
/// for compatibility with downstream tooling that parses this format.
pub async fn build_context(
    task_instructions: &str,
    prior_output: &str,
    config: &Config,
    provider: &InstructionsProvider,
) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut parts: Vec<String> = Vec::new();
    parts.push("<context>".to_string());
    parts.push(format!("    <timestamp>{}</timestamp>", timestamp));

    if !task_instructions.trim().is_empty() {
        parts.push("    <instructions>".to_string());
        parts.push(task_instructions.to_string());
        parts.push("    </instructions>".to_string());
    }

    if !prior_output.trim().is_empty() {
        parts.push("    <output>".to_string());
        parts.push(prior_output.to_string());
        parts.push("    </output>".to_string());
    }

    if config.use_custom_instructions {
        let content = provider.get_instructions(config).await;
        parts.push("    <custom_instructions>".to_string());
        if content.trim().is_empty() {
            parts.push(NO_CUSTOM_INSTRUCTIONS.to_string());
        } else {
            parts.push(content);
        }
        parts.push("    </custom_instructions>".to_string());
    }

    parts.push("    <repository_structure>".to_string());
    let files = collect_files(config);
    let base = common_base_dir(config);
    debug!(
        "Rendering {} files relative to {}",
        files.len(),
        base.display()
    );

    for path in &files {
        let rel = relative_display(path, &base);
        let content = render_file_content(path).await;
        parts.push("        <file>".to_string());
        parts.push(format!("            <path>{}</path>", rel));
        parts.push(format!(
            "            <content><![CDATA[{}]]></content>",
            escape_cdata(&content)
        ));
        parts.push("        </file>".to_string());
    }
    parts.push("    </repository_structure>".to_string());
    parts.push("</context>".to_string());

    info!("Context document assembled ({} files)", files.len());
    parts.join("\n")
}

/// Splits any `]]>` inside the payload across two CDATA sections so file
/// content can never terminate the enclosing block early.
fn escape_cdata(content: &str) -> String {
    content.replace("]]>", "]]]]><![CDATA[>")
}

/// Base directory for relative path display: the common ancestor of every
/// included entry's own directory (for files) or the entry itself (for
/// directories). Falls back to the current working directory when no common
/// ancestor exists.
pub fn common_base_dir(config: &Config) -> PathBuf {
    let fallback = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut anchors = Vec::new();
    let mut resolved_entries = Vec::new();
    for entry in &config.included_paths {
        let Ok(resolved) = Path::new(entry).canonicalize() else {
            continue;
        };
        let anchor = if resolved.is_file() {
            match resolved.parent() {
                Some(parent) => parent.to_path_buf(),
                None => continue,
            }
        } else {
            resolved.clone()
        };
        anchors.push(anchor);
        resolved_entries.push(resolved);
    }
    if anchors.is_empty() {
        return fallback;
    }

    let Some(common) = common_path(&anchors) else {
        return fallback;
    };
    if resolved_entries.iter().all(|p| p.starts_with(&common)) {
        common
    } else {
        fallback
    }
}

/// Renders `path` relative to `base` with forward slashes, or as the absolute
/// path when it does not live under `base`.
pub fn relative_display(path: &Path, base: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    match resolved.strip_prefix(base) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().replace('\\', "/"),
        _ => resolved.to_string_lossy().replace('\\', "/"),
    }
}

fn common_path(paths: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = paths.split_first()?;
    let mut shared: Vec<Component> = first.components().collect();
    for path in rest {
        let components: Vec<Component> = path.components().collect();
        let keep = shared
            .iter()
            .zip(components.iter())
            .take_while(|(a, b)| a == b)
            .count();
        shared.truncate(keep);
        if shared.is_empty() {
            return None;
        }
    }
    Some(shared.iter().map(|c| c.as_os_str()).collect())
}
