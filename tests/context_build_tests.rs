use ctxclip::assemble::build_context;
use ctxclip::config::{Config, ConfigStore};
use ctxclip::instructions::InstructionsProvider;
use std::path::Path;
use tempfile::tempdir;
use tokio::fs;
use tracing::debug;

fn config_including(paths: &[&Path]) -> Config {
    let mut config = Config::default();
    for path in paths {
        config.add_included_path(path);
    }
    config
}

fn provider_in(config_dir: &Path) -> InstructionsProvider {
    InstructionsProvider::new(ConfigStore::new(config_dir.to_path_buf()).cache_path())
}

#[tokio::test]
async fn test_blank_sections_are_omitted() {
    let dir = tempdir().unwrap();
    let config = Config::default();
    let provider = provider_in(dir.path());

    let document = build_context("   ", "\n\t", &config, &provider).await;

    assert!(document.starts_with("<context>"));
    assert!(document.ends_with("</context>"));
    assert!(document.contains("<timestamp>"));
    assert!(document.contains("<repository_structure>"));
    assert!(!document.contains("<instructions>"), "Blank instructions must be omitted");
    assert!(!document.contains("<output>"), "Blank output must be omitted");
    assert!(
        !document.contains("<custom_instructions>"),
        "Disabled custom instructions must be omitted"
    );
}

#[tokio::test]
async fn test_sections_carry_their_text_verbatim() {
    let dir = tempdir().unwrap();
    let config = Config::default();
    let provider = provider_in(dir.path());

    let document = build_context("Fix the bug", "stack trace here", &config, &provider).await;

    assert!(document.contains("    <instructions>\nFix the bug\n    </instructions>"));
    assert!(document.contains("    <output>\nstack trace here\n    </output>"));
}

#[tokio::test]
async fn test_cached_custom_instructions_are_used_without_url() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().to_path_buf());
    fs::create_dir_all(dir.path()).await.unwrap();
    fs::write(store.cache_path(), "Follow style guide.")
        .await
        .unwrap();

    let mut config = Config::default();
    config.use_custom_instructions = true;
    let provider = InstructionsProvider::new(store.cache_path());

    let document = build_context("", "", &config, &provider).await;
    assert!(
        document.contains("    <custom_instructions>\nFollow style guide.\n    </custom_instructions>"),
        "Cached text should appear verbatim: {}",
        document
    );
}

#[tokio::test]
async fn test_custom_instructions_placeholder_when_blank() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.use_custom_instructions = true;
    let provider = provider_in(dir.path());

    let document = build_context("", "", &config, &provider).await;
    assert!(document.contains("<!-- No custom instructions content -->"));
}

#[tokio::test]
async fn test_fetch_failure_becomes_diagnostic_comment() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.use_custom_instructions = true;
    // Nothing listens on the discard port, so the fetch fails fast.
    config.custom_instructions_url = "http://127.0.0.1:9/instructions".to_string();
    let provider = provider_in(dir.path());

    let document = build_context("", "", &config, &provider).await;
    assert!(
        document.contains("<!-- Failed to fetch custom instructions:"),
        "Fetch failure must surface as a comment: {}",
        document
    );

    debug!("Test passed for fetch-failure diagnostic.");
}

#[tokio::test]
async fn test_file_entries_use_relative_paths_and_cdata() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::create_dir_all(root.join("src")).await.unwrap();
    fs::write(root.join("src/a.rs"), "fn a() {}").await.unwrap();

    let config = config_including(&[&root]);
    let provider = provider_in(dir.path());

    let document = build_context("", "", &config, &provider).await;
    assert!(document.contains("            <path>src/a.rs</path>"));
    assert!(document.contains("<content><![CDATA[fn a() {}]]></content>"));
}

#[tokio::test]
async fn test_cdata_terminator_in_content_cannot_break_structure() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::write(root.join("tricky.txt"), "before ]]> after")
        .await
        .unwrap();

    let config = config_including(&[&root]);
    let provider = provider_in(dir.path());

    let document = build_context("", "", &config, &provider).await;
    assert!(
        document.contains("<![CDATA[before ]]]]><![CDATA[> after]]>"),
        "The embedded terminator must be split across CDATA sections: {}",
        document
    );
}

#[tokio::test]
async fn test_common_base_spans_multiple_includes() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::create_dir_all(root.join("src")).await.unwrap();
    fs::create_dir_all(root.join("docs")).await.unwrap();
    fs::write(root.join("src/lib.rs"), "lib").await.unwrap();
    fs::write(root.join("docs/readme.md"), "docs").await.unwrap();

    let config = config_including(&[&root.join("src"), &root.join("docs")]);
    let provider = provider_in(dir.path());

    let document = build_context("", "", &config, &provider).await;
    assert!(document.contains("<path>src/lib.rs</path>"));
    assert!(document.contains("<path>docs/readme.md</path>"));
}
