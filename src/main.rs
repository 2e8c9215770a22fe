use clap::{Parser, Subcommand};
use ctxclip::assemble::{build_context, common_base_dir, relative_display};
use ctxclip::collector::collect_files;
use ctxclip::config::{Config, ConfigStore};
use ctxclip::copy_context_to_clipboard;
use ctxclip::errors::ContextError;
use ctxclip::instructions::InstructionsProvider;
use ctxclip::logger::initialize_logger;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    cmd: SubCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum SubCommands {
    /// Assemble the context document and copy it to the clipboard
    Build(BuildArgs),
    /// List the files the next build would include
    Preview,
    /// Add or remove included files and folders
    Include(IncludeArgs),
    /// Add or remove excluded files and folders
    Exclude(ExcludeArgs),
    /// Add or remove excluded file extensions
    Types(TypesArgs),
    /// Show or change custom-instructions settings
    Settings(SettingsArgs),
}

#[derive(Parser, Debug, Clone)]
struct BuildArgs {
    /// Task instructions to embed in the document
    #[arg(short = 'i', long)]
    instructions: Option<String>,
    /// Read task instructions from a file
    #[arg(short = 'I', long, conflicts_with = "instructions")]
    instructions_file: Option<PathBuf>,
    /// Prior error/output text to embed in the document
    #[arg(short = 'o', long)]
    prior_output: Option<String>,
    /// Read prior error/output from a file
    #[arg(short = 'O', long, conflicts_with = "prior_output")]
    prior_output_file: Option<PathBuf>,
    /// Print the document instead of copying it to the clipboard
    #[arg(long)]
    stdout: bool,
}

#[derive(Parser, Debug, Clone)]
struct IncludeArgs {
    /// Files, folders, or glob patterns
    #[arg(required_unless_present = "clear")]
    paths: Vec<String>,
    /// Remove the given entries instead of adding them
    #[arg(short = 'r', long)]
    remove: bool,
    /// Remove every included path
    #[arg(long, conflicts_with = "remove")]
    clear: bool,
}

#[derive(Parser, Debug, Clone)]
struct ExcludeArgs {
    /// Files or folders to veto regardless of inclusion
    #[arg(required = true)]
    paths: Vec<String>,
    /// Remove the given entries instead of adding them
    #[arg(short = 'r', long)]
    remove: bool,
}

#[derive(Parser, Debug, Clone)]
struct TypesArgs {
    /// Extensions to exclude (e.g. '.log'; the leading dot is optional)
    #[arg(required = true)]
    extensions: Vec<String>,
    /// Remove the given extensions instead of adding them
    #[arg(short = 'r', long)]
    remove: bool,
}

#[derive(Parser, Debug, Clone)]
struct SettingsArgs {
    /// URL to fetch custom instructions from
    #[arg(long)]
    url: Option<String>,
    /// Whether builds should embed the custom-instructions section
    #[arg(long)]
    use_custom: Option<bool>,
    /// Probe the configured URL and report the outcome
    #[arg(long)]
    test_url: bool,
    /// Print the current configuration
    #[arg(long)]
    show: bool,
}

#[tokio::main]
async fn main() {
    let cli_args = CliArgs::parse();
    initialize_logger();

    let store = match ConfigStore::default_location() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error locating configuration: {}", e);
            return;
        }
    };
    let mut config = store.load();

    let changed = match cli_args.cmd {
        SubCommands::Build(args) => {
            run_build(args, &store, &config).await;
            false
        }
        SubCommands::Preview => {
            run_preview(&config);
            false
        }
        SubCommands::Include(args) => run_include(args, &mut config),
        SubCommands::Exclude(args) => run_exclude(args, &mut config),
        SubCommands::Types(args) => run_types(args, &mut config),
        SubCommands::Settings(args) => run_settings(args, &store, &mut config).await,
    };

    if changed {
        if let Err(e) = store.save(&config) {
            error!("Could not save config: {}", e);
        }
    }
}

async fn run_build(args: BuildArgs, store: &ConfigStore, config: &Config) {
    let instructions = match text_or_file(args.instructions, args.instructions_file).await {
        Ok(text) => text,
        Err(e) => {
            error!("Could not read instructions: {}", e);
            return;
        }
    };
    let prior_output = match text_or_file(args.prior_output, args.prior_output_file).await {
        Ok(text) => text,
        Err(e) => {
            error!("Could not read prior output: {}", e);
            return;
        }
    };

    let has_custom_source = config.use_custom_instructions
        && (!config.custom_instructions_url.trim().is_empty() || store.cache_path().exists());
    if config.included_paths.is_empty()
        && instructions.trim().is_empty()
        && prior_output.trim().is_empty()
        && !has_custom_source
    {
        warn!("Nothing to build context from.");
        return;
    }

    let provider = InstructionsProvider::new(store.cache_path());
    let document = build_context(&instructions, &prior_output, config, &provider).await;

    if args.stdout {
        println!("{}", document);
        return;
    }

    if let Err(e) = copy_context_to_clipboard(&document).await {
        // The document must survive a clipboard failure.
        error!("Could not copy to clipboard: {}", e);
        println!("{}", document);
    }
}

async fn text_or_file(
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<String, ContextError> {
    if let Some(text) = text {
        return Ok(text);
    }
    match file {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => Ok(String::new()),
    }
}

fn run_preview(config: &Config) {
    let files = collect_files(config);
    if files.is_empty() {
        info!("No files would be included.");
        return;
    }
    info!("{} files would be included:", files.len());
    let base = common_base_dir(config);
    for path in &files {
        println!("{}", relative_display(path, &base));
    }
}

fn run_include(args: IncludeArgs, config: &mut Config) -> bool {
    if args.clear {
        config.clear_included_paths();
        info!("Cleared included paths.");
        return true;
    }

    let mut changed = false;
    for raw in &args.paths {
        if args.remove {
            if config.remove_included_path(raw) {
                changed = true;
                info!("No longer including {}", raw);
            } else {
                warn!("Not in included paths: {}", raw);
            }
            continue;
        }
        for path in expand_path_arg(raw) {
            if config.add_included_path(&path) {
                changed = true;
                info!("Including {}", path.display());
            }
        }
    }
    changed
}

/// Literal paths are taken as-is; anything that does not exist is treated as
/// a glob pattern and expanded.
fn expand_path_arg(raw: &str) -> Vec<PathBuf> {
    let path = PathBuf::from(raw);
    if path.exists() {
        return vec![path];
    }
    match glob::glob(raw) {
        Ok(entries) => {
            let matched: Vec<PathBuf> = entries.filter_map(|e| e.ok()).collect();
            if matched.is_empty() {
                warn!("No files matched: {}", raw);
            }
            matched
        }
        Err(e) => {
            warn!("Invalid pattern {}: {}", raw, e);
            Vec::new()
        }
    }
}

fn run_exclude(args: ExcludeArgs, config: &mut Config) -> bool {
    let mut changed = false;
    for raw in &args.paths {
        if args.remove {
            if config.remove_excluded_path(raw) {
                changed = true;
                info!("No longer excluding {}", raw);
            } else {
                warn!("Not in excluded paths: {}", raw);
            }
            continue;
        }
        let path = PathBuf::from(raw);
        if !path.exists() {
            warn!("Skipping exclude for missing path: {}", raw);
            continue;
        }
        if config.add_excluded_path(&path) {
            changed = true;
            info!("Excluding {}", path.display());
        }
    }
    changed
}

fn run_types(args: TypesArgs, config: &mut Config) -> bool {
    let mut changed = false;
    for raw in &args.extensions {
        if args.remove {
            if config.remove_excluded_type(raw) {
                changed = true;
                info!("No longer excluding extension {}", raw);
            } else {
                warn!("Not in excluded extensions: {}", raw);
            }
        } else {
            match config.add_excluded_type(raw) {
                Some(stored) => {
                    changed = true;
                    info!("Excluding extension {}", stored);
                }
                None => warn!("Not a valid extension: {}", raw),
            }
        }
    }
    changed
}

async fn run_settings(args: SettingsArgs, store: &ConfigStore, config: &mut Config) -> bool {
    let mut changed = false;
    if let Some(url) = args.url {
        config.custom_instructions_url = url.trim().to_string();
        changed = true;
    }
    if let Some(flag) = args.use_custom {
        config.use_custom_instructions = flag;
        changed = true;
    }

    if args.test_url {
        let url = config.custom_instructions_url.trim();
        if url.is_empty() {
            warn!("No URL configured to test.");
        } else {
            let provider = InstructionsProvider::new(store.cache_path());
            match provider.fetch(url).await {
                Ok(body) => info!("Successfully fetched {} bytes.", body.len()),
                Err(e) => error!("URL test failed: {}", e),
            }
        }
    }

    if args.show || (!changed && !args.test_url) {
        match serde_json::to_string_pretty(config) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Could not render config: {}", e),
        }
    }
    changed
}
