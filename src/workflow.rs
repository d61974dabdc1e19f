use crate::tui::{self, ViewTab, YankRequest};
use crate::{cli, clipboard};
use anyhow::{Context, Result, bail};
use ctxyank::{
    Config, FileSource, FolderOpen, FsSource, PathPicker, Preferences, Session, TextMetrics,
    TreeBuilder, Warning, minify,
};
use glob::Pattern;
use std::path::Path;

/// Project config with command-line overrides applied.
fn load_effective_config(cli_args: &cli::Cli) -> Result<Config> {
    let mut config = Config::load(&cli_args.root, cli_args.config.as_deref())
        .context("loading configuration")?;
    if let Some(names) = &cli_args.exclude {
        config.scan.exclude = names.clone();
    }
    if cli_args.gitignore {
        config.scan.respect_gitignore = true;
    }
    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn load_preferences() -> (Preferences, Option<std::path::PathBuf>) {
    let path = Preferences::default_path();
    let preferences = match path.as_deref().map(Preferences::load) {
        Some(Ok(preferences)) => preferences,
        Some(Err(e)) => {
            log::warn!("Ignoring unreadable preferences: {}", e);
            Preferences::default()
        }
        None => Preferences::default(),
    };
    (preferences, path)
}

fn compile_patterns(raw: &[String]) -> Result<Vec<Pattern>> {
    raw.iter()
        .map(|s| {
            Pattern::new(s).with_context(|| format!("invalid --select glob pattern '{}'", s))
        })
        .collect()
}

/// Node paths carry the root name; patterns are written relative to the root.
fn relative_to_root<'p>(node_path: &'p str, root_name: &str) -> &'p str {
    node_path
        .strip_prefix(root_name)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(node_path)
}

/// Selects every file whose root-relative path matches one of `patterns`.
/// Returns the number of files newly selected.
fn preselect<S: FileSource>(session: &mut Session<S>, patterns: &[Pattern]) -> Result<usize> {
    if patterns.is_empty() {
        return Ok(0);
    }
    let tree = session.tree().context("no folder open")?;
    let mut matches = Vec::new();
    tree.root.walk(&mut |node| {
        let relative = relative_to_root(&node.path, &tree.root.name);
        if !node.is_dir()
            && !session.selection().is_selected(&node.path)
            && patterns.iter().any(|p| p.matches(relative))
        {
            matches.push(node.path.clone());
        }
    });

    for path in &matches {
        session.toggle_selection(path, false)?;
    }
    log::info!("Preselected {} files", matches.len());
    Ok(matches.len())
}

fn report_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("⚠️ Warning: {}", warning);
    }
}

fn render_output<S: FileSource>(
    session: &mut Session<S>,
    request: YankRequest,
) -> Result<(String, usize)> {
    let (text, files) = match request.view {
        ViewTab::Code => {
            let output = session.generate()?;
            (output.text, output.files_included)
        }
        ViewTab::Structure => (session.structure()?, 0),
    };
    if request.minified {
        Ok((minify(&text), files))
    } else {
        Ok((text, files))
    }
}

fn describe(request: YankRequest, files: usize) -> String {
    let what = match request.view {
        ViewTab::Code => format!("{} files", files),
        ViewTab::Structure => "the file structure".to_string(),
    };
    if request.minified {
        format!("{} (minified)", what)
    } else {
        what
    }
}

fn print_metrics(text: &str) {
    let metrics = TextMetrics::of(text);
    println!(
        "   {} lines, ≈ {} tokens (≈ {} minified)",
        metrics.lines, metrics.tokens, metrics.minified_tokens
    );
    if let Some(savings) = metrics.savings_badge() {
        println!("   Minifying would save {}%.", savings);
    }
}

// Performs the final action: printing for dry-run or copying to clipboard.
fn perform_final_action(output: &str, description: &str, is_dry_run: bool) -> Result<()> {
    if is_dry_run {
        println!("{}", output);
        println!("(Dry run: would copy {}. Clipboard not affected.)", description);
    } else {
        clipboard::copy_text(output)?;
        println!("✅ Copied {} to the clipboard.", description);
    }
    print_metrics(output);
    Ok(())
}

fn open_session(cli_args: &cli::Cli, config: &Config) -> Result<Session<FsSource>> {
    let source = FsSource::new(config.scan.respect_gitignore);
    let mut session = Session::new(source, TreeBuilder::new(config.exclusion_set()));
    match session.open_folder(&mut PathPicker::new(&cli_args.root))? {
        FolderOpen::Opened => Ok(session),
        FolderOpen::Cancelled => bail!("{} is not a directory", cli_args.root.display()),
    }
}

pub fn run_ctxyank(cli_args: cli::Cli) -> Result<()> {
    let config = load_effective_config(&cli_args)?;
    let mut session = open_session(&cli_args, &config)?;
    report_warnings(&session.take_warnings());

    let patterns = compile_patterns(&cli_args.select)?;
    preselect(&mut session, &patterns)?;

    let request = if cli_args.headless {
        YankRequest {
            view: if cli_args.structure {
                ViewTab::Structure
            } else {
                ViewTab::Code
            },
            minified: cli_args.minify,
        }
    } else {
        let (preferences, preferences_path) = load_preferences();
        match tui::run_tui(
            &mut session,
            preferences,
            preferences_path,
            config.debounce(),
        )? {
            Some(request) => request,
            None => {
                report_warnings(&session.take_warnings());
                println!("Selection cancelled. Exiting.");
                return Ok(());
            }
        }
    };

    let (output, files) = render_output(&mut session, request)?;
    report_warnings(&session.take_warnings());

    if output.is_empty() {
        println!("No files selected to copy.");
        if !cli_args.dry_run {
            std::process::exit(1);
        }
        return Ok(());
    }

    let root = session.root_handle().unwrap_or(Path::new("."));
    log::info!("Yanking from {}", root.display());
    perform_final_action(&output, &describe(request, files), cli_args.dry_run)
}
