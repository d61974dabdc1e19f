use clap::Parser;
use std::path::PathBuf;

/// ctxyank – select parts of a directory tree and copy them as one LLM-ready snippet
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root to open (defaults to CWD)
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Comma-separated entry names to leave out of the tree (replaces the configured list).
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub exclude: Option<Vec<String>>,

    /// Hide files ignored by .gitignore/.ignore
    #[arg(long)]
    pub gitignore: bool,

    /// Config file to use instead of <DIR>/.ctxyank.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Glob patterns to preselect files (e.g., "src/**/*.rs").
    /// Paths are relative to the root directory.
    /// Can be specified multiple times using --select <PATTERN_1> --select <PATTERN_2> ...
    #[arg(long, value_name = "PATTERN")]
    pub select: Vec<String>,

    /// Skip the TUI and yank whatever --select matched.
    #[arg(long)]
    pub headless: bool,

    /// Yank the ASCII file structure instead of file contents.
    #[arg(long)]
    pub structure: bool,

    /// Yank the whitespace-collapsed variant.
    #[arg(long)]
    pub minify: bool,

    /// Print the result instead of copying it to the clipboard.
    #[arg(long)]
    pub dry_run: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// No log output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_current_directory() {
        let cli = Cli::parse_from(["ctxyank"]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.exclude.is_none());
        assert!(!cli.headless);
    }

    #[test]
    fn exclude_is_comma_separated_and_select_repeats() {
        let cli = Cli::parse_from([
            "ctxyank",
            "proj",
            "--exclude",
            "target,build",
            "--select",
            "src/**/*.rs",
            "--select",
            "*.toml",
            "-vv",
        ]);
        assert_eq!(cli.root, PathBuf::from("proj"));
        assert_eq!(
            cli.exclude,
            Some(vec!["target".to_string(), "build".to_string()])
        );
        assert_eq!(cli.select, vec!["src/**/*.rs", "*.toml"]);
        assert_eq!(cli.verbose, 2);
    }
}
