#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! Command-line driver for the precc preprocessing library: tokenizes a
//! source file, runs include resolution and macro expansion, and prints the
//! expanded token stream.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use precc::{PreprocessorConfig, Token, convert_keywords, preprocess_source, tokenize};

/// Exit codes for different error conditions
mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const IO_ERROR: i32 = 2;
    pub const PREPROCESS_ERROR: i32 = 3;
}

/// Command-line interface for the precc preprocessor
#[derive(Parser)]
#[command(
    name = "precc",
    version,
    author,
    about = "Include resolution and object-macro expansion for C source",
    long_about = "precc runs the preprocessing stage of a small C compiler front end: \
it resolves #include directives, expands single-token #define macros, and emits one \
flat token stream.",
    after_help = "EXAMPLES:
  # Preprocess a single file to stdout
  $ precc input.c

  # Write the expanded token stream to a file
  $ precc input.c -o output.toks

  # Add system include search directories
  $ precc input.c -I include -I /opt/include

  # Read from stdin
  $ cat input.c | precc -

  # Structured output for tooling
  $ precc input.c --json"
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Input C file to preprocess (use '-' for stdin)
    #[arg(help = "Input C file to preprocess (use '-' for stdin)")]
    input: PathBuf,

    /// Output file (use '-' for stdout, default: stdout)
    #[arg(
        short = 'o',
        long,
        help = "Output file (use '-' for stdout, default: stdout)"
    )]
    output: Option<PathBuf>,

    /// Add include directory
    #[arg(
        short = 'I',
        long = "include",
        value_name = "DIR",
        help = "Add directory to the system include search path"
    )]
    include_dirs: Vec<PathBuf>,

    /// Do not pull in a header's same-basename source file
    #[arg(long, help = "Disable header/source pairing on #include")]
    no_pair: bool,

    /// Maximum include nesting depth
    #[arg(long, default_value = "64", help = "Maximum include nesting depth")]
    max_include_depth: usize,

    /// Output in JSON format
    #[arg(long, help = "Output the token stream in JSON format")]
    #[cfg(feature = "json")]
    json: bool,

    /// One token per line instead of a single space-joined line
    #[arg(long, help = "Print one token per line for scripts")]
    plain: bool,

    /// Enable verbose output
    #[arg(
        short = 'v',
        long,
        help = "Enable verbose output with diagnostic information"
    )]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short = 'q', long, help = "Suppress non-error output (quiet mode)")]
    quiet: bool,

    /// Show what would happen without preprocessing
    #[arg(
        short = 'n',
        long,
        help = "Show what would happen without actually preprocessing"
    )]
    dry_run: bool,

    /// Disable colored output
    #[arg(long, help = "Disable colored output")]
    no_color: bool,

    /// Force colored output
    #[arg(long, help = "Force colored output even when not a terminal")]
    force_color: bool,
}

/// Main application entry point
fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            report_error(&e);
            determine_exit_code(&e)
        }
    });
}

/// Print the error chain, colored when appropriate
fn report_error(error: &anyhow::Error) {
    let use_color = atty::is(atty::Stream::Stderr);
    if use_color {
        eprintln!("{} {error:#}", "error:".red().bold());
    } else {
        eprintln!("error: {error:#}");
    }
}

/// Determine the appropriate exit code based on the error
fn determine_exit_code(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<std::io::Error>().is_some() {
        exit_code::IO_ERROR
    } else if let Some(pe) = error.downcast_ref::<precc::PreprocessError>() {
        match pe {
            precc::PreprocessError::Io(_) => exit_code::IO_ERROR,
            _ => exit_code::PREPROCESS_ERROR,
        }
    } else {
        exit_code::GENERAL_ERROR
    }
}

/// Run the main application logic
fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    } else if cli.force_color {
        colored::control::set_override(true);
    }

    if cli.dry_run {
        show_dry_run_info(&cli);
        return Ok(());
    }

    let config = create_config(&cli);

    let start_time = std::time::Instant::now();
    let mut tokens = if cli.input == PathBuf::from("-") {
        let input = read_stdin()?;
        preprocess_source(&input, &config)?
    } else {
        let input = std::fs::read_to_string(&cli.input)
            .with_context(|| format!("failed to read input file: {}", cli.input.display()))?;
        let raw = tokenize(&input);
        precc::Preprocessor::with_config(config)
            .preprocess(&raw, Some(&cli.input))?
    };
    convert_keywords(&mut tokens);
    let processing_time = start_time.elapsed();

    write_output(&cli, &tokens)?;

    if cli.verbose && !cli.quiet {
        show_verbose_info(&cli, tokens.len(), processing_time);
    }

    Ok(())
}

/// Show dry run information
fn show_dry_run_info(cli: &Cli) {
    let input_display = format_input(&cli.input);
    let output_display = cli
        .output
        .as_ref()
        .map_or("stdout".to_string(), format_output);

    eprintln!("Dry run: would preprocess {input_display} -> {output_display}");
    eprintln!("Header/source pairing: {}", !cli.no_pair);
    eprintln!("Max include depth: {}", cli.max_include_depth);

    if !cli.include_dirs.is_empty() {
        eprintln!("Extra include directories:");
        for dir in &cli.include_dirs {
            eprintln!("  {}", dir.display());
        }
    }
}

/// Create preprocessor configuration from CLI arguments
fn create_config(cli: &Cli) -> PreprocessorConfig {
    let mut config = PreprocessorConfig::new()
        .with_pair_sources(!cli.no_pair)
        .with_max_include_depth(cli.max_include_depth);

    if !cli.include_dirs.is_empty() {
        // User-supplied directories are searched before the defaults.
        let mut dirs = cli.include_dirs.clone();
        dirs.extend(config.system_include_dirs.clone());
        config = config.with_system_include_dirs(dirs);
    }

    config
}

/// Read input from stdin
fn read_stdin() -> Result<String> {
    use std::io::Read;
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

/// Render the token stream and write it to the chosen destination
fn write_output(cli: &Cli, tokens: &[Token]) -> Result<()> {
    #[cfg(feature = "json")]
    if cli.json {
        return write_json_output(cli, tokens);
    }

    let rendered = if cli.plain {
        tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    };

    match &cli.output {
        Some(output_path) if output_path != &PathBuf::from("-") => {
            std::fs::write(output_path, rendered + "\n").with_context(|| {
                format!("failed to write to output file: {}", output_path.display())
            })?;
        }
        _ => {
            println!("{rendered}");
        }
    }

    Ok(())
}

/// Write the token stream as a JSON array of kind/text pairs
#[cfg(feature = "json")]
fn write_json_output(cli: &Cli, tokens: &[Token]) -> Result<()> {
    use serde_json::json;

    let entries: Vec<_> = tokens
        .iter()
        .map(|t| json!({ "kind": t.kind_name(), "text": t.to_string() }))
        .collect();
    let result = json!({
        "input_file": format_input(&cli.input),
        "tokens": entries,
    });

    let rendered = serde_json::to_string_pretty(&result)?;
    match &cli.output {
        Some(output_path) if output_path != &PathBuf::from("-") => {
            std::fs::write(output_path, rendered + "\n").with_context(|| {
                format!("failed to write to output file: {}", output_path.display())
            })?;
        }
        _ => println!("{rendered}"),
    }
    Ok(())
}

/// Show verbose information
fn show_verbose_info(cli: &Cli, token_count: usize, processing_time: std::time::Duration) {
    eprintln!("Input: {}", format_input(&cli.input));
    eprintln!("Tokens emitted: {token_count}");
    eprintln!("Processing time: {processing_time:?}");

    if !cli.include_dirs.is_empty() {
        eprintln!("Extra include directories ({}):", cli.include_dirs.len());
        for dir in &cli.include_dirs {
            eprintln!("  {}", dir.display());
        }
    }
}

/// Format input path for display
fn format_input(path: &PathBuf) -> String {
    if path == &PathBuf::from("-") {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

/// Format output path for display
fn format_output(path: &PathBuf) -> String {
    if path == &PathBuf::from("-") {
        "stdout".to_string()
    } else {
        path.display().to_string()
    }
}
