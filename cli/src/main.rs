//! pdftree CLI - structured PDF content extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;

use pdftree::{parse_file_with_options, render, AnalyzeOptions, JsonFormat, StructuredDocument};

#[derive(Parser)]
#[command(name = "pdftree")]
#[command(version)]
#[command(about = "Extract structured content from PDF files as JSON", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output JSON file ("-" for stdout)
    #[arg(short, long, value_name = "FILE", default_value = "output.json")]
    output: PathBuf,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Maximum number of pages to process (0 = all)
    #[arg(long, default_value = "0")]
    max_pages: usize,

    /// Disable parallel page extraction
    #[arg(long)]
    sequential: bool,

    /// Print a content summary after extraction
    #[arg(long)]
    stats: bool,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn run(cli: &Cli) -> pdftree::Result<()> {
    let mut options = AnalyzeOptions::new().with_max_pages(cli.max_pages);
    if cli.sequential {
        options = options.sequential();
    }

    let document = parse_file_with_options(&cli.input, options)?;

    let format = if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = render::to_json(&document, format)?;

    write_output(&cli.output, &json)?;

    if cli.stats {
        print_stats(&document);
    }

    Ok(())
}

fn write_output(path: &Path, json: &str) -> pdftree::Result<()> {
    if path.as_os_str() == "-" {
        println!("{}", json);
    } else {
        fs::write(path, json)?;
        println!("{} {}", "Saved to".green(), path.display());
    }
    Ok(())
}

fn print_stats(document: &StructuredDocument) {
    let paragraphs = document.content.iter().filter(|i| i.is_paragraph()).count();
    let tables = document.content.iter().filter(|i| i.is_table()).count();
    let charts = document.content.iter().filter(|i| i.is_chart()).count();

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Source".bold(), document.info.source);
    println!("{}: {}", "Pages".bold(), document.info.pages);
    println!("{}: {}", "Paragraphs".bold(), paragraphs);
    println!("{}: {}", "Tables".bold(), tables);
    println!("{}: {}", "Charts".bold(), charts);
    if let Some(chars) = document.info.chars {
        println!("{}: {}", "Characters".bold(), chars);
    }
    if let Some(words) = document.info.words {
        println!("{}: {}", "Words".bold(), words);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_output() {
        let cli = Cli::parse_from(["pdftree", "input.pdf"]);
        assert_eq!(cli.output, PathBuf::from("output.json"));
        assert!(!cli.compact);
        assert_eq!(cli.max_pages, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "pdftree",
            "input.pdf",
            "-o",
            "out.json",
            "--compact",
            "--max-pages",
            "5",
            "-vv",
        ]);
        assert_eq!(cli.output, PathBuf::from("out.json"));
        assert!(cli.compact);
        assert_eq!(cli.max_pages, 5);
        assert_eq!(cli.verbose, 2);
    }
}
