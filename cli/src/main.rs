//! pdflines CLI - PDF line and span extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdflines::render::{page_markup, to_json};
use pdflines::{sniff_file, JsonFormat, PageRange, PdfProvider, ProviderConfig};

#[derive(Parser)]
#[command(name = "pdflines")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract lines and styled spans from PDF pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that opens a document.
#[derive(clap::Args)]
struct OpenArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Page range, 1-based (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Decoding worker threads
    #[arg(long, env = "PDFLINES_WORKERS")]
    workers: Option<usize>,

    /// Do not flatten form fields and annotations
    #[arg(long)]
    no_flatten: bool,

    /// JSON file with provider options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl OpenArgs {
    fn provider_config(&self) -> Result<ProviderConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => {
                log::debug!("Loading options from {}", path.display());
                ProviderConfig::from_json_file(path)?
            }
            None => ProviderConfig::new(),
        };
        if let Some(pages) = &self.pages {
            config = config.with_page_range(PageRange::parse(pages)?);
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if self.no_flatten {
            config = config.with_flatten(false);
        }
        Ok(config)
    }

    fn open(&self) -> Result<PdfProvider, Box<dyn std::error::Error>> {
        let config = self.provider_config()?;

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Reading {}...", self.input.display()));

        log::debug!(
            "Opening {} with {} workers",
            self.input.display(),
            config.workers
        );
        let provider = PdfProvider::open_with_config(&self.input, config);
        pb.finish_and_clear();
        Ok(provider?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print kept pages as JSON lines and spans
    Lines {
        #[command(flatten)]
        open: OpenArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print each kept page as inline markup
    Html {
        #[command(flatten)]
        open: OpenArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        #[command(flatten)]
        open: OpenArgs,
    },

    /// Render a page to PNG
    Image {
        #[command(flatten)]
        open: OpenArgs,

        /// Page number, 1-based
        #[arg(long, default_value = "1")]
        page: usize,

        /// Resolution in dots per inch
        #[arg(long, default_value = "96")]
        dpi: u32,

        /// Output PNG file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lines {
            open,
            output,
            compact,
        } => cmd_lines(&open, output.as_deref(), compact),
        Commands::Html { open, output } => cmd_html(&open, output.as_deref()),
        Commands::Info { open } => cmd_info(&open),
        Commands::Image {
            open,
            page,
            dpi,
            output,
        } => cmd_image(&open, page, dpi, &output),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_lines(
    open: &OpenArgs,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = open.open()?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = to_json(provider.page_lines(), format)?;
    write_or_print(output, &json)
}

fn cmd_html(open: &OpenArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let provider = open.open()?;

    let mut html = String::new();
    for (index, page) in provider.page_lines() {
        html.push_str(&format!("<div data-page='{}'>\n", index + 1));
        html.push_str(&page_markup(page));
        html.push_str("\n</div>\n");
    }

    write_or_print(output, html.trim_end())
}

fn cmd_info(open: &OpenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let header = sniff_file(&open.input)?;
    let provider = open.open()?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), open.input.display());
    println!("{}: {}", "Format".bold(), header);
    println!("{}: {}", "Pages".bold(), provider.page_count());
    println!(
        "{}: {}",
        "Workers".bold(),
        provider.config().workers
    );

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for index in 0..provider.page_count() {
        let bbox = provider.get_page_bbox(index)?;
        let status = match provider.get_page_lines(index) {
            Some(page) => format!("{} lines, {} spans", page.line_count(), page.span_count())
                .green()
                .to_string(),
            None => "no text".dimmed().to_string(),
        };
        println!(
            "{:>4}  {:>7.1} x {:<7.1}  {}",
            index + 1,
            bbox[2] - bbox[0],
            bbox[3] - bbox[1],
            status
        );
    }

    Ok(())
}

fn cmd_image(
    open: &OpenArgs,
    page: usize,
    dpi: u32,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if page == 0 {
        return Err("page numbers start at 1".into());
    }
    let provider = open.open()?;
    let image = provider.get_image(page - 1, dpi)?;
    image.save(output)?;
    println!(
        "{} {} ({}x{})",
        "Saved to".green(),
        output.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdflines".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF line and span extraction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(config: Option<PathBuf>) -> OpenArgs {
        OpenArgs {
            input: PathBuf::from("document.pdf"),
            pages: None,
            workers: None,
            no_flatten: false,
            config,
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"workers": 2, "flatten_pdf": true}}"#).unwrap();

        let mut open = args(Some(file.path().to_path_buf()));
        let config = open.provider_config().unwrap();
        assert_eq!(config.workers, 2);
        assert!(config.flatten_pdf);

        open.pages = Some("2-3".to_string());
        open.workers = Some(6);
        open.no_flatten = true;
        let config = open.provider_config().unwrap();
        assert_eq!(config.page_range, PageRange::Pages(vec![1, 2]));
        assert_eq!(config.workers, 6);
        assert!(!config.flatten_pdf);
    }

    #[test]
    fn test_bad_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(args(Some(file.path().to_path_buf())).provider_config().is_err());
    }

    #[test]
    fn test_cli_parses_image_command() {
        let argv = ["pdflines", "image", "a.pdf", "--page", "2", "-o", "p.png"];
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Image { page, dpi, .. } => {
                assert_eq!(page, 2);
                assert_eq!(dpi, 96);
            }
            _ => panic!("expected image command"),
        }
    }
}
