//! bindery - JSON book to ebook/document converter

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use bindery::{Book, CoverImage, Format, encode_book};

#[derive(Parser)]
#[command(name = "bindery")]
#[command(version, about = "Convert a JSON book description into ebook and document formats", long_about = None)]
#[command(after_help = "EXAMPLES:
    bindery book.json --format epub              Write my_book.epub
    bindery book.json -f pdf -o out/             Write the PDF into out/
    bindery book.json -f epub --cover cover.jpg  Attach a cover image")]
struct Cli {
    /// Input JSON file describing the book
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output format: epub, mobi, azw, azw3, pdf, html, txt, rtf
    #[arg(short, long, value_name = "FORMAT")]
    format: Format,

    /// Directory to write the output file into (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Local image file to embed as the cover
    #[arg(long, value_name = "FILE")]
    cover: Option<PathBuf>,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let json = std::fs::read_to_string(&cli.input)
        .map_err(|e| format!("cannot read {}: {}", cli.input.display(), e))?;

    let mut book = Book::from_json_str(&json).map_err(|e| e.to_string())?;

    if let Some(cover_path) = &cli.cover {
        match load_cover(cover_path) {
            Ok(cover) => book = book.with_cover_image(cover),
            // A bad cover degrades the output, it does not fail the run
            Err(e) => eprintln!("warning: skipping cover: {e}"),
        }
    }

    let quiet = cli.quiet;
    let mut sink = |pct: u8, msg: &str| {
        if !quiet {
            eprintln!("[{pct:3}%] {msg}");
        }
    };

    let artifact = encode_book(cli.format, &book, &mut sink).map_err(|e| e.to_string())?;

    let dir = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(&artifact.file_name);
    std::fs::write(&path, &artifact.data)
        .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;

    if !quiet {
        eprintln!("wrote {} ({} bytes)", path.display(), artifact.data.len());
    }
    Ok(())
}

fn load_cover(path: &Path) -> Result<CoverImage, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    CoverImage::from_bytes(&bytes).map_err(|e| e.to_string())
}
