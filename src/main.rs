//! Main entry point for the remotezip CLI application.
//!
//! This binary lists and extracts members of ZIP archives served over HTTP
//! with Range support, or stored on the local filesystem.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use remotezip::{
    ArchiveHandle, Cli, HttpRangeFetcher, LocalFileFetcher, RangeFetcher, RemoteZip, TocEntry,
};

/// Application entry point.
///
/// Parses command-line arguments and dispatches to the appropriate fetcher
/// based on whether the input is a local file or HTTP URL.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    if cli.is_http_url() {
        let fetcher = Arc::new(HttpRangeFetcher::new(cli.http_options())?);
        let zip = RemoteZip::with_policy(fetcher.clone(), cli.fetch_policy());

        process_zip(&zip, &cli).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            eprintln!(
                "\nTotal bytes transferred: {}",
                format_size(fetcher.transferred_bytes())
            );
        }
    } else {
        let zip = RemoteZip::with_policy(Arc::new(LocalFileFetcher::new()), cli.fetch_policy());
        process_zip(&zip, &cli).await?;
    }

    Ok(())
}

/// Process an archive based on CLI options.
///
/// - List mode (`-l` or `-v`): Display archive contents
/// - Extract mode: Extract members matching the specified filters
async fn process_zip<F: RangeFetcher + ?Sized>(zip: &RemoteZip<F>, cli: &Cli) -> Result<()> {
    let archive = zip.open_archive(&cli.file).await?;
    let entries = zip.list_contents(&archive).await?;

    if cli.list || cli.verbose {
        list_files(&entries, cli.verbose);
        return Ok(());
    }

    let files_to_extract: Vec<_> = entries.iter().filter(|e| is_selected(e, cli)).collect();

    if !cli.files.is_empty() && files_to_extract.is_empty() {
        anyhow::bail!("No members matching {:?} in {}", cli.files, cli.file);
    }

    let multiple_files = cli.pipe && files_to_extract.len() > 1;
    for entry in files_to_extract {
        extract_file(zip, &archive, entry, cli, multiple_files).await?;
    }

    Ok(())
}

/// Whether `entry` passes the member and exclusion filters.
///
/// Directory entries are never selected; they are created as needed.
fn is_selected(entry: &TocEntry, cli: &Cli) -> bool {
    if entry.is_dir() {
        return false;
    }

    let name = entry.display_name();

    if !cli.files.is_empty() {
        let matches = cli.files.iter().any(|f| {
            if has_glob_chars(f) {
                glob_match(f, &name)
            } else {
                // Exact byte match on the full name, or on the base name
                let basename = name.rsplit('/').next().unwrap_or_default();
                entry.file_name == f.as_bytes() || basename == f.as_str()
            }
        });
        if !matches {
            return false;
        }
    }

    !cli
        .exclude
        .iter()
        .any(|x| name.contains(x.as_str()) || glob_match(x, &name))
}

/// List the entries of the archive.
///
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Detailed table with size, compression ratio, and timestamps
fn list_files(entries: &[TocEntry], verbose: bool) {
    if !verbose {
        for entry in entries {
            println!("{}", entry.display_name());
        }
        return;
    }

    println!(
        "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
        "Length", "Size", "Cmpr", "Date", "Time"
    );
    println!("{}", "-".repeat(70));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in entries {
        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        let uncompressed = entry.uncompressed_size as u64;
        let compressed = entry.compressed_size as u64;

        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            uncompressed,
            compressed,
            ratio(compressed, uncompressed),
            year,
            month,
            day,
            hour,
            minute,
            entry.display_name()
        );

        if !entry.is_dir() {
            total_uncompressed += uncompressed;
            total_compressed += compressed;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(70));
    println!(
        "{:>10}  {:>10}  {}  {:>21}  {} files",
        total_uncompressed,
        total_compressed,
        ratio(total_compressed, total_uncompressed),
        "",
        file_count
    );
}

/// Compression ratio as percentage saved
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

/// Extract a single member.
///
/// - Pipe mode (`-p`): Write to stdout instead of file
/// - Custom output directory (`-d`): Extract to specified directory
/// - Junk paths (`-j`): Ignore directory structure in archive
/// - Overwrite control (`-n`, `-o`): Handle existing files
async fn extract_file<F: RangeFetcher + ?Sized>(
    zip: &RemoteZip<F>,
    archive: &ArchiveHandle,
    entry: &TocEntry,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    if cli.pipe {
        let data = zip.extract_entry(archive, entry).await?;
        let mut stdout = tokio::io::stdout();
        if show_filename {
            stdout
                .write_all(format!("--- {} ---\n", entry.display_name()).as_bytes())
                .await?;
        }
        stdout.write_all(&data).await?;
        stdout.flush().await?;
        return Ok(());
    }

    let Some(relative) = entry.enclosed_name() else {
        if !cli.is_very_quiet() {
            eprintln!("Skipping: {} (unsafe path)", entry.display_name());
        }
        return Ok(());
    };

    let relative = if cli.junk_paths {
        relative
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| relative.clone())
    } else {
        relative
    };

    let output_path = match cli.extract_dir {
        Some(ref dir) => PathBuf::from(dir).join(&relative),
        None => relative,
    };

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.display_name());
            }
            return Ok(());
        }

        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.display_name());
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.display_name());
    }

    let data = zip.extract_entry(archive, entry).await?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let mut file = fs::File::create(&output_path).await?;
    file.write_all(&data).await?;

    Ok(())
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            // Either skip the star, or let it swallow one more character
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
