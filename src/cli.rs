use clap::Parser;
use std::time::Duration;

use crate::config::{FetchPolicy, HttpOptions};

#[derive(Parser, Debug)]
#[command(name = "remotezip")]
#[command(version)]
#[command(about = "List and extract members of remote ZIP archives via HTTP Range requests", long_about = None)]
#[command(after_help = "Examples:\n  \
  remotezip -l https://example.com/archive.zip          list files from remote ZIP\n  \
  remotezip -p https://example.com/archive.zip README   print one member\n  \
  remotezip data1.zip -x joe                            extract all files except joe from data1.zip")]
pub struct Cli {
    /// ZIP file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Members to extract (default: all)
    #[arg(value_name = "MEMBERS")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// List the entries read so far when the central directory is damaged
    #[arg(long)]
    pub lenient: bool,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Retries for HTTP connection errors
    #[arg(long, value_name = "N", default_value_t = 10)]
    pub retries: u32,

    /// Bytes fetched from the end of the archive to find the central directory
    #[arg(long, value_name = "BYTES", default_value_t = 64 * 1024)]
    pub tail_window: u64,

    /// Largest central directory that will be fetched
    #[arg(long, value_name = "BYTES", default_value_t = 1024 * 1024)]
    pub max_window: u64,

    /// Bytes fetched past a member's data for its local header
    #[arg(long, value_name = "BYTES", default_value_t = 1024)]
    pub headroom: u64,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            tail_window: self.tail_window,
            max_tail_window: self.max_window,
            header_headroom: self.headroom,
            strict_directory: !self.lenient,
        }
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_secs(self.timeout),
            max_retries: self.retries,
        }
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.is_very_quiet() {
            "off"
        } else if self.quiet > 0 {
            "error"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_config() {
        let cli = Cli::parse_from(["remotezip", "https://example.com/a.zip"]);
        assert!(cli.is_http_url());
        assert_eq!(cli.fetch_policy(), FetchPolicy::default());
        assert_eq!(cli.http_options(), HttpOptions::default());
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::parse_from([
            "remotezip",
            "local.zip",
            "a.txt",
            "b/*",
            "--lenient",
            "--headroom",
            "4096",
            "--retries",
            "2",
            "-qq",
        ]);
        assert!(!cli.is_http_url());
        assert_eq!(cli.files, vec!["a.txt", "b/*"]);
        assert!(!cli.fetch_policy().strict_directory);
        assert_eq!(cli.fetch_policy().header_headroom, 4096);
        assert_eq!(cli.http_options().max_retries, 2);
        assert_eq!(cli.log_filter(), "off");
    }
}
