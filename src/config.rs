use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{CsvExport, DEFAULT_API_BASE_URL};
use crate::controllers::users::{DEFAULT_PAGE_SIZE, PAGE_SIZES};
use crate::theme::Theme;

/// JustStock Admin - terminal console for the JustStock back office
///
/// Manage users, referral trees, referral withdrawals and broadcast messages.
/// Configuration priority: CLI args > Environment variables (.env included) > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "juststock-admin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "JustStock admin console", long_about = None)]
pub struct CliArgs {
    /// Backend base URL
    #[arg(long, env = "API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Path to the SQLite file holding the admin session
    #[arg(long, env = "JUSTSTOCK_STATE_DB")]
    pub state_db: Option<String>,

    /// HTTP request timeout in milliseconds (1000-120000)
    #[arg(long, env = "REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Users tab page size (25, 50, 100 or 200)
    #[arg(long, env = "USERS_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Referral tree depth to request (1-20)
    #[arg(long, env = "REFERRAL_DEPTH")]
    pub referral_depth: Option<u32>,

    /// Search debounce window in milliseconds (50-5000)
    #[arg(long, env = "SEARCH_DEBOUNCE_MS")]
    pub debounce_ms: Option<u64>,

    /// Target UI rendering FPS (1-120)
    #[arg(long, env = "RENDER_FPS")]
    pub render_fps: Option<u32>,

    /// Color theme: nord, amber or paper
    #[arg(long, env = "THEME", value_parser = clap::value_parser!(Theme))]
    pub theme: Option<Theme>,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<String>,

    /// Download a CSV export and exit: phones, wallet-withdrawals, referral-withdrawals
    #[arg(long, value_parser = clap::value_parser!(CsvExport))]
    pub export: Option<CsvExport>,

    /// Directory for CSV exports
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Upload an image with the stored session and exit
    #[arg(long, value_name = "PATH")]
    pub upload_image: Option<PathBuf>,
}

/// One-shot actions that run without the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Headless {
    Export(CsvExport),
    UploadImage(PathBuf),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub state_db: String,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub referral_depth: u32,
    pub debounce: Duration,
    pub render_fps: u32,
    pub theme: Theme,
    pub log_file: String,
    pub out_dir: PathBuf,
    pub headless: Option<Headless>,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

/// Load configuration from CLI args and environment variables
pub fn load() -> Result<Config> {
    from_args(CliArgs::parse())
}

pub fn from_args(args: CliArgs) -> Result<Config> {
    let api_base_url = args
        .api_base_url
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    validate_url(&api_base_url, "API_BASE_URL")?;

    let request_timeout_ms = args.request_timeout_ms.unwrap_or(20_000);
    let request_timeout_ms = validate_in_range(request_timeout_ms, 1000, 120_000, "REQUEST_TIMEOUT_MS")?;

    let page_size = args.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !PAGE_SIZES.contains(&page_size) {
        return Err(anyhow!("USERS_PAGE_SIZE must be one of {PAGE_SIZES:?}, got {page_size}"));
    }

    let referral_depth = validate_in_range(args.referral_depth.unwrap_or(10), 1, 20, "REFERRAL_DEPTH")?;
    let debounce_ms = validate_in_range(args.debounce_ms.unwrap_or(350), 50, 5000, "SEARCH_DEBOUNCE_MS")?;
    let render_fps = validate_in_range(args.render_fps.unwrap_or(30), 1, 120, "RENDER_FPS")?;

    let headless = match (args.export, args.upload_image) {
        (Some(_), Some(_)) => return Err(anyhow!("--export and --upload-image cannot be combined")),
        (Some(export), None) => Some(Headless::Export(export)),
        (None, Some(path)) => Some(Headless::UploadImage(path)),
        (None, None) => None,
    };

    Ok(Config {
        api_base_url,
        state_db: args.state_db.unwrap_or_else(|| "./juststock_admin.db".to_string()),
        request_timeout: Duration::from_millis(request_timeout_ms),
        page_size,
        referral_depth,
        debounce: Duration::from_millis(debounce_ms),
        render_fps,
        theme: args.theme.unwrap_or_default(),
        log_file: args.log_file.unwrap_or_else(|| "./juststock_admin.log".to_string()),
        out_dir: args.out_dir,
        headless,
    })
}

impl Config {
    pub fn print_summary(&self) {
        eprintln!("JustStock Admin Configuration:");
        eprintln!("  API: {}", self.api_base_url);
        eprintln!("  State DB: {}", self.state_db);
        eprintln!("  Request Timeout: {}ms", self.request_timeout.as_millis());
        eprintln!("  Page Size: {}", self.page_size);
        eprintln!("  Referral Depth: {}", self.referral_depth);
        eprintln!("  Search Debounce: {}ms", self.debounce.as_millis());
        eprintln!("  Render FPS: {}", self.render_fps);
        eprintln!("  Theme: {}", self.theme);
        eprintln!("  Log File: {}", self.log_file);
    }
}
