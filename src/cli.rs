//! Command-line interface.
//!
//! Without a subcommand the TUI starts. `export` runs the same
//! fetch → sort → filter → serialize pipeline headlessly and prints the
//! path of the written file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::app::settings::Settings;
use crate::error::{Context, Result};
use crate::export::{self, ExportFormat};
use crate::model::UserField;
use crate::remote::UsersClient;
use crate::search::{FilterCriteria, SortDirection, SortSpec, visible_users};

#[derive(Parser, Debug)]
#[command(name = "usertable", version, about = "Browse, filter, sort and export user records")]
pub struct Cli {
    /// Endpoint returning a JSON array of users
    #[arg(long, env = "USERTABLE_URL", global = true)]
    pub url: Option<String>,

    /// Directory exports are written to
    #[arg(long, env = "USERTABLE_EXPORT_DIR", global = true)]
    pub export_dir: Option<PathBuf>,

    /// Directory holding settings.conf, theme.conf and keybinds.conf
    #[arg(long, env = "USERTABLE_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Log file (default: <config-dir>/usertable.log)
    #[arg(long, env = "USERTABLE_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch users and write a CSV or PDF export without starting the TUI
    Export(ExportArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    pub format: FormatArg,

    /// Keep users whose name contains this text (case-insensitive)
    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub username: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    /// Sort column: name, username, email or phone
    #[arg(long)]
    pub sort: Option<UserField>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Output file; defaults to users.<format> in the export directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            field: self.sort,
            direction: if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }
    }
}

impl Cli {
    /// Flags win over values read from `settings.conf`.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(url) = &self.url {
            settings.endpoint = url.clone();
        }
        if let Some(dir) = &self.export_dir {
            settings.export_dir = dir.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.timeout_secs = secs;
        }
    }
}

/// Headless export: fetch, sort, filter, serialize, write. Returns the path written.
pub async fn execute_export(settings: &Settings, args: &ExportArgs) -> Result<PathBuf> {
    let client = UsersClient::new(settings.endpoint.clone(), settings.timeout())?;
    let users = client
        .fetch_users()
        .await
        .with_ctx(|| format!("fetch users from {}", settings.endpoint))?;
    let visible = visible_users(&users, &args.criteria(), &args.sort_spec());
    info!(total = users.len(), visible = visible.len(), "headless export");

    let format = ExportFormat::from(args.format);
    let mut artifact = export::build_artifact(format, &visible)?;
    let dir = match &args.output {
        Some(path) => {
            if let Some(name) = path.file_name() {
                artifact.filename = name.to_string_lossy().into_owned();
            }
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
        }
        None => settings.export_dir.clone(),
    };
    let path = export::save_artifact(&dir, &artifact)?;
    Ok(path)
}
