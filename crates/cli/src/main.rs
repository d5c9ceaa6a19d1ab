// metagrid CLI - metadata grid operations, headless and interactive

mod exit_codes;
mod fill_cmd;
mod refs;
mod tui;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use metagrid_client::{auth, AuthCredentials, ClientError, MetadataClient};
use metagrid_config::Settings;

use exit_codes::{EXIT_API, EXIT_AUTH, EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "mgrid")]
#[command(about = "Terminal grid editor for platform metadata entities")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Connection overrides shared by the API-facing commands.
#[derive(Args)]
pub struct ConnArgs {
    /// Override the API base URL (defaults to the saved login)
    #[arg(long)]
    pub api_base: Option<String>,
    /// Override the bearer token
    #[arg(long, env = "MGRID_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Save API credentials for subsequent commands
    Login {
        /// Bearer token for the platform API
        #[arg(long, env = "MGRID_TOKEN", hide_env_values = true)]
        token: String,
        /// API base URL, e.g. https://platform.example.org
        #[arg(long)]
        api_base: String,
    },

    /// Remove saved credentials
    Logout,

    /// List the metadata entities of a class as JSON
    #[command(after_help = "\
Examples:
  mgrid fetch --class sample
  mgrid fetch --class sample --parent 42 -o rows.json")]
    Fetch {
        /// Entity class to list
        #[arg(long)]
        class: String,
        /// Parent folder id
        #[arg(long)]
        parent: Option<u64>,
        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[command(flatten)]
        conn: ConnArgs,
    },

    /// Plan or apply a range fill between two rectangles
    #[command(after_help = "\
Examples:
  mgrid fill --file rows.json --source C1:D2 --target C1:D6 --dry-run
  mgrid fill --class sample --source C1:D2 --target C1:D6
The first produced action is applied (Copy on growth, Clear on shrink);
use --dry-run to inspect the full candidate list first.")]
    Fill {
        /// Grid JSON file (offline source of rows)
        #[arg(long, conflicts_with = "class")]
        file: Option<PathBuf>,
        /// Entity class to fetch rows from
        #[arg(long)]
        class: Option<String>,
        /// Parent folder id
        #[arg(long)]
        parent: Option<u64>,
        /// Source rectangle, e.g. C2:D3
        #[arg(long)]
        source: String,
        /// Target rectangle, e.g. C2:D8
        #[arg(long)]
        target: String,
        /// Print the planned actions without saving
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        conn: ConnArgs,
    },

    /// Open the interactive grid editor
    #[command(after_help = "\
Requires a real terminal. Drag to select cells, drag the highlighted
bottom-right corner to fill, Escape to clear, q to quit.")]
    Edit {
        /// Grid JSON file (offline editing)
        #[arg(long, conflicts_with = "class")]
        file: Option<PathBuf>,
        /// Entity class to edit
        #[arg(long)]
        class: Option<String>,
        /// Parent folder id
        #[arg(long)]
        parent: Option<u64>,
        #[command(flatten)]
        conn: ConnArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: mgrid <command> [options]");
            eprintln!("       mgrid --help for more information");
            Ok(())
        }
        Some(Commands::Login { token, api_base }) => cmd_login(token, api_base),
        Some(Commands::Logout) => cmd_logout(),
        Some(Commands::Fetch {
            class,
            parent,
            output,
            conn,
        }) => cmd_fetch(class, parent, output, conn),
        Some(Commands::Fill {
            file,
            class,
            parent,
            source,
            target,
            dry_run,
            conn,
        }) => fill_cmd::cmd_fill(fill_cmd::FillArgs {
            file,
            class,
            parent,
            source,
            target,
            dry_run,
            conn,
        }),
        Some(Commands::Edit {
            file,
            class,
            parent,
            conn,
        }) => cmd_edit(file, class, parent, conn),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ── Commands ────────────────────────────────────────────────────────

fn cmd_login(token: String, api_base: String) -> Result<(), CliError> {
    let creds = AuthCredentials::new(token, api_base.trim_end_matches('/').to_string());
    auth::save_auth(&creds).map_err(CliError::auth)?;
    println!("Logged in to {}", creds.api_base);
    Ok(())
}

fn cmd_logout() -> Result<(), CliError> {
    auth::delete_auth().map_err(CliError::auth)?;
    println!("Logged out");
    Ok(())
}

fn cmd_fetch(
    class: String,
    parent: Option<u64>,
    output: Option<PathBuf>,
    conn: ConnArgs,
) -> Result<(), CliError> {
    let client = resolve_client(&conn)?;
    let rows = fetch_rows(&client, &class, parent)?;

    let json = serde_json::to_string_pretty(&serde_json::json!({ "rows": rows }))
        .map_err(|e| CliError::parse(e.to_string()))?;
    match output {
        Some(path) => std::fs::write(&path, json)
            .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_edit(
    file: Option<PathBuf>,
    class: Option<String>,
    parent: Option<u64>,
    conn: ConnArgs,
) -> Result<(), CliError> {
    let settings = Settings::load();

    let (data, store): (tui::data::GridData, Box<dyn metagrid_engine::apply::RowStore>) =
        match (&file, &class) {
            (Some(path), _) => (tui::data::GridData::load_file(path)?, Box::new(tui::LocalStore)),
            (None, Some(class)) => {
                let client = resolve_client(&conn)?;
                let rows = fetch_rows(&client, class, parent)?;
                (tui::data::GridData::from_rows(rows), Box::new(client))
            }
            (None, None) => return Err(CliError::args("either --file or --class is required")),
        };

    tui::run(data, store, settings.grid.notification_secs)
        .map_err(|e| CliError::io(format!("terminal error: {}", e)))
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Build a client from connection overrides, falling back to the saved
/// login. Timeout comes from settings.
pub(crate) fn resolve_client(conn: &ConnArgs) -> Result<MetadataClient, CliError> {
    let timeout = std::time::Duration::from_secs(Settings::load().api.timeout_secs);
    if let Some(api_base) = &conn.api_base {
        let token = conn
            .token
            .clone()
            .ok_or_else(|| CliError::auth("--api-base requires --token (or MGRID_TOKEN)"))?;
        return Ok(MetadataClient::with_timeout(
            AuthCredentials::new(token, api_base.trim_end_matches('/').to_string()),
            timeout,
        ));
    }
    let creds = auth::load_auth().ok_or_else(|| CliError::client(ClientError::NotAuthenticated))?;
    Ok(MetadataClient::with_timeout(creds, timeout))
}

/// Fetch a class's rows, capped at the configured maximum.
pub(crate) fn fetch_rows(
    client: &MetadataClient,
    class: &str,
    parent: Option<u64>,
) -> Result<Vec<metagrid_engine::row::EntityRow>, CliError> {
    let mut rows = client.list_entities(class, parent).map_err(CliError::client)?;
    let cap = Settings::load().api.max_rows;
    if rows.len() > cap {
        rows.truncate(cap);
    }
    Ok(rows)
}

// ── Error type ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_IO,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_PARSE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_AUTH,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_API,
            message: msg.into(),
            hint: None,
        }
    }

    /// Map a client error to the right exit code, with a login hint
    /// where it helps.
    pub fn client(err: ClientError) -> Self {
        match &err {
            ClientError::NotAuthenticated => Self {
                code: EXIT_AUTH,
                message: err.to_string(),
                hint: Some("run `mgrid login --api-base <url> --token <token>`".into()),
            },
            ClientError::Validation(_) | ClientError::Api(_) | ClientError::Http(_, _) => Self {
                code: EXIT_API,
                message: err.to_string(),
                hint: None,
            },
            _ => Self {
                code: EXIT_ERROR,
                message: err.to_string(),
                hint: None,
            },
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
