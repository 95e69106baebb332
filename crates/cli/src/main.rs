// DataRamp CLI - headless console operations

mod account;
mod browse;
mod exit_codes;
mod grid;
mod ingest;

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use dataramp_client::{ApiError, ConsoleClient};
use dataramp_config::Settings;

use exit_codes::{EXIT_ERROR, EXIT_NOT_AUTH, EXIT_SUCCESS, EXIT_UPSTREAM, EXIT_USAGE};

/// Structured command error: exit code, message, optional hint.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: message.into(),
            hint,
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: message.into(),
            hint: None,
        }
    }
}

/// Map a client error to the shell contract.
pub fn api_error(e: ApiError) -> CliError {
    match e {
        ApiError::Http(401, _) | ApiError::Http(403, _) => CliError {
            code: EXIT_NOT_AUTH,
            message: "Not authorized by the console API".into(),
            hint: Some("run `dramp login` with a valid token".into()),
        },
        ApiError::Io(msg) => CliError {
            code: EXIT_ERROR,
            message: msg,
            hint: None,
        },
        other => CliError {
            code: EXIT_UPSTREAM,
            message: other.to_string(),
            hint: None,
        },
    }
}

/// Build the client: explicit `--api-base` wins over saved settings;
/// a saved token rides along either way.
pub fn make_client(api_base: Option<&str>) -> ConsoleClient {
    match api_base {
        Some(base) => ConsoleClient::new(
            base.to_string(),
            dataramp_config::load_auth().map(|a| a.token),
        ),
        None => ConsoleClient::from_saved_config(),
    }
}

/// Resolve the environment: flag > settings default.
pub fn resolve_env(flag: Option<String>, settings: &Settings) -> Result<String, CliError> {
    flag.or_else(|| settings.default_env.clone()).ok_or_else(|| {
        CliError::usage(
            "No environment given",
            Some("pass --env or set \"env.default\" in settings.json".into()),
        )
    })
}

/// Interactive yes/no gate. `--yes` short-circuits; otherwise a TTY
/// prompt is required and a non-TTY stdin refuses.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, CliError> {
    use std::io::{self, Write};

    if yes {
        return Ok(true);
    }
    if !atty::is(atty::Stream::Stdin) {
        return Err(CliError::usage(
            "Confirmation required and stdin is not a TTY",
            Some("pass --yes to proceed non-interactively".into()),
        ));
    }
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush().ok();
    let mut buf = String::new();
    io::stdin()
        .read_line(&mut buf)
        .map_err(|e| CliError::general(e.to_string()))?;
    Ok(matches!(buf.trim(), "y" | "Y" | "yes"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutFormat {
    Table,
    Csv,
    Json,
}

#[derive(Parser)]
#[command(name = "dramp")]
#[command(about = "Data ingestion console (CLI mode, headless)")]
#[command(version)]
struct Cli {
    /// Console API base URL (overrides settings.json)
    #[arg(long, global = true, env = "DATARAMP_API_BASE")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List storage environments and their buckets
    #[command(after_help = "\
Examples:
  dramp envs
  dramp envs --json")]
    Envs {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// List data products in a bucket
    #[command(after_help = "\
Examples:
  dramp products --env pd --bucket raw-zone
  dramp products --bucket raw-zone --json")]
    Products {
        #[arg(long, env = "DATARAMP_ENV")]
        env: Option<String>,

        #[arg(long, env = "DATARAMP_BUCKET")]
        bucket: String,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// List table folders under a product
    #[command(after_help = "\
Examples:
  dramp folders --env pd --bucket raw-zone sales
  dramp folders --bucket raw-zone sales --json")]
    Folders {
        /// Product name
        product: String,

        #[arg(long, env = "DATARAMP_ENV")]
        env: Option<String>,

        #[arg(long, env = "DATARAMP_BUCKET")]
        bucket: String,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Preview the latest dataset of a table with view knobs applied
    #[command(after_help = "\
Examples:
  dramp preview --env pd --bucket raw-zone sales orders
  dramp preview --bucket raw-zone sales orders --filter 'status=active,pending'
  dramp preview --bucket raw-zone sales orders --sort amount:desc --page 2
  dramp preview --bucket raw-zone sales orders --filter 'region=(empty)' --out csv
  dramp preview --bucket raw-zone sales orders --hide internal_id --out json")]
    Preview {
        /// Product name
        product: String,

        /// Table name
        table: String,

        #[arg(long, env = "DATARAMP_ENV")]
        env: Option<String>,

        #[arg(long, env = "DATARAMP_BUCKET")]
        bucket: String,

        /// Keep only rows whose column has one of the values:
        /// 'COL=V1,V2'. Use '(empty)' to match missing values.
        /// Repeatable.
        #[arg(long, value_name = "EXPR")]
        filter: Vec<String>,

        /// Sort by column: 'COL' or 'COL:asc' or 'COL:desc'
        #[arg(long, value_name = "COL[:DIR]")]
        sort: Option<String>,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page: 50, 100 or 200
        #[arg(long)]
        page_size: Option<usize>,

        /// Hide a column. Repeatable.
        #[arg(long, value_name = "COL")]
        hide: Vec<String>,

        /// Output format. csv/json export the whole filtered view,
        /// not just the page.
        #[arg(long, value_enum, default_value_t = OutFormat::Table)]
        out: OutFormat,
    },

    /// Stage edits to the latest dataset and save it back
    #[command(after_help = "\
Examples:
  dramp edit --env pd --bucket raw-zone sales orders --set '0:status=active'
  dramp edit --bucket raw-zone sales orders --set '2:amount=10.5' --set '2:status=paid'
  dramp edit --bucket raw-zone sales orders --add 1 --set '0:id=42'
  dramp edit --bucket raw-zone sales orders --delete 3,4 --yes
  dramp edit --bucket raw-zone sales orders --set '0:status=void' --dry-run")]
    Edit {
        /// Product name
        product: String,

        /// Table name
        table: String,

        #[arg(long, env = "DATARAMP_ENV")]
        env: Option<String>,

        #[arg(long, env = "DATARAMP_BUCKET")]
        bucket: String,

        /// Cell assignment 'ROW:COL=VALUE' (row index after any
        /// --add prepends). Repeatable.
        #[arg(long, value_name = "ROW:COL=VALUE")]
        set: Vec<String>,

        /// Comma-separated row indices to delete
        #[arg(long, value_name = "ROWS")]
        delete: Option<String>,

        /// Prepend N blank rows before applying --set
        #[arg(long, default_value_t = 0)]
        add: usize,

        /// Print the staged result without saving
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompts
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Ingest a file through the staged analysis wizard
    #[command(after_help = "\
Examples:
  dramp upload --env pd --bucket raw-zone sales orders data/orders.csv --yes
  dramp upload --bucket raw-zone sales new_table data/new.csv --new-table \\
      --describe-table 'Daily order extract' --describe-column 'id=Order id' --yes")]
    Upload {
        /// Product name
        product: String,

        /// Destination table name
        table: String,

        /// File to ingest
        file: std::path::PathBuf,

        #[arg(long, env = "DATARAMP_ENV")]
        env: Option<String>,

        #[arg(long, env = "DATARAMP_BUCKET")]
        bucket: String,

        /// The destination table does not exist yet
        #[arg(long)]
        new_table: bool,

        /// Table description (new-table mode)
        #[arg(long, value_name = "TEXT")]
        describe_table: Option<String>,

        /// Column description 'COL=TEXT' (new-table mode). Repeatable.
        #[arg(long, value_name = "COL=TEXT")]
        describe_column: Vec<String>,

        /// Skip the final confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Trigger reprocessing of a product
    #[command(after_help = "\
Examples:
  dramp pipeline sales
  dramp pipeline sales --project analytics-prod")]
    Pipeline {
        /// Product name
        product: String,

        /// Pipeline project id (defaults to settings)
        #[arg(long)]
        project: Option<String>,
    },

    /// Search data products across every bucket of an environment
    #[command(after_help = "\
Examples:
  dramp search sales
  dramp search ord --env pd")]
    Search {
        /// Search term (case-insensitive substring)
        term: String,

        #[arg(long, env = "DATARAMP_ENV")]
        env: Option<String>,
    },

    /// Save an API token for authenticated calls
    #[command(after_help = "\
Examples:
  dramp login --token tok-abc123
  DATARAMP_TOKEN=tok-abc123 dramp login")]
    Login {
        /// API token (falls back to DATARAMP_TOKEN, then a prompt)
        #[arg(long)]
        token: Option<String>,

        /// User name recorded with uploads
        #[arg(long)]
        user: Option<String>,
    },

    /// Remove the saved API token
    Logout,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = &e.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load();
    let api_base = cli.api_base.as_deref();

    match cli.command {
        Commands::Envs { json } => browse::cmd_envs(api_base, json),
        Commands::Products { env, bucket, json } => {
            let env = resolve_env(env, &settings)?;
            browse::cmd_products(api_base, &env, &bucket, json)
        }
        Commands::Folders {
            product,
            env,
            bucket,
            json,
        } => {
            let env = resolve_env(env, &settings)?;
            browse::cmd_folders(api_base, &env, &bucket, &product, json)
        }
        Commands::Preview {
            product,
            table,
            env,
            bucket,
            filter,
            sort,
            page,
            page_size,
            hide,
            out,
        } => {
            let env = resolve_env(env, &settings)?;
            grid::cmd_preview(
                api_base,
                &settings,
                &env,
                &bucket,
                &product,
                &table,
                &filter,
                sort.as_deref(),
                page,
                page_size,
                &hide,
                out,
            )
        }
        Commands::Edit {
            product,
            table,
            env,
            bucket,
            set,
            delete,
            add,
            dry_run,
            yes,
        } => {
            let env = resolve_env(env, &settings)?;
            grid::cmd_edit(
                api_base,
                &env,
                &bucket,
                &product,
                &table,
                &set,
                delete.as_deref(),
                add,
                dry_run,
                yes,
            )
        }
        Commands::Upload {
            product,
            table,
            file,
            env,
            bucket,
            new_table,
            describe_table,
            describe_column,
            yes,
        } => {
            let env = resolve_env(env, &settings)?;
            ingest::cmd_upload(
                api_base,
                &env,
                &bucket,
                &product,
                &table,
                &file,
                new_table,
                describe_table.as_deref(),
                &describe_column,
                yes,
            )
        }
        Commands::Pipeline { product, project } => {
            let project = project.or_else(|| settings.pipeline_project.clone());
            ingest::cmd_pipeline(api_base, &product, project.as_deref())
        }
        Commands::Search { term, env } => {
            let env = resolve_env(env, &settings)?;
            browse::cmd_search(api_base, &env, &term)
        }
        Commands::Login { token, user } => account::cmd_login(token, user),
        Commands::Logout => account::cmd_logout(),
    }
}
