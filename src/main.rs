//! apiforge - headless front end for the request pipeline
//!
//! Architecture:
//! - App Layer - central state machine processing editor events
//! - Network Layer (Tokio) - async HTTP execution

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::Level;

use apiforge::app::AppActor;
use apiforge::config::{default_config_path, ClientConfig};
use apiforge::constants::APP_NAME;
use apiforge::messages::{EditorEvent, NetworkCommand, NetworkResponse, ViewState};
use apiforge::models::{AuthConfig, FormContent, Header, HttpMethod, RequestBody, RequestDefinition};
use apiforge::network::{NetworkActor, ReqwestTransport, ResponseData, ResponseRecord};
use apiforge::storage::Storage;
use apiforge::{compile, curl, ui};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Config file (defaults to the per-user config.yaml)
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Send a request built from flags or loaded from a collection
    Send(SendArgs),
    /// Send a cURL command, or print its compiled form
    Curl(CurlArgs),
    /// Import a collection export file
    Import { file: PathBuf },
    /// Export a stored collection
    Export {
        name: String,
        /// Target file or directory
        #[clap(default_value = ".")]
        dest: PathBuf,
    },
    /// List stored collections and their requests
    List,
}

#[derive(Debug, Args)]
struct SendArgs {
    url: Option<String>,
    #[clap(short = 'X', long)]
    method: Option<HttpMethod>,
    /// `Name: value`, repeatable
    #[clap(short = 'H', long = "header")]
    headers: Vec<String>,
    #[clap(long, conflicts_with_all = ["data", "form"])]
    json: Option<String>,
    #[clap(short, long, conflicts_with = "form")]
    data: Option<String>,
    /// url-encoded form, e.g. `a=1&b=2`
    #[clap(long)]
    form: Option<String>,
    #[clap(long, conflicts_with = "user")]
    bearer: Option<String>,
    /// `user:password`
    #[clap(short, long)]
    user: Option<String>,
    /// Load the request named by --request from this collection
    #[clap(long, requires = "request")]
    collection: Option<String>,
    #[clap(long)]
    request: Option<String>,
    #[clap(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct CurlArgs {
    command: String,
    /// Print the compiled request as cURL instead of sending it
    #[clap(long)]
    print: bool,
    #[clap(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Print response headers
    #[clap(short, long)]
    include: bool,
    /// Print the response record as JSON
    #[clap(long)]
    json_output: bool,
    /// Write the response body to a file
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Exit with an error on 4xx/5xx statuses and network failures
    #[clap(short, long)]
    fail: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to file
    let log_dir = dirs::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let file_appender = tracing_appender::rolling::never(&log_dir, "apiforge.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = match &cli.config {
        Some(path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };
    tracing::debug!(path = ?default_config_path(), "Config resolved");
    let config = Arc::new(config);
    let storage = Storage::new(config.collections_dir());

    match cli.command {
        Command::Send(args) => {
            let request = build_request(&args, &storage)?;
            let record = dispatch(config, request).await?;
            print_record(&record, &args.output)
        }
        Command::Curl(args) => {
            let request = curl::parse_curl(&args.command)?;
            if args.print {
                let compiled = compile(&request, &config)?;
                println!("{}", curl::to_curl(&compiled));
                return Ok(());
            }
            let record = dispatch(config, request).await?;
            print_record(&record, &args.output)
        }
        Command::Import { file } => {
            let collection = storage.import_file(&file)?;
            println!(
                "Imported collection '{}' ({} requests)",
                collection.name,
                collection.all_requests().count()
            );
            Ok(())
        }
        Command::Export { name, dest } => {
            let path = storage.export_collection(&name, &dest)?;
            println!("Exported '{}' to {}", name, path.display());
            Ok(())
        }
        Command::List => {
            let collections = storage.list_collections()?;
            if collections.is_empty() {
                println!("No collections in {}", storage.collections_dir().display());
            }
            for collection in collections {
                println!("{}", collection.name);
                for request in collection.all_requests() {
                    println!("  {:7} {}  ({})", request.method.as_str(), request.url, request.name);
                }
            }
            Ok(())
        }
    }
}

fn build_request(args: &SendArgs, storage: &Storage) -> Result<RequestDefinition> {
    let mut request = match (&args.collection, &args.request) {
        (Some(collection), Some(name)) => storage
            .load_collection(collection)?
            .find_request(name)
            .cloned()
            .with_context(|| format!("request '{}' not found in '{}'", name, collection))?,
        _ => RequestDefinition::default(),
    };

    if let Some(url) = &args.url {
        request.url = url.clone();
        request.sync_params_from_url();
    }
    if request.url.is_empty() {
        bail!("a URL or --collection/--request is required");
    }
    if let Some(method) = args.method {
        request.method = method;
    }

    for raw in &args.headers {
        let (key, value) = raw
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid header format: {}", raw))?;
        request.headers.push(Header::new(key.trim(), value.trim()));
    }

    if let Some(json) = &args.json {
        request.body = RequestBody::Json(json.clone());
    } else if let Some(data) = &args.data {
        request.body = RequestBody::Raw(data.clone());
    } else if let Some(form) = &args.form {
        request.body = RequestBody::Form(FormContent::Encoded(form.clone()));
    }

    if let Some(token) = &args.bearer {
        request.auth = AuthConfig::Bearer { token: token.clone() };
    } else if let Some(credentials) = &args.user {
        let (username, password) = credentials
            .split_once(':')
            .unwrap_or((credentials.as_str(), ""));
        request.auth = AuthConfig::Basic {
            username: username.to_string(),
            password: password.to_string(),
        };
    }

    Ok(request)
}

/// Run one send through the App and Network actors and wait for its outcome
async fn dispatch(config: Arc<ClientConfig>, request: RequestDefinition) -> Result<ResponseRecord> {
    // Create channels
    let (editor_tx, editor_rx) = mpsc::unbounded_channel::<EditorEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (view_tx, mut view_rx) = mpsc::unbounded_channel::<ViewState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(ReqwestTransport::new(&config), net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(config, net_cmd_tx, view_tx);
    let app = tokio::spawn(app_actor.run(editor_rx, net_resp_rx));

    editor_tx.send(EditorEvent::LoadRequest(request))?;
    editor_tx.send(EditorEvent::SendRequest)?;

    let outcome = loop {
        let Some(view) = view_rx.recv().await else {
            break Err(anyhow!("app actor stopped before the request resolved"));
        };
        if let Some(error) = view.error {
            break Err(anyhow!(error));
        }
        if let Some(record) = view.response {
            break Ok(record);
        }
    };

    let _ = editor_tx.send(EditorEvent::Quit);
    let _ = app.await;
    outcome
}

fn print_record(record: &ResponseRecord, output: &OutputArgs) -> Result<()> {
    if let Some(path) = &output.output {
        match &record.data {
            ResponseData::Binary(binary) => binary.blob.save_to(path)?,
            data => std::fs::write(path, ui::render_data(data))?,
        }
        tracing::info!(path = %path.display(), "Saved response body");
    }

    if output.json_output {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("{}", ui::render_response(record, output.include));
    }

    if output.fail && ui::status_class(record.status).is_failure() {
        bail!("request failed: {}", ui::status_line(record));
    }
    Ok(())
}
