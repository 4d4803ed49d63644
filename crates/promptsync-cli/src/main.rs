//! Promptsync CLI
//!
//! The `promptsync` command keeps a hosted prompt project's LIVE version in
//! sync with a set of prompts on disk.
//!
//! ## Commands
//!
//! - `list` / `get` / `run`: read and execute LIVE prompts
//! - `push`: make LIVE equal the prompts in a directory
//! - `append`: add prompts from a directory without deleting anything
//! - `replace`: create or replace a single prompt from a file
//! - `pull`: mirror LIVE into a local directory
//! - `tools` / `call`: inspect and invoke the raw tool-call surface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prompt_store::{LatitudeClient, LatitudeConfig, PromptStore, DEFAULT_BASE_URL};
use promptsync_core::metrics::METRICS;
use promptsync_core::{PromptTools, ToolResult};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events are shown by default. Everything else (HTTP stack,
/// runtime) is limited to warnings unless `RUST_LOG` says otherwise.
const LOG_TARGETS: &[&str] = &["promptsync", "promptsync_core", "prompt_store"];

#[derive(Parser)]
#[command(name = "promptsync")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sync prompt sets with a hosted prompt project", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// API key for the prompt store
    #[arg(long, global = true, env = "LATITUDE_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,

    /// Project to operate on
    #[arg(long, global = true, env = "LATITUDE_PROJECT_ID", default_value = "")]
    project_id: String,

    /// Gateway base URL
    #[arg(long, global = true, env = "LATITUDE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List prompt names in LIVE
    List,

    /// Show one LIVE prompt
    Get {
        /// Prompt name/path
        name: String,
    },

    /// Execute a LIVE prompt
    Run {
        /// Prompt name/path
        name: String,

        /// Parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,
    },

    /// Replace ALL prompts in LIVE with the *.promptl files in a directory
    Push {
        /// Directory holding <name>.promptl files
        #[arg(short, long, default_value = "prompts")]
        dir: PathBuf,
    },

    /// Add the *.promptl files in a directory to LIVE
    Append {
        /// Directory holding <name>.promptl files
        #[arg(short, long, default_value = "prompts")]
        dir: PathBuf,

        /// Replace prompts that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Create or replace one prompt from a file
    Replace {
        /// Prompt name/path
        name: String,

        /// File holding the new content
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Download LIVE into a local directory
    Pull {
        /// Output directory (default: ./prompts)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the registered tool descriptors as JSON
    Tools,

    /// Invoke a tool by name with JSON arguments
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = LatitudeConfig::new(&cli.api_key, &cli.project_id).with_base_url(&cli.base_url);
    let client = LatitudeClient::new(config).context("Failed to configure prompt store client")?;
    let store: Arc<dyn PromptStore> = Arc::new(client);
    let tools = PromptTools::new(store);

    let failed = execute(&tools, cli.command).await?;
    METRICS.flush();

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// `RUST_LOG`-style directives: `level` for our crates, `warn` elsewhere.
fn default_directives(level: Level) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(LOG_TARGETS.iter().map(|t| format!("{}={}", t, level)));
    directives.join(",")
}

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// tool payloads; `--json` switches to newline-delimited JSON.
fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    if installed.is_err() {
        debug!("tracing subscriber already installed");
    }
}

/// Run one command, printing its payload to stdout. Returns `true` when the
/// payload reports an error.
async fn execute(tools: &PromptTools, command: Commands) -> Result<bool> {
    if let Commands::Tools = command {
        let descriptors = tools.register().await;
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(false);
    }

    let (tool, arguments) = tool_call(tools, command).await?;
    debug!(tool = %tool, "dispatching");
    let result: ToolResult = tools.call(&tool, arguments).await;
    println!("{}", result.text());
    Ok(result.is_error)
}

/// Translate a subcommand into a tool name and its JSON arguments.
async fn tool_call(tools: &PromptTools, command: Commands) -> Result<(String, Value)> {
    let call = match command {
        Commands::List => ("list_prompts".to_string(), json!({})),
        Commands::Get { name } => ("get_prompt".to_string(), json!({ "name": name })),
        Commands::Run { name, params } => {
            let parameters = match params {
                Some(raw) => parse_json_object(&raw).context("Invalid --params")?,
                None => json!({}),
            };
            (
                "run_prompt".to_string(),
                json!({ "name": name, "parameters": parameters }),
            )
        }
        Commands::Push { dir } => (
            "push_prompts".to_string(),
            json!({ "prompts": load_dir(tools, &dir).await? }),
        ),
        Commands::Append { dir, overwrite } => (
            "append_prompts".to_string(),
            json!({ "prompts": load_dir(tools, &dir).await?, "overwrite": overwrite }),
        ),
        Commands::Replace { name, file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            (
                "replace_prompt".to_string(),
                json!({ "name": name, "content": content }),
            )
        }
        Commands::Pull { output_dir } => (
            "pull_prompts".to_string(),
            json!({ "outputDir": output_dir }),
        ),
        Commands::Call { tool, args } => {
            let arguments = parse_json_object(&args).context("Invalid --args")?;
            (tool, arguments)
        }
        Commands::Tools => anyhow::bail!("`tools` is not a tool call"),
    };
    Ok(call)
}

fn parse_json_object(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        anyhow::bail!("expected a JSON object, got {}", value);
    }
    Ok(value)
}

/// Load `<name>.promptl` files, mapping mirrored names such as `team_reply`
/// back to their LIVE paths.
async fn load_dir(tools: &PromptTools, dir: &Path) -> Result<Value> {
    let prompts = tools
        .operations()
        .load_mirror(dir)
        .await
        .with_context(|| format!("Failed to load prompts from {}", dir.display()))?;
    debug!("loaded {} prompt(s) from {}", prompts.len(), dir.display());
    Ok(serde_json::to_value(prompts)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_store::fakes::MemoryPromptStore;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("promptsync").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_parses_append_flags() {
        let cli = parse(&["append", "--dir", "out", "--overwrite"]);
        match cli.command {
            Commands::Append { dir, overwrite } => {
                assert_eq!(dir, PathBuf::from("out"));
                assert!(overwrite);
            }
            _ => panic!("expected append"),
        }
    }

    #[test]
    fn test_cli_accepts_base_url_override() {
        let cli = parse(&["list", "--base-url", "http://localhost:8787/api/v3"]);
        assert_eq!(cli.base_url, "http://localhost:8787/api/v3");
    }

    #[test]
    fn test_parse_json_object_rejects_arrays() {
        assert!(parse_json_object("[1, 2]").is_err());
        assert!(parse_json_object("{\"a\": 1}").is_ok());
    }

    #[test]
    fn test_default_directives_scope_level_to_own_crates() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "warn,promptsync=DEBUG,promptsync_core=DEBUG,prompt_store=DEBUG"
        );
        assert!(EnvFilter::try_new(default_directives(Level::INFO)).is_ok());
    }

    #[tokio::test]
    async fn test_pull_without_dir_sends_null_output_dir() {
        let tools = PromptTools::new(Arc::new(MemoryPromptStore::new()));
        let (tool, args) = tool_call(&tools, Commands::Pull { output_dir: None })
            .await
            .unwrap();
        assert_eq!(tool, "pull_prompts");
        assert!(args["outputDir"].is_null());
    }

    #[tokio::test]
    async fn test_push_reads_promptl_files_from_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("a.promptl"), "one").unwrap();
        std::fs::write(temp_dir.path().join("b.promptl"), "two").unwrap();
        let tools = PromptTools::new(Arc::new(MemoryPromptStore::new()));

        let (tool, args) = tool_call(
            &tools,
            Commands::Push {
                dir: temp_dir.path().to_path_buf(),
            },
        )
        .await
        .unwrap();

        assert_eq!(tool, "push_prompts");
        assert_eq!(
            args["prompts"],
            json!([
                {"name": "a", "content": "one"},
                {"name": "b", "content": "two"}
            ])
        );
    }

    #[tokio::test]
    async fn test_push_after_pull_keeps_nested_prompt_paths() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryPromptStore::with_documents([
            ("intro", "Hello"),
            ("team/reply", "Thanks"),
        ]));
        let tools = PromptTools::new(store.clone());

        let pulled = execute(
            &tools,
            Commands::Pull {
                output_dir: Some(temp_dir.path().to_path_buf()),
            },
        )
        .await
        .unwrap();
        let pushed = execute(
            &tools,
            Commands::Push {
                dir: temp_dir.path().to_path_buf(),
            },
        )
        .await
        .unwrap();

        assert!(!pulled && !pushed);
        assert_eq!(store.live_paths(), vec!["intro", "team/reply"]);
        assert_eq!(store.live_content("team/reply").as_deref(), Some("Thanks"));
    }

    #[tokio::test]
    async fn test_replace_from_file_deploys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("greeting.promptl");
        std::fs::write(&file, "Hello").unwrap();
        let store = Arc::new(MemoryPromptStore::new());
        let tools = PromptTools::new(store.clone());

        let failed = execute(
            &tools,
            Commands::Replace {
                name: "greeting".to_string(),
                file,
            },
        )
        .await
        .unwrap();

        assert!(!failed);
        assert_eq!(store.live_content("greeting").as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_error_payload_is_reported_as_failure() {
        let store = Arc::new(MemoryPromptStore::new());
        let tools = PromptTools::new(store);

        let failed = execute(
            &tools,
            Commands::Get {
                name: "missing".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(failed);
    }
}
