use anyhow::{Context as AnyhowContext, Result};
use bundle::Bundle;
use capture_protocol::{
    serialize_json, CommandTreeNode, ErrorEnvelope, FindFrom, FindRequest, NodeAddress,
    StopReason,
};
use capture_search::{find, CancellationToken};
use clap::{Args, Parser, Subcommand};
use config::FindDefaults;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod bundle;
mod config;

#[derive(Parser)]
#[command(name = "capture-find")]
#[command(about = "Search the command tree of a graphics API capture", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML file with defaults for `find` flags
    #[arg(long, global = true, env = "CAPTURE_FIND_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find nodes whose label matches a pattern; prints one JSON line per match
    Find(FindArgs),

    /// Print the capture and command tree ids of a bundle
    #[command(name = "tree-id")]
    TreeId(TreeIdArgs),
}

#[derive(Args)]
struct FindArgs {
    /// Capture bundle (JSON: {"capture": ..., "groups": [...]})
    bundle: PathBuf,

    /// Pattern to search for
    #[arg(short, long, default_value = "")]
    text: String,

    /// Full FindRequest as JSON; replaces all search flags
    #[arg(long, conflicts_with_all = ["text", "from"])]
    json: Option<String>,

    #[arg(long, overrides_with = "no_case_sensitive")]
    case_sensitive: bool,

    #[arg(long, overrides_with = "case_sensitive")]
    no_case_sensitive: bool,

    /// Treat the pattern as a regular expression
    #[arg(long, overrides_with = "no_regex")]
    regex: bool,

    #[arg(long, overrides_with = "regex")]
    no_regex: bool,

    #[arg(long)]
    backwards: bool,

    /// Continue from the other end of the tree after reaching the boundary
    #[arg(long, overrides_with = "no_wrap")]
    wrap: bool,

    /// Do not wrap, even when the config file enables it
    #[arg(long, overrides_with = "wrap")]
    no_wrap: bool,

    /// Maximum number of results (0 = unbounded)
    #[arg(long, env = "CAPTURE_FIND_MAX_ITEMS")]
    max_items: Option<u32>,

    /// Cursor address, dot separated (e.g. 1.0.3); empty searches from the boundary
    #[arg(long, default_value = "")]
    from: String,

    /// Cancel the search after this many milliseconds
    #[arg(long, env = "CAPTURE_FIND_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
}

#[derive(Args)]
struct TreeIdArgs {
    bundle: PathBuf,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum FindOutput {
    Ok { matches: u32, stopped: StopReason },
    Error { error: ErrorEnvelope },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // stdout is reserved for JSON
    builder.target(env_logger::Target::Stderr).init();

    let defaults = match &cli.config {
        Some(path) => FindDefaults::from_file(path)?,
        None => FindDefaults::default(),
    };

    match cli.command {
        Commands::Find(args) => {
            let ok = run_find(args, defaults).await?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::TreeId(args) => run_tree_id(args).await?,
    }

    Ok(())
}

async fn run_tree_id(args: TreeIdArgs) -> Result<()> {
    let loaded = Bundle::load(&args.bundle).await?.into_database()?;
    let out = serde_json::json!({
        "capture": loaded.capture,
        "tree": loaded.tree,
    });
    println!("{out}");
    Ok(())
}

/// Returns `false` when the search itself failed (the error is already printed).
async fn run_find(args: FindArgs, defaults: FindDefaults) -> Result<bool> {
    let loaded = Bundle::load(&args.bundle).await?.into_database()?;
    let timeout_ms = args.timeout_ms.or(defaults.timeout_ms);
    let request = build_request(&args, &defaults, loaded.tree)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Interrupted, stopping search");
                cancel.cancel();
            }
        });
    }
    if let Some(ms) = timeout_ms {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            log::warn!("Search timed out after {ms}ms");
            cancel.cancel();
        });
    }

    let database = Arc::new(loaded.database);
    let outcome = tokio::task::spawn_blocking(move || {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        find(&request, database.as_ref(), &cancel, |response| {
            writeln!(out, "{}", serialize_json(&response)?)?;
            Ok(())
        })
    })
    .await
    .context("Search worker failed")?;

    let (output, ok) = match outcome {
        Ok(summary) => (
            FindOutput::Ok {
                matches: summary.matches,
                stopped: summary.stopped,
            },
            true,
        ),
        Err(err) => {
            log::error!("Find failed: {err}");
            (
                FindOutput::Error {
                    error: err.to_envelope(),
                },
                false,
            )
        }
    };
    println!("{}", serialize_json(&output)?);
    Ok(ok)
}

fn build_request(
    args: &FindArgs,
    defaults: &FindDefaults,
    tree: capture_protocol::TreeId,
) -> Result<FindRequest> {
    if let Some(json) = &args.json {
        return serde_json::from_str(json).context("--json is not a valid FindRequest");
    }

    let indices: NodeAddress = args
        .from
        .parse()
        .with_context(|| format!("Invalid --from address '{}'", args.from))?;
    Ok(FindRequest {
        text: args.text.clone(),
        is_case_sensitive: switch(
            args.case_sensitive,
            args.no_case_sensitive,
            defaults.case_sensitive,
        ),
        is_regex: switch(args.regex, args.no_regex, defaults.regex),
        backwards: args.backwards,
        wrap: switch(args.wrap, args.no_wrap, defaults.wrap),
        max_items: args.max_items.unwrap_or(defaults.max_items),
        from: Some(FindFrom::CommandTreeNode(CommandTreeNode { tree, indices })),
    })
}

/// Resolve a `--flag`/`--no-flag` pair against the configured default.
fn switch(on: bool, off: bool, default: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => default,
    }
}
