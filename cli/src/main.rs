//! CLI entrypoint for bursar
//!
//! This is the dev harness that wires together all layers using
//! dependency injection. Every subcommand runs against a freshly
//! seeded in-memory ledger.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bursar_application::ports::clock::Clock;
use bursar_application::ports::directory::UserDirectory;
use bursar_application::tools::ToolCatalog;
use bursar_domain::core::UserId;
use bursar_domain::finance::UserRef;
use bursar_domain::tool::{ToolCall, ToolResponse};
use bursar_infrastructure::{
    build_catalog, seed_ledger, ConfigLoader, JsonlActionLogger, MemoryLedger, SystemClock,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments for bursar
#[derive(Parser, Debug)]
#[command(name = "bursar")]
#[command(author, version, about = "Conversational action core for a personal ledger")]
#[command(long_about = r#"
Bursar exposes a personal-finance ledger as a set of LLM-callable tools:
free-text references resolve to records, destructive actions run a
two-phase confirmation protocol, and every reply is a uniform JSON
envelope an agent can act on.

Configuration files are loaded from (in priority order):
1. --config <path>   Explicit config file
2. ./bursar.toml     Project-level config
3. ~/.config/bursar/config.toml   Global config

Example:
  bursar tools
  bursar invoke list_accounts
  bursar invoke delete_goal --args '{"identifier": "japan"}'
  bursar demo
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every tool schema the catalog exposes
    Tools,
    /// Invoke one tool against the seeded demo ledger
    Invoke {
        /// Tool name, e.g. `list_accounts`
        tool: String,

        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,

        /// Act as this seeded user (exact email or name)
        #[arg(long, value_name = "WHO")]
        user: Option<String>,
    },
    /// Walk a scripted conversation through the seeded ledger
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config =
        ConfigLoader::load(cli.config.as_ref()).context("could not load configuration")?;
    let issues = config.validate();
    for issue in &issues {
        eprintln!("config: {}", issue.message);
    }
    if issues.iter().any(|issue| issue.is_error()) {
        bail!("configuration is invalid");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ledger = MemoryLedger::new(clock.clone());
    seed_ledger(&ledger, clock.now())
        .await
        .context("could not seed the demo ledger")?;

    let mut catalog = build_catalog(&ledger, clock, config.resolver.clarify_options);
    if let Some(path) = config.log.actions.as_deref().filter(|p| !p.trim().is_empty()) {
        if let Some(logger) = JsonlActionLogger::new(path) {
            info!("recording actions to {}", logger.path().display());
            catalog = catalog.with_logger(Arc::new(logger));
        }
    }

    match cli.command {
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&catalog.definitions())?);
        }
        Command::Invoke { tool, args, user } => {
            let who = user.as_deref().unwrap_or(&config.demo.user);
            let acting = resolve_demo_user(&ledger, who).await?;
            let call = build_call(&tool, &args)?;
            let response = catalog.dispatch(&acting.id, &call).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Demo => {
            let acting = resolve_demo_user(&ledger, &config.demo.user).await?;
            run_demo_script(&catalog, &acting).await?;
        }
    }

    Ok(())
}

/// Look up a seeded user by exact email or name.
async fn resolve_demo_user(ledger: &Arc<MemoryLedger>, who: &str) -> Result<UserRef> {
    let mut matches = ledger.directory().find_exact(who).await?;
    match matches.len() {
        0 => bail!("no seeded user matches \"{who}\" (try their exact email)"),
        1 => Ok(matches.remove(0)),
        _ => bail!("several seeded users match \"{who}\"; use an email"),
    }
}

fn build_call(tool: &str, args: &str) -> Result<ToolCall> {
    let parsed: serde_json::Value =
        serde_json::from_str(args).context("--args must be valid JSON")?;
    let serde_json::Value::Object(map) = parsed else {
        bail!("--args must be a JSON object");
    };

    let mut call = ToolCall::new(tool);
    for (key, value) in map {
        call = call.with_arg(key, value);
    }
    Ok(call)
}

/// A fixed conversation that shows resolution, clarification and the
/// confirmation round trip end to end.
async fn run_demo_script(catalog: &ToolCatalog, user: &UserRef) -> Result<()> {
    use serde_json::json;

    println!("Acting as {}.\n", user.name);

    let script: Vec<ToolCall> = vec![
        ToolCall::new("list_accounts"),
        ToolCall::new("spending_summary"),
        ToolCall::new("record_transaction")
            .with_arg("account", json!("checking"))
            .with_arg("category", json!("groceries"))
            .with_arg("amount", json!(23.75))
            .with_arg("note", json!("farmers market")),
        ToolCall::new("contribute_to_goal")
            .with_arg("identifier", json!("japan"))
            .with_arg("amount", json!(200.0)),
        // "loan" is ambiguous on purpose; the narrowed retry gets gated.
        ToolCall::new("delete_debt").with_arg("identifier", json!("loan")),
        ToolCall::new("delete_debt").with_arg("identifier", json!("car repair")),
        ToolCall::new("list_debts").with_arg("status", json!("pending")),
    ];

    for call in script {
        print_exchange(catalog, &user.id, call).await?;
    }
    Ok(())
}

/// Dispatch one call, echo the envelope, and play the confirmation leg
/// when the reply asks for one.
async fn print_exchange(catalog: &ToolCatalog, user: &UserId, call: ToolCall) -> Result<()> {
    println!("> {}", describe_call(&call));
    let response = catalog.dispatch(user, &call).await;
    println!("{}\n", serde_json::to_string_pretty(&response)?);

    if let ToolResponse::ConfirmationNeeded { id, .. } = &response {
        let confirmed = call.with_arg("confirmed_id", serde_json::json!(id.clone()));
        println!("> {} (confirming)", describe_call(&confirmed));
        let response = catalog.dispatch(user, &confirmed).await;
        println!("{}\n", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

fn describe_call(call: &ToolCall) -> String {
    if call.arguments.is_empty() {
        call.tool_name.clone()
    } else {
        let mut args: Vec<String> = call
            .arguments
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        args.sort();
        format!("{} {}", call.tool_name, args.join(" "))
    }
}
