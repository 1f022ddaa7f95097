// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tokio::runtime::Runtime;

use statement_assistant::{build_prompt, config::DEFAULT_CSV_PATH, Config, Gateway, Ledger};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("ask") => run_ask(&args[2..]),
        Some("summary") => run_summary(),
        Some("models") => run_models(),
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        _ => run_chat_mode(),
    }
}

fn print_usage() {
    println!("Bank Statement Assistant");
    println!();
    println!("USAGE:");
    println!("  statement-assistant              Interactive chat (default)");
    println!("  statement-assistant ask <text>   One-shot question");
    println!("  statement-assistant summary      Spending totals by category");
    println!("  statement-assistant models       List free models on the API");
    println!();
    println!("ENVIRONMENT:");
    println!("  OPENROUTER_API_KEY   API token (required except for summary)");
    println!("  CSV_PATH             Statement file (default: {})", DEFAULT_CSV_PATH);
}

/// Statement path for commands that never touch the remote API
fn csv_path_from_env() -> String {
    env::var("CSV_PATH").unwrap_or_else(|_| DEFAULT_CSV_PATH.to_string())
}

/// One-shot question: load, build prompt, call the model, print the answer
fn run_ask(question_args: &[String]) -> Result<()> {
    let question = question_args.join(" ");
    if question.trim().is_empty() {
        anyhow::bail!("Usage: statement-assistant ask <question>");
    }

    let config = Config::from_env()?;

    println!("📂 Loading statement...");
    let ledger = Ledger::load(Path::new(&config.csv_path))?;
    println!("✓ Loaded {} transactions\n", ledger.len());

    let gateway = Gateway::new(&config)?;
    let runtime = Runtime::new().context("Failed to start async runtime")?;

    println!("💬 {}", question);
    let prompt = build_prompt(&ledger, &question);
    let answer = runtime.block_on(gateway.ask(&prompt));

    println!("\n{}", answer);
    Ok(())
}

/// Category totals, descending - no remote call involved
fn run_summary() -> Result<()> {
    let csv_path = csv_path_from_env();

    let ledger = Ledger::load(Path::new(&csv_path))?;
    println!("📊 {} transactions in {}\n", ledger.len(), csv_path);

    for (category, total) in ledger.summarize_by_category() {
        println!("  {:<20} {:>12.2}", category, total);
    }

    Ok(())
}

/// Diagnostic: which models on the API have a free tier
fn run_models() -> Result<()> {
    let config = Config::from_env()?;
    let gateway = Gateway::new(&config)?;
    let runtime = Runtime::new().context("Failed to start async runtime")?;

    println!("🔍 Fetching model catalog...");
    let free_models = runtime.block_on(gateway.list_free_models())?;

    println!("✓ Found {} free models:", free_models.len());
    for model in free_models.iter().take(10) {
        println!("  - {} ({})", model.id, model.name);
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_chat_mode() -> Result<()> {
    println!("💬 Bank Statement Assistant");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Fail fast: no API key or no statement means no chat
    let config = Config::from_env()?;

    println!("\n📂 Loading statement from {}...", config.csv_path);
    let ledger = Ledger::load(Path::new(&config.csv_path))?;
    println!("✓ Loaded {} transactions", ledger.len());

    let gateway = Gateway::new(&config)?;
    let runtime = Runtime::new().context("Failed to start async runtime")?;

    println!("\nStarting chat... (Press Esc to quit)\n");
    ui::run_ui(&ledger, &gateway, &runtime)?;

    println!("\n✅ Chat closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_chat_mode() -> Result<()> {
    eprintln!("❌ Chat mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the HTTP API: cargo run --bin statement-server --features server");
    std::process::exit(1);
}
