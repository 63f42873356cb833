//! Line-oriented shell for the experiment. Prints scenarios, relays
//! chat, and reads decisions; every rule lives in the session engine.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policy_teamlab::engine::catalog::ScenarioCatalog;
use policy_teamlab::engine::error::SessionError;
use policy_teamlab::engine::gateway::{OllamaGateway, DEFAULT_CHAT_URL, DEFAULT_MODEL};
use policy_teamlab::engine::log::SessionLog;
use policy_teamlab::engine::session::Session;

#[derive(Parser, Debug)]
#[command(name = "policy-teamlab-term")]
#[command(about = "Run the human-AI policy decision experiment in the terminal")]
struct Cli {
    /// Path to the scenario CSV
    #[arg(long, default_value = "scenarios.csv")]
    scenarios: PathBuf,

    /// Path to the append-only experiment log
    #[arg(long, default_value = "experiment_log.csv")]
    log: PathBuf,

    /// Participant id; prompted for interactively when omitted
    #[arg(long)]
    participant: Option<String>,

    /// Chat endpoint of the local model server
    #[arg(long, default_value = DEFAULT_CHAT_URL)]
    url: String,

    /// Model name to request
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_teamlab=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    println!("=== Human-AI Policy Decision Experiment (Terminal Version) ===\n");

    let participant = match cli.participant {
        Some(p) => p,
        None => prompt("Enter participant ID (or your name/alias): ")?,
    };

    let catalog = ScenarioCatalog::load(&cli.scenarios)
        .with_context(|| format!("loading scenarios from {}", cli.scenarios.display()))?;
    let log = SessionLog::init(&cli.log)
        .with_context(|| format!("initializing log at {}", cli.log.display()))?;
    let gateway = OllamaGateway::new(cli.url, cli.model);

    let mut session = Session::new(participant, catalog, gateway, log);

    println!("\nInstructions:");
    println!("- You will see a policy scenario each round.");
    println!("- You get a private memo (stakeholders/politics).");
    println!("- Your AI teammate sees a different private memo (technical data).");
    println!("- You can chat with the AI, then choose a policy option A/B/C/D.");
    println!("- Type \"/decide\" when you are ready to choose an option.");
    println!("- Type \"/quit\" at any time to exit.\n");
    prompt("Press Enter to begin...")?;

    while let Some(scenario) = session.begin_round()?.map(Clone::clone) {
        println!("\n{}", "=".repeat(70));
        println!("ROUND {}: {}", scenario.round_num, scenario.title);
        println!("{}", "=".repeat(70));
        println!("\nYOUR PRIVATE MEMO (Stakeholders/Politics):");
        println!("{}", scenario.human_private_info);
        println!("\nPolicy Options:");
        println!("{}", scenario.options_text);
        println!("\nYou can now chat with your AI teammate.");
        println!("Type messages and press Enter. Type \"/decide\" to move to decision.\n");

        // Chat until the participant signals a decision.
        loop {
            let line = prompt("You: ")?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            match line.to_lowercase().as_str() {
                "/quit" | "/q" => {
                    println!("\nExiting experiment. Goodbye.");
                    return Ok(());
                }
                "/decide" | "/d" => break,
                _ => {
                    let reply = session.chat(line)?.text.clone();
                    println!("AI: {reply}\n");
                }
            }
        }
        session.ready_to_decide()?;

        let summary = loop {
            let label = prompt("Enter your chosen option (A/B/C/D): ")?;
            match session.decide(&label) {
                Ok(summary) => break summary,
                Err(SessionError::InvalidDecision(_)) => {
                    println!("Please enter A, B, C, or D.");
                }
                Err(other) => return Err(other.into()),
            }
        };

        println!("\n--- Round Outcome ---");
        println!("Your choice: {}", summary.choice);
        println!("Safety impact:    {}", summary.outcome.safety);
        println!("Equity impact:    {}", summary.outcome.equity);
        println!("Cost impact:      {}", summary.outcome.cost);
        println!("Political impact: {}", summary.outcome.political);
        println!("Round total:      {}", summary.outcome.total);
        println!("Cumulative total: {}", summary.cumulative_score);

        let instruction = prompt(
            "\nOptional: What would you like your AI teammate to do differently next round?\n\
(Examples: 'be more concise', 'focus more on equity', 'explain more detail')\n\
Press Enter to skip: ",
        )?;
        session.submit_instruction(&instruction)?;

        session.close_round()?;

        if !session.is_complete() {
            prompt("\nPress Enter to continue to the next round...")?;
        }
    }

    println!("\n=== Experiment complete ===");
    println!("Final total score: {}", session.total_score());
    println!("Data saved to: {}", cli.log.display());

    Ok(())
}

fn prompt(text: &str) -> Result<String> {
    print!("{text}");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().read_line(&mut line)?;
    if read == 0 {
        // EOF on stdin: treat like /quit.
        println!("\nExiting experiment. Goodbye.");
        std::process::exit(0);
    }
    Ok(line.trim().to_string())
}
