use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_agent::llm_client::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use job_agent::{ChatClient, ClientConfig, JobInfoExtractor, LocalLlmClient, Message};
use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const SETUP_PROMPT: &str = "List 3 important skills for a software engineer job";
const READY_PROMPT: &str = "Say 'Job Agent Ready!' if you can help with job searching.";

#[derive(Parser)]
#[command(name = "job-agent")]
#[command(about = "Smoke-test a local LLM server and extract job postings with it")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, default_value = job_agent::config::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value = job_agent::config::DEFAULT_MODEL)]
    model: String,

    #[arg(long, default_value_t = 5)]
    probe_timeout_secs: u64,

    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.as_str())
            .with_model(self.model.as_str())
            .with_probe_timeout(Duration::from_secs(self.probe_timeout_secs))
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Check the server, then send a sample prompt (default)
    Setup,
    /// Only check that the server is reachable
    Check,
    /// Send a single user message and print the reply
    Chat {
        #[arg(default_value = READY_PROMPT)]
        prompt: String,
    },
    /// Extract job fields from a saved HTML page
    Extract { html_file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let client = LocalLlmClient::new(cli.client_config()).context("Failed to create LLM client")?;

    match cli.command.unwrap_or(Command::Setup) {
        Command::Setup => run_setup(&client).await,
        Command::Check => {
            if client.probe().await {
                println!("✅ LLM server is running at {}", client.config().base_url);
                Ok(())
            } else {
                println!("❌ LLM server not running at {}", client.config().base_url);
                std::process::exit(1);
            }
        }
        Command::Chat { prompt } => {
            let reply = client
                .chat(&[Message::user(prompt)], DEFAULT_TEMPERATURE, DEFAULT_MAX_TOKENS)
                .await?;
            println!("{}", reply);
            Ok(())
        }
        Command::Extract { html_file } => {
            let html = tokio::fs::read_to_string(&html_file)
                .await
                .with_context(|| format!("Failed to read file: {}", html_file.display()))?;

            let outcome = JobInfoExtractor::new(client).extract_outcome(&html).await?;
            if let job_agent::ExtractOutcome::Fallback { reason, .. } = &outcome {
                eprintln!("⚠️  Model reply could not be parsed ({}), showing placeholder", reason);
            }

            let job = outcome.into_record();
            println!(
                "{}",
                serde_json::to_string_pretty(&job).context("Failed to serialize job info")?
            );
            Ok(())
        }
    }
}

async fn run_setup(client: &LocalLlmClient) -> Result<()> {
    println!("🚀 Testing job agent foundation...");
    println!("\n1. Testing LLM connection...");

    if !client.probe().await {
        println!("❌ LLM server not running at {}", client.config().base_url);
        println!("Please:");
        println!("1. Open LM Studio");
        println!("2. Go to the 'Local Server' tab");
        println!("3. Load a model (Llama-3.2-3B-Instruct recommended)");
        println!("4. Start the server");
        return Ok(());
    }

    println!("✅ LLM server is running");

    let reply = client
        .chat(&[Message::user(SETUP_PROMPT)], DEFAULT_TEMPERATURE, DEFAULT_MAX_TOKENS)
        .await?;
    println!("✅ LLM responding correctly");

    let preview: String = reply.chars().take(100).collect();
    println!("Sample response: {}...", preview);

    println!("\n🎉 Foundation setup complete!");
    Ok(())
}
