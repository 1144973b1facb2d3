//! `faqroute` - look a question up in a knowledge base from the command line.
//!
//! Prints whether the question would be answered directly or sent to the
//! generative fallback, together with the similarity score.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use faqroute::{KnowledgeBase, KnowledgeIndex, MatchConfig, Router, RouterDecision, SemanticConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "faqroute")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Knowledge base JSON file
    knowledge_base: PathBuf,

    /// Question to route; read from stdin when omitted
    question: Option<String>,

    /// Minimum similarity for a direct answer
    #[arg(short, long, default_value_t = MatchConfig::DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Hashed embedder dimension
    #[arg(long, default_value_t = 384)]
    dimension: usize,

    /// Print the decision as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let semantic = SemanticConfig {
        dimension: cli.dimension,
        ..Default::default()
    };
    let embedder = faqroute::build_embedder(&semantic)?;
    let knowledge = KnowledgeBase::load(&cli.knowledge_base)
        .with_context(|| format!("loading {}", cli.knowledge_base.display()))?;
    let index = KnowledgeIndex::build(knowledge, embedder.as_ref()).await?;
    let router = Router::new(
        Arc::new(index),
        embedder,
        MatchConfig::default().with_threshold(cli.threshold),
    )?;

    let question = match cli.question {
        Some(q) => q,
        None => {
            eprint!("Question: ");
            let mut line = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut line)
                .await
                .context("reading question from stdin")?;
            line.trim_end_matches(&['\r', '\n'][..]).to_string()
        }
    };

    let decision = router.decide(&question).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }
    match decision {
        RouterDecision::Matched { answer, score } => {
            println!("{answer}");
            println!("(similarity {score:.4})");
        }
        RouterDecision::Fallback { near_miss_score } => {
            println!("No confident match; the question would go to the generative fallback.");
            println!("(best similarity {near_miss_score:.4})");
        }
    }
    Ok(())
}
