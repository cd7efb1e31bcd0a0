use chrono::Utc;
use clap::{Parser, Subcommand};
use docchat_core::{
    AskError, DocumentSession, GeneratorConfig, HttpAnswerGenerator, RetrievalOptions,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docchat", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Characters per chunk.
    #[arg(long, global = true, env = "DOCCHAT_CHUNK_SIZE", default_value = "100")]
    chunk_size: usize,

    /// Number of chunks retrieved per question.
    #[arg(long, global = true, env = "DOCCHAT_TOP_K", default_value = "5")]
    top_k: usize,

    /// HTTP endpoint that turns a question and retrieved context into an answer.
    #[arg(long, global = true, env = "DOCCHAT_GENERATOR_ENDPOINT")]
    generator_endpoint: Option<String>,

    /// Bearer token for the answer endpoint.
    #[arg(long, global = true, env = "DOCCHAT_GENERATOR_API_KEY", hide_env_values = true)]
    generator_api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Upload documents and report what was indexed.
    Index {
        /// Files or folders (.pdf, .docx, .txt, .md).
        #[arg(long, required = true, num_args = 1..)]
        path: Vec<PathBuf>,
    },
    /// Print the chunks nearest to a query with their distances.
    Search {
        #[arg(long, required = true, num_args = 1..)]
        path: Vec<PathBuf>,
        /// Search query
        #[arg(long)]
        query: String,
        /// Emit results as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Answer a single question from the uploaded documents.
    Ask {
        #[arg(long, required = true, num_args = 1..)]
        path: Vec<PathBuf>,
        /// Question to answer.
        #[arg(long)]
        query: String,
    },
    /// Interactive question loop. `:upload <paths>` replaces the documents, `:quit` exits.
    Chat {
        #[arg(long, num_args = 1..)]
        path: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "docchat boot"
    );

    let options = RetrievalOptions {
        chunk_size: cli.chunk_size,
        top_k: cli.top_k,
    };
    let generator = GeneratorConfig::from_parts(
        cli.generator_endpoint.as_deref(),
        cli.generator_api_key.as_deref(),
    )?
    .map(HttpAnswerGenerator::new);
    let mut session = DocumentSession::new(options);

    match cli.command {
        Command::Index { path } => {
            upload(&mut session, &path)?;
            let pipeline = session.snapshot()?;
            println!(
                "{} chunks indexed, vocabulary of {} terms, at {}",
                pipeline.chunks().len(),
                pipeline.model().dimensions(),
                Utc::now().to_rfc3339()
            );
        }
        Command::Search { path, query, json } => {
            upload(&mut session, &path)?;
            let hits = session.search(&query, options.top_k)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                println!("query: {query}");
                for hit in hits {
                    println!("[{}] distance={:.4}", hit.chunk_id, hit.distance);
                    println!("  chunk_text: {}", hit.text);
                }
            }
        }
        Command::Ask { path, query } => {
            upload(&mut session, &path)?;
            println!("{}", respond(&session, &query, generator.as_ref()).await);
        }
        Command::Chat { path } => {
            if !path.is_empty() {
                if let Err(error) = upload(&mut session, &path) {
                    println!("{error}");
                }
            }
            chat_loop(&mut session, generator.as_ref()).await?;
        }
    }

    Ok(())
}

// Any failure leaves the session without documents.
fn upload(session: &mut DocumentSession, paths: &[PathBuf]) -> anyhow::Result<()> {
    let report = session
        .upload_files(paths)
        .map_err(|error| anyhow::anyhow!(error.user_message()))?;

    for skipped in &report.skipped_files {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
    }
    for document in &report.documents {
        info!(
            title = %document.title,
            checksum = %document.checksum,
            paragraphs = document.paragraph_count,
            "document uploaded"
        );
    }

    Ok(())
}

// Failures become messages for the user instead of aborting.
async fn respond(
    session: &DocumentSession,
    question: &str,
    generator: Option<&HttpAnswerGenerator>,
) -> String {
    let Some(generator) = generator else {
        return match session.retrieve(question) {
            Ok(passages) => format!("Relevant passages:\n\n{}", passages.join("\n\n")),
            Err(error) => error.user_message().to_string(),
        };
    };

    match session.ask(question, generator).await {
        Ok(answer) => answer.answer,
        Err(AskError::Retrieval(error)) => error.user_message().to_string(),
        Err(AskError::Generation(error)) => {
            format!("An error occurred while generating the response: {error}")
        }
    }
}

async fn chat_loop(
    session: &mut DocumentSession,
    generator: Option<&HttpAnswerGenerator>,
) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Hi, I am your document assistant. Upload files with :upload <paths>.\n")
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == ":quit" {
            break;
        }

        let reply = if let Some(rest) = line.strip_prefix(":upload") {
            let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
            match upload(session, &paths) {
                Ok(()) => format!(
                    "Indexed {} chunks.",
                    session.snapshot().map(|pipeline| pipeline.chunks().len()).unwrap_or(0)
                ),
                Err(error) => error.to_string(),
            }
        } else {
            respond(session, line, generator).await
        };

        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    Ok(())
}
