use clap::{Parser, Subcommand};
use md_rag::Result;
use md_rag::commands::{build_index, run_query};
use md_rag::config::Config;

const EXAMPLE_QUESTION: &str = "How is data stored in the vector database?";

#[derive(Parser)]
#[command(name = "md-rag")]
#[command(about = "A minimal retrieval-augmented generation pipeline over markdown documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (rebuild) the vector index from the configured document patterns
    Build,
    /// Answer a question against an already-built index
    Query {
        /// Question to answer; defaults to a built-in example
        question: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().map_err(|e| md_rag::RagError::Config(e.to_string()))?;

    match cli.command {
        Commands::Build => build_index(config).await?,
        Commands::Query { question } => {
            let question = question.as_deref().unwrap_or(EXAMPLE_QUESTION);
            run_query(config, question).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["md-rag", "build"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert!(matches!(parsed.command, Commands::Build));
        }
    }

    #[test]
    fn query_without_question_uses_default() {
        let cli = Cli::try_parse_from(["md-rag", "query"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Query { question } = parsed.command {
                assert_eq!(question, None);
            }
        }
    }

    #[test]
    fn query_with_question() {
        let cli = Cli::try_parse_from(["md-rag", "query", "What is Milvus?"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Query { question } = parsed.command {
                assert_eq!(question, Some("What is Milvus?".to_string()));
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["md-rag", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["md-rag", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
