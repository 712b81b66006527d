//! Developer CLI: inspect how the chat-query layer reads a message.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tanaw_core::types::{ChatIntent, ScopeCueParse};
use tanaw_core::{extract_fiscal_year, extract_fiscal_year_pair, normalize};
use tanaw_nlu::line_item::ParsedLineItemQuestion;
use tanaw_nlu::{
    AggregationKind, detect_aggregation_intent, detect_intent, is_line_item_specific_query,
    parse_line_item_question, parse_scope_cue,
};
use tanaw_router::{RefusalContext, build_refusal_message};

#[derive(Parser)]
#[command(name = "tanaw", version, about = "Inspect chat-query interpretation decisions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interpret a chat message and print the decision as JSON.
    Interpret {
        /// The chat message to interpret.
        message: String,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Render the refusal for a refusal-context JSON document.
    Refuse {
        /// Refusal context as inline JSON.
        context: String,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
}

/// Full interpretation of one message, for debugging classifier behavior.
#[derive(Serialize)]
struct Interpretation {
    message: String,
    normalized: String,
    intent: ChatIntent,
    fiscal_year: Option<i32>,
    fiscal_year_pair: Option<(i32, i32)>,
    scope: ScopeCueParse,
    aggregation: Option<AggregationKind>,
    line_item_specific: bool,
    line_item: ParsedLineItemQuestion,
}

fn interpret(message: &str) -> Interpretation {
    Interpretation {
        message: message.to_string(),
        normalized: normalize(message),
        intent: detect_intent(message).intent,
        fiscal_year: extract_fiscal_year(message),
        fiscal_year_pair: extract_fiscal_year_pair(message),
        scope: parse_scope_cue(message),
        aggregation: detect_aggregation_intent(message),
        line_item_specific: is_line_item_specific_query(message),
        line_item: parse_line_item_question(message),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Interpret { message, pretty } => {
            let interpretation = interpret(&message);
            tracing::info!(intent = interpretation.intent.as_str(), "interpreted message");
            print_json(&interpretation, pretty)
        }
        Command::Refuse { context, pretty } => {
            let ctx: RefusalContext = serde_json::from_str(&context)?;
            print_json(&build_refusal_message(&ctx), pretty)
        }
    }
}
