use anyhow::Result;
use clap::Parser;
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use toolcall_rs::server::logger::StreamLogger;
use toolcall_rs::server::parser::{StreamResult, StreamToolParser};
use toolcall_rs::tools::{ConverterRegistry, ToolCallConverter};
use toolcall_rs::utils::config::ParserConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model name, used to pick the tool call dialect
    #[arg(long, default_value = "qwen")]
    model: String,

    /// Read model output from this file instead of stdin
    #[arg(long)]
    file: Option<PathBuf>,

    /// Force a parser by name instead of matching the model name
    #[arg(long)]
    parser: Option<String>,

    /// Replay the text through the stream parser
    #[arg(long, default_value_t = false)]
    stream: bool,

    /// Fragment size in characters when streaming
    #[arg(long, default_value_t = 4)]
    chunk_size: usize,

    /// Print OpenAI-style chunks instead of parser events (with --stream)
    #[arg(long, default_value_t = false)]
    chunks: bool,

    /// Debug events for every parsed block and parameter
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Write a stream transcript into the log folder
    #[arg(long, default_value_t = false)]
    log: bool,
}

fn read_input(file: Option<&Path>) -> Result<String> {
    let mut text = String::new();
    match file {
        Some(path) => text = std::fs::read_to_string(path)?,
        None => {
            std::io::stdin().read_to_string(&mut text)?;
        }
    }
    Ok(text)
}

fn split_fragments(text: &str, chunk_size: usize) -> Vec<String> {
    text.chars()
        .collect::<Vec<_>>()
        .chunks(chunk_size)
        .map(|c| c.iter().collect())
        .collect()
}

fn emit<C: ToolCallConverter>(
    parser: &StreamToolParser<C>,
    result: StreamResult,
    as_chunks: bool,
) -> Result<()> {
    match result {
        StreamResult::Buffering => {}
        StreamResult::Content(content) => {
            if as_chunks {
                println!("{}", serde_json::to_string(&parser.create_content_chunk(&content))?);
            } else {
                println!("{}", json!({"event": "content", "content": content}));
            }
        }
        StreamResult::ToolCalls {
            tool_calls,
            content,
        } => {
            if as_chunks {
                if !content.is_empty() {
                    println!("{}", serde_json::to_string(&parser.create_content_chunk(&content))?);
                }
                if !tool_calls.is_empty() {
                    println!("{}", serde_json::to_string(&parser.create_tool_chunk(tool_calls))?);
                }
            } else {
                println!(
                    "{}",
                    json!({"event": "tool_calls", "tool_calls": tool_calls, "content": content})
                );
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.trace {
        "info,toolcall_rs=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.chunk_size == 0 {
        anyhow::bail!("--chunk-size must be at least 1");
    }

    let mut config = ParserConfig::from_env();
    config.trace |= args.trace;
    config.stream_logger |= args.log;
    if args.parser.is_some() {
        config.enforce_parser = args.parser.clone();
    }
    tracing::debug!("{:?}", config);

    let text = read_input(args.file.as_deref())?;
    let registry = ConverterRegistry::with_trace(config.trace);
    let converter = registry.resolve(&args.model, config.enforce_parser.as_deref())?;

    if !args.stream {
        let output = json!({
            "tool_calls": converter.parse_tool_calls(&text),
            "content": converter.clean_content(&text),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let logger = StreamLogger::from_config(&config, &args.model);
    let mut parser = StreamToolParser::new(converter, args.model.clone()).with_logger(logger);
    for fragment in split_fragments(&text, args.chunk_size) {
        let result = parser.process_token(&fragment);
        emit(&parser, result, args.chunks)?;
    }

    let rest = parser.flush();
    if !rest.is_empty() {
        if args.chunks {
            println!("{}", serde_json::to_string(&parser.create_content_chunk(&rest))?);
        } else {
            println!("{}", json!({"event": "flush", "content": rest}));
        }
    }
    tracing::info!(
        "Stream finished, {} tool call(s) emitted",
        parser.emitted_tool_calls()
    );
    Ok(())
}
