//! Talk to the engine from a terminal.
//!
//! Each input line is `nick> text`; a line without `>` is said by `--nick`.
//! An empty line stands for a lull in the conversation.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use reply_core::{ChatClient, ChatEngine, EngineControl, EngineResult};

#[derive(Parser, Debug)]
#[command(name = "reply_console", about = "Chat with a learning reply engine")]
struct Args {
    /// Data directory holding setting.toml, log.jsonl, words.json and assoc.txt
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Seed for the random source
    #[arg(long)]
    seed: Option<u64>,

    /// Nickname used for lines without a `nick>` prefix
    #[arg(long, default_value = "user")]
    nick: String,

    /// Show decision traces
    #[arg(short, long)]
    verbose: bool,
}

struct ConsoleClient;

impl ChatClient for ConsoleClient {
    fn speak(&mut self, text: &str) {
        println!("bot> {}", text);
    }

    fn output_info(&mut self, text: &str) {
        println!("(info) {}", text);
    }

    fn exit(&mut self) {
        println!("(disconnected)");
    }

    fn set_status(&mut self, label: Option<&str>) {
        if let Some(label) = label {
            println!("(status) {}", label);
        }
    }
}

fn main() -> EngineResult<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    let mut engine = ChatEngine::open(&args.dir, toml::Table::new())?;
    if let Some(seed) = args.seed {
        engine.reseed(seed);
    }
    engine.set_client(Box::new(ConsoleClient));

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            engine.on_silent();
            continue;
        }

        let (nick, text) = match line.split_once('>') {
            Some((nick, text)) if !nick.trim().is_empty() => (nick.trim(), text.trim()),
            _ => (args.nick.as_str(), line),
        };
        if engine.on_other_speak(nick, text, false) == EngineControl::Exit {
            break;
        }
        io::stdout().flush()?;
    }

    engine.save()?;
    Ok(())
}
