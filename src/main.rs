//! acton-seq CLI
//!
//! Shows what a model would see: the assembled opening system message, or the
//! full hidden transcript after installing tools, using the in-memory host.

use acton_seq::config;
use acton_seq::host::{InMemoryHost, SequenceHost, TranscriptEntry};
use acton_seq::logging::init_logging;
use acton_seq::options::{Content, OpenOptions};
use acton_seq::prelude::{SequenceClient, ToolFunction, ToolSpec};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "acton-seq")]
#[command(about = "Inspect sequence preludes and tool announcements", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (skips the default search paths)
    #[arg(long, global = true, env = "ACTON_SEQ_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the opening system message
    Prelude {
        #[command(flatten)]
        open: OpenArgs,
    },
    /// Open a sequence, install echo tools, and print its transcript
    Transcript {
        #[command(flatten)]
        open: OpenArgs,
        /// Tool to install, as NAME=DESCRIPTION (repeatable)
        #[arg(long = "tool", value_parser = parse_tool)]
        tool: Vec<(String, String)>,
    },
}

#[derive(Args)]
struct OpenArgs {
    /// Enable tools
    #[arg(long, overrides_with = "no_tools")]
    tools: bool,
    /// Disable tools, even if the configuration enables them
    #[arg(long, overrides_with = "tools")]
    no_tools: bool,
    /// System prompt appended after the prelude
    #[arg(long)]
    system_prompt: Option<String>,
    /// Omit the environment, cutoff and date lines
    #[arg(long, overrides_with = "no_skip_prelude")]
    skip_prelude: bool,
    /// Keep the prelude, even if the configuration skips it
    #[arg(long, overrides_with = "skip_prelude")]
    no_skip_prelude: bool,
}

impl OpenArgs {
    /// The options given on the command line; unset flags stay `None` so
    /// configuration defaults can fill them.
    fn to_options(&self) -> OpenOptions {
        OpenOptions {
            tools: flag(self.tools, self.no_tools),
            system_prompt: self.system_prompt.clone(),
            tool_prompt: None,
            skip_prelude: flag(self.skip_prelude, self.no_skip_prelude),
        }
    }
}

fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

fn parse_tool(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, description)| (name.to_string(), description.to_string()))
        .ok_or_else(|| format!("expected NAME=DESCRIPTION, got '{s}'"))
}

fn print_entry(index: usize, entry: &TranscriptEntry) {
    let role = entry
        .options
        .role
        .as_ref()
        .map_or("-", |role| role.as_str());
    let visibility = if entry.is_hidden() { " (hidden)" } else { "" };
    println!("--- [{index}] {role}{visibility} ---");
    match &entry.content {
        Content::Text(text) => print!("{text}"),
        Content::Tokens(tokens) => print!("{tokens:?}"),
    }
    println!();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => config::from_path(path)?,
        None => config::load()?,
    };
    let _guard = init_logging(&config.logging)?;

    match cli.command {
        Commands::Prelude { open } => {
            let options = open.to_options().or(&config.open_options());
            let message = config
                .prelude()
                .assemble(&options, chrono::Local::now().date_naive());
            print!("{message}");
            Ok(())
        }
        Commands::Transcript { open, tool } => {
            let host = Arc::new(InMemoryHost::new());
            let dyn_host: Arc<dyn SequenceHost> = host.clone();
            let client = SequenceClient::from_config(dyn_host, &config);

            futures::executor::block_on(async {
                let mut seq = client.open(open.to_options()).await?;
                for (name, description) in tool {
                    seq.install(ToolSpec::new(name, description, ToolFunction::sync(Ok)))
                        .await?;
                }

                for (index, entry) in host
                    .transcript(seq.id())
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                {
                    print_entry(index, entry);
                }

                seq.close().await?;
                Ok::<(), anyhow::Error>(())
            })
        }
    }
}
