//! CLI channel — stdin/stdout chat in the terminal.

use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::channels::{ChatSurface, ReplySink, UserInput};
use crate::error::ChannelError;
use crate::intake::{Session, Speaker};

const RESET_COMMAND: &str = "/reset";
const QUIT_COMMAND: &str = "/quit";

/// Reads lines from stdin and writes replies to stdout.
pub struct CliChannel {
    lines: Lines<BufReader<Stdin>>,
}

impl CliChannel {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpret one line typed at the terminal. Blank lines yield nothing.
fn parse_line(line: &str) -> Option<Option<UserInput>> {
    match line.trim() {
        "" => None,
        RESET_COMMAND => Some(Some(UserInput::Reset)),
        QUIT_COMMAND => Some(None),
        _ => Some(Some(UserInput::Utterance(line.to_string()))),
    }
}

fn avatar(role: Speaker) -> &'static str {
    match role {
        Speaker::User => "🧑‍💻",
        Speaker::Assistant => "🤖",
    }
}

impl ReplySink for CliChannel {
    fn fragment(&mut self, text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

#[async_trait]
impl ChatSurface for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn next_input(&mut self) -> Result<Option<UserInput>, ChannelError> {
        loop {
            eprint!("> ");
            match self.lines.next_line().await? {
                Some(line) => {
                    if let Some(input) = parse_line(&line) {
                        return Ok(input);
                    }
                }
                None => return Ok(None), // EOF
            }
        }
    }

    async fn render(&mut self, session: &Session) -> Result<(), ChannelError> {
        eprintln!("👋 Welcome, {}!\n", session.display_name());
        for entry in session.transcript.entries() {
            println!("{} {}\n", avatar(entry.role), entry.content);
        }
        Ok(())
    }

    async fn respond(&mut self, reply: &str, streamed: bool) -> Result<(), ChannelError> {
        if streamed {
            println!("\n");
        } else {
            println!("\n{} {}\n", avatar(Speaker::Assistant), reply);
        }
        Ok(())
    }
}
