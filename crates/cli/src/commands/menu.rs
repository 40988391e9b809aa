//! `menu` command implementation - interactive loop.

use std::io::{self, Write};
use std::time::Duration;

use broadcaster::{BroadcastError, BroadcastRequest, BroadcastSummary};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::Result;
use crate::report::{write_destinations, write_summary};
use crate::session::Session;

/// Built-in greeting for option 2
pub const GREETING: &str = "\nHello from my userbot!\n\n\
    This is an automated message sent to all groups.\n\
    This will be sent 2 times with 10 seconds delay.\n\n\
    Best regards!\n";
const GREETING_ROUNDS: u32 = 2;
const GREETING_DELAY_SECS: u64 = 10;

const CUSTOM_DEFAULT_ROUNDS: u32 = 1;
const CUSTOM_DEFAULT_DELAY_SECS: u64 = 10;

const BANNER: &str = "============================================================";

/// One resolved menu selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Broadcast {
        message: String,
        rounds: u32,
        delay_secs: u64,
    },
    /// Input rejected; the reason is shown and the menu is redisplayed
    Retry(&'static str),
    Exit,
}

/// Digits only, like a strict `isdigit` check
fn parse_digits<T: std::str::FromStr>(input: &str) -> Option<T> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}

/// Line-oriented prompt over any async reader
pub struct Prompter<R, W> {
    input: R,
    output: W,
    cancel: CancellationToken,
}

impl<R, W> Prompter<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W, cancel: CancellationToken) -> Self {
        Self {
            input,
            output,
            cancel,
        }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Trimmed line, or `None` on end of input or cancellation
    pub async fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        tokio::select! {
            read = self.input.read_line(&mut line) => {
                if read? == 0 {
                    return Ok(None);
                }
            }
            _ = self.cancel.cancelled() => return Ok(None),
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{BANNER}")?;
        writeln!(self.output, "TELEGRAM USERBOT MENU")?;
        writeln!(self.output, "{BANNER}")?;
        writeln!(self.output, "1. List all groups")?;
        writeln!(
            self.output,
            "2. Send message to all groups ({GREETING_ROUNDS} rounds, {GREETING_DELAY_SECS}sec delay)"
        )?;
        writeln!(self.output, "3. Send custom message")?;
        writeln!(self.output, "4. Broadcast with custom rounds and delay")?;
        writeln!(self.output, "5. Exit")?;
        writeln!(self.output, "{BANNER}")
    }

    /// Show the menu and read one complete selection
    pub async fn next_action(&mut self) -> io::Result<Action> {
        self.print_menu()?;
        let Some(choice) = self.ask("\nEnter your choice (1-5): ").await? else {
            return Ok(Action::Exit);
        };

        match choice.as_str() {
            "1" => Ok(Action::List),
            "2" => Ok(Action::Broadcast {
                message: GREETING.to_string(),
                rounds: GREETING_ROUNDS,
                delay_secs: GREETING_DELAY_SECS,
            }),
            "3" => self.custom_message().await,
            "4" => self.advanced_broadcast().await,
            "5" => Ok(Action::Exit),
            _ => Ok(Action::Retry("Invalid choice! Please enter 1-5.")),
        }
    }

    async fn custom_message(&mut self) -> io::Result<Action> {
        writeln!(self.output, "\nCustom Message Sender\n------------------------------")?;

        let Some(message) = self.ask("Enter your custom message: ").await? else {
            return Ok(Action::Exit);
        };
        if message.is_empty() {
            return Ok(Action::Retry("Empty message! Please try again."));
        }

        let Some(rounds) = self.ask("Enter number of rounds (default: 1): ").await? else {
            return Ok(Action::Exit);
        };
        let rounds = parse_digits(&rounds).unwrap_or(CUSTOM_DEFAULT_ROUNDS);

        let delay_secs = if rounds > 1 {
            let Some(delay) = self
                .ask("Enter delay between rounds in seconds (default: 10): ")
                .await?
            else {
                return Ok(Action::Exit);
            };
            parse_digits(&delay).unwrap_or(CUSTOM_DEFAULT_DELAY_SECS)
        } else {
            0
        };

        Ok(Action::Broadcast {
            message,
            rounds,
            delay_secs,
        })
    }

    async fn advanced_broadcast(&mut self) -> io::Result<Action> {
        writeln!(self.output, "\nAdvanced Broadcast Settings\n------------------------------")?;

        let Some(message) = self.ask("Enter your message: ").await? else {
            return Ok(Action::Exit);
        };
        if message.is_empty() {
            return Ok(Action::Retry("Empty message! Please try again."));
        }

        let Some(rounds) = self.ask("Enter number of rounds: ").await? else {
            return Ok(Action::Exit);
        };
        let Some(rounds) = parse_digits(&rounds) else {
            return Ok(Action::Retry("Invalid number of rounds!"));
        };

        let Some(delay) = self.ask("Enter delay between rounds (seconds): ").await? else {
            return Ok(Action::Exit);
        };
        let Some(delay_secs) = parse_digits(&delay) else {
            return Ok(Action::Retry("Invalid delay time!"));
        };

        Ok(Action::Broadcast {
            message,
            rounds,
            delay_secs,
        })
    }
}

/// Execute the `menu` command
pub async fn run_menu(session: &Session) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut prompter = Prompter::new(stdin, io::stdout(), session.cancel.clone());

    writeln!(prompter.output(), "\n{BANNER}\nSCANNING YOUR GROUPS...\n{BANNER}")?;
    list_groups(session, prompter.output()).await?;

    loop {
        if session.cancel.is_cancelled() {
            writeln!(prompter.output(), "\n\nProgram interrupted. Stopping userbot...")?;
            break;
        }

        match prompter.next_action().await? {
            Action::Exit => {
                writeln!(prompter.output(), "\nGoodbye! Stopping userbot...")?;
                break;
            }
            Action::Retry(reason) => {
                writeln!(prompter.output(), "{reason}")?;
                continue;
            }
            Action::List => {
                writeln!(prompter.output(), "\nListing all groups...")?;
                list_groups(session, prompter.output()).await?;
            }
            Action::Broadcast {
                message,
                rounds,
                delay_secs,
            } => {
                writeln!(
                    prompter.output(),
                    "\nStarting broadcast ({rounds} rounds, {delay_secs}s delay)..."
                )?;
                match broadcast(session, message, rounds, delay_secs).await {
                    Ok(summary) => write_summary(prompter.output(), &summary, None)?,
                    Err(e) if e.is_session_lost() => return Err(e.into()),
                    Err(e) => {
                        error!(error = %e, "Broadcast failed");
                        writeln!(prompter.output(), "Error: {e}")?;
                    }
                }
            }
        }

        if prompter.ask("\nPress Enter to continue...").await?.is_none() {
            break;
        }
    }

    info!("Menu closed");
    Ok(())
}

async fn list_groups(session: &Session, out: &mut impl Write) -> Result<()> {
    match session.broadcaster().list_destinations().await {
        Ok(destinations) => write_destinations(out, &destinations)?,
        Err(e) if e.is_session_lost() => return Err(e.into()),
        Err(e) => {
            error!(error = %e, "Failed to list groups");
            write_destinations(out, &[])?;
        }
    }
    Ok(())
}

async fn broadcast(
    session: &Session,
    message: String,
    rounds: u32,
    delay_secs: u64,
) -> std::result::Result<BroadcastSummary, BroadcastError> {
    let request = BroadcastRequest::new(message, rounds, Duration::from_secs(delay_secs))?
        .with_exclusions(session.profile.broadcast.exclude.iter().copied());

    session.broadcaster().broadcast(&request).await
}
