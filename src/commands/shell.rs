//! The interactive session. Each line of input is one UI event.

use crate::api::{self, Mode};
use crate::args::{AddArgs, FilterArgs, UpdateFieldArgs};
use crate::commands::Out;
use crate::error::Outcome;
use crate::model::ExpenseId;
use crate::view::{Renderer, Tracker};
use crate::{Config, Result};
use anyhow::{bail, ensure, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::ops::ControlFlow;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace};

const PROMPT: &str = "expenses> ";

#[derive(Debug, Parser)]
#[command(multicall = true)]
struct ShellCli {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Show the list and chart again.
    List,
    /// Change the filter controls. Controls that are not given are cleared.
    Filter(FilterArgs),
    /// Clear every filter.
    Reset,
    /// Add an expense.
    Add(AddArgs),
    /// Start editing an expense in place.
    Edit {
        /// The id of the expense to edit.
        id: ExpenseId,
    },
    /// Change fields of the expense being edited.
    Set(UpdateFieldArgs),
    /// Send the changed fields of the expense being edited.
    Save,
    /// Stop editing without sending anything.
    Cancel,
    /// Delete an expense.
    Delete {
        /// The id of the expense to delete.
        id: ExpenseId,
    },
    /// Load every expense from the service again.
    Reload,
    /// End the session.
    #[command(alias = "exit")]
    Quit,
}

/// Runs the interactive session until `quit` or the end of `input`. The prompt and parse errors
/// go to `prompt`; the list, chart and notices go to `renderer`.
///
/// # Errors
/// - Returns an error if the remote service cannot be set up, or if reading input or writing the
///   prompt fails. A failed expense operation does not end the session.
pub async fn shell<R, I, W>(
    config: &Config,
    mode: Mode,
    input: I,
    prompt: W,
    renderer: R,
) -> Result<Out<()>>
where
    R: Renderer,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut tracker = Tracker::new(api::remote(config, mode)?, renderer);
    // A failed initial load is shown as the empty state, and `reload` can retry it
    let _ = tracker.load().await;
    let handled = session(&mut tracker, input, prompt).await?;
    Ok(format!("Session ended after {handled} commands").into())
}

async fn session<R, I, W>(tracker: &mut Tracker<R>, input: I, mut prompt: W) -> Result<usize>
where
    R: Renderer,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut handled = 0;
    loop {
        write!(prompt, "{PROMPT}")
            .and_then(|_| prompt.flush())
            .context("Unable to write the prompt")?;
        let Some(line) = lines.next_line().await.context("Unable to read input")? else {
            debug!("End of input");
            break;
        };
        let words = match split_words(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(e) => {
                writeln!(prompt, "{e}").context("Unable to write to the terminal")?;
                continue;
            }
        };
        let cli = match ShellCli::try_parse_from(&words) {
            Ok(cli) => cli,
            Err(e) => {
                // This is also how `help` is shown
                writeln!(prompt, "{e}").context("Unable to write to the terminal")?;
                continue;
            }
        };
        handled += 1;
        if run(tracker, cli.command).await.is_break() {
            break;
        }
    }
    Ok(handled)
}

async fn run<R: Renderer>(tracker: &mut Tracker<R>, command: ShellCommand) -> ControlFlow<()> {
    trace!("{command:?}");
    let result: Outcome<()> = match command {
        ShellCommand::List => {
            tracker.refresh();
            Ok(())
        }
        ShellCommand::Filter(args) => {
            tracker.set_filter(args.filter());
            Ok(())
        }
        ShellCommand::Reset => {
            tracker.reset_filters();
            Ok(())
        }
        ShellCommand::Add(args) => tracker
            .add(
                args.amount(),
                args.category().clone(),
                args.description(),
                Some(args.date()),
            )
            .await
            .map(drop),
        ShellCommand::Edit { id } => tracker.begin_edit(&id),
        ShellCommand::Set(fields) => tracker.edit_fields(&fields.updates()),
        ShellCommand::Save => tracker.save_edit().await.map(drop),
        ShellCommand::Cancel => tracker.cancel_edit(),
        ShellCommand::Delete { id } => tracker.delete(&id).await,
        ShellCommand::Reload => tracker.load().await,
        ShellCommand::Quit => return ControlFlow::Break(()),
    };
    // Failures have already been shown by the renderer
    if let Err(failure) = result {
        trace!("Command failed: {failure}");
    }
    ControlFlow::Continue(())
}

/// Splits a line into words. Single or double quotes group words, and a backslash takes the next
/// character literally.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') => {
                let Some(next) = chars.next() else {
                    bail!("The line ends with a backslash");
                };
                word.push(next);
                in_word = true;
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => word.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    ensure!(quote.is_none(), "Unclosed quote");
    if in_word {
        words.push(word);
    }
    Ok(words)
}
