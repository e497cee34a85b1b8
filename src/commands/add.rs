use crate::api::Mode;
use crate::args::AddArgs;
use crate::commands::{loaded_quietly, Out};
use crate::model::Expense;
use crate::view::Renderer;
use crate::{Config, Result};
use anyhow::Context;

/// Creates an expense from the add-expense form and renders the view once it exists.
///
/// # Errors
/// - Returns an error if the amount is negative, in which case nothing is sent.
/// - Returns an error if the expenses cannot be loaded or the service does not create it.
pub async fn add<R: Renderer>(
    config: &Config,
    mode: Mode,
    args: &AddArgs,
    renderer: R,
) -> Result<Out<Expense>> {
    let mut tracker = loaded_quietly(config, mode, renderer).await?;
    let created = tracker
        .add(
            args.amount(),
            args.category().clone(),
            args.description(),
            Some(args.date()),
        )
        .await
        .context("Unable to add the expense")?;
    Ok(Out::new(format!("Added expense {}", created.id()), created))
}
