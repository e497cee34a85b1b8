use crate::api::Mode;
use crate::args::UpdateArgs;
use crate::commands::{loaded_quietly, Out};
use crate::model::Expense;
use crate::view::Renderer;
use crate::{Config, Result};
use anyhow::{ensure, Context};

/// Sends the fields in `args` for one expense and renders the view with the record the service
/// returned.
///
/// # Errors
/// - Returns an error if no field is given.
/// - Returns an error if the new amount is negative, in which case nothing is sent.
/// - Returns an error if the expenses cannot be loaded or the service rejects the update.
pub async fn update<R: Renderer>(
    config: &Config,
    mode: Mode,
    args: &UpdateArgs,
    renderer: R,
) -> Result<Out<Expense>> {
    let updates = args.updates();
    ensure!(
        !updates.is_empty(),
        "Nothing to update, pass at least one of --amount, --category, --description, --date or \
        --clear-date"
    );
    let mut tracker = loaded_quietly(config, mode, renderer).await?;
    let updated = tracker
        .update(args.id(), &updates)
        .await
        .with_context(|| format!("Unable to update expense {}", args.id()))?;
    Ok(Out::new(format!("Updated expense {}", updated.id()), updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::UpdateFieldArgs;
    use crate::error::FailureKind;
    use crate::model::{Amount, ExpenseId};
    use crate::test::{Event, RecordingRenderer, TestEnv};
    use clap::Parser;
    use std::str::FromStr;

    /// Parses the update fields the way the CLI does.
    fn fields(args: &[&str]) -> UpdateFieldArgs {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            fields: UpdateFieldArgs,
        }
        let mut argv = vec!["update"];
        argv.extend_from_slice(args);
        Wrapper::try_parse_from(argv).unwrap().fields
    }

    #[tokio::test]
    async fn test_update() {
        let env = TestEnv::new().await;
        let mut renderer = RecordingRenderer::default();
        let args = UpdateArgs::new(ExpenseId::from(1), fields(&["--amount", "75"]));
        let out = update(&env.config(), Mode::Test, &args, &mut renderer)
            .await
            .unwrap();
        let updated = out.structure().unwrap();
        assert_eq!(updated.amount(), Amount::from_str("75").unwrap());
        assert_eq!(updated.description(), "Whole Foods Market");
        assert_eq!(renderer.take().len(), 2);
    }

    #[tokio::test]
    async fn test_update_needs_a_field() {
        let env = TestEnv::new().await;
        let mut renderer = RecordingRenderer::default();
        let args = UpdateArgs::new(ExpenseId::from(1), UpdateFieldArgs::default());
        let result = update(&env.config(), Mode::Test, &args, &mut renderer).await;
        assert!(result.unwrap_err().to_string().contains("Nothing to update"));
        assert!(renderer.take().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let env = TestEnv::new().await;
        let mut renderer = RecordingRenderer::default();
        let args = UpdateArgs::new(ExpenseId::from(404), fields(&["--clear-date"]));
        let result = update(&env.config(), Mode::Test, &args, &mut renderer).await;
        assert!(result.is_err());
        assert_eq!(renderer.take(), vec![Event::Notice(FailureKind::Update)]);
    }
}
