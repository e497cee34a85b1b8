use crate::api::Mode;
use crate::args::DeleteArgs;
use crate::commands::{loaded_quietly, Out};
use crate::model::ExpenseId;
use crate::view::Renderer;
use crate::{Config, Result};
use anyhow::Context;

/// Deletes one expense and renders the view without it.
///
/// # Errors
/// - Returns an error if the expenses cannot be loaded or the service does not delete it. The
///   expense stays in the view in that case.
pub async fn delete<R: Renderer>(
    config: &Config,
    mode: Mode,
    args: &DeleteArgs,
    renderer: R,
) -> Result<Out<ExpenseId>> {
    let mut tracker = loaded_quietly(config, mode, renderer).await?;
    tracker
        .delete(args.id())
        .await
        .with_context(|| format!("Unable to delete expense {}", args.id()))?;
    Ok(Out::new(
        format!("Deleted expense {}", args.id()),
        args.id().clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::test::{Event, RecordingRenderer, TestEnv};

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::new().await;
        let mut renderer = RecordingRenderer::default();
        let args = DeleteArgs::new(ExpenseId::from(3));
        let out = delete(&env.config(), Mode::Test, &args, &mut renderer)
            .await
            .unwrap();
        assert_eq!(out.message(), "Deleted expense 3");
        let events = renderer.take();
        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::List { ids, .. } => {
                assert_eq!(ids.len(), 8);
                assert!(!ids.contains(&"3".to_string()));
            }
            other => panic!("expected a list render, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let env = TestEnv::new().await;
        let mut renderer = RecordingRenderer::default();
        let args = DeleteArgs::new(ExpenseId::new("nope"));
        let result = delete(&env.config(), Mode::Test, &args, &mut renderer).await;
        assert!(result.is_err());
        assert_eq!(renderer.take(), vec![Event::Notice(FailureKind::Delete)]);
    }
}
