//! op command - Run boundary operations through the façade

use super::{client, runtime, verbosity};
use crate::cli::Reported;
use crate::core::envelope::{Envelope, OpOutput};
use crate::engine::Context;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Run one operation and print its envelope.
pub fn op(ctx: &Context, operation: &str, args: Vec<String>) -> Result<()> {
    let repo = ctx.repo_path().context("Failed to resolve repository path")?;
    let client = client(ctx);

    let envelope = runtime()?.block_on(async {
        let envelope = client.execute(operation, &repo, args).await;
        client.transport().shutdown();
        envelope
    });

    output::print_json(&envelope).context("Failed to encode result")?;
    finish(envelope)
}

/// Print the checked-out branch.
pub fn current_branch(ctx: &Context) -> Result<()> {
    let repo = ctx.repo_path().context("Failed to resolve repository path")?;
    let client = client(ctx);

    let branch = runtime()?.block_on(client.get_current_branch(&repo));
    println!("{}", branch);
    Ok(())
}

/// Print tag names, one per line.
pub fn tags(ctx: &Context) -> Result<()> {
    let repo = ctx.repo_path().context("Failed to resolve repository path")?;
    let client = client(ctx);

    let envelope = runtime()?.block_on(client.get_tags(&repo));
    if let Some(OpOutput::Tags(tags)) = &envelope.data {
        if !tags.is_empty() {
            println!("{}", output::format_list(tags, ""));
        }
    }
    finish(envelope)
}

/// Print the suggested next release tag.
pub fn next_tag(ctx: &Context) -> Result<()> {
    let repo = ctx.repo_path().context("Failed to resolve repository path")?;
    let client = client(ctx);

    let tag = runtime()?.block_on(client.suggest_next_tag(&repo));
    output::debug(format!("suggested from tags in {}", repo.display()), verbosity(ctx));
    println!("{}", tag);
    Ok(())
}

/// The façade already reported failures through its notifier.
fn finish(envelope: Envelope) -> Result<()> {
    match envelope.into_result() {
        Ok(_) => Ok(()),
        Err(message) => Err(Reported(message).into()),
    }
}
