//! remote command - Switch a remote's protocol or connect a remote

use super::{client, runtime, verbosity};
use crate::cli::Reported;
use crate::client::RemoteError;
use crate::core::remote_url::RemoteProtocol;
use crate::engine::Context;
use crate::ssh::{HostKeySource, SshHelper};
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Rewrite remote `name` to `target`; SSH targets also trust the host.
pub fn switch(ctx: &Context, name: &str, target: RemoteProtocol) -> Result<()> {
    let repo = ctx.repo_path().context("Failed to resolve repository path")?;
    let client = client(ctx);
    let ssh = SshHelper::from_config(&ctx.config).context("Failed to locate SSH directory")?;
    let v = verbosity(ctx);

    let switch = runtime()?
        .block_on(client.switch_remote_protocol(&repo, name, target, &ssh))
        .map_err(|e| match e {
            // git failures were already shown by the notifier
            RemoteError::Lookup { .. } | RemoteError::Update { .. } => Reported(e.to_string()).into(),
            RemoteError::Unrecognized(_) => anyhow::Error::from(e),
        })?;
    output::debug(format!("{}: {} -> {}", switch.remote, switch.from, switch.to), v);

    if !switch.changed {
        output::print(format!("{} already uses {}", name, target), v);
    }
    if let Some(trust) = &switch.trust {
        if trust.source == HostKeySource::BuiltIn {
            output::warn(
                "live key scan failed; the recorded keys come from gitdeck's built-in table",
                v,
            );
        }
        output::success(trust.message(), v);
    }
    println!("{}", switch.to);

    match switch.trust_error {
        Some(message) => Err(Reported(message).into()),
        None => Ok(()),
    }
}

/// Point remote `name` at `url`.
pub fn connect(ctx: &Context, name: &str, url: &str) -> Result<()> {
    let repo = ctx.repo_path().context("Failed to resolve repository path")?;
    let client = client(ctx);

    let envelope = runtime()?.block_on(client.connect_remote(&repo, name, url));
    match envelope.into_result() {
        Ok(_) => Ok(()),
        Err(message) => Err(Reported(message).into()),
    }
}
