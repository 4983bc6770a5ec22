//! ssh command - Key pair and trusted-host management

use super::{runtime, verbosity};
use crate::cli::Reported;
use crate::engine::Context;
use crate::ssh::{HostKeySource, SshHelper};
use crate::ui::output;
use anyhow::{Context as _, Result};

fn helper(ctx: &Context) -> Result<SshHelper> {
    SshHelper::from_config(&ctx.config).context("Failed to locate SSH directory")
}

/// Print whether the key pair exists, as JSON.
pub fn check_key(ctx: &Context) -> Result<()> {
    let status = helper(ctx)?.check_key()?;
    output::print_json(&status).context("Failed to encode result")?;
    Ok(())
}

/// Generate the key pair and print its public key.
pub fn generate_key(ctx: &Context, identity: Option<&str>) -> Result<()> {
    let helper = helper(ctx)?;
    let key = runtime()?.block_on(helper.generate_key(identity.unwrap_or_default()))?;
    output::success(
        format!("Generated {}", helper.paths().private_key().display()),
        verbosity(ctx),
    );
    println!("{}", key);
    Ok(())
}

/// Print the public key.
pub fn public_key(ctx: &Context) -> Result<()> {
    println!("{}", helper(ctx)?.public_key()?);
    Ok(())
}

/// Print whether `host` is trusted; exit non-zero if it is not.
pub fn has_host(ctx: &Context, host: &str) -> Result<()> {
    if helper(ctx)?.has_trusted_host(host)? {
        output::print(format!("{} is trusted", host), verbosity(ctx));
        Ok(())
    } else {
        output::print(format!("{} is not trusted", host), verbosity(ctx));
        Err(Reported(format!("{} is not trusted", host)).into())
    }
}

/// Add `host` to known_hosts.
pub fn trust_host(ctx: &Context, host: &str) -> Result<()> {
    let helper = helper(ctx)?;
    let outcome = runtime()?.block_on(helper.trust_host(host))?;

    if outcome.source == HostKeySource::BuiltIn {
        output::warn(
            "live key scan failed; the recorded keys come from gitdeck's built-in table",
            verbosity(ctx),
        );
    }
    output::success(outcome.message(), verbosity(ctx));
    Ok(())
}
