//! url command - Remote URL protocol conversion

use crate::core::remote_url;
use anyhow::Result;

pub fn to_ssh(url: &str) -> Result<()> {
    println!("{}", remote_url::to_ssh(url));
    Ok(())
}

pub fn to_https(url: &str) -> Result<()> {
    println!("{}", remote_url::to_https(url));
    Ok(())
}
