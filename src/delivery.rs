/*
 * Copyright Stalwart Labs Ltd. See the COPYING
 * file at the top-level directory of this distribution.
 *
 * Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
 * https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
 * <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
 * option. This file may not be copied, modified, or distributed
 * except according to those terms.
 */

use std::{fmt::Display, io, path::PathBuf};

use crate::{
    cli::Args,
    compose::{compose, Attachment},
    config::{self, Sender, ServerSettings},
    smtp::message::Message,
    SmtpClientBuilder,
};

/// Submits a composed message on behalf of a sender.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn deliver(&self, sender: &Sender, message: Message<'_>) -> crate::Result<()>;
}

/// Delivers over a fresh implicit-TLS SMTP connection per message.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    settings: ServerSettings,
}

impl SmtpTransport {
    pub fn new(settings: ServerSettings) -> Self {
        SmtpTransport { settings }
    }
}

impl Transport for SmtpTransport {
    async fn deliver(&self, sender: &Sender, message: Message<'_>) -> crate::Result<()> {
        let mut client = SmtpClientBuilder::new(self.settings.host.as_str(), self.settings.port)
            .timeout(self.settings.timeout)
            .credentials((sender.email(), sender.credentials.secret()))
            .connect()
            .await?;

        client.send(message).await?;

        // The message has been accepted at this point.
        if let Err(err) = client.quit().await {
            log::warn!("QUIT failed after delivery: {err}");
        }

        Ok(())
    }
}

/// Why a run ended without sending.
#[derive(Debug)]
pub enum Failure {
    /// Credentials or settings are missing or invalid.
    Config(config::Error),

    /// The attachment does not exist or cannot be read.
    Attachment { path: PathBuf, error: io::Error },

    /// Building or submitting the message failed.
    Transport(crate::Error),
}

impl Failure {
    pub fn exit_code(&self) -> u8 {
        match self {
            Failure::Config(_) => 2,
            Failure::Attachment { .. } => 3,
            Failure::Transport(_) => 1,
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Config(e) => e.fmt(f),
            Failure::Attachment { path, error } if error.kind() == io::ErrorKind::NotFound => {
                write!(f, "Attachment not found: {}", path.display())
            }
            Failure::Attachment { path, error } => {
                write!(f, "Attachment not readable: {}: {error}", path.display())
            }
            Failure::Transport(e) => write!(f, "SMTP error: {e}"),
        }
    }
}

impl std::error::Error for Failure {}

impl From<config::Error> for Failure {
    fn from(err: config::Error) -> Self {
        Failure::Config(err)
    }
}

impl From<crate::Error> for Failure {
    fn from(err: crate::Error) -> Self {
        Failure::Transport(err)
    }
}

/// Status line and process exit code for a finished run.
pub fn outcome(result: &Result<(), Failure>) -> (String, u8) {
    match result {
        Ok(()) => ("sent".to_string(), 0),
        Err(failure) => (failure.to_string(), failure.exit_code()),
    }
}

/// Sends `args.file` to `args.to`. Credentials and the attachment are
/// checked before the transport is touched.
pub async fn run(
    args: &Args,
    lookup: impl Fn(&str) -> Option<String>,
    transport: &impl Transport,
) -> Result<(), Failure> {
    let sender = Sender::from_lookup(lookup)?;

    let attachment = Attachment::load(&args.file).map_err(|error| Failure::Attachment {
        path: args.file.clone(),
        error,
    })?;
    log::debug!(
        "Attaching {} ({}, {} bytes)",
        attachment.filename,
        attachment.content_type,
        attachment.contents.len()
    );

    let message = compose(sender.email(), &args.to, &args.name, &attachment)?;
    transport.deliver(&sender, message).await?;

    log::info!("Message to {} accepted", args.to);
    Ok(())
}
