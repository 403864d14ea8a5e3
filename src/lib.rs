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

//! # booth-mail
//!
//! _booth-mail_ sends a single picture (or any other file) as an e-mail
//! attachment through an SMTP submission server. It includes:
//!
//! - A MIME **multipart** message with a plain-text body and one binary
//!   attachment whose content type is guessed from the file extension.
//! - Simple Mail Transfer Protocol (**SMTP**; _RFC 5321_) submission over
//!   implicit **TLS** (port 465).
//! - SMTP Service Extension for Authentication (_RFC 4954_) with the
//!   `PLAIN` and `LOGIN` mechanisms.
//! - Sender credentials read from `SENDER_EMAIL` and `SENDER_PASSWORD`,
//!   optionally populated from a `.env` file.
//!
//! ## Usage Example
//!
//! ```bash
//!  $ export SENDER_EMAIL=booth@example.com
//!  $ export SENDER_PASSWORD=app-password
//!  $ booth-mail --to jane@example.com --name "Jane Doe" --file ./frame.jpg
//!  sent
//! ```
//!
//! Exit codes: `0` sent, `2` missing configuration, `3` attachment not
//! found, `1` SMTP or network failure.
//!
//! The SMTP client can also be driven directly:
//!
//! ```rust
//!     let message = compose(&sender, "jane@example.com", "Jane", &attachment)?;
//!
//!     SmtpClientBuilder::new("smtp.gmail.com", 465)
//!         .credentials(("booth@example.com", "app-password"))
//!         .connect()
//!         .await?
//!         .send(message)
//!         .await?;
//! ```
//!

pub mod cli;
pub mod compose;
pub mod config;
pub mod delivery;
pub mod smtp;

use std::{fmt::Display, time::Duration};

use smtp::auth::Credentials;
use tokio_rustls::TlsConnector;

#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// TLS error
    Tls(Box<rustls::Error>),

    /// Base64 decode error
    Base64(base64::DecodeError),

    /// SMTP authentication error.
    Auth(smtp::auth::Error),

    /// Failure parsing SMTP reply
    UnparseableReply,

    /// Unexpected SMTP reply.
    UnexpectedReply(smtp_proto::Response<String>),

    /// SMTP authentication failure.
    AuthenticationFailed(smtp_proto::Response<String>),

    /// Invalid TLS name provided.
    InvalidTLSName,

    /// Envelope address that cannot be placed on a command line.
    InvalidAddress(String),

    /// The server does not support any of the available authentication methods.
    UnsupportedAuthMechanism,

    /// Connection timeout.
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;

/// SMTP client connected to a submission server.
pub struct SmtpClient<T> {
    pub stream: T,
    pub timeout: Duration,
}

/// Connection parameters used to open an [`SmtpClient`].
#[derive(Clone)]
pub struct SmtpClientBuilder<T: AsRef<str>> {
    pub timeout: Duration,
    pub tls_connector: TlsConnector,
    pub tls_hostname: T,
    pub credentials: Option<Credentials<T>>,
    pub addr: String,
    pub local_host: String,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Tls(e) => write!(f, "TLS error: {e}"),
            Error::Base64(e) => write!(f, "Base64 decode error: {e}"),
            Error::Auth(e) => write!(f, "SMTP authentication error: {e}"),
            Error::UnparseableReply => write!(f, "Unparseable SMTP reply"),
            Error::UnexpectedReply(e) => {
                write!(f, "Unexpected reply: {} {}", e.code(), e.message())
            }
            Error::AuthenticationFailed(e) => {
                write!(f, "Authentication failed: {} {}", e.code(), e.message())
            }
            Error::InvalidTLSName => write!(f, "Invalid TLS name provided"),
            Error::InvalidAddress(addr) => write!(f, "Invalid address: {addr:?}"),
            Error::UnsupportedAuthMechanism => write!(
                f,
                "The server does not support any of the available authentication methods"
            ),
            Error::Timeout => write!(f, "Connection timeout"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Base64(err)
    }
}

impl From<smtp::auth::Error> for Error {
    fn from(err: smtp::auth::Error) -> Self {
        Error::Auth(err)
    }
}
