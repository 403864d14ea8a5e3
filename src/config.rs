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

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use crate::smtp::auth::Credentials;

pub const SENDER_EMAIL: &str = "SENDER_EMAIL";
pub const SENDER_PASSWORD: &str = "SENDER_PASSWORD";
pub const SMTP_HOST: &str = "SMTP_HOST";
pub const SMTP_PORT: &str = "SMTP_PORT";
pub const SMTP_TIMEOUT: &str = "SMTP_TIMEOUT";

pub const DEFAULT_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_PORT: u16 = 465;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub enum Error {
    /// SENDER_EMAIL or SENDER_PASSWORD is absent or empty.
    MissingCredentials,

    /// A variable is set but cannot be parsed.
    InvalidValue { key: &'static str, value: String },

    /// The settings file could not be loaded.
    EnvFile(dotenvy::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingCredentials => write!(
                f,
                "Missing {SENDER_EMAIL} or {SENDER_PASSWORD} in environment."
            ),
            Error::InvalidValue { key, value } => {
                write!(f, "Invalid configuration: {key}={value:?}")
            }
            Error::EnvFile(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for Error {}

/// Populates the process environment from a settings file and returns the
/// file that was read.
///
/// Without an explicit path `./.env` is loaded if present. Variables that are
/// already set are left untouched.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, Error> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|()| Some(path.to_path_buf()))
            .map_err(Error::EnvFile),
        None => match dotenvy::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(err) if err.not_found() => Ok(None),
            Err(err) => Err(Error::EnvFile(err)),
        },
    }
}

/// Reads a variable from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.is_empty())
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, Error> {
    match non_empty(lookup, key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::InvalidValue { key, value }),
        None => Ok(default),
    }
}

/// The account messages are sent from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub credentials: Credentials<String>,
}

impl Sender {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        match (
            non_empty(&lookup, SENDER_EMAIL),
            non_empty(&lookup, SENDER_PASSWORD),
        ) {
            (Some(email), Some(password)) => Ok(Sender {
                credentials: Credentials::new(email, password),
            }),
            _ => Err(Error::MissingCredentials),
        }
    }

    pub fn email(&self) -> &str {
        self.credentials.username()
    }
}

/// Where and how to reach the submission server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ServerSettings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let timeout = parse_or(&lookup, SMTP_TIMEOUT, DEFAULT_TIMEOUT.as_secs())?;
        if timeout == 0 {
            return Err(Error::InvalidValue {
                key: SMTP_TIMEOUT,
                value: timeout.to_string(),
            });
        }

        Ok(ServerSettings {
            host: non_empty(&lookup, SMTP_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, SMTP_PORT, DEFAULT_PORT)?,
            timeout: Duration::from_secs(timeout),
        })
    }
}
