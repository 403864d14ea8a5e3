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

use std::fmt::Display;

use base64::{engine::general_purpose::STANDARD, Engine};
use smtp_proto::{EhloResponse, AUTH_LOGIN, AUTH_PLAIN};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::SmtpClient;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials<T: AsRef<str>> {
    username: T,
    secret: T,
}

impl<T: AsRef<str>> Credentials<T> {
    /// Creates a new `Credentials` instance.
    pub fn new(username: T, secret: T) -> Credentials<T> {
        Credentials { username, secret }
    }

    pub fn username(&self) -> &str {
        self.username.as_ref()
    }

    pub fn secret(&self) -> &str {
        self.secret.as_ref()
    }

    pub(crate) fn encode(&self, mechanism: Mechanism, challenge: &str) -> crate::Result<String> {
        Ok(STANDARD.encode(
            match mechanism {
                Mechanism::Plain => {
                    format!(
                        "\u{0}{}\u{0}{}",
                        self.username.as_ref(),
                        self.secret.as_ref()
                    )
                }

                Mechanism::Login => {
                    let challenge = STANDARD.decode(challenge)?;

                    let starts_with = |prefix: &[u8]| {
                        challenge
                            .get(..prefix.len())
                            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
                    };

                    // Because Google makes its own standards
                    if starts_with(b"user name") || starts_with(b"username") {
                        self.username.as_ref()
                    } else if starts_with(b"password") {
                        self.secret.as_ref()
                    } else {
                        return Err(Error::InvalidChallenge.into());
                    }
                    .to_string()
                }
            }
            .as_bytes(),
        ))
    }
}

impl<T: AsRef<str>> From<(T, T)> for Credentials<T> {
    fn from(credentials: (T, T)) -> Self {
        Credentials {
            username: credentials.0,
            secret: credentials.1,
        }
    }
}

impl<T: AsRef<str>> std::fmt::Debug for Credentials<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_ref())
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidChallenge,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidChallenge => write!(f, "Invalid challenge received."),
        }
    }
}

/// Authentication mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mechanism {
    /// Plain
    Plain,

    /// Login
    Login,
}

impl Mechanism {
    /// Supported mechanisms, in order of preference.
    pub const PREFERENCE: [Mechanism; 2] = [Mechanism::Plain, Mechanism::Login];

    /// The `smtp-proto` capability bit advertising this mechanism.
    pub fn bit(&self) -> u64 {
        match self {
            Mechanism::Plain => AUTH_PLAIN,
            Mechanism::Login => AUTH_LOGIN,
        }
    }
}

impl Display for Mechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mechanism::Plain => write!(f, "PLAIN"),
            Mechanism::Login => write!(f, "LOGIN"),
        }
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> SmtpClient<T> {
    /// Authenticates with the first advertised mechanism that succeeds.
    pub async fn authenticate<U: AsRef<str>>(
        &mut self,
        credentials: &Credentials<U>,
        capabilities: &EhloResponse<String>,
    ) -> crate::Result<&mut Self> {
        let mut last_err = None;

        for mechanism in Mechanism::PREFERENCE
            .into_iter()
            .filter(|mechanism| capabilities.auth_mechanisms & mechanism.bit() != 0)
        {
            log::debug!(
                "Authenticating as {} using {}",
                credentials.username(),
                mechanism
            );
            match self.auth(mechanism, credentials).await {
                Ok(_) => return Ok(self),
                Err(crate::Error::UnexpectedReply(reply)) => {
                    // 535: credentials rejected, another mechanism won't help
                    let rejected = reply.code() == 535;
                    last_err = Some(reply);
                    if rejected {
                        break;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(reply) = last_err {
            Err(crate::Error::AuthenticationFailed(reply))
        } else {
            Err(crate::Error::UnsupportedAuthMechanism)
        }
    }

    pub(crate) async fn auth<U: AsRef<str>>(
        &mut self,
        mechanism: Mechanism,
        credentials: &Credentials<U>,
    ) -> crate::Result<()> {
        let mut reply = match mechanism {
            Mechanism::Plain => {
                self.cmd(
                    format!("AUTH {} {}\r\n", mechanism, credentials.encode(mechanism, "")?)
                        .as_bytes(),
                )
                .await?
            }
            Mechanism::Login => self.cmd(format!("AUTH {mechanism}\r\n").as_bytes()).await?,
        };

        for _ in 0..3 {
            match reply.code() {
                334 => {
                    reply = self
                        .cmd(format!("{}\r\n", credentials.encode(mechanism, reply.message())?).as_bytes())
                        .await?;
                }
                235 => {
                    return Ok(());
                }
                _ => {
                    return Err(crate::Error::UnexpectedReply(reply));
                }
            }
        }

        Err(crate::Error::UnexpectedReply(reply))
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use smtp_proto::{EhloResponse, AUTH_LOGIN, AUTH_PLAIN, AUTH_XOAUTH2};
    use tokio_test::io::Builder;

    use crate::{
        smtp::auth::{Credentials, Mechanism},
        SmtpClient,
    };

    fn capabilities(auth_mechanisms: u64) -> EhloResponse<String> {
        EhloResponse {
            auth_mechanisms,
            ..Default::default()
        }
    }

    #[test]
    fn auth_encode() {
        // Login
        assert_eq!(
            Credentials::new("tim", "tanstaaftanstaaf")
                .encode(Mechanism::Login, "VXNlciBOYW1lAA==",)
                .unwrap(),
            "dGlt"
        );
        assert_eq!(
            Credentials::new("tim", "tanstaaftanstaaf")
                .encode(Mechanism::Login, "UGFzc3dvcmQA",)
                .unwrap(),
            "dGFuc3RhYWZ0YW5zdGFhZg=="
        );
        assert!(Credentials::new("tim", "tanstaaftanstaaf")
            .encode(Mechanism::Login, "SGVsbG8=",)
            .is_err());

        // Eight-byte prompts without a trailing colon
        assert_eq!(
            Credentials::new("tim", "tanstaaftanstaaf")
                .encode(Mechanism::Login, "VXNlcm5hbWU=",)
                .unwrap(),
            "dGlt"
        );
        assert_eq!(
            Credentials::new("tim", "tanstaaftanstaaf")
                .encode(Mechanism::Login, "UGFzc3dvcmQ=",)
                .unwrap(),
            "dGFuc3RhYWZ0YW5zdGFhZg=="
        );

        // Plain
        assert_eq!(
            Credentials::new("tim", "tanstaaftanstaaf")
                .encode(Mechanism::Plain, "",)
                .unwrap(),
            "AHRpbQB0YW5zdGFhZnRhbnN0YWFm"
        );
    }

    #[test]
    fn secret_is_not_printed() {
        let debug = format!("{:?}", Credentials::new("tim", "tanstaaftanstaaf"));
        assert!(debug.contains("tim"));
        assert!(!debug.contains("tanstaaf"));
    }

    #[tokio::test]
    async fn plain_preferred() {
        let stream = Builder::new()
            .write(b"AUTH PLAIN AHRpbQB0YW5zdGFhZnRhbnN0YWFm\r\n")
            .read(b"235 2.7.0 Accepted\r\n")
            .build();
        let mut client = SmtpClient::new(stream, Duration::from_secs(5));

        client
            .authenticate(
                &Credentials::new("tim", "tanstaaftanstaaf"),
                &capabilities(AUTH_LOGIN | AUTH_PLAIN | AUTH_XOAUTH2),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn login_exchange() {
        let stream = Builder::new()
            .write(b"AUTH LOGIN\r\n")
            .read(b"334 VXNlcm5hbWU6\r\n")
            .write(b"dGlt\r\n")
            .read(b"334 UGFzc3dvcmQ6\r\n")
            .write(b"dGFuc3RhYWZ0YW5zdGFhZg==\r\n")
            .read(b"235 2.7.0 Accepted\r\n")
            .build();
        let mut client = SmtpClient::new(stream, Duration::from_secs(5));

        client
            .authenticate(
                &Credentials::new("tim", "tanstaaftanstaaf"),
                &capabilities(AUTH_LOGIN),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_credentials_stop_negotiation() {
        let stream = Builder::new()
            .write(b"AUTH PLAIN AHRpbQB3cm9uZw==\r\n")
            .read(b"535 5.7.8 Username and Password not accepted\r\n")
            .build();
        let mut client = SmtpClient::new(stream, Duration::from_secs(5));

        let err = client
            .authenticate(
                &Credentials::new("tim", "wrong"),
                &capabilities(AUTH_LOGIN | AUTH_PLAIN),
            )
            .await
            .err()
            .unwrap();
        assert!(matches!(&err, crate::Error::AuthenticationFailed(reply) if reply.code() == 535));
        assert!(err.to_string().contains("Username and Password not accepted"));
    }

    #[tokio::test]
    async fn no_common_mechanism() {
        let stream = Builder::new().build();
        let mut client = SmtpClient::new(stream, Duration::from_secs(5));

        assert!(matches!(
            client
                .authenticate(
                    &Credentials::new("tim", "tanstaaftanstaaf"),
                    &capabilities(AUTH_XOAUTH2),
                )
                .await,
            Err(crate::Error::UnsupportedAuthMechanism)
        ));
    }
}
