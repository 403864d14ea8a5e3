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

use std::time::Duration;

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};
use tokio_rustls::client::TlsStream;

use crate::{SmtpClient, SmtpClientBuilder};

use super::{auth::Credentials, tls::build_tls_connector, AssertReply};

impl<T: AsRef<str>> SmtpClientBuilder<T> {
    pub fn new(hostname: T, port: u16) -> Self {
        SmtpClientBuilder {
            addr: format!("{}:{}", hostname.as_ref(), port),
            timeout: Duration::from_secs(60),
            tls_connector: build_tls_connector(),
            tls_hostname: hostname,
            credentials: None,
            local_host: gethostname::gethostname()
                .to_str()
                .unwrap_or("[127.0.0.1]")
                .to_string(),
        }
    }

    /// Set the EHLO hostname
    pub fn helo_host(mut self, host: impl Into<String>) -> Self {
        self.local_host = host.into();
        self
    }

    /// Sets the SMTP connection timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Authenticate with the given credentials once connected
    pub fn credentials(mut self, credentials: impl Into<Credentials<T>>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Connect over implicit TLS, say EHLO and authenticate if credentials were set
    pub async fn connect(&self) -> crate::Result<SmtpClient<TlsStream<TcpStream>>> {
        log::debug!("Connecting to {} over TLS", self.addr);
        tokio::time::timeout(self.timeout, async {
            let client = SmtpClient {
                stream: TcpStream::connect(&self.addr).await?,
                timeout: self.timeout,
            };

            let client = client
                .into_tls(&self.tls_connector, self.tls_hostname.as_ref())
                .await?;

            self.handshake(client).await
        })
        .await
        .map_err(|_| crate::Error::Timeout)?
    }

    /// Reads the greeting, says EHLO and authenticates on an open stream
    pub async fn handshake<S: AsyncRead + AsyncWrite + Unpin>(
        &self,
        mut client: SmtpClient<S>,
    ) -> crate::Result<SmtpClient<S>> {
        client.greeting().await?.assert_positive_completion()?;

        let capabilities = client.ehlo(&self.local_host).await?;
        if let Some(credentials) = &self.credentials {
            client.authenticate(credentials, &capabilities).await?;
        }

        Ok(client)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio_test::io::Builder;

    use crate::{smtp::message::Message, SmtpClient, SmtpClientBuilder};

    #[test]
    fn builder_settings() {
        let builder = SmtpClientBuilder::new("smtp.example.com", 465)
            .helo_host("booth.local")
            .timeout(Duration::from_secs(5))
            .credentials(("booth@example.com", "secret"));

        assert_eq!(builder.addr, "smtp.example.com:465");
        assert_eq!(builder.tls_hostname, "smtp.example.com");
        assert_eq!(builder.local_host, "booth.local");
        assert_eq!(builder.timeout, Duration::from_secs(5));
        assert_eq!(
            builder.credentials.as_ref().map(|c| c.username()),
            Some("booth@example.com")
        );
    }

    #[tokio::test]
    async fn full_session() {
        let stream = Builder::new()
            .read(b"220 smtp.example.com ESMTP ready\r\n")
            .write(b"EHLO booth.local\r\n")
            .read(b"250-smtp.example.com\r\n250-AUTH LOGIN PLAIN\r\n250 8BITMIME\r\n")
            .write(b"AUTH PLAIN AGJvb3RoQGV4YW1wbGUuY29tAHNlY3JldA==\r\n")
            .read(b"235 2.7.0 Accepted\r\n")
            .write(b"MAIL FROM:<booth@example.com>\r\n")
            .read(b"250 2.1.0 OK\r\n")
            .write(b"RCPT TO:<jane@example.com>\r\n")
            .read(b"250 2.1.5 OK\r\n")
            .write(b"DATA\r\n")
            .read(b"354 Go ahead\r\n")
            .write(b"Subject: hi\r\n\r\nhello\r\n.\r\n")
            .read(b"250 2.0.0 OK queued\r\n")
            .write(b"QUIT\r\n")
            .read(b"221 2.0.0 Bye\r\n")
            .build();

        let builder = SmtpClientBuilder::new("smtp.example.com", 465)
            .helo_host("booth.local")
            .credentials(("booth@example.com", "secret"));
        let mut client = builder
            .handshake(SmtpClient::new(stream, Duration::from_secs(5)))
            .await
            .unwrap();
        client
            .send(Message::new(
                "booth@example.com",
                ["jane@example.com"],
                &b"Subject: hi\r\n\r\nhello\r\n"[..],
            ))
            .await
            .unwrap();
        client.quit().await.unwrap();
    }

    #[tokio::test]
    async fn rejected_greeting() {
        let stream = Builder::new()
            .read(b"554 5.3.2 Service unavailable\r\n")
            .build();

        let result = SmtpClientBuilder::new("smtp.example.com", 465)
            .handshake(SmtpClient::new(stream, Duration::from_secs(5)))
            .await;
        assert!(matches!(
            result,
            Err(crate::Error::UnexpectedReply(reply)) if reply.code() == 554
        ));
    }

    #[tokio::test]
    async fn connection_refused() {
        // Bind then drop to get a port nobody listens on.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let result = SmtpClientBuilder::new("127.0.0.1", addr.port())
            .timeout(Duration::from_secs(5))
            .connect()
            .await;
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
