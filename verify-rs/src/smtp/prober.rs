//! Disposable SMTP probe sessions
//!
//! A probe opens a fresh connection, walks the handshake up to RCPT TO and
//! drops the connection. Nothing is pipelined and nothing is reused: every
//! exit path, including timeouts, releases the socket.

use crate::error::{Result, VerifyError};
use crate::smtp::response::{parse_reply, SmtpReply};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tracing::debug;

/// Outcome of probing a single recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Server accepted the recipient (250)
    Accepted,
    /// Server returned a non-250 reply to RCPT TO; carries the reply text
    Rejected(String),
    /// The exchange could not complete; carries a diagnostic reason
    Errored(String),
}

/// Prober performing one RCPT TO check per connection
#[derive(Debug, Clone)]
pub struct SmtpProber {
    port: u16,
    timeout: Duration,
    mail_from: String,
    helo_domain: String,
}

impl SmtpProber {
    pub fn new(port: u16, timeout: Duration, mail_from: String, helo_domain: String) -> Self {
        Self {
            port,
            timeout,
            mail_from,
            helo_domain,
        }
    }

    /// Probe whether `recipient` is deliverable on `host`
    ///
    /// Never returns an error: the whole exchange runs under one deadline and
    /// every failure folds into [`ProbeOutcome::Errored`].
    pub async fn probe(&self, host: &str, recipient: &str) -> ProbeOutcome {
        match tokio::time::timeout(self.timeout, self.exchange(host, recipient)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => ProbeOutcome::Errored(e.to_string()),
            Err(_) => ProbeOutcome::Errored(format!(
                "Timed out after {}s probing {}",
                self.timeout.as_secs(),
                host
            )),
        }
    }

    /// connect -> banner -> EHLO -> MAIL FROM -> RCPT TO
    ///
    /// The EHLO and MAIL FROM replies are consumed without branching; only
    /// the greeting and the RCPT reply decide the outcome.
    async fn exchange(&self, host: &str, recipient: &str) -> Result<ProbeOutcome> {
        let addr = format!("{}:{}", host, self.port);
        debug!("Probing {} via {}", recipient, addr);

        let stream = TcpStream::connect(&addr).await?;
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let greeting = self.read_reply(&mut reader).await?;
        if !greeting.is_positive() {
            return Err(VerifyError::SmtpProtocol(format!(
                "Unexpected greeting: {} {}",
                greeting.code, greeting.text
            )));
        }

        self.write_line(&mut writer, &format!("EHLO {}", self.helo_domain))
            .await?;
        self.read_reply(&mut reader).await?;

        self.write_line(&mut writer, &format!("MAIL FROM:<{}>", self.mail_from))
            .await?;
        self.read_reply(&mut reader).await?;

        self.write_line(&mut writer, &format!("RCPT TO:<{}>", recipient))
            .await?;
        let reply = self.read_reply(&mut reader).await?;

        if reply.code == 250 {
            Ok(ProbeOutcome::Accepted)
        } else if reply.text.is_empty() {
            Ok(ProbeOutcome::Rejected("Unknown error".to_string()))
        } else {
            Ok(ProbeOutcome::Rejected(reply.text))
        }
    }

    /// Read one reply, following continuation lines
    async fn read_reply<R>(&self, reader: &mut BufReader<R>) -> Result<SmtpReply>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut raw = String::new();

        loop {
            let mut line = String::new();
            let n = reader.read_line(&mut line).await?;
            if n == 0 {
                return Err(VerifyError::SmtpProtocol(
                    "Connection closed mid-reply".to_string(),
                ));
            }
            debug!("< {}", line.trim_end());
            raw.push_str(&line);

            // Only a dash after the code continues the reply; a space or a
            // bare `250\r\n` line both end it
            if line.len() < 4 || line.as_bytes()[3] != b'-' {
                break;
            }
        }

        parse_reply(&raw)
    }

    async fn write_line(&self, writer: &mut OwnedWriteHalf, line: &str) -> Result<()> {
        debug!("> {}", line);
        writer.write_all(format!("{}\r\n", line).as_bytes()).await?;
        Ok(())
    }
}
