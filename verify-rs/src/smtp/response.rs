//! SMTP reply parsing

use crate::error::{Result, VerifyError};

/// A complete server reply, single- or multi-line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub text: String,
}

impl SmtpReply {
    /// Positive completion (2xx)
    pub fn is_positive(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Parse an accumulated reply into code and text
///
/// `raw` holds every line of the reply as read off the wire. The code comes
/// from the first line; the text joins the remainder of each line, which is
/// what servers put the human-readable diagnostic in.
pub fn parse_reply(raw: &str) -> Result<SmtpReply> {
    let first = raw.lines().next().unwrap_or("");

    let code = first
        .get(..3)
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| VerifyError::SmtpProtocol(format!("Malformed reply: {:?}", first)))?;

    let text = raw
        .lines()
        .map(|line| line.get(4..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(SmtpReply { code, text })
}
