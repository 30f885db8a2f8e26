//! Outgoing mail: password-reset links and restock notices.
//!
//! Delivery is best-effort from the caller's point of view; see
//! [`Mailer::send_best_effort`].

use lettre::{
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::header::ContentType,
  transport::{
    smtp::{Error as SmtpError, authentication::Credentials},
    stub::AsyncStubTransport,
  },
};
use serde::Deserialize;
use thiserror::Error;

/// Mail settings, the `[mail]` table of the server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
  #[serde(default)]
  pub transport:     MailTransport,
  #[serde(default)]
  pub smtp_host:     String,
  #[serde(default = "default_smtp_port")]
  pub smtp_port:     u16,
  #[serde(default)]
  pub smtp_username: String,
  #[serde(default)]
  pub smtp_password: String,
  #[serde(default = "default_from_address")]
  pub from_address:  String,
}

impl Default for MailConfig {
  fn default() -> Self {
    Self {
      transport:     MailTransport::default(),
      smtp_host:     String::new(),
      smtp_port:     default_smtp_port(),
      smtp_username: String::new(),
      smtp_password: String::new(),
      from_address:  default_from_address(),
    }
  }
}

fn default_smtp_port() -> u16 { 587 }

fn default_from_address() -> String { "VoltMarket <no-reply@voltmarket.local>".into() }

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
  Smtp,
  /// Write messages to the log instead of sending them.
  #[default]
  Log,
}

#[derive(Debug, Error)]
pub enum MailError {
  #[error("SMTP error: {0}")]
  Smtp(#[from] SmtpError),

  #[error("failed to build message: {0}")]
  Message(#[from] lettre::error::Error),

  #[error("invalid email address: {0}")]
  InvalidAddress(String),

  #[error("stub transport error: {0}")]
  Stub(#[from] lettre::transport::stub::Error),
}

#[derive(Clone)]
enum Transport {
  Smtp(AsyncSmtpTransport<Tokio1Executor>),
  Log,
  Stub(AsyncStubTransport),
}

/// Sends plain-text mail through the configured transport.
#[derive(Clone)]
pub struct Mailer {
  transport:    Transport,
  from_address: String,
}

impl Mailer {
  pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
    let transport = match config.transport {
      MailTransport::Log => Transport::Log,
      MailTransport::Smtp => {
        let mut builder =
          AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);
        if !config.smtp_username.is_empty() {
          builder = builder.credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
          ));
        }
        Transport::Smtp(builder.build())
      }
    };
    Ok(Self { transport, from_address: config.from_address.clone() })
  }

  /// A mailer that records every message in memory, for tests.
  pub fn stub() -> (Self, AsyncStubTransport) {
    let stub = AsyncStubTransport::new_ok();
    let mailer = Self {
      transport:    Transport::Stub(stub.clone()),
      from_address: default_from_address(),
    };
    (mailer, stub)
  }

  pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
    if let Transport::Log = self.transport {
      tracing::info!(to = %to, subject = %subject, body = %body, "mail (log transport)");
      return Ok(());
    }

    let email = Message::builder()
      .from(
        self
          .from_address
          .parse()
          .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
      )
      .to(to.parse().map_err(|_| MailError::InvalidAddress(to.to_string()))?)
      .subject(subject)
      .header(ContentType::TEXT_PLAIN)
      .body(body.to_string())?;

    match &self.transport {
      Transport::Smtp(smtp) => {
        smtp.send(email).await?;
      }
      Transport::Stub(stub) => {
        stub.send(email).await?;
      }
      Transport::Log => {}
    }
    tracing::debug!(to = %to, subject = %subject, "mail sent");
    Ok(())
  }

  /// Send, logging failures at `warn` instead of returning them.
  pub async fn send_best_effort(&self, to: &str, subject: &str, body: &str) {
    if let Err(e) = self.send(to, subject, body).await {
      tracing::warn!(to = %to, subject = %subject, error = %e, "failed to send mail");
    }
  }
}
