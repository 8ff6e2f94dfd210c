use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// Best-effort mail channel for trigger notifications
///
/// At-most-once by design: a failure is logged and forgotten. The live SSE
/// push is the authoritative notification; mail is a redundant convenience.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_task_triggered(&self, to: &str, label: &str);
}

/// SMTP mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    frontend_url: String,
}

impl SmtpMailer {
    /// Build the mailer from SMTP settings; fails only on malformed config
    pub fn new(config: &SmtpConfig, frontend_url: String) -> Result<Self, String> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP relay setup failed: {}", e))?
            .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| format!("Invalid from address '{}': {}", config.from, e))?;

        Ok(Self {
            transport: builder.build(),
            from,
            frontend_url,
        })
    }

    fn render_body(&self, label: &str) -> String {
        format!(
            "Your scheduled task \"{}\" has met its condition and is ready to be executed!\n\n\
             Because you control your own wallet keys, the server cannot sign the transaction \
             for you. Please open your dashboard to confirm and sign:\n\n{}\n",
            label, self.frontend_url
        )
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send_task_triggered(&self, to: &str, label: &str) {
        let recipient = match to.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                tracing::warn!("Invalid recipient address {}: {}", to, e);
                return;
            }
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject("Action Required: Scheduled Task Triggered")
            .body(self.render_body(label));

        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Failed to build trigger email for {}: {}", to, e);
                return;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => {
                tracing::info!("Trigger email sent to {} for task \"{}\"", to, label);
            }
            Err(e) => {
                // No retry, no queue - the SSE channel already carried the event
                tracing::warn!("Failed to send trigger email to {}: {}", to, e);
            }
        }
    }
}
