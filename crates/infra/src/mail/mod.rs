use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("mail compose error: {0}")]
    Compose(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from: String,
}

/// Async SMTP sender. Without a configured host it degrades to a logging
/// no-op so flows that send mail best-effort still complete.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(settings: &MailSettings) -> Result<Self, MailerError> {
        let from = settings.from.parse::<Mailbox>()?;
        let transport = match settings.smtp_host.as_deref().filter(|host| !host.trim().is_empty()) {
            None => None,
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
                    .port(settings.smtp_port);
                if let (Some(username), Some(password)) =
                    (&settings.smtp_username, &settings.smtp_password)
                {
                    builder = builder
                        .credentials(Credentials::new(username.clone(), password.clone()));
                }
                Some(builder.build())
            }
        };
        Ok(Self { transport, from })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let Some(transport) = self.transport.as_ref() else {
            info!(%to, subject, "smtp not configured; dropping outgoing mail");
            return Ok(());
        };
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        transport.send(message).await?;
        Ok(())
    }

    pub async fn send_password_reset(
        &self,
        to: &str,
        recipient_name: &str,
        reset_link: &str,
    ) -> Result<(), MailerError> {
        let body = password_reset_body(recipient_name, reset_link);
        self.send(to, "Reset your password", &body).await
    }
}

fn password_reset_body(recipient_name: &str, reset_link: &str) -> String {
    format!(
        "Hi {recipient_name},\n\n\
         We received a request to reset your password. Open the link below to \
         choose a new one:\n\n{reset_link}\n\n\
         The link expires in one hour. If you did not request this, you can \
         ignore this message.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::password_reset_body;

    #[test]
    fn reset_body_contains_link_and_name() {
        let body = password_reset_body("ada", "https://example.com/reset?token=t1");
        assert!(body.contains("Hi ada,"));
        assert!(body.contains("https://example.com/reset?token=t1"));
    }
}
