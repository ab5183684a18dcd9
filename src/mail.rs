use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EmailConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()>;
}

/// Posts messages as JSON to a transactional email API.
pub struct HttpMailer {
    client: reqwest::Client,
    cfg: EmailConfig,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(cfg: EmailConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("build email http client")?;
        Ok(Self { client, cfg })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        let mut req = self.client.post(&self.cfg.api_url).json(&SendRequest {
            from: &self.cfg.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        });
        if let Some(key) = &self.cfg.api_key {
            req = req.bearer_auth(key);
        }
        req.send()
            .await
            .context("email api request")?
            .error_for_status()
            .context("email api response")?;
        info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}

/// Used when emails are not enabled.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        debug!(to = %message.to, subject = %message.subject, "emails disabled; not sending");
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Welcome email for an account created by an administrator.
pub fn new_account_email(project_name: &str, email: &str) -> EmailMessage {
    let project = escape_html(project_name);
    let user = escape_html(email);
    EmailMessage {
        to: email.to_string(),
        subject: format!("{project_name} - New account for user {email}"),
        html: format!(
            "<p>An account has been created for you on {project}.</p>\
             <p>Your username is <b>{user}</b>. Ask your administrator for the initial \
             password and change it after your first login.</p>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_email_names_the_user() {
        let msg = new_account_email("blogapi", "a@x.com");
        assert_eq!(msg.to, "a@x.com");
        assert!(msg.subject.contains("a@x.com"));
        assert!(msg.html.contains("blogapi"));
    }

    #[test]
    fn new_account_email_escapes_markup() {
        let msg = new_account_email("blog & co", "<script>\"x'@y.com");
        assert!(!msg.html.contains("<script>"));
        assert!(msg.html.contains("&lt;script&gt;&quot;x&#x27;@y.com"));
        assert!(msg.html.contains("blog &amp; co"));
        assert_eq!(msg.to, "<script>\"x'@y.com");
    }

    #[tokio::test]
    async fn disabled_mailer_accepts_everything() {
        DisabledMailer
            .send(new_account_email("blogapi", "a@x.com"))
            .await
            .unwrap();
    }
}
