// src/mailer/mod.rs
//
// Outbound e-mail. Delivery goes through an HTTP mail relay; when no
// relay is configured (development, tests) messages are logged and
// dropped so the calling flow still completes.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::core::config::Config;
use crate::models::UserRecord;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Mail relay rejected message: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundMail {
    pub to: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl OutboundMail {
    pub fn to_one(address: &str, subject: &str, body: &str) -> Self {
        Self {
            to: vec![address.to_string()],
            bcc: Vec::new(),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Mailer {
    relay_url: Option<String>,
    from: String,
    client: reqwest::Client,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            relay_url: config.mail_relay_url.clone(),
            from: config.mail_from.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Deliver a message. Returns `Ok(true)` when handed to the relay,
    /// `Ok(false)` when no relay is configured.
    pub async fn send(&self, mail: &OutboundMail) -> Result<bool, MailError> {
        let url = match &self.relay_url {
            Some(url) => url,
            None => {
                log::info!(
                    "No mail relay configured; dropping message '{}' to {:?}",
                    mail.subject,
                    mail.to
                );
                return Ok(false);
            }
        };

        let response = self
            .client
            .post(url)
            .json(&json!({
                "from": self.from,
                "to": mail.to,
                "bcc": mail.bcc,
                "subject": mail.subject,
                "html": mail.body,
            }))
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("Mail '{}' accepted by relay", mail.subject);
            Ok(true)
        } else {
            Err(MailError::Rejected(response.status().to_string()))
        }
    }
}

/// Split a set of users into the to-list and bcc-list for a bulk
/// mailing: administrators are addressed openly as the mailing-list
/// contacts, everyone else is blind-copied.
pub fn mailing_lists(users: &[UserRecord]) -> (Vec<String>, Vec<String>) {
    let mut to_list = Vec::new();
    let mut bcc_list = Vec::new();
    for user in users {
        if user.is_admin() {
            to_list.push(format!("Family Tree Mailing List <{}>", user.email));
        } else {
            bcc_list.push(user.email.clone());
        }
    }
    (to_list, bcc_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(name: &str, email: &str, auth: &str) -> UserRecord {
        UserRecord {
            id: 0,
            username: name.to_string(),
            email: email.to_string(),
            password_hash: None,
            sha_password: None,
            auth: auth.to_string(),
            options: 0,
            confirm_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admins_go_to_the_open_list() {
        let users = vec![
            user("webmaster", "root@example.com", "yes"),
            user("margaret", "margaret@example.com", "blog,edit"),
            user("duncan", "duncan@example.com", "pending"),
        ];
        let (to, bcc) = mailing_lists(&users);
        assert_eq!(to, vec!["Family Tree Mailing List <root@example.com>"]);
        assert_eq!(bcc, vec!["margaret@example.com", "duncan@example.com"]);
    }

    #[tokio::test]
    async fn unconfigured_mailer_drops_quietly() {
        let mailer = Mailer {
            relay_url: None,
            from: "webmaster@familytree.example".to_string(),
            client: reqwest::Client::new(),
        };
        let sent = mailer
            .send(&OutboundMail::to_one("a@example.com", "hello", "<p>hi</p>"))
            .await
            .unwrap();
        assert!(!sent);
    }
}
