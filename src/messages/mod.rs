// src/messages/mod.rs
pub mod registry;
pub mod thread;

use crate::core::context::RequestUser;
use crate::db::{Database, DbError};
use crate::models::{BlogRecord, NewUser, UserRecord};

/// A message posted without a subject takes its first line as the
/// subject.
pub fn default_subject(message: &str) -> String {
    match message.find(['\n', '\r']) {
        Some(pos) => message[..pos].to_string(),
        None => message.to_string(),
    }
}

/// Resolve the account a casual visitor posts under. A known e-mail
/// address maps to its existing account; an unknown one gets a
/// `visitor` account named after the current account count.
pub async fn visitor_account(db: &Database, email: &str) -> Result<UserRecord, DbError> {
    if let Some(user) = db.find_user_by_email(email).await? {
        return Ok(user);
    }

    let count = db.count_users().await?;
    let username = format!("Visitor {}", count);
    let id = db
        .create_user(&NewUser {
            username,
            email: email.to_string(),
            password_hash: None,
            auth: "visitor".to_string(),
            options: 0,
            confirm_id: None,
        })
        .await?;
    db.get_user_by_id(id).await
}

/// The username of the account a message is addressed to, when it is
/// addressed to a person at all.
pub async fn receiver_of(db: &Database, blog: &BlogRecord) -> Result<Option<String>, DbError> {
    if blog.table_name != "Users" {
        return Ok(None);
    }
    match db.get_user_by_id(blog.keyvalue).await {
        Ok(user) => Ok(Some(user.username)),
        Err(DbError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Messages may only be removed by their sender, their addressee, or
/// an administrator.
pub fn may_delete(blog: &BlogRecord, receiver: Option<&str>, user: &RequestUser) -> bool {
    user.username == blog.username
        || receiver.map_or(false, |r| r == user.username)
        || user.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn blog(sender: &str) -> BlogRecord {
        BlogRecord {
            index: 1,
            table_name: "Users".to_string(),
            keyvalue: 5,
            username: sender.to_string(),
            subject: "hello".to_string(),
            text: "body".to_string(),
            datetime: Utc::now(),
        }
    }

    fn user(name: &str, auth: &str) -> RequestUser {
        RequestUser {
            id: 1,
            username: name.to_string(),
            email: format!("{}@example.com", name),
            auth: auth.to_string(),
        }
    }

    #[test]
    fn subject_defaults_to_first_line() {
        assert_eq!(default_subject("one line"), "one line");
        assert_eq!(default_subject("first\nsecond"), "first");
        assert_eq!(default_subject("first\rsecond"), "first");
        assert_eq!(default_subject(""), "");
    }

    #[test]
    fn sender_receiver_and_admin_may_delete() {
        let blog = blog("margaret");
        assert!(may_delete(&blog, Some("duncan"), &user("margaret", "blog,edit")));
        assert!(may_delete(&blog, Some("duncan"), &user("duncan", "blog,edit")));
        assert!(may_delete(&blog, Some("duncan"), &user("webmaster", "yes")));
        assert!(!may_delete(&blog, Some("duncan"), &user("intruder", "blog,edit")));
        assert!(!may_delete(&blog, None, &user("duncan", "blog,edit")));
    }
}
