// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered account on the site.
///
/// `auth` is a comma-separated list of privileges: `pending` (registered
/// but e-mail unconfirmed), `visitor` (auto-created from an anonymous
/// message post), `blog`, `edit`, and `yes` for administrators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2id hash; absent for accounts that have never signed on
    /// since the hash upgrade.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Legacy SHA-512 hex digest, cleared on first successful signon.
    #[serde(skip_serializing)]
    pub sha_password: Option<String>,
    pub auth: String,
    pub options: i64,
    #[serde(skip_serializing)]
    pub confirm_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// User has asked to receive e-mail notifications.
    pub const OPT_USEMAIL_ON: i64 = 1;
    /// User has asked to suppress popup help.
    pub const OPT_NOHELP_ON: i64 = 2;

    pub fn use_email(&self) -> bool {
        self.options & Self::OPT_USEMAIL_ON != 0
    }

    pub fn no_help(&self) -> bool {
        self.options & Self::OPT_NOHELP_ON != 0
    }

    pub fn is_admin(&self) -> bool {
        self.auth.contains("yes")
    }

    pub fn can_blog(&self) -> bool {
        self.is_admin() || self.auth.contains("blog")
    }
}

/// Field values for a user row that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub auth: String,
    pub options: i64,
    pub confirm_id: Option<String>,
}

/// Partial update of a user row; `None` leaves the column alone.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub auth: Option<String>,
    pub options: Option<i64>,
    pub confirm_id: Option<String>,
}

/// Substring filters for the administrator user listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub username_pattern: Option<String>,
    pub auth_pattern: Option<String>,
    pub email_pattern: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

/// A message ("blog") attached to a record of one of the site's tables.
///
/// Messages addressed to a person target the `Users` table keyed by the
/// recipient's id; replies target the `Blogs` table keyed by the parent
/// message's index.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogRecord {
    pub index: i64,
    pub table_name: String,
    pub keyvalue: i64,
    pub username: String,
    pub subject: String,
    pub text: String,
    pub datetime: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBlog {
    pub table_name: String,
    pub keyvalue: i64,
    pub username: String,
    pub subject: String,
    pub text: String,
}

/// An advertiser account with its twelve per-month click counters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Advertiser {
    pub name: String,
    pub email: String,
    /// The advertisement copy uploaded for this advertiser, if any.
    pub ad_copy: Option<String>,
    /// Click counts for January through December of the current year.
    pub monthly_clicks: Vec<i64>,
}

impl Advertiser {
    pub fn yearly_total(&self) -> i64 {
        self.monthly_clicks.iter().sum()
    }
}

/// An entry in the tutorial video catalog, keyed by file name and
/// language code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Video {
    pub filename: String,
    pub lang: String,
    pub description: String,
    pub display: bool,
}

/// An entry in the recommended book catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub isbn: String,
    pub title: String,
}

/// A signon session or persistence token.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
    pub persistent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(auth: &str, options: i64) -> UserRecord {
        UserRecord {
            id: 1,
            username: "jcobban".to_string(),
            email: "jcobban@example.com".to_string(),
            password_hash: None,
            sha_password: None,
            auth: auth.to_string(),
            options,
            confirm_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn option_bits() {
        let u = user("blog,edit", UserRecord::OPT_USEMAIL_ON);
        assert!(u.use_email());
        assert!(!u.no_help());
        let u = user("blog,edit", UserRecord::OPT_USEMAIL_ON | UserRecord::OPT_NOHELP_ON);
        assert!(u.use_email());
        assert!(u.no_help());
    }

    #[test]
    fn privilege_checks() {
        assert!(user("yes", 0).is_admin());
        assert!(user("yes", 0).can_blog());
        assert!(!user("blog,edit", 0).is_admin());
        assert!(user("blog,edit", 0).can_blog());
        assert!(!user("pending", 0).can_blog());
        assert!(!user("visitor", 0).can_blog());
    }

    #[test]
    fn advertiser_yearly_total() {
        let ad = Advertiser {
            name: "Acme Genealogy".to_string(),
            email: "ads@acme.example".to_string(),
            ad_copy: None,
            monthly_clicks: vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        };
        assert_eq!(ad.yearly_total(), 78);
    }
}
