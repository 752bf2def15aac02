// src/db/mod.rs
use crate::models::{
    Advertiser, BlogRecord, Book, NewBlog, NewUser, SessionRecord, UserFilter, UserRecord,
    UserUpdate, Video,
};
use thiserror::Error;

pub mod postgres;
pub mod sqlite;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(String),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

// Convert database-specific errors to our DbError
impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DbError::NotFound,
            other => DbError::SqlxError(other.to_string()),
        }
    }
}

// Database backend trait - implemented by each database type
pub trait DatabaseBackend: Send + Sync {
    // Initialize the database connection
    async fn init(&mut self, connection_string: &str) -> Result<(), DbError>;

    // User operations
    async fn create_user(&self, user: &NewUser) -> Result<i64, DbError>;

    async fn get_user_by_id(&self, id: i64) -> Result<UserRecord, DbError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, DbError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError>;

    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<(), DbError>;

    // Replaces the stored hash and clears any legacy digest
    async fn set_password_hash(&self, id: i64, hash: &str) -> Result<(), DbError>;

    async fn delete_user(&self, id: i64) -> Result<(), DbError>;

    async fn get_filtered_users(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, DbError>;

    async fn count_filtered_users(&self, filter: &UserFilter) -> Result<i64, DbError>;

    async fn count_users(&self) -> Result<i64, DbError>;

    async fn get_admins(&self) -> Result<Vec<UserRecord>, DbError>;

    // Session operations
    async fn create_session(&self, session: &SessionRecord) -> Result<(), DbError>;

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, DbError>;

    async fn delete_session(&self, id: &str) -> Result<(), DbError>;

    async fn purge_expired_sessions(&self) -> Result<u64, DbError>;

    // Message (blog) operations
    async fn add_blog(&self, blog: &NewBlog) -> Result<i64, DbError>;

    async fn get_blog(&self, index: i64) -> Result<BlogRecord, DbError>;

    async fn update_blog(&self, index: i64, subject: &str, text: &str) -> Result<(), DbError>;

    async fn delete_blog(&self, index: i64) -> Result<u64, DbError>;

    async fn get_blogs_for(
        &self,
        table_name: &str,
        keyvalue: i64,
        newest_first: bool,
    ) -> Result<Vec<BlogRecord>, DbError>;

    async fn count_blogs(&self) -> Result<i64, DbError>;

    // Advertiser operations
    async fn get_advertisers(
        &self,
        pattern: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Advertiser>, DbError>;

    async fn count_advertisers(&self, pattern: Option<&str>) -> Result<i64, DbError>;

    async fn get_advertiser(&self, name: &str) -> Result<Option<Advertiser>, DbError>;

    async fn create_advertiser(&self, name: &str, email: &str) -> Result<(), DbError>;

    async fn update_advertiser(
        &self,
        name: &str,
        new_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), DbError>;

    async fn delete_advertiser(&self, name: &str) -> Result<(), DbError>;

    async fn set_advertiser_copy(&self, name: &str, body: &str) -> Result<(), DbError>;

    // Video catalog operations
    async fn get_videos(
        &self,
        pattern: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Video>, DbError>;

    async fn count_videos(&self, pattern: Option<&str>) -> Result<i64, DbError>;

    async fn upsert_video(&self, video: &Video) -> Result<(), DbError>;

    async fn delete_video(&self, filename: &str, lang: &str) -> Result<(), DbError>;

    // Book catalog operations
    async fn get_books(
        &self,
        pattern: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Book>, DbError>;

    async fn count_books(&self, pattern: Option<&str>) -> Result<i64, DbError>;

    async fn upsert_book(&self, book: &Book) -> Result<(), DbError>;

    async fn delete_book(&self, isbn: &str) -> Result<(), DbError>;
}

// Enum to hold specific backend implementations
#[derive(Debug, Clone)]
pub enum DatabaseType {
    Postgres(postgres::PostgresBackend),
    Sqlite(sqlite::SqliteBackend),
}

// The main database struct that uses the enum pattern instead of trait objects
#[derive(Clone)]
pub struct Database {
    pub backend: DatabaseType,
}

macro_rules! delegate {
    ($self:ident, $backend:ident => $call:expr) => {
        match &$self.backend {
            DatabaseType::Postgres($backend) => $call,
            DatabaseType::Sqlite($backend) => $call,
        }
    };
}

impl Database {
    // Create a new database connection, auto-detecting the best backend
    pub async fn new(connection_string: &str) -> Result<Self, DbError> {
        if connection_string.starts_with("sqlite:") {
            let mut backend = sqlite::SqliteBackend::new();
            backend.init(connection_string).await?;
            Ok(Self {
                backend: DatabaseType::Sqlite(backend),
            })
        } else {
            let mut backend = postgres::PostgresBackend::new();
            match backend.init(connection_string).await {
                Ok(_) => Ok(Self {
                    backend: DatabaseType::Postgres(backend),
                }),
                Err(e) => {
                    // If PostgreSQL fails, try SQLite as fallback
                    log::warn!("PostgreSQL connection failed: {}. Falling back to SQLite.", e);
                    let mut sqlite_backend = sqlite::SqliteBackend::new();
                    sqlite_backend.init("sqlite:familytree.db").await?;
                    Ok(Self {
                        backend: DatabaseType::Sqlite(sqlite_backend),
                    })
                }
            }
        }
    }

    pub fn get_backend_type(&self) -> &str {
        match &self.backend {
            DatabaseType::Sqlite(_) => "SQLite",
            DatabaseType::Postgres(_) => "PostgreSQL",
        }
    }

    // User operations
    pub async fn create_user(&self, user: &NewUser) -> Result<i64, DbError> {
        delegate!(self, b => b.create_user(user).await)
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<UserRecord, DbError> {
        delegate!(self, b => b.get_user_by_id(id).await)
    }

    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DbError> {
        delegate!(self, b => b.find_user_by_username(username).await)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError> {
        delegate!(self, b => b.find_user_by_email(email).await)
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<(), DbError> {
        delegate!(self, b => b.update_user(id, update).await)
    }

    pub async fn set_password_hash(&self, id: i64, hash: &str) -> Result<(), DbError> {
        delegate!(self, b => b.set_password_hash(id, hash).await)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), DbError> {
        delegate!(self, b => b.delete_user(id).await)
    }

    pub async fn get_filtered_users(
        &self,
        filter: &UserFilter,
    ) -> Result<Vec<UserRecord>, DbError> {
        delegate!(self, b => b.get_filtered_users(filter).await)
    }

    pub async fn count_filtered_users(&self, filter: &UserFilter) -> Result<i64, DbError> {
        delegate!(self, b => b.count_filtered_users(filter).await)
    }

    pub async fn count_users(&self) -> Result<i64, DbError> {
        delegate!(self, b => b.count_users().await)
    }

    pub async fn get_admins(&self) -> Result<Vec<UserRecord>, DbError> {
        delegate!(self, b => b.get_admins().await)
    }

    // Session operations
    pub async fn create_session(&self, session: &SessionRecord) -> Result<(), DbError> {
        delegate!(self, b => b.create_session(session).await)
    }

    pub async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, DbError> {
        delegate!(self, b => b.get_session(id).await)
    }

    pub async fn delete_session(&self, id: &str) -> Result<(), DbError> {
        delegate!(self, b => b.delete_session(id).await)
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64, DbError> {
        delegate!(self, b => b.purge_expired_sessions().await)
    }

    // Message (blog) operations
    pub async fn add_blog(&self, blog: &NewBlog) -> Result<i64, DbError> {
        delegate!(self, b => b.add_blog(blog).await)
    }

    pub async fn get_blog(&self, index: i64) -> Result<BlogRecord, DbError> {
        delegate!(self, b => b.get_blog(index).await)
    }

    pub async fn update_blog(&self, index: i64, subject: &str, text: &str) -> Result<(), DbError> {
        delegate!(self, b => b.update_blog(index, subject, text).await)
    }

    pub async fn delete_blog(&self, index: i64) -> Result<u64, DbError> {
        delegate!(self, b => b.delete_blog(index).await)
    }

    pub async fn get_blogs_for(
        &self,
        table_name: &str,
        keyvalue: i64,
        newest_first: bool,
    ) -> Result<Vec<BlogRecord>, DbError> {
        delegate!(self, b => b.get_blogs_for(table_name, keyvalue, newest_first).await)
    }

    pub async fn count_blogs(&self) -> Result<i64, DbError> {
        delegate!(self, b => b.count_blogs().await)
    }

    // Advertiser operations
    pub async fn get_advertisers(
        &self,
        pattern: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Advertiser>, DbError> {
        delegate!(self, b => b.get_advertisers(pattern, offset, limit).await)
    }

    pub async fn count_advertisers(&self, pattern: Option<&str>) -> Result<i64, DbError> {
        delegate!(self, b => b.count_advertisers(pattern).await)
    }

    pub async fn get_advertiser(&self, name: &str) -> Result<Option<Advertiser>, DbError> {
        delegate!(self, b => b.get_advertiser(name).await)
    }

    pub async fn create_advertiser(&self, name: &str, email: &str) -> Result<(), DbError> {
        delegate!(self, b => b.create_advertiser(name, email).await)
    }

    pub async fn update_advertiser(
        &self,
        name: &str,
        new_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), DbError> {
        delegate!(self, b => b.update_advertiser(name, new_name, email).await)
    }

    pub async fn delete_advertiser(&self, name: &str) -> Result<(), DbError> {
        delegate!(self, b => b.delete_advertiser(name).await)
    }

    pub async fn set_advertiser_copy(&self, name: &str, body: &str) -> Result<(), DbError> {
        delegate!(self, b => b.set_advertiser_copy(name, body).await)
    }

    // Video catalog operations
    pub async fn get_videos(
        &self,
        pattern: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Video>, DbError> {
        delegate!(self, b => b.get_videos(pattern, offset, limit).await)
    }

    pub async fn count_videos(&self, pattern: Option<&str>) -> Result<i64, DbError> {
        delegate!(self, b => b.count_videos(pattern).await)
    }

    pub async fn upsert_video(&self, video: &Video) -> Result<(), DbError> {
        delegate!(self, b => b.upsert_video(video).await)
    }

    pub async fn delete_video(&self, filename: &str, lang: &str) -> Result<(), DbError> {
        delegate!(self, b => b.delete_video(filename, lang).await)
    }

    // Book catalog operations
    pub async fn get_books(
        &self,
        pattern: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Book>, DbError> {
        delegate!(self, b => b.get_books(pattern, offset, limit).await)
    }

    pub async fn count_books(&self, pattern: Option<&str>) -> Result<i64, DbError> {
        delegate!(self, b => b.count_books(pattern).await)
    }

    pub async fn upsert_book(&self, book: &Book) -> Result<(), DbError> {
        delegate!(self, b => b.upsert_book(book).await)
    }

    pub async fn delete_book(&self, isbn: &str) -> Result<(), DbError> {
        delegate!(self, b => b.delete_book(isbn).await)
    }
}

// Function to initialize the database
pub async fn init_db(db_url: &str) -> Result<Database, DbError> {
    Database::new(db_url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn test_db() -> Database {
        init_db("sqlite::memory:").await.expect("in-memory database")
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: email.to_string(),
            password_hash: None,
            auth: "pending".to_string(),
            options: UserRecord::OPT_USEMAIL_ON,
            confirm_id: Some("abcd1234".to_string()),
        }
    }

    #[tokio::test]
    async fn user_roundtrip() {
        let db = test_db().await;
        let id = db
            .create_user(&new_user("margaret", "margaret@example.com"))
            .await
            .unwrap();

        let user = db.get_user_by_id(id).await.unwrap();
        assert_eq!(user.username, "margaret");
        assert_eq!(user.auth, "pending");
        assert!(user.use_email());

        let found = db.find_user_by_username("margaret").await.unwrap();
        assert_eq!(found.unwrap().id, id);
        assert!(db.find_user_by_username("nobody").await.unwrap().is_none());

        let update = UserUpdate {
            auth: Some("blog,edit".to_string()),
            ..Default::default()
        };
        db.update_user(id, &update).await.unwrap();
        let user = db.get_user_by_id(id).await.unwrap();
        assert_eq!(user.auth, "blog,edit");
        // untouched columns keep their values
        assert_eq!(user.email, "margaret@example.com");

        db.delete_user(id).await.unwrap();
        assert!(matches!(
            db.get_user_by_id(id).await,
            Err(DbError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let db = test_db().await;
        db.create_user(&new_user("margaret", "m1@example.com"))
            .await
            .unwrap();
        let err = db
            .create_user(&new_user("margaret", "m2@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_) | DbError::SqlxError(_)));
    }

    #[tokio::test]
    async fn user_filters_and_counts() {
        let db = test_db().await;
        for (name, email, auth) in [
            ("margaret", "margaret@example.com", "blog,edit"),
            ("marmaduke", "duke@example.com", "pending"),
            ("webmaster", "root@example.com", "yes"),
        ] {
            let mut user = new_user(name, email);
            user.auth = auth.to_string();
            db.create_user(&user).await.unwrap();
        }

        let filter = UserFilter {
            username_pattern: Some("mar".to_string()),
            offset: 0,
            limit: 20,
            ..Default::default()
        };
        assert_eq!(db.count_filtered_users(&filter).await.unwrap(), 2);
        let page = db.get_filtered_users(&filter).await.unwrap();
        assert_eq!(page.len(), 2);

        let admins = db.get_admins().await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].username, "webmaster");
        assert_eq!(db.count_users().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn password_hash_replaces_legacy_digest() {
        let db = test_db().await;
        let id = db
            .create_user(&new_user("margaret", "margaret@example.com"))
            .await
            .unwrap();
        db.set_password_hash(id, "$argon2id$v=19$stub").await.unwrap();
        let user = db.get_user_by_id(id).await.unwrap();
        assert_eq!(user.password_hash.as_deref(), Some("$argon2id$v=19$stub"));
        assert!(user.sha_password.is_none());
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let db = test_db().await;
        let session = SessionRecord {
            id: "session-1".to_string(),
            username: "margaret".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            persistent: false,
        };
        db.create_session(&session).await.unwrap();
        assert!(db.get_session("session-1").await.unwrap().is_some());

        let stale = SessionRecord {
            id: "session-2".to_string(),
            username: "margaret".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
            persistent: true,
        };
        db.create_session(&stale).await.unwrap();
        let purged = db.purge_expired_sessions().await.unwrap();
        assert_eq!(purged, 1);
        assert!(db.get_session("session-2").await.unwrap().is_none());

        db.delete_session("session-1").await.unwrap();
        assert!(db.get_session("session-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blog_ordering_and_updates() {
        let db = test_db().await;
        let mut indexes = Vec::new();
        for n in 1..=3 {
            let blog = NewBlog {
                table_name: "Users".to_string(),
                keyvalue: 42,
                username: "margaret".to_string(),
                subject: format!("note {}", n),
                text: format!("body {}", n),
            };
            indexes.push(db.add_blog(&blog).await.unwrap());
        }

        // inbox order is newest first
        let inbox = db.get_blogs_for("Users", 42, true).await.unwrap();
        assert_eq!(inbox.len(), 3);
        assert_eq!(inbox[0].subject, "note 3");

        // thread order is oldest first
        let thread = db.get_blogs_for("Users", 42, false).await.unwrap();
        assert_eq!(thread[0].subject, "note 1");

        db.update_blog(indexes[0], "edited", "new body").await.unwrap();
        let blog = db.get_blog(indexes[0]).await.unwrap();
        assert_eq!(blog.subject, "edited");
        assert_eq!(blog.text, "new body");

        assert_eq!(db.delete_blog(indexes[1]).await.unwrap(), 1);
        assert_eq!(db.delete_blog(indexes[1]).await.unwrap(), 0);
        assert_eq!(db.count_blogs().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn advertiser_crud() {
        let db = test_db().await;
        db.create_advertiser("Acme Genealogy", "ads@acme.example")
            .await
            .unwrap();
        db.set_advertiser_copy("Acme Genealogy", "<p>Find your roots</p>")
            .await
            .unwrap();

        let ad = db.get_advertiser("Acme Genealogy").await.unwrap().unwrap();
        assert_eq!(ad.email, "ads@acme.example");
        assert_eq!(ad.ad_copy.as_deref(), Some("<p>Find your roots</p>"));
        assert_eq!(ad.monthly_clicks.len(), 12);

        db.update_advertiser("Acme Genealogy", None, Some("sales@acme.example"))
            .await
            .unwrap();
        let ad = db.get_advertiser("Acme Genealogy").await.unwrap().unwrap();
        assert_eq!(ad.email, "sales@acme.example");

        assert_eq!(db.count_advertisers(Some("acme")).await.unwrap(), 1);
        db.delete_advertiser("Acme Genealogy").await.unwrap();
        assert!(db.get_advertiser("Acme Genealogy").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn video_and_book_catalogs() {
        let db = test_db().await;
        let video = Video {
            filename: "Welcome.mp4".to_string(),
            lang: "en".to_string(),
            description: "Introductory tour".to_string(),
            display: true,
        };
        db.upsert_video(&video).await.unwrap();
        db.upsert_video(&Video {
            description: "Updated tour".to_string(),
            ..video.clone()
        })
        .await
        .unwrap();
        let videos = db.get_videos(Some("Welcome"), 0, 20).await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].description, "Updated tour");
        db.delete_video("Welcome.mp4", "en").await.unwrap();
        assert_eq!(db.count_videos(None).await.unwrap(), 0);

        let book = Book {
            isbn: "978-0-00-000000-2".to_string(),
            title: "Tracing Your Ontario Ancestors".to_string(),
        };
        db.upsert_book(&book).await.unwrap();
        assert_eq!(db.count_books(Some("Ontario")).await.unwrap(), 1);
        db.delete_book(&book.isbn).await.unwrap();
        assert_eq!(db.count_books(None).await.unwrap(), 0);
    }
}
