// src/db/sqlite.rs
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;

use super::{DatabaseBackend, DbError};
use crate::models::{
    Advertiser, BlogRecord, Book, NewBlog, NewUser, SessionRecord, UserFilter, UserRecord,
    UserUpdate, Video,
};

#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: Option<SqlitePool>,
    connection_string: Option<String>,
}

impl SqliteBackend {
    pub fn new() -> Self {
        Self {
            pool: None,
            connection_string: None,
        }
    }

    // Helper to get the pool or return an error
    fn get_pool(&self) -> Result<&SqlitePool, DbError> {
        self.pool
            .as_ref()
            .ok_or(DbError::InitError("Database not initialized".into()))
    }

    pub fn get_db_path(&self) -> Option<String> {
        self.connection_string.as_ref().map(|conn_str| {
            if conn_str.starts_with("sqlite:") {
                conn_str[7..].to_string()
            } else {
                conn_str.clone()
            }
        })
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::SqlxError(format!("Invalid datetime: {}", e)))
}

fn like(pattern: Option<&str>) -> String {
    match pattern {
        Some(p) if !p.is_empty() => format!("%{}%", p),
        _ => "%".to_string(),
    }
}

fn map_insert_error(error: sqlx::Error, what: &str) -> DbError {
    if let Some(db_err) = error.as_database_error() {
        if db_err.is_unique_violation() {
            return DbError::Duplicate(what.to_string());
        }
    }
    error.into()
}

fn row_to_user(row: &SqliteRow) -> Result<UserRecord, DbError> {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        sha_password: row.get("sha_password"),
        auth: row.get("auth"),
        options: row.get("options"),
        confirm_id: row.get("confirm_id"),
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

fn row_to_blog(row: &SqliteRow) -> Result<BlogRecord, DbError> {
    let datetime: String = row.get("bl_datetime");
    Ok(BlogRecord {
        index: row.get("bl_index"),
        table_name: row.get("bl_table"),
        keyvalue: row.get("bl_keyvalue"),
        username: row.get("bl_username"),
        subject: row.get("bl_subject"),
        text: row.get("bl_text"),
        datetime: parse_datetime(&datetime)?,
    })
}

fn row_to_advertiser(row: &SqliteRow) -> Advertiser {
    let monthly_clicks = (1..=12)
        .map(|m| row.get::<i64, _>(format!("count{:02}", m).as_str()))
        .collect();
    Advertiser {
        name: row.get("adname"),
        email: row.get("ademail"),
        ad_copy: row.get("adcopy"),
        monthly_clicks,
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, sha_password, auth, options, confirm_id, \
     created_at, updated_at";

const BLOG_COLUMNS: &str =
    "bl_index, bl_table, bl_keyvalue, bl_username, bl_subject, bl_text, bl_datetime";

const ADVERTISER_COLUMNS: &str =
    "adname, ademail, adcopy, count01, count02, count03, count04, count05, count06, \
     count07, count08, count09, count10, count11, count12";

impl DatabaseBackend for SqliteBackend {
    async fn init(&mut self, connection_string: &str) -> Result<(), DbError> {
        self.connection_string = Some(connection_string.to_string());

        let db_path = if connection_string.starts_with("sqlite:") {
            &connection_string[7..]
        } else {
            return Err(DbError::ConfigError("Invalid SQLite connection string".into()));
        };

        let in_memory = db_path == ":memory:";
        if !in_memory {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DbError::InitError(format!("Failed to create database directory: {}", e))
                    })?;
                }
            }
        }

        log::info!("Initializing SQLite database at: {}", db_path);

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))
            .map_err(|e| DbError::ConfigError(e.to_string()))?
            .create_if_missing(true);

        // every connection to :memory: is a separate database, so the
        // pool must not open more than one
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::query("PRAGMA foreign_keys = ON;").execute(&pool).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT,
                sha_password TEXT,
                auth TEXT NOT NULL DEFAULT 'pending',
                options INTEGER NOT NULL DEFAULT 0,
                confirm_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                persistent INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blogs (
                bl_index INTEGER PRIMARY KEY AUTOINCREMENT,
                bl_table TEXT NOT NULL,
                bl_keyvalue INTEGER NOT NULL,
                bl_username TEXT NOT NULL,
                bl_subject TEXT NOT NULL DEFAULT '',
                bl_text TEXT NOT NULL,
                bl_datetime TEXT NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_blogs_target ON blogs(bl_table, bl_keyvalue);",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS advertisers (
                adname TEXT PRIMARY KEY,
                ademail TEXT NOT NULL,
                adcopy TEXT,
                count01 INTEGER NOT NULL DEFAULT 0,
                count02 INTEGER NOT NULL DEFAULT 0,
                count03 INTEGER NOT NULL DEFAULT 0,
                count04 INTEGER NOT NULL DEFAULT 0,
                count05 INTEGER NOT NULL DEFAULT 0,
                count06 INTEGER NOT NULL DEFAULT 0,
                count07 INTEGER NOT NULL DEFAULT 0,
                count08 INTEGER NOT NULL DEFAULT 0,
                count09 INTEGER NOT NULL DEFAULT 0,
                count10 INTEGER NOT NULL DEFAULT 0,
                count11 INTEGER NOT NULL DEFAULT 0,
                count12 INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS videos (
                filename TEXT NOT NULL,
                lang TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                display INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (filename, lang)
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                isbn TEXT PRIMARY KEY,
                title TEXT NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        self.pool = Some(pool);
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, auth, options, confirm_id,
                               created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.auth)
        .bind(user.options)
        .bind(&user.confirm_id)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .map_err(|e| map_insert_error(e, &user.username))?;

        Ok(result.last_insert_rowid())
    }

    async fn get_user_by_id(&self, id: i64) -> Result<UserRecord, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(DbError::NotFound)?;
        row_to_user(&row)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username   = COALESCE(?, username),
                email      = COALESCE(?, email),
                auth       = COALESCE(?, auth),
                options    = COALESCE(?, options),
                confirm_id = COALESCE(?, confirm_id),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.username)
        .bind(&update.email)
        .bind(&update.auth)
        .bind(update.options)
        .bind(&update.confirm_id)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| map_insert_error(e, "user update"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: i64, hash: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = ?, sha_password = NULL, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(hash)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn get_filtered_users(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, DbError> {
        let pool = self.get_pool()?;
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM users
            WHERE username LIKE ? AND auth LIKE ? AND email LIKE ?
            ORDER BY username
            LIMIT ? OFFSET ?
            "#,
            USER_COLUMNS
        ))
        .bind(like(filter.username_pattern.as_deref()))
        .bind(like(filter.auth_pattern.as_deref()))
        .bind(like(filter.email_pattern.as_deref()))
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;

        rows.iter().map(row_to_user).collect()
    }

    async fn count_filtered_users(&self, filter: &UserFilter) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM users
            WHERE username LIKE ? AND auth LIKE ? AND email LIKE ?
            "#,
        )
        .bind(like(filter.username_pattern.as_deref()))
        .bind(like(filter.auth_pattern.as_deref()))
        .bind(like(filter.email_pattern.as_deref()))
        .fetch_one(pool)
        .await?;
        Ok(row.get("count"))
    }

    async fn count_users(&self) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
            .fetch_one(pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn get_admins(&self) -> Result<Vec<UserRecord>, DbError> {
        let pool = self.get_pool()?;
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE auth LIKE '%yes%' ORDER BY username",
            USER_COLUMNS
        ))
        .fetch_all(pool)
        .await?;
        rows.iter().map(row_to_user).collect()
    }

    async fn create_session(&self, session: &SessionRecord) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query(
            r#"
            INSERT INTO sessions (id, username, expires_at, persistent)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.username)
        .bind(session.expires_at.to_rfc3339())
        .bind(session.persistent as i64)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(
            "SELECT id, username, expires_at, persistent FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => {
                let expires_at: String = row.get("expires_at");
                Ok(Some(SessionRecord {
                    id: row.get("id"),
                    username: row.get("username"),
                    expires_at: parse_datetime(&expires_at)?,
                    persistent: row.get::<i64, _>("persistent") != 0,
                }))
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, id: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> Result<u64, DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now().to_rfc3339())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn add_blog(&self, blog: &NewBlog) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query(
            r#"
            INSERT INTO blogs (bl_table, bl_keyvalue, bl_username, bl_subject, bl_text,
                               bl_datetime)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&blog.table_name)
        .bind(blog.keyvalue)
        .bind(&blog.username)
        .bind(&blog.subject)
        .bind(&blog.text)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get_blog(&self, index: i64) -> Result<BlogRecord, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM blogs WHERE bl_index = ?",
            BLOG_COLUMNS
        ))
        .bind(index)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;
        row_to_blog(&row)
    }

    async fn update_blog(&self, index: i64, subject: &str, text: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query(
            "UPDATE blogs SET bl_subject = ?, bl_text = ? WHERE bl_index = ?",
        )
        .bind(subject)
        .bind(text)
        .bind(index)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn delete_blog(&self, index: i64) -> Result<u64, DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query("DELETE FROM blogs WHERE bl_index = ?")
            .bind(index)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_blogs_for(
        &self,
        table_name: &str,
        keyvalue: i64,
        newest_first: bool,
    ) -> Result<Vec<BlogRecord>, DbError> {
        let pool = self.get_pool()?;
        let order = if newest_first { "DESC" } else { "ASC" };
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM blogs
            WHERE bl_table = ? AND bl_keyvalue = ?
            ORDER BY bl_index {}
            "#,
            BLOG_COLUMNS, order
        ))
        .bind(table_name)
        .bind(keyvalue)
        .fetch_all(pool)
        .await?;
        rows.iter().map(row_to_blog).collect()
    }

    async fn count_blogs(&self) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query("SELECT COUNT(*) AS count FROM blogs")
            .fetch_one(pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn get_advertisers(
        &self,
        pattern: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Advertiser>, DbError> {
        let pool = self.get_pool()?;
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM advertisers
            WHERE adname LIKE ?
            ORDER BY adname
            LIMIT ? OFFSET ?
            "#,
            ADVERTISER_COLUMNS
        ))
        .bind(like(pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(rows.iter().map(row_to_advertiser).collect())
    }

    async fn count_advertisers(&self, pattern: Option<&str>) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query("SELECT COUNT(*) AS count FROM advertisers WHERE adname LIKE ?")
            .bind(like(pattern))
            .fetch_one(pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn get_advertiser(&self, name: &str) -> Result<Option<Advertiser>, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM advertisers WHERE adname = ?",
            ADVERTISER_COLUMNS
        ))
        .bind(name)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| row_to_advertiser(&r)))
    }

    async fn create_advertiser(&self, name: &str, email: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query("INSERT INTO advertisers (adname, ademail) VALUES (?, ?)")
            .bind(name)
            .bind(email)
            .execute(pool)
            .await
            .map_err(|e| map_insert_error(e, name))?;
        Ok(())
    }

    async fn update_advertiser(
        &self,
        name: &str,
        new_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query(
            r#"
            UPDATE advertisers SET
                adname  = COALESCE(?, adname),
                ademail = COALESCE(?, ademail)
            WHERE adname = ?
            "#,
        )
        .bind(new_name)
        .bind(email)
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| map_insert_error(e, name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn delete_advertiser(&self, name: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query("DELETE FROM advertisers WHERE adname = ?")
            .bind(name)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn set_advertiser_copy(&self, name: &str, body: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query("UPDATE advertisers SET adcopy = ? WHERE adname = ?")
            .bind(body)
            .bind(name)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn get_videos(
        &self,
        pattern: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Video>, DbError> {
        let pool = self.get_pool()?;
        let rows = sqlx::query(
            r#"
            SELECT filename, lang, description, display FROM videos
            WHERE filename LIKE ?
            ORDER BY filename, lang
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(like(pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Video {
                filename: row.get("filename"),
                lang: row.get("lang"),
                description: row.get("description"),
                display: row.get::<i64, _>("display") != 0,
            })
            .collect())
    }

    async fn count_videos(&self, pattern: Option<&str>) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query("SELECT COUNT(*) AS count FROM videos WHERE filename LIKE ?")
            .bind(like(pattern))
            .fetch_one(pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn upsert_video(&self, video: &Video) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query(
            r#"
            INSERT INTO videos (filename, lang, description, display)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(filename, lang) DO UPDATE SET
                description = excluded.description,
                display     = excluded.display
            "#,
        )
        .bind(&video.filename)
        .bind(&video.lang)
        .bind(&video.description)
        .bind(video.display as i64)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn delete_video(&self, filename: &str, lang: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query("DELETE FROM videos WHERE filename = ? AND lang = ?")
            .bind(filename)
            .bind(lang)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn get_books(
        &self,
        pattern: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Book>, DbError> {
        let pool = self.get_pool()?;
        let rows = sqlx::query(
            r#"
            SELECT isbn, title FROM books
            WHERE title LIKE ?
            ORDER BY title
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(like(pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Book {
                isbn: row.get("isbn"),
                title: row.get("title"),
            })
            .collect())
    }

    async fn count_books(&self, pattern: Option<&str>) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query("SELECT COUNT(*) AS count FROM books WHERE title LIKE ?")
            .bind(like(pattern))
            .fetch_one(pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn upsert_book(&self, book: &Book) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query(
            r#"
            INSERT INTO books (isbn, title)
            VALUES (?, ?)
            ON CONFLICT(isbn) DO UPDATE SET title = excluded.title
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn delete_book(&self, isbn: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(pool)
            .await?;
        Ok(())
    }
}
