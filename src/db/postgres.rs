// src/db/postgres.rs
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use super::{DatabaseBackend, DbError};
use crate::models::{
    Advertiser, BlogRecord, Book, NewBlog, NewUser, SessionRecord, UserFilter, UserRecord,
    UserUpdate, Video,
};

#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: Option<PgPool>,
}

impl PostgresBackend {
    pub fn new() -> Self {
        Self { pool: None }
    }

    // Helper to get the pool or return an error
    fn get_pool(&self) -> Result<&PgPool, DbError> {
        self.pool
            .as_ref()
            .ok_or(DbError::InitError("Database not initialized".into()))
    }
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

fn row_to_user(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        sha_password: row.get("sha_password"),
        auth: row.get("auth"),
        options: row.get("options"),
        confirm_id: row.get("confirm_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_blog(row: &PgRow) -> BlogRecord {
    BlogRecord {
        index: row.get("bl_index"),
        table_name: row.get("bl_table"),
        keyvalue: row.get("bl_keyvalue"),
        username: row.get("bl_username"),
        subject: row.get("bl_subject"),
        text: row.get("bl_text"),
        datetime: row.get("bl_datetime"),
    }
}

fn row_to_advertiser(row: &PgRow) -> Advertiser {
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

impl DatabaseBackend for PostgresBackend {
    async fn init(&mut self, connection_string: &str) -> Result<(), DbError> {
        log::info!("Initializing PostgreSQL database...");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        log::info!("Connected to PostgreSQL");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT,
                sha_password TEXT,
                auth TEXT NOT NULL DEFAULT 'pending',
                options BIGINT NOT NULL DEFAULT 0,
                confirm_id TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
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
                expires_at TIMESTAMPTZ NOT NULL,
                persistent BOOLEAN NOT NULL DEFAULT FALSE
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blogs (
                bl_index BIGSERIAL PRIMARY KEY,
                bl_table TEXT NOT NULL,
                bl_keyvalue BIGINT NOT NULL,
                bl_username TEXT NOT NULL,
                bl_subject TEXT NOT NULL DEFAULT '',
                bl_text TEXT NOT NULL,
                bl_datetime TIMESTAMPTZ NOT NULL DEFAULT NOW()
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
                count01 BIGINT NOT NULL DEFAULT 0,
                count02 BIGINT NOT NULL DEFAULT 0,
                count03 BIGINT NOT NULL DEFAULT 0,
                count04 BIGINT NOT NULL DEFAULT 0,
                count05 BIGINT NOT NULL DEFAULT 0,
                count06 BIGINT NOT NULL DEFAULT 0,
                count07 BIGINT NOT NULL DEFAULT 0,
                count08 BIGINT NOT NULL DEFAULT 0,
                count09 BIGINT NOT NULL DEFAULT 0,
                count10 BIGINT NOT NULL DEFAULT 0,
                count11 BIGINT NOT NULL DEFAULT 0,
                count12 BIGINT NOT NULL DEFAULT 0
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
                display BOOLEAN NOT NULL DEFAULT TRUE,
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
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, auth, options, confirm_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.auth)
        .bind(user.options)
        .bind(&user.confirm_id)
        .fetch_one(pool)
        .await
        .map_err(|e| map_insert_error(e, &user.username))?;

        Ok(row.get("id"))
    }

    async fn get_user_by_id(&self, id: i64) -> Result<UserRecord, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(DbError::NotFound)?;
        Ok(row_to_user(&row))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username   = COALESCE($1, username),
                email      = COALESCE($2, email),
                auth       = COALESCE($3, auth),
                options    = COALESCE($4, options),
                confirm_id = COALESCE($5, confirm_id),
                updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(&update.username)
        .bind(&update.email)
        .bind(&update.auth)
        .bind(update.options)
        .bind(&update.confirm_id)
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
            UPDATE users SET password_hash = $1, sha_password = NULL, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(hash)
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
        sqlx::query("DELETE FROM users WHERE id = $1")
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
            WHERE username ILIKE $1 AND auth ILIKE $2 AND email ILIKE $3
            ORDER BY username
            LIMIT $4 OFFSET $5
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

        Ok(rows.iter().map(row_to_user).collect())
    }

    async fn count_filtered_users(&self, filter: &UserFilter) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM users
            WHERE username ILIKE $1 AND auth ILIKE $2 AND email ILIKE $3
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
        Ok(rows.iter().map(row_to_user).collect())
    }

    async fn create_session(&self, session: &SessionRecord) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query(
            r#"
            INSERT INTO sessions (id, username, expires_at, persistent)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.id)
        .bind(&session.username)
        .bind(session.expires_at)
        .bind(session.persistent)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(
            "SELECT id, username, expires_at, persistent FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|row| SessionRecord {
            id: row.get("id"),
            username: row.get("username"),
            expires_at: row.get("expires_at"),
            persistent: row.get("persistent"),
        }))
    }

    async fn delete_session(&self, id: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> Result<u64, DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn add_blog(&self, blog: &NewBlog) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(
            r#"
            INSERT INTO blogs (bl_table, bl_keyvalue, bl_username, bl_subject, bl_text)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING bl_index
            "#,
        )
        .bind(&blog.table_name)
        .bind(blog.keyvalue)
        .bind(&blog.username)
        .bind(&blog.subject)
        .bind(&blog.text)
        .fetch_one(pool)
        .await?;
        Ok(row.get("bl_index"))
    }

    async fn get_blog(&self, index: i64) -> Result<BlogRecord, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM blogs WHERE bl_index = $1",
            BLOG_COLUMNS
        ))
        .bind(index)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;
        Ok(row_to_blog(&row))
    }

    async fn update_blog(&self, index: i64, subject: &str, text: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query(
            "UPDATE blogs SET bl_subject = $1, bl_text = $2 WHERE bl_index = $3",
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
        let result = sqlx::query("DELETE FROM blogs WHERE bl_index = $1")
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
            WHERE bl_table = $1 AND bl_keyvalue = $2
            ORDER BY bl_index {}
            "#,
            BLOG_COLUMNS, order
        ))
        .bind(table_name)
        .bind(keyvalue)
        .fetch_all(pool)
        .await?;
        Ok(rows.iter().map(row_to_blog).collect())
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
            WHERE adname ILIKE $1
            ORDER BY adname
            LIMIT $2 OFFSET $3
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
        let row = sqlx::query("SELECT COUNT(*) AS count FROM advertisers WHERE adname ILIKE $1")
            .bind(like(pattern))
            .fetch_one(pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn get_advertiser(&self, name: &str) -> Result<Option<Advertiser>, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM advertisers WHERE adname = $1",
            ADVERTISER_COLUMNS
        ))
        .bind(name)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| row_to_advertiser(&r)))
    }

    async fn create_advertiser(&self, name: &str, email: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query("INSERT INTO advertisers (adname, ademail) VALUES ($1, $2)")
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
                adname  = COALESCE($1, adname),
                ademail = COALESCE($2, ademail)
            WHERE adname = $3
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
        sqlx::query("DELETE FROM advertisers WHERE adname = $1")
            .bind(name)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn set_advertiser_copy(&self, name: &str, body: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        let result = sqlx::query("UPDATE advertisers SET adcopy = $1 WHERE adname = $2")
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
            WHERE filename ILIKE $1
            ORDER BY filename, lang
            LIMIT $2 OFFSET $3
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
                display: row.get("display"),
            })
            .collect())
    }

    async fn count_videos(&self, pattern: Option<&str>) -> Result<i64, DbError> {
        let pool = self.get_pool()?;
        let row = sqlx::query("SELECT COUNT(*) AS count FROM videos WHERE filename ILIKE $1")
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
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (filename, lang) DO UPDATE SET
                description = EXCLUDED.description,
                display     = EXCLUDED.display
            "#,
        )
        .bind(&video.filename)
        .bind(&video.lang)
        .bind(&video.description)
        .bind(video.display)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn delete_video(&self, filename: &str, lang: &str) -> Result<(), DbError> {
        let pool = self.get_pool()?;
        sqlx::query("DELETE FROM videos WHERE filename = $1 AND lang = $2")
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
            WHERE title ILIKE $1
            ORDER BY title
            LIMIT $2 OFFSET $3
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
        let row = sqlx::query("SELECT COUNT(*) AS count FROM books WHERE title ILIKE $1")
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
            VALUES ($1, $2)
            ON CONFLICT (isbn) DO UPDATE SET title = EXCLUDED.title
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
        sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(pool)
            .await?;
        Ok(())
    }
}
