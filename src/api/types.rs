// src/api/types.rs
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::core::strength::StrengthCategory;
use crate::messages::thread::RenderedPost;
use crate::models::{Book, Video};
use crate::utils::DateDisplay;

// Authentication requests and responses
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SignonRequest {
    /// Account user name
    pub userid: String,
    /// Account password
    pub password: String,
    /// Also issue a 7-day persistence token
    pub remember: Option<bool>,
    /// Preferred language code
    pub lang: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// JWT token for authenticated requests (only present on success)
    pub token: Option<String>,
    /// Persistence token (only when `remember` was requested)
    pub persistence_token: Option<String>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResumeRequest {
    /// Persistence token issued at a previous signon
    pub token: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Whether the caller is signed on
    pub authenticated: bool,
    /// The signed-on user name, when authenticated
    pub username: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Success message (only present on success)
    pub message: Option<String>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

impl SuccessResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Requested user name (6-63 characters, no `< > @ &`)
    pub userid: String,
    /// Password
    pub password: String,
    /// Password repeated
    pub password2: String,
    /// E-mail address; defaults to the user name when it contains `@`
    pub email: Option<String>,
    /// Receive e-mail notifications
    pub usemail: Option<bool>,
    /// Suppress popup help
    pub nohelp: Option<bool>,
    /// Preferred language code
    pub lang: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// Whether the account was created
    pub success: bool,
    /// An account under this e-mail and user name already exists
    pub already_registered: bool,
    /// Field-by-field validation messages
    pub messages: Vec<String>,
    /// Error message (only present on infrastructure failure)
    pub error: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct ConfirmQuery {
    /// Numeric account id from the confirmation e-mail
    pub id: i64,
    /// Account user name
    pub userid: String,
    /// Confirmation id from the confirmation e-mail
    pub confirmid: String,
    /// Preferred language code
    pub lang: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    /// Account user name; one of userid/email is required
    pub userid: Option<String>,
    /// Account e-mail address
    pub email: Option<String>,
    /// Preferred language code
    pub lang: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    /// Account user name; one of userid/email is required
    pub userid: Option<String>,
    /// Account e-mail address
    pub email: Option<String>,
    /// Authorization code from the reset e-mail
    pub validate: String,
}

#[derive(Deserialize, IntoParams)]
pub struct StrengthQuery {
    /// Candidate password
    pub password: String,
    /// Threshold preset: `account` or `register` (default)
    pub preset: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StrengthResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Numeric strength score
    pub score: u32,
    /// Indicator category; show this one, hide the other three
    pub category: StrengthCategory,
}

// Account management
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    /// Whether the operation was successful
    pub success: bool,
    pub userid: String,
    pub email: String,
    /// Receive e-mail notifications
    pub usemail: bool,
    /// Suppress popup help
    pub nohelp: bool,
    pub auth: String,
    /// Messages addressed to this account, newest first
    pub messages: Vec<MessageEntry>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AccountUpdateRequest {
    /// Current password; required for any change
    pub password: String,
    /// New password, twice, to change it
    pub newpassword: Option<String>,
    pub newpassword2: Option<String>,
    /// New e-mail address
    pub email: Option<String>,
    /// Receive e-mail notifications
    pub usemail: Option<bool>,
    /// Suppress popup help
    pub nohelp: Option<bool>,
    /// Present only when a form tries to change the user name, which
    /// is not permitted
    pub userid: Option<String>,
}

// Messages
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageEntry {
    pub index: i64,
    /// Sender user name
    pub username: String,
    pub subject: String,
    pub text: String,
    /// Table the message is attached to
    pub table: String,
    /// Key of the record the message is attached to
    pub keyvalue: i64,
    pub posted: DateDisplay,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageListResponse {
    /// Whether the operation was successful
    pub success: bool,
    pub messages: Vec<MessageEntry>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PostBlogRequest {
    /// Target table name or key alias (`Users`, `tblIR`, `idir`, ...)
    pub table: Option<String>,
    /// Comma-separated record keys to post against
    pub key: String,
    /// Message subject; defaults to the first line of the message
    pub subject: Option<String>,
    /// Message text
    pub message: String,
    /// Sender e-mail, required when not signed on
    pub email: Option<String>,
    /// Update the identified message instead of posting a reply to it
    pub update: Option<bool>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PostBlogResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Number of records the message was posted against
    pub posted: usize,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ReplyBlogRequest {
    /// Reply text
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DeleteBlogResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Number of messages removed
    pub deleted: u64,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ThreadResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// The thread in display order with per-level indentation
    pub posts: Vec<RenderedPost>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

// Administrator user management
#[derive(Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Substring match on user name
    pub pattern: Option<String>,
    /// Substring match on authorization string
    pub authpattern: Option<String>,
    /// Substring match on e-mail address
    pub mailpattern: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UserEntry {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub auth: String,
    pub usemail: bool,
    pub nohelp: bool,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// Whether the operation was successful
    pub success: bool,
    pub users: Vec<UserEntry>,
    /// Total matches, ignoring paging
    pub count: i64,
    pub offset: i64,
    pub limit: i64,
    /// Administrators, addressed openly in bulk mailings
    pub tolist: Vec<String>,
    /// Everyone else, blind-copied in bulk mailings
    pub bcclist: Vec<String>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AdminUserUpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub auth: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BulkMailRequest {
    pub subject: String,
    /// HTML message body
    pub body: String,
    /// Substring match on user name
    pub pattern: Option<String>,
    /// Substring match on authorization string
    pub authpattern: Option<String>,
    /// Substring match on e-mail address
    pub mailpattern: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BulkMailResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Administrators addressed openly
    pub to_count: usize,
    /// Recipients blind-copied
    pub bcc_count: usize,
    /// Whether the message was handed to the mail relay
    pub sent: bool,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

// Catalog listings (advertisers, videos, books)
#[derive(Deserialize, IntoParams)]
pub struct CatalogQuery {
    /// Substring match on the catalog's name column
    pub pattern: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AdvertiserEntry {
    pub name: String,
    pub email: String,
    /// Whether advertisement copy has been uploaded
    pub has_ad_copy: bool,
    /// Click counts for January through December
    pub monthly_clicks: Vec<i64>,
    /// Clicks for the year to date
    pub total_clicks: i64,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AdvertiserListResponse {
    /// Whether the operation was successful
    pub success: bool,
    pub advertisers: Vec<AdvertiserEntry>,
    /// Total matches, ignoring paging
    pub count: i64,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AdvertiserResponse {
    /// Whether the operation was successful
    pub success: bool,
    pub advertiser: Option<AdvertiserEntry>,
    /// Uploaded advertisement copy
    pub ad_copy: Option<String>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AdvertiserCreateRequest {
    pub name: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AdvertiserUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct VideoListResponse {
    /// Whether the operation was successful
    pub success: bool,
    pub videos: Vec<Video>,
    /// Total matches, ignoring paging
    pub count: i64,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct VideoDeleteQuery {
    pub filename: String,
    pub lang: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct VideoUpsertRequest {
    pub filename: String,
    /// Language code of this description
    pub lang: String,
    pub description: Option<String>,
    /// Whether the video is shown on the site
    pub display: Option<bool>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BookListResponse {
    /// Whether the operation was successful
    pub success: bool,
    pub books: Vec<Book>,
    /// Total matches, ignoring paging
    pub count: i64,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BookUpsertRequest {
    pub isbn: String,
    pub title: String,
}

// System status and logs
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SystemStatusResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Database backend in use
    pub backend: String,
    /// Registered accounts
    pub users: i64,
    /// Stored messages
    pub messages: i64,
    pub total_memory_kb: u64,
    pub used_memory_kb: u64,
    pub uptime_secs: u64,
    /// Error message (only present on failure)
    pub error: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct LogQuery {
    /// Minimum level: Debug, Info, Warning, Error
    pub level: Option<String>,
    pub component: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LogListResponse {
    /// Whether the operation was successful
    pub success: bool,
    pub entries: Vec<crate::logging::LogEntry>,
    /// Error message (only present on failure)
    pub error: Option<String>,
}
