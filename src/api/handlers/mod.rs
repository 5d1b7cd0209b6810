pub mod root;
pub mod auth;
pub mod users;
pub mod announcements;
pub mod responses;
pub mod notifications;
pub mod search;
pub mod files;

/// A file part lifted out of a multipart form.
pub(crate) struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
