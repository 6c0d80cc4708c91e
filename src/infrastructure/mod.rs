//! Infrastructure layer wiring concrete provider adapters.

pub mod google;

pub use google::{
    FileTokenSource, GmailClient, GoogleClient, GoogleDocsClient, GoogleDriveClient,
    GoogleKeepClient, GoogleSheetsClient,
};
