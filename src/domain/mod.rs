//! Domain layer: provider-neutral value objects and the shared error type.

pub mod errors;
pub mod models;

pub use errors::DomainError;
pub use models::{
    Attachment, CreatedSpreadsheet, DocumentFormat, DriveFile, FileListQuery, FileOwner,
    MailMessage, MailThread, MessageRef, NewFile, Note, OutgoingMessage, SearchScope,
    TextInsertion, UpdatedCells, ValueInputOption, ValueRange, ValueRenderOption,
};
