use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotionError>;

#[derive(Error, Diagnostic, Debug)]
pub enum NotionError {
    #[error("Invalid Notion page id \"{input}\"")]
    #[diagnostic(
        code(inkstone_notion::invalid_page_id),
        help("Page ids are 32 hex characters, with or without dashes, or a Notion URL ending in one")
    )]
    InvalidPageId { input: String },

    #[error("Request to Notion failed during {operation}")]
    #[diagnostic(
        code(inkstone_notion::http_error),
        help("Check network connectivity and the configured base URL")
    )]
    Http {
        operation: String,
        #[source]
        cause: reqwest::Error,
    },

    #[error("Notion API rejected {operation}: {status} {message}")]
    #[diagnostic(
        code(inkstone_notion::api_error),
        help("Check the integration token, page sharing settings and rate limits")
    )]
    Api {
        operation: String,
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Failed to decode {data_type} response")]
    #[diagnostic(code(inkstone_notion::serialization_error))]
    Serialization {
        data_type: String,
        #[source]
        cause: serde_json::Error,
    },

    #[error("Configuration error for '{field}': {reason}")]
    #[diagnostic(
        code(inkstone_notion::configuration_error),
        help("Set the field in the TOML config or the matching environment variable")
    )]
    Configuration { field: String, reason: String },
}
