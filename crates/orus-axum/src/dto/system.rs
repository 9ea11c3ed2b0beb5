//! System information DTO.

use serde::Serialize;

pub const SYSTEM_NAME: &str = "Orus";
pub const SYSTEM_DESCRIPTION: &str = "Orus is a server for the Orus library";
pub const SYSTEM_AUTHOR: &str = "Dsouza10082";
pub const SYSTEM_AUTHOR_URL: &str = "https://github.com/Dsouza10082";

/// Static gateway metadata for `GET /system-info`.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfoDto {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    pub author_url: &'static str,
    /// Model ids accepted by `POST /embed-text`.
    pub embedding_models: Vec<&'static str>,
}

impl SystemInfoDto {
    pub fn new(embedding_models: Vec<&'static str>) -> Self {
        Self {
            name: SYSTEM_NAME,
            version: env!("CARGO_PKG_VERSION"),
            description: SYSTEM_DESCRIPTION,
            author: SYSTEM_AUTHOR,
            author_url: SYSTEM_AUTHOR_URL,
            embedding_models,
        }
    }
}
