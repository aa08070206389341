use serde::{Deserialize, Serialize};

use crate::caption::BoxRect;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct MemeRequest {
    pub(crate) meme: Option<String>,
    pub(crate) texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MemeSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) boxes: Vec<BoxRect>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}
