use serde::{Deserialize, Serialize};

/// Body of the request for a persisted value's blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchInitialRequest {
    pub value: serde_json::Value,
    pub repeater_name: String,
}

/// Body of the request for new blank blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchNewRequest {
    pub repeater_name: String,
    pub blocks: usize,
    pub num: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    pub results: Vec<RawContent>,
}

/// One block's content as sent by the server: markup pieces in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawContent(pub Vec<String>);

impl RawContent {
    /// The block content: every piece concatenated, nothing merged or dropped.
    pub fn concat(&self) -> String {
        self.0.concat()
    }
}

impl From<&str> for RawContent {
    fn from(piece: &str) -> Self {
        Self(vec![piece.to_string()])
    }
}

impl From<Vec<String>> for RawContent {
    fn from(pieces: Vec<String>) -> Self {
        Self(pieces)
    }
}
