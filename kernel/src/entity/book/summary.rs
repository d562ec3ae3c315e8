use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookSummary(String);

impl BookSummary {
    pub fn new(summary: impl Into<String>) -> Self {
        Self(summary.into())
    }

    pub fn parse(summary: Option<String>) -> Option<Self> {
        summary.filter(|summary| !summary.trim().is_empty()).map(Self)
    }
}
