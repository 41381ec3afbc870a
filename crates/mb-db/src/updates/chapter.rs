//! Chapter update builder.

use mb_core::values::Address;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChapterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<Address>>,
}

impl ChapterUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none()
    }
}

#[derive(Default)]
pub struct ChapterUpdateBuilder(ChapterUpdate);

impl ChapterUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ChapterUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: Option<Address>) -> Self {
        self.0.address = Some(address);
        self
    }

    #[must_use]
    pub fn build(self) -> ChapterUpdate {
        self.0
    }
}
