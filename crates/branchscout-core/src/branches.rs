use serde::{Deserialize, Serialize};

/// Fields read off a single rendered branch card, before provenance is attached.
///
/// Every field is independently optional: a card missing its divider row still
/// yields a name, status and rating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFields {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub rating_or_count: Option<String>,
}

/// One directory entry as written to the output files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Free-text open/closed marker.
    pub status: Option<String>,
    /// Leading numeric token of the card's summary fragment. The directory
    /// renders both star ratings and review counts in the same slot, so the
    /// value is kept as the raw token.
    pub rating_or_count: Option<String>,
    /// Display name of the catalog region selected when the card was read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Address of the result page the card was read from (paginated runs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

impl BranchRecord {
    #[must_use]
    pub fn for_region(fields: CardFields, region: &str) -> Self {
        Self::from_fields(fields, Some(region.to_string()), None)
    }

    #[must_use]
    pub fn for_page(fields: CardFields, page_url: &str) -> Self {
        Self::from_fields(fields, None, Some(page_url.to_string()))
    }

    fn from_fields(fields: CardFields, region: Option<String>, page_url: Option<String>) -> Self {
        let CardFields {
            name,
            phone,
            status,
            rating_or_count,
        } = fields;
        Self {
            name,
            phone,
            status,
            rating_or_count,
            region,
            page_url,
        }
    }

    /// The `(name, phone)` pair two records must share to be duplicates.
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            name: self.name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Deduplication key. Compared verbatim: two cards that both failed to yield a
/// name and phone share the `(None, None)` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub name: Option<String>,
    pub phone: Option<String>,
}
