use serde::{Deserialize, Serialize};

use crate::errors::QuoteLinkError;

/// Data carried by a record whose remote result has not arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Temporary token (`tmp-` prefixed)
    pub id: String,
    pub quote: String,
    pub original_url: String,
}

/// A finalized quote link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteRecord {
    /// Remote-issued identifier
    pub id: String,
    pub quote: String,
    pub original_url: String,
    pub preview_image_url: String,
    /// Unix time in milliseconds, stamped at finalization
    pub created_at: i64,
}

/// QuoteLinkRecord - one entry of the ledger
///
/// The lifecycle state is the variant. The persisted form encodes it by
/// field presence (`status` tag while transient, preview image and
/// timestamp once complete); that encoding is confined to
/// `StoredQuoteLink` and never inspected elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredQuoteLink", into = "StoredQuoteLink")]
pub enum QuoteLinkRecord {
    Pending(Placeholder),
    Failed(Placeholder),
    Complete(CompleteRecord),
}

impl QuoteLinkRecord {
    /// Build a pending placeholder
    pub fn pending(
        id: impl Into<String>,
        quote: impl Into<String>,
        original_url: impl Into<String>,
    ) -> Self {
        QuoteLinkRecord::Pending(Placeholder {
            id: id.into(),
            quote: quote.into(),
            original_url: original_url.into(),
        })
    }

    /// Build a complete record
    pub fn complete(
        id: impl Into<String>,
        quote: impl Into<String>,
        original_url: impl Into<String>,
        preview_image_url: impl Into<String>,
        created_at: i64,
    ) -> Self {
        QuoteLinkRecord::Complete(CompleteRecord {
            id: id.into(),
            quote: quote.into(),
            original_url: original_url.into(),
            preview_image_url: preview_image_url.into(),
            created_at,
        })
    }

    pub fn id(&self) -> &str {
        match self {
            QuoteLinkRecord::Pending(p) | QuoteLinkRecord::Failed(p) => &p.id,
            QuoteLinkRecord::Complete(c) => &c.id,
        }
    }

    pub fn quote(&self) -> &str {
        match self {
            QuoteLinkRecord::Pending(p) | QuoteLinkRecord::Failed(p) => &p.quote,
            QuoteLinkRecord::Complete(c) => &c.quote,
        }
    }

    pub fn original_url(&self) -> &str {
        match self {
            QuoteLinkRecord::Pending(p) | QuoteLinkRecord::Failed(p) => &p.original_url,
            QuoteLinkRecord::Complete(c) => &c.original_url,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, QuoteLinkRecord::Pending(_))
    }

    pub fn as_complete(&self) -> Option<&CompleteRecord> {
        match self {
            QuoteLinkRecord::Complete(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoredStatus {
    Pending,
    Failed,
}

/// Persisted JSON shape of a record
///
/// `ogpImageUrl` is accepted on read for ledgers written before the field
/// was renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredQuoteLink {
    id: String,
    quote: String,
    original_url: String,
    #[serde(default, alias = "ogpImageUrl", skip_serializing_if = "Option::is_none")]
    preview_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<StoredStatus>,
}

impl TryFrom<StoredQuoteLink> for QuoteLinkRecord {
    type Error = QuoteLinkError;

    fn try_from(stored: StoredQuoteLink) -> Result<Self, Self::Error> {
        let placeholder = |s: StoredQuoteLink| Placeholder {
            id: s.id,
            quote: s.quote,
            original_url: s.original_url,
        };

        match stored.status {
            Some(StoredStatus::Pending) => Ok(QuoteLinkRecord::Pending(placeholder(stored))),
            Some(StoredStatus::Failed) => Ok(QuoteLinkRecord::Failed(placeholder(stored))),
            None => match (stored.preview_image_url, stored.created_at) {
                (Some(preview_image_url), Some(created_at)) => {
                    Ok(QuoteLinkRecord::Complete(CompleteRecord {
                        id: stored.id,
                        quote: stored.quote,
                        original_url: stored.original_url,
                        preview_image_url,
                        created_at,
                    }))
                }
                _ => Err(QuoteLinkError::InvalidRecord {
                    id: stored.id,
                    reason: "record has no status and is missing previewImageUrl or createdAt"
                        .to_string(),
                }),
            },
        }
    }
}

impl From<QuoteLinkRecord> for StoredQuoteLink {
    fn from(record: QuoteLinkRecord) -> Self {
        let transient = |p: Placeholder, status: StoredStatus| StoredQuoteLink {
            id: p.id,
            quote: p.quote,
            original_url: p.original_url,
            preview_image_url: None,
            created_at: None,
            status: Some(status),
        };

        match record {
            QuoteLinkRecord::Pending(p) => transient(p, StoredStatus::Pending),
            QuoteLinkRecord::Failed(p) => transient(p, StoredStatus::Failed),
            QuoteLinkRecord::Complete(c) => StoredQuoteLink {
                id: c.id,
                quote: c.quote,
                original_url: c.original_url,
                preview_image_url: Some(c.preview_image_url),
                created_at: Some(c.created_at),
                status: None,
            },
        }
    }
}
