//! Bulk action envelopes exchanged between the list view and the bulk endpoints.
//!
//! # Design
//! - Requests travel as `application/x-www-form-urlencoded` bodies so the
//!   selected identifiers keep their order via indexed `field[i]` keys.
//! - The caller's list context is echoed verbatim in `currentSearchParams`.
//! - Responses are decoded leniently; an `error` member always wins over
//!   `success`.

use serde::{Deserialize, Serialize};
use shelf_core::BulkOperation;
use thiserror::Error;
use uuid::Uuid;

use crate::ItemSummary;

/// Default form field carrying the selected item identifiers.
pub const DEFAULT_ARRAY_FIELD: &str = "assetIds";
/// Form field echoing the list view's search/filter context.
pub const CURRENT_SEARCH_PARAMS_FIELD: &str = "currentSearchParams";
/// Path segment prefix shared by every bulk endpoint.
pub const BULK_ROUTE_PREFIX: &str = "bulk-update-";

const LOCATION_FIELD: &str = "locationId";
const CATEGORY_FIELD: &str = "categoryId";
const CUSTODIAN_FIELD: &str = "custodianId";
const TAGS_FIELD: &str = "tags";

/// Closed set of bulk actions offered on the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BulkActionKind {
    /// Move to a location.
    Location,
    /// Change category.
    Category,
    /// Assign custody to a team member.
    AssignCustody,
    /// Release custody.
    ReleaseCustody,
    /// Delete permanently.
    Trash,
    /// Mark active.
    Activate,
    /// Mark inactive.
    Deactivate,
    /// Archive.
    Archive,
    /// Attach tags.
    TagAdd,
    /// Detach tags.
    TagRemove,
    /// Cancel.
    Cancel,
}

impl BulkActionKind {
    /// Every kind in menu order.
    pub const ALL: [Self; 11] = [
        Self::Location,
        Self::Category,
        Self::AssignCustody,
        Self::ReleaseCustody,
        Self::Trash,
        Self::Activate,
        Self::Deactivate,
        Self::Archive,
        Self::TagAdd,
        Self::TagRemove,
        Self::Cancel,
    ];

    /// URL-safe identifier used in endpoint paths and metrics.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Category => "category",
            Self::AssignCustody => "assign-custody",
            Self::ReleaseCustody => "release-custody",
            Self::Trash => "trash",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Archive => "archive",
            Self::TagAdd => "tag-add",
            Self::TagRemove => "tag-remove",
            Self::Cancel => "cancel",
        }
    }

    /// Parse a slug produced by [`BulkActionKind::slug`].
    #[must_use]
    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == value)
    }

    /// Whether success removes the items from the working list entirely.
    #[must_use]
    pub const fn clears_selection(self) -> bool {
        matches!(self, Self::Trash | Self::Archive | Self::Cancel)
    }

    /// Conventional endpoint path for this kind.
    #[must_use]
    pub fn endpoint(self) -> String {
        format!("/api/assets/{BULK_ROUTE_PREFIX}{}", self.slug())
    }
}

/// Action-specific parameters carried alongside the selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BulkActionParams {
    /// Destination location for [`BulkActionKind::Location`].
    pub location_id: Option<Uuid>,
    /// Target category for [`BulkActionKind::Category`]; absent clears it.
    pub category_id: Option<Uuid>,
    /// Team member for [`BulkActionKind::AssignCustody`].
    pub custodian_id: Option<Uuid>,
    /// Tags for [`BulkActionKind::TagAdd`] and [`BulkActionKind::TagRemove`].
    pub tag_ids: Vec<Uuid>,
}

/// Failures decoding or interpreting a bulk form body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BulkFormError {
    /// No identifiers were submitted.
    #[error("no assets selected")]
    EmptySelection,
    /// An indexed id key had a non-numeric index.
    #[error("malformed index in field {field}")]
    MalformedIndex {
        /// Offending key.
        field: String,
    },
    /// An identifier was not a UUID.
    #[error("malformed identifier {value}")]
    MalformedId {
        /// Offending value.
        value: String,
    },
    /// A required action parameter was absent.
    #[error("missing {field}")]
    MissingParam {
        /// Parameter name.
        field: &'static str,
    },
    /// An action parameter could not be parsed.
    #[error("malformed {field}")]
    MalformedParam {
        /// Parameter name.
        field: &'static str,
    },
}

/// A bulk action submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionRequest {
    /// Action to apply.
    pub kind: BulkActionKind,
    /// Target identifiers in selection order.
    pub ids: Vec<Uuid>,
    /// Action-specific parameters.
    pub params: BulkActionParams,
    /// Serialized list context echoed back for redirection/re-query.
    pub current_search_params: String,
}

impl BulkActionRequest {
    /// Encode as ordered form pairs, writing ids under `array_field[i]`.
    #[must_use]
    pub fn to_form_pairs(&self, array_field: &str) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .ids
            .iter()
            .enumerate()
            .map(|(index, id)| (format!("{array_field}[{index}]"), id.to_string()))
            .collect();
        pairs.push((
            CURRENT_SEARCH_PARAMS_FIELD.to_string(),
            self.current_search_params.clone(),
        ));
        if let Some(id) = self.params.location_id {
            pairs.push((LOCATION_FIELD.to_string(), id.to_string()));
        }
        if let Some(id) = self.params.category_id {
            pairs.push((CATEGORY_FIELD.to_string(), id.to_string()));
        }
        if let Some(id) = self.params.custodian_id {
            pairs.push((CUSTODIAN_FIELD.to_string(), id.to_string()));
        }
        if !self.params.tag_ids.is_empty() {
            let joined = self
                .params
                .tag_ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push((TAGS_FIELD.to_string(), joined));
        }
        pairs
    }

    /// Decode form pairs produced by [`BulkActionRequest::to_form_pairs`].
    ///
    /// Identifiers are ordered by index and de-duplicated keeping the first
    /// occurrence. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BulkFormError`] when an index or identifier is malformed.
    pub fn from_form_pairs<I, K, V>(
        kind: BulkActionKind,
        array_field: &str,
        pairs: I,
    ) -> Result<Self, BulkFormError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut indexed: Vec<(usize, Uuid)> = Vec::new();
        let mut params = BulkActionParams::default();
        let mut current_search_params = String::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if let Some(index) = indexed_key(key, array_field)? {
                let id = Uuid::parse_str(value).map_err(|_| BulkFormError::MalformedId {
                    value: value.to_string(),
                })?;
                indexed.push((index, id));
                continue;
            }
            match key {
                CURRENT_SEARCH_PARAMS_FIELD => current_search_params = value.to_string(),
                LOCATION_FIELD => params.location_id = optional_uuid(value, LOCATION_FIELD)?,
                CATEGORY_FIELD => params.category_id = optional_uuid(value, CATEGORY_FIELD)?,
                CUSTODIAN_FIELD => params.custodian_id = optional_uuid(value, CUSTODIAN_FIELD)?,
                TAGS_FIELD => {
                    params.tag_ids = value
                        .split(',')
                        .map(str::trim)
                        .filter(|part| !part.is_empty())
                        .map(|part| {
                            Uuid::parse_str(part)
                                .map_err(|_| BulkFormError::MalformedParam { field: TAGS_FIELD })
                        })
                        .collect::<Result<_, _>>()?;
                }
                _ => {}
            }
        }

        indexed.sort_by_key(|(index, _)| *index);
        let mut ids: Vec<Uuid> = Vec::with_capacity(indexed.len());
        for (_, id) in indexed {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        Ok(Self {
            kind,
            ids,
            params,
            current_search_params,
        })
    }

    /// Translate into the domain mutation for this kind.
    ///
    /// # Errors
    ///
    /// Returns [`BulkFormError`] when the selection is empty or a required
    /// parameter is missing.
    pub fn to_operation(&self) -> Result<BulkOperation, BulkFormError> {
        if self.ids.is_empty() {
            return Err(BulkFormError::EmptySelection);
        }
        let operation = match self.kind {
            BulkActionKind::Location => BulkOperation::SetLocation {
                location_id: self.params.location_id.ok_or(BulkFormError::MissingParam {
                    field: LOCATION_FIELD,
                })?,
            },
            BulkActionKind::Category => BulkOperation::SetCategory {
                category_id: self.params.category_id,
            },
            BulkActionKind::AssignCustody => BulkOperation::AssignCustody {
                custodian_id: self.params.custodian_id.ok_or(BulkFormError::MissingParam {
                    field: CUSTODIAN_FIELD,
                })?,
            },
            BulkActionKind::ReleaseCustody => BulkOperation::ReleaseCustody,
            BulkActionKind::Trash => BulkOperation::Trash,
            BulkActionKind::Activate => BulkOperation::Activate,
            BulkActionKind::Deactivate => BulkOperation::Deactivate,
            BulkActionKind::Archive => BulkOperation::Archive,
            BulkActionKind::Cancel => BulkOperation::Cancel,
            BulkActionKind::TagAdd | BulkActionKind::TagRemove => {
                if self.params.tag_ids.is_empty() {
                    return Err(BulkFormError::MissingParam { field: TAGS_FIELD });
                }
                let tag_ids = self.params.tag_ids.clone();
                if self.kind == BulkActionKind::TagAdd {
                    BulkOperation::AddTags { tag_ids }
                } else {
                    BulkOperation::RemoveTags { tag_ids }
                }
            }
        };
        Ok(operation)
    }
}

fn indexed_key(key: &str, array_field: &str) -> Result<Option<usize>, BulkFormError> {
    let Some(rest) = key.strip_prefix(array_field) else {
        return Ok(None);
    };
    let Some(inner) = rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')) else {
        return Ok(None);
    };
    inner
        .parse::<usize>()
        .map(Some)
        .map_err(|_| BulkFormError::MalformedIndex {
            field: key.to_string(),
        })
}

fn optional_uuid(value: &str, field: &'static str) -> Result<Option<Uuid>, BulkFormError> {
    if value.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(value)
        .map(Some)
        .map_err(|_| BulkFormError::MalformedParam { field })
}

/// Message body of an error envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Human-readable message shown inline.
    pub message: String,
}

/// `{ "error": { "message": ... } }` body returned by form-style endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// Error payload.
    pub error: ErrorMessage,
}

impl ErrorEnvelope {
    /// Build an envelope from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorMessage {
                message: message.into(),
            },
        }
    }
}

/// Response body returned by bulk endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BulkActionResponse {
    /// Set when the action applied.
    #[serde(default)]
    pub success: bool,
    /// Set when the action failed; takes precedence over `success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorMessage>,
    /// Authoritative page after the action, when the server re-queried it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemSummary>>,
    /// Total matching items after the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
}

/// Interpreted bulk response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    /// The action applied.
    Success {
        /// Authoritative page, when present.
        items: Option<Vec<ItemSummary>>,
        /// Total matching items, when present.
        total_items: Option<u64>,
    },
    /// The action failed with a message for the dialog.
    Failure {
        /// Message to show inline.
        message: String,
    },
}

impl BulkActionResponse {
    /// Successful response carrying the authoritative page.
    #[must_use]
    pub const fn succeeded(items: Vec<ItemSummary>, total_items: u64) -> Self {
        Self {
            success: true,
            error: None,
            items: Some(items),
            total_items: Some(total_items),
        }
    }

    /// Interpret the body; an error member overrides `success`.
    #[must_use]
    pub fn outcome(self) -> BulkOutcome {
        if let Some(error) = self.error {
            return BulkOutcome::Failure {
                message: error.message,
            };
        }
        if self.success {
            BulkOutcome::Success {
                items: self.items,
                total_items: self.total_items,
            }
        } else {
            BulkOutcome::Failure {
                message: "Unexpected response from server".to_string(),
            }
        }
    }
}
