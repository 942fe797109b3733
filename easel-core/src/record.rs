//! The artwork data model and its row codec.
//!
//! [`ArtworkRecord::to_row`] is sparse: only populated fields are emitted, so
//! that the store's defaults (on insert) or existing values (on update) apply
//! to everything else. [`ArtworkRecord::from_row`] ignores columns it does not
//! know and maps missing or `NULL` cells to `None`.

use serde::{Deserialize, Serialize};

use crate::error::RowError;
use crate::row::{Row, Value};
use crate::types::ArtworkId;

/// Column names recognized in a provider's artwork table.
pub mod columns {
    /// Store-assigned identity. INTEGER.
    pub const ID: &str = "_id";
    /// Unique, immutable token. Inserting an existing non-null token updates
    /// that row instead of adding one. TEXT.
    pub const TOKEN: &str = "token";
    pub const TITLE: &str = "title";
    pub const BYLINE: &str = "byline";
    pub const ATTRIBUTION: &str = "attribution";
    pub const PERSISTENT_URI: &str = "persistent_uri";
    pub const WEB_URI: &str = "web_uri";
    /// Provider-defined metadata. TEXT.
    pub const METADATA: &str = "metadata";
    /// Path reference to the artwork's bytes. Consumers must not assume they
    /// can open it directly. TEXT.
    pub const DATA: &str = "_data";
    /// Seconds since the epoch, set once on insert. INTEGER.
    pub const DATE_ADDED: &str = "date_added";
    /// Seconds since the epoch, bumped on every content change. INTEGER.
    pub const DATE_MODIFIED: &str = "date_modified";

    /// Every column a table row may carry.
    pub const ALL: [&str; 11] = [
        ID,
        TOKEN,
        TITLE,
        BYLINE,
        ATTRIBUTION,
        PERSISTENT_URI,
        WEB_URI,
        METADATA,
        DATA,
        DATE_ADDED,
        DATE_MODIFIED,
    ];

    /// Columns the store owns; caller-supplied values for these are ignored.
    pub const STORE_MANAGED: [&str; 3] = [ID, DATE_ADDED, DATE_MODIFIED];

    pub fn is_known(column: &str) -> bool {
        ALL.contains(&column)
    }

    pub fn is_store_managed(column: &str) -> bool {
        STORE_MANAGED.contains(&column)
    }
}

/// One row of a provider's artwork table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ArtworkId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<i64>,
}

impl ArtworkRecord {
    /// Decode a store row.
    ///
    /// Integer cells are accepted for text columns and numeric text for
    /// integer columns. Only an integer column holding unreadable text fails.
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            id: integer(row, columns::ID)?.map(ArtworkId),
            token: text(row, columns::TOKEN),
            title: text(row, columns::TITLE),
            byline: text(row, columns::BYLINE),
            attribution: text(row, columns::ATTRIBUTION),
            persistent_uri: text(row, columns::PERSISTENT_URI),
            web_uri: text(row, columns::WEB_URI),
            metadata: text(row, columns::METADATA),
            data: text(row, columns::DATA),
            date_added: integer(row, columns::DATE_ADDED)?,
            date_modified: integer(row, columns::DATE_MODIFIED)?,
        })
    }

    /// Encode the populated fields as a row.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        let mut put = |column: &str, value: Option<Value>| {
            if let Some(value) = value {
                row.insert(column, value);
            }
        };
        put(columns::ID, self.id.map(|id| Value::Integer(id.0)));
        put(columns::TOKEN, self.token.clone().map(Value::Text));
        put(columns::TITLE, self.title.clone().map(Value::Text));
        put(columns::BYLINE, self.byline.clone().map(Value::Text));
        put(columns::ATTRIBUTION, self.attribution.clone().map(Value::Text));
        put(columns::PERSISTENT_URI, self.persistent_uri.clone().map(Value::Text));
        put(columns::WEB_URI, self.web_uri.clone().map(Value::Text));
        put(columns::METADATA, self.metadata.clone().map(Value::Text));
        put(columns::DATA, self.data.clone().map(Value::Text));
        put(columns::DATE_ADDED, self.date_added.map(Value::Integer));
        put(columns::DATE_MODIFIED, self.date_modified.map(Value::Integer));
        row
    }

    /// Encode every caller-owned column, with `NULL` for unset fields.
    ///
    /// Used when the row must overwrite an existing row completely, such as
    /// a replace whose token already exists. Store-managed columns are left
    /// out.
    pub fn to_full_row(&self) -> Row {
        let mut row = self.to_row();
        row.retain(|column, _| !columns::is_store_managed(column));
        for column in columns::ALL {
            if !columns::is_store_managed(column) && !row.contains(column) {
                row.insert(column, Value::Null);
            }
        }
        row
    }

    /// Copy of this record without the store-assigned fields, i.e. the part a
    /// caller controls.
    pub fn content(&self) -> Self {
        Self {
            id: None,
            date_added: None,
            date_modified: None,
            ..self.clone()
        }
    }
}

fn text(row: &Row, column: &str) -> Option<String> {
    row.get(column)
        .and_then(Value::as_text)
        .map(|s| s.into_owned())
}

fn integer(row: &Row, column: &str) -> Result<Option<i64>, RowError> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Integer(n)) => Ok(Some(*n)),
        Some(Value::Text(s)) => s.trim().parse().map(Some).map_err(|_| RowError::Malformed {
            column: column.to_owned(),
            reason: format!("expected an integer, found {s:?}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
