//! Typed selections and queries over an artwork table.

use easel_core::{columns, ArtworkId, Row, Value};

/// Row predicate for queries, updates and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Id(ArtworkId),
    /// Every row except `_id = id`.
    IdNot(ArtworkId),
    Token(String),
}

impl Selection {
    pub fn matches(&self, id: ArtworkId, row: &Row) -> bool {
        match self {
            Selection::All => true,
            Selection::Id(want) => id == *want,
            Selection::IdNot(keep) => id != *keep,
            Selection::Token(token) => row
                .get(columns::TOKEN)
                .and_then(Value::as_text)
                .is_some_and(|t| t == token.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    IdAscending,
    /// Most recently added first.
    IdDescending,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    /// Columns to return; `None` returns every column.
    pub projection: Option<Vec<String>>,
    pub selection: Selection,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl Query {
    /// Every row, every column, ascending `_id`.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn select(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn project<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}
