//! Scoped query results.

use std::fmt;

use easel_core::Row;

type Release = Box<dyn FnOnce() + Send>;

/// Result rows of a query.
///
/// A cursor is a held resource: whatever the store attached with
/// [`RowCursor::with_release`] runs exactly once when the cursor is dropped,
/// whether it was read to the end, abandoned after the first row, or dropped
/// while unwinding out of a decode error.
pub struct RowCursor {
    rows: std::vec::IntoIter<Row>,
    release: Option<Release>,
}

impl RowCursor {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
            release: None,
        }
    }

    pub fn with_release(rows: Vec<Row>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            rows: rows.into_iter(),
            release: Some(Box::new(release)),
        }
    }

    /// Rows not yet read.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Release the cursor now.
    pub fn close(self) {}
}

impl Iterator for RowCursor {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl Drop for RowCursor {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for RowCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowCursor")
            .field("remaining", &self.rows.len())
            .field("releases", &self.release.is_some())
            .finish()
    }
}
