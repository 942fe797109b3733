//! Artwork operations against a provider's collection.

use easel_core::{content_uri_for, ArtworkRecord, ComponentLookup, ComponentName, ContentUri};
use easel_store::{BackReference, ContentStore, Operation, Query, SortOrder};

use crate::batch::BatchExecutor;
use crate::error::{BatchFailure, ClientError};

/// Reads and writes artwork records through a [`ContentStore`].
///
/// Every operation takes the provider's content address, either built
/// directly or resolved from a component name via the `_for` variants.
#[derive(Debug)]
pub struct RegistryClient<S> {
    store: S,
}

impl<S: ContentStore> RegistryClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The record with the greatest id, or `None` for an empty collection.
    ///
    /// Only the first row of the cursor is read. The cursor is released on
    /// every path, including a row that fails to decode.
    pub fn get_last_added(&self, uri: &ContentUri) -> Result<Option<ArtworkRecord>, ClientError> {
        let mut cursor = self
            .store
            .query(uri, &Query::all().order(SortOrder::IdDescending).limit(1))?;
        let first = cursor.next();
        cursor.close();

        match first {
            Some(row) => Ok(Some(ArtworkRecord::from_row(&row)?)),
            None => {
                tracing::debug!("no artwork at {uri}");
                Ok(None)
            }
        }
    }

    /// Insert `record`. A record whose token already exists updates that row
    /// in place.
    ///
    /// `Ok(None)` means the store declined the row.
    pub fn add_artwork(
        &self,
        uri: &ContentUri,
        record: &ArtworkRecord,
    ) -> Result<Option<ContentUri>, ClientError> {
        let inserted = self.store.insert(uri, record.to_row())?;
        match &inserted {
            Some(row_uri) => tracing::info!("added artwork {row_uri}"),
            None => tracing::warn!("store at {uri} declined artwork"),
        }
        Ok(inserted)
    }

    /// Replace the whole collection with `record` in one transaction.
    ///
    /// The plan is an insert followed by a delete of every row except the
    /// inserted one. If anything fails, nothing is applied. The insert
    /// carries every caller column, so a row picked up through its token
    /// ends up holding exactly `record`'s content.
    pub fn try_set_artwork(
        &self,
        uri: &ContentUri,
        record: &ArtworkRecord,
    ) -> Result<ContentUri, BatchFailure> {
        let collection = uri.collection();
        let plan = vec![
            Operation::Insert {
                uri: collection.clone(),
                row: record.to_full_row(),
            },
            Operation::DeleteExcept {
                uri: collection.clone(),
                keep: BackReference(0),
            },
        ];
        tracing::debug!("replacing artwork at {collection}");

        let results = BatchExecutor::new(&self.store).execute(collection.authority(), plan)?;
        let removed = results[1].count().unwrap_or(0);
        let inserted = results[0]
            .uri()
            .cloned()
            .ok_or(BatchFailure::MissingResults { expected: 2, got: 0 })?;
        tracing::info!("set artwork {inserted}, removed {removed} other rows");
        Ok(inserted)
    }

    /// [`try_set_artwork`](Self::try_set_artwork), with the failure logged
    /// and dropped.
    pub fn set_artwork(&self, uri: &ContentUri, record: &ArtworkRecord) -> Option<ContentUri> {
        match self.try_set_artwork(uri, record) {
            Ok(inserted) => Some(inserted),
            Err(failure) => {
                tracing::warn!("failed to set artwork at {uri}: {failure}");
                None
            }
        }
    }

    /// Every record, newest first.
    pub fn list_artwork(&self, uri: &ContentUri) -> Result<Vec<ArtworkRecord>, ClientError> {
        let cursor = self
            .store
            .query(uri, &Query::all().order(SortOrder::IdDescending))?;
        cursor
            .map(|row| ArtworkRecord::from_row(&row).map_err(ClientError::from))
            .collect()
    }

    // ------------------------------------------------------------------
    // Provider-addressed forms
    // ------------------------------------------------------------------

    pub fn get_last_added_for(
        &self,
        lookup: &dyn ComponentLookup,
        component: &ComponentName,
    ) -> Result<Option<ArtworkRecord>, ClientError> {
        self.get_last_added(&content_uri_for(lookup, component)?)
    }

    pub fn add_artwork_for(
        &self,
        lookup: &dyn ComponentLookup,
        component: &ComponentName,
        record: &ArtworkRecord,
    ) -> Result<Option<ContentUri>, ClientError> {
        self.add_artwork(&content_uri_for(lookup, component)?, record)
    }

    /// Resolution failure is an error; a failed replace is `Ok(None)`.
    pub fn set_artwork_for(
        &self,
        lookup: &dyn ComponentLookup,
        component: &ComponentName,
        record: &ArtworkRecord,
    ) -> Result<Option<ContentUri>, ClientError> {
        Ok(self.set_artwork(&content_uri_for(lookup, component)?, record))
    }

    pub fn list_artwork_for(
        &self,
        lookup: &dyn ComponentLookup,
        component: &ComponentName,
    ) -> Result<Vec<ArtworkRecord>, ClientError> {
        self.list_artwork(&content_uri_for(lookup, component)?)
    }
}

#[cfg(test)]
mod tests {
    use easel_core::ArtworkId;
    use easel_store::MemoryStore;

    use super::*;

    const AUTHORITY: &str = "com.example.art";

    fn client() -> RegistryClient<MemoryStore> {
        RegistryClient::new(MemoryStore::new().with_provider(AUTHORITY))
    }

    fn record(token: &str, title: &str) -> ArtworkRecord {
        ArtworkRecord {
            token: Some(token.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_collection_has_no_last_added() {
        let client = client();
        assert_eq!(client.get_last_added(&ContentUri::new(AUTHORITY)).unwrap(), None);
        assert_eq!(client.store().open_cursors(), 0);
    }

    #[test]
    fn last_added_carries_store_fields() {
        let client = client();
        let uri = ContentUri::new(AUTHORITY);
        client.add_artwork(&uri, &record("a", "A")).unwrap();
        client.add_artwork(&uri, &record("b", "B")).unwrap();

        let last = client.get_last_added(&uri).unwrap().unwrap();
        assert_eq!(last.id, Some(ArtworkId(2)));
        assert_eq!(last.title.as_deref(), Some("B"));
        assert!(last.date_added.is_some());
        assert_eq!(last.content(), record("b", "B"));
    }

    #[test]
    fn set_through_row_address_replaces_collection() {
        let client = client();
        let uri = ContentUri::new(AUTHORITY);
        let first = client.add_artwork(&uri, &record("a", "A")).unwrap().unwrap();

        let replaced = client.set_artwork(&first, &record("b", "B")).unwrap();
        assert_eq!(replaced, uri.with_id(ArtworkId(2)));
        assert_eq!(client.list_artwork(&uri).unwrap().len(), 1);
    }

    #[test]
    fn list_is_newest_first() {
        let client = client();
        let uri = ContentUri::new(AUTHORITY);
        for (token, title) in [("a", "A"), ("b", "B"), ("c", "C")] {
            client.add_artwork(&uri, &record(token, title)).unwrap();
        }
        let titles: Vec<_> = client
            .list_artwork(&uri)
            .unwrap()
            .into_iter()
            .filter_map(|r| r.title)
            .collect();
        assert_eq!(titles, ["C", "B", "A"]);
    }
}
