use crate::schema::{Page, Record};
use crate::{Collection, CoreError, UserId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Key = (UserId, Collection);

/// Canned pages served from memory. Cursors are `p<index>`.
#[derive(Default)]
pub struct MemorySource {
    pages: RwLock<HashMap<Key, Vec<Vec<Record>>>>,
    failures: RwLock<HashMap<Key, usize>>,
    delay: RwLock<Option<Duration>>,
    calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pages(&self, user: &UserId, collection: Collection, pages: Vec<Vec<Record>>) {
        self.pages.write().insert((user.clone(), collection), pages);
    }

    /// Splits `records` into pages of at most `page_size`.
    pub fn set_records(&self, user: &UserId, collection: Collection, records: Vec<Record>, page_size: usize) {
        let pages = records
            .chunks(page_size.max(1))
            .map(|c| c.to_vec())
            .collect();
        self.set_pages(user, collection, pages);
    }

    /// Makes the fetch of page `page` (0-based) fail.
    pub fn fail_at(&self, user: &UserId, collection: Collection, page: usize) {
        self.failures.write().insert((user.clone(), collection), page);
    }

    pub fn clear_failures(&self) {
        self.failures.write().clear();
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write() = delay;
    }

    pub fn page_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn page_index(cursor: Option<&str>) -> Option<usize> {
    match cursor {
        None => Some(0),
        Some(c) => c.strip_prefix('p')?.parse().ok(),
    }
}

#[async_trait]
impl crate::source::DataSource for MemorySource {
    async fn fetch_page(
        &self,
        user: &UserId,
        collection: Collection,
        cursor: Option<&str>,
    ) -> Result<Page, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.read();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }

        let idx = page_index(cursor)
            .ok_or_else(|| CoreError::fetch(collection, format!("unknown cursor {cursor:?}")))?;
        let key = (user.clone(), collection);
        if self.failures.read().get(&key) == Some(&idx) {
            return Err(CoreError::fetch(collection, format!("injected failure on page {idx}")));
        }

        let pages = self.pages.read();
        let Some(all) = pages.get(&key) else {
            return Ok(Page::last(Vec::new()));
        };
        if all.is_empty() && idx == 0 {
            return Ok(Page::last(Vec::new()));
        }
        let records = all
            .get(idx)
            .cloned()
            .ok_or_else(|| CoreError::fetch(collection, format!("cursor past end: {idx}")))?;
        if idx + 1 < all.len() {
            Ok(Page::more(records, format!("p{}", idx + 1)))
        } else {
            Ok(Page::last(records))
        }
    }
}
