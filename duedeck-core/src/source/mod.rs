use crate::schema::{Page, Record};
use crate::{Collection, CoreError, UserId};
use async_trait::async_trait;
use std::future::Future;

pub mod memory;

/// One page of one collection from the upstream table store.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_page(
        &self,
        user: &UserId,
        collection: Collection,
        cursor: Option<&str>,
    ) -> Result<Page, CoreError>;
}

/// Drains a cursor-paginated source, concatenating pages in arrival order.
///
/// The first call gets `None`; each following call gets the cursor the
/// previous page returned, until a page comes back without one. The first
/// error aborts the drain and nothing collected so far is returned.
pub async fn fetch_all<T, E, F, Fut>(mut page_fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut out = Vec::new();
    let mut cursor: Option<String> = None;
    let mut n = 0usize;
    loop {
        let page = page_fetch(cursor.take()).await?;
        n += 1;
        tracing::debug!(page = n, records = page.records.len(), more = page.offset.is_some(), "fetched page");
        out.extend(page.records);
        match page.offset {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(out)
}

pub async fn fetch_collection(
    source: &dyn DataSource,
    user: &UserId,
    collection: Collection,
) -> Result<Vec<Record>, CoreError> {
    let records = fetch_all(move |cursor| async move {
        source.fetch_page(user, collection, cursor.as_deref()).await
    })
    .await?;
    tracing::debug!(%user, %collection, records = records.len(), "collection fetched");
    Ok(records)
}
