//! Cursor pagination over provider result sets.

use std::future::Future;

/// Fetch every page of a paginated result set.
///
/// Calls `fetch` with page indexes starting at 0 and concatenates the
/// results in order. The first empty page terminates the walk; no further
/// pages are requested after it.
pub async fn fetch_all_pages<T, E, F, Fut>(mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut results = Vec::new();
    let mut page = 0usize;

    loop {
        let batch = fetch(page).await?;
        if batch.is_empty() {
            break;
        }
        page += 1;
        results.extend(batch);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn concatenates_pages_in_order_and_stops_on_empty() {
        let pages = vec![vec![1, 2], vec![3], vec![4, 5, 6], vec![]];
        let calls = AtomicUsize::new(0);

        let result: Result<Vec<i32>, ()> = fetch_all_pages(|page| {
            calls.fetch_add(1, Ordering::SeqCst);
            let batch = pages.get(page).cloned().unwrap_or_default();
            async move { Ok(batch) }
        })
        .await;

        assert_eq!(result.unwrap(), vec![1, 2, 3, 4, 5, 6]);
        // One call per non-empty page, plus the terminating empty page.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn empty_first_page_yields_nothing() {
        let calls = AtomicUsize::new(0);
        let result: Result<Vec<u8>, ()> = fetch_all_pages(|_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(Vec::new()) }
        })
        .await;

        assert!(result.unwrap().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn propagates_errors_without_further_calls() {
        let calls = AtomicUsize::new(0);
        let result: Result<Vec<u8>, &str> = fetch_all_pages(|page| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if page == 1 {
                    Err("boom")
                } else {
                    Ok(vec![0u8])
                }
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
