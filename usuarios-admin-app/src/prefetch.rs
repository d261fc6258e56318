//! Server-side prefetch of the first page

use usuarios_admin_api::{ListQuery, Result, UpstreamClient, UsuariosPage};

/// Page size used for the prefetched page.
pub const PREFETCH_LIMIT: u32 = 10;

/// Empty page shown when the prefetch fails.
pub fn fallback_page() -> UsuariosPage {
    UsuariosPage::empty(PREFETCH_LIMIT)
}

/// Read page 1 straight from the upstream store.
///
/// Never fails: any error is logged and replaced by [`fallback_page`].
pub async fn prefetch_initial_page(upstream: &UpstreamClient) -> UsuariosPage {
    let query = ListQuery {
        page: 1,
        limit: PREFETCH_LIMIT,
        ..ListQuery::default()
    };
    page_or_fallback(upstream.fetch_page(&query).await)
}

pub fn page_or_fallback(result: Result<UsuariosPage>) -> UsuariosPage {
    match result {
        Ok(page) => {
            log::info!(
                "Prefetched {} usuarios (total {})",
                page.data.len(),
                page.pagination.total
            );
            page
        }
        Err(e) => {
            log::error!("Failed to prefetch usuarios, serving an empty page: {e}");
            fallback_page()
        }
    }
}
