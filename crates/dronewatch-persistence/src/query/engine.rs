//! Query engine over persisted violations.

use std::sync::Arc;

use tracing::debug;

use crate::error::{PersistenceError, Result};
use crate::query::filter::{FilterSet, OrderBy, ViolationSelect};
use crate::repository::{ReportRepository, ViolationRepository};
use dronewatch_domain::{
    FilterOptions, Page, Pagination, RawParams, SearchQuery, Violation, ViolationFilters,
    ViolationQuery, parse_query_params, parse_search_params,
};

/// Filtered, sorted and paginated reads.
#[derive(Clone)]
pub struct QueryEngine {
    violations: Arc<dyn ViolationRepository>,
    reports: Arc<dyn ReportRepository>,
}

impl QueryEngine {
    pub fn new(violations: Arc<dyn ViolationRepository>, reports: Arc<dyn ReportRepository>) -> Self {
        Self {
            violations,
            reports,
        }
    }

    /// One page of violations matching `query`.
    ///
    /// A page past the end comes back empty with the real totals.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Storage`] if the store fails.
    pub async fn query(&self, query: &ViolationQuery) -> Result<Page<Violation>> {
        let select = ViolationSelect::new(
            FilterSet::from_filters(&query.filters),
            OrderBy::listing(query.sort_by, query.sort_order),
        );
        let (items, total) = self.violations.find_page(&select, query.page).await?;
        debug!(
            total,
            returned = items.len(),
            page = query.page.page,
            sort_by = query.sort_by.as_str(),
            "Violation query"
        );
        Ok(Page {
            items,
            pagination: Pagination::new(query.page, total),
        })
    }

    /// Validate raw listing parameters, then run [`QueryEngine::query`].
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Validation`] for bad parameters.
    pub async fn query_raw(&self, raw: &RawParams) -> Result<Page<Violation>> {
        let query = parse_query_params(raw)?;
        self.query(&query).await
    }

    /// Case-insensitive substring search across type, location and drone
    /// id, newest first. The term is matched as given, spaces included.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Storage`] if the store fails.
    pub async fn search(&self, search: &SearchQuery) -> Result<Page<Violation>> {
        let select = ViolationSelect::new(
            FilterSet::text_search(&search.term),
            OrderBy::newest_first(),
        );
        let (items, total) = self.violations.find_page(&select, search.page).await?;
        debug!(term = %search.term, total, "Violation search");
        Ok(Page {
            items,
            pagination: Pagination::new(search.page, total),
        })
    }

    /// Validate search parameters, then run [`QueryEngine::search`].
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Validation`] for a blank term or bad paging.
    pub async fn search_raw(&self, term: &str, raw: &RawParams) -> Result<Page<Violation>> {
        let search = parse_search_params(term, raw)?;
        self.search(&search).await
    }

    /// # Errors
    ///
    /// [`PersistenceError::NotFound`] when no violation has that id.
    pub async fn get_by_id(&self, id: &str) -> Result<Violation> {
        if let Some(violation) = self.violations.get_by_id(id).await? {
            Ok(violation)
        } else {
            debug!(id, "Violation not found");
            Err(PersistenceError::not_found("violation", id))
        }
    }

    /// # Errors
    ///
    /// [`PersistenceError::Storage`] if the store fails.
    pub async fn filter_options(&self) -> Result<FilterOptions> {
        self.violations.filter_options().await
    }

    /// Every violation matching `filters`, newest first, unpaginated.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Storage`] if the store fails.
    pub async fn map_markers(&self, filters: &ViolationFilters) -> Result<Vec<Violation>> {
        let select = ViolationSelect::new(FilterSet::from_filters(filters), OrderBy::newest_first());
        self.violations.find_all(&select).await
    }

    /// # Errors
    ///
    /// [`PersistenceError::Storage`] if the store fails.
    pub async fn report_count(&self) -> Result<u64> {
        self.reports.count().await
    }
}
