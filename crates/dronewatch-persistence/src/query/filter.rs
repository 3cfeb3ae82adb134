//! Typed filter and sort clauses rendered to SQL.
//!
//! Every column name comes from a fixed whitelist inside this module; user
//! input only ever reaches the database as a bound parameter.

use chrono::NaiveDate;
use dronewatch_domain::{DATE_FORMAT, PageRequest, SortKey, SortOrder, ViolationFilters};

/// Columns selected for every violation read, in row-mapping order.
pub(crate) const VIOLATION_COLUMNS: &str = "id, report_id, drone_id, date, location, type, \
     timestamp, latitude, longitude, image_url, uploaded_at";

// =============================================================================
// FILTERS
// =============================================================================

/// One predicate over the violations table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    DroneIdEquals(String),
    DateOnOrAfter(NaiveDate),
    DateOnOrBefore(NaiveDate),
    TypeEquals(String),
    /// Case-sensitive substring of the location label.
    LocationContains(String),
    /// Case-insensitive substring of type, location or drone id.
    TextMatches(String),
}

impl FilterClause {
    const fn sql(&self) -> &'static str {
        match self {
            Self::DroneIdEquals(_) => "drone_id = ?",
            Self::DateOnOrAfter(_) => "date >= ?",
            Self::DateOnOrBefore(_) => "date <= ?",
            Self::TypeEquals(_) => "type = ?",
            Self::LocationContains(_) => "contains(location, ?)",
            Self::TextMatches(_) => {
                "(contains(lower(type), ?) OR contains(lower(location), ?) OR contains(lower(drone_id), ?))"
            }
        }
    }

    fn bind(&self, out: &mut Vec<String>) {
        match self {
            Self::DroneIdEquals(v) | Self::TypeEquals(v) | Self::LocationContains(v) => {
                out.push(v.clone());
            }
            Self::DateOnOrAfter(d) | Self::DateOnOrBefore(d) => {
                out.push(d.format(DATE_FORMAT).to_string());
            }
            Self::TextMatches(term) => {
                let needle = term.to_lowercase();
                out.extend(std::iter::repeat_n(needle, 3));
            }
        }
    }
}

/// Clauses joined with AND. An empty set matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    clauses: Vec<FilterClause>,
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clauses for the listing and map filters; absent filters add nothing.
    #[must_use]
    pub fn from_filters(filters: &ViolationFilters) -> Self {
        let mut set = Self::new();
        if let Some(drone_id) = &filters.drone_id {
            set.push(FilterClause::DroneIdEquals(drone_id.clone()));
        }
        if let Some(from) = filters.date_from {
            set.push(FilterClause::DateOnOrAfter(from));
        }
        if let Some(to) = filters.date_to {
            set.push(FilterClause::DateOnOrBefore(to));
        }
        if let Some(kind) = &filters.violation_type {
            set.push(FilterClause::TypeEquals(kind.clone()));
        }
        if let Some(location) = &filters.location {
            set.push(FilterClause::LocationContains(location.clone()));
        }
        set
    }

    /// Free-text search over type, location and drone id.
    #[must_use]
    pub fn text_search(term: &str) -> Self {
        Self {
            clauses: vec![FilterClause::TextMatches(term.to_string())],
        }
    }

    pub fn push(&mut self, clause: FilterClause) {
        self.clauses.push(clause);
    }

    /// ` WHERE ...` fragment, or an empty string when there are no clauses.
    #[must_use]
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        let parts: Vec<&str> = self.clauses.iter().map(FilterClause::sql).collect();
        format!(" WHERE {}", parts.join(" AND "))
    }

    /// Positional parameters matching [`FilterSet::where_sql`].
    #[must_use]
    pub fn bindings(&self) -> Vec<String> {
        let mut out = Vec::new();
        for clause in &self.clauses {
            clause.bind(&mut out);
        }
        out
    }
}

// =============================================================================
// ORDERING
// =============================================================================

/// Sortable columns. `Arrival` is the insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Date,
    Timestamp,
    Type,
    DroneId,
    Arrival,
}

impl SortColumn {
    const fn column(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Type => "type",
            Self::DroneId => "drone_id",
            Self::Arrival => "arrival_seq",
        }
    }
}

impl From<SortKey> for SortColumn {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Date => Self::Date,
            SortKey::Timestamp => Self::Timestamp,
            SortKey::Type => Self::Type,
            SortKey::DroneId => Self::DroneId,
        }
    }
}

/// A total ordering; always ends with arrival order ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    terms: Vec<(SortColumn, SortOrder)>,
}

impl OrderBy {
    /// Ordering for a listing. Date ties fall back to time of day in the
    /// same direction.
    #[must_use]
    pub fn listing(key: SortKey, order: SortOrder) -> Self {
        let mut terms = vec![(SortColumn::from(key), order)];
        if key == SortKey::Date {
            terms.push((SortColumn::Timestamp, order));
        }
        terms.push((SortColumn::Arrival, SortOrder::Asc));
        Self { terms }
    }

    /// Date then time of day, both descending.
    #[must_use]
    pub fn newest_first() -> Self {
        Self::listing(SortKey::Date, SortOrder::Desc)
    }

    #[must_use]
    pub fn sql(&self) -> String {
        let parts: Vec<String> = self
            .terms
            .iter()
            .map(|(column, order)| format!("{} {}", column.column(), order.as_str().to_uppercase()))
            .collect();
        format!(" ORDER BY {}", parts.join(", "))
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::newest_first()
    }
}

// =============================================================================
// SELECT
// =============================================================================

/// A filtered, ordered read over the violations table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationSelect {
    pub filters: FilterSet,
    pub order: OrderBy,
}

impl ViolationSelect {
    #[must_use]
    pub const fn new(filters: FilterSet, order: OrderBy) -> Self {
        Self { filters, order }
    }

    /// Row query, optionally restricted to one page window.
    #[must_use]
    pub fn select_sql(&self, window: Option<PageRequest>) -> String {
        let mut sql = format!(
            "SELECT {VIOLATION_COLUMNS} FROM violations{}{}",
            self.filters.where_sql(),
            self.order.sql()
        );
        if let Some(window) = window {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", window.limit, window.offset()));
        }
        sql
    }

    /// Count over the same filters, ignoring order and window.
    #[must_use]
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM violations{}", self.filters.where_sql())
    }

    #[must_use]
    pub fn bindings(&self) -> Vec<String> {
        self.filters.bindings()
    }
}
