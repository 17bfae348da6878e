//! Tenant-scoped, parameterized log queries.
//!
//! [`QueryFilterBuilder`] turns the optional retrieval parameters into a
//! [`LogQuery`]: an ordered list of predicates, each paired with the value a
//! backend must bind for it, an ordering descriptor and pagination bounds.
//! The first predicate is always `tenant = <authenticated tenant>`.
//!
//! Only `limit` and `offset` are ever rendered into query text, and only
//! after they have been parsed into integers.

use std::cmp::Ordering;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use quill_auth::AuthenticatedTenant;
use serde::Deserialize;

use crate::error::{LogError, Result};
use crate::types::{format_timestamp, parse_timestamp, LogRow};

/// Table holding stored log records.
pub const TABLE_NAME: &str = "log_data";

/// Columns returned by every select, in [`LogRow`] field order.
pub const SELECT_COLUMNS: &str =
    "id, tenant, system, user, module, task, timestamp, msg, level, stack_trace";

/// Page size used when `limit` is absent or unparsable.
pub const DEFAULT_LIMIT: u64 = 100;

/// Offset used when `offset` is absent or unparsable.
pub const DEFAULT_OFFSET: u64 = 0;

/// Raw retrieval parameters as they arrive in a query string.
///
/// Everything is kept as text; interpretation happens in
/// [`QueryFilterBuilder::from_params`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QueryParams {
    /// Tenant the caller claims to act as.
    #[serde(default)]
    pub tenant: Option<String>,
    /// Exact originating system.
    #[serde(default)]
    pub system: Option<String>,
    /// Exact acting user.
    #[serde(default)]
    pub user: Option<String>,
    /// Exact module.
    #[serde(default)]
    pub module: Option<String>,
    /// Exact task.
    #[serde(default)]
    pub task: Option<String>,
    /// Exact severity code.
    #[serde(default)]
    pub level: Option<String>,
    /// Inclusive lower time bound, RFC 3339.
    #[serde(default)]
    pub start_time: Option<String>,
    /// Inclusive upper time bound, RFC 3339.
    #[serde(default)]
    pub end_time: Option<String>,
    /// Maximum number of records returned.
    #[serde(default)]
    pub limit: Option<String>,
    /// Number of records skipped after ordering.
    #[serde(default)]
    pub offset: Option<String>,
}

/// A filterable column of the log table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Owning tenant
    Tenant,
    /// Originating system
    System,
    /// Acting user
    User,
    /// Module within the system
    Module,
    /// Task being performed
    Task,
    /// Severity code
    Level,
    /// Event time
    Timestamp,
}

impl Column {
    /// Column name in the log table.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::System => "system",
            Self::User => "user",
            Self::Module => "module",
            Self::Task => "task",
            Self::Level => "level",
            Self::Timestamp => "timestamp",
        }
    }

    fn text<'a>(self, row: &'a LogRow) -> Option<&'a str> {
        match self {
            Self::Tenant => Some(&row.tenant),
            Self::System => Some(&row.system),
            Self::User => Some(&row.user),
            Self::Module => Some(&row.module),
            Self::Task => Some(&row.task),
            Self::Timestamp => Some(&row.timestamp),
            Self::Level => None,
        }
    }
}

/// How a column is compared against its bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `column = value`
    Eq,
    /// `column >= value`
    Gte,
    /// `column <= value`
    Lte,
}

impl Comparison {
    /// SQL operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }

    /// Whether `column.cmp(value)` satisfies this comparison.
    #[must_use]
    pub const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Gte => !matches!(ordering, Ordering::Less),
            Self::Lte => !matches!(ordering, Ordering::Greater),
        }
    }
}

/// A value a backend binds as a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    /// Text column value
    Text(String),
    /// Integer column value
    Integer(i64),
    /// Instant, bound in the stored timestamp form
    Timestamp(DateTime<Utc>),
}

/// One `column <op> ?` condition together with its bound value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    column: Column,
    comparison: Comparison,
    value: BoundValue,
}

impl Predicate {
    fn new(column: Column, comparison: Comparison, value: BoundValue) -> Self {
        Self {
            column,
            comparison,
            value,
        }
    }

    /// The column being compared.
    #[must_use]
    pub const fn column(&self) -> Column {
        self.column
    }

    /// The comparison operator.
    #[must_use]
    pub const fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// The value bound for this predicate.
    #[must_use]
    pub const fn value(&self) -> &BoundValue {
        &self.value
    }

    /// Evaluates the predicate against a stored row.
    ///
    /// Text and timestamp columns compare as stored text, matching what a
    /// SQL backend does with the same bound value.
    #[must_use]
    pub fn matches(&self, row: &LogRow) -> bool {
        let ordering = match &self.value {
            BoundValue::Text(value) => self.column.text(row).map(|t| t.cmp(value.as_str())),
            BoundValue::Integer(value) => {
                (self.column == Column::Level).then(|| row.level.cmp(value))
            }
            BoundValue::Timestamp(value) => (self.column == Column::Timestamp)
                .then(|| row.timestamp.as_str().cmp(format_timestamp(*value).as_str())),
        };
        ordering.is_some_and(|o| self.comparison.holds(o))
    }
}

/// Result ordering. Retrieval is always newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    /// Descending timestamp, then descending identifier
    #[default]
    NewestFirst,
}

impl OrderBy {
    /// SQL `ORDER BY` body.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NewestFirst => "timestamp DESC, id DESC",
        }
    }

    /// Orders two rows the way the SQL clause does.
    #[must_use]
    pub fn compare(self, a: &LogRow, b: &LogRow) -> Ordering {
        match self {
            Self::NewestFirst => b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)),
        }
    }
}

/// Pagination bounds, applied after ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Maximum number of rows
    pub limit: u64,
    /// Rows skipped before the first returned one
    pub offset: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl Page {
    /// Applies the bounds to an already ordered sequence.
    pub fn apply<I: Iterator>(self, rows: I) -> impl Iterator<Item = I::Item> {
        rows.skip(usize::try_from(self.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
    }
}

/// A built, not yet executed, retrieval query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    predicates: Vec<Predicate>,
    order: OrderBy,
    page: Page,
}

impl LogQuery {
    /// Predicates in evaluation order; the first is always the tenant.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Result ordering.
    #[must_use]
    pub const fn order(&self) -> OrderBy {
        self.order
    }

    /// Pagination bounds.
    #[must_use]
    pub const fn page(&self) -> Page {
        self.page
    }

    /// Values to bind, positionally matching the placeholders of [`Self::to_sql`].
    pub fn bound_values(&self) -> impl Iterator<Item = &BoundValue> {
        self.predicates.iter().map(Predicate::value)
    }

    /// Whether a stored row satisfies every predicate.
    #[must_use]
    pub fn matches(&self, row: &LogRow) -> bool {
        self.predicates.iter().all(|p| p.matches(row))
    }

    /// Renders the select statement with numbered placeholders.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM {TABLE_NAME}");
        for (i, predicate) in self.predicates.iter().enumerate() {
            let joiner = if i == 0 { " WHERE " } else { " AND " };
            let _ = write!(
                sql,
                "{joiner}{} {} ?{}",
                predicate.column.as_sql(),
                predicate.comparison.as_sql(),
                i + 1
            );
        }
        let _ = write!(
            sql,
            " ORDER BY {} LIMIT {} OFFSET {}",
            self.order.as_sql(),
            self.page.limit,
            self.page.offset
        );
        sql
    }
}

/// Builds a [`LogQuery`] for one authenticated tenant.
///
/// Optional filters that are absent or empty add nothing. Predicates end up
/// in the order the `with_*` methods are called; [`Self::from_params`] uses
/// tenant, system, user, module, task, level, start time, end time.
#[derive(Debug, Clone)]
pub struct QueryFilterBuilder {
    predicates: Vec<Predicate>,
    page: Page,
}

impl QueryFilterBuilder {
    /// Starts a query scoped to `tenant`.
    #[must_use]
    pub fn new(tenant: &AuthenticatedTenant) -> Self {
        Self {
            predicates: vec![Predicate::new(
                Column::Tenant,
                Comparison::Eq,
                BoundValue::Text(tenant.as_str().to_string()),
            )],
            page: Page::default(),
        }
    }

    /// Builds the query for a set of raw parameters.
    ///
    /// The `tenant` parameter is not consulted; the authenticated tenant is
    /// always the scope.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidTimeBound`] if `start_time` or `end_time`
    /// is present but not an RFC 3339 instant.
    pub fn from_params(tenant: &AuthenticatedTenant, params: &QueryParams) -> Result<LogQuery> {
        Ok(Self::new(tenant)
            .with_system(params.system.as_deref())
            .with_user(params.user.as_deref())
            .with_module(params.module.as_deref())
            .with_task(params.task.as_deref())
            .with_level(params.level.as_deref())
            .with_start_time(params.start_time.as_deref())?
            .with_end_time(params.end_time.as_deref())?
            .with_limit(params.limit.as_deref())
            .with_offset(params.offset.as_deref())
            .build())
    }

    /// Adds `system = ?`.
    #[must_use]
    pub fn with_system(self, value: Option<&str>) -> Self {
        self.with_text(Column::System, value)
    }

    /// Adds `user = ?`.
    #[must_use]
    pub fn with_user(self, value: Option<&str>) -> Self {
        self.with_text(Column::User, value)
    }

    /// Adds `module = ?`.
    #[must_use]
    pub fn with_module(self, value: Option<&str>) -> Self {
        self.with_text(Column::Module, value)
    }

    /// Adds `task = ?`.
    #[must_use]
    pub fn with_task(self, value: Option<&str>) -> Self {
        self.with_text(Column::Task, value)
    }

    /// Adds `level = ?`; values that are not integers are ignored.
    #[must_use]
    pub fn with_level(mut self, value: Option<&str>) -> Self {
        if let Some(level) = parse_integer(value) {
            self.predicates.push(Predicate::new(
                Column::Level,
                Comparison::Eq,
                BoundValue::Integer(level),
            ));
        }
        self
    }

    /// Adds `timestamp >= ?`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidTimeBound`] for a malformed instant.
    pub fn with_start_time(self, value: Option<&str>) -> Result<Self> {
        self.with_time_bound(Comparison::Gte, "start_time", value)
    }

    /// Adds `timestamp <= ?`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidTimeBound`] for a malformed instant.
    pub fn with_end_time(self, value: Option<&str>) -> Result<Self> {
        self.with_time_bound(Comparison::Lte, "end_time", value)
    }

    /// Sets the page size; unparsable or negative values keep the default.
    #[must_use]
    pub fn with_limit(mut self, value: Option<&str>) -> Self {
        self.page.limit = parse_count(value).unwrap_or(DEFAULT_LIMIT);
        self
    }

    /// Sets the offset; unparsable or negative values keep the default.
    #[must_use]
    pub fn with_offset(mut self, value: Option<&str>) -> Self {
        self.page.offset = parse_count(value).unwrap_or(DEFAULT_OFFSET);
        self
    }

    /// Finishes the query.
    #[must_use]
    pub fn build(self) -> LogQuery {
        LogQuery {
            predicates: self.predicates,
            order: OrderBy::NewestFirst,
            page: self.page,
        }
    }

    fn with_text(mut self, column: Column, value: Option<&str>) -> Self {
        if let Some(value) = non_empty(value) {
            self.predicates.push(Predicate::new(
                column,
                Comparison::Eq,
                BoundValue::Text(value.to_string()),
            ));
        }
        self
    }

    fn with_time_bound(
        mut self,
        comparison: Comparison,
        name: &'static str,
        value: Option<&str>,
    ) -> Result<Self> {
        if let Some(raw) = non_empty(value) {
            let instant = parse_timestamp(raw).ok_or(LogError::InvalidTimeBound(name))?;
            self.predicates.push(Predicate::new(
                Column::Timestamp,
                comparison,
                BoundValue::Timestamp(instant),
            ));
        }
        Ok(self)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_integer(value: Option<&str>) -> Option<i64> {
    non_empty(value).and_then(|v| v.trim().parse().ok())
}

fn parse_count(value: Option<&str>) -> Option<u64> {
    parse_integer(value).and_then(|v| u64::try_from(v).ok())
}
