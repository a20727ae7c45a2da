//! Query construction.
//!
//! # Responsibilities
//! - Serialize a [`QueryRequest`] into Livestatus wire text
//! - Decide where the normalizer gets its column names from
//!
//! # Design Decisions
//! - Filter and Stats text is forwarded verbatim; the caller owns query-language syntax
//! - Building never fails; validation happens at the HTTP edge

/// A structured Livestatus `GET` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Livestatus table (e.g. `hosts`, `services`).
    pub table: String,
    /// Columns to select. Empty means "all columns, daemon sends a header row".
    pub columns: Vec<String>,
    /// Raw filter expressions, one `Filter:` line each.
    pub filters: Vec<String>,
    /// Raw stats expressions, one `Stats:` line each.
    pub stats: Vec<String>,
    /// Maximum number of rows.
    pub limit: Option<u64>,
    /// Reshape the response into records.
    pub normalize: bool,
}

impl QueryRequest {
    /// Create a query for `table` with no clauses and normalization enabled.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            stats: Vec::new(),
            limit: None,
            normalize: true,
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn stat(mut self, stat: impl Into<String>) -> Self {
        self.stats.push(stat.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Serialize into wire format.
    pub fn build(&self) -> WireQuery {
        let mut text = format!("GET {}\n", self.table);
        let mut header = Vec::with_capacity(self.columns.len() + self.stats.len());

        if !self.columns.is_empty() {
            text.push_str("Columns: ");
            text.push_str(&self.columns.join(" "));
            text.push('\n');
            header.extend(self.columns.iter().cloned());
        }

        for filter in &self.filters {
            text.push_str("Filter:");
            text.push_str(filter);
            text.push('\n');
        }

        // Stats columns come back unnamed, so the stat text doubles as the column name.
        for stat in &self.stats {
            text.push_str("Stats:");
            text.push_str(stat);
            text.push('\n');
            header.push(stat.clone());
        }

        if let Some(limit) = self.limit {
            text.push_str(&format!("Limit: {}\n", limit));
        }

        text.push_str("OutputFormat: json\n");
        text.push_str("ResponseHeader: fixed16\n");

        let header = if header.is_empty() {
            HeaderSource::DaemonSupplied
        } else {
            HeaderSource::CallerSupplied(header)
        };

        WireQuery { text, header }
    }
}

/// Where the column names for normalization come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderSource {
    /// The first row of the response body is the header row.
    DaemonSupplied,
    /// The daemon suppresses its header row; these names apply positionally.
    CallerSupplied(Vec<String>),
}

/// A serialized query plus the header source its response must be normalized with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireQuery {
    pub text: String,
    pub header: HeaderSource,
}
