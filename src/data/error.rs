use thiserror::Error;

/// Which of the two input tables an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Daily,
    Hourly,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Daily => write!(f, "daily"),
            TableKind::Hourly => write!(f, "hourly"),
        }
    }
}

/// Fatal configuration problems: the pipeline cannot run on this input.
///
/// Distinct from an empty filter result, which is reported as "no data"
/// by the aggregation layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{table} table is missing required column(s): {}", columns.join(", "))]
    MissingColumns {
        table: TableKind,
        columns: Vec<String>,
    },

    #[error("{table} table has no numeric column to use as ridership")]
    NoNumericColumn { table: TableKind },
}
