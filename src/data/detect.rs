use super::error::{SchemaError, TableKind};
use super::model::RawTable;

/// Name fragments that mark a ridership column, in order of preference.
const PREFERRED_FRAGMENTS: [&str; 2] = ["ridership", "passenger"];

/// Pick the column holding ridership counts.
///
/// Among numeric columns: the first whose name contains "ridership", else the
/// first containing "passenger", else the first numeric column in declared
/// order. Column names are expected to be normalised already.
pub fn detect_ridership_column(table: &RawTable, kind: TableKind) -> Result<String, SchemaError> {
    let numeric = table.numeric_columns();
    pick_ridership_column(&numeric)
        .map(str::to_string)
        .ok_or(SchemaError::NoNumericColumn { table: kind })
}

/// Precedence rule over an ordered list of numeric column names.
pub fn pick_ridership_column<'a>(numeric: &[&'a str]) -> Option<&'a str> {
    PREFERRED_FRAGMENTS
        .iter()
        .find_map(|fragment| numeric.iter().find(|c| c.contains(fragment)))
        .or_else(|| numeric.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn table(columns: &[&str], row: Vec<CellValue>) -> RawTable {
        RawTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: vec![row],
        }
    }

    #[test]
    fn test_prefers_ridership_name() {
        assert_eq!(
            pick_ridership_column(&["x", "ridership_count", "y"]),
            Some("ridership_count")
        );
    }

    #[test]
    fn test_falls_back_to_first_declared() {
        assert_eq!(pick_ridership_column(&["a", "b"]), Some("a"));
    }

    #[test]
    fn test_ridership_beats_passenger_regardless_of_order() {
        assert_eq!(
            pick_ridership_column(&["passengers", "total_ridership"]),
            Some("total_ridership")
        );
        assert_eq!(
            pick_ridership_column(&["count", "passengers"]),
            Some("passengers")
        );
    }

    #[test]
    fn test_first_match_wins_among_multiple() {
        assert_eq!(
            pick_ridership_column(&["ridership_a", "ridership_b"]),
            Some("ridership_a")
        );
    }

    #[test]
    fn test_ignores_non_numeric_columns() {
        let t = table(
            &["ridership_note", "count"],
            vec![CellValue::String("busy".into()), CellValue::Integer(10)],
        );
        assert_eq!(detect_ridership_column(&t, TableKind::Daily).unwrap(), "count");
    }

    #[test]
    fn test_no_numeric_column_is_error() {
        let t = table(&["date", "line"], vec![
            CellValue::String("2024-01-01".into()),
            CellValue::String("A".into()),
        ]);
        assert_eq!(
            detect_ridership_column(&t, TableKind::Hourly),
            Err(SchemaError::NoNumericColumn { table: TableKind::Hourly })
        );
    }

    #[test]
    fn test_all_null_column_is_not_numeric() {
        let t = table(&["empty", "riders"], vec![CellValue::Null, CellValue::Float(3.5)]);
        assert_eq!(detect_ridership_column(&t, TableKind::Daily).unwrap(), "riders");
    }
}
