use super::types::ExcuseTable;
use crate::clan::PeriodId;
use crate::error::RatingError;
use crate::sheets::Grid;

const TAG_HEADER: &str = "tag";
const NAME_HEADER: &str = "name";

/// Parse the excuse sheet: header `tag | name | <war>...`, one row per player.
///
/// An empty sheet yields an empty table. Short rows are padded with empty cells,
/// rows without a tag are skipped.
pub fn table_from_grid(grid: &Grid) -> Result<ExcuseTable, RatingError> {
    let mut excuses = ExcuseTable::new();
    let Some((header, rows)) = grid.split_first() else {
        return Ok(excuses);
    };

    let periods = header
        .iter()
        .skip(2)
        .map(|label| label.trim().parse::<PeriodId>())
        .collect::<Result<Vec<_>, _>>()?;
    for period in &periods {
        excuses.add_period(*period);
    }

    for row in rows {
        let tag = row.first().map(|t| t.trim()).unwrap_or("");
        if tag.is_empty() {
            continue;
        }
        let entry = excuses.row_mut_or_insert(tag);
        entry.name = row.get(1).cloned().unwrap_or_default();
        for (period, cell) in periods.iter().zip(row.iter().skip(2)) {
            entry.set(*period, cell.trim());
        }
    }
    Ok(excuses)
}

/// Render the whole table, newest war first.
pub fn table_to_grid(excuses: &ExcuseTable) -> Grid {
    let periods: Vec<PeriodId> = excuses.periods().collect();

    let mut header = vec![TAG_HEADER.to_string(), NAME_HEADER.to_string()];
    header.extend(periods.iter().map(PeriodId::to_string));

    let mut grid = vec![header];
    for (tag, row) in excuses.rows() {
        let mut line = vec![tag.to_string(), row.name.clone()];
        line.extend(periods.iter().map(|p| row.get(*p).to_string()));
        grid.push(line);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_empty_sheet() {
        let excuses = table_from_grid(&Vec::new()).unwrap();
        assert!(excuses.is_empty());
        assert_eq!(excuses.periods().count(), 0);
    }

    #[test]
    fn test_parse_pads_short_rows_and_skips_blank_tags() {
        let sheet = grid(&[
            &["tag", "name", "100.1", "100.0"],
            &["#1", "alice", "", "personal"],
            &["#2", "bob"],
            &["", "nobody", "personal"],
        ]);
        let excuses = table_from_grid(&sheet).unwrap();
        assert_eq!(excuses.tags().collect::<Vec<_>>(), vec!["#1", "#2"]);
        assert_eq!(excuses.get("#1", PeriodId::new(100, 0)), "personal");
        assert_eq!(excuses.get("#2", PeriodId::new(100, 1)), "");
        assert_eq!(excuses.row("#2").unwrap().name, "bob");
    }

    #[test]
    fn test_unknown_header_is_rejected() {
        let sheet = grid(&[&["tag", "name", "last week"]]);
        assert_eq!(
            table_from_grid(&sheet),
            Err(RatingError::InvalidPeriod("last week".to_string()))
        );
    }

    #[test]
    fn test_render_orders_newest_first() {
        let sheet = grid(&[
            &["tag", "name", "99.4", "100.0"],
            &["#1", "alice", "new player", ""],
        ]);
        let rendered = table_to_grid(&table_from_grid(&sheet).unwrap());
        assert_eq!(
            rendered,
            grid(&[
                &["tag", "name", "100.0", "99.4"],
                &["#1", "alice", "", "new player"],
            ])
        );
    }
}
