use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::associations::ScoredItem;
use crate::io::ItemId;

/// Formats one result row: the reference item id followed by an id/score
/// pair per recommended item, scores rendered with exactly two decimals.
/// An unbounded advanced score is rendered as `inf`.
pub fn format_ranking_row(reference: &ItemId, ranking: &[ScoredItem]) -> String {
    let mut row = reference.clone();
    for scored in ranking {
        row.push(',');
        row.push_str(&scored.id);
        row.push_str(&format!(",{:.2}", scored.score));
    }
    row
}

/// Writes one ranking row per line.
pub fn write_ranking_rows<P: AsRef<Path>>(path: P, rows: &[String]) -> anyhow::Result<()> {
    let mut file = File::create(path.as_ref())
        .with_context(|| format!("cannot create result file {}", path.as_ref().display()))?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    Ok(())
}

#[cfg(test)]
mod report_test {
    use super::*;

    fn scored(id: &str, score: f64) -> ScoredItem {
        ScoredItem {
            id: id.to_string(),
            score,
        }
    }

    #[test]
    fn should_format_rows_with_two_decimal_scores() {
        let ranking = vec![scored("120", 2.0 / 3.0), scored("122", 1.0 / 3.0)];

        let row = format_ranking_row(&"11".to_string(), &ranking);

        assert_eq!("11,120,0.67,122,0.33", row);
    }

    #[test]
    fn should_format_reference_without_candidates_as_bare_id() {
        let row = format_ranking_row(&"11".to_string(), &[]);
        assert_eq!("11", row);
    }

    #[test]
    fn handle_unbounded_scores_in_rows() {
        let ranking = vec![scored("120", f64::INFINITY), scored("122", 0.0)];

        let row = format_ranking_row(&"8587".to_string(), &ranking);

        assert_eq!("8587,120,inf,122,0.00", row);
    }
}
