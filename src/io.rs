use std::path::Path;

use anyhow::{bail, Context};
use hashbrown::HashMap;

pub type UserId = String;
pub type ItemId = String;

/// A single rating-presence fact: this user rated this item.
pub type RatingObservation = (UserId, ItemId);

/// Reads the ratings file. Columns are, positionally, user identifier,
/// item identifier and rating value. The rating value itself is discarded
/// because the association formulas only use the presence of a rating, but
/// rows where it does not parse as a number are rejected.
pub fn read_rating_observations<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<RatingObservation>> {
    let mut reader = open_delimited_reader(path.as_ref())?;

    let mut observations = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let user = field(&record, 0, line, "user")?;
        let item = field(&record, 1, line, "item")?;
        let rating = field(&record, 2, line, "rating")?;
        rating.parse::<f64>().with_context(|| {
            format!("line {}: rating value '{}' is not a number", line + 1, rating)
        })?;
        observations.push((user.to_string(), item.to_string()));
    }
    Ok(observations)
}

/// Reads the user roster file with user-id/name pairs. The names are kept
/// for diagnostics only; the scoring formulas never look at them.
pub fn read_user_roster<P: AsRef<Path>>(path: P) -> anyhow::Result<HashMap<UserId, String>> {
    read_id_name_pairs(path, "user")
}

/// Reads the item catalog file with item-id/title pairs.
pub fn read_item_catalog<P: AsRef<Path>>(path: P) -> anyhow::Result<HashMap<ItemId, String>> {
    read_id_name_pairs(path, "item")
}

fn read_id_name_pairs<P: AsRef<Path>>(
    path: P,
    what: &str,
) -> anyhow::Result<HashMap<String, String>> {
    let mut reader = open_delimited_reader(path.as_ref())?;

    let mut entries = HashMap::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let id = field(&record, 0, line, what)?;
        let name = field(&record, 1, line, "name")?;
        entries.insert(id.to_string(), name.to_string());
    }
    Ok(entries)
}

fn open_delimited_reader(path: &Path) -> anyhow::Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("cannot open input file {}", path.display()))
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    line: usize,
    name: &str,
) -> anyhow::Result<&'a str> {
    match record.get(index) {
        Some(value) => Ok(value),
        None => bail!("line {}: missing {} column", line + 1, name),
    }
}
