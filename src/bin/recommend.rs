extern crate corated;

use num_format::{Locale, ToFormattedString};
use rayon::prelude::*;

use corated::associations::rating_index::RatingIndex;
use corated::associations::{top_associations, Formula};
use corated::config::AppConfig;
use corated::io;
use corated::io::{ItemId, UserId};
use corated::report;

use hashbrown::HashSet;
use itertools::Itertools;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path);

    let items = io::read_item_catalog(&config.data.items_path)?;
    let users = io::read_user_roster(&config.data.users_path)?;
    let observations = io::read_rating_observations(&config.data.ratings_path)?;

    println!(
        "Loaded {} items, {} users, {} rating observations",
        items.len().to_formatted_string(&Locale::en),
        users.len().to_formatted_string(&Locale::en),
        observations.len().to_formatted_string(&Locale::en),
    );

    let roster: HashSet<UserId> = users.keys().cloned().collect();
    let catalog: Vec<ItemId> = items.keys().cloned().collect_vec();

    let index = RatingIndex::with_item_catalog(&observations, Some(&roster), &catalog)?;

    for (formula, out_path) in [
        (Formula::Simple, &config.output.simple_path),
        (Formula::Advanced, &config.output.advanced_path),
    ] {
        // The index is immutable, so the reference items are scored in
        // parallel over one shared instance. A reference item that cannot
        // be scored is reported and skipped, it never fails the batch.
        let rows: Vec<String> = config
            .model
            .reference_items
            .par_iter()
            .filter_map(|reference| {
                match top_associations(&index, reference, config.model.how_many, formula) {
                    Ok(ranking) => Some(report::format_ranking_row(reference, &ranking)),
                    Err(error) => {
                        eprintln!("skipping reference item {}: {}", reference, error);
                        None
                    }
                }
            })
            .collect();

        for row in &rows {
            println!("{}", row);
        }

        report::write_ranking_rows(out_path, &rows)?;
        println!("Wrote {} {:?} rankings to {}", rows.len(), formula, out_path);
    }

    Ok(())
}
