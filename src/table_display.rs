use crate::config::DisplayConfig;
use crate::session::Outfit;
use crate::ui::render::format_score;
use anyhow::Result;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use std::path::Path;

/// Build the result table shown by the line REPL
pub fn results_table(outfits: &[Outfit], display: &DisplayConfig) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec!["#", "Title", "Color", "Tags", "Score"];
    if display.show_image_urls {
        headers.push("Image");
    }
    table.set_header(
        headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for (rank, outfit) in outfits.iter().enumerate() {
        let mut row = vec![
            Cell::new(rank + 1),
            Cell::new(&outfit.title),
            Cell::new(&outfit.color),
            Cell::new(&outfit.tags),
            Cell::new(format_score(outfit.score, display.score_precision))
                .set_alignment(CellAlignment::Right),
        ];
        if display.show_image_urls {
            row.push(Cell::new(&outfit.image_url));
        }
        table.add_row(row);
    }

    table
}

/// Write outfits to a CSV file, one row per result in rank order
pub fn export_to_csv(outfits: &[Outfit], path: &Path) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["id", "title", "image_url", "color", "tags", "score"])?;

    for outfit in outfits {
        wtr.write_record([
            outfit.id.to_string(),
            outfit.title.clone(),
            outfit.image_url.clone(),
            outfit.color.clone(),
            outfit.tags.clone(),
            outfit.score.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(outfits.len())
}
