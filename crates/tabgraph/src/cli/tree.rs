use anyhow::{Context, Result};
use tabgraph_core::{Extraction, ReviewSheet, TableTree};

use super::{generated_output, TreeArgs};

pub fn run(args: &TreeArgs) -> Result<()> {
    let mut extraction = Extraction::from_path(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;

    if let Some(review_path) = &args.review {
        let sheet = ReviewSheet::from_path(review_path)
            .with_context(|| format!("loading review sheet {}", review_path.display()))?;
        sheet.apply(&mut extraction);
    }

    let trees: Vec<TableTree> = extraction
        .tables
        .iter()
        .enumerate()
        .filter_map(|(index, table)| TableTree::reconstruct(index, table))
        .collect();

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| generated_output(&args.input, "tree_tables_"));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &trees)?;

    eprintln!("{} tree(s) written to {}", trees.len(), path.display());

    Ok(())
}
