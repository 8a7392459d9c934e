use std::sync::Arc;

use anyhow::{Context, Result};
use tabgraph_core::classify::Lexicon;
use tabgraph_core::{
    AnnotatorClient, ConceptLookup, EmitConfig, Extraction, LookupConfig, Pipeline, ReviewSheet,
};

use super::{generated_output, ProcessArgs};

pub async fn run(args: ProcessArgs) -> Result<()> {
    let mut extraction = Extraction::from_path(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;

    if let Some(review_path) = &args.review {
        let sheet = ReviewSheet::from_path(review_path)
            .with_context(|| format!("loading review sheet {}", review_path.display()))?;
        sheet.apply(&mut extraction);
    }

    let mut pipeline = Pipeline::new();
    if let Some(key_file) = &args.key_file {
        let mut config = LookupConfig::from_key_file(key_file)
            .with_context(|| format!("loading key file {}", key_file.display()))?;
        if !args.ontologies.is_empty() {
            config = config.with_sources(args.ontologies.clone());
        }
        let sources = config.sources.clone();
        let client: Arc<dyn ConceptLookup> = Arc::new(AnnotatorClient::new(config)?);
        pipeline = pipeline.with_concept_lookup(client, Lexicon::default(), sources);
    }

    let output = pipeline.process(&extraction).await?;
    let records = output.emit(EmitConfig {
        provenance: args.provenance.into(),
    });

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| generated_output(&args.input, "relations_"));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)?;

    let stats = &output.stats;
    eprintln!(
        "{} table(s), {} cell(s), {} feature(s) in {} ms",
        stats.tables, stats.cells, stats.features, stats.duration_ms
    );
    eprintln!("{} relation record(s) written to {}", records.len(), path.display());

    Ok(())
}
