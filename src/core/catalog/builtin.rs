use crate::core::catalog::{
    Catalog, CatalogBuilder, CatalogError, Category, OperatorTemplate, ParamSpec,
};

/// Catalog holding the stock operator set.
pub fn builtin_catalog() -> Catalog {
    let mut builder = CatalogBuilder::new();
    if let Err(err) = register_builtins(&mut builder) {
        tracing::error!("built-in operator catalog rejected: {}", err);
    }
    builder.build()
}

/// Register the stock operators into the supplied builder.
pub fn register_builtins(builder: &mut CatalogBuilder) -> Result<(), CatalogError> {
    builder
        .register(
            OperatorTemplate::new("html-tag-removal", "HTML Tag Removal", Category::DataCleaning)
                .describe("Strips HTML markup and entities from text records")
                .tagged(&["html", "text", "markup"])
                .popular()
                .param(
                    "keep_links",
                    ParamSpec::radio("Keep link text", &["yes", "no"], "yes"),
                ),
        )?
        .register(
            OperatorTemplate::new("text-dedup", "Text Deduplication", Category::DataCleaning)
                .describe("Removes exact and near-duplicate documents")
                .tagged(&["dedup", "minhash", "text"])
                .popular()
                .param(
                    "algorithm",
                    ParamSpec::select("Algorithm", &["minhash", "simhash", "exact"], "minhash"),
                )
                .param(
                    "similarity_threshold",
                    ParamSpec::range("Similarity threshold", 0.5, 1.0, 0.05, 0.85),
                ),
        )?
        .register(
            OperatorTemplate::new("pii-masking", "PII Masking", Category::DataCleaning)
                .describe("Masks personal identifiers such as phone numbers and e-mail addresses")
                .tagged(&["privacy", "pii", "compliance"])
                .popular()
                .param(
                    "entities",
                    ParamSpec::checkbox(
                        "Entities",
                        &["phone", "email", "id_card", "bank_card", "address"],
                        &["phone", "email"],
                    ),
                )
                .param(
                    "strategy",
                    ParamSpec::radio("Strategy", &["mask", "remove", "hash"], "mask"),
                ),
        )?
        .register(
            OperatorTemplate::new("sensitive-word-filter", "Sensitive Word Filter", Category::Nlp)
                .describe("Replaces words from curated sensitive word lists")
                .tagged(&["text", "compliance"])
                .param(
                    "word_lists",
                    ParamSpec::checkbox(
                        "Word lists",
                        &["political", "violence", "adult", "advertising"],
                        &[],
                    ),
                )
                .param("replacement", ParamSpec::input("Replacement", "***")),
        )?
        .register(
            OperatorTemplate::new("language-filter", "Language Filter", Category::Nlp)
                .describe("Keeps documents written in the selected languages")
                .tagged(&["language", "text"])
                .param(
                    "languages",
                    ParamSpec::checkbox(
                        "Languages",
                        &["zh", "en", "ja", "ko", "fr", "de"],
                        &["zh", "en"],
                    ),
                )
                .param(
                    "min_confidence",
                    ParamSpec::range("Minimum confidence", 0.0, 1.0, 0.01, 0.8),
                ),
        )?
        .register(
            OperatorTemplate::new("image-resize", "Image Resize", Category::Vision)
                .describe("Resizes images to a fixed width and height")
                .tagged(&["image", "resize"])
                .popular()
                .param("width", ParamSpec::range("Width", 16.0, 4096.0, 16.0, 512.0))
                .param("height", ParamSpec::range("Height", 16.0, 4096.0, 16.0, 512.0))
                .param(
                    "interpolation",
                    ParamSpec::select(
                        "Interpolation",
                        &["bilinear", "bicubic", "nearest"],
                        "bilinear",
                    ),
                ),
        )?
        .register(
            OperatorTemplate::new("blur-detection", "Blur Detection", Category::Vision)
                .describe("Drops images whose Laplacian variance is below a threshold")
                .tagged(&["image", "quality"])
                .param(
                    "threshold",
                    ParamSpec::range("Variance threshold", 10.0, 500.0, 10.0, 100.0),
                ),
        )?
        .register(
            OperatorTemplate::new("text-length-filter", "Text Length Filter", Category::Analysis)
                .describe("Filters documents by character count")
                .tagged(&["text", "statistics"])
                .param(
                    "min_chars",
                    ParamSpec::range("Minimum characters", 0.0, 10_000.0, 10.0, 50.0),
                )
                .param(
                    "max_chars",
                    ParamSpec::range("Maximum characters", 10.0, 1_000_000.0, 10.0, 100_000.0),
                ),
        )?
        .register(
            OperatorTemplate::new("format-convert", "Format Conversion", Category::Transform)
                .describe("Converts records between storage formats")
                .tagged(&["format", "jsonl", "parquet"])
                .param(
                    "target_format",
                    ParamSpec::select("Target format", &["jsonl", "parquet", "csv", "txt"], "jsonl"),
                ),
        )?
        .register(
            OperatorTemplate::new("file-export", "File Export", Category::Io)
                .describe("Writes the processed dataset to an output location")
                .tagged(&["export", "storage"])
                .param("output_path", ParamSpec::input("Output path", ""))
                .param(
                    "compression",
                    ParamSpec::select("Compression", &["none", "gzip", "zstd"], "none"),
                ),
        )?
        .register(
            OperatorTemplate::new("numeric-normalize", "Numeric Normalization", Category::Math)
                .describe("Rescales numeric columns")
                .tagged(&["tabular", "scaling"])
                .param(
                    "method",
                    ParamSpec::radio("Method", &["min-max", "z-score"], "min-max"),
                )
                .param(
                    "columns",
                    ParamSpec::input("Columns", "")
                        .with_description("Comma separated column names"),
                ),
        )?
        .register(
            OperatorTemplate::new("quality-scorer", "Quality Scorer", Category::Ml)
                .describe("Scores samples with a classifier and drops low-quality ones")
                .tagged(&["model", "quality", "classifier"])
                .param("model_path", ParamSpec::input("Model path", ""))
                .param(
                    "min_score",
                    ParamSpec::range("Minimum score", 0.0, 1.0, 0.05, 0.6),
                ),
        )?;
    Ok(())
}
