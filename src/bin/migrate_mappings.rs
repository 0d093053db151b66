use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use variant_gallery::core::raw::object_or_empty;
use variant_gallery::core::{
    CanonicalMapping, PersistedMapping, ProductSnapshot, Settings, prepare_for_save,
};

#[derive(Debug)]
struct CliArgs {
    products_path: PathBuf,
    settings_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct MigrationSummary {
    products: usize,
    legacy: usize,
    empty: usize,
    skipped_without_id: usize,
}

fn main() {
    let _ = variant_gallery::telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let raw = fs::read_to_string(&args.products_path)
        .map_err(|err| format!("failed to read `{}`: {err}", args.products_path.display()))?;
    let products: Vec<ProductSnapshot> =
        serde_json::from_str(&raw).map_err(|err| format!("invalid products json: {err}"))?;

    let settings = match &args.settings_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            Settings::from_json_lenient(&raw)
        }
        None => Settings::default(),
    };

    let mut summary = MigrationSummary::default();
    let mut migrated: IndexMap<String, CanonicalMapping> = IndexMap::new();
    for product in &products {
        let Some(product_id) = product.normalized_id() else {
            summary.skipped_without_id += 1;
            continue;
        };
        summary.products += 1;
        if matches!(
            PersistedMapping::classify(object_or_empty(&product.raw_mapping)),
            PersistedMapping::Legacy(ref entries) if !entries.is_empty()
        ) {
            summary.legacy += 1;
        }
        let mapping = prepare_for_save(&product.raw_mapping, product, &settings);
        if mapping.is_empty() {
            summary.empty += 1;
        }
        migrated.insert(product_id.to_string(), mapping);
    }

    let serialized = serde_json::to_string_pretty(&migrated)
        .map_err(|err| format!("failed to serialize mappings: {err}"))?;
    match &args.output_path {
        Some(path) => fs::write(path, format!("{serialized}\n"))
            .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?,
        None => println!("{serialized}"),
    }

    eprintln!(
        "normalized {} product mappings ({} legacy, {} empty, {} skipped without id)",
        summary.products, summary.legacy, summary.empty, summary.skipped_without_id
    );
    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut products_path = None;
    let mut settings_path = None;
    let mut output_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--settings requires a path".to_owned())?;
                settings_path = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--output requires a path".to_owned())?;
                output_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                println!(
                    "usage: migrate_mappings <products.json> [--settings <settings.json>] [--output <mappings.json>]"
                );
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown flag `{other}`"));
            }
            other => {
                if products_path.is_some() {
                    return Err(format!("unexpected argument `{other}`"));
                }
                products_path = Some(PathBuf::from(other));
            }
        }
    }

    let products_path =
        products_path.ok_or_else(|| "missing <products.json> argument".to_owned())?;
    Ok(CliArgs {
        products_path,
        settings_path,
        output_path,
    })
}
