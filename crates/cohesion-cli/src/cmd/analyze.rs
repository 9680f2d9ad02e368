//! `coh analyze`: reduce analysis records to summaries and export tables.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Args};
use cohesion_core::collection::{self, Collection};
use cohesion_core::config::{Config, PrefixConfig, RenderConfig};
use cohesion_core::error::ErrorCode;
use cohesion_core::export::{self, ExportRow};
use cohesion_core::mapping::{FieldMapping, MappingPreset};
use cohesion_core::record::{Record, RecordSummary, SeriesKind};
use cohesion_core::render::ChartRenderer;
use tracing::{info, warn};

use crate::output::{OutputMode, error_code_of, pretty_kv, pretty_section, render_mode};
use crate::render;

/// Arguments for `coh analyze`.
#[derive(Args, Debug, Default)]
#[command(group(ArgGroup::new("source").required(true).multiple(false)))]
pub struct AnalyzeArgs {
    /// Analyze a single record file.
    #[arg(short, long, group = "source", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Analyze every `*.json` record in a directory.
    #[arg(short, long, group = "source", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Aggregate a collection described by a prefix-config file.
    #[arg(short, long, group = "source", value_name = "CONFIG")]
    pub prefix: Option<PathBuf>,

    /// Field binding preset: `crossed` or `direct`.
    #[arg(long, value_name = "PRESET")]
    pub field_mapping: Option<MappingPreset>,

    /// Chart script handed to the render program.
    #[arg(long, value_name = "SCRIPT")]
    pub chart_script: Option<PathBuf>,

    /// Skip writing CSV tables and charts.
    #[arg(long)]
    pub no_export: bool,
}

/// Settings after merging `cohesion.toml` with flags.
struct Settings {
    mapping: FieldMapping,
    export: bool,
    renderer: Box<dyn ChartRenderer>,
}

impl Settings {
    fn resolve(args: &AnalyzeArgs, config: &Config) -> Self {
        let preset = args.field_mapping.unwrap_or(config.record.field_mapping);
        let render_config = RenderConfig {
            program: config.render.program.clone(),
            script: args
                .chart_script
                .clone()
                .or_else(|| config.render.script.clone()),
        };
        Self {
            mapping: FieldMapping::from_preset(preset),
            export: config.export.enabled && !args.no_export,
            renderer: render::from_config(&render_config),
        }
    }
}

/// Execute `coh analyze`.
///
/// # Errors
///
/// Single-file runs fail on the first error. Directory runs only fail if the
/// directory cannot be listed; unreadable records are skipped and export or
/// render failures are logged with the summary kept. Prefix runs fail on an
/// unreadable config or table write, and log chart failures.
pub fn run_analyze(args: &AnalyzeArgs, config: &Config, output: OutputMode) -> anyhow::Result<()> {
    let settings = Settings::resolve(args, config);
    info!(
        field_mapping = %settings.mapping.preset(),
        export = settings.export,
        "analyze started"
    );

    let summaries = if let Some(path) = &args.file {
        vec![analyze_file(path, &settings)?]
    } else if let Some(dir) = &args.directory {
        analyze_directory(dir, &settings)?
    } else if let Some(config_path) = &args.prefix {
        analyze_prefix(config_path, &settings)?
    } else {
        anyhow::bail!("one of --file, --directory or --prefix is required");
    };

    render_summaries(output, &summaries)
}

fn load_record(path: &Path, settings: &Settings) -> anyhow::Result<Record> {
    Record::load(path, &settings.mapping).with_context(|| format!("analyzing {}", path.display()))
}

fn analyze_file(path: &Path, settings: &Settings) -> anyhow::Result<RecordSummary> {
    let record = load_record(path, settings)?;
    if settings.export {
        export_record(&record, path, settings)?;
    }
    Ok(record.summary)
}

/// Write `<stem>.csv` next to the record and render its chart.
fn export_record(record: &Record, path: &Path, settings: &Settings) -> anyhow::Result<()> {
    let rows = record
        .distributions
        .export_rows(record.name(), SeriesKind::Occurrence);
    let table = path.with_extension("csv");
    write_table(&rows, &table)?;
    render_chart(&table, settings)
}

fn analyze_directory(dir: &Path, settings: &Settings) -> anyhow::Result<Vec<RecordSummary>> {
    let mut summaries = Vec::new();
    let mut skipped = 0_usize;
    let mut export_failures = 0_usize;

    for path in collection::list_records(dir, "")? {
        let record = match load_record(&path, settings) {
            Ok(record) => record,
            Err(error) => {
                skipped += 1;
                warn!(
                    file = %path.display(),
                    code = code_label(&error),
                    error = %format!("{error:#}"),
                    "data corruption; skipping record"
                );
                continue;
            }
        };

        // The record reduced cleanly; an output problem does not discard it.
        let exported = if settings.export {
            export_record(&record, &path, settings)
        } else {
            Ok(())
        };
        if let Err(error) = exported {
            export_failures += 1;
            warn!(
                file = %path.display(),
                code = code_label(&error),
                error = %format!("{error:#}"),
                "export failed; summary kept"
            );
        }
        summaries.push(record.summary);
    }

    info!(
        dir = %dir.display(),
        analyzed = summaries.len(),
        skipped,
        export_failures,
        "directory analyzed"
    );
    Ok(summaries)
}

fn analyze_prefix(config_path: &Path, settings: &Settings) -> anyhow::Result<Vec<RecordSummary>> {
    let prefix = PrefixConfig::load(config_path)?;
    let coll = Collection::load(&prefix.directory, &prefix.prefix, &settings.mapping)?;

    if settings.export {
        for (kind, suffix) in [
            (SeriesKind::Occurrence, ""),
            (SeriesKind::Size, "_size"),
            (SeriesKind::Coefficient, "_coe"),
        ] {
            let table = prefix.output_path(suffix, "csv");
            write_table(&coll.export_rows(kind), &table)?;
            if let Err(error) = render_chart(&table, settings) {
                warn!(
                    table = %table.display(),
                    code = code_label(&error),
                    error = %format!("{error:#}"),
                    "chart render failed; table kept"
                );
            }
        }
    }

    if coll.failures() > 0 {
        warn!(
            skipped = coll.failures(),
            prefix = %prefix.prefix,
            "some records were skipped"
        );
    }
    Ok(coll.iter().map(|(_, r)| r.summary.clone()).collect())
}

fn write_table(rows: &[ExportRow], table: &Path) -> anyhow::Result<()> {
    export::write_csv_file(rows, table)
        .with_context(|| format!("exporting {}", table.display()))?;
    info!(table = %table.display(), rows = rows.len(), "export table written");
    Ok(())
}

/// Render the `.png` sibling of `table`.
fn render_chart(table: &Path, settings: &Settings) -> anyhow::Result<()> {
    let image = table.with_extension("png");
    settings.renderer.render(table, &image)?;
    Ok(())
}

fn code_label(error: &anyhow::Error) -> &'static str {
    error_code_of(error).map_or("", ErrorCode::code)
}

fn render_summaries(output: OutputMode, summaries: &[RecordSummary]) -> anyhow::Result<()> {
    render_mode(
        output,
        summaries,
        |items, w| {
            for s in items {
                writeln!(w, "{}", s.summary_line())?;
            }
            Ok(())
        },
        |items, w| {
            for s in items {
                pretty_section(w, if s.name.is_empty() { "(unnamed)" } else { s.name.as_str() })?;
                pretty_kv(w, "vertices", s.num_v.to_string())?;
                pretty_kv(w, "edges", s.num_e.to_string())?;
                pretty_kv(w, "components", s.num_cc.to_string())?;
                pretty_kv(
                    w,
                    "diameter",
                    format!("mean {:.2}  var {:.2}", s.diameter.mean, s.diameter.variance),
                )?;
                pretty_kv(
                    w,
                    "cluster coeff",
                    format!(
                        "mean {:.2}  var {:.2}",
                        s.cluster_coeff.mean, s.cluster_coeff.variance
                    ),
                )?;
                writeln!(w)?;
            }
            Ok(())
        },
    )
}
