use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use transcript_align::alignment::report::{
    aggregate_summaries, render_marked_content, summarize_run, AlignmentReport, AlignmentSummary,
    ReportMeta, REPORT_SCHEMA_VERSION,
};
use transcript_align::{
    strip_alignment_markers, AlignerConfig, TextAligner, TextAlignerBuilder, TextBlock, Utterance,
};

#[path = "align_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "align_report")]
#[command(about = "Align ASR utterances against text blocks and write a JSON report")]
struct Args {
    /// JSON file with `{ "cases": [{ id, content, utterances }] }`.
    #[arg(long, env = "TRANSCRIPT_ALIGN_INPUT")]
    input: PathBuf,
    /// Aligner config JSON; defaults apply when omitted.
    #[arg(long, env = "TRANSCRIPT_ALIGN_CONFIG")]
    config: Option<PathBuf>,
    /// Report destination; stdout when omitted.
    #[arg(long, env = "TRANSCRIPT_ALIGN_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "TRANSCRIPT_ALIGN_LIMIT")]
    limit: Option<usize>,
    /// Include the `[[utterance_id]]`-marked content of every block.
    #[arg(long, env = "TRANSCRIPT_ALIGN_MARKERS", default_value_t = false)]
    markers: bool,
}

#[derive(Debug, Deserialize)]
struct CaseFile {
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    id: String,
    content: String,
    #[serde(default)]
    utterances: Vec<Utterance>,
}

fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(err) = run() {
        eprintln!("align_report: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let mut cases = load_cases(&args.input)?;
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }
    if cases.is_empty() {
        return Err(format!("No cases found in '{}'.", args.input.display()));
    }

    let aligner = build_aligner(args.config.as_deref())?;

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let mut blocks = Vec::with_capacity(cases.len());
    for case in &cases {
        progress.set_message(case.id.clone());
        blocks.push(align_case(&aligner, case, args.markers));
        progress.inc(1);
    }
    progress.finish_with_message("done");

    let report = AlignmentReport {
        schema_version: REPORT_SCHEMA_VERSION,
        meta: ReportMeta {
            generated_at: Utc::now().to_rfc3339(),
            config_path: args.config.as_ref().map(|p| p.display().to_string()),
            case_count: cases.len(),
        },
        aggregates: aggregate_summaries(&blocks),
        blocks,
    };

    match args.out.as_deref() {
        Some(path) => {
            json_report_formatter::write_report(path, &report)?;
            eprintln!(
                "Wrote {} block(s) ({} completed, {} partial, {} unaligned) to {}",
                report.aggregates.blocks,
                report.aggregates.completed,
                report.aggregates.partially_converted,
                report.aggregates.unaligned,
                path.display()
            );
            Ok(())
        }
        None => json_report_formatter::print_report(&report),
    }
}

fn load_cases(path: &Path) -> Result<Vec<Case>, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read cases file '{}': {err}", path.display()))?;
    let file: CaseFile = serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse cases file '{}': {err}", path.display()))?;
    Ok(file.cases)
}

fn build_aligner(config_path: Option<&Path>) -> Result<TextAligner, String> {
    let config = match config_path {
        Some(path) => AlignerConfig::load(path).map_err(|err| err.to_string())?,
        None => AlignerConfig::default(),
    };
    TextAlignerBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build aligner: {err}"))
}

fn align_case(aligner: &TextAligner, case: &Case, markers: bool) -> AlignmentSummary {
    let block = TextBlock::new(case.id.clone(), strip_alignment_markers(&case.content));
    let mut utterances = case.utterances.clone();
    utterances.sort_by_key(|u| u.begin_ms);

    let result = aligner.align_block_with_words(&block, &utterances);
    let mut summary = summarize_run(&result.run, &utterances, &result.words);
    if markers {
        summary.marked_content = Some(render_marked_content(&result.run));
    }
    summary
}
