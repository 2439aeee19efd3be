use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::types::{DorkQuery, SearchResultRecord, StageCounts};
use crate::pipeline::driver::PipelineRunState;

const SEPARATOR_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

/// Files written for one run.
#[derive(Debug, Default)]
pub struct ReportPaths {
    pub report: Option<PathBuf>,
    pub queries: Option<PathBuf>,
    pub pre_classification: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: &'a str,
    brand: &'a str,
    model: &'a str,
    started_at: String,
    counts: &'a StageCounts,
    relevant: &'a [SearchResultRecord],
}

/// Keeps a brand usable as a file name component.
pub fn file_stem(brand: &str) -> String {
    let stem: String = brand
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.').to_string();
    if stem.is_empty() {
        "brand".to_string()
    } else {
        stem
    }
}

pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path)?;
    Ok(())
}

pub fn render_text_report(brand: &str, relevant: &[SearchResultRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Brand Analysis Results for {} ===\n", brand));
    out.push_str(&format!("Total relevant results found: {}\n\n", relevant.len()));
    let total = relevant.len();
    for (i, result) in relevant.iter().enumerate() {
        out.push_str(&format!("Result {}/{}:\n", i + 1, total));
        out.push_str(&format!("Title: {}\n", result.title));
        out.push_str(&format!("Link: {}\n", result.link));
        out.push_str(&format!("Snippet: {}\n", result.snippet));
        out.push('\n');
        out.push_str(&"=".repeat(SEPARATOR_WIDTH));
        out.push_str("\n\n");
    }
    out
}

pub fn write_text_report(state: &PipelineRunState, path: &Path) -> Result<()> {
    fs::write(path, render_text_report(state.brand.as_str(), &state.relevant))?;
    Ok(())
}

pub fn write_json_report(state: &PipelineRunState, path: &Path) -> Result<()> {
    let report = JsonReport {
        run_id: &state.run_id,
        brand: state.brand.as_str(),
        model: &state.model,
        started_at: state.started_at.to_rfc3339(),
        counts: &state.counts,
        relevant: &state.relevant,
    };
    fs::write(path, serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

pub fn write_queries(queries: &[DorkQuery], path: &Path) -> Result<()> {
    let lines: Vec<&str> = queries.iter().map(DorkQuery::as_str).collect();
    fs::write(path, lines.join("\n"))?;
    Ok(())
}

pub fn write_records_json(records: &[SearchResultRecord], path: &Path) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(records)?)?;
    Ok(())
}

/// Writes the relevant-results report, plus queries and pre-classification
/// records when `intermediate` is set. Nothing is written for an empty run.
pub fn write_run(
    state: &PipelineRunState,
    dir: &Path,
    format: ReportFormat,
    intermediate: bool,
) -> Result<ReportPaths> {
    let mut paths = ReportPaths::default();
    let stem = file_stem(state.brand.as_str());

    if intermediate && !state.queries.is_empty() {
        ensure_output_dir(dir)?;
        let path = dir.join(format!("{}_generated_queries.txt", stem));
        write_queries(&state.queries, &path)?;
        paths.queries = Some(path);
    }
    if intermediate && !state.results.is_empty() {
        ensure_output_dir(dir)?;
        let path = dir.join(format!("{}_pre_llm_results.json", stem));
        write_records_json(&state.results, &path)?;
        paths.pre_classification = Some(path);
    }

    if !state.relevant.is_empty() {
        ensure_output_dir(dir)?;
        let path = dir.join(format!("{}_results.{}", stem, format.extension()));
        match format {
            ReportFormat::Text => write_text_report(state, &path)?,
            ReportFormat::Json => write_json_report(state, &path)?,
        }
        paths.report = Some(path);
    }
    Ok(paths)
}
