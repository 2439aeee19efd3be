use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Result};

use crate::cli::flags::{Cli, Command};
use crate::config::{apply_overrides, load_config, AppConfig, Credentials};
use crate::core::types::Brand;
use crate::dork::generator::{QueryGenerator, Sampling};
use crate::pipeline::driver::{Pipeline, PipelineRunState};
use crate::pipeline::reporter::{ensure_output_dir, file_stem, write_queries, write_run};
use crate::providers::{generation_service, search_service};

const SAMPLE_SIZE: usize = 5;
const SNIPPET_PREVIEW: usize = 200;

pub async fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    let cfg = apply_overrides(cfg, cli.provider.map(Into::into), cli.model.as_deref())?;

    match &cli.command {
        Command::Models => {
            print!("{}", render_models(&cfg));
            Ok(())
        }
        Command::Generate { brand } => run_generate(&cfg, &cli, brand.as_deref()).await,
        Command::Hunt { brand } => run_hunt(&cfg, &cli, brand.as_deref()).await,
    }
}

fn render_models(cfg: &AppConfig) -> String {
    let provider = cfg.generation.provider;
    let mut out = format!("=== Available Models ({}) ===\n", provider);
    for (name, capability) in provider.models() {
        let marker = if *name == cfg.generation.model() { " *" } else { "" };
        out.push_str(&format!("- {}: {}{}\n", name, capability, marker));
    }
    out
}

fn resolve_brand(arg: Option<&str>) -> Result<Brand> {
    let raw = match arg {
        Some(value) => value.to_string(),
        None => {
            print!("Enter brand name to analyze: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line
        }
    };
    Brand::new(raw).ok_or_else(|| anyhow!("brand name cannot be empty"))
}

async fn run_generate(cfg: &AppConfig, cli: &Cli, brand: Option<&str>) -> Result<()> {
    let brand = resolve_brand(brand)?;
    let creds = Credentials::from_env(cfg.generation.provider)?;
    let generator = QueryGenerator::new(
        generation_service(cfg, &creds)?,
        Sampling::from(&cfg.generation),
    );

    // Interactive path: an empty generation is an error, not an empty list.
    let queries = generator
        .try_generate(&brand, cfg.generation.model())
        .await?;
    let valid: Vec<_> = queries.into_iter().filter(|q| q.is_valid()).collect();
    if valid.is_empty() {
        return Err(anyhow!("no valid queries generated for {}", brand));
    }

    println!("Generated {} search queries", valid.len());
    for query in &valid {
        println!("{}", query);
    }

    if cli.save_intermediate {
        ensure_output_dir(&cli.output)?;
        let path = cli
            .output
            .join(format!("{}_generated_queries.txt", file_stem(brand.as_str())));
        write_queries(&valid, &path)?;
        tracing::info!("queries written to {}", path.display());
    }
    Ok(())
}

async fn run_hunt(cfg: &AppConfig, cli: &Cli, brand: Option<&str>) -> Result<()> {
    let brand = resolve_brand(brand)?;
    let creds = Credentials::from_env(cfg.generation.provider)?;
    let pipeline = Pipeline::from_services(
        cfg,
        generation_service(cfg, &creds)?,
        search_service(cfg, &creds)?,
    );

    let state = pipeline.run(brand).await;
    print!("{}", render_summary(&state));

    let paths = write_run(&state, &cli.output, cli.format.into(), cli.save_intermediate)?;
    for path in [&paths.queries, &paths.pre_classification, &paths.report]
        .into_iter()
        .flatten()
    {
        println!("Saved: {}", path.display());
    }
    Ok(())
}

pub fn render_summary(state: &PipelineRunState) -> String {
    let c = &state.counts;
    let mut out = String::new();
    out.push_str(&format!("\n=== Hunt {} for {} ===\n", state.run_id, state.brand));
    out.push_str(&format!("Queries generated: {} ({} valid)\n", c.generated, c.valid));
    out.push_str(&format!(
        "Queries with results: {}/{}\n",
        c.payloads, c.executed
    ));
    out.push_str(&format!("Results analyzed: {}\n", c.classified));
    out.push_str(&format!("Relevant results found: {}\n", c.relevant));

    let sample = state.relevant.len().min(SAMPLE_SIZE);
    if sample > 0 {
        out.push_str("\n=== Sample of Relevant Results ===\n");
    }
    for (i, result) in state.relevant.iter().take(sample).enumerate() {
        let snippet: String = result.snippet.chars().take(SNIPPET_PREVIEW).collect();
        out.push_str(&format!(
            "\nRelevant Result {}/{}:\nTitle: {}\nLink: {}\nSnippet: {}...\n",
            i + 1,
            sample,
            result.title,
            result.link,
            snippet
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use crate::core::types::SearchResultRecord;

    #[test]
    fn models_listing_marks_selected() {
        let cfg = apply_overrides(AppConfig::default(), Some(Provider::Gemini), Some("gemini-1.5-flash"))
            .unwrap();
        let listing = render_models(&cfg);
        assert!(listing.contains("(gemini)"));
        assert!(listing.contains("- gemini-1.5-flash: Large context *"));
        assert!(!listing.contains("llama"));
    }

    #[test]
    fn summary_samples_at_most_five() {
        let mut state = PipelineRunState::new(Brand::new("Acme").unwrap(), "llama3-70b-8192");
        state.relevant = (0..7)
            .map(|i| SearchResultRecord {
                title: format!("T{}", i),
                link: format!("https://{}.glitch.me", i),
                snippet: "x".repeat(500),
                position: i,
                timestamp: state.started_at,
            })
            .collect();
        state.counts.relevant = 7;

        let text = render_summary(&state);
        assert!(text.contains("Relevant results found: 7"));
        assert!(text.contains("Relevant Result 5/5"));
        assert!(!text.contains("Relevant Result 6/"));
        assert!(text.contains(&format!("Snippet: {}...", "x".repeat(200))));
        assert!(!text.contains(&"x".repeat(201)));
    }

    #[test]
    fn explicit_blank_brand_is_rejected() {
        assert!(resolve_brand(Some("  ")).is_err());
        assert_eq!(resolve_brand(Some("Acme")).unwrap().as_str(), "Acme");
    }
}
