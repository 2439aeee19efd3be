use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::core::hash::stable_run_id;
use crate::core::time::now_utc;
use crate::core::types::{Brand, DorkQuery, RawSearchPayload, SearchResultRecord, Stage, StageCounts};
use crate::dork::generator::{QueryGenerator, Sampling};
use crate::pipeline::classifier::RelevancyClassifier;
use crate::pipeline::normalizer::normalize_results;
use crate::pipeline::searcher::SearchExecutor;
use crate::providers::{SharedGeneration, SharedSearch};

/// Everything one hunt produces, owned by the caller and threaded through each stage.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRunState {
    pub run_id: String,
    pub brand: Brand,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub stage: Stage,
    pub queries: Vec<DorkQuery>,
    #[serde(skip)]
    pub payloads: Vec<RawSearchPayload>,
    pub results: Vec<SearchResultRecord>,
    pub relevant: Vec<SearchResultRecord>,
    pub counts: StageCounts,
}

impl PipelineRunState {
    pub fn new(brand: Brand, model: impl Into<String>) -> Self {
        let model = model.into();
        let started_at = now_utc();
        Self {
            run_id: stable_run_id(brand.as_str(), &model, &started_at),
            brand,
            model,
            started_at,
            stage: Stage::Idle,
            queries: Vec::new(),
            payloads: Vec::new(),
            results: Vec::new(),
            relevant: Vec::new(),
            counts: StageCounts::default(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    fn short_circuit(mut self, reason: &str) -> Self {
        warn!("{}; stopping after {:?}", reason, self.stage);
        self.stage = Stage::Done;
        self
    }
}

/// generate → validate → search → normalize → classify, strictly in sequence.
pub struct Pipeline {
    model: String,
    generator: QueryGenerator,
    executor: SearchExecutor,
    classifier: RelevancyClassifier,
}

impl Pipeline {
    pub fn new(
        model: impl Into<String>,
        generator: QueryGenerator,
        executor: SearchExecutor,
        classifier: RelevancyClassifier,
    ) -> Self {
        Self {
            model: model.into(),
            generator,
            executor,
            classifier,
        }
    }

    pub fn from_services(cfg: &AppConfig, generation: SharedGeneration, search: SharedSearch) -> Self {
        let model = cfg.generation.model().to_string();
        Self {
            generator: QueryGenerator::new(generation.clone(), Sampling::from(&cfg.generation)),
            executor: SearchExecutor::new(search, &cfg.search),
            classifier: RelevancyClassifier::new(generation, model.clone(), &cfg.classifier),
            model,
        }
    }

    pub fn start(&self, brand: Brand) -> PipelineRunState {
        PipelineRunState::new(brand, self.model.clone())
    }

    pub async fn run(&self, brand: Brand) -> PipelineRunState {
        let state = self.start(brand);
        info!("hunt {} started for {} with {}", state.run_id, state.brand, state.model);
        let state = self.generate(state).await;
        let state = self.search(state).await;
        let state = self.normalize(state);
        let state = self.classify(state).await;
        info!(
            "hunt {} done: {} queries, {} results, {} relevant",
            state.run_id, state.counts.valid, state.counts.normalized, state.counts.relevant
        );
        state
    }

    /// Generates queries and drops those failing validation.
    pub async fn generate(&self, mut state: PipelineRunState) -> PipelineRunState {
        if state.is_done() {
            return state;
        }
        state.stage = Stage::Generating;
        let generated = self.generator.generate(&state.brand, &state.model).await;
        state.counts.generated = generated.len();

        state.queries = generated
            .into_iter()
            .filter(|q| {
                let ok = q.is_valid();
                if !ok {
                    debug!("dropping invalid query: {}", q);
                }
                ok
            })
            .collect();
        state.counts.valid = state.queries.len();
        info!(
            "generated {} queries, {} valid",
            state.counts.generated, state.counts.valid
        );

        if state.queries.is_empty() {
            return state.short_circuit("no valid queries generated");
        }
        state
    }

    pub async fn search(&self, mut state: PipelineRunState) -> PipelineRunState {
        if state.is_done() {
            return state;
        }
        state.stage = Stage::Searching;
        state.counts.executed = state.queries.len();
        state.payloads = self.executor.execute_all(&state.queries).await;
        state.counts.payloads = state.payloads.len();
        info!(
            "{} of {} queries returned results",
            state.counts.payloads, state.counts.executed
        );

        if state.payloads.is_empty() {
            return state.short_circuit("no search results found");
        }
        state
    }

    pub fn normalize(&self, mut state: PipelineRunState) -> PipelineRunState {
        if state.is_done() {
            return state;
        }
        state.stage = Stage::Normalizing;
        state.results = normalize_results(&state.payloads);
        state.counts.normalized = state.results.len();
        info!("normalized {} results", state.counts.normalized);

        if state.results.is_empty() {
            return state.short_circuit("no results to analyze");
        }
        state
    }

    pub async fn classify(&self, mut state: PipelineRunState) -> PipelineRunState {
        if state.is_done() {
            return state;
        }
        state.stage = Stage::Classifying;
        state.relevant = self.classifier.filter(&state.brand, &state.results).await;
        state.counts.classified = state.results.len();
        state.counts.relevant = state.relevant.len();
        state.stage = Stage::Done;
        state
    }
}
