//! Plan generation — orchestrates the full recommendation pipeline.
//!
//! Flow: candidate query → prompt build → LLM call → parse → link
//! synthesis → allocation → best-effort persistence.
//!
//! Past request validation the pipeline never fails the caller: every
//! degraded path returns a structurally valid plan with an `error` field.

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::query::{find_candidates, MIN_CANDIDATES};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::plan::{PlanDocument, PlanResponse, RecommendationRecord};
use crate::models::reader::ReaderProfile;
use crate::recommend::allocator::{allocate, empty_months};
use crate::recommend::links::synthesize_link;
use crate::recommend::parser::{parse, ParsedRecommendation};
use crate::recommend::prompt::build_prompt;
use crate::store::Store;

const LLM_TEMPERATURE: f32 = 0.7;
const LLM_MAX_TOKENS: u32 = 2000;

/// Runs the generation pipeline for a validated reader profile.
pub async fn generate_plan(
    store: &dyn Store,
    llm: &LlmClient,
    profile: ReaderProfile,
) -> Result<PlanResponse, AppError> {
    let today = Utc::now().date_naive();

    info!(
        "querying candidates for age {} genres {:?}",
        profile.age, profile.selected_genres
    );
    let candidates = find_candidates(store, profile.age, &profile.selected_genres, MIN_CANDIDATES)
        .await
        .map_err(AppError::Internal)?;

    if candidates.is_empty() {
        // Terminal no-candidates state: skip the model entirely.
        warn!("catalog empty after full relaxation; returning empty plan");
        return Ok(empty_plan(today, "No books found in catalog"));
    }
    info!("candidate pool holds {} books", candidates.len());

    let exclude = profile.exclude_list();
    let prioritize = profile.prioritize_list();
    let prompt = build_prompt(&profile, &candidates, &exclude, &prioritize);

    let raw = match llm
        .complete(prompt.system, &prompt.user, LLM_TEMPERATURE, LLM_MAX_TOKENS)
        .await
    {
        Ok(text) => text,
        Err(err) => {
            warn!("LLM call failed: {err}");
            return Ok(empty_plan(today, &format!("LLM error: {err}")));
        }
    };

    let outcome = parse(&raw);
    let records: Vec<RecommendationRecord> =
        outcome.records.into_iter().map(with_link).collect();

    if records.is_empty() {
        let reason = outcome
            .failure
            .map(|f| f.to_string())
            .unwrap_or_else(|| "model returned no usable recommendations".to_string());
        warn!("no records recovered from model output: {reason}");
        return Ok(empty_plan(today, &reason));
    }
    info!("parsed {} recommendation records", records.len());

    let allocated = allocate(&records, today);

    // Persistence is best-effort: the plan is returned even when the write
    // fails, with planId omitted.
    let plan_id = Uuid::new_v4().to_string();
    let document = PlanDocument {
        id: plan_id.clone(),
        reader: profile,
        recommendations: records.clone(),
        current: allocated.current.clone(),
        future: allocated.future.clone(),
        generated_at: Utc::now(),
    };
    let plan_id = match store.insert_plan(document).await {
        Ok(()) => Some(plan_id),
        Err(err) => {
            warn!("plan persistence failed (plan still returned): {err}");
            None
        }
    };

    Ok(PlanResponse {
        current: allocated.current,
        future: allocated.future,
        recommendations: records,
        plan_id,
        error: None,
    })
}

/// Attaches the synthesized storefront link to a parsed recommendation.
fn with_link(parsed: ParsedRecommendation) -> RecommendationRecord {
    RecommendationRecord {
        justbookify_link: synthesize_link(&parsed.name),
        name: parsed.name,
        rationale: parsed.rationale,
        confidence_score: parsed.confidence_score,
        sample_books: parsed.sample_books,
    }
}

fn empty_plan(today: NaiveDate, error: &str) -> PlanResponse {
    PlanResponse {
        current: Vec::new(),
        future: empty_months(today),
        recommendations: Vec::new(),
        plan_id: None,
        error: Some(error.to_string()),
    }
}
