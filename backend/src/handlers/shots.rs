//! HTTP handlers for target resolution and shot evaluation

use axum::{extract::State, Json};
use shared::{ShotRecord, TargetProfile};

use crate::error::AppResult;
use crate::services::advisor::{EvaluateShotInput, EvaluatedShot, ResolveTargetsInput};
use crate::AppState;

/// Resolve the targets for a shot style and dose
pub async fn resolve_shot_targets(
    State(state): State<AppState>,
    Json(input): Json<ResolveTargetsInput>,
) -> AppResult<Json<TargetProfile>> {
    let targets = state.advisor.resolve(input)?;
    Ok(Json(targets))
}

/// Evaluate a shot and record it in the session history
pub async fn evaluate_shot(
    State(state): State<AppState>,
    Json(input): Json<EvaluateShotInput>,
) -> AppResult<Json<EvaluatedShot>> {
    let evaluated = state.advisor.evaluate(input)?;
    Ok(Json(evaluated))
}

/// List the session history in append order
pub async fn list_history(State(state): State<AppState>) -> AppResult<Json<Vec<ShotRecord>>> {
    let records = state.advisor.history()?;
    Ok(Json(records))
}
