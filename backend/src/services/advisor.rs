//! Shot advisor service: validates requests, runs the rule engine and keeps
//! the session history

use std::borrow::Cow;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    evaluate, resolve_targets, rule_profile, validate_bean_name, validate_dose,
    validate_observation, validate_sensitivity, BeanProfile, CalibrationOverride, Clock,
    CustomTargets, Recommendation, SessionHistory, ShotObservation, ShotRecord, ShotStyle,
    TargetProfile,
};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Shot advisor service shared by all handlers
#[derive(Clone)]
pub struct ShotAdvisorService {
    clock: Arc<dyn Clock + Send + Sync>,
    history: Arc<RwLock<SessionHistory>>,
}

/// Input for resolving targets
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveTargetsInput {
    #[serde(default)]
    pub style: ShotStyle,
    #[validate(custom = "validate_dose_field")]
    pub dose_grams: Decimal,
    #[validate(custom = "validate_custom_targets")]
    pub custom: Option<CustomTargets>,
}

/// Input for evaluating one shot
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_observation_for_style"))]
pub struct EvaluateShotInput {
    #[validate(custom = "validate_bean")]
    pub bean: BeanProfile,
    #[serde(default)]
    pub style: ShotStyle,
    #[validate(custom = "validate_custom_targets")]
    pub custom: Option<CustomTargets>,
    pub observation: ShotObservation,
    #[validate(custom = "validate_calibration")]
    pub calibration: Option<CalibrationOverride>,
}

/// An evaluated shot and its history entry
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedShot {
    pub record_id: Uuid,
    pub recommendation: Recommendation,
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_dose_field(dose: &Decimal) -> Result<(), ValidationError> {
    validate_dose(*dose).map_err(|msg| field_error("dose", msg))
}

fn validate_bean(bean: &BeanProfile) -> Result<(), ValidationError> {
    validate_bean_name(&bean.name).map_err(|msg| field_error("bean_name", msg))
}

fn validate_custom_targets(custom: &CustomTargets) -> Result<(), ValidationError> {
    custom.validate().map_err(|err| {
        let mut error = ValidationError::new("custom_targets");
        error.message = Some(Cow::Owned(err.to_string()));
        error
    })
}

fn validate_calibration(calibration: &CalibrationOverride) -> Result<(), ValidationError> {
    validate_sensitivity(calibration.sensitivity).map_err(|msg| field_error("sensitivity", msg))
}

fn validate_observation_for_style(input: &EvaluateShotInput) -> Result<(), ValidationError> {
    validate_observation(&input.observation, rule_profile(input.style))
        .map_err(|msg| field_error("observation", msg))
}

impl ShotAdvisorService {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            clock,
            history: Arc::new(RwLock::new(SessionHistory::new())),
        }
    }

    /// Resolve ratio, time window and target yield for a style
    pub fn resolve(&self, input: ResolveTargetsInput) -> AppResult<TargetProfile> {
        input.validate()?;
        Ok(resolve_targets(input.style, input.dose_grams, input.custom.as_ref()))
    }

    /// Evaluate a shot and append it to the session history
    pub fn evaluate(&self, input: EvaluateShotInput) -> AppResult<EvaluatedShot> {
        input.validate()?;

        let targets = resolve_targets(
            input.style,
            input.observation.dose_grams,
            input.custom.as_ref(),
        );
        let recommendation = evaluate(
            &input.bean,
            &targets,
            &input.observation,
            input.calibration.as_ref(),
            self.clock.as_ref(),
        );

        tracing::info!(
            style = input.style.as_str(),
            profile = %recommendation.profile,
            grind_delta = %recommendation.grind.delta,
            rules_fired = recommendation.rationale.len(),
            "Evaluated shot for {}",
            input.bean.name
        );
        for firing in &recommendation.rationale {
            tracing::debug!("{}", firing);
        }

        let record = ShotRecord::from_observation(
            &input.bean,
            input.style,
            &input.observation,
            Utc::now(),
        );
        let record_id = record.id;
        let entries = {
            let mut history = self
                .history
                .write()
                .map_err(|_| AppError::Internal("Session history lock poisoned".to_string()))?;
            history.append(record);
            history.len()
        };
        tracing::debug!(record_id = %record_id, entries, "Appended shot to session history");

        Ok(EvaluatedShot {
            record_id,
            recommendation,
        })
    }

    /// Session history in append order
    pub fn history(&self) -> AppResult<Vec<ShotRecord>> {
        let history = self
            .history
            .read()
            .map_err(|_| AppError::Internal("Session history lock poisoned".to_string()))?;
        Ok(history.records().to_vec())
    }

    pub fn history_len(&self) -> AppResult<usize> {
        let history = self
            .history
            .read()
            .map_err(|_| AppError::Internal("Session history lock poisoned".to_string()))?;
        Ok(history.len())
    }
}
