//! Onboarding wizard as a reducer over immutable form snapshots.
//!
//! The screens hold an `OnboardingState`, dispatch `OnboardingAction`s
//! through `update`, and render whatever comes back. Nothing is mutated in
//! place.

use crate::profile::UserProfile;
use crate::{BiometricProfile, Error, NutritionTarget, Result, Sex};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Welcome,
    /// Age and sex
    Personal,
    /// Height and weight
    Body,
    /// Daily calorie and sodium targets
    Goals,
    Complete,
}

impl OnboardingStep {
    fn next(self) -> Self {
        match self {
            OnboardingStep::Welcome => OnboardingStep::Personal,
            OnboardingStep::Personal => OnboardingStep::Body,
            OnboardingStep::Body => OnboardingStep::Goals,
            OnboardingStep::Goals | OnboardingStep::Complete => OnboardingStep::Complete,
        }
    }

    fn previous(self) -> Self {
        match self {
            OnboardingStep::Welcome | OnboardingStep::Personal => OnboardingStep::Welcome,
            OnboardingStep::Body => OnboardingStep::Personal,
            OnboardingStep::Goals => OnboardingStep::Body,
            OnboardingStep::Complete => OnboardingStep::Complete,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OnboardingAction {
    SetAge(u32),
    SetSex(Sex),
    SetHeight(f64),
    SetWeight(f64),
    SetCalorieTarget(u32),
    SetSodiumTarget(u32),
    Next,
    Back,
}

/// Snapshot of the wizard
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OnboardingState {
    pub step: OnboardingStep,
    pub age_years: Option<u32>,
    pub sex: Option<Sex>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub daily_calories: u32,
    pub daily_sodium_mg: u32,
    /// Validation message for the current step, cleared on the next edit
    pub error: Option<String>,
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self {
            step: OnboardingStep::Welcome,
            age_years: None,
            sex: None,
            height_cm: None,
            weight_kg: None,
            daily_calories: NutritionTarget::DEFAULT_CALORIES,
            daily_sodium_mg: NutritionTarget::DEFAULT_SODIUM_MG,
            error: None,
        }
    }
}

impl OnboardingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.step == OnboardingStep::Complete
    }

    /// Apply a sequence of actions, returning the final snapshot
    pub fn apply_all<I>(&self, actions: I) -> Self
    where
        I: IntoIterator<Item = OnboardingAction>,
    {
        actions
            .into_iter()
            .fold(self.clone(), |state, action| update(&state, action))
    }

    fn validate_step(&self) -> std::result::Result<(), String> {
        match self.step {
            OnboardingStep::Welcome | OnboardingStep::Complete => Ok(()),
            OnboardingStep::Personal => {
                match self.age_years {
                    Some(age) if (1..=120).contains(&age) => {}
                    Some(age) => return Err(format!("Age {} is out of range", age)),
                    None => return Err("Age is required".into()),
                }
                if self.sex.is_none() {
                    return Err("Sex is required".into());
                }
                Ok(())
            }
            OnboardingStep::Body => {
                match self.height_cm {
                    Some(h) if h.is_finite() && h > 0.0 => {}
                    Some(h) => return Err(format!("Height {} cm is invalid", h)),
                    None => return Err("Height is required".into()),
                }
                match self.weight_kg {
                    Some(w) if w.is_finite() && w > 0.0 => {}
                    Some(w) => return Err(format!("Weight {} kg is invalid", w)),
                    None => return Err("Weight is required".into()),
                }
                Ok(())
            }
            OnboardingStep::Goals => NutritionTarget::new(self.daily_calories, self.daily_sodium_mg)
                .map(|_| ())
                .map_err(|e| e.to_string()),
        }
    }
}

/// Reduce one action onto a snapshot
pub fn update(state: &OnboardingState, action: OnboardingAction) -> OnboardingState {
    if state.is_complete() {
        return state.clone();
    }

    let mut next = state.clone();
    match action {
        OnboardingAction::SetAge(age) => next.age_years = Some(age),
        OnboardingAction::SetSex(sex) => next.sex = Some(sex),
        OnboardingAction::SetHeight(cm) => next.height_cm = Some(cm),
        OnboardingAction::SetWeight(kg) => next.weight_kg = Some(kg),
        OnboardingAction::SetCalorieTarget(kcal) => next.daily_calories = kcal,
        OnboardingAction::SetSodiumTarget(mg) => next.daily_sodium_mg = mg,
        OnboardingAction::Back => {
            next.step = state.step.previous();
            next.error = None;
            return next;
        }
        OnboardingAction::Next => {
            match state.validate_step() {
                Ok(()) => {
                    next.step = state.step.next();
                    next.error = None;
                    tracing::debug!("Onboarding advanced to {:?}", next.step);
                }
                Err(message) => {
                    tracing::debug!("Onboarding blocked at {:?}: {}", state.step, message);
                    next.error = Some(message);
                }
            }
            return next;
        }
    }

    next.error = None;
    next
}

/// Turn a completed wizard into a validated profile
pub fn finish(state: &OnboardingState) -> Result<UserProfile> {
    if !state.is_complete() {
        return Err(Error::Onboarding(format!(
            "wizard is still at {:?}",
            state.step
        )));
    }

    let missing = |field: &str| Error::Onboarding(format!("{} was never entered", field));
    let biometrics = BiometricProfile::new(
        state.age_years.ok_or_else(|| missing("age"))?,
        state.sex.ok_or_else(|| missing("sex"))?,
        state.height_cm.ok_or_else(|| missing("height"))?,
        state.weight_kg.ok_or_else(|| missing("weight"))?,
    )?;
    let targets = NutritionTarget::new(state.daily_calories, state.daily_sodium_mg)?;

    Ok(UserProfile {
        biometrics,
        targets,
    })
}
