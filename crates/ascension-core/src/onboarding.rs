//! Onboarding cursor.
//!
//! New users answer one question per step. Every answer pays a flat XP
//! reward; answering the last step completes onboarding, which in turn
//! unlocks the Initiate badge through the regular badge scan.

use serde::Serialize;

use crate::badges;
use crate::error::ValidationError;
use crate::ledger::Rank;
use crate::user::UserRecord;

/// Number of answered steps needed to finish onboarding.
pub const ONBOARDING_STEPS: u8 = 5;
/// XP credited per answered step (lifetime only).
pub const ONBOARDING_XP: u64 = 100;

/// Where the user stands after an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingProgress {
    /// Next step to answer; `ONBOARDING_STEPS + 1` once complete.
    pub step: u8,
    pub complete: bool,
    /// False when onboarding was already complete and nothing changed.
    pub recorded: bool,
    pub xp_gained: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_up: Option<Rank>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<&'static str>,
}

/// Record `answer` for the user's current step and advance.
///
/// # Errors
///
/// Returns an error if `answer` is blank.
pub fn record_answer(
    user: &mut UserRecord,
    answer: &str,
) -> Result<OnboardingProgress, ValidationError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "answer".into(),
            message: "must not be empty".into(),
        });
    }

    if user.onboarding_complete {
        return Ok(OnboardingProgress {
            step: user.onboarding_step,
            complete: true,
            recorded: false,
            xp_gained: 0,
            rank_up: None,
            badge: None,
        });
    }

    let step = user.onboarding_step.clamp(1, ONBOARDING_STEPS);
    user.onboarding_answers
        .insert(step.to_string(), answer.to_string());
    let rank_up = user.credit_xp(ONBOARDING_XP, false);

    user.onboarding_step = step + 1;
    let mut badge = None;
    if user.onboarding_step > ONBOARDING_STEPS {
        user.onboarding_complete = true;
        badge = badges::scan_new_badge(user);
    }

    Ok(OnboardingProgress {
        step: user.onboarding_step,
        complete: user.onboarding_complete,
        recorded: true,
        xp_gained: ONBOARDING_XP,
        rank_up,
        badge,
    })
}
