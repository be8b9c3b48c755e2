//! Render Cause Analyzer
//!
//! Explains a state transition by reporting the first input that changed.
//! State is scanned before props, keys in enumeration order. Only the first
//! difference is reported. Composite values are reported without their
//! contents since they are compared by identity, not structure.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::value::Inputs;

/// Reason used when no input changed (forced re-renders).
pub const UNKNOWN_REASON: &str = "unknown reason for update, possibly from a forced re-render";

/// Which input mapping a reason refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    State,
    Props,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => f.write_str("state"),
            Self::Props => f.write_str("props"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CauseError {
    #[error("{scope} has keys but no previous {scope} to compare against")]
    MissingPrevious { scope: Scope },
}

/// Compute why a component re-rendered.
///
/// `prev_state`/`next_state` are `None` for components without state.
pub fn reason_for_rerender(
    prev_props: &Inputs,
    prev_state: Option<&Inputs>,
    next_props: &Inputs,
    next_state: Option<&Inputs>,
) -> Result<String, CauseError> {
    if let Some(next_state) = next_state {
        if let Some(reason) = first_change(Scope::State, prev_state, next_state)? {
            return Ok(reason);
        }
    }

    if let Some(reason) = first_change(Scope::Props, Some(prev_props), next_props)? {
        return Ok(reason);
    }

    Ok(UNKNOWN_REASON.to_string())
}

/// Fail-silent variant: any analysis error becomes [`UNKNOWN_REASON`].
pub fn explain(
    prev_props: &Inputs,
    prev_state: Option<&Inputs>,
    next_props: &Inputs,
    next_state: Option<&Inputs>,
) -> String {
    reason_for_rerender(prev_props, prev_state, next_props, next_state).unwrap_or_else(|err| {
        debug!(%err, "render cause unavailable");
        UNKNOWN_REASON.to_string()
    })
}

fn first_change(
    scope: Scope,
    prev: Option<&Inputs>,
    next: &Inputs,
) -> Result<Option<String>, CauseError> {
    if next.is_empty() {
        return Ok(None);
    }
    let Some(prev) = prev else {
        return Err(CauseError::MissingPrevious { scope });
    };

    for (key, new_value) in next.iter() {
        let old_value = prev.get(key).cloned().unwrap_or_default();
        if new_value.is_identical(&old_value) {
            continue;
        }
        let reason = if new_value.is_composite() {
            format!("{scope}[{key}] changed")
        } else {
            format!("{scope}[{key}] changed: '{old_value}' => '{new_value}'")
        };
        return Ok(Some(reason));
    }

    Ok(None)
}
