//! Metrics collection.
//!
//! # Metrics
//! - `chain_adapter_dials_total` (counter): physical connections dialed, by chain
//! - `chain_adapter_submissions_total` (counter): submissions by chain, outcome
//! - `chain_adapter_lookups_total` (counter): lookups by chain, outcome
//! - `chain_adapter_gas_price_fallbacks_total` (counter): polls answered from
//!   the last known good price

/// Outcome label for submissions and lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Rejected,
    NotFound,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Rejected => "rejected",
            Outcome::NotFound => "not_found",
            Outcome::Error => "error",
        }
    }
}

pub fn record_dial(chain: &'static str) {
    metrics::counter!("chain_adapter_dials_total", "chain" => chain).increment(1);
}

pub fn record_submission(chain: &'static str, outcome: Outcome) {
    metrics::counter!(
        "chain_adapter_submissions_total",
        "chain" => chain,
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_lookup(chain: &'static str, outcome: Outcome) {
    metrics::counter!(
        "chain_adapter_lookups_total",
        "chain" => chain,
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_gas_price_fallback(chain: &'static str) {
    metrics::counter!("chain_adapter_gas_price_fallbacks_total", "chain" => chain).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Ok.as_str(), "ok");
        assert_eq!(Outcome::NotFound.as_str(), "not_found");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_dial("iotex");
        record_submission("filecoin", Outcome::Rejected);
        record_lookup("iotex", Outcome::Ok);
        record_gas_price_fallback("iotex");
    }
}
