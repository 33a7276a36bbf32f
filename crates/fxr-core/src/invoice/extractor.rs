//! USD/EUR rate and total extraction for a single invoice.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::config::{ExtractionConfig, MissingRatePolicy};
use crate::models::rates::{ExtractionResult, FieldValue, RawDocument};

use super::rules::{
    normalize, round_to, FieldSpec, MatchOutcome, AMOUNT_PRECISION, RATE_PRECISION,
};
use super::{InvoiceExtractor, Result};

/// Extracts the exchange rate and total from invoice lines and derives the
/// reverse rate and the EUR total.
#[derive(Debug, Clone)]
pub struct RateExtractor {
    rate: FieldSpec,
    total: FieldSpec,
    missing_rate: MissingRatePolicy,
}

impl RateExtractor {
    /// Create an extractor with the built-in patterns and strict rate policy.
    pub fn new() -> Self {
        Self {
            rate: FieldSpec::exchange_rate(),
            total: FieldSpec::total_amount(),
            missing_rate: MissingRatePolicy::Strict,
        }
    }

    /// Build an extractor from configuration, validating its patterns.
    pub fn from_config(config: &ExtractionConfig) -> crate::Result<Self> {
        Ok(Self {
            rate: FieldSpec::new("exchange_rate", &config.rate_pattern)?,
            total: FieldSpec::new("total_amount", &config.total_pattern)?,
            missing_rate: config.missing_rate,
        })
    }

    /// Set the handling of invoices without a single rate line.
    pub fn with_missing_rate(mut self, policy: MissingRatePolicy) -> Self {
        self.missing_rate = policy;
        self
    }

    pub fn missing_rate(&self) -> MissingRatePolicy {
        self.missing_rate
    }

    fn rate_value(&self, document: &RawDocument, outcome: MatchOutcome) -> Result<Option<Decimal>> {
        match outcome {
            MatchOutcome::Found(token) => {
                let rate = normalize(self.rate.name(), &token)?;
                if rate <= Decimal::ZERO {
                    return Err(ExtractionError::MalformedRate(rate));
                }
                Ok(Some(rate))
            }
            other => {
                let matches = other.match_count();
                debug!("{}: {} rate lines matched", document.name, matches);
                match self.missing_rate {
                    MissingRatePolicy::Strict => Err(ExtractionError::RateNotFound { matches }),
                    MissingRatePolicy::Lenient => Ok(None),
                }
            }
        }
    }

    fn total_value(&self, document: &RawDocument, outcome: MatchOutcome) -> Result<Option<Decimal>> {
        match outcome {
            MatchOutcome::Found(token) => normalize(self.total.name(), &token).map(Some),
            MatchOutcome::Absent => Ok(None),
            MatchOutcome::Ambiguous(n) => {
                debug!("{}: {} total lines matched, leaving total unavailable", document.name, n);
                Ok(None)
            }
        }
    }

    fn convert_total(&self, total: Decimal, rate: Decimal) -> Result<Decimal> {
        total
            .checked_mul(rate)
            .map(|eur| round_to(eur, AMOUNT_PRECISION))
            .ok_or_else(|| ExtractionError::MalformedNumber {
                field: self.total.name().to_string(),
                value: total.to_string(),
            })
    }
}

impl Default for RateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceExtractor for RateExtractor {
    fn extract(&self, document: &RawDocument) -> Result<ExtractionResult> {
        let rate_outcome = self.rate.find(&document.lines);
        let total_outcome = self.total.find(&document.lines);

        let usd_to_eur = self.rate_value(document, rate_outcome)?;
        let total_in_usd = self.total_value(document, total_outcome)?;

        let Some(rate) = usd_to_eur else {
            return Ok(ExtractionResult {
                filename: document.name.clone(),
                usd_to_eur: FieldValue::Unavailable,
                eur_to_usd: FieldValue::Unavailable,
                total_in_usd: total_in_usd.into(),
                total_in_eur: FieldValue::Unavailable,
            });
        };

        let eur_to_usd = Decimal::ONE
            .checked_div(rate)
            .map(|r| round_to(r, RATE_PRECISION))
            .ok_or(ExtractionError::MalformedRate(rate))?;

        let total_in_eur = total_in_usd
            .map(|total| self.convert_total(total, rate))
            .transpose()?;

        debug!(
            "{}: usd_to_eur={} eur_to_usd={} total_in_usd={:?}",
            document.name, rate, eur_to_usd, total_in_usd
        );

        Ok(ExtractionResult {
            filename: document.name.clone(),
            usd_to_eur: FieldValue::Available(rate),
            eur_to_usd: FieldValue::Available(eur_to_usd),
            total_in_usd: total_in_usd.into(),
            total_in_eur: total_in_eur.into(),
        })
    }
}
