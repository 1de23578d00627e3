//! Constant-annuity parameter resolution.
//!
//! A fixed-rate loan repaid in equal instalments is fully described by the
//! quadruple (principal, rate, term, payment); fixing any three pins the
//! fourth. The caller names the unknown explicitly via [`UnknownParameter`]
//! and the resolver applies the closed-form annuity identity or its
//! logarithmic inverse. Solving for the rate itself would need an iterative
//! root-finder and is deliberately not offered.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::rates::annual_to_monthly;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MAX_TERM_MONTHS};
use crate::{LoanError, LoanResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Which loan parameter the resolver should derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownParameter {
    Principal,
    Term,
    Payment,
}

/// Resolution request. The annual rate is always required; of the other
/// three fields the one named by `solve_for` must be left out and the
/// remaining two supplied. A zero or negative optional value counts as
/// absent, matching the long-standing 0-means-unknown form convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Money>,
    /// Quoted annual rate in percent (3.5 = 3.5%)
    pub annual_rate_percent: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
    /// Monthly instalment excluding insurance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Money>,
    pub solve_for: UnknownParameter,
}

/// A fully determined loan: every field present and mutually consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLoan {
    pub principal: Money,
    pub annual_rate_percent: Rate,
    pub term_months: u32,
    /// Monthly instalment excluding insurance
    pub payment: Money,
    /// Actuarial monthly rate derived from `annual_rate_percent`
    pub monthly_rate: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive the unknown loan parameter from the three supplied ones.
///
/// Monetary results are rounded to 2 dp; a solved term is always rounded
/// UP to the next whole month so the borrower never underpays the balance.
pub fn resolve_parameters(
    input: &ResolveInput,
) -> LoanResult<ComputationOutput<ResolvedLoan>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.annual_rate_percent < Decimal::ZERO {
        return Err(LoanError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "Annual rate cannot be negative.".into(),
        });
    }

    // 0-or-negative optionals are treated as not supplied
    let principal = input.principal.filter(|v| *v > Decimal::ZERO);
    let term_months = input.term_months.filter(|v| *v > 0);
    let payment = input.payment.filter(|v| *v > Decimal::ZERO);

    if let Some(n) = term_months {
        if n > MAX_TERM_MONTHS {
            return Err(LoanError::InvalidInput {
                field: "term_months".into(),
                reason: format!("Term cannot exceed {} months.", MAX_TERM_MONTHS),
            });
        }
    }

    let monthly_rate = annual_to_monthly(input.annual_rate_percent);

    let resolved = match input.solve_for {
        UnknownParameter::Principal => {
            require_absent(principal.map(|_| ()), "principal")?;
            let n = require_present(term_months, "term_months")?;
            let p = require_present(payment, "payment")?;
            let principal = solve_principal(p, n, monthly_rate);
            ResolvedLoan {
                principal,
                annual_rate_percent: input.annual_rate_percent,
                term_months: n,
                payment: p,
                monthly_rate,
            }
        }
        UnknownParameter::Term => {
            require_absent(term_months.map(|_| ()), "term_months")?;
            let m = require_present(principal, "principal")?;
            let p = require_present(payment, "payment")?;
            let n = solve_term(m, p, monthly_rate, &mut warnings)?;
            ResolvedLoan {
                principal: m,
                annual_rate_percent: input.annual_rate_percent,
                term_months: n,
                payment: p,
                monthly_rate,
            }
        }
        UnknownParameter::Payment => {
            require_absent(payment.map(|_| ()), "payment")?;
            let m = require_present(principal, "principal")?;
            let n = require_present(term_months, "term_months")?;
            let payment = solve_payment(m, n, monthly_rate);
            ResolvedLoan {
                principal: m,
                annual_rate_percent: input.annual_rate_percent,
                term_months: n,
                payment,
                monthly_rate,
            }
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "rate_convention": "actuarial: (1 + annual/100)^(1/12) - 1",
        "term_rounding": "ceiling to whole months",
        "monetary_rounding": "2dp, midpoint-to-even",
    });

    Ok(with_metadata(
        "Constant-annuity closed form",
        &assumptions,
        warnings,
        elapsed,
        resolved,
    ))
}

// ---------------------------------------------------------------------------
// Branch solvers
// ---------------------------------------------------------------------------

/// Present value of the instalment stream: `p * (1 - (1+r)^-n) / r`.
fn solve_principal(payment: Money, term_months: u32, r: Rate) -> Money {
    let principal = if r.is_zero() {
        payment * Decimal::from(term_months)
    } else {
        let factor = (Decimal::ONE + r).powd(Decimal::from(term_months));
        payment * (Decimal::ONE - Decimal::ONE / factor) / r
    };
    principal.round_dp(2)
}

/// Invert the annuity identity for the term:
/// `n = -ln(1 - r*m/p) / ln(1+r)`, rounded up to a whole month.
fn solve_term(
    principal: Money,
    payment: Money,
    r: Rate,
    warnings: &mut Vec<String>,
) -> LoanResult<u32> {
    let n_raw = if r.is_zero() {
        principal / payment
    } else {
        let first_interest = principal * r;
        if payment <= first_interest {
            return Err(LoanError::PaymentTooLow {
                payment,
                first_interest: first_interest.round_dp(2),
            });
        }
        let log_argument = Decimal::ONE - first_interest / payment;
        if log_argument <= Decimal::ZERO {
            return Err(LoanError::InfeasibleParameters(
                "No finite term amortizes this principal at this payment and rate.".into(),
            ));
        }
        -log_argument.ln() / (Decimal::ONE + r).ln()
    };

    let n_ceiled = n_raw.ceil();
    let n = n_ceiled
        .to_u32()
        .ok_or_else(|| LoanError::InfeasibleParameters(format!("Solved term {} is not a representable month count.", n_ceiled)))?;

    if n == 0 {
        return Err(LoanError::InfeasibleParameters(
            "Solved term is zero months.".into(),
        ));
    }
    if n > MAX_TERM_MONTHS {
        return Err(LoanError::InfeasibleParameters(format!(
            "Solved term of {} months exceeds the {} month ceiling.",
            n, MAX_TERM_MONTHS
        )));
    }
    if Decimal::from(n) != n_raw {
        warnings.push(format!(
            "Raw term {} rounded up to {} months; the final instalment shrinks accordingly.",
            n_raw.round_dp(4),
            n
        ));
    }
    Ok(n)
}

/// Annuity payment formula: `p = m * r / (1 - (1+r)^-n)`.
fn solve_payment(principal: Money, term_months: u32, r: Rate) -> Money {
    let payment = if r.is_zero() {
        principal / Decimal::from(term_months)
    } else {
        let factor = (Decimal::ONE + r).powd(Decimal::from(term_months));
        principal * r / (Decimal::ONE - Decimal::ONE / factor)
    };
    payment.round_dp(2)
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn require_present<T>(value: Option<T>, field: &str) -> LoanResult<T> {
    value.ok_or_else(|| {
        LoanError::InsufficientInformation(format!(
            "'{}' must be supplied with a positive value for this resolution.",
            field
        ))
    })
}

fn require_absent(value: Option<()>, field: &str) -> LoanResult<()> {
    match value {
        Some(()) => Err(LoanError::InsufficientInformation(format!(
            "'{}' is marked as the unknown but a value was supplied.",
            field
        ))),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payment_request(principal: Decimal, rate: Decimal, term: u32) -> ResolveInput {
        ResolveInput {
            principal: Some(principal),
            annual_rate_percent: rate,
            term_months: Some(term),
            payment: None,
            solve_for: UnknownParameter::Payment,
        }
    }

    #[test]
    fn test_zero_rate_payment_is_straight_division() {
        let input = payment_request(dec!(120000), dec!(0), 120);
        let resolved = resolve_parameters(&input).unwrap().result;
        assert_eq!(resolved.payment, dec!(1000));
        assert_eq!(resolved.monthly_rate, Decimal::ZERO);
    }

    #[test]
    fn test_zero_treated_as_absent() {
        // payment: Some(0) means "unknown", same as None
        let input = ResolveInput {
            payment: Some(dec!(0)),
            ..payment_request(dec!(120000), dec!(0), 120)
        };
        let resolved = resolve_parameters(&input).unwrap().result;
        assert_eq!(resolved.payment, dec!(1000));
    }

    #[test]
    fn test_unknown_field_supplied_fails_fast() {
        let input = ResolveInput {
            payment: Some(dec!(950)),
            ..payment_request(dec!(120000), dec!(2), 120)
        };
        let err = resolve_parameters(&input).unwrap_err();
        assert!(matches!(err, LoanError::InsufficientInformation(_)));
    }

    #[test]
    fn test_missing_known_field_fails_fast() {
        let input = ResolveInput {
            term_months: None,
            ..payment_request(dec!(120000), dec!(2), 120)
        };
        let err = resolve_parameters(&input).unwrap_err();
        assert!(matches!(err, LoanError::InsufficientInformation(_)));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let input = payment_request(dec!(120000), dec!(-1), 120);
        let err = resolve_parameters(&input).unwrap_err();
        match err {
            LoanError::InvalidInput { field, .. } => assert_eq!(field, "annual_rate_percent"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_term_above_ceiling_rejected() {
        let input = payment_request(dec!(120000), dec!(2), 601);
        let err = resolve_parameters(&input).unwrap_err();
        match err {
            LoanError::InvalidInput { field, .. } => assert_eq!(field, "term_months"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_term_ceiling_emits_warning() {
        // 100000 / 999 = 100.1001... months -> 101 with a warning
        let input = ResolveInput {
            principal: Some(dec!(100000)),
            annual_rate_percent: dec!(0),
            term_months: None,
            payment: Some(dec!(999)),
            solve_for: UnknownParameter::Term,
        };
        let output = resolve_parameters(&input).unwrap();
        assert_eq!(output.result.term_months, 101);
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_exact_zero_rate_term_has_no_warning() {
        let input = ResolveInput {
            principal: Some(dec!(100000)),
            annual_rate_percent: dec!(0),
            term_months: None,
            payment: Some(dec!(1000)),
            solve_for: UnknownParameter::Term,
        };
        let output = resolve_parameters(&input).unwrap();
        assert_eq!(output.result.term_months, 100);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_principal_and_payment_invert_each_other() {
        let payment = resolve_parameters(&payment_request(dec!(250000), dec!(4), 300))
            .unwrap()
            .result
            .payment;

        let input = ResolveInput {
            principal: None,
            annual_rate_percent: dec!(4),
            term_months: Some(300),
            payment: Some(payment),
            solve_for: UnknownParameter::Principal,
        };
        let principal = resolve_parameters(&input).unwrap().result.principal;
        // Both directions round to 2dp, so allow a cent of slack
        assert!(
            (principal - dec!(250000)).abs() <= dec!(5),
            "Recovered principal {} should be within a few currency units of 250000",
            principal
        );
    }
}
