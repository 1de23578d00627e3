//! Month-by-month amortization schedule generation.
//!
//! Consumes a fully resolved loan and produces the instalment table plus
//! aggregate interest and insurance totals. Every monetary figure is
//! rounded to 2 dp at the point of computation: each month's balance
//! depends on the already-rounded principal portion, and the residue left
//! by that chain is absorbed into the final instalment so the balance
//! closes at exactly zero.
//!
//! The insurance overlay is ASRD-style: a flat monthly premium computed
//! once on the original principal, independent of the declining balance.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity::ResolvedLoan;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MAX_TERM_MONTHS};
use crate::{LoanError, LoanResult};

/// Default annual insurance rate in percent (0.36% of initial capital per year).
pub const DEFAULT_INSURANCE_RATE_PERCENT: Decimal = dec!(0.36);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub loan: ResolvedLoan,
    /// Annual insurance rate in percent; defaults to 0.36 when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_insurance_rate_percent: Option<Rate>,
}

/// One instalment of the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleLine {
    /// Month number (1-indexed)
    pub month: u32,
    /// Total debited this month, insurance included
    pub payment_total: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub insurance_premium: Money,
    /// Balance after this instalment, never negative
    pub remaining_balance: Money,
}

/// Totals accumulated across the whole schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleAggregate {
    pub total_interest: Money,
    pub total_insurance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub lines: Vec<ScheduleLine>,
    pub aggregate: ScheduleAggregate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the full amortization schedule for a resolved loan.
pub fn build_schedule(
    input: &ScheduleInput,
) -> LoanResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let loan = &input.loan;
    let insurance_rate = input
        .annual_insurance_rate_percent
        .unwrap_or(DEFAULT_INSURANCE_RATE_PERCENT);

    // Flat premium on the ORIGINAL principal, computed once
    let insurance = (loan.principal * insurance_rate / dec!(100) / dec!(12)).round_dp(2);

    let mut lines = Vec::with_capacity(loan.term_months as usize);
    let mut balance = loan.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_insurance = Decimal::ZERO;

    for month in 1..=loan.term_months {
        let interest = (balance * loan.monthly_rate).round_dp(2);

        // The final instalment clears whatever balance the rounding chain left
        let (principal_portion, payment_total) = if month == loan.term_months {
            let capital = balance.round_dp(2);
            (capital, capital + interest + insurance)
        } else {
            let capital = (loan.payment - interest).round_dp(2);
            (capital, (loan.payment + insurance).round_dp(2))
        };

        balance = (balance - principal_portion).round_dp(2);
        if balance < Decimal::ZERO {
            balance = Decimal::ZERO;
        }

        total_interest += interest;
        total_insurance += insurance;

        lines.push(ScheduleLine {
            month,
            payment_total,
            principal_portion,
            interest_portion: interest,
            insurance_premium: insurance,
            remaining_balance: balance,
        });
    }

    let schedule = AmortizationSchedule {
        lines,
        aggregate: ScheduleAggregate {
            total_interest: total_interest.round_dp(2),
            total_insurance: total_insurance.round_dp(2),
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "insurance_model": "flat premium on initial capital (ASRD)",
        "annual_insurance_rate_percent": insurance_rate,
        "monetary_rounding": "2dp at point of computation",
    });

    Ok(with_metadata(
        "Effective interest amortization with flat insurance overlay",
        &assumptions,
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &ScheduleInput) -> LoanResult<()> {
    let loan = &input.loan;
    if loan.principal <= Decimal::ZERO {
        return Err(LoanError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive.".into(),
        });
    }
    if loan.term_months == 0 || loan.term_months > MAX_TERM_MONTHS {
        return Err(LoanError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Term must be between 1 and {} months.", MAX_TERM_MONTHS),
        });
    }
    if loan.payment <= Decimal::ZERO {
        return Err(LoanError::InvalidInput {
            field: "payment".into(),
            reason: "Payment must be positive.".into(),
        });
    }
    if loan.monthly_rate < Decimal::ZERO {
        return Err(LoanError::InvalidInput {
            field: "monthly_rate".into(),
            reason: "Monthly rate cannot be negative.".into(),
        });
    }
    if let Some(rate) = input.annual_insurance_rate_percent {
        if rate < Decimal::ZERO {
            return Err(LoanError::InvalidInput {
                field: "annual_insurance_rate_percent".into(),
                reason: "Insurance rate cannot be negative.".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
