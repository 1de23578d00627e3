//! Nominal-to-periodic rate conversion.
//!
//! Converts a quoted annual percentage rate into the actuarial monthly
//! rate whose twelve-fold compounding reproduces the annual rate. This is
//! the geometric convention used by European lenders, not the naive
//! division by 12.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::Rate;

const NEWTON_ITERATIONS: u32 = 30;
const ROOT_TOLERANCE: Decimal = dec!(0.0000000000001);

/// Convert an annual percentage rate (3.5 meaning 3.5%) into the
/// actuarial monthly rate: `(1 + annual/100)^(1/12) - 1`.
///
/// Returns exactly zero for a zero annual rate, so a zero-rate loan never
/// picks up a spurious rounding artifact from the root extraction.
pub fn annual_to_monthly(annual_rate_percent: Rate) -> Rate {
    if annual_rate_percent.is_zero() {
        return Decimal::ZERO;
    }
    let growth = Decimal::ONE + annual_rate_percent / dec!(100);
    nth_root(growth, 12) - Decimal::ONE
}

/// Newton's method for the nth root of A.
/// x_{k+1} = ((n-1)*x_k + A / x_k^(n-1)) / n
fn nth_root(a: Decimal, n: u32) -> Decimal {
    if a <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if a == Decimal::ONE {
        return Decimal::ONE;
    }
    let n_dec = Decimal::from(n);
    let n_minus_1 = n_dec - Decimal::ONE;

    // Annual growth factors sit near 1, so start the iteration there
    let mut x = a;
    if a > dec!(0.5) && a < dec!(2.0) {
        x = Decimal::ONE + (a - Decimal::ONE) / n_dec;
    }

    for _ in 0..NEWTON_ITERATIONS {
        let mut x_pow = Decimal::ONE;
        for _ in 0..(n - 1) {
            x_pow *= x;
        }
        if x_pow.is_zero() {
            break;
        }
        let x_new = (n_minus_1 * x + a / x_pow) / n_dec;
        if (x_new - x).abs() < ROOT_TOLERANCE {
            return x_new;
        }
        x = x_new;
    }
    x
}
