//! General functions related to finance.
use anyhow::{Result, ensure};

/// Calculates the capital recovery factor (CRF) for a given lifetime and interest rate.
///
/// The CRF is used to annualise capital costs over the lifetime of an asset.
fn capital_recovery_factor(lifetime: f64, interest_rate: f64) -> f64 {
    if interest_rate == 0.0 {
        return 1.0 / lifetime;
    }

    interest_rate / (1.0 - (1.0 + interest_rate).powf(-lifetime))
}

/// Convert a one-off capital expenditure into the equivalent constant annual payment.
///
/// # Arguments
///
/// * `capex` - Capital expenditure (e.g. Eur/MW)
/// * `lifetime` - Amortisation period in years. Must be greater than zero.
/// * `interest_rate` - Interest rate as a fraction. Must be in the range [0, 1).
///
/// # Returns
///
/// The annualised cost (e.g. Eur/MW/year) or an error if the inputs are invalid.
pub fn annuity(capex: f64, lifetime: f64, interest_rate: f64) -> Result<f64> {
    ensure!(capex.is_finite(), "Capital cost must be a finite number");
    ensure!(
        lifetime.is_finite() && lifetime > 0.0,
        "Lifetime must be greater than zero (got {lifetime})"
    );
    ensure!(
        (0.0..1.0).contains(&interest_rate),
        "Interest rate must be in the range [0, 1) (got {interest_rate})"
    );

    Ok(capex * capital_recovery_factor(lifetime, interest_rate))
}
