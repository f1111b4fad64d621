use super::*;

/// Trims `value` and checks it is 1..=`max` bytes long.
fn validate_label(field: &'static str, value: &str, max: usize) -> Result<String, CurveError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > max {
        return Err(CurveError::InvalidLabel {
            field,
            len: trimmed.len(),
            max,
        });
    }
    Ok(trimmed.to_string())
}

mod admin;
mod curve;
mod graduation;
mod router;

pub use curve::{BuyOutcome, SellOutcome};
pub use graduation::GraduationOutcome;
