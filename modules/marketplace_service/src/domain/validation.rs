//! Input validation shared by the domain services

use crate::contract::MarketplaceError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a submitted price into a non-negative decimal with at most two places
pub fn parse_price(raw: &str) -> Result<Decimal, MarketplaceError> {
    let trimmed = raw.trim();
    let price = Decimal::from_str(trimmed)
        .map_err(|_| MarketplaceError::invalid(format!("Price '{}' is not a valid number!", trimmed)))?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(MarketplaceError::invalid("Price cannot be negative!"));
    }

    let price = price.normalize();
    if price.scale() > 2 {
        return Err(MarketplaceError::invalid(
            "Price cannot have more than two decimal places!",
        ));
    }

    Ok(price)
}

pub fn validate_quantity(quantity: i32) -> Result<(), MarketplaceError> {
    if quantity <= 0 {
        return Err(MarketplaceError::invalid("Quantity must be greater than 0!"));
    }
    Ok(())
}

pub fn validate_rating(rating: i32) -> Result<(), MarketplaceError> {
    if !(1..=5).contains(&rating) {
        return Err(MarketplaceError::invalid("Rating must be between 1 and 5!"));
    }
    Ok(())
}

/// Trimmed value of a required text field
pub fn required_text(field: &str, value: &str) -> Result<String, MarketplaceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MarketplaceError::invalid(format!("{} is required!", field)));
    }
    Ok(trimmed.to_string())
}

/// Blank optional strings are stored as `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
