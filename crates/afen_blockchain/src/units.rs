//! Conversion between user-entered decimal amounts and integer base units.

/// Decimals of both the native asset (BNB) and the quote token.
pub const NATIVE_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount: {0}")]
    Invalid(String),

    #[error("amount has {found} fractional digits, at most {max} allowed")]
    TooPrecise { found: usize, max: u8 },

    #[error("amount does not fit in 128 bits")]
    Overflow,
}

/// Parse a non-negative decimal string (`"1.5"`, `"0.02"`, `"3"`, `".5"`)
/// into base units with `decimals` implied decimal places.
pub fn parse_units(amount: &str, decimals: u8) -> Result<u128, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(UnitsError::Invalid(amount.to_string()));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(UnitsError::Invalid(amount.to_string()));
    }
    if frac_part.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            found: frac_part.len(),
            max: decimals,
        });
    }

    let scale = 10u128
        .checked_pow(u32::from(decimals))
        .ok_or(UnitsError::Overflow)?;

    let int_value = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<u128>().map_err(|_| UnitsError::Overflow)?
    };

    let frac_value = if frac_part.is_empty() {
        0
    } else {
        let padding = 10u128.pow(u32::from(decimals) - frac_part.len() as u32);
        frac_part.parse::<u128>().map_err(|_| UnitsError::Overflow)? * padding
    };

    int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or(UnitsError::Overflow)
}

/// Render base units as a decimal string truncated to `precision` places.
pub fn format_units(value: u128, decimals: u8, precision: usize) -> String {
    let scale = 10u128.pow(u32::from(decimals));
    let whole = value / scale;
    if precision == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", value % scale, width = decimals as usize);
    let shown: String = frac.chars().chain(std::iter::repeat('0')).take(precision).collect();
    format!("{whole}.{shown}")
}

/// Parse a JSON-RPC hex quantity such as `"0x1bc16d674ec80000"`.
pub fn parse_hex_quantity(quantity: &str) -> Result<u128, UnitsError> {
    let digits = quantity
        .strip_prefix("0x")
        .ok_or_else(|| UnitsError::Invalid(quantity.to_string()))?;
    if digits.is_empty() {
        return Err(UnitsError::Invalid(quantity.to_string()));
    }
    u128::from_str_radix(digits, 16).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => UnitsError::Overflow,
        _ => UnitsError::Invalid(quantity.to_string()),
    })
}
