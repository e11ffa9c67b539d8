//! Exact conversion between display units (SOL, ETH) and the chain's
//! smallest unit (lamports, wei). No floating point anywhere.

use rust_decimal::Decimal;

use crate::error::WalletError;
use crate::types::ChainTag;

/// Convert a positive display amount into smallest units.
///
/// Rejects zero, negatives, more fractional digits than the chain supports,
/// and values that do not fit the chain's integer width (u64 lamports,
/// u128 wei).
pub fn to_smallest_unit(amount: Decimal, chain: ChainTag) -> Result<u128, WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }

    let amount = amount.normalize();
    let decimals = chain.decimals();
    if amount.scale() > decimals {
        return Err(WalletError::InvalidAmount(format!(
            "{} supports at most {decimals} fractional digits, got {amount}",
            chain.symbol()
        )));
    }

    let too_large = || WalletError::InvalidAmount(format!("amount {amount} is too large"));

    let mantissa = u128::try_from(amount.mantissa()).map_err(|_| too_large())?;
    let factor = 10u128
        .checked_pow(decimals - amount.scale())
        .ok_or_else(too_large)?;
    let value = mantissa.checked_mul(factor).ok_or_else(too_large)?;

    if chain == ChainTag::Solana && value > u64::MAX as u128 {
        return Err(too_large());
    }

    Ok(value)
}

/// Convert a smallest-unit quantity reported by a node into display units.
pub fn from_smallest_unit(value: u128, chain: ChainTag) -> Result<Decimal, WalletError> {
    let out_of_range = || {
        WalletError::BalanceUnavailable(format!(
            "{value} is outside the representable {} range",
            chain.symbol()
        ))
    };

    let signed = i128::try_from(value).map_err(|_| out_of_range())?;
    let amount = Decimal::try_from_i128_with_scale(signed, chain.decimals())
        .map_err(|_| out_of_range())?;
    Ok(amount.normalize())
}
