use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive as _;

use crate::Result;
use crate::error::Error;

/// Coin families with different base-unit precision.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoinKind {
    /// Native DESO, 1e9 nanos per coin.
    Deso,
    /// Creator and DAO coins, 1e18 base units per coin.
    Creator,
}

impl CoinKind {
    #[must_use]
    pub const fn decimals(self) -> u32 {
        match self {
            CoinKind::Deso => 9,
            CoinKind::Creator => 18,
        }
    }
}

/// Converts a coin amount to integer base units, truncating sub-unit dust.
///
/// With `hex_encode` the result is `0x`-prefixed lowercase hex, as DAO coin endpoints expect.
pub fn coins_to_base_units(amount: Decimal, kind: CoinKind, hex_encode: bool) -> Result<String> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::validation(format!(
            "coin amount cannot be negative: {amount}"
        )));
    }

    let scale = Decimal::from(10_u64.pow(kind.decimals()));
    let base_units = amount
        .checked_mul(scale)
        .map(|units| units.trunc())
        .and_then(|units| units.to_u128())
        .ok_or_else(|| {
            Error::validation(format!(
                "unable to represent {amount} coins as {kind:?} base units"
            ))
        })?;

    if hex_encode {
        Ok(format!("{base_units:#x}"))
    } else {
        Ok(base_units.to_string())
    }
}
