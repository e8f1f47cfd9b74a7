//! Currency handling for integer minor-unit prices.
//!
//! All stored prices in Homegrid are integer cents. Two currencies are
//! carried per product (CAD and USD); carts, orders and proposals are
//! denominated in a single currency chosen at cart creation.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    CAD,
    USD,
}

impl Currency {
    /// The ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::CAD => "CAD",
            Self::USD => "USD",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CAD" => Ok(Self::CAD),
            "USD" => Ok(Self::USD),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse() {
        assert_eq!("cad".parse::<Currency>(), Ok(Currency::CAD));
        assert_eq!("USD".parse::<Currency>(), Ok(Currency::USD));
        assert!("EUR".parse::<Currency>().is_err());
    }
}
