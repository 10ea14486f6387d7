use cashorcut_core::{Amount, BPS_SCALE};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ngn,
    Usd,
    Gbp,
    Eur,
}

impl Currency {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Ngn => "₦",
            Self::Usd => "$",
            Self::Gbp => "£",
            Self::Eur => "€",
        }
    }
}

/// Renders amounts for display, `₦1,500.00` style.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CurrencyFormat {
    currency: Currency,
}

impl CurrencyFormat {
    pub const fn new(currency: Currency) -> Self {
        Self { currency }
    }

    pub const fn currency(&self) -> Currency {
        self.currency
    }

    pub fn amount(&self, amount: Amount) -> String {
        format!("{}{}.00", self.currency.symbol(), group_thousands(amount))
    }

    /// Multiplier in basis points as `1.05x`.
    pub fn multiplier(&self, multiplier_bps: u64) -> String {
        let scale = u64::from(BPS_SCALE);
        let whole = multiplier_bps / scale;
        let hundredths = multiplier_bps % scale / 100;
        format!("{whole}.{hundredths:02}x")
    }
}

fn group_thousands(amount: Amount) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
