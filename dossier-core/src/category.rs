//! Document categories driving which extraction prompt and schema is used.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Year covered by the prior-year financial statement.
pub const PRIOR_YEAR: u16 = 2023;
/// Year covered by the current-year financial statement.
pub const CURRENT_YEAR: u16 = 2024;
/// Year the quarterly VAT filings report on.
pub const REPORTING_YEAR: u16 = 2025;

/// Quarterly VAT reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quarter {
    #[serde(rename = "q1")]
    Q1,
    #[serde(rename = "q2")]
    Q2,
    #[serde(rename = "q3")]
    Q3,
    #[serde(rename = "q4")]
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn number(&self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    /// Vietnamese report label ("Quý 1" .. "Quý 4").
    pub fn label(&self) -> &'static str {
        match self {
            Quarter::Q1 => "Quý 1",
            Quarter::Q2 => "Quý 2",
            Quarter::Q3 => "Quý 3",
            Quarter::Q4 => "Quý 4",
        }
    }
}

/// Which kind of document an upload is declared as. The category is chosen
/// by the caller and fixed for the lifetime of one extraction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocCategory {
    /// Business registration certificate (giấy đăng ký kinh doanh).
    Registration,
    /// Prior-year financial statement.
    FinancialPriorYear,
    /// Current-year financial statement.
    FinancialCurrentYear,
    /// Quarterly VAT declaration for the reporting year.
    VatQuarter(Quarter),
}

impl DocCategory {
    pub const ALL: [DocCategory; 7] = [
        DocCategory::Registration,
        DocCategory::FinancialPriorYear,
        DocCategory::FinancialCurrentYear,
        DocCategory::VatQuarter(Quarter::Q1),
        DocCategory::VatQuarter(Quarter::Q2),
        DocCategory::VatQuarter(Quarter::Q3),
        DocCategory::VatQuarter(Quarter::Q4),
    ];

    /// Stable identifier used on the command line and for lock files.
    pub fn slug(&self) -> &'static str {
        match self {
            DocCategory::Registration => "registration",
            DocCategory::FinancialPriorYear => "financial-2023",
            DocCategory::FinancialCurrentYear => "financial-2024",
            DocCategory::VatQuarter(Quarter::Q1) => "vat-q1",
            DocCategory::VatQuarter(Quarter::Q2) => "vat-q2",
            DocCategory::VatQuarter(Quarter::Q3) => "vat-q3",
            DocCategory::VatQuarter(Quarter::Q4) => "vat-q4",
        }
    }

    /// Human label shown in CLI output.
    pub fn label(&self) -> String {
        match self {
            DocCategory::Registration => "Giấy Đăng Ký Kinh Doanh".to_string(),
            DocCategory::FinancialPriorYear => format!("BCTC {}", PRIOR_YEAR),
            DocCategory::FinancialCurrentYear => format!("BCTC {}", CURRENT_YEAR),
            DocCategory::VatQuarter(q) => {
                format!("Tờ khai thuế GTGT {} {}", REPORTING_YEAR, q.label())
            }
        }
    }
}

impl fmt::Display for DocCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for DocCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for cat in DocCategory::ALL {
            if cat.slug() == s {
                return Ok(cat);
            }
        }
        bail!(
            "unknown category '{}' (expected one of: {})",
            s,
            DocCategory::ALL.map(|c| c.slug()).join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        for cat in DocCategory::ALL {
            assert_eq!(cat.slug().parse::<DocCategory>().unwrap(), cat);
        }
    }

    #[test]
    fn test_unknown_slug_is_rejected() {
        assert!("vat-q5".parse::<DocCategory>().is_err());
        assert!("".parse::<DocCategory>().is_err());
    }

    #[test]
    fn test_labels_carry_years() {
        assert!(DocCategory::FinancialPriorYear.label().contains("2023"));
        assert!(DocCategory::VatQuarter(Quarter::Q3).label().contains("Quý 3"));
    }
}
