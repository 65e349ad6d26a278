//! Assembled application state: extracted fields plus manual entry.
//!
//! The whole form lives in one serializable `ProfileState`; handlers mutate
//! only the branch they touch. Every mutation path keeps the debt-list
//! invariant from [`crate::debt`].

use crate::amount::parse_amount;
use crate::category::{DocCategory, Quarter};
use crate::debt::{BankRecord, MemberDebt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire names of the fields the extraction client returns, matching the
/// response schemas sent to the model.
pub mod field {
    pub const COMPANY_NAME: &str = "companyName";
    pub const TAX_ID: &str = "taxId";
    pub const BUSINESS_LINE: &str = "businessLine";
    pub const REVENUE: &str = "revenue";
    pub const NET_PROFIT_OR_LOSS: &str = "netProfitOrLoss";
}

/// Fields filled by document extraction. Values are kept verbatim as
/// returned by the model; an empty string means "not extracted yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub business_line: String,
    #[serde(default)]
    pub revenue_prior_year: String,
    #[serde(default)]
    pub revenue_current_year: String,
    #[serde(default)]
    pub net_profit_or_loss: String,
    #[serde(default)]
    pub revenue_q1: String,
    #[serde(default)]
    pub revenue_q2: String,
    #[serde(default)]
    pub revenue_q3: String,
    #[serde(default)]
    pub revenue_q4: String,
}

impl ExtractedFields {
    pub fn revenue_for(&self, quarter: Quarter) -> &str {
        match quarter {
            Quarter::Q1 => &self.revenue_q1,
            Quarter::Q2 => &self.revenue_q2,
            Quarter::Q3 => &self.revenue_q3,
            Quarter::Q4 => &self.revenue_q4,
        }
    }

    fn revenue_for_mut(&mut self, quarter: Quarter) -> &mut String {
        match quarter {
            Quarter::Q1 => &mut self.revenue_q1,
            Quarter::Q2 => &mut self.revenue_q2,
            Quarter::Q3 => &mut self.revenue_q3,
            Quarter::Q4 => &mut self.revenue_q4,
        }
    }

    /// Reporting-year revenue: sum of the four declared quarterly values.
    pub fn reporting_year_total(&self) -> f64 {
        Quarter::ALL
            .iter()
            .map(|q| parse_amount(self.revenue_for(*q)))
            .sum()
    }
}

/// Accounting/invoicing software options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Software {
    #[serde(rename = "misa")]
    Misa,
    #[serde(rename = "easy_invoice")]
    EasyInvoice,
    #[serde(rename = "bkav")]
    Bkav,
    #[serde(rename = "cyber_lotus")]
    CyberLotus,
}

impl Software {
    pub const ALL: [Software; 4] = [
        Software::Misa,
        Software::EasyInvoice,
        Software::Bkav,
        Software::CyberLotus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Software::Misa => "Misa",
            Software::EasyInvoice => "Easy Invoice",
            Software::Bkav => "Bkav",
            Software::CyberLotus => "Cyber Lotus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportExport {
    #[serde(rename = "nhap_khau")]
    Import,
    #[serde(rename = "xuat_khau")]
    Export,
    #[serde(rename = "ca_hai")]
    Both,
    #[serde(rename = "khong")]
    Neither,
}

impl ImportExport {
    pub fn label(&self) -> &'static str {
        match self {
            ImportExport::Import => "Có nhập khẩu",
            ImportExport::Export => "Có xuất khẩu",
            ImportExport::Both => "Cả hai",
            ImportExport::Neither => "Không",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    #[serde(rename = "co")]
    Yes,
    #[serde(rename = "khong")]
    No,
}

/// Outcome declared on the current-year tax report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfitLoss {
    #[serde(rename = "loi")]
    Loss,
    #[serde(rename = "loi_nhuan")]
    Profit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberBadDebt {
    #[serde(rename = "co_mot_nguoi")]
    AtLeastOne,
    #[serde(rename = "khong")]
    None,
    #[serde(rename = "khong_ro")]
    Unknown,
}

/// Flat questionnaire answers. `None` means the question was not answered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualAnswers {
    #[serde(default)]
    pub software: Vec<Software>,
    #[serde(default)]
    pub software_other: String,
    #[serde(default)]
    pub import_export: Option<ImportExport>,
    #[serde(default)]
    pub supermarket: Option<YesNo>,
    #[serde(default)]
    pub supermarket_name: String,
    #[serde(default)]
    pub profit_loss: Option<ProfitLoss>,
    #[serde(default)]
    pub corporate_bad_debt: Option<YesNo>,
    #[serde(default)]
    pub personal_bad_debt: Option<YesNo>,
    #[serde(default)]
    pub member_bad_debt: Option<MemberBadDebt>,
}

/// The whole submitted state of one business profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileState {
    pub created_at_utc: Option<String>,
    pub extracted: ExtractedFields,
    pub corporate_banks: Vec<BankRecord>,
    pub members: Vec<MemberDebt>,
    pub answers: ManualAnswers,
    /// Monotonic counter for row/member ids.
    #[serde(default)]
    next_id: u64,
}

impl ProfileState {
    /// Fresh state: one blank corporate row, one blank member.
    pub fn new() -> Self {
        let mut state = Self {
            created_at_utc: None,
            extracted: ExtractedFields::default(),
            corporate_banks: Vec::new(),
            members: Vec::new(),
            answers: ManualAnswers::default(),
            next_id: 0,
        };
        let bank_id = state.next_id("bank");
        state.corporate_banks.push(BankRecord::blank(bank_id));
        let member_id = state.next_id("member");
        let member_bank_id = state.next_id("bank");
        state
            .members
            .push(MemberDebt::blank(member_id, member_bank_id));
        state
    }

    /// Mint a fresh id like "bank-0003".
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", prefix, self.next_id)
    }

    /// Merge a successful extraction result into the state. Only the fields
    /// belonging to the category are touched, and only when present in the
    /// result; a failed extraction never reaches this point.
    pub fn merge_extraction(&mut self, category: DocCategory, fields: &BTreeMap<String, String>) {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = fields.get(key) {
                *target = value.clone();
            }
        };
        match category {
            DocCategory::Registration => {
                set(&mut self.extracted.company_name, field::COMPANY_NAME);
                set(&mut self.extracted.tax_id, field::TAX_ID);
                set(&mut self.extracted.business_line, field::BUSINESS_LINE);
            }
            DocCategory::FinancialPriorYear => {
                set(&mut self.extracted.revenue_prior_year, field::REVENUE);
            }
            DocCategory::FinancialCurrentYear => {
                set(&mut self.extracted.revenue_current_year, field::REVENUE);
                set(&mut self.extracted.net_profit_or_loss, field::NET_PROFIT_OR_LOSS);
            }
            DocCategory::VatQuarter(q) => {
                if let Some(value) = fields.get(field::REVENUE) {
                    *self.extracted.revenue_for_mut(q) = value.clone();
                }
            }
        }
    }

    pub fn corporate_debt_total(&self) -> f64 {
        crate::debt::debt_total(&self.corporate_banks)
    }

    pub fn personal_debt_total(&self) -> f64 {
        crate::debt::personal_debt_total(&self.members)
    }
}

impl Default for ProfileState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_new_state_has_blank_rows() {
        let state = ProfileState::new();
        assert_eq!(state.corporate_banks.len(), 1);
        assert!(!state.corporate_banks[0].is_filled());
        assert_eq!(state.members.len(), 1);
        assert_eq!(state.members[0].banks.len(), 1);
    }

    #[test]
    fn test_next_id_is_monotonic() {
        let mut state = ProfileState::new();
        let a = state.next_id("bank");
        let b = state.next_id("bank");
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_merge_registration() {
        let mut state = ProfileState::new();
        state.merge_extraction(
            DocCategory::Registration,
            &fields(&[
                ("companyName", "Công ty TNHH ABC"),
                ("taxId", "0312345678"),
                ("businessLine", "Bán buôn thực phẩm. Chi tiết: Bán buôn gạo"),
            ]),
        );
        assert_eq!(state.extracted.company_name, "Công ty TNHH ABC");
        assert_eq!(state.extracted.tax_id, "0312345678");
        assert!(state.extracted.business_line.contains("Chi tiết:"));
    }

    #[test]
    fn test_merge_only_touches_category_fields() {
        let mut state = ProfileState::new();
        state.extracted.company_name = "giữ nguyên".to_string();
        state.merge_extraction(
            DocCategory::FinancialCurrentYear,
            &fields(&[("revenue", "2.400.000.000"), ("netProfitOrLoss", "-120.000.000")]),
        );
        assert_eq!(state.extracted.company_name, "giữ nguyên");
        assert_eq!(state.extracted.revenue_current_year, "2.400.000.000");
        assert_eq!(state.extracted.net_profit_or_loss, "-120.000.000");
    }

    #[test]
    fn test_merge_missing_key_leaves_field() {
        let mut state = ProfileState::new();
        state.extracted.revenue_prior_year = "1.000.000".to_string();
        state.merge_extraction(DocCategory::FinancialPriorYear, &fields(&[]));
        assert_eq!(state.extracted.revenue_prior_year, "1.000.000");
    }

    #[test]
    fn test_quarter_merge_and_total() {
        let mut state = ProfileState::new();
        for (q, v) in [
            (Quarter::Q1, "1.000.000"),
            (Quarter::Q2, "2.000.000"),
            (Quarter::Q3, "3.000.000"),
            (Quarter::Q4, "4.000.000"),
        ] {
            state.merge_extraction(DocCategory::VatQuarter(q), &fields(&[("revenue", v)]));
        }
        assert_eq!(state.extracted.reporting_year_total(), 10_000_000.0);
    }

    #[test]
    fn test_state_json_round_trip() {
        let mut state = ProfileState::new();
        state.answers.software = vec![Software::Misa, Software::Bkav];
        state.answers.import_export = Some(ImportExport::Both);
        state.answers.member_bad_debt = Some(MemberBadDebt::Unknown);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"ca_hai\""));
        assert!(json.contains("\"khong_ro\""));
        let back: ProfileState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
