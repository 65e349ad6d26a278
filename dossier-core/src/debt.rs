//! Bank and member debt records.
//!
//! Debt lists never go empty: removing the last row replaces it with a blank
//! one, so "no debts" is always represented by a single blank row.

use crate::amount::parse_amount;
use serde::{Deserialize, Serialize};

/// Fixed bank catalog offered by the form, plus a free-text escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    #[serde(rename = "TCB")]
    Tcb,
    #[serde(rename = "VPB")]
    Vpb,
    #[serde(rename = "VIB")]
    Vib,
    #[serde(rename = "ACB")]
    Acb,
    #[serde(rename = "VCB")]
    Vcb,
    #[serde(rename = "BIDV")]
    Bidv,
    #[serde(rename = "CTG")]
    Ctg,
    #[serde(rename = "MBB")]
    Mbb,
    #[serde(rename = "STB")]
    Stb,
    #[serde(rename = "OTHER")]
    Other,
}

impl Bank {
    pub const ALL: [Bank; 10] = [
        Bank::Tcb,
        Bank::Vpb,
        Bank::Vib,
        Bank::Acb,
        Bank::Vcb,
        Bank::Bidv,
        Bank::Ctg,
        Bank::Mbb,
        Bank::Stb,
        Bank::Other,
    ];

    /// Short selector code as used on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Bank::Tcb => "TCB",
            Bank::Vpb => "VPB",
            Bank::Vib => "VIB",
            Bank::Acb => "ACB",
            Bank::Vcb => "VCB",
            Bank::Bidv => "BIDV",
            Bank::Ctg => "CTG",
            Bank::Mbb => "MBB",
            Bank::Stb => "STB",
            Bank::Other => "OTHER",
        }
    }

    /// Full display name.
    pub fn label(&self) -> &'static str {
        match self {
            Bank::Tcb => "Techcombank (TCB)",
            Bank::Vpb => "VPBank (VPB)",
            Bank::Vib => "VIB",
            Bank::Acb => "ACB",
            Bank::Vcb => "Vietcombank (VCB)",
            Bank::Bidv => "BIDV",
            Bank::Ctg => "VietinBank (CTG)",
            Bank::Mbb => "MBBank (MBB)",
            Bank::Stb => "Sacombank (STB)",
            Bank::Other => "Khác",
        }
    }

    pub fn from_code(code: &str) -> Option<Bank> {
        let upper = code.to_uppercase();
        Bank::ALL.into_iter().find(|b| b.code() == upper)
    }
}

/// One debt line: a bank and an amount string (in tỷ đồng).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    pub id: String,
    /// `None` until the user picks a bank.
    pub bank: Option<Bank>,
    /// Free-text bank name, meaningful only when `bank` is `Other`.
    #[serde(default)]
    pub other_name: String,
    /// Amount as typed; parsed lazily for totals.
    #[serde(default)]
    pub amount: String,
}

impl BankRecord {
    /// A fresh, unfilled row.
    pub fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bank: None,
            other_name: String::new(),
            amount: String::new(),
        }
    }

    /// Display name for the selected bank, if any. `Other` falls back to the
    /// free-text name.
    pub fn bank_display(&self) -> Option<&str> {
        match self.bank? {
            Bank::Other => {
                let name = self.other_name.trim();
                Some(if name.is_empty() { "Khác" } else { name })
            }
            b => Some(b.code()),
        }
    }

    /// A row appears in report detail lines only when both a bank is
    /// selected and an amount has been typed.
    pub fn is_filled(&self) -> bool {
        self.bank.is_some() && !self.amount.trim().is_empty()
    }

    pub fn parsed_amount(&self) -> f64 {
        parse_amount(&self.amount)
    }
}

/// Append a blank row.
pub fn add_bank_row(banks: &mut Vec<BankRecord>, id: impl Into<String>) {
    banks.push(BankRecord::blank(id));
}

/// Remove a row by id. Removing the last remaining row resets it to a blank
/// row under `replacement_id` instead, preserving the one-row floor.
/// Returns false when no row has the given id.
pub fn remove_bank_row(
    banks: &mut Vec<BankRecord>,
    id: &str,
    replacement_id: impl Into<String>,
) -> bool {
    if !banks.iter().any(|b| b.id == id) {
        return false;
    }
    if banks.len() > 1 {
        banks.retain(|b| b.id != id);
    } else {
        banks[0] = BankRecord::blank(replacement_id);
    }
    true
}

/// Apply an edit to the row with the given id. Returns false when absent.
pub fn update_bank_row(
    banks: &mut [BankRecord],
    id: &str,
    edit: impl FnOnce(&mut BankRecord),
) -> bool {
    match banks.iter_mut().find(|b| b.id == id) {
        Some(row) => {
            edit(row);
            true
        }
        None => false,
    }
}

/// Sum of parsed amounts across a bank list.
pub fn debt_total(banks: &[BankRecord]) -> f64 {
    banks.iter().map(BankRecord::parsed_amount).sum()
}

/// A capital-contributing member and their personal bank debts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDebt {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub banks: Vec<BankRecord>,
}

impl MemberDebt {
    /// A fresh member with one blank bank row.
    pub fn blank(id: impl Into<String>, bank_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            banks: vec![BankRecord::blank(bank_id)],
        }
    }

    pub fn total(&self) -> f64 {
        debt_total(&self.banks)
    }

    /// Whether the member contributes anything to the report.
    pub fn has_data(&self) -> bool {
        !self.name.trim().is_empty() || self.banks.iter().any(BankRecord::is_filled)
    }
}

/// Append a fresh member.
pub fn add_member(
    members: &mut Vec<MemberDebt>,
    member_id: impl Into<String>,
    bank_id: impl Into<String>,
) {
    members.push(MemberDebt::blank(member_id, bank_id));
}

/// Remove a member by id with the same one-entry floor as bank rows.
pub fn remove_member(
    members: &mut Vec<MemberDebt>,
    id: &str,
    replacement_member_id: impl Into<String>,
    replacement_bank_id: impl Into<String>,
) -> bool {
    if !members.iter().any(|m| m.id == id) {
        return false;
    }
    if members.len() > 1 {
        members.retain(|m| m.id != id);
    } else {
        members[0] = MemberDebt::blank(replacement_member_id, replacement_bank_id);
    }
    true
}

/// Combined personal debt across every member's banks.
pub fn personal_debt_total(members: &[MemberDebt]) -> f64 {
    members.iter().map(MemberDebt::total).sum()
}
