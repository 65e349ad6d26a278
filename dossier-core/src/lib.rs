//! dossier-core: Domain types and state for the business-profile form

pub mod amount;
pub mod category;
pub mod debt;
pub mod profile;

pub use amount::{format_amount, parse_amount, sum_amounts};
pub use category::{CURRENT_YEAR, DocCategory, PRIOR_YEAR, Quarter, REPORTING_YEAR};
pub use debt::{
    Bank, BankRecord, MemberDebt, add_bank_row, add_member, debt_total, personal_debt_total,
    remove_bank_row, remove_member, update_bank_row,
};
pub use profile::{
    ExtractedFields, ImportExport, ManualAnswers, MemberBadDebt, ProfileState, ProfitLoss,
    Software, YesNo,
};
