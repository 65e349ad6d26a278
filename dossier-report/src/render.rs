//! Report assembly: every form field with its Vietnamese label, with
//! placeholders for anything not provided yet.

use dossier_core::amount::format_amount;
use dossier_core::category::{CURRENT_YEAR, PRIOR_YEAR, REPORTING_YEAR};
use dossier_core::debt::{BankRecord, MemberDebt};
use dossier_core::profile::{MemberBadDebt, ProfileState, ProfitLoss, YesNo};

/// Placeholder for a text field with no value yet.
pub const FIELD_PLACEHOLDER: &str = "....................";
/// Placeholder for an amount or aggregate that is still zero.
pub const PENDING: &str = "...";

/// One labeled report line, optionally with indented sub-lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub label: String,
    pub value: String,
    pub sub: Vec<String>,
}

impl ReportLine {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            sub: Vec::new(),
        }
    }

    fn with_sub(mut self, sub: Vec<String>) -> Self {
        self.sub = sub;
        self
    }
}

/// The assembled report, ready for text or HTML rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub lines: Vec<ReportLine>,
}

/// Amount string with the currency suffix, or the pending marker.
fn currency(value: &str) -> String {
    let v = value.trim();
    if v.is_empty() {
        format!("{PENDING} VNĐ")
    } else {
        format!("{v} VNĐ")
    }
}

fn text_or_placeholder(value: &str) -> String {
    let v = value.trim();
    if v.is_empty() {
        FIELD_PLACEHOLDER.to_string()
    } else {
        v.to_string()
    }
}

/// "(Chi tiết: VCB: 1.500 tỷ, ...)" across the filled rows, or empty when
/// nothing is filled in.
fn corporate_details(banks: &[BankRecord]) -> String {
    let details: Vec<String> = banks
        .iter()
        .filter(|b| b.is_filled())
        .filter_map(|b| Some(format!("{}: {} tỷ", b.bank_display()?, b.amount.trim())))
        .collect();
    if details.is_empty() {
        String::new()
    } else {
        format!(" (Chi tiết: {})", details.join(", "))
    }
}

fn member_details(banks: &[BankRecord]) -> String {
    let details: Vec<String> = banks
        .iter()
        .filter(|b| b.is_filled())
        .filter_map(|b| Some(format!("{} {} tỷ", b.bank_display()?, b.amount.trim())))
        .collect();
    if details.is_empty() {
        String::new()
    } else {
        format!(" ({})", details.join(", "))
    }
}

fn member_line(index: usize, member: &MemberDebt) -> String {
    let name = member.name.trim();
    let display_name = if name.is_empty() {
        format!("Thành viên {}", index + 1)
    } else {
        name.to_string()
    };
    let total = member.total();
    let total_display = if total > 0.0 {
        format!("{} Tỷ", format_amount(total))
    } else {
        PENDING.to_string()
    };
    format!(
        "- {display_name}: {total_display}{}",
        member_details(&member.banks)
    )
}

impl Report {
    pub fn from_state(state: &ProfileState) -> Report {
        let extracted = &state.extracted;
        let answers = &state.answers;
        let mut lines = Vec::new();

        lines.push(ReportLine::new(
            "Công ty",
            text_or_placeholder(&extracted.company_name),
        ));
        lines.push(ReportLine::new(
            "Ngành nghề kinh doanh",
            text_or_placeholder(&extracted.business_line),
        ));
        lines.push(ReportLine::new(
            format!("Doanh thu thuế {PRIOR_YEAR}"),
            currency(&extracted.revenue_prior_year),
        ));
        lines.push(ReportLine::new(
            format!("Doanh thu thuế {CURRENT_YEAR}"),
            currency(&extracted.revenue_current_year),
        ));

        let reporting_total = extracted.reporting_year_total();
        let reporting_display = if reporting_total > 0.0 {
            format!("{} VNĐ", format_amount(reporting_total))
        } else {
            PENDING.to_string()
        };
        lines.push(
            ReportLine::new(
                format!("Doanh thu thuế {REPORTING_YEAR} (Tổng cộng: {reporting_display})"),
                String::new(),
            )
            .with_sub(
                dossier_core::Quarter::ALL
                    .iter()
                    .map(|q| format!("{}: {}", q.label(), currency(extracted.revenue_for(*q))))
                    .collect(),
            ),
        );

        let corporate_total = state.corporate_debt_total();
        let corporate_value = if corporate_total > 0.0 {
            format!("Tổng cộng: {} Tỷ", format_amount(corporate_total))
        } else {
            PENDING.to_string()
        };
        lines.push(ReportLine::new(
            "Dư nợ doanh nghiệp",
            format!("{corporate_value}{}", corporate_details(&state.corporate_banks)),
        ));

        let personal_total = state.personal_debt_total();
        let personal_value = if personal_total > 0.0 {
            format!("(Tổng cộng: {} Tỷ)", format_amount(personal_total))
        } else {
            String::new()
        };
        let mut member_lines: Vec<String> = state
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.has_data())
            .map(|(i, m)| member_line(i, m))
            .collect();
        if member_lines.is_empty() {
            member_lines.push(PENDING.to_string());
        }
        lines.push(
            ReportLine::new("Dư nợ cá nhân các thành viên", personal_value)
                .with_sub(member_lines),
        );

        let mut software: Vec<String> = answers
            .software
            .iter()
            .map(|s| s.label().to_string())
            .collect();
        if !answers.software_other.trim().is_empty() {
            software.push(answers.software_other.trim().to_string());
        }
        let software_display = if software.is_empty() {
            "Không".to_string()
        } else {
            software.join(", ")
        };
        lines.push(ReportLine::new("Phần mềm sử dụng", software_display));

        lines.push(ReportLine::new(
            "Xuất nhập khẩu",
            answers
                .import_export
                .map(|v| v.label().to_string())
                .unwrap_or_else(|| "Không".to_string()),
        ));

        let supermarket = match answers.supermarket {
            Some(YesNo::Yes) => format!("Có ({})", answers.supermarket_name.trim()),
            _ => "Không".to_string(),
        };
        lines.push(ReportLine::new("Cung cấp hàng siêu thị", supermarket));

        let profit_loss = match answers.profit_loss {
            Some(ProfitLoss::Loss) => {
                format!("Có lỗ ({})", currency(&extracted.net_profit_or_loss))
            }
            Some(ProfitLoss::Profit) => "Có lợi nhuận".to_string(),
            None => PENDING.to_string(),
        };
        lines.push(ReportLine::new(
            format!("Báo thuế {CURRENT_YEAR} có lỗ không"),
            profit_loss,
        ));

        lines.push(ReportLine::new(
            "Nợ xấu doanh nghiệp",
            yes_no(answers.corporate_bad_debt),
        ));
        lines.push(ReportLine::new(
            "Nợ xấu cá nhân",
            yes_no(answers.personal_bad_debt),
        ));
        lines.push(ReportLine::new(
            "Thành viên góp vốn nợ xấu",
            match answers.member_bad_debt {
                Some(MemberBadDebt::AtLeastOne) => "Có".to_string(),
                Some(MemberBadDebt::None) => "Không".to_string(),
                Some(MemberBadDebt::Unknown) | None => "Không rõ".to_string(),
            },
        ));

        Report {
            title: "TỔNG HỢP THÔNG TIN DOANH NGHIỆP".to_string(),
            lines,
        }
    }
}

fn yes_no(value: Option<YesNo>) -> String {
    match value {
        Some(YesNo::Yes) => "Có".to_string(),
        _ => "Không".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::debt::Bank;
    use dossier_core::profile::Software;

    fn filled(id: &str, bank: Bank, amount: &str) -> BankRecord {
        BankRecord {
            id: id.to_string(),
            bank: Some(bank),
            other_name: String::new(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_blank_state_renders_placeholders() {
        let report = Report::from_state(&ProfileState::new());
        let company = &report.lines[0];
        assert_eq!(company.value, FIELD_PLACEHOLDER);
        // Every aggregate is pending, never "0".
        let flat = report
            .lines
            .iter()
            .map(|l| format!("{} {}", l.label, l.value))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(flat.contains("Tổng cộng: ..."));
        assert!(!flat.contains("Tổng cộng: 0"));
    }

    #[test]
    fn test_corporate_debt_line_with_details() {
        let mut state = ProfileState::new();
        state.corporate_banks = vec![
            filled("b1", Bank::Vcb, "1.500"),
            BankRecord {
                id: "b2".to_string(),
                bank: Some(Bank::Other),
                other_name: "X".to_string(),
                amount: "2,25".to_string(),
            },
        ];
        let report = Report::from_state(&state);
        let line = report
            .lines
            .iter()
            .find(|l| l.label == "Dư nợ doanh nghiệp")
            .unwrap();
        assert!(line.value.contains("Tổng cộng: 3,75 Tỷ"));
        assert!(line.value.contains("Chi tiết: VCB: 1.500 tỷ, X: 2,25 tỷ"));
    }

    #[test]
    fn test_unfilled_rows_are_left_out_of_details() {
        let mut state = ProfileState::new();
        state.corporate_banks = vec![
            filled("b1", Bank::Acb, "1"),
            BankRecord::blank("b2"),
            BankRecord {
                id: "b3".to_string(),
                bank: Some(Bank::Bidv),
                other_name: String::new(),
                amount: String::new(), // bank chosen but no amount yet
            },
        ];
        let report = Report::from_state(&state);
        let line = report
            .lines
            .iter()
            .find(|l| l.label == "Dư nợ doanh nghiệp")
            .unwrap();
        assert!(line.value.contains("ACB: 1 tỷ"));
        assert!(!line.value.contains("BIDV"));
    }

    #[test]
    fn test_member_lines_and_name_fallback() {
        let mut state = ProfileState::new();
        state.members[0].banks[0] = filled("b1", Bank::Tcb, "0,5");
        let report = Report::from_state(&state);
        let line = report
            .lines
            .iter()
            .find(|l| l.label == "Dư nợ cá nhân các thành viên")
            .unwrap();
        assert_eq!(line.value, "(Tổng cộng: 0,5 Tỷ)");
        assert_eq!(line.sub, vec!["- Thành viên 1: 0,5 Tỷ (TCB 0,5 tỷ)"]);
    }

    #[test]
    fn test_members_without_data_collapse_to_pending() {
        let report = Report::from_state(&ProfileState::new());
        let line = report
            .lines
            .iter()
            .find(|l| l.label == "Dư nợ cá nhân các thành viên")
            .unwrap();
        assert_eq!(line.value, "");
        assert_eq!(line.sub, vec![PENDING.to_string()]);
    }

    #[test]
    fn test_reporting_year_total_in_label() {
        let mut state = ProfileState::new();
        state.extracted.revenue_q1 = "1.000.000".to_string();
        state.extracted.revenue_q2 = "2.000.000".to_string();
        let report = Report::from_state(&state);
        let line = report
            .lines
            .iter()
            .find(|l| l.label.starts_with("Doanh thu thuế 2025"))
            .unwrap();
        assert!(line.label.contains("Tổng cộng: 3.000.000 VNĐ"));
        assert_eq!(line.sub.len(), 4);
        assert_eq!(line.sub[0], "Quý 1: 1.000.000 VNĐ");
        assert_eq!(line.sub[2], "Quý 3: ... VNĐ");
    }

    #[test]
    fn test_software_list_with_other() {
        let mut state = ProfileState::new();
        state.answers.software = vec![Software::Misa, Software::CyberLotus];
        state.answers.software_other = "Fast Accounting".to_string();
        let report = Report::from_state(&state);
        let line = report
            .lines
            .iter()
            .find(|l| l.label == "Phần mềm sử dụng")
            .unwrap();
        assert_eq!(line.value, "Misa, Cyber Lotus, Fast Accounting");
    }

    #[test]
    fn test_loss_answer_pulls_extracted_amount() {
        let mut state = ProfileState::new();
        state.answers.profit_loss = Some(ProfitLoss::Loss);
        state.extracted.net_profit_or_loss = "-120.000.000".to_string();
        let report = Report::from_state(&state);
        let line = report
            .lines
            .iter()
            .find(|l| l.label.starts_with("Báo thuế"))
            .unwrap();
        assert_eq!(line.value, "Có lỗ (-120.000.000 VNĐ)");
    }

    #[test]
    fn test_unanswered_member_bad_debt_is_unknown() {
        let report = Report::from_state(&ProfileState::new());
        let line = report
            .lines
            .iter()
            .find(|l| l.label == "Thành viên góp vốn nợ xấu")
            .unwrap();
        assert_eq!(line.value, "Không rõ");
    }
}
