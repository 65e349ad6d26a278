//! Interactive questionnaire for the manual answers.

use anyhow::Result;
use dossier_core::profile::{
    ImportExport, ManualAnswers, MemberBadDebt, ProfitLoss, Software, YesNo,
};
use std::io::{self, Write};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Numbered single choice; Enter keeps the answer unset.
fn prompt_choice(label: &str, options: &[&str]) -> Result<Option<usize>> {
    println!("{label}");
    for (i, text) in options.iter().enumerate() {
        println!("  {}. {}", i + 1, text);
    }
    loop {
        let s = prompt("Chọn (Enter để bỏ qua)")?;
        if s.is_empty() {
            return Ok(None);
        }
        if let Ok(n) = s.parse::<usize>() {
            if (1..=options.len()).contains(&n) {
                return Ok(Some(n - 1));
            }
        }
        println!("Lựa chọn không hợp lệ.");
    }
}

fn prompt_software() -> Result<(Vec<Software>, String)> {
    println!("Phần mềm đang sử dụng:");
    for (i, sw) in Software::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, sw.label());
    }
    let picked = prompt("Chọn các số, cách nhau bằng dấu phẩy (Enter nếu không)")?;
    let mut list = Vec::new();
    for part in picked.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Ok(n) = part.parse::<usize>() {
            if (1..=Software::ALL.len()).contains(&n) {
                let sw = Software::ALL[n - 1];
                if !list.contains(&sw) {
                    list.push(sw);
                }
            }
        }
    }
    let other = prompt("Phần mềm khác (Enter nếu không)")?;
    Ok((list, other))
}

pub fn run_questionnaire(answers: &mut ManualAnswers) -> Result<()> {
    println!("Bảng câu hỏi bổ sung\n");

    let (software, software_other) = prompt_software()?;
    answers.software = software;
    answers.software_other = software_other;

    answers.import_export = prompt_choice(
        "\nXuất nhập khẩu?",
        &["Có nhập khẩu", "Có xuất khẩu", "Có cả hai", "Không"],
    )?
    .map(|i| {
        [
            ImportExport::Import,
            ImportExport::Export,
            ImportExport::Both,
            ImportExport::Neither,
        ][i]
    });

    answers.supermarket = prompt_choice("\nCung cấp hàng siêu thị?", &["Có", "Không"])?
        .map(|i| [YesNo::Yes, YesNo::No][i]);
    if answers.supermarket == Some(YesNo::Yes) {
        answers.supermarket_name = prompt("Tên siêu thị")?;
    }

    answers.profit_loss = prompt_choice(
        "\nBáo cáo thuế 2024 có lỗ không?",
        &["Có lỗ", "Có lợi nhuận"],
    )?
    .map(|i| [ProfitLoss::Loss, ProfitLoss::Profit][i]);

    answers.corporate_bad_debt = prompt_choice(
        "\nDoanh nghiệp có nợ xấu (CIC)?",
        &["Có nợ xấu", "Không nợ xấu"],
    )?
    .map(|i| [YesNo::Yes, YesNo::No][i]);

    answers.personal_bad_debt = prompt_choice(
        "\nCá nhân có nợ xấu (CIC)?",
        &["Có nợ xấu", "Không nợ xấu"],
    )?
    .map(|i| [YesNo::Yes, YesNo::No][i]);

    answers.member_bad_debt = prompt_choice(
        "\nThành viên góp vốn có nợ xấu?",
        &["Có ít nhất một người", "Không", "Không rõ"],
    )?
    .map(|i| {
        [
            MemberBadDebt::AtLeastOne,
            MemberBadDebt::None,
            MemberBadDebt::Unknown,
        ][i]
    });

    Ok(())
}
