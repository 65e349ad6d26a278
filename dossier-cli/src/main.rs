use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dossier_core::debt::BankRecord;
use dossier_core::{Bank, DocCategory, ProfileState, format_amount};
use dossier_extract::{DocumentPayload, Extractor, GeminiBackend};
use dossier_report::{Report, export_file_name, render_body_html, render_document, render_text};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod form;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "dossier",
    version,
    about = "Thu thập thông tin doanh nghiệp: trích xuất AI + nhập liệu thủ công"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create ~/.dossier/ with a fresh profile and default config
    Init,

    /// Extract fields from a document via the AI fallback client
    Extract {
        /// Document file (pdf, jpg, jpeg, png, xml, xlsx, xls)
        file: PathBuf,

        /// registration, financial-2023, financial-2024, vat-q1 .. vat-q4
        #[arg(long)]
        category: DocCategory,
    },

    /// Corporate or member bank-debt rows
    Bank {
        #[command(subcommand)]
        command: BankCommand,
    },

    /// Capital-contributing members
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },

    /// Fill the manual questionnaire interactively
    Answers,

    /// Render the assembled report
    Report {
        /// Print the raw markup instead of text
        #[arg(long)]
        html: bool,

        /// Write a standalone HTML document to this file or directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Current profile state
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Discard the profile and start over
    Reset,
}

#[derive(Subcommand, Debug)]
enum BankCommand {
    /// Add a blank row
    Add {
        /// Member id; the corporate list when omitted
        #[arg(long)]
        member: Option<String>,
    },

    /// Edit a row
    Update {
        id: String,

        #[arg(long)]
        member: Option<String>,

        /// Bank code (TCB, VPB, VIB, ACB, VCB, BIDV, CTG, MBB, STB, OTHER)
        #[arg(long)]
        bank: Option<String>,

        /// Free-text bank name, meaningful with --bank OTHER
        #[arg(long)]
        name: Option<String>,

        /// Amount in tỷ đồng, e.g. 2,25
        #[arg(long)]
        amount: Option<String>,
    },

    /// Remove a row (the last row resets to blank instead)
    Remove {
        id: String,

        #[arg(long)]
        member: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum MemberCommand {
    /// Add a member
    Add {
        #[arg(long)]
        name: Option<String>,
    },

    /// Rename a member
    Rename { id: String, name: String },

    /// Remove a member (the last member resets to blank instead)
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            let p = state::profile_path()?;
            if p.exists() {
                println!("Hồ sơ đã tồn tại: {}", p.display());
            } else {
                let mut profile = ProfileState::new();
                profile.created_at_utc = Some(chrono::Utc::now().to_rfc3339());
                state::write_profile(&profile)?;
                println!("Đã tạo {}", p.display());
            }
            config::init_config()?;
        }

        Command::Extract { file, category } => {
            extract_document(file, category).await?;
        }

        Command::Bank { command } => handle_bank(command)?,

        Command::Member { command } => handle_member(command)?,

        Command::Answers => {
            let mut profile = state::read_profile()?;
            form::run_questionnaire(&mut profile.answers)?;
            state::write_profile(&profile)?;
            println!("\nĐã lưu câu trả lời.");
        }

        Command::Report { html, out } => {
            let profile = state::read_profile()?;
            let report = Report::from_state(&profile);
            if let Some(out) = out {
                let path = if out.is_dir() {
                    out.join(export_file_name(&profile.extracted.tax_id))
                } else {
                    out
                };
                std::fs::write(&path, render_document(&report))
                    .with_context(|| format!("write {}", path.display()))?;
                println!("Đã ghi {}", path.display());
            } else if html {
                print!("{}", render_body_html(&report));
            } else {
                print!("{}", render_text(&report));
            }
        }

        Command::Show { json } => {
            let profile = state::read_profile()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print_summary(&profile)?;
            }
        }

        Command::Reset => {
            print!("Bạn có chắc muốn tạo mới? [y/N] ");
            io::stdout().flush().ok();
            let mut answer = String::new();
            io::stdin().read_line(&mut answer)?;
            if answer.trim().eq_ignore_ascii_case("y") {
                let mut profile = ProfileState::new();
                profile.created_at_utc = Some(chrono::Utc::now().to_rfc3339());
                state::write_profile(&profile)?;
                println!("Đã tạo hồ sơ mới.");
            } else {
                println!("Bỏ qua.");
            }
        }
    }

    Ok(())
}

/// One extraction call: encode the file, run the fallback client, merge on
/// success. Nothing partial is committed on failure.
async fn extract_document(file: PathBuf, category: DocCategory) -> Result<()> {
    let cfg = config::load_config()?;
    // A missing key is fatal before any network attempt.
    let backend = GeminiBackend::from_env(cfg.extraction.base_url.clone())?;
    let payload = DocumentPayload::from_path(&file)?;

    let _lock = state::acquire_extraction_lock(category)?;
    let mut profile = state::read_profile()?;

    let extractor = Extractor::new(
        backend,
        cfg.extraction.models.clone(),
        cfg.extraction.retry_policy(),
    );
    println!("Đang trích xuất {} từ {} ...", category.label(), file.display());

    match extractor.extract(category, payload).await {
        Ok(fields) => {
            tracing::info!("[extract] merging {} fields for {}", fields.len(), category.slug());
            profile.merge_extraction(category, &fields);
            state::write_profile(&profile)?;
            println!("Đã trích xuất:");
            for (key, value) in &fields {
                println!("  {key}: {value}");
            }
            Ok(())
        }
        Err(err) => bail!("Không thể đọc tài liệu. Vui lòng thử lại. ({err})"),
    }
}

/// The bank list a command targets: a member's, or the corporate one.
fn bank_list<'a>(
    profile: &'a mut ProfileState,
    member: Option<&str>,
) -> Result<&'a mut Vec<BankRecord>> {
    match member {
        None => Ok(&mut profile.corporate_banks),
        Some(id) => profile
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .map(|m| &mut m.banks)
            .ok_or_else(|| anyhow::anyhow!("không tìm thấy thành viên '{id}'")),
    }
}

fn handle_bank(command: BankCommand) -> Result<()> {
    match command {
        BankCommand::Add { member } => {
            let mut profile = state::read_profile()?;
            let id = profile.next_id("bank");
            let banks = bank_list(&mut profile, member.as_deref())?;
            dossier_core::add_bank_row(banks, id.clone());
            state::write_profile(&profile)?;
            println!("Đã thêm dòng {id}");
        }

        BankCommand::Update {
            id,
            member,
            bank,
            name,
            amount,
        } => {
            let mut profile = state::read_profile()?;
            let bank_sel = match bank.as_deref() {
                Some(code) => Some(
                    Bank::from_code(code)
                        .with_context(|| format!("mã ngân hàng không hợp lệ '{code}'"))?,
                ),
                None => None,
            };
            let banks = bank_list(&mut profile, member.as_deref())?;
            let updated = dossier_core::update_bank_row(banks, &id, |row| {
                if let Some(b) = bank_sel {
                    row.bank = Some(b);
                }
                if let Some(n) = name {
                    row.other_name = n;
                }
                if let Some(a) = amount {
                    row.amount = a;
                }
            });
            if !updated {
                bail!("không tìm thấy dòng '{id}'");
            }
            state::write_profile(&profile)?;
            println!("Đã cập nhật dòng {id}");
        }

        BankCommand::Remove { id, member } => {
            let mut profile = state::read_profile()?;
            let replacement = profile.next_id("bank");
            let banks = bank_list(&mut profile, member.as_deref())?;
            if !dossier_core::remove_bank_row(banks, &id, replacement) {
                bail!("không tìm thấy dòng '{id}'");
            }
            state::write_profile(&profile)?;
            println!("Đã xóa dòng {id}");
        }
    }
    Ok(())
}

fn handle_member(command: MemberCommand) -> Result<()> {
    match command {
        MemberCommand::Add { name } => {
            let mut profile = state::read_profile()?;
            let member_id = profile.next_id("member");
            let bank_id = profile.next_id("bank");
            dossier_core::add_member(&mut profile.members, member_id.clone(), bank_id);
            if let Some(name) = name {
                if let Some(m) = profile.members.last_mut() {
                    m.name = name;
                }
            }
            state::write_profile(&profile)?;
            println!("Đã thêm thành viên {member_id}");
        }

        MemberCommand::Rename { id, name } => {
            let mut profile = state::read_profile()?;
            let Some(m) = profile.members.iter_mut().find(|m| m.id == id) else {
                bail!("không tìm thấy thành viên '{id}'");
            };
            m.name = name;
            state::write_profile(&profile)?;
            println!("Đã đổi tên thành viên {id}");
        }

        MemberCommand::Remove { id } => {
            let mut profile = state::read_profile()?;
            let member_replacement = profile.next_id("member");
            let bank_replacement = profile.next_id("bank");
            if !dossier_core::remove_member(
                &mut profile.members,
                &id,
                member_replacement,
                bank_replacement,
            ) {
                bail!("không tìm thấy thành viên '{id}'");
            }
            state::write_profile(&profile)?;
            println!("Đã xóa thành viên {id}");
        }
    }
    Ok(())
}

fn print_summary(profile: &ProfileState) -> Result<()> {
    let or_pending = |s: &str| {
        if s.trim().is_empty() {
            "(chưa có)".to_string()
        } else {
            s.trim().to_string()
        }
    };

    println!("Hồ sơ: {}", state::profile_path()?.display());
    println!("- Công ty: {}", or_pending(&profile.extracted.company_name));
    println!("- MST: {}", or_pending(&profile.extracted.tax_id));
    println!(
        "- Ngành nghề: {}",
        or_pending(&profile.extracted.business_line)
    );
    println!(
        "- Doanh thu 2025 (4 quý): {} VNĐ",
        format_amount(profile.extracted.reporting_year_total())
    );

    println!(
        "- Dư nợ doanh nghiệp ({} Tỷ):",
        format_amount(profile.corporate_debt_total())
    );
    for row in &profile.corporate_banks {
        print_bank_row(row);
    }

    println!(
        "- Thành viên ({} Tỷ):",
        format_amount(profile.personal_debt_total())
    );
    for member in &profile.members {
        println!("    {}: {}", member.id, or_pending(&member.name));
        for row in &member.banks {
            print_bank_row(row);
        }
    }
    Ok(())
}

fn print_bank_row(row: &BankRecord) {
    println!(
        "    {}: {} {}",
        row.id,
        row.bank_display().unwrap_or("(chưa chọn)"),
        if row.amount.trim().is_empty() {
            "-"
        } else {
            row.amount.trim()
        }
    );
}
