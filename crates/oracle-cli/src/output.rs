//! Terminal rendering of verdicts, lockouts and module reports.

use chrono::{DateTime, Duration, Local, Utc};
use colored::Colorize;
use oracle_core::{Consultation, Eligibility, GateOutcome, LockoutRecord};

use crate::modules::{ModuleRecord, ModuleReport};

/// Remaining time as `Hh Mm`
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{}h {}m", total / 3600, (total % 3600) / 60)
}

/// Exact expiry in local time
pub fn format_expiry(expires_at: DateTime<Utc>) -> String {
    expires_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Shown before any backend is contacted
pub fn print_consulting(description: &str) {
    println!();
    println!("{}", "🔮  Consulting the Oracle...".bold().cyan());
    println!(
        "{}",
        "The Oracle will now determine if today is worthy of your l33t skills.".dimmed()
    );
    println!("{} {}", "Oracle AI:".dimmed(), description);
}

/// Notice shown when the fallback decided
fn print_degraded(consultation: &Consultation) {
    if let Some(why) = &consultation.degraded {
        println!();
        println!("{} {}", "⚠  Oracle degraded:".yellow().bold(), why.yellow());
        println!(
            "{}",
            "The offline oracle answered instead, and it does not take chances.".dimmed()
        );
    }
}

/// Approved: the module may run
pub fn print_approved(consultation: &Consultation) {
    println!();
    println!("{}", "⚅  THE ORACLE SMILES UPON YOU  ⚅".bold().green());
    println!("{}", consultation.response.reason.green());
    println!("{}", "(Don't mess it up)".dimmed());
}

/// Denied or inconclusive: a lockout was just written
pub fn print_denied(outcome: &GateOutcome) {
    let consultation = &outcome.consultation;
    print_degraded(consultation);

    println!();
    println!("{}", "⚠  THE ORACLE HAS SPOKEN  ⚠".bold().red());
    println!("{}", consultation.lockout_reason().red());
    println!(
        "{} {}",
        "Verdict:".dimmed(),
        format!(
            "{} (via {})",
            consultation.verdict(),
            consultation.response.provider
        )
        .dimmed()
    );

    if let Some(record) = &outcome.lockout {
        println!();
        println!("{}", "You are now locked out for 24 hours.".bold().red());
        println!(
            "{}",
            format!("Lockout expires: {}", format_expiry(record.expires_at)).dimmed()
        );
    }
}

/// An existing lockout blocked the invocation
pub fn print_locked(record: &LockoutRecord, remaining: Duration, corrupted: bool) {
    println!();
    println!("{}", "🔒  ACCESS DENIED  🔒".bold().red());
    println!(
        "{} {} {}",
        "The Oracle has already judged you. You are locked out for".red(),
        format_remaining(remaining).bold().white(),
        "more.".red()
    );
    println!("{} {}", "Reason:".dimmed(), record.reason);
    println!(
        "{}",
        format!("Lockout expires: {}", format_expiry(record.expires_at)).dimmed()
    );
    if corrupted {
        print_corruption_hint();
    } else {
        println!(
            "{}",
            "Use this time to read a book. Maybe not a hacking one."
                .dimmed()
                .italic()
        );
    }
}

fn print_corruption_hint() {
    println!(
        "{}",
        "The lockout state file is unreadable. Run `redteamoracle unlock --confirm --all` to reset it."
            .yellow()
    );
}

/// `status` output
pub fn print_status(identity: &str, eligibility: &Eligibility) {
    println!("{} {}", "Identity:".dimmed(), identity);
    match eligibility {
        Eligibility::Eligible => {
            println!("{} {}", "Status:".bold(), "Eligible".green().bold());
            println!("{}", "No active lockout. The oracle will see you.".dimmed());
        }
        Eligibility::Locked {
            record,
            remaining,
            corrupted,
        } => {
            println!("{} {}", "Status:".bold(), "Locked".red().bold());
            println!("{} {}", "Remaining:".dimmed(), format_remaining(*remaining));
            println!("{} {}", "Expires:".dimmed(), format_expiry(record.expires_at));
            println!("{} {}", "Reason:".dimmed(), record.reason);
            if *corrupted {
                print_corruption_hint();
            }
        }
    }
}

/// Module run output
pub fn print_report(report: &ModuleReport) {
    println!();
    println!("{}", report.title.bold().cyan());
    println!("{}", report.render_table());
    for note in &report.notes {
        println!("{}", note.dimmed());
    }
}

/// `modules` output
pub fn print_modules(modules: &[ModuleRecord]) {
    use tabled::{settings::Style, Table};

    println!("{}", "redteamoracle modules".bold());
    println!("{}", Table::new(modules).with(Style::rounded()));
    println!(
        "{}",
        "All modules are subject to the Oracle's approval before execution.".dimmed()
    );
}
