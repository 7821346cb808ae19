use crate::error::Result;
use crate::model::SnippetConfig;
use crate::registry::{MarkerIssue, Notice, UpgradeReport};
use clap::ValueEnum;
use colored::Colorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

fn version_of(cfg: &SnippetConfig) -> String {
    cfg.common()
        .version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".into())
}

fn minimal_line(cfg: &SnippetConfig) -> String {
    format!(
        "{:24} {:20} {:12} {}",
        cfg.id(),
        truncate(cfg.name(), 20),
        cfg.kind(),
        version_of(cfg)
    )
}

pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        let truncated: String = text.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

pub fn print_snippet(cfg: &SnippetConfig, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(cfg)?),
        Format::Pretty => {
            println!("[{}] {} ({})", cfg.id(), cfg.name().bold(), cfg.kind());
            println!(
                "  version: {} | file: {}",
                version_of(cfg),
                cfg.file_name()
            );
            match cfg {
                SnippetConfig::Task(task) => {
                    if let Some(size) = task.base_font_size {
                        println!("  base font size: {size}px");
                    }
                    for entry in task.rendered_entries() {
                        let light = entry.checkbox.light_mode.foreground.as_deref().unwrap_or("-");
                        let dark = entry.checkbox.dark_mode.foreground.as_deref().unwrap_or("-");
                        let marker = if entry.is_unchecked() {
                            "unchecked".to_string()
                        } else {
                            format!("[{}]", entry.data)
                        };
                        println!("  {marker:10} light {light:10} dark {dark}");
                    }
                }
                SnippetConfig::Folder(folder) => {
                    if folder.folders.is_empty() {
                        println!("  no folders");
                    }
                    for entry in &folder.folders {
                        let light = entry.light_mode.foreground.as_deref().unwrap_or("-");
                        let dark = entry.dark_mode.foreground.as_deref().unwrap_or("-");
                        println!("  {:20} light {light:10} dark {dark}", entry.target);
                    }
                }
            }
        }
        Format::Minimal => println!("{}", minimal_line(cfg)),
    }
    Ok(())
}

pub fn print_snippets(snippets: &[&SnippetConfig], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(snippets)?),
        Format::Pretty => {
            if snippets.is_empty() {
                println!("{}", "no snippets".dimmed());
            }
            for cfg in snippets {
                print_snippet(cfg, Format::Pretty)?;
                println!();
            }
        }
        Format::Minimal => {
            println!("{:24} {:20} {:12} VERSION", "ID", "NAME", "TYPE");
            println!("{}", "-".repeat(66));
            for cfg in snippets {
                println!("{}", minimal_line(cfg));
            }
        }
    }
    Ok(())
}

pub fn print_notice(notice: &Notice, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(notice)?),
        Format::Pretty => {
            let tag = if notice.ok {
                " ok ".green().to_string()
            } else {
                "FAIL".red().bold().to_string()
            };
            println!("[{tag}] {}", notice.message);
        }
        Format::Minimal => println!("{}", notice.message),
    }
    Ok(())
}

pub fn print_upgrade_report(report: &UpgradeReport, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(report)?),
        Format::Pretty => {
            let mode = if report.dry_run { "dry-run" } else { "apply" };
            println!("{} ({mode})", "Snippet upgrade".bold());
            for up in &report.upgraded {
                println!(
                    "  {} {} {} -> {}",
                    up.id,
                    up.name,
                    up.from.as_deref().unwrap_or("unversioned").yellow(),
                    up.to.green()
                );
            }
            println!(
                "  upgraded: {} | unchanged: {} | skipped: {}",
                report.upgraded.len(),
                report.unchanged,
                report.skipped.len()
            );
            for key in &report.skipped {
                println!("  {} {key} (unreadable, kept as stored)", "skip".yellow());
            }
        }
        Format::Minimal => println!(
            "dry_run={} upgraded={} unchanged={} skipped={}",
            report.dry_run,
            report.upgraded.len(),
            report.unchanged,
            report.skipped.len()
        ),
    }
    Ok(())
}

pub fn print_marker_issues(
    cfg: &SnippetConfig,
    issues: &[MarkerIssue],
    format: Format,
) -> Result<()> {
    match format {
        Format::Json => {
            let issues: Vec<_> = issues
                .iter()
                .map(|i| {
                    json!({
                        "index": i.index,
                        "data": i.data,
                        "problem": i.problem,
                        "message": i.message(),
                    })
                })
                .collect();
            println!(
                "{}",
                json!({ "id": cfg.id(), "ok": issues.is_empty(), "issues": issues })
            );
        }
        Format::Pretty => {
            if issues.is_empty() {
                println!("[{}] {} has no marker problems", " ok ".green(), cfg.name());
            }
            for issue in issues {
                println!(
                    "[{}] entry {} '{}': {}",
                    "ERR ".red().bold(),
                    issue.index,
                    issue.data,
                    issue.message()
                );
            }
        }
        Format::Minimal => {
            for issue in issues {
                println!("{}\t{:?}\t{}", issue.index, issue.data, issue.message());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("otter", 20), "otter");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("a-very-long-snippet-name", 10), "a-very-...");
    }
}
