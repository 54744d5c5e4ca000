use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::report::{AnalysisResult, PROBABILITY_KEYS};
use crate::view::{all_sections, display, sources, tip_lines};

/// Excel caps sheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;

pub fn export_file_name(now: chrono::DateTime<Local>) -> String {
    format!("betmind_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}

pub fn export_path(dir: Option<&Path>) -> PathBuf {
    let name = export_file_name(Local::now());
    match dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Writes one sheet per report plus a shared `Probabilidades` sheet.
/// Returns the number of sheets written.
pub fn export_reports(path: &Path, reports: &[AnalysisResult]) -> Result<usize> {
    if reports.is_empty() {
        bail!("nenhuma análise para exportar");
    }
    let mut workbook = Workbook::new();

    for (idx, report) in reports.iter().enumerate() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(idx, &report.match_title))?;
        write_rows(sheet, &report_rows(report))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Probabilidades")?;
        write_rows(sheet, &probability_rows(reports))?;
    }

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(reports.len() + 1)
}

fn sheet_name(idx: usize, title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' | '\'' => ' ',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();
    let prefix = format!("{} ", idx + 1);
    let base = if cleaned.is_empty() { "Jogo" } else { cleaned };
    let room = MAX_SHEET_NAME - prefix.chars().count();
    format!("{prefix}{}", base.chars().take(room).collect::<String>())
        .trim_end()
        .to_string()
}

pub fn report_rows(report: &AnalysisResult) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec!["Seção".to_string(), "Campo".to_string(), "Valor".to_string()],
        vec![
            "Partida".to_string(),
            "Título".to_string(),
            display(&report.match_title),
        ],
    ];
    for line in tip_lines(report) {
        rows.push(vec!["Destaques".to_string(), "Dica".to_string(), line]);
    }
    for section in all_sections(report) {
        for (label, value) in section.rows {
            rows.push(vec![section.title.to_string(), label.to_string(), value]);
        }
    }
    for url in sources(report) {
        rows.push(vec!["Fontes".to_string(), "URL".to_string(), url.clone()]);
    }
    rows
}

pub fn probability_rows(reports: &[AnalysisResult]) -> Vec<Vec<String>> {
    let mut header = vec!["Mercado".to_string()];
    header.extend(reports.iter().map(|r| display(&r.match_title)));
    let mut rows = vec![header];
    for key in PROBABILITY_KEYS {
        let mut row = vec![key.to_string()];
        row.extend(reports.iter().map(|r| {
            r.probabilities
                .get(key)
                .map(|v| format!("{v:.1}"))
                .unwrap_or_default()
        }));
        rows.push(row);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sheet_names_are_valid_and_short() {
        let name = sheet_name(0, "Flamengo vs Palmeiras: Final / Copa do Brasil 2025");
        assert!(name.chars().count() <= MAX_SHEET_NAME);
        assert!(!name.contains(':') && !name.contains('/'));
        assert!(name.starts_with("1 Flamengo"));
        assert_eq!(sheet_name(1, "  "), "2 Jogo");
    }

    #[test]
    fn file_name_carries_timestamp() {
        let at = Local.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).single().expect("valid time");
        assert_eq!(export_file_name(at), "betmind_20250309_140507.xlsx");
    }

    #[test]
    fn probability_rows_have_one_column_per_report() {
        let mut a = AnalysisResult {
            match_title: "A vs B".to_string(),
            ..AnalysisResult::default()
        };
        a.probabilities.win_a = 55.0;
        let b = AnalysisResult::default();
        let rows = probability_rows(&[a, b]);
        assert_eq!(rows.len(), 1 + PROBABILITY_KEYS.len());
        assert_eq!(rows[0], vec!["Mercado", "A vs B", "-"]);
        assert_eq!(rows[1], vec!["winA", "55.0", "0.0"]);
    }

    #[test]
    fn export_writes_workbook() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("report.xlsx");
        let report = AnalysisResult {
            match_title: "A vs B".to_string(),
            ..AnalysisResult::default()
        };
        let sheets = export_reports(&path, &[report]).expect("export");
        assert_eq!(sheets, 2);
        assert!(path.exists());
    }

    #[test]
    fn empty_export_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(export_reports(&dir.path().join("x.xlsx"), &[]).is_err());
    }
}
