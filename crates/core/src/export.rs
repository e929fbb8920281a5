//! CSV rendering of the project register for administrators.

use serde::Serialize;

use crate::status::ProjectStatus;

/// Column headers, in output order.
pub const HEADER: [&str; 9] = [
    "No",
    "Student Code",
    "Student Name",
    "Title",
    "Supervisor",
    "Status",
    "Final Score",
    "Year",
    "Semester",
];

/// One exported project, already joined with student and supervisor names.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectExportRow {
    pub student_code: Option<String>,
    pub student_name: String,
    pub title: String,
    pub supervisor_name: Option<String>,
    pub status: ProjectStatus,
    pub final_score: Option<f64>,
    pub year: i32,
    pub semester: i16,
}

/// Render rows as RFC 4180 CSV with a header line, numbering rows from 1.
pub fn render_csv(rows: &[ProjectExportRow]) -> String {
    let mut out = HEADER.join(",");
    out.push('\n');

    for (index, row) in rows.iter().enumerate() {
        let fields = [
            (index + 1).to_string(),
            csv_escape(row.student_code.as_deref().unwrap_or("")),
            csv_escape(&row.student_name),
            csv_escape(&row.title),
            csv_escape(row.supervisor_name.as_deref().unwrap_or("")),
            row.status.label().to_string(),
            row.final_score.map_or(String::new(), |s| format!("{s:.2}")),
            row.year.to_string(),
            row.semester.to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Suggested download name, e.g. `projects_2026.csv` or `projects_all.csv`.
pub fn export_filename(year: Option<i32>) -> String {
    match year {
        Some(year) => format!("projects_{year}.csv"),
        None => "projects_all.csv".to_string(),
    }
}

/// Quote a value if it contains a comma, quote, or line break.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, final_score: Option<f64>) -> ProjectExportRow {
        ProjectExportRow {
            student_code: Some("SV001".into()),
            student_name: "Nguyen An".into(),
            title: title.into(),
            supervisor_name: None,
            status: if final_score.is_some() {
                ProjectStatus::Completed
            } else {
                ProjectStatus::InProgress
            },
            final_score,
            year: 2026,
            semester: 1,
        }
    }

    #[test]
    fn header_only_for_empty_register() {
        assert_eq!(
            render_csv(&[]),
            "No,Student Code,Student Name,Title,Supervisor,Status,Final Score,Year,Semester\n"
        );
    }

    #[test]
    fn rows_are_numbered_and_scores_formatted() {
        let csv = render_csv(&[row("Compiler", Some(8.0)), row("Kernel", None)]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "1,SV001,Nguyen An,Compiler,,Completed,8.00,2026,1");
        assert_eq!(lines[2], "2,SV001,Nguyen An,Kernel,,In Progress,,2026,1");
    }

    #[test]
    fn special_characters_are_quoted() {
        let csv = render_csv(&[row("Graphs, \"fast\" ones", None)]);
        assert!(csv.contains("\"Graphs, \"\"fast\"\" ones\""));
    }

    #[test]
    fn filename_by_year() {
        assert_eq!(export_filename(Some(2026)), "projects_2026.csv");
        assert_eq!(export_filename(None), "projects_all.csv");
    }
}
