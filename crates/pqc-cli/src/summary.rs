use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pqc_model::{ModelError, ProjectId};
use pqc_snapshot::{BatchReport, ProjectOutcome, SnapshotAction, SweepReport};
use pqc_sync::RuntimeReport;

pub fn print_batch_report(report: &BatchReport) {
    if report.is_empty() {
        println!("No active projects.");
        return;
    }
    println!("{}", batch_table(report));
    println!(
        "{} created, {} appended, {} rewritten, {} unchanged, {} skipped, {} failed",
        report.created(),
        report.appended(),
        report.rewritten(),
        report.unchanged(),
        report.skipped(),
        report.failed()
    );
    if report.has_failures() {
        eprintln!("Errors:");
        for (project, error) in report.failures() {
            eprintln!("- {project}: {error}");
        }
    }
}

fn batch_table(report: &BatchReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Project"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Reason"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for outcome in &report.outcomes {
        let (rows, reason) = match &outcome.result {
            Ok(action) => (
                count_cell(action.rows_written()),
                action
                    .reason()
                    .map_or_else(|| dim_cell("-"), |reason| Cell::new(reason.label())),
            ),
            Err(error) => (dim_cell("-"), Cell::new(error).fg(Color::Red)),
        };
        table.add_row(vec![
            Cell::new(&outcome.project_id),
            status_cell(outcome),
            rows,
            reason,
        ]);
    }
    table
}

pub fn print_sweep_report(report: &SweepReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Snapshots"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("examined"), Cell::new(report.examined)]);
    table.add_row(vec![Cell::new("kept (active)"), Cell::new(report.kept_active)]);
    table.add_row(vec![Cell::new("kept (recent)"), Cell::new(report.kept_recent)]);
    table.add_row(vec![
        Cell::new("deleted"),
        count_cell(report.deleted.len()).fg(Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("failed"),
        count_cell(report.failed.len()).fg(Color::Red),
    ]);
    println!("{table}");
    for path in &report.deleted {
        println!("deleted {}", path.display());
    }
    for path in &report.failed {
        eprintln!("could not delete {}", path.display());
    }
}

pub fn print_project_ids(results: &[(String, Result<ProjectId, ModelError>)]) {
    println!("{}", project_id_table(results));
}

fn project_id_table(results: &[(String, Result<ProjectId, ModelError>)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sample"),
        header_cell("Project ID"),
        header_cell("Regex pattern"),
        header_cell("SQL pattern"),
    ]);
    apply_summary_table_style(&mut table);
    for (sample, result) in results {
        match result {
            Ok(id) => table.add_row(vec![
                Cell::new(sample),
                Cell::new(id.as_str()).add_attribute(Attribute::Bold),
                Cell::new(id.regex_pattern()),
                Cell::new(id.sql_pattern()),
            ]),
            Err(error) => table.add_row(vec![
                Cell::new(sample),
                Cell::new(error).fg(Color::Red),
                dim_cell("-"),
                dim_cell("-"),
            ]),
        };
    }
    table
}

pub fn print_runtime_report(report: &RuntimeReport) {
    println!("Coordinator: {}", report.coordinator);
    println!("Retention sweeps: {}", report.sweeps);
}

fn status_cell(outcome: &ProjectOutcome) -> Cell {
    let cell = Cell::new(outcome.label());
    match &outcome.result {
        Ok(SnapshotAction::Created { .. } | SnapshotAction::Appended { .. }) => {
            cell.fg(Color::Green)
        }
        Ok(SnapshotAction::Rewritten { .. }) => cell.fg(Color::Yellow),
        Ok(SnapshotAction::Unchanged | SnapshotAction::Skipped) => {
            cell.add_attribute(Attribute::Dim)
        }
        Err(_) => cell.fg(Color::Red).add_attribute(Attribute::Bold),
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pqc_snapshot::{ReconcileError, RewriteReason};

    fn contents(table: &Table) -> Vec<Vec<String>> {
        table
            .row_iter()
            .map(|row| row.cell_iter().map(Cell::content).collect())
            .collect()
    }

    #[test]
    fn test_batch_table_rows() {
        let mut report = BatchReport::default();
        report.push(
            ProjectId::from_sample_name("A_20250101_X").unwrap(),
            Ok(SnapshotAction::Rewritten {
                rows: 4,
                reason: RewriteReason::ColumnOrderChanged,
            }),
        );
        report.push(
            ProjectId::from_sample_name("B_20250101_Y").unwrap(),
            Err(ReconcileError::MissingColumn {
                table: "Metadata_Sample",
                column: "CreationDate",
            }),
        );

        let rows = contents(&batch_table(&report));
        assert_eq!(rows[0], ["A_20250101_X", "rewritten", "4", "column order changed"]);
        assert_eq!(rows[1][0], "B_20250101_Y");
        assert_eq!(rows[1][1], "failed");
        assert!(rows[1][3].contains("CreationDate"));
    }

    #[test]
    fn test_project_id_table_rows() {
        let results = vec![(
            "Astral_20250716_XYZ_HSdia_01".to_string(),
            ProjectId::from_sample_name("Astral_20250716_XYZ_HSdia_01"),
        )];
        let rows = contents(&project_id_table(&results));
        assert_eq!(
            rows[0],
            [
                "Astral_20250716_XYZ_HSdia_01",
                "Astral_20250716_XYZ",
                "Astral_202507[0-9]{2}_XYZ",
                "Astral_202507__XYZ%"
            ]
        );
    }
}
