use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use likeligrid::search::grid::StageReport;
use likeligrid::search::ScoredPoint;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right_from(table: &mut Table, first: usize, count: usize) {
    for i in first..first + count {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_results(title: &str, names: &[String], rows: &[ScoredPoint], top: usize) {
    println!("\n=== 🏆 {} ({} of {} rows) ===", title, top.min(rows.len()), rows.len());
    let mut table = new_table();

    let mut header = vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("loglik").fg(Color::Cyan),
    ];
    header.extend(names.iter().map(|n| Cell::new(n).add_attribute(Attribute::Bold)));
    table.add_row(header);

    for (rank, row) in rows.iter().take(top).enumerate() {
        let mut cells = vec![
            Cell::new(rank + 1),
            Cell::new(format!("{:.6}", row.loglik)).fg(Color::Cyan),
        ];
        cells.extend(row.theta.iter().map(|t| Cell::new(format!("{:.4}", t))));
        table.add_row(cells);
    }
    align_right_from(&mut table, 0, names.len() + 2);
    println!("{}", table);
}

pub fn print_stage_summary(stages: &[StageReport]) {
    if stages.is_empty() {
        return;
    }
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Stage").add_attribute(Attribute::Bold),
        Cell::new("Step"),
        Cell::new("Points"),
        Cell::new("Evaluated"),
        Cell::new("Best").fg(Color::Green),
    ]);
    for (k, s) in stages.iter().enumerate() {
        table.add_row(vec![
            Cell::new(k),
            Cell::new(s.step),
            Cell::new(s.max_count),
            Cell::new(s.evaluations),
            Cell::new(format!("{:.6}", s.best.loglik)).fg(Color::Green),
        ]);
    }
    align_right_from(&mut table, 0, 5);
    println!("\n{}", table);
}

/// Axes of the stage that would follow the last one.
pub fn print_axes(names: &[String], axes: &[Vec<f64>]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Next axis"),
    ]);
    for (name, axis) in names.iter().zip(axes) {
        let values: Vec<String> = axis.iter().map(|v| format!("{:.3}", v)).collect();
        table.add_row(vec![Cell::new(name), Cell::new(values.join(" "))]);
    }
    println!("\n{}", table);
}

pub fn print_evaluation(names: &[String], theta: &[f64], loglik: f64) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("θ"),
    ]);
    for (name, t) in names.iter().zip(theta) {
        table.add_row(vec![Cell::new(name), Cell::new(t)]);
    }
    table.add_row(vec![
        Cell::new("loglik").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.6}", loglik)).fg(Color::Cyan),
    ]);
    align_right_from(&mut table, 1, 1);
    println!("{}", table);
}

pub fn print_denominators(denoms: &[f64], histogram: &[usize]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("s").add_attribute(Attribute::Bold),
        Cell::new("samples"),
        Cell::new("D[s]"),
    ]);
    for (s, d) in denoms.iter().enumerate() {
        let n = histogram.get(s).copied().unwrap_or(0);
        table.add_row(vec![Cell::new(s), Cell::new(n), Cell::new(format!("{:.6e}", d))]);
    }
    align_right_from(&mut table, 0, 3);
    println!("{}", table);
}
