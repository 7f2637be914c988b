use console::{measure_text_width, pad_str, style, Alignment};

/// Prints `rows` under `columns`, each column padded to its widest cell.
pub fn print_table(columns: &[String], rows: &[Vec<String>]) {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .map(|row| row.get(index).map_or(0, |cell| measure_text_width(cell)))
                .max()
                .unwrap_or(0)
                .max(measure_text_width(column))
        })
        .collect();

    println!("{}", style(pad_row(columns.iter(), &widths)).bold().underlined());
    for row in rows {
        println!("{}", pad_row(row.iter(), &widths));
    }
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| pad_str(cell, *width, Alignment::Left, None).to_string())
        .collect::<Vec<_>>()
        .join("  ")
}
