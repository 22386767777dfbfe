/*
Pretty printing of generated render arguments: formula shape, ranges and colors in one table.
*/
use crate::rendering::render_arguments::FormulaRenderArguments;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, PartialEq, Tabled)]
pub struct ReportRow {
    key: &'static str,
    value: String,
}

pub fn formula_report(arguments: &FormulaRenderArguments) -> Vec<ReportRow> {
    let formula = &arguments.formula;
    vec![
        ReportRow { key: "Image size", value: format!("{}x{}", arguments.width(), arguments.height()) },
        ReportRow { key: "Variables", value: formula.variables().join(", ") },
        ReportRow { key: "Nodes", value: formula.node_count().to_string() },
        ReportRow { key: "Height", value: formula.height().to_string() },
        ReportRow { key: "Shortest branch", value: formula.min_depth().to_string() },
        ReportRow { key: "Ranges", value: arguments.ranges.to_string() },
        ReportRow { key: "Red", value: arguments.color.red.to_string() },
        ReportRow { key: "Green", value: arguments.color.green.to_string() },
        ReportRow { key: "Blue", value: arguments.color.blue.to_string() },
    ]
}

/// report as a table with rounded borders
pub fn formula_report_table(arguments: &FormulaRenderArguments) -> String {
    let rows = formula_report(arguments);
    let mut table = Table::new(&rows);
    table.with(Style::modern_rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_contains_keys() {
        let arguments = FormulaRenderArguments::parse(
            "4;3;-1,0.5;0,1\r\n1,0,0,0;0,1,0,0.1;0,0,1,0\r\nsum sin x0 mul x1 2",
        )
        .unwrap();
        let rows = formula_report(&arguments);
        assert_eq!(rows[0].value, "4x3");
        assert_eq!(rows[1].value, "x0, x1");
        assert_eq!(rows[2].value, "6");
        let table = formula_report_table(&arguments);
        for key in ["Image size", "Shortest branch", "Blue", "4;3;-1,0.5;0,1"] {
            assert!(table.contains(key), "{}", table);
        }
    }
}
