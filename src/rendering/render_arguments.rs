//! Everything needed to render one picture: formula, variable ranges and colors.
//! The text form is three CRLF-separated lines: ranges, color transformation, formula.
use crate::formulas::formula_errors::FormulaError;
use crate::formulas::formula_serializer::{deserialize, serialize};
use crate::formulas::formula_tree::FormulaTree;
use crate::rendering::color_transformation::ColorTransformation;
use crate::rendering::ranges::RangesForProjection;
use std::fmt;

pub const LINE_SEPARATOR: &str = "\r\n";

#[derive(Debug, Clone, PartialEq)]
pub struct FormulaRenderArguments {
    pub formula: FormulaTree,
    pub ranges: RangesForProjection,
    pub color: ColorTransformation,
}

impl FormulaRenderArguments {
    pub fn new(formula: FormulaTree, ranges: RangesForProjection, color: ColorTransformation) -> Self {
        FormulaRenderArguments {
            formula,
            ranges,
            color,
        }
    }

    pub fn width(&self) -> usize {
        self.ranges.x_count
    }

    pub fn height(&self) -> usize {
        self.ranges.y_count
    }

    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        let lines: Vec<&str> = text
            .splitn(3, LINE_SEPARATOR)
            .filter(|line| !line.trim().is_empty())
            .collect();
        if lines.len() < 3 {
            return Err(FormulaError::Parse(format!(
                "render arguments need 3 lines, found {}",
                lines.len()
            )));
        }
        Ok(FormulaRenderArguments::new(
            deserialize(lines[2])?,
            RangesForProjection::parse(lines[0])?,
            ColorTransformation::parse(lines[1])?,
        ))
    }
}

impl fmt::Display for FormulaRenderArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.ranges,
            LINE_SEPARATOR,
            self.color,
            LINE_SEPARATOR,
            serialize(&self.formula)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "4;3;-1,0.5;0,1\r\n1,0,0,0;0,1,0,0.1;0,0,1,0\r\nsum sin x0 mul x1 2";

    #[test]
    fn render_arguments_text_form() {
        let arguments = FormulaRenderArguments::parse(TEXT).unwrap();
        assert_eq!(arguments.width(), 4);
        assert_eq!(arguments.height(), 3);
        assert_eq!(arguments.formula.dimensions(), 2);
        assert_eq!(arguments.color.green.dispersion, 0.1);
        assert_eq!(arguments.to_string(), TEXT);
    }

    #[test]
    fn missing_lines_are_rejected() {
        assert!(FormulaRenderArguments::parse("4;3;-1,0.5\r\n1,0,0,0;0,1,0,0;0,0,1,0").is_err());
        assert!(FormulaRenderArguments::parse("4;3\r\n1,0,0,0;0,1,0,0;0,0,1,0\r\nsum x0").is_err());
    }
}
