//! Prefix text form of formula trees: `sum sin x 0.5`.
//!
//! Operators print their lower-case name followed by their operands, variables their name and
//! constants their shortest decimal form. Parsing accepts operator names in any case; a word that
//! is neither an operator nor a variable name (letter + digits) is an error.
use crate::formal_grammar::tree_node::TreeNode;
use crate::formulas::formula_errors::FormulaError;
use crate::formulas::formula_tree::FormulaTree;
use crate::formulas::operators::Operator;
use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::{alpha1, alphanumeric0, multispace0, multispace1},
    combinator::{map, recognize},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, pair},
};

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Number(f64),
}

fn parse_word(input: &str) -> IResult<&str, Token> {
    map(recognize(pair(alpha1, alphanumeric0)), Token::Word).parse(input)
}

fn parse_number(input: &str) -> IResult<&str, Token> {
    map(double, Token::Number).parse(input)
}

fn parse_tokens(input: &str) -> IResult<&str, Vec<Token>> {
    let token = alt((parse_word, parse_number));
    delimited(multispace0, separated_list1(multispace1, token), multispace0).parse(input)
}

fn to_operator(token: Token) -> Result<Operator, FormulaError> {
    match token {
        Token::Number(value) => Ok(Operator::constant(value)),
        Token::Word(word) => {
            if let Some(op) = Operator::by_name(word) {
                Ok(op)
            } else if Operator::is_variable_name(word) {
                Ok(Operator::variable(word))
            } else {
                Err(FormulaError::Parse(format!("unknown operator '{}'", word)))
            }
        }
    }
}

pub fn serialize(tree: &FormulaTree) -> String {
    tree.to_string()
}

pub fn deserialize(text: &str) -> Result<FormulaTree, FormulaError> {
    let (remaining, tokens) = parse_tokens(text)
        .map_err(|e| FormulaError::Parse(format!("cannot read formula '{}': {:?}", text, e)))?;
    if !remaining.is_empty() {
        return Err(FormulaError::Parse(format!(
            "unexpected text '{}' in formula",
            remaining
        )));
    }
    let operators = tokens
        .into_iter()
        .map(to_operator)
        .collect::<Result<Vec<Operator>, FormulaError>>()?;
    let root = TreeNode::from_prefix(operators, Operator::arity)
        .map_err(|e| FormulaError::Parse(format!("wrong number of operands: {}", e)))?;
    Ok(FormulaTree::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulas::operators::{BinaryOp, UnaryOp};

    #[test]
    fn read_and_write() {
        let text = "mod x sum abs y 0.01";
        let tree = deserialize(text).unwrap();
        assert_eq!(tree.root().value, Operator::Binary(BinaryOp::Mod));
        assert_eq!(tree.root().children[1].children[0].value, Operator::Unary(UnaryOp::Abs));
        assert_eq!(tree.variables(), &["x".to_string(), "y".to_string()]);
        assert_eq!(serialize(&tree), text);
    }

    #[test]
    fn operator_names_in_any_case() {
        let tree = deserialize("  SUM Sin x1 -2.5\n").unwrap();
        assert_eq!(serialize(&tree), "sum sin x1 -2.5");
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(deserialize(""), Err(FormulaError::Parse(_))));
        assert!(matches!(deserialize("sum x"), Err(FormulaError::Parse(_))));
        assert!(matches!(deserialize("sin x y"), Err(FormulaError::Parse(_))));
        assert!(matches!(deserialize("foo x"), Err(FormulaError::Parse(_))));
        assert!(matches!(deserialize("sum x (y)"), Err(FormulaError::Parse(_))));
    }

    #[test]
    fn constants_keep_their_value() {
        let tree = deserialize("mul 0.1 x").unwrap();
        assert_eq!(tree.root().children[0].value, Operator::constant(0.1));
        assert_eq!(deserialize(&serialize(&tree)).unwrap(), tree);
    }
}
