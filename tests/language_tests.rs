// Expression language tests, evaluated through the runtime

use rlc::interpreter::engine::Logic;
use rlc::parser::parse::ParseErrorKind;

/// Evaluates `expr` as the only line of a program and returns its value
fn eval(expr: &str) -> i32 {
    let mut logic = Logic::new();
    let code = format!("result = {}", expr);
    assert!(logic.set_code(&code), "{} did not parse: {:?}", code, logic.errors());
    logic.tick();
    logic.symbol("result")
}

fn first_error(code: &str) -> ParseErrorKind {
    let mut logic = Logic::new();
    assert!(!logic.set_code(code), "{} parsed", code);
    *logic.errors().values().next().unwrap()
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(eval("1 + 2 * 3"), 7);
    assert_eq!(eval("(1 + 2) * 3"), 9);
    assert_eq!(eval("10 - 4 - 3"), 3);
    assert_eq!(eval("-2 * -3"), 6);
    assert_eq!(eval("17 % 5 + 20 / 6"), 5);
}

#[test]
fn test_degenerate_division() {
    assert_eq!(eval("5 / 0"), 0);
    assert_eq!(eval("5 % 0"), 0);
    assert_eq!(eval("5 / -1"), 0);
}

#[test]
fn test_comparisons_and_logic() {
    assert_eq!(eval("3 > 2"), 15);
    assert_eq!(eval("3 < 2"), 0);
    assert_eq!(eval("(3 > 2) and (1 < 2)"), 15);
    assert_eq!(eval("3 == 3 && 2 <> 2"), 0);
    assert_eq!(eval("0 or 4 > 1"), 15);
    assert_eq!(eval("15 xor 15"), 0);
    assert_eq!(eval("15 ^ 0"), 15);
    assert_eq!(eval("!0"), 15);
    assert_eq!(eval("not 7"), 0);
}

#[test]
fn test_chained_relations_group_left() {
    // (3 > 2) > 1 is 15 > 1
    assert_eq!(eval("3 > 2 > 1"), 15);
    // (1 < 2) < 3 is 15 < 3
    assert_eq!(eval("1 < 2 < 3"), 0);
}

#[test]
fn test_builtins_in_expressions() {
    assert_eq!(eval("inv(15) + inv(0)"), 15);
    assert_eq!(eval("if(1, 7, 3) * 2"), 14);
    assert_eq!(eval("max(1, min(9, 4), 2)"), 4);
    assert_eq!(eval("lim(mean(30, 10))"), 15);
}

#[test]
fn test_case_and_comments() {
    let mut logic = Logic::new();
    assert!(logic.set_code("# setup\nA = 3 # three\nB = a + MAX(1, 2)"));
    logic.tick();
    assert_eq!(logic.symbol("b"), 5);
    assert_eq!(logic.symbol("B"), 5);
}

#[test]
fn test_expression_lines_only_run_side_effects() {
    let mut logic = Logic::new();
    assert!(logic.set_code("cnt1(1)\nc = 1 + 1 == 2"));
    logic.tick();
    logic.tick();
    assert_eq!(logic.symbol(".cnt1"), 2);
    assert_eq!(logic.symbol("c"), 15);
    assert_eq!(logic.program().entries[0].last_result, 2);
}

#[test]
fn test_error_kinds() {
    assert_eq!(first_error("a = nope(1)"), ParseErrorKind::UnknownFunction);
    assert_eq!(first_error("a = inv(1, 2)"), ParseErrorKind::InvalidNumberOfArguments);
    assert_eq!(first_error("a = (1 + 2"), ParseErrorKind::MissingClosingParenthesis);
    assert_eq!(first_error("a = max(1, 2"), ParseErrorKind::MissingClosingFunctionParenthesis);
    assert_eq!(first_error("a = max + 1"), ParseErrorKind::MissingFunctionArguments);
    assert_eq!(first_error("time = 3"), ParseErrorKind::SymbolReadonly);
    assert_eq!(first_error("a = b.zz"), ParseErrorKind::ParseError);
    assert_eq!(first_error("a = 1 1"), ParseErrorKind::ParseError);
    assert_eq!(first_error("a = ö"), ParseErrorKind::InvalidCharacter);
}

#[test]
fn test_keyword_operators_are_not_symbols() {
    assert_eq!(first_error("and = 3"), ParseErrorKind::ExpectedAssignment);
    assert_eq!(first_error("a = and"), ParseErrorKind::UnexpectedCharacter);
    assert_eq!(first_error("a = b or"), ParseErrorKind::UnexpectedCharacter);
    // Only whole words are keywords
    assert_eq!(eval("android + 1"), 1);
    assert_eq!(eval("notx or 0"), 0);
}
