//! End-to-end language semantics, source text in and value out.

use mica::{builtins, Error, Interpreter, Value};
use pretty_assertions::assert_eq;

fn eval(src: &str) -> Option<Value> {
    let mut interp = Interpreter::new();
    builtins::install(&mut interp);
    interp.eval(src).expect("eval failed")
}

fn eval_display(src: &str) -> String {
    eval(src).expect("expected a result value").to_string()
}

fn eval_number(src: &str) -> f64 {
    match eval(src) {
        Some(Value::Number(n)) => n,
        other => panic!("expected a number, got {other:?}"),
    }
}

fn eval_err(src: &str) -> Error {
    let mut interp = Interpreter::new();
    builtins::install(&mut interp);
    interp.eval(src).expect_err("expected an error")
}

#[test]
fn number_literals_evaluate_to_themselves() {
    assert_eq!(eval_number("return 42"), 42.0);
    assert_eq!(eval_number("return 3.14"), 3.14);
    assert_eq!(eval_number("return 0.5"), 0.5);
}

#[test]
fn arguments_bind_by_position() {
    let src = "fun add(a, b) return a + b end var x = 1 return add(x, 0.5)";
    assert_eq!(eval_number(src), 1.5);
}

#[test]
fn list_literals_tolerate_trailing_commas() {
    assert_eq!(eval_display("return [0, 1, 2, ]"), "[0, 1, 2]");
    assert_eq!(eval_display("return []"), "[]");
}

#[test]
fn record_spread_then_override() {
    let src = "r1 = { a = 1, b = 2 } r2 = { ...r1, b = 20 } return r2.b";
    assert_eq!(eval_number(src), 20.0);
}

#[test]
fn later_direct_fields_also_win() {
    assert_eq!(eval_number("return { a = 1, a = 2 }.a"), 2.0);
}

#[test]
fn list_spread_appends_in_place() {
    assert_eq!(
        eval_display("var xs = [2, 3] return [1, ...xs, 4]"),
        "[1, 2, 3, 4]"
    );
}

#[test]
fn spread_requires_a_matching_kind() {
    assert!(matches!(eval_err("return [...1]"), Error::Type(_)));
    assert!(matches!(eval_err("return { ...[1] }"), Error::Type(_)));
    assert!(matches!(eval_err("return [...{ a = 1 }]"), Error::Type(_)));
}

#[test]
fn break_terminates_the_loop() {
    let src = "i = 0 while true if i == 2 break end i = i + 1 end return i";
    assert_eq!(eval_number(src), 2.0);
}

#[test]
fn continue_skips_one_pass() {
    let src =
        "i = 0 j = 0 while i < 5 i = i + 1 if i == 2 continue end j = j + 1 end return j";
    assert_eq!(eval_number(src), 4.0);
}

#[test]
fn return_propagates_out_of_a_loop() {
    let src = "fun f() while true return 7 end end return f()";
    assert_eq!(eval_number(src), 7.0);
}

#[test]
fn break_outside_a_loop_is_an_error() {
    assert!(matches!(eval_err("break"), Error::Runtime(_)));
    assert!(matches!(eval_err("continue"), Error::Runtime(_)));
    assert!(matches!(
        eval_err("fun f() break end return f()"),
        Error::Runtime(_)
    ));
}

#[test]
fn top_level_return_ends_the_program() {
    assert_eq!(eval_number("return 1 i = missing"), 1.0);
}

#[test]
fn negative_index_wraps_once() {
    assert_eq!(eval_number("var xs = [10, 20, 30] return xs[-1]"), 30.0);
    assert_eq!(eval_number("var xs = [10, 20, 30] return xs[-3]"), 10.0);
    assert!(matches!(
        eval_err("return [10, 20, 30][-4]"),
        Error::Range(_)
    ));
}

#[test]
fn index_out_of_range_fails() {
    assert!(matches!(eval_err("return [1][1]"), Error::Range(_)));
    assert!(matches!(eval_err("return [][0]"), Error::Range(_)));
}

#[test]
fn strings_index_and_slice_by_code_point() {
    assert_eq!(eval_display("return 'héllo'[1]"), "é");
    assert_eq!(eval_display("return 'hello'[-1]"), "o");
    assert_eq!(eval_display("return 'hello'[1:3]"), "el");
    assert_eq!(eval_display("return 'hello'[-2:]"), "lo");
}

#[test]
fn slice_bounds_default_and_clamp() {
    assert_eq!(eval_display("return [1, 2, 3][:2]"), "[1, 2]");
    assert_eq!(eval_display("return [1, 2, 3][1:]"), "[2, 3]");
    assert_eq!(eval_display("return [1, 2, 3][:]"), "[1, 2, 3]");
    assert_eq!(eval_display("return [1, 2, 3][0:99]"), "[1, 2, 3]");
    assert_eq!(eval_display("return [1, 2, 3][2:1]"), "[]");
}

#[test]
fn and_or_evaluate_both_operands() {
    let src = "var hits = 0 \
               fun t() hits = hits + 1 return true end \
               var r = t() or t() \
               return hits";
    assert_eq!(eval_number(src), 2.0);

    let src = "var hits = 0 \
               fun f() hits = hits + 1 return false end \
               var r = f() and f() \
               return hits";
    assert_eq!(eval_number(src), 2.0);
}

#[test]
fn logical_operators_require_bools() {
    assert!(matches!(eval_err("return 1 and 2"), Error::Type(_)));
    assert!(matches!(eval_err("return true or 0"), Error::Type(_)));
}

#[test]
fn less_or_equal_is_equality_or_less() {
    assert_eq!(eval_display("return 2 <= 2"), "true");
    assert_eq!(eval_display("return 1 <= 2"), "true");
    assert_eq!(eval_display("return 3 <= 2"), "false");
    assert_eq!(eval_display("return 'a' <= 'b'"), "true");
}

#[test]
fn mismatched_kinds_do_not_compare() {
    assert!(matches!(eval_err("return 1 == 'x'"), Error::Type(_)));
    assert!(matches!(eval_err("return true < false"), Error::Type(_)));
}

#[test]
fn structural_equality_on_composites() {
    assert_eq!(eval_display("return [1, [2]] == [1, [2]]"), "true");
    assert_eq!(eval_display("return [1, 2] == [1]"), "false");
    assert_eq!(eval_display("return { a = 1 } == { a = 1 }"), "true");
    assert_eq!(eval_display("return { a = 1 } == { b = 1 }"), "false");
}

#[test]
fn functions_compare_by_identity() {
    assert_eq!(
        eval_display("fun f() return 1 end var g = f return f == g"),
        "true"
    );
    assert_eq!(
        eval_display("var a = fun() return 1 end var b = fun() return 1 end return a == b"),
        "false"
    );
}

#[test]
fn bare_return_yields_no_value() {
    assert!(eval("fun f() return end return f()").is_none());
    assert!(eval("fun f() var x = 1 end return f()").is_none());
}

#[test]
fn consuming_no_value_is_a_type_error() {
    assert!(matches!(
        eval_err("fun f() return end return f() + 1"),
        Error::Type(_)
    ));
}

#[test]
fn assignment_overwrites_the_nearest_outer_binding() {
    let src = "var x = 1 fun bump() x = x + 1 return true end bump() return x";
    assert_eq!(eval_number(src), 2.0);
}

#[test]
fn unbound_assignment_defines_in_the_innermost_frame() {
    assert_eq!(eval_number("fun f() y = 5 return y end return f()"), 5.0);
    assert!(matches!(
        eval_err("fun f() y = 5 return true end f() return y"),
        Error::Name(_)
    ));
}

#[test]
fn parameters_shadow_outer_bindings() {
    let src = "var x = 1 fun f(x) x = 99 return x end f(5) return x";
    assert_eq!(eval_number(src), 1.0);
}

#[test]
fn recursion_through_the_self_name() {
    let src = "fun fact(n) if n <= 1 return 1 end return n * fact(n - 1) end return fact(5)";
    assert_eq!(eval_number(src), 120.0);
}

#[test]
fn arity_must_match_exactly() {
    assert!(matches!(
        eval_err("fun f(a) return a end return f()"),
        Error::Type(_)
    ));
    assert!(matches!(
        eval_err("fun f(a) return a end return f(1, 2)"),
        Error::Type(_)
    ));
}

#[test]
fn calling_a_non_function_fails() {
    assert!(matches!(eval_err("return 1(2)"), Error::Type(_)));
    assert!(matches!(eval_err("return 'f'()"), Error::Type(_)));
}

#[test]
fn conditions_must_be_bool() {
    assert!(matches!(eval_err("if 1 end"), Error::Type(_)));
    assert!(matches!(eval_err("while 1 end"), Error::Type(_)));
}

#[test]
fn if_else_shares_one_end() {
    assert_eq!(eval_number("if false return 1 else return 2 end"), 2.0);
    assert_eq!(eval_number("if true return 1 else return 2 end"), 1.0);
    assert_eq!(eval_number("if false return 1 end return 3"), 3.0);
}

#[test]
fn field_access_requires_a_record() {
    assert_eq!(eval_number("return { a = 1 }.a"), 1.0);
    assert!(matches!(eval_err("return { a = 1 }.b"), Error::Name(_)));
    assert!(matches!(eval_err("return [1].a"), Error::Type(_)));
}

#[test]
fn unbound_variable_is_a_name_error() {
    assert!(matches!(eval_err("return missing"), Error::Name(_)));
}

#[test]
fn arithmetic_operators() {
    assert_eq!(eval_number("return 7 mod 3"), 1.0);
    assert_eq!(eval_number("return 10 / 4"), 2.5);
    assert_eq!(eval_number("return -(1 + 2)"), -3.0);
    assert_eq!(eval_number("return 1 + 2 * 3"), 7.0);
    assert_eq!(eval_number("return (1 + 2) * 3"), 9.0);
    assert_eq!(eval_display("return 1 + 1 == 2"), "true");
}

#[test]
fn arithmetic_requires_numbers() {
    assert!(matches!(eval_err("return 'a' + 'b'"), Error::Type(_)));
    assert!(matches!(eval_err("return -true"), Error::Type(_)));
}

#[test]
fn statements_are_token_driven_not_line_driven() {
    let src = "var x =\n    1\nwhile x < 3\n    x = x + 1\nend\nreturn x";
    assert_eq!(eval_number(src), 3.0);
}

#[test]
fn comments_are_ignored() {
    let src = "var x = 1 // one\n/* x = 99 */ return x";
    assert_eq!(eval_number(src), 1.0);
}

#[test]
fn interpolated_literals_are_opaque_text() {
    assert_eq!(eval_display("return \"hi {name}\""), "hi {name}");
}
