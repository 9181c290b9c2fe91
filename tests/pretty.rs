//! The AST renders back to parseable source. Re-parsing the rendered form
//! must reproduce both the rendering and the evaluated result.

use mica::{builtins, parse, program_to_string, Interpreter, Value};
use pretty_assertions::assert_eq;

fn render(src: &str) -> String {
    program_to_string(&parse(src).expect("parse failed"))
}

fn run(src: &str) -> Option<Value> {
    let mut interp = Interpreter::new();
    builtins::install(&mut interp);
    interp.eval(src).expect("eval failed")
}

fn assert_round_trip(src: &str) {
    let printed = render(src);
    let reparsed = parse(&printed).expect("rendered source must re-parse");
    assert_eq!(printed, program_to_string(&reparsed));

    match (run(src), run(&printed)) {
        (None, None) => {}
        (Some(a), Some(b)) => {
            assert!(
                a.try_eq(&b).expect("results must be comparable"),
                "results differ: {a} vs {b}"
            );
        }
        (a, b) => panic!("one run produced a value and the other did not: {a:?} vs {b:?}"),
    }
}

#[test]
fn infix_renders_fully_parenthesized() {
    assert_eq!(render("return 1 + 2 * 3"), "return (1 + (2 * 3))");
    assert_eq!(render("return (1 + 2) * 3"), "return ((1 + 2) * 3)");
    assert_eq!(render("return 1 mod 2 and true"), "return ((1 mod 2) and true)");
}

#[test]
fn statements_render_in_source_form() {
    assert_eq!(
        render("fun add(a, b) return a + b end"),
        "fun add(a, b) return (a + b) end"
    );
    assert_eq!(
        render("while x < 3 x = x + 1 end"),
        "while (x < 3) x = (x + 1) end"
    );
    assert_eq!(
        render("if ok return 1 else return 2 end"),
        "if ok return 1 else return 2 end"
    );
    assert_eq!(render("var x = -1"), "var x = -1");
    assert_eq!(render("break continue return"), "break continue return");
}

#[test]
fn literals_render_with_escapes() {
    assert_eq!(render(r"return 'a\tb'"), r"return 'a\tb'");
    assert_eq!(render(r"return 'don\'t'"), r"return 'don\'t'");
    assert_eq!(render("return \"hi {name}\""), "return \"hi {name}\"");
}

#[test]
fn collections_and_access_render() {
    assert_eq!(render("return [1, ...xs, 2, ]"), "return [1, ...xs, 2]");
    assert_eq!(
        render("return { a = 1, ...r, b = 2 }"),
        "return { a = 1, ...r, b = 2 }"
    );
    assert_eq!(render("return xs[1:]"), "return xs[1:]");
    assert_eq!(render("return xs[:2]"), "return xs[:2]");
    assert_eq!(render("return obj.items[0](1, 2)"), "return obj.items[0](1, 2)");
}

#[test]
fn round_trips_preserve_results() {
    assert_round_trip("return 42");
    assert_round_trip("return 1 + 2 * 3 - 4 / 5");
    assert_round_trip("fun add(a, b) return a + b end var x = 1 return add(x, 0.5)");
    assert_round_trip("r1 = { a = 1, b = 2 } r2 = { ...r1, b = 20 } return r2.b");
    assert_round_trip("i = 0 while true if i == 2 break end i = i + 1 end return i");
    assert_round_trip(
        "i = 0 j = 0 while i < 5 i = i + 1 if i == 2 continue end j = j + 1 end return j",
    );
    assert_round_trip("var xs = [10, 20, 30] return xs[-1]");
    assert_round_trip("return 'hello'[1:3]");
    assert_round_trip("return { a = [1, 2], b = 'x' } == { b = 'x', a = [1, 2] }");
    assert_round_trip("if false return 1 else return 2 end");
    assert_round_trip("fun f() return end return f()");
    assert_round_trip(r"return 'a\tb\nc'");
    assert_round_trip("return \"opaque {x}\"");
    assert_round_trip("return -(1 + 2) <= 3");
}
