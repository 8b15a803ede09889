use clockwise_core::ast::{Expr, StmtKind};
use clockwise_core::lexer::TokenKind;
use clockwise_core::parser::parse_source;
use clockwise_core::pretty::format_program;
use clockwise_core::span::Position;
use clockwise_core::types::Type;
use clockwise_core::{
    CompileOptions, CoreError, DiagnosticKind, TypeMode, check, compile_source, compile_units,
    tokenize,
};
use indoc::indoc;
use pretty_assertions::assert_eq;

const PROGRAM: &str = indoc! {r#"
    import "strings";

    // Greets everyone on the list.
    fn greeting() -> string {
        return Sconcat("hello, ", "world")
    }

    /* entry point */
    fn main() -> int {
        var count = 3
        var text = greeting()
        var head = text[0, 5]
        while (count > 0) {
            if (count == 2) {
                Print(head)
            } else {
                Print(text[7])
            }
            count
        }
        return 10 * (2 + 1)
    }
"#};

#[test]
fn lexing_always_ends_with_eof() {
    for source in ["", "fn", "\"open", "/* open", "fn main() -> int { return 0 }", PROGRAM] {
        let tokens = tokenize(source);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof), "{source:?}");
        assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
            1
        );
    }
}

#[test]
fn minimal_main_has_one_symbol() {
    let program = parse_source("fn main() -> int { return 0 }").expect("parse");
    let report = check(&program);
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.symbols.function_count(), 1);
    assert_eq!(
        report.symbols.lookup_function("main").map(|f| f.return_type.as_str()),
        Some("int")
    );
}

#[test]
fn var_inference_and_mismatch() {
    let ok = check(&parse_source("fn main() -> int { var x = 1 + 2 return 0 }").expect("parse"));
    assert!(ok.diagnostics.is_empty());
    assert_eq!(ok.vars[0].ty, Type::Int);

    let bad =
        check(&parse_source("fn main() -> int { var x: string = 1 + 2 return 0 }").expect("parse"));
    let err = bad.first_error().expect("error");
    assert_eq!(err.kind, DiagnosticKind::Type);
    assert!(err.message.contains("`x`"), "{}", err.message);
}

#[test]
fn missing_main_fails_checking() {
    let report = check(&parse_source("fn other() -> int { return 0 }").expect("parse"));
    assert_eq!(
        report.first_error().map(|d| d.message.as_str()),
        Some("no main function found")
    );
}

#[test]
fn index_syntax_equals_slice_calls() {
    let pick = |source: &str| -> Expr {
        let program = parse_source(&format!("fn main() -> int {{ return {source} }}"))
            .expect("parse");
        match &program.functions[0].body.statements[0].kind {
            StmtKind::Return(value) => value.clone(),
            other => panic!("unexpected {other:?}"),
        }
    };
    assert_eq!(pick("a[2,5]"), pick("Slice(a, 2, 5)"));

    // `-1` has no surface syntax, so the expected call is built by hand.
    let pos = Position::start();
    let to_end = Expr::call(
        Expr::ident("Slice", pos),
        vec![Expr::ident("a", pos), Expr::int("2", pos), Expr::int("-1", pos)],
        pos,
    );
    assert_eq!(pick("a[2]"), to_end);
}

#[test]
fn whole_program_compiles_to_go() {
    // Literal mode types `greeting()` as int, so its string return is rejected.
    match compile_source(PROGRAM, &CompileOptions::default()) {
        Err(CoreError::Type(diag)) => assert_eq!(
            diag.message,
            "return type mismatch in function `greeting`: expected string, found int"
        ),
        other => panic!("expected a type error, got {other:?}"),
    }

    let options = CompileOptions {
        type_mode: TypeMode::Resolved,
        ..CompileOptions::default()
    };
    let artifact = compile_source(PROGRAM, &options).expect("compile");
    let expected = [
        "// Code generated by clockwise. DO NOT EDIT.",
        "",
        "package main",
        "",
        "import \"os\"",
        "",
        "// cw:import \"strings\"",
        "",
        "func greeting() string {",
        "\treturn Sconcat(\"hello, \", \"world\")",
        "}",
        "",
        "func cwMain() int {",
        "\tvar count int = 3",
        "\t_ = count",
        "\tvar text string = greeting()",
        "\t_ = text",
        "\tvar head string = Slice(text, 0, 5)",
        "\t_ = head",
        "\tfor count > 0 {",
        "\t\tif count == 2 {",
        "\t\t\tPrint(head)",
        "\t\t} else {",
        "\t\t\tPrint(Slice(text, 7, -1))",
        "\t\t}",
        "\t\t_ = count",
        "\t}",
        "\treturn 30",
        "}",
        "",
        "func main() {",
        "\tos.Exit(cwMain())",
        "}",
        "",
    ]
    .join("\n");
    assert_eq!(artifact.go_source, expected);
    assert!(artifact.warnings.is_empty());
}

#[test]
fn formatting_is_stable() {
    let program = parse_source(PROGRAM).expect("parse");
    let once = format_program(&program);
    let twice = format_program(&parse_source(&once).expect("reparse"));
    assert_eq!(once, twice);
    assert_eq!(parse_source(&once).expect("reparse"), program);
}

#[test]
fn positions_survive_to_diagnostics() {
    let source = "fn main() -> int {\n    var ok = 1\n    return ok + \"s\"\n}";
    let err = compile_source(source, &CompileOptions::default()).unwrap_err();
    let CoreError::Type(diag) = err else {
        panic!("expected type error");
    };
    assert_eq!(diag.position, Some(Position::new(3, 12)));
}

#[test]
fn duplicate_across_units_names_the_function() {
    let err = compile_units(
        &[
            "fn main() -> int { return foo() }\nfn foo() -> int { return 1 }",
            "fn foo() -> int { return 2 }",
        ],
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateFunction { ref name } if name == "foo"));
    assert_eq!(
        err.to_string(),
        "duplicate function `foo` across compilation units"
    );
}
