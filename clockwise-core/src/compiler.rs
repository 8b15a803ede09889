use std::collections::HashSet;
use std::fmt::Write;

use tracing::debug;

use crate::ast::Program;
use crate::checker::check_with_mode;
use crate::codegen_go::generate;
use crate::diagnostic::Diagnostic;
use crate::error::CoreError;
use crate::fold::fold_program;
use crate::lexer::tokenize;
use crate::parser::parse_source;
use crate::pretty::format_program;
use crate::typecheck::TypeMode;

/// Knobs for a single compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub type_mode: TypeMode,
    pub fold_constants: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            type_mode: TypeMode::Literal,
            fold_constants: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilationArtifact {
    pub go_source: String,
    /// The merged program that was generated from, after folding.
    pub program: Program,
    pub warnings: Vec<Diagnostic>,
}

pub fn parse_unit(source: &str) -> Result<Program, CoreError> {
    parse_source(source)
}

/// Combine compilation units into one program.
///
/// Functions are concatenated in unit order and imports are merged
/// keeping the first occurrence. A function name declared by two
/// different units rejects the whole merge; duplicates inside a single
/// unit are left for the checker.
pub fn merge_units(units: Vec<Program>) -> Result<Program, CoreError> {
    let unit_count = units.len();
    let mut merged = Program::default();
    let mut seen: HashSet<String> = HashSet::new();

    for unit in units {
        for function in &unit.functions {
            if seen.contains(&function.name) {
                return Err(CoreError::DuplicateFunction {
                    name: function.name.clone(),
                });
            }
        }
        seen.extend(unit.functions.iter().map(|f| f.name.clone()));

        for path in unit.imports {
            merged.add_import(path);
        }
        merged.functions.extend(unit.functions);
    }

    debug!(
        units = unit_count,
        functions = merged.functions.len(),
        imports = merged.imports.len(),
        "merged compilation units"
    );
    Ok(merged)
}

/// Parse, merge, check, fold and generate. Stops at the first stage
/// that fails.
pub fn compile_units(
    sources: &[&str],
    options: &CompileOptions,
) -> Result<CompilationArtifact, CoreError> {
    let units = sources
        .iter()
        .map(|source| parse_unit(source))
        .collect::<Result<Vec<_>, _>>()?;
    let program = merge_units(units)?;

    let report = check_with_mode(&program, options.type_mode).into_result()?;
    let warnings: Vec<Diagnostic> = report.warnings().cloned().collect();

    let program = if options.fold_constants {
        fold_program(&program)
    } else {
        program
    };
    let go_source = generate(&program);

    Ok(CompilationArtifact {
        go_source,
        program,
        warnings,
    })
}

pub fn compile_source(
    source: &str,
    options: &CompileOptions,
) -> Result<CompilationArtifact, CoreError> {
    compile_units(&[source], options)
}

/// Parse and merge the units, then print them back as canonical source.
pub fn format_units(sources: &[&str]) -> Result<String, CoreError> {
    let units = sources
        .iter()
        .map(|source| parse_unit(source))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format_program(&merge_units(units)?))
}

/// One line per token: `line:column`, kind, quoted lexeme.
pub fn dump_tokens(source: &str) -> String {
    let mut out = String::new();
    for token in tokenize(source) {
        let _ = writeln!(
            out,
            "{}:{}\t{:?}\t{:?}",
            token.position.line, token.position.column, token.kind, token.lexeme
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, StmtKind};
    use crate::diagnostic::DiagnosticKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn merging_units_with_the_same_function_fails() {
        let a = parse_unit("fn foo() -> int { return 1 }").expect("parse");
        let b = parse_unit("fn foo() -> int { return 2 }").expect("parse");
        match merge_units(vec![a, b]) {
            Err(CoreError::DuplicateFunction { name }) => assert_eq!(name, "foo"),
            other => panic!("expected duplicate function, got {other:?}"),
        }
    }

    #[test]
    fn merge_concatenates_functions_and_dedups_imports() {
        let a = parse_unit(r#"import "b"; import "a"; fn main() -> int { return 0 }"#)
            .expect("parse");
        let b = parse_unit(r#"import "a"; import "c"; fn helper() -> int { return 1 }"#)
            .expect("parse");
        let merged = merge_units(vec![a, b]).expect("merge");
        assert_eq!(merged.imports, vec!["b", "a", "c"]);
        let names: Vec<&str> = merged.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main", "helper"]);
    }

    #[test]
    fn duplicates_within_one_unit_reach_the_checker() {
        let err = compile_source(
            "fn main() -> int { return 0 } fn main() -> int { return 1 }",
            &CompileOptions::default(),
        )
        .unwrap_err();
        let CoreError::Structural(diag) = err else {
            panic!("expected structural error");
        };
        assert_eq!(diag.message, "duplicate function `main`");
    }

    #[test]
    fn compiles_multiple_units_to_one_go_file() {
        let artifact = compile_units(
            &[
                "fn main() -> int { Print(greet()) return 0 }",
                r#"fn greet() -> string { return "hi" }"#,
            ],
            &CompileOptions::default(),
        )
        .expect("compile");
        assert!(artifact.go_source.contains("func greet() string {"));
        assert!(artifact.go_source.contains("\tPrint(greet())\n"));
        assert!(artifact.warnings.is_empty());
    }

    #[test]
    fn stops_at_the_first_failing_stage() {
        let options = CompileOptions::default();
        assert!(matches!(
            compile_source("fn main( { }", &options),
            Err(CoreError::Syntax(_))
        ));
        let err = compile_source(r#"fn f() -> int { return "x" }"#, &options).unwrap_err();
        let diag = err.diagnostic().expect("diagnostic");
        assert_eq!(diag.kind, DiagnosticKind::Type);
        assert!(diag.message.contains("`f`"));
        assert!(matches!(
            compile_source("fn f() -> int { return 0 }", &options),
            Err(CoreError::Structural(_))
        ));
    }

    #[test]
    fn warnings_are_returned_with_the_artifact() {
        let artifact = compile_source(
            r#"fn main() -> string { return "x" }"#,
            &CompileOptions::default(),
        )
        .expect("compile");
        let messages: Vec<&str> = artifact.warnings.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["`main` should return `int`"]);
    }

    #[test]
    fn folding_can_be_disabled() {
        let source = "fn main() -> int { return 2 * 21 }";
        let folded = compile_source(source, &CompileOptions::default()).expect("compile");
        assert!(folded.go_source.contains("\treturn 42\n"));

        let options = CompileOptions {
            fold_constants: false,
            ..CompileOptions::default()
        };
        let unfolded = compile_source(source, &options).expect("compile");
        assert!(unfolded.go_source.contains("\treturn 2 * 21\n"));
        let StmtKind::Return(value) = &unfolded.program.functions[0].body.statements[0].kind
        else {
            panic!("expected return");
        };
        assert!(matches!(value.kind, ExprKind::Infix { .. }));
    }

    #[test]
    fn resolved_mode_is_selectable() {
        let source = r#"fn main() -> int { var s: string = "a" var n: int = s return n }"#;
        assert!(compile_source(source, &CompileOptions::default()).is_ok());
        let options = CompileOptions {
            type_mode: TypeMode::Resolved,
            ..CompileOptions::default()
        };
        assert!(matches!(
            compile_source(source, &options),
            Err(CoreError::Type(_))
        ));
    }

    #[test]
    fn formats_merged_units() {
        let text = format_units(&[
            r#"import "x"; fn a() -> int { return 1 }"#,
            "fn main() { return a() }",
        ])
        .expect("format");
        assert_eq!(
            text,
            "import \"x\";\n\nfn a() -> int {\n    return 1;\n}\n\nfn main() -> int {\n    return a();\n}\n"
        );
    }

    #[test]
    fn dumps_tokens_with_positions() {
        assert_eq!(
            dump_tokens("fn main"),
            "1:1\tFn\t\"fn\"\n1:4\tIdent\t\"main\"\n1:8\tEof\t\"\"\n"
        );
    }
}
