use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cw() -> Command {
    Command::cargo_bin("cw").expect("binary exists")
}

#[test]
fn compiles_a_file_to_go() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.cw");
    fs::write(&input_path, "fn main() -> int { return 1 + 2 }").expect("write input");
    let output_path = dir.path().join("out/main.go");

    cw().arg(&input_path)
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let go = fs::read_to_string(&output_path).expect("read go");
    assert!(go.starts_with("// Code generated by clockwise. DO NOT EDIT.\n"));
    assert!(go.contains("func cwMain() int {\n\treturn 3\n}"));
    assert!(go.contains("os.Exit(cwMain())"));
}

#[test]
fn reads_source_from_stdin() {
    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("main.go");

    cw().arg("-o")
        .arg(&output_path)
        .arg("--no-fold")
        .write_stdin("fn main() -> int { return 1 + 2 }")
        .assert()
        .success();

    let go = fs::read_to_string(&output_path).expect("read go");
    assert!(go.contains("\treturn 1 + 2\n"));
}

#[test]
fn merges_a_directory_of_units() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    fs::create_dir_all(&src).expect("mkdir");
    fs::write(src.join("a.cw"), "fn main() -> int { return helper() }").expect("write");
    fs::write(src.join("b.cw"), "fn helper() -> int { return 7 }").expect("write");
    let output_path = dir.path().join("main.go");

    cw().arg(&src).arg("-o").arg(&output_path).assert().success();

    let go = fs::read_to_string(&output_path).expect("read go");
    let main_at = go.find("func cwMain()").expect("cwMain");
    let helper_at = go.find("func helper()").expect("helper");
    assert!(main_at < helper_at);
}

#[test]
fn rejects_duplicate_functions_across_files() {
    let dir = tempdir().expect("tempdir");
    let a = dir.path().join("a.cw");
    let b = dir.path().join("b.cw");
    fs::write(&a, "fn main() -> int { return 0 }\nfn foo() -> int { return 1 }").expect("write");
    fs::write(&b, "fn foo() -> int { return 2 }").expect("write");

    cw().arg(&a)
        .arg(&b)
        .arg("-o")
        .arg(dir.path().join("main.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate function `foo`"));
}

#[test]
fn reports_type_errors_with_position() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.cw");
    fs::write(&input_path, "fn f() -> int { return \"x\" }").expect("write input");
    let output_path = dir.path().join("main.go");

    cw().arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("return type mismatch in function `f`"))
        .stderr(predicate::str::contains("line 1 col 17"));

    assert!(!output_path.exists());
}

#[test]
fn prints_lint_warnings_but_succeeds() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.cw");
    fs::write(&input_path, "fn main() -> string { return \"hi\" }").expect("write input");

    cw().arg(&input_path)
        .arg("-o")
        .arg(dir.path().join("main.go"))
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: `main` should return `int`"));
}

#[test]
fn resolve_types_flag_enables_resolution() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.cw");
    fs::write(
        &input_path,
        "fn main() -> int { var s: string = \"a\" var n: int = s return n }",
    )
    .expect("write input");

    cw().arg(&input_path)
        .arg("-o")
        .arg(dir.path().join("literal.go"))
        .assert()
        .success();

    cw().arg(&input_path)
        .arg("-o")
        .arg(dir.path().join("resolved.go"))
        .arg("--resolve-types")
        .assert()
        .failure()
        .stderr(predicate::str::contains("type mismatch for variable `n`"));
}

#[test]
fn emits_formatted_source() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.cw");
    fs::write(&input_path, "fn main(){var x=a[1] return 0}").expect("write input");
    let output_path = dir.path().join("main.cw.fmt");

    cw().arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .arg("--emit")
        .arg("fmt")
        .assert()
        .success();

    let text = fs::read_to_string(&output_path).expect("read fmt");
    assert_eq!(
        text,
        "fn main() -> int {\n    var x = a[1];\n    return 0;\n}\n"
    );
}

#[test]
fn emits_tokens() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.cw");
    fs::write(&input_path, "fn main").expect("write input");
    let output_path = dir.path().join("tokens.txt");

    cw().arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .arg("--emit")
        .arg("tokens")
        .assert()
        .success();

    let dump = fs::read_to_string(&output_path).expect("read tokens");
    assert!(dump.starts_with("1:1\tFn\t\"fn\"\n"));
    assert!(dump.ends_with("Eof\t\"\"\n"));
}

#[test]
fn rejects_unknown_emit_format() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.cw");
    fs::write(&input_path, "fn main() -> int { return 0 }").expect("write input");

    cw().arg(&input_path)
        .arg("-o")
        .arg(dir.path().join("out"))
        .arg("--emit")
        .arg("rust")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported emit format: rust"));
}

#[test]
fn reports_missing_input_file() {
    let dir = tempdir().expect("tempdir");

    cw().arg(dir.path().join("missing.cw"))
        .arg("-o")
        .arg(dir.path().join("main.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input file"));
}
