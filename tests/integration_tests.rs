use bahasa::config::language_config;
use bahasa::diagnostics::Diagnostics;
use bahasa::keywords::keyword_map;
use bahasa::runner::{RunResult, Runner};
use bahasa::scanner::token::TokenType;
use bahasa::scanner::Scanner;

fn run(source: &str) -> RunResult {
    Runner::new("en").unwrap().run(source)
}

fn run_in(language: &str, source: &str) -> RunResult {
    Runner::new(language).unwrap().run(source)
}

fn assert_output(source: &str, expected: &[&str]) {
    let result = run(source);
    assert!(
        result.success,
        "expected success, got errors: {:?}",
        result.errors
    );
    assert_eq!(result.output, expected);
}

fn assert_runtime_error(source: &str, fragment: &str) {
    let result = run(source);
    assert!(!result.success, "expected failure, got {:?}", result.output);
    assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
    assert!(
        result.errors[0].contains(fragment),
        "expected '{}' in: {}",
        fragment,
        result.errors[0]
    );
}

// --- End-to-end scenarios ---

#[test]
fn arithmetic_and_variables() {
    assert_output("var x = 10\nprint x + 5", &["15"]);
}

#[test]
fn function_call_in_condition() {
    let code = r#"
function area(l, w) {
    return l * w
}
if (area(10, 5) > 40) {
    print "big"
}
"#;
    assert_output(code, &["big"]);
}

#[test]
fn dangling_operator_is_a_syntax_error() {
    let result = run("var x = 10\nprint x +");
    assert!(!result.success);
    assert!(!result.errors.is_empty());
    assert!(
        result.errors[0].contains("line 2"),
        "error should cite line 2: {}",
        result.errors[0]
    );
    assert!(result.output.is_empty());
}

#[test]
fn while_loop_over_array() {
    let code = "var a = [1,2,3]\nvar i = 0\nwhile (i < 3) { print a[i]\n i = i + 1 }";
    assert_output(code, &["1", "2", "3"]);
}

// --- Keyword localization ---

#[test]
fn indonesian_keywords_drive_the_same_semantics() {
    let code = r#"
fungsi hitung_luas(panjang, lebar) {
    kembalikan panjang * lebar
}
jika (hitung_luas(10, 5) > 40) {
    cetak "besar"
}
"#;
    let result = run_in("id", code);
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.output, vec!["besar"]);
}

#[test]
fn localized_programs_produce_identical_output() {
    let en = "var x = 5\nwhile (x > 0) { print x\n x = x - 1 }";
    let id = "var x = 5\nselama (x > 0) { cetak x\n x = x - 1 }";
    let out_en = run_in("en", en);
    let out_id = run_in("id", id);
    assert!(out_en.success && out_id.success);
    assert_eq!(out_en.output, out_id.output);
}

#[test]
fn localized_programs_scan_to_identical_token_kinds() {
    let kinds = |language: &str, source: &str| -> Vec<TokenType> {
        let config = language_config(language).unwrap();
        let keywords = keyword_map(&config);
        let mut diagnostics = Diagnostics::new(source);
        let tokens = Scanner::new(source, &keywords, &mut diagnostics).scan_tokens();
        assert!(!diagnostics.has_errors());
        tokens.into_iter().map(|t| t.token_type).collect()
    };

    let en = kinds("en", "if (true and null) { print \"x\" } else { return false }");
    let id = kinds("id", "jika (benar dan kosong) { cetak \"x\" } lainnya { kembalikan salah }");
    assert_eq!(en, id);
}

#[test]
fn english_keyword_is_plain_identifier_in_indonesian() {
    // 'print' has no meaning under the Indonesian table
    let result = run_in("id", "cetak print");
    assert!(!result.success);
    assert!(result.errors[0].contains("Undefined variable 'print'"));
}

#[test]
fn unknown_language_code_lists_available_ones() {
    let err = Runner::new("xx").err().unwrap().to_string();
    assert!(err.contains("en"), "{}", err);
    assert!(err.contains("id"), "{}", err);
}

// --- Operators and values ---

#[test]
fn string_concatenation_when_either_side_is_a_string() {
    assert_output("print \"Hello \" + \"world\"", &["Hello world"]);
    assert_output("print 1 + \"a\"", &["1a"]);
    assert_output("print \"n=\" + 42", &["n=42"]);
}

#[test]
fn numeric_arithmetic() {
    assert_output("print 7 / 2", &["3.5"]);
    assert_output("print 7 % 3", &["1"]);
    assert_output("print 2 * 3 - 1", &["5"]);
}

#[test]
fn division_by_zero_fails() {
    assert_runtime_error("print 10 / 0", "Division by zero");
}

#[test]
fn precedence_ladder() {
    assert_output("print 1 + 2 * 3", &["7"]);
    assert_output("print (1 + 2) * 3", &["9"]);
    assert_output("print 1 < 2 == true", &["true"]);
}

#[test]
fn equality_does_not_coerce() {
    assert_output("print 1 == \"1\"", &["false"]);
    assert_output("print null == false", &["false"]);
    assert_output("print 0 == -0", &["true"]);
    assert_output("print 1 != 2", &["true"]);
}

#[test]
fn comparison_operators() {
    assert_output("print 2 > 1", &["true"]);
    assert_output("print 2 >= 2", &["true"]);
    assert_output("print 1 < 1", &["false"]);
    assert_output("print 1 <= 1", &["true"]);
}

#[test]
fn unary_operators() {
    assert_output("print -5", &["-5"]);
    assert_output("print !true", &["false"]);
    assert_output("print !null", &["true"]);
    // Zero is truthy, so negating it is false
    assert_output("print !0", &["false"]);
}

#[test]
fn numeric_operator_rejects_mismatched_operands() {
    assert_runtime_error("print 1 - \"a\"", "Cannot apply '-'");
    assert_runtime_error("print \"a\" < \"b\"", "Cannot apply '<'");
}

#[test]
fn truthiness_of_non_booleans() {
    assert_output("if (0) { print \"zero\" }", &["zero"]);
    assert_output("if (\"\") { print \"empty\" }", &["empty"]);
    assert_output("if ([]) { print \"array\" }", &["array"]);
    assert_output(
        "if (null) { print \"yes\" } else { print \"no\" }",
        &["no"],
    );
}

#[test]
fn logical_operators_combine_truthiness() {
    assert_output("print true and false", &["false"]);
    assert_output("print null or 1", &["true"]);
}

#[test]
fn logical_operators_do_not_short_circuit() {
    // The right side runs even when the left already decides the result
    let code = "var x = 0\nprint false and (x = 1)\nprint x";
    assert_output(code, &["false", "1"]);
}

#[test]
fn short_circuit_would_have_hidden_this_failure() {
    let result = run("print true or 1 / 0");
    assert!(!result.success);
    assert!(result.errors[0].contains("Division by zero"));
}

// --- Scoping ---

#[test]
fn block_scope_shadows_and_restores() {
    let code = "var x = 1\n{\n var x = 2\n print x\n}\nprint x";
    assert_output(code, &["2", "1"]);
}

#[test]
fn duplicate_definition_in_same_scope_fails() {
    assert_runtime_error("var x = 1\nvar x = 2", "already defined in this scope");
}

#[test]
fn assignment_reaches_the_enclosing_scope() {
    assert_output("var x = 1\n{\n x = 5\n}\nprint x", &["5"]);
}

#[test]
fn undefined_variable_fails() {
    assert_runtime_error("print y", "Undefined variable 'y'");
}

#[test]
fn uninitialized_var_defaults_to_null() {
    assert_output("var x\nprint x", &["null"]);
}

#[test]
fn constants_can_be_read_but_not_reassigned() {
    assert_output("const c = 7\nprint c + c", &["14"]);
    assert_runtime_error("const c = 1\nc = 2", "Cannot reassign constant 'c'");
}

#[test]
fn constant_is_protected_from_inner_scopes_too() {
    assert_runtime_error("const c = 1\n{\n c = 2\n}", "Cannot reassign constant 'c'");
}

#[test]
fn while_body_gets_a_fresh_frame_each_iteration() {
    // 'var tmp' would collide with itself if the frame were reused
    let code = "var i = 0\nwhile (i < 3) {\n var tmp = i\n i = i + 1\n}\nprint i";
    assert_output(code, &["3"]);
}

// --- Functions and closures ---

#[test]
fn function_without_return_yields_null() {
    assert_output("function f() { }\nprint f()", &["null"]);
}

#[test]
fn early_return_skips_the_rest_of_the_body() {
    let code = r#"
function f() {
    return 1
    print "unreachable"
}
print f()
"#;
    assert_output(code, &["1"]);
}

#[test]
fn bare_return_yields_null() {
    assert_output("function f() { return }\nprint f()", &["null"]);
}

#[test]
fn closures_capture_the_declaration_environment() {
    let code = r#"
function make_counter() {
    var count = 0
    function inc() {
        count = count + 1
        return count
    }
    return inc
}
var counter = make_counter()
counter()
counter()
print counter()
"#;
    assert_output(code, &["3"]);
}

#[test]
fn each_closure_gets_its_own_capture() {
    let code = r#"
function make_counter() {
    var count = 0
    function inc() {
        count = count + 1
        return count
    }
    return inc
}
var a = make_counter()
var b = make_counter()
a()
print a()
print b()
"#;
    assert_output(code, &["2", "1"]);
}

#[test]
fn recursion() {
    let code = r#"
function fib(n) {
    if (n < 2) { return n }
    return fib(n - 1) + fib(n - 2)
}
print fib(10)
"#;
    assert_output(code, &["55"]);
}

#[test]
fn wrong_argument_count_names_function_and_counts() {
    assert_runtime_error(
        "function f(a) { }\nf(1, 2)",
        "Function 'f' expects 1 arguments, but got 2",
    );
}

#[test]
fn duplicate_parameter_names_collide_when_bound() {
    assert_runtime_error(
        "function f(a, a) { }\nf(1, 2)",
        "already defined in this scope",
    );
}

#[test]
fn calling_a_non_function_fails() {
    assert_runtime_error("var x = 1\nx()", "Can only call functions");
}

#[test]
fn parameter_shadows_outer_binding() {
    let code = r#"
var x = "outer"
function f(x) {
    print x
}
f("inner")
print x
"#;
    assert_output(code, &["inner", "outer"]);
}

#[test]
fn functions_print_as_opaque_tags() {
    assert_output("function greet() { }\nprint greet", &["<function greet>"]);
}

#[test]
fn chained_calls_and_indexing() {
    let code = r#"
function make() {
    function inner() {
        return [10, 20]
    }
    return inner
}
print make()()[1]
"#;
    assert_output(code, &["20"]);
}

#[test]
fn top_level_return_stops_the_program_quietly() {
    let result = run("print 1\nreturn 0\nprint 2");
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.output, vec!["1"]);
}

// --- Arrays ---

#[test]
fn array_literals_print_recursively() {
    assert_output("print [1, 2, 3]", &["[1, 2, 3]"]);
    assert_output("print [[1], [\"a\", null]]", &["[[1], [a, null]]"]);
    assert_output("print []", &["[]"]);
}

#[test]
fn nested_indexing() {
    assert_output("var a = [[1, 2], [3, 4]]\nprint a[1][0]", &["3"]);
}

#[test]
fn index_out_of_bounds_cites_index_and_length() {
    assert_runtime_error(
        "var a = [10, 20, 30]\nprint a[3]",
        "Array index 3 out of bounds (array length: 3)",
    );
}

#[test]
fn negative_index_is_out_of_bounds_not_wraparound() {
    assert_runtime_error(
        "var a = [10, 20, 30]\nprint a[-1]",
        "Array index -1 out of bounds (array length: 3)",
    );
}

#[test]
fn non_numeric_index_fails() {
    assert_runtime_error("print [1][\"0\"]", "Array index must be a number");
}

#[test]
fn indexing_a_non_array_fails() {
    assert_runtime_error("var x = 5\nprint x[0]", "Can only index into arrays");
}

#[test]
fn arrays_compare_by_value() {
    assert_output("print [1, 2] == [1, 2]", &["true"]);
    assert_output("print [1, 2] == [1, 3]", &["false"]);
    assert_output("print [1] == 1", &["false"]);
}

// --- Control flow ---

#[test]
fn else_if_chain() {
    let code = r#"
var x = 2
if (x == 1) {
    print "one"
} else if (x == 2) {
    print "two"
} else {
    print "other"
}
"#;
    assert_output(code, &["two"]);
}

#[test]
fn assignment_is_right_associative() {
    let code = "var a = 1\nvar b = 2\na = b = 3\nprint a\nprint b";
    assert_output(code, &["3", "3"]);
}

#[test]
fn assignment_expression_yields_the_value() {
    assert_output("var a = 1\nprint a = 9", &["9"]);
}

// --- Syntax errors and recovery ---

#[test]
fn one_pass_reports_multiple_syntax_errors() {
    let code = "var = 1\nprint \"ok\"\nvar y = )\nprint \"done\"";
    let result = run(code);
    assert!(!result.success);
    assert_eq!(result.errors.len(), 2, "errors: {:?}", result.errors);
    // Nothing ran
    assert!(result.output.is_empty());
}

#[test]
fn syntax_error_frames_expectation_and_found_token() {
    let result = run("var 5 = 1");
    assert!(!result.success);
    assert!(
        result.errors[0].contains("I was expecting a variable name, but found '5' instead"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn missing_closing_brace_reports_end_of_file() {
    let result = run("if (true) { print 1");
    assert!(!result.success);
    assert!(result.errors[0].contains("'}'"), "{}", result.errors[0]);
    assert!(
        result.errors[0].contains("end of file"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn if_requires_parenthesized_condition() {
    let result = run("if true { }");
    assert!(!result.success);
    assert!(result.errors[0].contains("'('"), "{}", result.errors[0]);
}

#[test]
fn invalid_assignment_target_is_reported() {
    let result = run("var a = [1]\na[0] = 5");
    assert!(!result.success);
    assert!(
        result.errors[0].contains("Invalid assignment target"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn syntax_diagnostics_carry_a_caret_snippet() {
    let result = run("print +");
    assert!(!result.success);
    let block = &result.errors[0];
    assert!(block.contains("1 | print +"), "{}", block);
    assert!(block.contains('^'), "{}", block);
}

// --- Lexical errors ---

#[test]
fn each_bad_character_gets_its_own_diagnostic() {
    let result = run("var @ = 1\nvar # = 2");
    assert!(!result.success);
    assert_eq!(result.errors.len(), 2, "errors: {:?}", result.errors);
    assert!(result.errors[0].contains("Unexpected character: '@'"));
    assert!(result.errors[1].contains("Unexpected character: '#'"));
}

#[test]
fn unterminated_string_names_the_missing_quote() {
    let result = run("print \"oops");
    assert!(!result.success);
    assert!(
        result.errors[0].contains("I was expecting a closing \", but found 'end of file'"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn strings_may_span_lines() {
    assert_output("print \"a\nb\"", &["a\nb"]);
}

#[test]
fn comments_are_ignored() {
    assert_output("// a comment\nprint 1 // trailing\n// done", &["1"]);
}

// --- Runtime diagnostics ---

#[test]
fn runtime_error_cites_the_failing_line() {
    let result = run("var x = 10\nprint x / 0");
    assert!(!result.success);
    assert!(
        result.errors[0].contains("Runtime error on line 2"),
        "{}",
        result.errors[0]
    );
}

#[test]
fn runtime_failure_aborts_remaining_statements() {
    let result = run("print 1\nprint 1 / 0\nprint 2");
    assert_eq!(result.output, vec!["1"]);
    assert_eq!(result.errors.len(), 1);
}

// --- Pipeline behavior ---

#[test]
fn interpreter_never_runs_on_a_syntactically_invalid_program() {
    // The first line would print if execution started
    let result = run("print \"ran\"\nvar = broken");
    assert!(!result.success);
    assert!(result.output.is_empty());
}

#[test]
fn runs_are_deterministic() {
    let code = "var i = 0\nwhile (i < 5) { print i * i\n i = i + 1 }";
    let first = run(code);
    let second = run(code);
    assert!(first.success);
    assert_eq!(first.output, second.output);
}

#[test]
fn output_callback_fires_per_print_in_order() {
    let runner = Runner::new("en").unwrap();
    let mut seen = Vec::new();
    let result = runner.run_with_output("print 1\nprint 2\nprint 3", &mut |text| {
        seen.push(text.to_string())
    });
    assert!(result.success);
    assert_eq!(seen, vec!["1", "2", "3"]);
    assert_eq!(result.output, seen);
}

#[test]
fn success_is_false_whenever_any_diagnostic_exists() {
    assert!(!run("@").success);
    assert!(!run("print +").success);
    assert!(!run("print missing").success);
    assert!(run("print 1").success);
}

#[test]
fn whole_number_output_has_no_decimal_point() {
    assert_output("print 10 / 2", &["5"]);
    assert_output("print 2.5 + 2.5", &["5"]);
    assert_output("print 1.5", &["1.5"]);
}
