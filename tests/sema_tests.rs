//! Integration tests for the semantic-analysis pipeline.
//!
//! Each test assembles a parsed module graph by hand, in the shape the
//! parser hands over (top-level declarations waiting in the units'
//! transient buffers), runs the full pipeline, and checks the resolved
//! graph and the collected diagnostics.

use sable::ast::{BinaryOp, StmtKind};
use sable::prelude::*;

/// Capture pass logs when a test runs with `RUST_LOG` set.
fn run_sema(registry: &mut ModuleRegistry, env: &BuildEnv) -> Diagnostics {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    analyse(registry, env)
}

fn sp(line: u32, col: u32) -> Span {
    Span::new(line, col, 1)
}

fn ty(name: &str, line: u32) -> TypeRef {
    TypeRef::new(name, sp(line, 1))
}

fn record(name: &str, line: u32) -> Decl {
    Decl::new(name, sp(line, 1), DeclKind::Type { fields: vec![] })
}

fn function(name: &str, line: u32, ret: Option<TypeRef>, body: Option<Vec<Stmt>>) -> Decl {
    Decl::new(
        name,
        sp(line, 1),
        DeclKind::Function {
            signature: Signature { params: vec![], ret },
            body,
        },
    )
}

fn function_with_param(name: &str, line: u32, param_ty: &str) -> Decl {
    Decl::new(
        name,
        sp(line, 1),
        DeclKind::Function {
            signature: Signature {
                params: vec![Param {
                    name: "value".to_string(),
                    ty: ty(param_ty, line),
                    span: sp(line, 10),
                }],
                ret: None,
            },
            body: None,
        },
    )
}

fn generic(name: &str, line: u32, param_ty: &str) -> Decl {
    Decl::new(
        name,
        sp(line, 1),
        DeclKind::Generic {
            type_params: vec![],
            signature: Signature {
                params: vec![Param {
                    name: "value".to_string(),
                    ty: ty(param_ty, line),
                    span: sp(line, 10),
                }],
                ret: None,
            },
        },
    )
}

fn count_poisoned(unit: &CompilationUnit) -> usize {
    DeclCategory::ANALYSIS_ORDER
        .iter()
        .flat_map(|&category| unit.category(category))
        .filter(|decl| decl.is_poisoned())
        .count()
}

// =============================================================================
// Import resolution
// =============================================================================

#[test]
fn test_duplicate_import_reported_once() {
    let mut registry = ModuleRegistry::new();
    registry.get_or_create("a", false);
    let app = registry.get_or_create("app", false);

    let mut unit = CompilationUnit::new("app.sb");
    unit.imports.push(Decl::import("a", false, sp(1, 8)));
    unit.imports.push(Decl::import("a", false, sp(2, 8)));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);

    let diag = diags.iter().next().unwrap();
    assert!(matches!(
        diag.error,
        SemaError::DuplicateDeclaration { kind: "import", .. }
    ));
    // Anchored at the second occurrence, pointing back at the first.
    assert_eq!(diag.span(), sp(2, 8));
    assert_eq!(diag.notes[0].span, sp(1, 8));

    let unit = &registry.module(app).units[0];
    assert!(unit.imports[0].is_done());
    assert!(unit.imports[1].is_poisoned());
}

#[test]
fn test_triple_import_flags_each_against_first() {
    let mut registry = ModuleRegistry::new();
    registry.get_or_create("a", false);
    let app = registry.get_or_create("app", false);

    let mut unit = CompilationUnit::new("app.sb");
    for line in 1..=3 {
        unit.imports.push(Decl::import("a", false, sp(line, 8)));
    }
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 2);
    for diag in diags.iter() {
        // Every duplicate references the first import, not the previous
        // duplicate.
        assert_eq!(diag.notes[0].span, sp(1, 8));
    }
}

#[test]
fn test_self_import_rejected() {
    let mut registry = ModuleRegistry::new();
    registry.get_or_create("other", false);
    let app = registry.get_or_create("app", false);

    let mut unit = CompilationUnit::new("app.sb");
    unit.imports.push(Decl::import("other", false, sp(1, 8)));
    unit.imports.push(Decl::import("app", false, sp(2, 8)));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    assert!(matches!(
        diags.iter().next().unwrap().error,
        SemaError::IllegalSelfReference { .. }
    ));
    let unit = &registry.module(app).units[0];
    assert!(unit.imports[0].is_done());
    assert!(unit.imports[1].is_poisoned());
}

#[test]
fn test_private_module_gate() {
    let mut registry = ModuleRegistry::new();
    registry.get_or_create("secret", true);
    let app = registry.get_or_create("app", false);

    let mut unit = CompilationUnit::new("app.sb");
    unit.imports.push(Decl::import("secret", false, sp(1, 8)));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    assert!(matches!(
        diags.iter().next().unwrap().error,
        SemaError::VisibilityViolation { .. }
    ));

    // The identical import with the qualifier succeeds.
    let mut registry = ModuleRegistry::new();
    registry.get_or_create("secret", true);
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.imports.push(Decl::import("secret", true, sp(1, 8)));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert!(!diags.has_errors());
    assert!(registry.module(app).units[0].imports[0].is_done());
}

#[test]
fn test_missing_module_does_not_stop_the_sweep() {
    let mut registry = ModuleRegistry::new();
    registry.get_or_create("a", false);
    let app = registry.get_or_create("app", false);

    let mut unit = CompilationUnit::new("app.sb");
    unit.imports.push(Decl::import("nope", false, sp(1, 8)));
    unit.imports.push(Decl::import("a", false, sp(2, 8)));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    assert!(matches!(
        diags.iter().next().unwrap().error,
        SemaError::UnresolvedReference { kind: "module", .. }
    ));
    let unit = &registry.module(app).units[0];
    assert!(unit.imports[0].is_poisoned());
    assert!(unit.imports[1].is_done());
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_duplicate_symbol_across_units() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);

    let mut one = CompilationUnit::new("one.sb");
    one.push_global(record("T", 1));
    let mut two = CompilationUnit::new("two.sb");
    two.push_global(record("T", 2));
    registry.module_mut(app).add_unit(one);
    registry.module_mut(app).add_unit(two);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    let diag = diags.iter().next().unwrap();
    assert!(matches!(
        diag.error,
        SemaError::DuplicateDeclaration { kind: "symbol", .. }
    ));
    assert_eq!(diag.file, "two.sb");
    assert_eq!(diag.notes[0].file, "one.sb");

    let module = registry.module(app);
    // First registration wins the symbol entry.
    assert_eq!(module.symbol("T").unwrap().unit, 0);
    assert!(module.units[0].types[0].is_done());
    assert!(module.units[1].types[0].is_poisoned());
}

#[test]
fn test_main_files_into_its_slot() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);

    let mut unit = CompilationUnit::new("app.sb");
    unit.push_global(function("main", 1, None, Some(vec![Stmt::ret(None, sp(2, 5))])));
    unit.push_global(function("helper", 4, None, None));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert!(!diags.has_errors());
    let unit = &registry.module(app).units[0];
    assert!(unit.main_function.as_ref().is_some_and(|d| d.is_done()));
    assert_eq!(unit.functions.len(), 1);
    assert!(unit.global_decls.is_empty());
}

// =============================================================================
// Conditional compilation
// =============================================================================

fn false_false_else_chain() -> Decl {
    Decl::new(
        "$if",
        sp(1, 1),
        DeclKind::CtIf {
            cond: Expr::bool_lit(false, sp(1, 5)),
            then_decls: vec![record("A", 2)],
            rest: vec![
                CtBranch::Elif {
                    cond: Expr::bool_lit(false, sp(3, 7)),
                    decls: vec![record("B", 4)],
                    span: sp(3, 1),
                },
                CtBranch::Else {
                    decls: vec![record("Fallback", 6)],
                    span: sp(5, 1),
                },
            ],
        },
    )
}

#[test]
fn test_conditional_files_only_one_branch() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.ct_ifs.push(false_false_else_chain());
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert!(!diags.has_errors());

    let unit = &registry.module(app).units[0];
    let names: Vec<&str> = unit.types.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["Fallback"]);
    assert!(unit.types[0].is_done());
    assert!(unit.ct_ifs[0].is_done());
}

#[test]
fn test_conditional_eval_error_takes_no_branch() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.ct_ifs.push(Decl::new(
        "$if",
        sp(1, 1),
        DeclKind::CtIf {
            cond: Expr::ident("UNKNOWN", sp(1, 5)),
            then_decls: vec![record("A", 2)],
            rest: vec![CtBranch::Else {
                decls: vec![record("B", 4)],
                span: sp(3, 1),
            }],
        },
    ));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    assert!(matches!(
        diags.iter().next().unwrap().error,
        SemaError::CompileTimeEvaluationError { .. }
    ));

    let unit = &registry.module(app).units[0];
    assert!(unit.types.is_empty());
    assert!(unit.ct_ifs[0].is_poisoned());
}

#[test]
fn test_conditional_picks_elif_on_build_constant() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.ct_ifs.push(Decl::new(
        "$if",
        sp(1, 1),
        DeclKind::CtIf {
            cond: Expr::ident("WINDOWS", sp(1, 5)),
            then_decls: vec![record("WinIo", 2)],
            rest: vec![CtBranch::Elif {
                cond: Expr::ident("POSIX", sp(3, 7)),
                decls: vec![record("PosixIo", 4)],
                span: sp(3, 1),
            }],
        },
    ));
    registry.module_mut(app).add_unit(unit);

    let env = BuildEnv::new()
        .with_const("WINDOWS", ConstValue::Bool(false))
        .with_const("POSIX", ConstValue::Bool(true));
    let diags = run_sema(&mut registry, &env);
    assert!(!diags.has_errors());

    let names: Vec<&str> = registry.module(app).units[0]
        .types
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, ["PosixIo"]);
}

// =============================================================================
// Compile-time assertions
// =============================================================================

#[test]
fn test_assert_failure_reports_its_message() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.ct_asserts.push(Decl::new(
        "$assert",
        sp(1, 1),
        DeclKind::CtAssert {
            cond: Expr::binary(
                BinaryOp::Ge,
                Expr::ident("VERSION", sp(1, 9)),
                Expr::int_lit(4, sp(1, 20)),
                sp(1, 9),
            ),
            message: Some("version 4 or newer required".to_string()),
        },
    ));
    registry.module_mut(app).add_unit(unit);

    let env = BuildEnv::new().with_const("VERSION", ConstValue::Int(3));
    let diags = run_sema(&mut registry, &env);
    assert_eq!(diags.error_count(), 1);
    match &diags.iter().next().unwrap().error {
        SemaError::AssertionFailed { message, .. } => {
            assert_eq!(message, "version 4 or newer required");
        }
        other => panic!("expected AssertionFailed, got {other:?}"),
    }
    assert!(registry.module(app).units[0].ct_asserts[0].is_poisoned());
}

#[test]
fn test_assert_observes_conditionally_injected_decls() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.ct_ifs.push(Decl::new(
        "$if",
        sp(1, 1),
        DeclKind::CtIf {
            cond: Expr::bool_lit(true, sp(1, 5)),
            then_decls: vec![record("Injected", 2)],
            rest: vec![],
        },
    ));
    unit.ct_asserts.push(Decl::new(
        "$assert",
        sp(5, 1),
        DeclKind::CtAssert {
            cond: Expr::defined("Injected", sp(5, 9)),
            message: None,
        },
    ));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert!(!diags.has_errors());
    assert!(registry.module(app).units[0].ct_asserts[0].is_done());
}

// =============================================================================
// Declaration analysis
// =============================================================================

#[test]
fn test_signature_resolves_type_declared_later_in_unit() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.push_global(function("make", 1, Some(ty("T", 1)), None));
    unit.push_global(record("T", 5));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert!(!diags.has_errors());
    let unit = &registry.module(app).units[0];
    assert!(unit.functions[0].is_done());
    assert!(unit.types[0].is_done());
}

#[test]
fn test_poison_does_not_spread_to_siblings() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    for i in 0..5 {
        unit.push_global(record(&format!("T{i}"), 1 + i));
    }
    unit.push_global(function_with_param("bad", 10, "Missing"));
    for i in 0..4 {
        unit.push_global(function(&format!("f{i}"), 20 + i, None, None));
    }
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);

    let unit = &registry.module(app).units[0];
    assert_eq!(count_poisoned(unit), 1);
    assert!(unit.types.iter().all(|d| d.is_done()));
    let done = unit.functions.iter().filter(|d| d.is_done()).count();
    assert_eq!(done, 4);
}

#[test]
fn test_mutually_recursive_generics_report_a_cycle() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.push_global(generic("A", 1, "B"));
    unit.push_global(generic("B", 4, "A"));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    assert!(matches!(
        diags.iter().next().unwrap().error,
        SemaError::ResolutionCycle { .. }
    ));

    let unit = &registry.module(app).units[0];
    assert!(unit.generics.iter().all(|d| d.is_poisoned()));
}

#[test]
fn test_var_initialiser_cycle_is_detected() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.push_global(Decl::new(
        "a",
        sp(1, 1),
        DeclKind::Var {
            ty: None,
            init: Some(Expr::ident("b", sp(1, 9))),
        },
    ));
    unit.push_global(Decl::new(
        "b",
        sp(2, 1),
        DeclKind::Var {
            ty: None,
            init: Some(Expr::ident("a", sp(2, 9))),
        },
    ));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    assert!(matches!(
        diags.iter().next().unwrap().error,
        SemaError::ResolutionCycle { .. }
    ));
}

#[test]
fn test_method_resolves_receiver_and_registers_qualified() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.push_global(Decl::new(
        "scale",
        sp(1, 1),
        DeclKind::Method {
            receiver: ty("Point", 1),
            signature: Signature::default(),
            body: Some(vec![Stmt::expr(
                Expr::call("helper", vec![], sp(2, 5)),
                sp(2, 5),
            )]),
        },
    ));
    unit.push_global(record("Point", 5));
    unit.push_global(function("helper", 7, None, None));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert!(!diags.has_errors());

    let module = registry.module(app);
    // Methods register under their receiver's name, so a free `scale`
    // would not collide.
    assert!(module.symbol("Point.scale").is_some());
    assert!(module.symbol("scale").is_none());
    assert!(module.units[0].methods[0].is_done());
}

#[test]
fn test_generic_define_must_target_a_generic() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.push_global(generic("List", 1, "int"));
    unit.push_global(record("Plain", 3));
    unit.push_global(Decl::new(
        "IntList",
        sp(5, 1),
        DeclKind::GenericDefine {
            target: ty("List", 5),
            args: vec![ty("int", 5)],
        },
    ));
    unit.push_global(Decl::new(
        "Bad",
        sp(6, 1),
        DeclKind::GenericDefine {
            target: ty("Plain", 6),
            args: vec![],
        },
    ));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    assert!(matches!(
        diags.iter().next().unwrap().error,
        SemaError::UnresolvedReference { kind: "generic", .. }
    ));

    let unit = &registry.module(app).units[0];
    assert!(unit.generic_defines[0].is_done());
    assert!(unit.generic_defines[1].is_poisoned());
}

#[test]
fn test_private_decl_is_invisible_through_an_import() {
    let mut registry = ModuleRegistry::new();
    let lib = registry.get_or_create("lib", false);
    let mut lib_unit = CompilationUnit::new("lib.sb");
    lib_unit.push_global(record("Shared", 1));
    lib_unit.push_global(record("Hidden", 2).with_flags(DeclFlags::PRIVATE));
    registry.module_mut(lib).add_unit(lib_unit);

    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.imports.push(Decl::import("lib", false, sp(1, 8)));
    unit.push_global(function("ok", 3, Some(ty("Shared", 3)), None));
    unit.push_global(function("nope", 5, Some(ty("Hidden", 5)), None));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    assert!(matches!(
        diags.iter().next().unwrap().error,
        SemaError::UnresolvedReference { kind: "type", .. }
    ));

    let unit = &registry.module(app).units[0];
    assert!(unit.functions[0].is_done());
    assert!(unit.functions[1].is_poisoned());
}

// =============================================================================
// Function bodies
// =============================================================================

#[test]
fn test_body_calls_function_from_later_module() {
    let mut registry = ModuleRegistry::new();
    // Module `a` is created (and therefore processed) before `b`.
    let a = registry.get_or_create("a", false);
    let mut a_unit = CompilationUnit::new("a.sb");
    a_unit.imports.push(Decl::import("b", false, sp(1, 8)));
    a_unit.push_global(function(
        "caller",
        3,
        None,
        Some(vec![Stmt::expr(
            Expr::call("later_fn", vec![], sp(4, 5)),
            sp(4, 5),
        )]),
    ));
    registry.module_mut(a).add_unit(a_unit);

    let b = registry.get_or_create("b", false);
    let mut b_unit = CompilationUnit::new("b.sb");
    b_unit.push_global(function("later_fn", 1, None, None));
    registry.module_mut(b).add_unit(b_unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert!(!diags.has_errors());
    assert!(registry.module(a).units[0].functions[0].is_done());
}

#[test]
fn test_undeclared_symbol_in_body_poisons_only_that_function() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    unit.push_global(function(
        "broken",
        1,
        None,
        Some(vec![Stmt::expr(Expr::ident("ghost", sp(2, 5)), sp(2, 5))]),
    ));
    unit.push_global(function(
        "fine",
        5,
        None,
        Some(vec![Stmt::ret(None, sp(6, 5))]),
    ));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);

    let unit = &registry.module(app).units[0];
    assert!(unit.functions[0].is_poisoned());
    assert!(unit.functions[1].is_done());
}

#[test]
fn test_locals_scope_and_shadowing() {
    let mut registry = ModuleRegistry::new();
    let app = registry.get_or_create("app", false);
    let mut unit = CompilationUnit::new("app.sb");
    // { let x; { let x; } let y = x; }
    unit.push_global(function(
        "scoped",
        1,
        None,
        Some(vec![
            Stmt::local("x", Some(ty("int", 2)), None, sp(2, 5)),
            Stmt {
                kind: StmtKind::Block(vec![Stmt::local("x", None, None, sp(3, 9))]),
                span: sp(3, 5),
            },
            Stmt::local("y", None, Some(Expr::ident("x", sp(5, 13))), sp(5, 5)),
        ]),
    ));
    // let x; let x; -- same scope, rejected
    unit.push_global(function(
        "clash",
        8,
        None,
        Some(vec![
            Stmt::local("x", None, None, sp(9, 5)),
            Stmt::local("x", None, None, sp(10, 5)),
        ]),
    ));
    registry.module_mut(app).add_unit(unit);

    let diags = run_sema(&mut registry, &BuildEnv::new());
    assert_eq!(diags.error_count(), 1);
    let diag = diags.iter().next().unwrap();
    assert!(matches!(
        diag.error,
        SemaError::DuplicateDeclaration { kind: "local", .. }
    ));
    assert_eq!(diag.notes[0].span, sp(9, 5));

    let unit = &registry.module(app).units[0];
    assert!(unit.functions[0].is_done());
    assert!(unit.functions[1].is_poisoned());
}
