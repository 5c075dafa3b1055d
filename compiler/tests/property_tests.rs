// Property-based tests for analyzer invariants.
//
// Three categories:
// 1. Accepted programs: recorded stack heights are non-negative and the
//    root block is stack-neutral
// 2. Rejected programs always carry at least one diagnostic, and analysis
//    is deterministic across fresh runs
// 3. Structural properties: removing a used declaration breaks exactly its
//    use sites; independent sibling declarations commute
//
// Uses proptest with explicit configuration to prevent CI flakiness.

use proptest::prelude::*;

use siltc::analyze::{AnalysisInfo, Analyzer};
use siltc::ast::builder::AstBuilder;
use siltc::ast::{Block, Span};
use siltc::diag::{Diagnostic, ErrorKind, Reporter};
use siltc::dialect::EvmDialect;
use siltc::evm::EvmVersion;

// ── Program generator ───────────────────────────────────────────────────────

/// One generated declaration: `let v<i> := <init>`.
#[derive(Debug, Clone)]
enum Init {
    /// A plain number literal.
    Literal(u64),
    /// `add(v<j>, addend)` for some already-declared `v<j>`.
    AddPrev { offset: usize, addend: u64 },
    /// A reference to a name that is never declared.
    Unknown,
}

fn arb_init(allow_unknown: bool) -> BoxedStrategy<Init> {
    let known = prop_oneof![
        (0u64..1000).prop_map(Init::Literal),
        (any::<usize>(), 0u64..1000)
            .prop_map(|(offset, addend)| Init::AddPrev { offset, addend }),
    ];
    if allow_unknown {
        prop_oneof![3 => known, 1 => Just(Init::Unknown)].boxed()
    } else {
        known.boxed()
    }
}

/// Build `{ let v0 := ... let v1 := ... }` from the generated plan.
/// Returns the spans of every reference to a never-declared name.
fn build_program(steps: &[Init]) -> (Block, Vec<Span>) {
    let mut b = AstBuilder::new();
    let mut statements = Vec::new();
    let mut unknown_spans = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        let name = format!("v{}", i);
        let value = match step {
            Init::Literal(n) => b.number(&n.to_string()),
            Init::AddPrev { offset, addend } if i > 0 => {
                let prev = b.identifier(&format!("v{}", offset % i));
                let lit = b.number(&addend.to_string());
                b.call("add", vec![prev, lit])
            }
            // No previous declaration to reference yet.
            Init::AddPrev { addend, .. } => b.number(&addend.to_string()),
            Init::Unknown => {
                let unknown = b.identifier(&format!("missing{}", i));
                unknown_spans.push(unknown.span);
                unknown
            }
        };
        statements.push(b.declaration(&[name.as_str()], Some(value)));
    }
    (b.block(statements), unknown_spans)
}

fn analyze(block: &Block) -> (bool, AnalysisInfo, Vec<Diagnostic>) {
    let mut info = AnalysisInfo::default();
    let mut reporter = Reporter::new();
    let dialect = EvmDialect::strict_assembly_for_evm(EvmVersion::Istanbul);
    let success =
        Analyzer::new(&mut info, &mut reporter, dialect, EvmVersion::Istanbul).analyze(block);
    (success, info, reporter.diagnostics().to_vec())
}

// ── Properties ──────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn accepted_programs_have_balanced_nonnegative_heights(
        steps in prop::collection::vec(arb_init(false), 0..24)
    ) {
        let (block, _) = build_program(&steps);
        let (success, info, diagnostics) = analyze(&block);
        prop_assert!(success, "diagnostics: {:?}", diagnostics);
        prop_assert!(diagnostics.is_empty());
        for (node, height) in &info.stack_heights {
            prop_assert!(*height >= 0, "negative height {} at {:?}", height, node);
        }
        prop_assert_eq!(info.stack_heights[&block.id], 0);
    }

    #[test]
    fn rejected_programs_carry_diagnostics(
        steps in prop::collection::vec(arb_init(true), 1..24)
    ) {
        let (block, unknown_spans) = build_program(&steps);
        let (success, _, diagnostics) = analyze(&block);
        if unknown_spans.is_empty() {
            prop_assert!(success, "diagnostics: {:?}", diagnostics);
        } else {
            prop_assert!(!success);
            prop_assert!(!diagnostics.is_empty());
        }
    }

    #[test]
    fn analysis_is_deterministic(
        steps in prop::collection::vec(arb_init(true), 0..24)
    ) {
        let (block_a, _) = build_program(&steps);
        let (block_b, _) = build_program(&steps);
        let (success_a, _, diagnostics_a) = analyze(&block_a);
        let (success_b, _, diagnostics_b) = analyze(&block_b);
        prop_assert_eq!(success_a, success_b);
        let keys_a: Vec<_> = diagnostics_a.iter().map(|d| (d.kind, d.span)).collect();
        let keys_b: Vec<_> = diagnostics_b.iter().map(|d| (d.kind, d.span)).collect();
        prop_assert_eq!(keys_a, keys_b);
    }

    #[test]
    fn removing_a_used_declaration_breaks_its_use_sites(
        steps in prop::collection::vec(arb_init(false), 0..12),
        addend in 0u64..100
    ) {
        // A valid prefix followed by a reference to a declaration that was
        // removed: the analyzer must point at the orphaned use.
        let mut b = AstBuilder::new();
        let mut statements = Vec::new();
        for (i, step) in steps.iter().enumerate() {
            let value = match step {
                Init::Literal(n) => b.number(&n.to_string()),
                Init::AddPrev { addend, .. } => b.number(&addend.to_string()),
                Init::Unknown => unreachable!("generator excludes unknowns here"),
            };
            statements.push(b.declaration(&[format!("v{}", i).as_str()], Some(value)));
        }
        let orphan = b.identifier("removed");
        let orphan_span = orphan.span;
        let lit = b.number(&addend.to_string());
        let sum = b.call("add", vec![orphan, lit]);
        statements.push(b.declaration(&["w"], Some(sum)));
        let block = b.block(statements);

        let (success, _, diagnostics) = analyze(&block);
        prop_assert!(!success);
        prop_assert!(
            diagnostics
                .iter()
                .any(|d| d.kind == ErrorKind::Declaration && d.span == orphan_span),
            "no declaration error at the orphaned use: {:?}",
            diagnostics
        );
    }

    #[test]
    fn disjoint_sibling_declarations_commute(
        value_a in 0u64..1000,
        value_b in 0u64..1000,
        use_both in any::<bool>()
    ) {
        let build = |a_first: bool| {
            let mut b = AstBuilder::new();
            let lit_a = b.number(&value_a.to_string());
            let decl_a = b.declaration(&["va"], Some(lit_a));
            let lit_b = b.number(&value_b.to_string());
            let decl_b = b.declaration(&["vb"], Some(lit_b));
            let mut statements = if a_first {
                vec![decl_a, decl_b]
            } else {
                vec![decl_b, decl_a]
            };
            if use_both {
                let va = b.identifier("va");
                let vb = b.identifier("vb");
                let sum = b.call("add", vec![va, vb]);
                statements.push(b.declaration(&["sum"], Some(sum)));
            }
            b.block(statements)
        };

        let (success_ab, _, _) = analyze(&build(true));
        let (success_ba, _, _) = analyze(&build(false));
        prop_assert_eq!(success_ab, success_ba);
    }
}
