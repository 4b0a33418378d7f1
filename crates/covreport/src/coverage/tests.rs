//! Aggregation tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::fixtures::{environment, function, line, project, statements, unit};
use crate::model::{Counter, CoverageKinds, CoverageRatio, EnvironmentKind, Metrics};
use proptest::prelude::*;

fn kinds(set: CoverageKinds) -> Option<CoverageKinds> {
    Some(set)
}

mod rollup_tests {
    use super::*;

    #[test]
    fn test_statement_only_unit() {
        let env = environment(
            "ENV",
            kinds(CoverageKinds::STATEMENT),
            vec![unit(
                "manager",
                None,
                vec![function(
                    "Add_Party",
                    0,
                    1,
                    vec![line(10, statements(8, 10))],
                )],
            )],
        );
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();

        assert_eq!(report.units.len(), 1);
        let summary = report.units[0].summary;
        assert_eq!(
            summary.formatted(Column::Statement).as_deref(),
            Some("80% (8 / 10)")
        );
        assert_eq!(summary.branch, None);
        assert_eq!(summary.function, None);
        assert_eq!(report.total, summary);
    }

    #[test]
    fn test_grand_total_sums_counters_not_percentages() {
        let env = environment(
            "ENV",
            kinds(CoverageKinds::STATEMENT),
            vec![
                unit("a", None, vec![function("f", 0, 0, vec![line(1, statements(1, 1))])]),
                unit("b", None, vec![function("g", 0, 0, vec![line(1, statements(0, 3))])]),
            ],
        );
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        // mean of 100% and 0% would be 50%
        assert_eq!(
            report.total.formatted(Column::Statement).as_deref(),
            Some("25% (1 / 4)")
        );
    }

    #[test]
    fn test_zero_total_is_omitted() {
        let env = environment(
            "ENV",
            kinds(CoverageKinds::STATEMENT | CoverageKinds::BRANCH),
            vec![unit(
                "a",
                None,
                vec![function("f", 0, 0, vec![line(1, statements(2, 2))])],
            )],
        );
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        assert!(report.total.statement.is_some());
        assert_eq!(report.total.branch, None);
    }

    #[test]
    fn test_complexity_skips_unknown() {
        let env = environment(
            "ENV",
            kinds(CoverageKinds::STATEMENT),
            vec![unit(
                "a",
                None,
                vec![
                    function("f", 0, 4, vec![line(1, statements(1, 1))]),
                    function("g", 1, -1, vec![line(5, statements(1, 1))]),
                ],
            )],
        );
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        assert_eq!(report.units[0].complexity, 4);
        assert_eq!(report.complexity(), 4);
        assert_eq!(report.units[0].functions[1].complexity, -1);
    }

    #[test]
    fn test_functions_without_coverage_lines_are_dropped_and_sorted() {
        let env = environment(
            "ENV",
            kinds(CoverageKinds::STATEMENT),
            vec![unit(
                "a",
                None,
                vec![
                    function("late", 5, 1, vec![line(30, statements(1, 1))]),
                    function("empty", 0, 1, vec![line(1, Metrics::new())]),
                    function("early", 2, 1, vec![line(10, statements(0, 1))]),
                ],
            )],
        );
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        let names: Vec<&str> = report.units[0]
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["early", "late"]);
        assert_eq!(report.function_count(), 2);
    }

    #[test]
    fn test_unit_without_listed_functions_still_counts() {
        let mut silent = unit("silent", None, vec![function("f", 0, 0, vec![line(1, Metrics::new())])]);
        if let Some(cov) = silent.coverage.as_mut() {
            cov.metrics = statements(1, 5);
        }
        let env = environment(
            "ENV",
            kinds(CoverageKinds::STATEMENT),
            vec![
                silent,
                unit("a", None, vec![function("g", 0, 0, vec![line(1, statements(1, 5))])]),
            ],
        );
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        assert_eq!(report.units.len(), 1);
        assert_eq!(
            report.total.formatted(Column::Statement).as_deref(),
            Some("20% (2 / 10)")
        );
    }
}

mod inclusion_tests {
    use super::*;

    #[test]
    fn test_not_of_interest_without_coverage_is_excluded() {
        let mut excluded = unit("x", None, vec![function("f", 0, 0, vec![line(1, statements(9, 9))])]);
        excluded.unit_of_interest = false;
        let env = environment("ENV", Some(CoverageKinds::NONE), vec![excluded]);
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        assert!(report.units.is_empty());
        assert_eq!(report.totals, Aggregate::default());
    }

    #[test]
    fn test_missing_coverage_database_is_skipped() {
        let mut bare = unit("bare", None, Vec::new());
        bare.coverage = None;
        let env = environment(
            "ENV",
            kinds(CoverageKinds::STATEMENT),
            vec![
                bare,
                unit("a", None, vec![function("f", 0, 0, vec![line(1, statements(1, 2))])]),
            ],
        );
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        assert_eq!(report.units.len(), 1);
        assert_eq!(report.units[0].name, "a");
    }

    #[test]
    fn test_cover_environment_skips_uninstrumented() {
        let mut plain = unit("plain", None, vec![function("f", 0, 0, vec![line(1, statements(1, 1))])]);
        plain.is_instrumented = false;
        let mut env = environment("ENV", kinds(CoverageKinds::STATEMENT), vec![plain]);
        env.kind = EnvironmentKind::Cover;
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        assert!(report.units.is_empty());
    }

    #[test]
    fn test_environment_without_coverage_info() {
        let env = environment("ENV", None, Vec::new());
        let project = project(vec![env]);
        assert!(aggregate_environment(&project, &project.environments[0]).is_none());
    }

    #[test]
    fn test_empty_environment_is_well_formed() {
        let env = environment("ENV", kinds(CoverageKinds::STATEMENT), Vec::new());
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        assert!(report.units.is_empty());
        assert!(report.total.is_empty());
        assert_eq!(report.complexity(), 0);
    }
}

mod gating_tests {
    use super::*;

    fn call_metrics(covered: u64, total: u64) -> Metrics {
        statements(1, 1).with_function_calls(Counter::of(covered, total))
    }

    #[test]
    fn test_function_call_gate_applies_to_every_unit() {
        // the unit reporting function calls comes last
        let env = environment(
            "ENV",
            kinds(CoverageKinds::STATEMENT),
            vec![
                unit("plain", None, vec![function("f", 0, 0, vec![line(1, call_metrics(1, 2))])]),
                unit(
                    "calls",
                    kinds(CoverageKinds::STATEMENT | CoverageKinds::FUNCTION | CoverageKinds::FUNCTION_CALL),
                    vec![function("g", 0, 0, vec![line(1, call_metrics(2, 2))])],
                ),
            ],
        );
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        let plain = &report.units[0];
        assert_eq!(
            plain.summary.formatted(Column::FunctionCall).as_deref(),
            Some("50% (1 / 2)")
        );
        assert_eq!(
            plain.summary.formatted(Column::Function).as_deref(),
            Some("100% (1 / 1)")
        );
        assert_eq!(
            report.total.formatted(Column::FunctionCall).as_deref(),
            Some("75% (3 / 4)")
        );
    }

    #[test]
    fn test_function_column_at_function_level() {
        let env = environment(
            "ENV",
            kinds(CoverageKinds::STATEMENT | CoverageKinds::FUNCTION),
            vec![unit(
                "a",
                None,
                vec![
                    function("hit", 0, 0, vec![line(1, statements(1, 1))]),
                    function("miss", 1, 0, vec![line(5, statements(0, 1))]),
                ],
            )],
        );
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        let funcs = &report.units[0].functions;
        assert_eq!(funcs[0].summary.formatted(Column::Function).as_deref(), Some("100% (1 / 1)"));
        assert_eq!(funcs[1].summary.formatted(Column::Function).as_deref(), Some("0% (0 / 1)"));
        assert_eq!(
            report.units[0].summary.formatted(Column::Function).as_deref(),
            Some("50% (1 / 2)")
        );
    }
}

mod mcdc_tests {
    use super::*;

    fn mcdc_project(simplified: bool) -> crate::model::Project {
        let metrics = Metrics::new()
            .with_mcdc_branches(Counter::of(4, 5))
            .with_mcdc_pairs(Counter::of(10, 20));
        let env = environment(
            "ENV",
            kinds(CoverageKinds::MCDC),
            vec![unit("a", None, vec![function("f", 0, 0, vec![line(1, metrics)])])],
        );
        let mut project = project(vec![env]);
        project.simplified_mcdc = simplified;
        project
    }

    #[test]
    fn test_simplified_mcdc_reports_branches_only() {
        let project = mcdc_project(true);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        let summary = report.units[0].summary;
        assert_eq!(summary.formatted(Column::Branch).as_deref(), Some("80% (4 / 5)"));
        assert_eq!(summary.mcdc, None);
    }

    #[test]
    fn test_full_mcdc_reports_pairs() {
        let project = mcdc_project(false);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        let summary = report.units[0].summary;
        assert_eq!(summary.formatted(Column::Branch).as_deref(), Some("80% (4 / 5)"));
        assert_eq!(summary.formatted(Column::Mcdc).as_deref(), Some("50% (10 / 20)"));
    }

    #[test]
    fn test_basis_paths_use_supplied_ratio() {
        let mut u = unit("a", kinds(CoverageKinds::BASIS_PATH), vec![function("f", 0, 0, vec![line(1, statements(1, 1))])]);
        if let Some(cov) = u.coverage.as_mut() {
            cov.basis_paths = CoverageRatio::new(3, 4);
        }
        let project = project(vec![environment("ENV", Some(CoverageKinds::NONE), vec![u])]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();
        assert_eq!(
            report.units[0].summary.formatted(Column::BasisPath).as_deref(),
            Some("75% (3 / 4)")
        );
        assert_eq!(report.total.formatted(Column::BasisPath).as_deref(), Some("75% (3 / 4)"));
    }
}

mod project_tests {
    use super::*;

    #[test]
    fn test_project_spans_environments() {
        let a = environment(
            "A",
            kinds(CoverageKinds::STATEMENT),
            vec![unit("a", None, vec![function("f", 0, 2, vec![line(1, statements(1, 2))])])],
        );
        let b = environment(
            "B",
            kinds(CoverageKinds::STATEMENT),
            vec![unit("b", None, vec![function("g", 0, 3, vec![line(1, statements(2, 2))])])],
        );
        let project = project(vec![a, b]);
        let report = aggregate_project(&project);
        assert_eq!(report.name, "Demo");
        assert_eq!(report.complexity(), 5);
        assert_eq!(
            report.total.formatted(Column::Statement).as_deref(),
            Some("75% (3 / 4)")
        );
    }
}

fn arb_unit_counts() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((0u64..50, 0u64..50), 0..8)
        .prop_map(|pairs| pairs.into_iter().map(|(c, extra)| (c, c + extra)).collect())
}

proptest! {
    #[test]
    fn prop_grand_total_is_sum_of_units(counts in arb_unit_counts()) {
        let units = counts
            .iter()
            .enumerate()
            .map(|(i, (c, t))| {
                unit(
                    &format!("u{i}"),
                    None,
                    vec![function("f", 0, 1, vec![line(1, statements(*c, *t))])],
                )
            })
            .collect();
        let env = environment("ENV", kinds(CoverageKinds::STATEMENT), units);
        let project = project(vec![env]);
        let report = aggregate_environment(&project, &project.environments[0]).unwrap();

        let covered: u64 = counts.iter().map(|(c, _)| c).sum();
        let total: u64 = counts.iter().map(|(_, t)| t).sum();
        prop_assert_eq!(report.totals.metrics.statements.max_covered, covered);
        prop_assert_eq!(report.totals.metrics.statements.total, total);
        prop_assert_eq!(report.total.statement, Percentage::new(covered, total));
    }

    #[test]
    fn prop_zero_total_never_formats(covered in 0u64..100) {
        prop_assert!(fmt_percent(covered, 0).is_none());
        prop_assert!(Percentage::new(covered, 0).is_none());
    }
}
