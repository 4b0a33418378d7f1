//! Function → unit → scope rollup.
//!
//! Each level returns an [`Aggregate`] and the caller folds them, so the
//! grand total is always a sum of raw counters and never an average of
//! percentages.

use super::summary::{CoverageSummary, Percentage};
use crate::model::{
    Counter, CoverageKinds, CoverageRatio, Environment, Function, Metrics, Project,
    Unit, UnitCoverage,
};
use std::iter::Sum;
use std::ops::Add;
use tracing::{debug, warn};

/// Raw totals of one subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
    /// Summed counters
    pub metrics: Metrics,
    /// Summed function coverage ratio
    pub functions: CoverageRatio,
    /// Summed basis-path ratio (only units reporting basis paths)
    pub basis_paths: CoverageRatio,
    /// Summed known complexity
    pub complexity: i64,
}

impl Add for Aggregate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            metrics: self.metrics + rhs.metrics,
            functions: self.functions + rhs.functions,
            basis_paths: self.basis_paths + rhs.basis_paths,
            complexity: self.complexity + rhs.complexity,
        }
    }
}

impl Sum for Aggregate {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Coverage of one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionReport {
    /// Subprogram name
    pub name: String,
    /// Raw complexity (negative when unknown)
    pub complexity: i32,
    /// Column values
    pub summary: CoverageSummary,
}

/// Coverage of one listed unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// Unit name
    pub name: String,
    /// File name shown in summaries
    pub display_name: String,
    /// Summed known complexity of the listed functions
    pub complexity: i64,
    /// Column values
    pub summary: CoverageSummary,
    /// Functions with coverage data, by provider index
    pub functions: Vec<FunctionReport>,
}

/// Aggregated coverage of an environment or a whole project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    /// Environment or project name
    pub name: String,
    /// Listed units, in provider order
    pub units: Vec<UnitReport>,
    /// Grand-total column values
    pub total: CoverageSummary,
    /// Grand-total raw counters
    pub totals: Aggregate,
}

impl CoverageReport {
    /// Number of listed functions across all listed units
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.units.iter().map(|u| u.functions.len()).sum()
    }

    /// Grand-total complexity
    #[must_use]
    pub const fn complexity(&self) -> i64 {
        self.totals.complexity
    }
}

/// Which optional columns are reported for the whole aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Gates {
    function: bool,
    call: bool,
    simplified_mcdc: bool,
}

/// A unit that passed the inclusion rules
#[derive(Debug, Clone, Copy)]
struct Included<'a> {
    unit: &'a Unit,
    coverage: &'a UnitCoverage,
    kinds: CoverageKinds,
    cover_env: bool,
}

/// Whether a unit passes the exclusion rules shared by every report
pub fn is_reported(env: &Environment, unit: &Unit) -> bool {
    if !unit.unit_of_interest && unit.kinds(env.coverage).is_empty() {
        debug!(unit = %unit.name, "not of interest and no coverage, skipping");
        return false;
    }
    if env.is_cover() && !unit.is_instrumented {
        debug!(unit = %unit.name, "not instrumented, skipping");
        return false;
    }
    true
}

fn included_units(env: &Environment) -> Vec<Included<'_>> {
    env.units
        .iter()
        .filter(|unit| is_reported(env, unit))
        .filter_map(|unit| {
            let Some(coverage) = unit.coverage.as_ref() else {
                warn!(
                    environment = %env.name,
                    unit = %unit.name,
                    "no coverage database attached, skipping unit"
                );
                return None;
            };
            Some(Included {
                unit,
                coverage,
                kinds: unit.kinds(env.coverage),
                cover_env: env.is_cover(),
            })
        })
        .collect()
}

/// First pass: a column is reported everywhere if any included unit has it
fn gates(units: &[Included<'_>], simplified_mcdc: bool) -> Gates {
    Gates {
        function: units
            .iter()
            .any(|u| u.kinds.contains(CoverageKinds::FUNCTION)),
        call: units
            .iter()
            .any(|u| u.kinds.contains(CoverageKinds::FUNCTION_CALL)),
        simplified_mcdc,
    }
}

fn summarize(
    gates: Gates,
    kinds: CoverageKinds,
    metrics: &Metrics,
    function: Option<Percentage>,
    basis_paths: CoverageRatio,
) -> CoverageSummary {
    let ratio = |c: Counter| Percentage::new(c.max_covered, c.total);
    let mut summary = CoverageSummary::default();

    if gates.function {
        summary.function = function;
    }
    if gates.call {
        summary.functioncall = ratio(metrics.function_calls);
    }
    if kinds.contains(CoverageKinds::MCDC) {
        summary.branch = ratio(metrics.mcdc_branches);
        if !gates.simplified_mcdc {
            summary.mcdc = ratio(metrics.mcdc_pairs);
        }
    }
    if kinds.contains(CoverageKinds::BASIS_PATH) {
        summary.basispath = Percentage::new(basis_paths.covered, basis_paths.total);
    }
    if kinds.contains(CoverageKinds::STATEMENT) {
        summary.statement = ratio(metrics.statements);
    }
    if kinds.contains(CoverageKinds::BRANCH) {
        summary.branch = ratio(metrics.branches);
    }
    if kinds.contains(CoverageKinds::FUNCTION_CALL) {
        summary.functioncall = ratio(metrics.function_calls);
    }
    summary
}

fn function_report(gates: Gates, included: &Included<'_>, func: &Function) -> FunctionReport {
    let function = if func.has_covered_objects {
        Percentage::new(1, 1)
    } else {
        Percentage::new(0, 1)
    };
    let name = if included.cover_env {
        &func.name
    } else {
        &func.display_name
    };
    FunctionReport {
        name: name.clone(),
        complexity: func.complexity,
        summary: summarize(
            gates,
            included.kinds,
            &func.metrics,
            function,
            func.basis_paths,
        ),
    }
}

/// Aggregate one unit. The unit is listed only when it has at least one
/// function with coverage data, but always contributes to the totals.
fn unit_report(gates: Gates, included: &Included<'_>) -> (Option<UnitReport>, Aggregate) {
    let coverage = included.coverage;
    let mut functions: Vec<&Function> = coverage
        .functions
        .iter()
        .filter(|f| f.has_coverage_data())
        .collect();
    functions.sort_by_key(|f| f.index);

    let complexity: i64 = functions
        .iter()
        .filter(|f| f.complexity >= 0)
        .map(|f| i64::from(f.complexity))
        .sum();

    let aggregate = Aggregate {
        metrics: coverage.metrics,
        functions: coverage.functions_covered,
        basis_paths: if included.kinds.contains(CoverageKinds::BASIS_PATH) {
            coverage.basis_paths
        } else {
            CoverageRatio::default()
        },
        complexity,
    };

    if functions.is_empty() {
        debug!(unit = %included.unit.name, "no functions with coverage data, not listed");
        return (None, aggregate);
    }

    let report = UnitReport {
        name: included.unit.name.clone(),
        display_name: included.unit.display_name.clone(),
        complexity,
        summary: summarize(
            gates,
            included.kinds,
            &coverage.metrics,
            Percentage::new(
                coverage.functions_covered.covered,
                coverage.functions_covered.total,
            ),
            coverage.basis_paths,
        ),
        functions: functions
            .into_iter()
            .map(|f| function_report(gates, included, f))
            .collect(),
    };
    (Some(report), aggregate)
}

fn build(name: &str, units: &[Included<'_>], simplified_mcdc: bool) -> CoverageReport {
    let gates = gates(units, simplified_mcdc);
    let (listed, aggregates): (Vec<_>, Vec<_>) =
        units.iter().map(|u| unit_report(gates, u)).unzip();
    let totals: Aggregate = aggregates.into_iter().sum();
    let kinds = units
        .iter()
        .fold(CoverageKinds::NONE, |acc, u| acc.union(u.kinds));

    CoverageReport {
        name: name.to_string(),
        units: listed.into_iter().flatten().collect(),
        total: summarize(
            gates,
            kinds,
            &totals.metrics,
            Percentage::new(totals.functions.covered, totals.functions.total),
            totals.basis_paths,
        ),
        totals,
    }
}

/// Aggregate one environment.
///
/// Returns `None` when the environment carries no coverage information.
#[must_use]
pub fn aggregate_environment(project: &Project, env: &Environment) -> Option<CoverageReport> {
    if env.coverage.is_none() {
        warn!(environment = %env.name, "no coverage information, skipping coverage report");
        return None;
    }
    let units = included_units(env);
    debug!(environment = %env.name, units = units.len(), "aggregating environment");
    Some(build(&env.name, &units, project.simplified_mcdc))
}

/// Aggregate every environment of the project into one report
#[must_use]
pub fn aggregate_project(project: &Project) -> CoverageReport {
    let units: Vec<Included<'_>> = project
        .environments
        .iter()
        .flat_map(included_units)
        .collect();
    debug!(project = %project.name, units = units.len(), "aggregating project");
    build(&project.name, &units, project.simplified_mcdc)
}
