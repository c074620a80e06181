//! Solver selection from configuration.

use serde::{Deserialize, Serialize};

use super::{
    DescentConfig, DescentSolver, ExhaustiveSolver, GreedySolver, Solver, TabuConfig, TabuSolver,
};
use crate::dispatching::PriorityRule;
use crate::encoding::EncodingKind;

/// Which solver to run, with its parameters.
///
/// Deserializes from a tagged map so an outer layer can read it from a
/// config file:
///
/// ```
/// use u_jobshop::scheduler::SolverConfig;
///
/// let config: SolverConfig =
///     serde_json::from_str(r#"{"solver": "tabu", "max_iterations": 500}"#).unwrap();
/// assert_eq!(config.build().name(), "tabu");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "solver", rename_all = "snake_case")]
pub enum SolverConfig {
    /// One greedy construction.
    Greedy {
        /// Dispatching rule.
        #[serde(default)]
        rule: PriorityRule,
    },
    /// Enumeration of every encoding.
    Exhaustive {
        /// Enumerated encoding.
        #[serde(default)]
        encoding: EncodingKind,
    },
    /// Steepest descent.
    Descent(DescentConfig),
    /// Tabu search.
    Tabu(TabuConfig),
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::Tabu(TabuConfig::default())
    }
}

impl SolverConfig {
    /// Builds the configured solver.
    pub fn build(&self) -> Box<dyn Solver> {
        match *self {
            Self::Greedy { rule } => Box::new(GreedySolver::new(rule)),
            Self::Exhaustive { encoding } => {
                Box::new(ExhaustiveSolver::new().with_encoding(encoding))
            }
            Self::Descent(config) => Box::new(DescentSolver::with_config(config)),
            Self::Tabu(config) => Box::new(TabuSolver::with_config(config)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::fixtures;

    #[test]
    fn test_parse_each_solver() {
        let greedy: SolverConfig =
            serde_json::from_str(r#"{"solver": "greedy", "rule": "EST_SPT"}"#).unwrap();
        assert_eq!(
            greedy,
            SolverConfig::Greedy {
                rule: PriorityRule::EstSpt
            }
        );

        let exhaustive: SolverConfig =
            serde_json::from_str(r#"{"solver": "exhaustive", "encoding": "resource_order"}"#)
                .unwrap();
        assert_eq!(
            exhaustive,
            SolverConfig::Exhaustive {
                encoding: EncodingKind::ResourceOrder
            }
        );

        let descent: SolverConfig = serde_json::from_str(r#"{"solver": "descent"}"#).unwrap();
        assert_eq!(descent, SolverConfig::Descent(DescentConfig::default()));

        let tabu: SolverConfig =
            serde_json::from_str(r#"{"solver": "tabu", "tabu_duration": 4}"#).unwrap();
        assert_eq!(
            tabu,
            SolverConfig::Tabu(TabuConfig {
                tabu_duration: 4,
                ..TabuConfig::default()
            })
        );
    }

    #[test]
    fn test_unknown_solver_rejected() {
        assert!(serde_json::from_str::<SolverConfig>(r#"{"solver": "annealing"}"#).is_err());
    }

    #[test]
    fn test_build_and_solve() {
        let instance = fixtures::unit_identity();
        let configs = [
            SolverConfig::Greedy {
                rule: PriorityRule::Lpt,
            },
            SolverConfig::Exhaustive {
                encoding: EncodingKind::JobSequence,
            },
            SolverConfig::Descent(DescentConfig::default()),
            SolverConfig::default(),
        ];
        let names: Vec<_> = configs.iter().map(|c| c.build().name()).collect();
        assert_eq!(names, ["greedy", "exhaustive", "descent", "tabu"]);

        for config in configs {
            let solution = config
                .build()
                .solve(&instance, fixtures::far_deadline())
                .unwrap();
            assert_eq!(solution.makespan(), 5);
        }
    }
}
