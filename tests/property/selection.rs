//! Property-based tests for representation selection and configuration resolution

use plancache::config::{PlannerConfiguration, PlannerConfigurationMap};
use plancache::error::ContextError;
use plancache::manager::resolve_configuration;
use plancache::space::{StateSpace, StateSpaceFactory, StateSpaceRegistry, StateSpaceSpecification};
use plancache::types::{MotionPlanRequest, RobotModel};
use proptest::prelude::*;
use std::sync::Arc;

struct Scored {
    tag: String,
    priority: i32,
}

impl StateSpaceFactory for Scored {
    fn parameterization_type(&self) -> &str {
        &self.tag
    }

    fn can_represent_problem(&self, _: &str, _: &MotionPlanRequest, _: &dyn RobotModel) -> i32 {
        self.priority
    }

    fn new_state_space(
        &self,
        spec: &StateSpaceSpecification,
    ) -> Result<Arc<dyn StateSpace>, ContextError> {
        Err(ContextError::NoRepresentation(spec.group.clone()))
    }
}

struct AnyGroup;

impl RobotModel for AnyGroup {
    fn name(&self) -> &str {
        "any"
    }
    fn has_group(&self, _: &str) -> bool {
        true
    }
    fn has_link(&self, _: &str) -> bool {
        true
    }
    fn group_joint_names(&self, _: &str) -> Option<Vec<String>> {
        Some(Vec::new())
    }
    fn has_ik_solver(&self, _: &str) -> bool {
        false
    }
}

/// The earliest factory with the highest positive score wins
#[test]
fn test_selection_keeps_first_of_equal_scores() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(-3i32..4, 1..8), |priorities| {
            let mut registry = StateSpaceRegistry::new();
            for (i, priority) in priorities.iter().enumerate() {
                registry.register(Arc::new(Scored {
                    tag: format!("F{}", i),
                    priority: *priority,
                }));
            }

            let req = MotionPlanRequest::new("arm");
            let selected = registry.select("arm", &req, &AnyGroup);
            let best = priorities.iter().copied().max().unwrap_or(0);

            if best <= 0 {
                prop_assert!(matches!(selected.err(), Some(ContextError::NoRepresentation(_))));
            } else {
                let first = priorities.iter().position(|p| *p == best).unwrap();
                let factory = selected.ok().unwrap();
                prop_assert_eq!(factory.parameterization_type(), format!("F{}", first));
            }
            Ok(())
        })
        .unwrap();
}

/// Resolution prefers `group[planner]`, then the group, then fails
#[test]
fn test_resolution_order() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[a-z]{1,6}", "[A-Z]{1,8}", any::<bool>(), any::<bool>()),
            |(group, planner, has_specific, has_group)| {
                let mut configs = PlannerConfigurationMap::new();
                let specific = format!("{}[{}]", group, planner);
                if has_specific {
                    configs.insert(specific.clone(), PlannerConfiguration::new(&specific, &group));
                }
                if has_group {
                    configs.insert(group.clone(), PlannerConfiguration::new(&group, &group));
                }

                match resolve_configuration(&configs, &group, &planner) {
                    Ok(resolved) if has_specific => {
                        prop_assert_eq!(&resolved.configuration.name, &specific);
                        prop_assert!(!resolved.fell_back);
                    }
                    Ok(resolved) => {
                        prop_assert!(has_group);
                        prop_assert_eq!(&resolved.configuration.name, &group);
                        prop_assert!(resolved.fell_back);
                    }
                    Err(e) => {
                        prop_assert!(!has_specific && !has_group);
                        prop_assert!(matches!(e, ContextError::NoPlannerConfiguration(_)));
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}
