//! Request handling through PlanningContextManager: configuration
//! resolution, representation choice and context reuse.

use crate::integration::test_utils::*;
use plancache::config::PlannerConfiguration;
use plancache::error::{ContextError, ErrorCode};
use plancache::planner::Planner;
use plancache::space::{
    StateSpace, StateSpaceFactory, StateSpaceSpecification, CONSTRAINED_PARAMETERIZATION_TYPE,
    JOINT_PARAMETERIZATION_TYPE, POSE_PARAMETERIZATION_TYPE,
};
use plancache::types::{Constraints, MotionPlanRequest, RobotModel, RobotState};
use std::sync::Arc;

fn arm_configs() -> Vec<PlannerConfiguration> {
    vec![
        PlannerConfiguration::new("arm", "arm"),
        PlannerConfiguration::new("arm[RRTConnect]", "arm")
            .with_param("type", "geometric::RRTConnect")
            .with_param("range", "0.25"),
    ]
}

#[test]
fn test_empty_group_name_is_rejected_first() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, arm_configs());

    let err = manager
        .get_planning_context(None, &MotionPlanRequest::new(""))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidGroupName);
    assert_eq!(manager.cached_context_count("arm", JOINT_PARAMETERIZATION_TYPE), 0);
    assert_eq!(library.constructed(), 0);
}

#[test]
fn test_missing_scene() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, arm_configs());

    let err = manager
        .get_planning_context(None, &arm_request("RRTConnect"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoPlanningScene);
}

#[test]
fn test_group_qualified_configuration_is_used() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, arm_configs());

    let context = manager
        .get_planning_context(scene(), &arm_request("RRTConnect"))
        .unwrap();
    assert_eq!(context.name(), "arm[RRTConnect]");
    assert!(context.is_configured());

    let planner = context.planner().unwrap().lock();
    assert_eq!(planner.name(), "arm/arm[RRTConnect]");
    assert_eq!(planner.params().get("range"), Some("0.25"));
}

#[test]
fn test_unknown_planner_id_falls_back_to_group() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, arm_configs());

    let context = manager
        .get_planning_context(scene(), &arm_request("BiTRRT"))
        .unwrap();
    assert_eq!(context.name(), "arm");
}

#[test]
fn test_no_configuration_for_group() {
    let library = TestLibrary::default();
    let manager = manager_with(
        &library,
        vec![PlannerConfiguration::new("arm[RRTConnect]", "arm")],
    );

    let err = manager
        .get_planning_context(scene(), &arm_request("PRM"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoPlannerConfiguration);
}

#[test]
fn test_start_state_override_is_applied() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, arm_configs());

    let mut request = arm_request("");
    request.start_state = Some(RobotState::new().with_position("j2", 0.75));
    let context = manager.get_planning_context(scene(), &request).unwrap();

    let start = context.start_state().unwrap();
    assert_eq!(start.position("j1"), Some(0.0));
    assert_eq!(start.position("j2"), Some(0.75));
    assert_eq!(context.motion_plan_request(), Some(&request));
}

#[test]
fn test_released_context_is_reused() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, arm_configs());

    let first = manager
        .get_planning_context(scene(), &arm_request("RRTConnect"))
        .unwrap();
    let first_id = first.id();
    drop(first);

    let second = manager
        .get_planning_context(scene(), &arm_request("RRTConnect"))
        .unwrap();
    assert_eq!(second.id(), first_id);
    assert_eq!(
        manager.cached_context_count("arm[RRTConnect]", JOINT_PARAMETERIZATION_TYPE),
        1
    );
}

#[test]
fn test_held_context_is_not_handed_out_again() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, arm_configs());

    let first = manager
        .get_planning_context(scene(), &arm_request("RRTConnect"))
        .unwrap();
    let second = manager
        .get_planning_context(scene(), &arm_request("RRTConnect"))
        .unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(
        manager.cached_context_count("arm[RRTConnect]", JOINT_PARAMETERIZATION_TYPE),
        2
    );
}

#[test]
fn test_reused_context_gets_current_tuning() {
    let library = TestLibrary::default();
    let mut manager = manager_with(&library, arm_configs());
    manager.set_maximum_planning_threads(8);
    manager.set_maximum_solution_segment_length(0.05);

    let mut first = manager
        .get_planning_context(scene(), &arm_request("RRTConnect"))
        .unwrap();
    assert_eq!(first.tuning().max_planning_threads, 8);
    first.set_maximum_planning_threads(1);
    drop(first);

    manager.set_minimum_waypoint_count(30);
    let second = manager
        .get_planning_context(scene(), &arm_request("RRTConnect"))
        .unwrap();
    assert_eq!(second.tuning().max_planning_threads, 8);
    assert_eq!(second.tuning().minimum_waypoint_count, 30);
    assert_eq!(second.tuning().max_solution_segment_length, 0.05);
}

#[test]
fn test_enforced_constrained_space_with_one_orientation_constraint() {
    let library = TestLibrary::default();
    let manager = manager_with(
        &library,
        vec![PlannerConfiguration::new("arm", "arm")
            .with_param("enforce_constrained_state_space", "true")],
    );

    let path = Constraints {
        orientation_constraints: vec![orientation_constraint("tool0")],
        ..Default::default()
    };
    let request = arm_request("").with_path_constraints(path);

    for _ in 0..3 {
        let context = manager.get_planning_context(scene(), &request).unwrap();
        assert_eq!(
            context.state_space().parameterization_type(),
            CONSTRAINED_PARAMETERIZATION_TYPE
        );
        assert!(context.search_space().is_constrained());
        assert!(context.is_configured());
    }

    assert_eq!(
        manager.cached_context_count("arm", CONSTRAINED_PARAMETERIZATION_TYPE),
        0
    );
}

/// Factory that outbids everything for any group
struct Greedy;

impl StateSpaceFactory for Greedy {
    fn parameterization_type(&self) -> &str {
        "Greedy"
    }

    fn can_represent_problem(&self, _: &str, _: &MotionPlanRequest, _: &dyn RobotModel) -> i32 {
        1000
    }

    fn new_state_space(
        &self,
        spec: &StateSpaceSpecification,
    ) -> Result<Arc<dyn StateSpace>, ContextError> {
        Err(ContextError::NoRepresentation(spec.group.clone()))
    }
}

#[test]
fn test_enforced_constrained_space_ignores_scores() {
    let library = TestLibrary::default();
    let mut manager = manager_with(
        &library,
        vec![PlannerConfiguration::new("arm", "arm")
            .with_param("enforce_constrained_state_space", "true")
            .with_param("enforce_joint_model_state_space", "true")],
    );
    manager.register_state_space_factory(Arc::new(Greedy));

    let path = Constraints {
        position_constraints: vec![position_constraint("tool0")],
        ..Default::default()
    };
    let context = manager
        .get_planning_context(scene(), &arm_request("").with_path_constraints(path))
        .unwrap();
    assert_eq!(
        context.state_space().parameterization_type(),
        CONSTRAINED_PARAMETERIZATION_TYPE
    );
}

#[test]
fn test_enforced_constrained_space_needs_a_single_constraint() {
    let library = TestLibrary::default();
    let manager = manager_with(
        &library,
        vec![PlannerConfiguration::new("arm", "arm")
            .with_param("enforce_constrained_state_space", "true")
            .with_param("enforce_joint_model_state_space", "true")],
    );

    // Two of each kind: the override does not apply, joint space is enforced.
    let path = Constraints {
        position_constraints: vec![position_constraint("tool0"), position_constraint("finger")],
        orientation_constraints: vec![
            orientation_constraint("tool0"),
            orientation_constraint("finger"),
        ],
        ..Default::default()
    };
    let context = manager
        .get_planning_context(scene(), &arm_request("").with_path_constraints(path))
        .unwrap();
    assert_eq!(
        context.state_space().parameterization_type(),
        JOINT_PARAMETERIZATION_TYPE
    );
}

#[test]
fn test_enforced_joint_space_beats_pose_priority() {
    let library = TestLibrary::default();
    let manager = manager_with(
        &library,
        vec![
            PlannerConfiguration::new("arm", "arm"),
            PlannerConfiguration::new("arm[RRTConnect]", "arm")
                .with_param("enforce_joint_model_state_space", "true"),
        ],
    );
    let path = Constraints {
        position_constraints: vec![position_constraint("tool0")],
        ..Default::default()
    };

    let selected = manager
        .get_planning_context(scene(), &arm_request("").with_path_constraints(path.clone()))
        .unwrap();
    assert_eq!(
        selected.state_space().parameterization_type(),
        POSE_PARAMETERIZATION_TYPE
    );

    let enforced = manager
        .get_planning_context(
            scene(),
            &arm_request("RRTConnect").with_path_constraints(path),
        )
        .unwrap();
    assert_eq!(
        enforced.state_space().parameterization_type(),
        JOINT_PARAMETERIZATION_TYPE
    );
}

#[test]
fn test_group_without_representation() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, vec![PlannerConfiguration::new("torso", "torso")]);

    let request = MotionPlanRequest::new("torso").with_goal(joint_goal());
    let err = manager.get_planning_context(scene(), &request).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoRepresentation);
}

#[test]
fn test_missing_goal_constraints() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, arm_configs());

    let err = manager
        .get_planning_context(scene(), &MotionPlanRequest::new("arm"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidGoalConstraints);
}

#[test]
fn test_path_constraint_on_unknown_link() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, arm_configs());

    let path = Constraints {
        position_constraints: vec![position_constraint("camera_mount")],
        ..Default::default()
    };
    let err = manager
        .get_planning_context(scene(), &arm_request("").with_path_constraints(path))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPathConstraints);
}

#[test]
fn test_configure_failure_is_reported_as_generic_failure() {
    let library = TestLibrary::default();
    let manager = manager_with(
        &library,
        vec![
            PlannerConfiguration::new("arm", "arm").with_param("type", "geometric::Teleport"),
            PlannerConfiguration::new("arm[RRT]", "arm").with_param("goal_bias", "0.05"),
        ],
    );

    let err = manager
        .get_planning_context(scene(), &arm_request(""))
        .unwrap_err();
    assert!(matches!(err, ContextError::UnknownPlanner(_)));
    assert_eq!(err.code(), ErrorCode::Failure);

    // Parameters the planner does not declare are rejected, not ignored.
    let err = manager
        .get_planning_context(scene(), &arm_request("RRT"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Failure);
}

#[test]
fn test_unavailable_planners_are_not_registered() {
    let library = TestLibrary {
        missing: vec!["geometric::SPARS", "geometric::SPARStwo"],
        ..Default::default()
    };
    let manager = manager_with(&library, arm_configs());
    let planners = manager.registered_planners();
    assert_eq!(planners.len(), 24);
    assert!(!planners.iter().any(|p| p == "geometric::SPARS"));
    assert!(planners.iter().any(|p| p == "geometric::RRTConnect"));
}
