//! Context reuse under concurrent requests

use crate::integration::test_utils::*;
use plancache::config::PlannerConfiguration;
use plancache::space::JOINT_PARAMETERIZATION_TYPE;
use std::collections::HashSet;
use std::sync::Barrier;

const THREADS: usize = 4;

#[test]
fn test_concurrent_holders_get_distinct_contexts() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, vec![PlannerConfiguration::new("arm", "arm")]);
    let barrier = Barrier::new(THREADS);

    let ids: Vec<u64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    let context = manager
                        .get_planning_context(scene(), &arm_request(""))
                        .unwrap();
                    let id = context.id().as_u64();
                    // Hold until every thread has its own checkout.
                    barrier.wait();
                    drop(context);
                    id
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let distinct: HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(distinct.len(), THREADS);
    assert_eq!(
        manager.cached_context_count("arm", JOINT_PARAMETERIZATION_TYPE),
        THREADS
    );

    // Every pooled context is idle again, so a later request reuses one.
    let context = manager.get_planning_context(scene(), &arm_request("")).unwrap();
    assert!(distinct.contains(&context.id().as_u64()));
    assert_eq!(
        manager.cached_context_count("arm", JOINT_PARAMETERIZATION_TYPE),
        THREADS
    );
}

#[test]
fn test_sequential_requests_share_one_context() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, vec![PlannerConfiguration::new("arm", "arm")]);

    let mut ids = HashSet::new();
    for _ in 0..10 {
        let context = manager.get_planning_context(scene(), &arm_request("")).unwrap();
        ids.insert(context.id());
    }
    assert_eq!(ids.len(), 1);
    assert_eq!(
        manager.cached_context_count("arm", JOINT_PARAMETERIZATION_TYPE),
        1
    );
}

#[test]
fn test_context_keys_include_representation() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, vec![PlannerConfiguration::new("arm", "arm")]);

    let path = plancache::types::Constraints {
        position_constraints: vec![position_constraint("tool0")],
        ..Default::default()
    };
    let pose = manager
        .get_planning_context(scene(), &arm_request("").with_path_constraints(path))
        .unwrap();
    let joint = manager.get_planning_context(scene(), &arm_request("")).unwrap();
    assert_ne!(pose.id(), joint.id());
    assert_eq!(
        manager.cached_context_count("arm", JOINT_PARAMETERIZATION_TYPE),
        1
    );
    assert_eq!(manager.cached_context_count("arm", "PoseModel"), 1);
}
