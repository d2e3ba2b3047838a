//! Multi-query planners through the manager: roadmap transplantation between
//! requests and persistence across manager lifetimes.

use crate::integration::test_utils::*;
use plancache::config::{PlanCacheConfig, PlannerConfiguration, StorageConfig};
use plancache::planner::{FilePlannerDataStorage, Planner, PlannerDataStorage};
use plancache::PlanningContextManager;
use std::sync::Arc;
use tempfile::TempDir;

fn prm(name: &str) -> PlannerConfiguration {
    PlannerConfiguration::new(name, "arm")
        .with_param("type", "geometric::PRM")
        .with_param("multi_query_planning_enabled", "true")
}

#[test]
fn test_disabled_multi_query_keeps_nothing() {
    let library = TestLibrary::default();
    let manager = manager_with(
        &library,
        vec![PlannerConfiguration::new("arm", "arm").with_param("type", "geometric::PRM")],
    );

    let first = manager.get_planning_context(scene(), &arm_request("")).unwrap();
    let second = manager.get_planning_context(scene(), &arm_request("")).unwrap();

    let a = first.planner().unwrap();
    let b = second.planner().unwrap();
    assert!(!Arc::ptr_eq(a, b));
    assert!(manager.allocator().lock().is_empty());
    assert_eq!(library.seeded(), 0);
}

#[test]
fn test_roadmap_carries_over_between_requests() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, vec![prm("arm")]);

    for expected in 1..=3 {
        let context = manager.get_planning_context(scene(), &arm_request("")).unwrap();
        let data = context.planner().unwrap().lock().planner_data();
        assert_eq!(data.num_vertices(), expected);
        assert_eq!(data.num_edges(), expected - 1);
    }

    assert_eq!(library.constructed(), 1);
    assert_eq!(library.seeded(), 2);
    let allocator = manager.allocator().lock();
    assert_eq!(allocator.len(), 1);
    assert!(allocator.planner("arm/arm").is_some());
}

#[test]
fn test_reallocation_builds_a_new_instance() {
    let library = TestLibrary::default();
    let manager = manager_with(&library, vec![prm("arm")]);

    let first = manager.get_planning_context(scene(), &arm_request("")).unwrap();
    let first_planner = Arc::clone(first.planner().unwrap());
    drop(first);

    let second = manager.get_planning_context(scene(), &arm_request("")).unwrap();
    assert!(!Arc::ptr_eq(&first_planner, second.planner().unwrap()));
    let managed = manager.allocator().lock().planner("arm/arm").unwrap();
    assert!(Arc::ptr_eq(&managed, second.planner().unwrap()));
}

#[test]
fn test_non_roadmap_family_is_never_seeded() {
    let library = TestLibrary::default();
    let manager = manager_with(
        &library,
        vec![PlannerConfiguration::new("arm", "arm")
            .with_param("type", "geometric::RRTConnect")
            .with_param("multi_query_planning_enabled", "true")],
    );

    for _ in 0..2 {
        let context = manager.get_planning_context(scene(), &arm_request("")).unwrap();
        let data = context.planner().unwrap().lock().planner_data();
        assert_eq!(data.num_vertices(), 1);
    }
    assert_eq!(library.seeded(), 0);
    assert_eq!(library.constructed(), 2);
}

#[test]
fn test_load_for_unsupported_family_falls_back_to_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("rrt.graph");
    let library = TestLibrary::default();
    let manager = manager_with(
        &library,
        vec![PlannerConfiguration::new("arm", "arm")
            .with_param("type", "geometric::RRT")
            .with_param("multi_query_planning_enabled", "true")
            .with_param("load_planner_data", "true")
            .with_param("planner_data_path", path.to_str().unwrap())],
    );

    let context = manager.get_planning_context(scene(), &arm_request("")).unwrap();
    assert!(context.is_configured());
    assert_eq!(library.constructed(), 1);
    assert_eq!(library.seeded(), 0);
}

#[test]
fn test_roadmap_stored_on_teardown_and_loaded_next_run() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("graphs").join("arm_prm.graph");
    let path_str = path.to_str().unwrap().to_string();
    let config = || {
        prm("arm")
            .with_param("store_planner_data", "true")
            .with_param("load_planner_data", "true")
            .with_param("planner_data_path", &path_str)
    };

    let library = TestLibrary::default();
    let in_memory = {
        let manager = manager_with(&library, vec![config()]);
        for _ in 0..4 {
            drop(manager.get_planning_context(scene(), &arm_request("")).unwrap());
        }
        let planner = manager.allocator().lock().planner("arm/arm").unwrap();
        let data = planner.lock().planner_data();
        data
    };
    assert!(path.exists());

    let stored = FilePlannerDataStorage::new().load(&path).unwrap();
    assert_eq!(stored.num_vertices(), in_memory.num_vertices());
    assert_eq!(stored.num_edges(), in_memory.num_edges());

    // A new manager seeds its first instance from the stored roadmap.
    let next_library = TestLibrary::default();
    let manager = manager_with(&next_library, vec![config()]);
    let context = manager.get_planning_context(scene(), &arm_request("")).unwrap();
    let data = context.planner().unwrap().lock().planner_data();
    assert_eq!(data.num_vertices(), in_memory.num_vertices() + 1);
    assert_eq!(next_library.seeded(), 1);
    assert_eq!(next_library.constructed(), 0);
}

#[test]
fn test_relative_storage_path_uses_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let config = PlanCacheConfig {
        planner_configs: vec![prm("arm")
            .with_param("store_planner_data", "true")
            .with_param("planner_data_path", "arm.graph")],
        storage: StorageConfig {
            default_planner_data_dir: Some(temp_dir.path().to_path_buf()),
        },
        ..Default::default()
    };

    let library = TestLibrary::default();
    {
        let manager = PlanningContextManager::from_config(Arc::new(ArmRobot), &config);
        manager.register_default_planners(&library);
        drop(manager.get_planning_context(scene(), &arm_request("")).unwrap());
        let allocator = manager.allocator().lock();
        assert_eq!(
            allocator.storage_path("arm/arm"),
            Some(temp_dir.path().join("arm.graph").as_path())
        );
    }
    assert!(temp_dir.path().join("arm.graph").exists());
}

#[test]
fn test_missing_roadmap_file_starts_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("never_written.graph");
    let library = TestLibrary::default();
    let manager = manager_with(
        &library,
        vec![prm("arm")
            .with_param("load_planner_data", "true")
            .with_param("planner_data_path", path.to_str().unwrap())],
    );

    let context = manager.get_planning_context(scene(), &arm_request("")).unwrap();
    assert_eq!(context.planner().unwrap().lock().planner_data().num_vertices(), 1);
    assert_eq!(library.constructed(), 1);
}
