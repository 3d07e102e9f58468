use super::built_topology;
use crate::error::ScenarioError;
use crate::mobility::{GridLayout, MobilityConfigurator, MobilityPolicy, Position, RandomWalkBounds};

fn grid(origin_x: f64, columns: usize) -> GridLayout {
    GridLayout {
        origin_x,
        origin_y: 0.0,
        spacing_x: 10.0,
        spacing_y: 5.0,
        columns,
    }
}

fn walk() -> RandomWalkBounds {
    RandomWalkBounds {
        width: 200.0,
        height: 200.0,
        speed: 3.0,
        turn_distance: 10.0,
    }
}

#[test]
fn grid_layout_fills_rows_first() {
    let g = grid(0.0, 2);
    assert_eq!(g.position(0), Position { x: 0.0, y: 0.0 });
    assert_eq!(g.position(1), Position { x: 10.0, y: 0.0 });
    assert_eq!(g.position(2), Position { x: 0.0, y: 5.0 });
    assert_eq!(g.position(3), Position { x: 10.0, y: 5.0 });
}

#[test]
fn static_grid_records_positions_in_topology_and_provider() {
    let (mut topo, _, mut stack) = built_topology(2, 3, 1);
    let stations = topo.base_stations();
    {
        let mut m = MobilityConfigurator::new(&mut stack);
        m.set_static_grid(&mut topo, &stations, &grid(50.0, 4)).unwrap();
    }
    assert_eq!(stack.position(stations[1]), Some(Position { x: 60.0, y: 0.0 }));
    assert_eq!(
        topo.node(stations[0]).unwrap().mobility,
        Some(MobilityPolicy::Static {
            position: Position { x: 50.0, y: 0.0 }
        })
    );
}

#[test]
fn static_grids_must_not_overlap_across_calls() {
    let (mut topo, _, mut stack) = built_topology(2, 3, 1);
    let stations = topo.base_stations();
    let core = topo.support_nodes();
    let mut m = MobilityConfigurator::new(&mut stack);
    m.set_static_grid(&mut topo, &core, &grid(0.0, 4)).unwrap();
    let err = m
        .set_static_grid(&mut topo, &stations, &grid(10.0, 4))
        .unwrap_err();
    assert!(matches!(err, ScenarioError::InvalidMobilityBounds(_)));
}

#[test]
fn static_grid_rejects_degenerate_layouts() {
    let (mut topo, _, mut stack) = built_topology(1, 1, 1);
    let stations = topo.base_stations();
    let mut m = MobilityConfigurator::new(&mut stack);

    let zero_cols = grid(0.0, 0);
    let mut zero_spacing = grid(0.0, 2);
    zero_spacing.spacing_x = 0.0;
    let mut nan_origin = grid(0.0, 2);
    nan_origin.origin_y = f64::NAN;

    for layout in [zero_cols, zero_spacing, nan_origin] {
        let err = m.set_static_grid(&mut topo, &stations, &layout).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidMobilityBounds(_)));
    }
}

#[test]
fn random_walk_assigned_to_every_device() {
    let (mut topo, _, mut stack) = built_topology(2, 4, 1);
    let devices = topo.devices();
    {
        let mut m = MobilityConfigurator::new(&mut stack);
        m.set_bounded_random_walk(&mut topo, &devices, &walk()).unwrap();
    }
    for &d in &devices {
        assert_eq!(stack.random_walk(d), Some(walk()));
        assert_eq!(
            topo.node(d).unwrap().mobility,
            Some(MobilityPolicy::RandomWalk { bounds: walk() })
        );
    }
}

#[test]
fn random_walk_rejects_non_positive_bounds() {
    let (mut topo, _, mut stack) = built_topology(1, 2, 1);
    let devices = topo.devices();
    let mut m = MobilityConfigurator::new(&mut stack);

    let mut zero_speed = walk();
    zero_speed.speed = 0.0;
    let mut negative_width = walk();
    negative_width.width = -1.0;
    let mut nan_height = walk();
    nan_height.height = f64::NAN;
    let mut infinite_turn = walk();
    infinite_turn.turn_distance = f64::INFINITY;

    for bounds in [zero_speed, negative_width, nan_height, infinite_turn] {
        let err = m
            .set_bounded_random_walk(&mut topo, &devices, &bounds)
            .unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidMobilityBounds(_)));
    }
}
