#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use evodrive::simulation::error::SimulationError;
use evodrive::simulation::road::Road;

#[test]
fn test_road_edges_and_borders() {
    let road = Road::new(150.0, 270.0, 3, 1000.0).unwrap();

    assert_eq!(road.left, 15.0);
    assert_eq!(road.right, 285.0);
    assert_eq!(road.borders.len(), 2);
    assert_eq!(road.borders[0].start.x, 15.0);
    assert_eq!(road.borders[0].start.y, -1000.0);
    assert_eq!(road.borders[1].end.x, 285.0);
    assert_eq!(road.borders[1].end.y, 1000.0);
}

#[test]
fn test_lane_centers() {
    let road = Road::new(150.0, 270.0, 3, 1000.0).unwrap();

    assert_eq!(road.lane_center(0), 60.0);
    assert_eq!(road.lane_center(1), 150.0);
    assert_eq!(road.lane_center(2), 240.0);
    // past the last lane clamps to it
    assert_eq!(road.lane_center(9), 240.0);
}

#[test]
fn test_lane_dividers() {
    let road = Road::new(150.0, 270.0, 3, 1000.0).unwrap();
    let dividers = road.lane_dividers();
    assert_eq!(dividers.len(), 2);
    assert!((dividers[0] - 105.0).abs() < 1e-3);
    assert!((dividers[1] - 195.0).abs() < 1e-3);

    let single = Road::new(0.0, 100.0, 1, 1000.0).unwrap();
    assert!(single.lane_dividers().is_empty());
}

#[test]
fn test_road_rejects_bad_configuration() {
    assert!(matches!(
        Road::new(0.0, 0.0, 3, 1000.0),
        Err(SimulationError::Configuration(_))
    ));
    assert!(matches!(
        Road::new(0.0, 100.0, 0, 1000.0),
        Err(SimulationError::Configuration(_))
    ));
}
