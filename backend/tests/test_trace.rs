//! Tests for trace assembly and displacement accounting

use traffic_simulator_core_rs::{RunTrace, TraceError};

#[test]
fn test_known_displacements_per_vehicle() {
    // Vehicle 0 advances 1, 2, 3 cells; vehicle 1 stays put
    let rows = vec![vec![0, 5], vec![1, 5], vec![3, 5], vec![6, 5]];
    let trace = RunTrace::from_rows(10, &rows).unwrap();

    assert_eq!(trace.displacement_per_vehicle(), vec![6, 0]);
    assert_eq!(trace.total_displacement(), 6);
}

#[test]
fn test_displacement_counts_boundary_crossings() {
    // 8 -> 1 on a ring of 10 is 3 forward cells, not -7
    let rows = vec![vec![8], vec![1], vec![4]];
    let trace = RunTrace::from_rows(10, &rows).unwrap();

    assert_eq!(trace.total_displacement(), 6);
}

#[test]
fn test_stationary_trace_has_zero_displacement() {
    let rows = vec![vec![2, 7]; 5];
    let trace = RunTrace::from_rows(12, &rows).unwrap();

    assert_eq!(trace.displacement_per_vehicle(), vec![0, 0]);
    assert_eq!(trace.total_displacement(), 0);
}

#[test]
fn test_rows_iterate_in_recording_order() {
    let rows = vec![vec![0], vec![3], vec![6]];
    let trace = RunTrace::from_rows(9, &rows).unwrap();

    let collected: Vec<Vec<u32>> = trace.rows().map(|row| row.to_vec()).collect();
    assert_eq!(collected, rows);
    assert_eq!(trace.row(1), &[3][..]);
}

#[test]
fn test_from_rows_validates_shape() {
    assert_eq!(RunTrace::from_rows(10, &[]), Err(TraceError::Empty));
    assert_eq!(
        RunTrace::from_rows(10, &[vec![]]),
        Err(TraceError::NoVehicles)
    );
    assert_eq!(
        RunTrace::from_rows(10, &[vec![1, 2], vec![3]]),
        Err(TraceError::RaggedRow {
            row: 1,
            expected: 2,
            got: 1,
        })
    );
}

#[test]
fn test_from_rows_validates_bounds() {
    assert_eq!(
        RunTrace::from_rows(4, &[vec![0, 4]]),
        Err(TraceError::PositionOutOfRange {
            row: 0,
            position: 4,
            ring_size: 4,
        })
    );
}

#[test]
fn test_errors_render_for_operators() {
    let err = TraceError::RaggedRow {
        row: 3,
        expected: 5,
        got: 4,
    };
    assert_eq!(err.to_string(), "row 3 has 4 positions, expected 5");
}
