use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use gridwalk_navigation::{FollowerSnapshot, Grid};

#[derive(Clone)]
pub struct State {
    /// Latest follower snapshot, `None` until the first tick
    pub follower: Option<FollowerSnapshot>,
    /// Grid as last published by the navigation task
    pub grid: Option<Arc<Grid>>,
    pub last_tick_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            follower: None,
            grid: None,
            last_tick_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn record_tick(bb: &Blackboard, snap: FollowerSnapshot) {
    let mut g = bb.write();
    g.follower = Some(snap);
    g.last_tick_ts = Instant::now();
}

pub fn record_grid(bb: &Blackboard, grid: Arc<Grid>) {
    bb.write().grid = Some(grid);
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

pub fn clear_fault(bb: &Blackboard, msg: &str) {
    bb.write().faults.retain(|s| s != msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwalk_motion::{Facing, WorldPoint};
    use gridwalk_navigation::FollowerState;

    #[test]
    fn test_faults_are_deduplicated_and_cleared() {
        let bb: Blackboard = Arc::default();
        raise_fault(&bb, "navigation stalled");
        raise_fault(&bb, "navigation stalled");
        assert_eq!(snapshot(&bb).faults, vec!["navigation stalled".to_string()]);
        clear_fault(&bb, "navigation stalled");
        assert!(snapshot(&bb).faults.is_empty());
    }

    #[test]
    fn test_record_tick_stores_latest_snapshot() {
        let bb: Blackboard = Arc::default();
        assert!(snapshot(&bb).follower.is_none());
        let before = snapshot(&bb).last_tick_ts;

        record_tick(
            &bb,
            FollowerSnapshot {
                state: FollowerState::Moving,
                position: WorldPoint::new(1.0, 2.0),
                facing: Facing::West,
                waypoints: vec![],
                path_visible: true,
                destination: None,
                pending_destination: None,
            },
        );
        let state = snapshot(&bb);
        assert_eq!(state.follower.unwrap().state, FollowerState::Moving);
        assert!(state.last_tick_ts >= before);
    }

    #[test]
    fn test_record_grid_replaces_previous() {
        let bb: Blackboard = Arc::default();
        assert!(snapshot(&bb).grid.is_none());
        record_grid(&bb, Arc::new(Grid::new(2, 2, 1).unwrap()));
        record_grid(&bb, Arc::new(Grid::new(3, 4, 1).unwrap()));
        let grid = snapshot(&bb).grid.unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 4));
    }
}
