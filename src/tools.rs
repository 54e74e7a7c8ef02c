use crate::traits::ToolControl;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Neutral navigation tool; the default state the toolbar falls back to.
#[derive(Default)]
pub struct PanTool {
    active: AtomicBool,
}

impl ToolControl for PanTool {
    fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }
    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Click-to-inspect mode. The actual feature lookup goes through the
/// identify panel; the tool only gates whether map clicks are interpreted.
#[derive(Default)]
pub struct IdentifyTool {
    active: AtomicBool,
    last_click: Mutex<Option<(f64, f64)>>,
}

impl IdentifyTool {
    pub fn click(&self, x: f64, y: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        *self.last_click.lock().unwrap() = Some((x, y));
        true
    }

    pub fn last_click(&self) -> Option<(f64, f64)> {
        *self.last_click.lock().unwrap()
    }
}

impl ToolControl for IdentifyTool {
    fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }
    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        *self.last_click.lock().unwrap() = None;
    }
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Layer comparison slider. Position is the viewport fraction left of the
/// split, clamped to 0..=1.
#[derive(Default)]
pub struct SwipeTool {
    active: AtomicBool,
    position: Mutex<f64>,
}

impl SwipeTool {
    pub fn set_position(&self, position: f64) {
        *self.position.lock().unwrap() = position.clamp(0.0, 1.0);
    }

    pub fn position(&self) -> f64 {
        *self.position.lock().unwrap()
    }
}

impl ToolControl for SwipeTool {
    fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
        self.set_position(0.5);
    }
    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Distance measuring along a clicked polyline, in projection meters.
#[derive(Default)]
pub struct MeasureTool {
    active: AtomicBool,
    points: Mutex<Vec<(f64, f64)>>,
}

impl MeasureTool {
    pub fn add_point(&self, x: f64, y: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        self.points.lock().unwrap().push((x, y));
        true
    }

    pub fn length(&self) -> f64 {
        let points = self.points.lock().unwrap();
        points
            .windows(2)
            .map(|pair| {
                let (ax, ay) = pair[0];
                let (bx, by) = pair[1];
                ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt()
            })
            .sum()
    }
}

impl ToolControl for MeasureTool {
    fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }
    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        // the sketch does not survive tool switches
        self.points.lock().unwrap().clear();
    }
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_accumulates_segment_lengths() {
        let tool = MeasureTool::default();
        tool.activate();
        tool.add_point(0.0, 0.0);
        tool.add_point(3.0, 4.0);
        tool.add_point(3.0, 8.0);
        assert_eq!(tool.length(), 9.0);
    }

    #[test]
    fn measure_sketch_clears_on_deactivate() {
        let tool = MeasureTool::default();
        tool.activate();
        tool.add_point(0.0, 0.0);
        tool.add_point(1.0, 0.0);
        tool.deactivate();
        assert_eq!(tool.length(), 0.0);
        assert!(!tool.add_point(2.0, 0.0));
    }

    #[test]
    fn identify_ignores_clicks_while_inactive() {
        let tool = IdentifyTool::default();
        assert!(!tool.click(1.0, 1.0));
        tool.activate();
        assert!(tool.click(1.0, 1.0));
        tool.deactivate();
        assert_eq!(tool.last_click(), None);
    }

    #[test]
    fn swipe_position_clamps_to_unit_range() {
        let tool = SwipeTool::default();
        tool.activate();
        assert_eq!(tool.position(), 0.5);
        tool.set_position(1.7);
        assert_eq!(tool.position(), 1.0);
        tool.set_position(-0.2);
        assert_eq!(tool.position(), 0.0);
    }
}
