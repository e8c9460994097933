use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::detection::{Label, Point};

/// Ventana espacial y temporal dentro de la cual dos detecciones son el mismo evento.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupWindow {
    pub distance_px: f32,
    pub cooldown: Duration,
    pub capacity: usize,
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self {
            distance_px: 50.0,
            cooldown: Duration::from_secs(30),
            capacity: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionEvent {
    pub center: Point,
    pub label: Label,
    pub observed_at: Instant,
}

/// Eventos alertados recientemente, del más antiguo al más nuevo. Nunca más de `capacity`.
#[derive(Debug)]
pub struct DetectionHistory {
    events: VecDeque<DetectionEvent>,
    window: DedupWindow,
}

impl DetectionHistory {
    pub fn new(window: DedupWindow) -> Self {
        let capacity = window.capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            window: DedupWindow { capacity, ..window },
        }
    }

    pub fn window(&self) -> &DedupWindow {
        &self.window
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionEvent> {
        self.events.iter()
    }

    /// Sin efectos; quien llama añade los eventos aceptados con [`DetectionHistory::record`].
    pub fn is_duplicate(&self, center: Point, label: Label, now: Instant) -> bool {
        is_duplicate(center, label, self, now)
    }

    pub fn record(&mut self, event: DetectionEvent) {
        if self.events.len() == self.window.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

pub fn is_duplicate(center: Point, label: Label, history: &DetectionHistory, now: Instant) -> bool {
    let window = history.window();
    history.iter().any(|event| {
        event.label == label
            && center.distance(&event.center) < window.distance_px
            && now.saturating_duration_since(event.observed_at) < window.cooldown
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(center: Point, label: Label, at: Instant) -> DetectionHistory {
        let mut history = DetectionHistory::new(DedupWindow::default());
        history.record(DetectionEvent { center, label, observed_at: at });
        history
    }

    #[test]
    fn nearby_same_label_within_cooldown_is_duplicate() {
        let t0 = Instant::now();
        let history = history_with(Point::new(100.0, 100.0), Label::Sick, t0);

        assert!(history.is_duplicate(Point::new(110.0, 105.0), Label::Sick, t0));
        assert!(!history.is_duplicate(Point::new(200.0, 100.0), Label::Sick, t0));
        assert!(!history.is_duplicate(Point::new(110.0, 105.0), Label::Dead, t0));
        assert!(!history.is_duplicate(
            Point::new(110.0, 105.0),
            Label::Sick,
            t0 + Duration::from_secs(31)
        ));
    }

    #[test]
    fn boundaries_are_exclusive() {
        let t0 = Instant::now();
        let history = history_with(Point::new(0.0, 0.0), Label::Dead, t0);

        assert!(!history.is_duplicate(Point::new(50.0, 0.0), Label::Dead, t0));
        assert!(history.is_duplicate(Point::new(49.9, 0.0), Label::Dead, t0));
        assert!(!history.is_duplicate(Point::new(0.0, 0.0), Label::Dead, t0 + Duration::from_secs(30)));
    }

    #[test]
    fn predicate_does_not_mutate_history() {
        let t0 = Instant::now();
        let history = history_with(Point::new(100.0, 100.0), Label::Sick, t0);
        for _ in 0..3 {
            assert!(history.is_duplicate(Point::new(101.0, 101.0), Label::Sick, t0));
        }
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn matches_any_retained_event_not_just_latest() {
        let t0 = Instant::now();
        let mut history = history_with(Point::new(10.0, 10.0), Label::Sick, t0);
        history.record(DetectionEvent { center: Point::new(500.0, 500.0), label: Label::Sick, observed_at: t0 });

        assert!(history.is_duplicate(Point::new(12.0, 12.0), Label::Sick, t0));
    }

    #[test]
    fn history_evicts_oldest_at_capacity() {
        let t0 = Instant::now();
        let mut history = DetectionHistory::new(DedupWindow::default());
        for i in 0..51 {
            history.record(DetectionEvent {
                center: Point::new(i as f32 * 100.0, 0.0),
                label: Label::Dead,
                observed_at: t0,
            });
        }

        assert_eq!(history.len(), 50);
        let first = history.iter().next().unwrap();
        assert_eq!(first.center, Point::new(100.0, 0.0));
        assert!(!history.is_duplicate(Point::new(0.0, 0.0), Label::Dead, t0));
        assert!(history.is_duplicate(Point::new(5000.0, 0.0), Label::Dead, t0));
    }

    #[test]
    fn window_is_configurable() {
        let t0 = Instant::now();
        let window = DedupWindow { distance_px: 5.0, cooldown: Duration::from_secs(2), capacity: 3 };
        let mut history = DetectionHistory::new(window);
        history.record(DetectionEvent { center: Point::new(0.0, 0.0), label: Label::Sick, observed_at: t0 });

        assert!(!history.is_duplicate(Point::new(10.0, 0.0), Label::Sick, t0));
        assert!(!history.is_duplicate(Point::new(1.0, 0.0), Label::Sick, t0 + Duration::from_secs(3)));
    }
}
