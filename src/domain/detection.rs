use std::fmt;

use serde::{Deserialize, Serialize};

/// Salida cruda del detector, en píxeles del frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
    pub label: String,
}

impl Detection {
    pub fn center(&self) -> Point {
        Point {
            x: (self.x1 + self.x2) / 2.0,
            y: (self.y1 + self.y2) / 2.0,
        }
    }

    pub fn kind(&self) -> Label {
        Label::parse(&self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Sick,
    Dead,
    Other,
}

impl Label {
    /// Los nombres de clase del modelo se comparan sin distinguir mayúsculas.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sick" => Label::Sick,
            "dead" => Label::Dead,
            _ => Label::Other,
        }
    }

    pub fn is_alertable(&self) -> bool {
        matches!(self, Label::Sick | Label::Dead)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Sick => "sick",
            Label::Dead => "dead",
            Label::Other => "other",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection { x1, y1, x2, y2, score: 0.5, class_id: 0, label: label.to_string() }
    }

    #[test]
    fn center_is_box_midpoint() {
        let c = det("dead", 10.0, 10.0, 30.0, 30.0).center();
        assert_eq!(c, Point::new(20.0, 20.0));
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(det("Sick", 0.0, 0.0, 1.0, 1.0).kind(), Label::Sick);
        assert_eq!(Label::parse(" DEAD "), Label::Dead);
        assert_eq!(Label::parse("healthy"), Label::Other);
        assert!(!Label::Other.is_alertable());
        assert!(Label::Dead.is_alertable());
    }

    #[test]
    fn distance_is_euclidean() {
        let d = Point::new(100.0, 100.0).distance(&Point::new(110.0, 105.0));
        assert!((d - 11.18).abs() < 0.01);
    }
}
