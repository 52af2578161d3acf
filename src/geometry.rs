use crate::units::Pt;

/// A point on the page. For laid out parts this is always the top-left corner of the
/// part's content, with `y` measured upwards from the bottom of the page.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Position {
    pub x: Pt,
    pub y: Pt,
}

impl Position {
    pub fn new<X: Into<Pt>, Y: Into<Pt>>(x: X, y: Y) -> Position {
        Position {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn with_x(self, x: Pt) -> Position {
        Position { x, ..self }
    }

    pub fn with_y(self, y: Pt) -> Position {
        Position { y, ..self }
    }
}

/// A horizontal interval on a page, either free or occupied depending on the query that
/// produced it. `valid_at_height` records the height the interval was sampled at when
/// the producer cares to say.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Space {
    pub start: Pt,
    pub end: Pt,
    pub valid_at_height: Option<Pt>,
}

impl Space {
    pub fn new(start: Pt, end: Pt) -> Space {
        Space {
            start,
            end,
            valid_at_height: None,
        }
    }

    pub fn at_height(start: Pt, end: Pt, height: Pt) -> Space {
        Space {
            start,
            end,
            valid_at_height: Some(height),
        }
    }

    pub fn width(&self) -> Pt {
        (self.end - self.start).max(Pt::ZERO)
    }
}

/// Sorts and merges overlapping or touching intervals
pub(crate) fn merge_spaces(mut spaces: Vec<Space>) -> Vec<Space> {
    spaces.sort_by(|a, b| a.start.0.total_cmp(&b.start.0));
    let mut merged: Vec<Space> = Vec::with_capacity(spaces.len());
    for space in spaces {
        match merged.last_mut() {
            Some(last) if space.start <= last.end => {
                last.end = last.end.max(space.end);
            }
            _ => merged.push(space),
        }
    }
    merged
}

/// Subtracts every `used` interval from `bounds`, returning the free intervals left to right
pub(crate) fn free_spaces(bounds: Space, used: &[Space]) -> Vec<Space> {
    let mut free = Vec::new();
    let mut cursor = bounds.start;
    for u in merge_spaces(used.to_vec()) {
        if u.end <= cursor {
            continue;
        }
        if u.start >= bounds.end {
            break;
        }
        if u.start > cursor {
            free.push(Space::new(cursor, u.start));
        }
        cursor = cursor.max(u.end);
    }
    if cursor < bounds.end {
        free.push(Space::new(cursor, bounds.end));
    }
    free
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_spaces_merge() {
        let merged = merge_spaces(vec![
            Space::new(Pt(50.0), Pt(80.0)),
            Space::new(Pt(10.0), Pt(20.0)),
            Space::new(Pt(15.0), Pt(40.0)),
        ]);
        assert_eq!(
            merged,
            vec![Space::new(Pt(10.0), Pt(40.0)), Space::new(Pt(50.0), Pt(80.0))]
        );
    }

    #[test]
    fn free_space_is_what_remains_between_occupants() {
        let bounds = Space::new(Pt(20.0), Pt(580.0));
        let free = free_spaces(
            bounds,
            &[
                Space::new(Pt(0.0), Pt(100.0)),
                Space::new(Pt(300.0), Pt(350.0)),
            ],
        );
        assert_eq!(
            free,
            vec![
                Space::new(Pt(100.0), Pt(300.0)),
                Space::new(Pt(350.0), Pt(580.0))
            ]
        );
    }

    #[test]
    fn fully_covered_bounds_have_no_free_space() {
        let free = free_spaces(
            Space::new(Pt(20.0), Pt(580.0)),
            &[Space::new(Pt(0.0), Pt(600.0))],
        );
        assert!(free.is_empty());
    }
}
