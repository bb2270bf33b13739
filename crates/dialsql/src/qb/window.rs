//! Window specifications for `OVER (...)` and `WINDOW name AS (...)`.

use crate::dialect::Direction;
use crate::error::{SqlError, SqlResult};
use crate::qb::common::OrderBy;

/// Partitioning, ordering and framing of a window function.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Window {
    pub(crate) partition_by: Vec<String>,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) frame: Option<Frame>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by(mut self, columns: &[&str]) -> Self {
        self.partition_by
            .extend(columns.iter().map(|c| c.to_string()));
        self
    }

    pub fn order_by(mut self, expr: &str, direction: Direction) -> Self {
        self.order_by.push(OrderBy::new(expr, direction));
        self
    }

    pub fn frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameUnit {
    Rows,
    Range,
    Groups,
}

impl FrameUnit {
    pub fn keyword(self) -> &'static str {
        match self {
            FrameUnit::Rows => "ROWS",
            FrameUnit::Range => "RANGE",
            FrameUnit::Groups => "GROUPS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl FrameBound {
    pub fn to_sql(self) -> String {
        match self {
            FrameBound::UnboundedPreceding => "UNBOUNDED PRECEDING".to_string(),
            FrameBound::Preceding(n) => format!("{n} PRECEDING"),
            FrameBound::CurrentRow => "CURRENT ROW".to_string(),
            FrameBound::Following(n) => format!("{n} FOLLOWING"),
            FrameBound::UnboundedFollowing => "UNBOUNDED FOLLOWING".to_string(),
        }
    }

    fn rank(self) -> u8 {
        match self {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::Preceding(_) => 1,
            FrameBound::CurrentRow => 2,
            FrameBound::Following(_) => 3,
            FrameBound::UnboundedFollowing => 4,
        }
    }
}

/// A window frame. Without an end bound the frame renders as `UNIT start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub(crate) unit: FrameUnit,
    pub(crate) start: FrameBound,
    pub(crate) end: Option<FrameBound>,
}

impl Frame {
    pub fn new(unit: FrameUnit, start: FrameBound, end: Option<FrameBound>) -> Self {
        Self { unit, start, end }
    }

    pub fn rows(start: FrameBound, end: FrameBound) -> Self {
        Self::new(FrameUnit::Rows, start, Some(end))
    }

    pub fn range(start: FrameBound, end: FrameBound) -> Self {
        Self::new(FrameUnit::Range, start, Some(end))
    }

    pub fn groups(start: FrameBound, end: FrameBound) -> Self {
        Self::new(FrameUnit::Groups, start, Some(end))
    }

    pub fn unit(&self) -> FrameUnit {
        self.unit
    }

    pub fn validate(&self) -> SqlResult<()> {
        if self.start == FrameBound::UnboundedFollowing {
            return Err(SqlError::invalid(
                "Window frame cannot start at UNBOUNDED FOLLOWING",
            ));
        }
        match self.end {
            None => {
                if matches!(self.start, FrameBound::Following(_)) {
                    return Err(SqlError::invalid(
                        "Window frame without an end bound cannot start after CURRENT ROW",
                    ));
                }
            }
            Some(end) => {
                if end == FrameBound::UnboundedPreceding {
                    return Err(SqlError::invalid(
                        "Window frame cannot end at UNBOUNDED PRECEDING",
                    ));
                }
                if self.start.rank() > end.rank() {
                    return Err(SqlError::invalid(format!(
                        "Window frame starts after it ends: {} .. {}",
                        self.start.to_sql(),
                        end.to_sql()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn to_sql(&self) -> String {
        match self.end {
            Some(end) => format!(
                "{} BETWEEN {} AND {}",
                self.unit.keyword(),
                self.start.to_sql(),
                end.to_sql()
            ),
            None => format!("{} {}", self.unit.keyword(), self.start.to_sql()),
        }
    }
}

/// How a window function refers to its window.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowRef {
    /// A window declared with [`Select::window`](crate::qb::Select::window).
    Named(String),
    Inline(Window),
}

impl From<&str> for WindowRef {
    fn from(name: &str) -> Self {
        WindowRef::Named(name.to_string())
    }
}

impl From<Window> for WindowRef {
    fn from(window: Window) -> Self {
        WindowRef::Inline(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_sql() {
        let f = Frame::rows(FrameBound::UnboundedPreceding, FrameBound::CurrentRow);
        assert_eq!(f.to_sql(), "ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW");
        let f = Frame::new(FrameUnit::Range, FrameBound::Preceding(3), None);
        assert_eq!(f.to_sql(), "RANGE 3 PRECEDING");
    }

    #[test]
    fn frame_bounds_validated() {
        assert!(Frame::rows(FrameBound::UnboundedFollowing, FrameBound::UnboundedFollowing)
            .validate()
            .is_err());
        assert!(Frame::rows(FrameBound::CurrentRow, FrameBound::UnboundedPreceding)
            .validate()
            .is_err());
        assert!(Frame::rows(FrameBound::Following(1), FrameBound::Preceding(1))
            .validate()
            .is_err());
        assert!(Frame::groups(FrameBound::Preceding(2), FrameBound::Following(2))
            .validate()
            .is_ok());
    }
}
