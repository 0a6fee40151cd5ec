//! Chart enumerations touched by the RTL transform.

/// Bar direction (`c:barDir`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarDirection {
    /// Horizontal bars
    Bar,
    /// Vertical bars (columns)
    Column,
}

impl BarDirection {
    /// Returns the XML value for this direction.
    #[inline]
    pub const fn xml_value(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Column => "col",
        }
    }

    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "bar" => Some(Self::Bar),
            "col" => Some(Self::Column),
            _ => None,
        }
    }
}

/// Axis orientation (`c:scaling/c:orientation`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AxisOrientation {
    /// Min to max (normal)
    #[default]
    MinMax,
    /// Max to min (reversed)
    MaxMin,
}

impl AxisOrientation {
    /// Returns the XML value for this orientation.
    #[inline]
    pub const fn xml_value(&self) -> &'static str {
        match self {
            Self::MinMax => "minMax",
            Self::MaxMin => "maxMin",
        }
    }

    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "minMax" => Some(Self::MinMax),
            "maxMin" => Some(Self::MaxMin),
            _ => None,
        }
    }

    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Self::MinMax => Self::MaxMin,
            Self::MaxMin => Self::MinMax,
        }
    }
}

/// Legend position (`c:legendPos`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    /// Bottom position
    Bottom,
    /// Left position
    Left,
    /// Right position
    Right,
    /// Top position
    Top,
    /// Top right corner
    TopRight,
}

impl LegendPosition {
    /// Returns the XML value for this position.
    #[inline]
    pub const fn xml_value(&self) -> &'static str {
        match self {
            Self::Bottom => "b",
            Self::Left => "l",
            Self::Right => "r",
            Self::Top => "t",
            Self::TopRight => "tr",
        }
    }

    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "b" => Some(Self::Bottom),
            "l" => Some(Self::Left),
            "r" => Some(Self::Right),
            "t" => Some(Self::Top),
            "tr" => Some(Self::TopRight),
            _ => None,
        }
    }

    /// Left and right swap. `tr` has no top-left counterpart and stays.
    #[inline]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_values() {
        assert_eq!(BarDirection::from_xml("bar"), Some(BarDirection::Bar));
        assert_eq!(BarDirection::Column.xml_value(), "col");
        assert_eq!(AxisOrientation::MinMax.reversed(), AxisOrientation::MaxMin);
        assert_eq!(AxisOrientation::from_xml("sideways"), None);
        assert_eq!(LegendPosition::Right.mirrored(), LegendPosition::Left);
        assert_eq!(LegendPosition::TopRight.mirrored(), LegendPosition::TopRight);
    }
}
