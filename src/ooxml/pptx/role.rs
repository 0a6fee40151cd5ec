//! Role classification of text containers.
//!
//! Roles are assigned by an ordered list of [`Rule`]s; the first rule that
//! matches wins and [`Role::Body`] is the fallback. The only state carried
//! between containers of a slide is whether the size-based heading has
//! already been claimed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RoleConfig;
use crate::ooxml::pptx::frame::{Frame, Placement};
use crate::ooxml::xml::ns;
use crate::ooxml::xml::Element;

/// What a text container is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Title,
    Heading,
    Body,
    Annotation,
    ChartLabel,
    ChartSeries,
    ChartTitle,
    TableCell,
}

impl Role {
    /// Annotations may stay untranslated without making the document partial.
    #[inline]
    pub const fn is_required(self) -> bool {
        !matches!(self, Role::Annotation)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Title => "title",
            Role::Heading => "heading",
            Role::Body => "body",
            Role::Annotation => "annotation",
            Role::ChartLabel => "chart_label",
            Role::ChartSeries => "chart_series",
            Role::ChartTitle => "chart_title",
            Role::TableCell => "table_cell",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the classifier knows about one text container.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerFacts<'a> {
    pub in_table_cell: bool,
    /// `p:ph/@type`, with the implicit `obj` for untyped placeholders
    pub placeholder: Option<&'a str>,
    /// Largest explicit run size, in hundredths of a point
    pub max_size: Option<i64>,
    pub placement: Option<Placement>,
}

/// One classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    TableCell,
    TitlePlaceholder,
    SubtitlePlaceholder,
    LargestRun,
    Placeholder,
    SmallTextBox,
}

/// Rules in evaluation order.
pub const RULES: &[Rule] = &[
    Rule::TableCell,
    Rule::TitlePlaceholder,
    Rule::SubtitlePlaceholder,
    Rule::LargestRun,
    Rule::Placeholder,
    Rule::SmallTextBox,
];

/// Classifier for the containers of one slide.
#[derive(Debug, Clone)]
pub struct RoleClassifier<'c> {
    config: &'c RoleConfig,
    frame: Frame,
    /// Heading threshold: median explicit run size times the heading ratio
    threshold: Option<f64>,
    heading_claimed: bool,
}

impl<'c> RoleClassifier<'c> {
    /// Build a classifier from every explicit run size on the slide.
    pub fn new(config: &'c RoleConfig, frame: Frame, sizes: impl IntoIterator<Item = i64>) -> Self {
        let threshold = median(sizes.into_iter().collect()).map(|m| m * config.heading_ratio);
        Self {
            config,
            frame,
            threshold,
            heading_claimed: false,
        }
    }

    pub fn classify(&mut self, facts: &ContainerFacts<'_>) -> Role {
        for rule in RULES {
            if let Some(role) = self.apply(*rule, facts) {
                return role;
            }
        }
        Role::Body
    }

    fn apply(&mut self, rule: Rule, facts: &ContainerFacts<'_>) -> Option<Role> {
        match rule {
            Rule::TableCell => facts.in_table_cell.then_some(Role::TableCell),
            Rule::TitlePlaceholder => {
                matches!(facts.placeholder, Some("title" | "ctrTitle")).then_some(Role::Title)
            },
            Rule::SubtitlePlaceholder => {
                (facts.placeholder == Some("subTitle")).then_some(Role::Heading)
            },
            Rule::LargestRun => {
                if self.heading_claimed {
                    return None;
                }
                let size = facts.max_size? as f64;
                if size > self.threshold? {
                    self.heading_claimed = true;
                    Some(Role::Heading)
                } else {
                    None
                }
            },
            Rule::Placeholder => facts.placeholder.map(|_| Role::Body),
            Rule::SmallTextBox => {
                let p = facts.placement?;
                let small = self.frame.width_fraction(&p) <= self.config.annotation_width
                    && self.frame.height_fraction(&p) <= self.config.annotation_height;
                small.then_some(Role::Annotation)
            },
        }
    }
}

fn median(mut values: Vec<i64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) as f64 / 2.0
    } else {
        values[mid] as f64
    })
}

/// Explicit run sizes (`a:rPr/@sz`) inside a text body.
pub fn explicit_sizes(body: &Element) -> impl Iterator<Item = i64> + '_ {
    body.descendants()
        .filter(|e| e.is(ns::A, "rPr"))
        .filter_map(|rpr| rpr.attr_emu("sz"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier<'c>(config: &'c RoleConfig, sizes: &[i64]) -> RoleClassifier<'c> {
        RoleClassifier::new(config, Frame::slide(10_000, 10_000), sizes.iter().copied())
    }

    #[test]
    fn test_rule_order() {
        let config = RoleConfig::default();
        let mut c = classifier(&config, &[1800, 1800, 1800, 4400]);

        let cell = ContainerFacts {
            in_table_cell: true,
            placeholder: Some("title"),
            ..Default::default()
        };
        assert_eq!(c.classify(&cell), Role::TableCell);

        let title = ContainerFacts {
            placeholder: Some("ctrTitle"),
            max_size: Some(4400),
            ..Default::default()
        };
        assert_eq!(c.classify(&title), Role::Title);

        let subtitle = ContainerFacts {
            placeholder: Some("subTitle"),
            ..Default::default()
        };
        assert_eq!(c.classify(&subtitle), Role::Heading);

        let body = ContainerFacts {
            placeholder: Some("obj"),
            max_size: Some(1800),
            ..Default::default()
        };
        assert_eq!(c.classify(&body), Role::Body);
    }

    #[test]
    fn test_heading_is_claimed_once() {
        let config = RoleConfig::default();
        let mut c = classifier(&config, &[1800, 1800, 2800, 2800, 1800]);
        let big = ContainerFacts {
            max_size: Some(2800),
            ..Default::default()
        };
        assert_eq!(c.classify(&big), Role::Heading);
        assert_eq!(c.classify(&big), Role::Body);
    }

    #[test]
    fn test_no_sizes_means_no_heading() {
        let config = RoleConfig::default();
        let mut c = classifier(&config, &[]);
        let facts = ContainerFacts {
            max_size: Some(9000),
            ..Default::default()
        };
        assert_eq!(c.classify(&facts), Role::Body);
    }

    #[test]
    fn test_small_text_box_is_annotation() {
        let config = RoleConfig::default();
        let mut c = classifier(&config, &[]);
        let small = ContainerFacts {
            placement: Some(Placement {
                x: 0,
                y: 9_000,
                cx: 3_000,
                cy: 1_500,
            }),
            ..Default::default()
        };
        assert_eq!(c.classify(&small), Role::Annotation);
        assert!(!Role::Annotation.is_required());

        let wide = ContainerFacts {
            placement: Some(Placement {
                x: 0,
                y: 0,
                cx: 3_100,
                cy: 1_000,
            }),
            ..Default::default()
        };
        assert_eq!(c.classify(&wide), Role::Body);

        // placeholders never become annotations
        let small_placeholder = ContainerFacts {
            placeholder: Some("sldNum"),
            ..small
        };
        assert_eq!(c.classify(&small_placeholder), Role::Body);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![3, 1, 2]), Some(2.0));
        assert_eq!(median(vec![4, 1, 2, 3]), Some(2.5));
        assert_eq!(median(Vec::new()), None);
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::ChartTitle).unwrap(), "\"chart_title\"");
        assert_eq!(Role::TableCell.to_string(), "table_cell");
    }
}
