//! Rendered page description.
//!
//! A [`PageView`] is what a remote page produces. Local remotes hand it to
//! the shell directly; standalone remotes serialize it as JSON.

use serde::{Deserialize, Serialize};

/// Greeting shown in a page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Greeting {
    /// Account still loading; rendered as a skeleton.
    Loading,
    /// Account loaded.
    Welcome {
        /// Account display name.
        name: String,
    },
    /// Account unavailable.
    Anonymous,
}

/// A metric card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCard {
    /// Caption above the value.
    pub label: String,
    /// Formatted metric.
    pub value: String,
    /// Small print under the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl StatCard {
    /// Card showing `value` under `label`.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            hint: None,
        }
    }

    /// Add small print under the value.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// A line in a list section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Main line.
    pub title: String,
    /// Secondary line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Short tag shown at the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Target of the title link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ListItem {
    /// Item with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: None,
            badge: None,
            link: None,
        }
    }

    /// Set the secondary line.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the trailing tag.
    #[must_use]
    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    /// Link the title to `link`.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Content of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    /// Skeleton shown while a query is pending.
    Loading {
        /// Number of empty cards to draw.
        placeholders: usize,
    },
    /// Row of metric cards.
    Stats {
        /// Cards, left to right.
        cards: Vec<StatCard>,
    },
    /// Table with a header row.
    Table {
        /// Header cells.
        columns: Vec<String>,
        /// Body rows, one cell per column.
        rows: Vec<Vec<String>>,
    },
    /// Vertical list.
    List {
        /// Items, top to bottom.
        items: Vec<ListItem>,
    },
}

/// A titled block of page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section title.
    pub heading: String,
    /// Section content.
    pub body: SectionBody,
}

impl Section {
    /// Section titled `heading`.
    pub fn new(heading: impl Into<String>, body: SectionBody) -> Self {
        Self {
            heading: heading.into(),
            body,
        }
    }

    /// Skeleton section with `placeholders` empty cards.
    pub fn loading(heading: impl Into<String>, placeholders: usize) -> Self {
        Self::new(heading, SectionBody::Loading { placeholders })
    }
}

/// Everything a page renders inside the shell layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    /// Page title.
    pub title: String,
    /// Line under the title, usually the repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Greeting for the signed-in account.
    pub greeting: Greeting,
    /// Inline, dismissible error banner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_banner: Option<String>,
    /// Content blocks, top to bottom.
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Whether the page offers a manual refresh action.
    #[serde(default)]
    pub refreshable: bool,
}

impl PageView {
    /// Empty page titled `title`, greeting an anonymous visitor.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            greeting: Greeting::Anonymous,
            error_banner: None,
            sections: Vec::new(),
            refreshable: false,
        }
    }

    /// Set the line under the title.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Replace the greeting.
    #[must_use]
    pub fn with_greeting(mut self, greeting: Greeting) -> Self {
        self.greeting = greeting;
        self
    }

    /// Show `message` in the error banner.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_banner = Some(message.into());
        self
    }

    /// Append a content block.
    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Offer the manual refresh action.
    #[must_use]
    pub const fn refreshable(mut self) -> Self {
        self.refreshable = true;
        self
    }

    /// Whether any section is still a loading skeleton.
    pub fn is_loading(&self) -> bool {
        self.sections
            .iter()
            .any(|s| matches!(s.body, SectionBody::Loading { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_view_json_shape() {
        let view = PageView::new("Admin Panel")
            .with_greeting(Greeting::Welcome {
                name: "John".to_string(),
            })
            .with_section(Section::new(
                "Stats",
                SectionBody::Stats {
                    cards: vec![StatCard::new("Contributors", "30")],
                },
            ));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["greeting"]["state"], "welcome");
        assert_eq!(json["sections"][0]["body"]["kind"], "stats");
        assert!(json.get("error_banner").is_none());

        let back: PageView = serde_json::from_value(json).unwrap();
        assert_eq!(back, view);
    }

    #[test]
    fn test_is_loading() {
        let view = PageView::new("Traffic").with_section(Section::loading("Stats", 4));
        assert!(view.is_loading());
        assert!(!PageView::new("Empty").is_loading());
    }
}
