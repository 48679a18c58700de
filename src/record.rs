use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::images::Bitmap;

/// One program as it arrives in a page response, before enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    /// Milliseconds.
    pub duration: f64,
    pub images: EntryImages,
    #[serde(default)]
    pub schools: Vec<EntityRef>,
    #[serde(default)]
    pub sports: Vec<EntityRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryImages {
    pub medium: String,
}

/// An id pointing at a school or sport. Any inline name is ignored; names are re-resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityRef {
    pub id: u64,
}

/// URL of the next page. Empty means the catalog is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(url: impl Into<String>) -> Self {
        PageCursor(url.into())
    }

    pub fn end() -> Self {
        PageCursor(String::new())
    }

    pub fn is_end(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn url(&self) -> Option<&str> {
        if self.is_end() { None } else { Some(&self.0) }
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end() { f.write_str("<end>") } else { f.write_str(&self.0) }
    }
}

#[derive(Debug, Clone)]
pub struct RosterItem {
    pub name: String,
    pub icon: Bitmap,
}

/// Which list a card's toggle is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterTab {
    #[default]
    Schools,
    Sports,
}

impl RosterTab {
    pub fn toggled(self) -> Self {
        match self {
            RosterTab::Schools => RosterTab::Sports,
            RosterTab::Sports => RosterTab::Schools,
        }
    }
}

/// A fully resolved, render-ready catalog item. Immutable once built.
#[derive(Debug, Clone)]
pub struct DisplayRecord {
    title: String,
    duration: Duration,
    thumbnail: Bitmap,
    schools: Vec<RosterItem>,
    sports: Vec<RosterItem>,
    next_page: PageCursor,
}

impl DisplayRecord {
    pub(crate) fn new(
        title: String,
        duration_ms: f64,
        thumbnail: Bitmap,
        schools: Vec<RosterItem>,
        sports: Vec<RosterItem>,
        next_page: PageCursor,
    ) -> Self {
        let secs = if duration_ms.is_finite() && duration_ms > 0.0 { duration_ms / 1000.0 } else { 0.0 };
        Self {
            title,
            duration: Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX),
            thumbnail,
            schools,
            sports,
            next_page,
        }
    }

    pub fn title(&self) -> &str { &self.title }
    pub fn duration(&self) -> Duration { self.duration }
    pub fn thumbnail(&self) -> &Bitmap { &self.thumbnail }
    pub fn next_page(&self) -> &PageCursor { &self.next_page }

    pub fn school_names(&self) -> Vec<&str> { self.schools.iter().map(|s| s.name.as_str()).collect() }
    pub fn school_crests(&self) -> Vec<&Bitmap> { self.schools.iter().map(|s| &s.icon).collect() }
    pub fn sport_names(&self) -> Vec<&str> { self.sports.iter().map(|s| s.name.as_str()).collect() }
    pub fn sport_icons(&self) -> Vec<&Bitmap> { self.sports.iter().map(|s| &s.icon).collect() }

    pub fn roster(&self, tab: RosterTab) -> &[RosterItem] {
        match tab {
            RosterTab::Schools => &self.schools,
            RosterTab::Sports => &self.sports,
        }
    }

    /// `M:SS`, minutes wrapped at the hour and padded to two columns.
    pub fn duration_label(&self) -> String {
        let total = self.duration.as_secs();
        format!("{:2}:{:02}", total / 60 % 60, total % 60)
    }
}
