//! Feed pages and the pager that scrolls between them.
//!
//! The feed is a vertical list of full-screen pages, one color each.  The
//! list is static configuration owned by the feed screen; the pager tracks
//! which page is showing.

use motion_state::PageChangeDecision;
use tracing::{info, warn};

use crate::sink::NavigationSink;

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

/// A single page of the feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedItem {
    pub name:  &'static str,
    /// Packed ARGB (0xAARRGGBB, A=0xFF).
    pub color: u32,
}

/// The default feed, top to bottom.
pub const FEED_ITEMS: [FeedItem; 6] = [
    FeedItem { name: "red",    color: 0xFFFF3B30 },
    FeedItem { name: "orange", color: 0xFFFF9500 },
    FeedItem { name: "yellow", color: 0xFFFFCC00 },
    FeedItem { name: "green",  color: 0xFF34C759 },
    FeedItem { name: "blue",   color: 0xFF007AFF },
    FeedItem { name: "purple", color: 0xFFAF52DE },
];

// ════════════════════════════════════════════════════════════════════════════
// FeedPager
// ════════════════════════════════════════════════════════════════════════════

/// Which way the list scrolled on the last navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAnchor {
    /// Advanced: the new page enters from below.
    Bottom,
    /// Retreated: the new page enters from above.
    Top,
}

#[derive(Debug)]
pub struct FeedPager {
    items:       Vec<FeedItem>,
    current:     usize,
    last_scroll: Option<ScrollAnchor>,
    pub status:  String,
}

impl Default for FeedPager {
    fn default() -> Self { FeedPager::new(FEED_ITEMS.to_vec()) }
}

impl FeedPager {
    pub fn new(items: Vec<FeedItem>) -> Self {
        let status = match items.first() {
            Some(first) => format!("page 1/{} ({})", items.len(), first.name),
            None        => "empty feed".to_string(),
        };
        FeedPager { items, current: 0, last_scroll: None, status }
    }

    pub fn current_item(&self) -> Option<&FeedItem>    { self.items.get(self.current) }
    pub fn last_scroll(&self)  -> Option<ScrollAnchor> { self.last_scroll }

    fn scroll_to(&mut self, index: usize, anchor: ScrollAnchor) {
        let item = match self.items.get(index) {
            Some(item) => *item,
            None => {
                warn!(index, count = self.items.len(), "page out of range, ignoring");
                return;
            }
        };
        self.current     = index;
        self.last_scroll = Some(anchor);
        self.status = format!("page {}/{} ({})", index + 1, self.items.len(), item.name);
        info!("{}", self.status);
    }
}

impl NavigationSink for FeedPager {
    fn current_index(&self) -> usize { self.current }
    fn item_count(&self)    -> usize { self.items.len() }

    fn navigate(&mut self, decision: PageChangeDecision) {
        match decision {
            PageChangeDecision::NoChange   => {}
            PageChangeDecision::Advance(i) => self.scroll_to(i, ScrollAnchor::Bottom),
            PageChangeDecision::Retreat(i) => self.scroll_to(i, ScrollAnchor::Top),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
