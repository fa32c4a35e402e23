//! Inert page content and its row layout.
//!
//! The page is a fixed list of sections; only their placement depends on
//! the terminal size.  Layout is measured in document rows from the top of
//! the page, and the same wrapping routine is used for measuring and for
//! drawing so the two never disagree.

/// Identity of an element the reveal tracker follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Section(usize),
    /// Index into the flattened list of all cards on the page.
    Card(usize),
}

#[derive(Debug)]
pub struct Card {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub body: &'static str,
}

#[derive(Debug)]
pub struct Section {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static [&'static str],
    pub cards: &'static [Card],
}

pub const SECTIONS: &[Section] = &[
    Section {
        id: "home",
        title: "Hello, I build interactive things.",
        body: &["Move the mouse to leave a trail. Scroll to explore."],
        cards: &[],
    },
    Section {
        id: "about",
        title: "About",
        body: &[
            "Engineer working on real-time interfaces, rendering pipelines and the \
             small details that make a page feel alive.",
            "Most days are spent between profilers and pixel grids.",
        ],
        cards: &[],
    },
    Section {
        id: "skills",
        title: "Skills",
        body: &[
            "Rust, TypeScript, WebGL, terminal UIs, animation systems, \
             performance tuning, accessibility.",
        ],
        cards: &[],
    },
    Section {
        id: "experience",
        title: "Experience",
        body: &["Where the time went."],
        cards: &[
            Card {
                title: "Interaction Engineer",
                subtitle: "Studio North · 2021 - now",
                body: "Built the motion layer for a design system used across \
                       dozens of products, with a frame budget of a few \
                       milliseconds per interaction.",
            },
            Card {
                title: "Frontend Developer",
                subtitle: "Brightline Labs · 2018 - 2021",
                body: "Shipped data-heavy dashboards and rewrote the charting \
                       stack to render incrementally.",
            },
        ],
    },
    Section {
        id: "projects",
        title: "Projects",
        body: &[
            "glowtrail: the page you are reading, in a terminal.",
            "A handful of small tools for profiling frame pacing.",
        ],
        cards: &[],
    },
    Section {
        id: "contact",
        title: "Contact",
        body: &["Say hello any time. The inbox is always open."],
        cards: &[],
    },
];

/// Index of the section whose scroll progress drives the timeline gradient.
pub const TRACKED_SECTION: usize = 3;

/// Horizontal padding on each side of the page body.
pub const MARGIN_X: u16 = 4;
/// Blank rows between sections.
const SECTION_GAP: u32 = 2;
/// Smallest hero height, for very short terminals.
const MIN_HERO_ROWS: u32 = 6;

/// Placement of one card, in document rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCard {
    /// Index into the page-wide card list.
    pub index: usize,
    pub top: u32,
    pub height: u32,
    /// Wrapped body lines, ready to draw.
    pub lines: Vec<String>,
}

/// Placement of one section, in document rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSection {
    pub index: usize,
    pub top: u32,
    pub height: u32,
    pub lines: Vec<String>,
    pub cards: Vec<PlacedCard>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub width: u16,
    pub sections: Vec<PlacedSection>,
    pub total_rows: u32,
}

impl PageLayout {
    /// Lay the page out for a body `width` columns wide and a viewport
    /// `viewport_rows` tall.  The first section fills the viewport.
    pub fn compute(width: u16, viewport_rows: u16) -> Self {
        let text_width = text_column(width).1 as usize;
        let card_width = text_width.saturating_sub(4).max(6);

        let mut sections = Vec::with_capacity(SECTIONS.len());
        let mut row = 0u32;
        let mut card_index = 0usize;

        for (index, section) in SECTIONS.iter().enumerate() {
            let lines: Vec<String> = section
                .body
                .iter()
                .flat_map(|p| wrap(p, text_width))
                .collect();

            let top = row;
            // title + blank + body
            let mut height = 2 + lines.len() as u32;

            let mut cards = Vec::with_capacity(section.cards.len());
            for card in section.cards {
                height += 1;
                let card_lines = wrap(card.body, card_width);
                // borders + subtitle + body
                let card_height = 3 + card_lines.len() as u32;
                cards.push(PlacedCard {
                    index: card_index,
                    top: top + height,
                    height: card_height,
                    lines: card_lines,
                });
                height += card_height;
                card_index += 1;
            }

            if index == 0 {
                height = height.max((viewport_rows as u32).max(MIN_HERO_ROWS));
            }

            sections.push(PlacedSection {
                index,
                top,
                height,
                lines,
                cards,
            });
            row = top + height + SECTION_GAP;
        }

        Self {
            width,
            sections,
            total_rows: row,
        }
    }

    /// Document rows `(top, height)` of an element.
    pub fn span(&self, id: ElementId) -> Option<(u32, u32)> {
        match id {
            ElementId::Section(i) => self.sections.get(i).map(|s| (s.top, s.height)),
            ElementId::Card(i) => self
                .cards()
                .find(|c| c.index == i)
                .map(|c| (c.top, c.height)),
        }
    }

    pub fn cards(&self) -> impl Iterator<Item = &PlacedCard> {
        self.sections.iter().flat_map(|s| s.cards.iter())
    }

    /// Every element the reveal tracker should follow.
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.sections
            .iter()
            .map(|s| ElementId::Section(s.index))
            .chain(self.cards().map(|c| ElementId::Card(c.index)))
    }

    /// Largest scroll offset, in rows, for a viewport `viewport_rows` tall.
    pub fn max_scroll(&self, viewport_rows: u16) -> u32 {
        self.total_rows.saturating_sub(viewport_rows as u32)
    }
}

/// Column offset and width of the text column (and of card boxes) for a
/// page `width` columns wide.
pub fn text_column(width: u16) -> (u16, u16) {
    (MARGIN_X, width.saturating_sub(MARGIN_X * 2).max(10))
}

/// Card content by page-wide index.
pub fn card(index: usize) -> Option<&'static Card> {
    SECTIONS.iter().flat_map(|s| s.cards.iter()).nth(index)
}

/// Greedy word wrap.  Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let len = current.chars().count();
        if len > 0 && len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
        assert!(wrap("", 10).is_empty());
        assert_eq!(wrap("abcdefghij12", 5), vec!["abcde", "fghij", "12"]);
    }

    #[test]
    fn hero_fills_viewport_and_sections_stack() {
        let layout = PageLayout::compute(80, 30);
        assert_eq!(layout.sections[0].top, 0);
        assert_eq!(layout.sections[0].height, 30);
        for pair in layout.sections.windows(2) {
            assert_eq!(pair[1].top, pair[0].top + pair[0].height + SECTION_GAP);
        }
        let last = layout.sections.last().unwrap();
        assert_eq!(layout.total_rows, last.top + last.height + SECTION_GAP);
    }

    #[test]
    fn cards_sit_inside_their_section() {
        let layout = PageLayout::compute(60, 20);
        let exp = &layout.sections[TRACKED_SECTION];
        assert_eq!(exp.cards.len(), 2);
        for c in &exp.cards {
            assert!(c.top > exp.top);
            assert!(c.top + c.height <= exp.top + exp.height);
        }
        assert_eq!(layout.span(ElementId::Card(1)), Some((exp.cards[1].top, exp.cards[1].height)));
        assert_eq!(card(1).map(|c| c.title), Some("Frontend Developer"));
    }

    #[test]
    fn narrower_pages_are_taller() {
        let wide = PageLayout::compute(120, 20);
        let narrow = PageLayout::compute(40, 20);
        assert!(narrow.total_rows > wide.total_rows);
        assert_eq!(wide.elements().count(), SECTIONS.len() + 2);
        assert_eq!(wide.max_scroll(20), wide.total_rows - 20);
    }
}
