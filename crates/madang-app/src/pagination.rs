// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const MAX_BUTTONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page { number: u32, current: bool },
    Ellipsis,
}

impl PageItem {
    /// The current page's button is disabled; ellipses are never clickable.
    pub fn target(self) -> Option<u32> {
        match self {
            Self::Page {
                number,
                current: false,
            } => Some(number),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavButton {
    pub target: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub first: NavButton,
    pub prev: NavButton,
    pub next: NavButton,
    pub last: NavButton,
    pub items: Vec<PageItem>,
}

/// The run of numbered buttons around `page`, at most `MAX_BUTTONS` wide.
pub fn page_window(page: u32, total_pages: u32) -> (u32, u32) {
    let total_pages = total_pages.max(1);
    let page = page.clamp(1, total_pages);
    let mut start = page.saturating_sub(MAX_BUTTONS / 2).max(1);
    let end = (start + MAX_BUTTONS - 1).min(total_pages);
    if end - start + 1 < MAX_BUTTONS {
        start = (end + 1).saturating_sub(MAX_BUTTONS).max(1);
    }
    (start, end)
}

pub fn page_items(page: u32, total_pages: u32) -> Vec<PageItem> {
    let total_pages = total_pages.max(1);
    let page = page.clamp(1, total_pages);
    let (start, end) = page_window(page, total_pages);
    let button = |number| PageItem::Page {
        number,
        current: number == page,
    };

    let mut items = Vec::with_capacity(MAX_BUTTONS as usize + 4);
    if start > 1 {
        items.push(button(1));
        if start > 2 {
            items.push(PageItem::Ellipsis);
        }
    }
    items.extend((start..=end).map(button));
    if end < total_pages {
        if end + 1 < total_pages {
            items.push(PageItem::Ellipsis);
        }
        items.push(button(total_pages));
    }
    items
}

impl PaginationView {
    pub fn new(page: u32, total_pages: u32, total_items: u64) -> Self {
        let total_pages = total_pages.max(1);
        let page = page.clamp(1, total_pages);
        let at_start = page == 1;
        let at_end = page == total_pages;
        Self {
            page,
            total_pages,
            total_items,
            first: NavButton {
                target: 1,
                enabled: !at_start,
            },
            prev: NavButton {
                target: page.saturating_sub(1).max(1),
                enabled: !at_start,
            },
            next: NavButton {
                target: (page + 1).min(total_pages),
                enabled: !at_end,
            },
            last: NavButton {
                target: total_pages,
                enabled: !at_end,
            },
            items: page_items(page, total_pages),
        }
    }

    pub fn page_info(&self) -> String {
        format!("page {} of {}", self.page, self.total_pages)
    }

    pub fn items_info(&self) -> String {
        format!("{} total", self.total_items)
    }

    /// Clickable page numbers in strip order, used for numeric shortcuts.
    pub fn targets(&self) -> Vec<u32> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PageItem::Page { number, .. } => Some(*number),
                PageItem::Ellipsis => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{PageItem, PaginationView, page_items, page_window};

    fn render(items: &[PageItem]) -> String {
        items
            .iter()
            .map(|item| match item {
                PageItem::Page {
                    number,
                    current: true,
                } => format!("[{number}]"),
                PageItem::Page { number, .. } => number.to_string(),
                PageItem::Ellipsis => "…".to_owned(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn middle_page_has_both_ellipses() {
        assert_eq!(page_window(7, 20), (5, 9));
        assert_eq!(render(&page_items(7, 20)), "1 … 5 6 [7] 8 9 … 20");
    }

    #[test]
    fn window_shifts_at_the_edges() {
        assert_eq!(page_window(1, 20), (1, 5));
        assert_eq!(render(&page_items(1, 20)), "[1] 2 3 4 5 … 20");
        assert_eq!(page_window(20, 20), (16, 20));
        assert_eq!(render(&page_items(20, 20)), "1 … 16 17 18 19 [20]");
        assert_eq!(page_window(19, 20), (16, 20));
    }

    #[test]
    fn no_ellipsis_when_adjacent() {
        assert_eq!(render(&page_items(4, 7)), "1 2 3 [4] 5 6 7");
        assert_eq!(render(&page_items(3, 6)), "1 2 [3] 4 5 6");
    }

    #[test]
    fn few_pages_show_everything() {
        assert_eq!(render(&page_items(1, 1)), "[1]");
        assert_eq!(render(&page_items(2, 3)), "1 [2] 3");
    }

    #[test]
    fn nav_buttons_disable_at_bounds() {
        let first = PaginationView::new(1, 5, 47);
        assert!(!first.first.enabled);
        assert!(!first.prev.enabled);
        assert!(first.next.enabled);
        assert_eq!(first.next.target, 2);

        let last = PaginationView::new(5, 5, 47);
        assert!(last.prev.enabled);
        assert_eq!(last.prev.target, 4);
        assert!(!last.next.enabled);
        assert!(!last.last.enabled);

        let single = PaginationView::new(1, 1, 3);
        assert!(!single.first.enabled && !single.next.enabled);
    }

    #[test]
    fn current_page_is_not_a_target() {
        let view = PaginationView::new(3, 10, 95);
        let current = view
            .items
            .iter()
            .find(|item| matches!(item, PageItem::Page { current: true, .. }))
            .copied()
            .expect("current page is in the strip");
        assert_eq!(current.target(), None);
        assert_eq!(PageItem::Ellipsis.target(), None);
        assert_eq!(view.page_info(), "page 3 of 10");
        assert_eq!(view.items_info(), "95 total");
        assert_eq!(view.targets(), vec![1, 2, 3, 4, 5, 10]);
    }
}
