use std::ops::RangeInclusive;

pub const DEFAULT_WINDOW_SIZE: u32 = 8;

pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Page numbers to show around `page`. `None` when there is at most one
/// page and no controls should be rendered.
pub fn page_window(page: u32, total_pages: u32, window_size: u32) -> Option<RangeInclusive<u32>> {
    if total_pages <= 1 {
        return None;
    }
    let window_size = window_size.max(1);
    if total_pages <= window_size {
        return Some(1..=total_pages);
    }

    let before = window_size / 2;
    let after = window_size.div_ceil(2) - 1;

    let window = if page <= before {
        1..=window_size
    } else if page.saturating_add(after) >= total_pages {
        (total_pages - window_size + 1)..=total_pages
    } else {
        (page - before)..=(page + after)
    };
    Some(window)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current: u32,
    pub total_pages: u32,
    pub pages: RangeInclusive<u32>,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl PaginationView {
    pub fn build(page: u32, total_pages: u32, window_size: u32) -> Option<Self> {
        let pages = page_window(page, total_pages, window_size)?;
        Some(Self {
            current: page,
            total_pages,
            pages,
            previous_enabled: page != 1,
            next_enabled: page < total_pages,
        })
    }
}

/// 1-based `(first, last)` positions of the shown rows within the full
/// result set, for "showing 51-100 of 1025" style labels.
pub fn showing_range(page: u32, page_size: u32, shown: usize, total_count: u64) -> Option<(u64, u64)> {
    if total_count == 0 || shown == 0 {
        return None;
    }
    let start = u64::from(page.max(1) - 1) * u64::from(page_size) + 1;
    let end = (start + shown as u64 - 1).min(total_count);
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn few_pages_show_everything() {
        assert_eq!(page_window(2, 3, 8), Some(1..=3));
        assert_eq!(page_window(1, 8, 8), Some(1..=8));
    }

    #[test]
    fn single_page_has_no_controls() {
        assert_eq!(page_window(1, 1, 8), None);
        assert_eq!(page_window(1, 0, 8), None);
        assert!(PaginationView::build(1, 1, 8).is_none());
    }

    #[test]
    fn window_pins_to_start_and_end() {
        assert_eq!(page_window(1, 20, 8), Some(1..=8));
        assert_eq!(page_window(4, 20, 8), Some(1..=8));
        assert_eq!(page_window(20, 20, 8), Some(13..=20));
        assert_eq!(page_window(17, 20, 8), Some(13..=20));
    }

    #[test]
    fn window_centers_on_middle_pages() {
        assert_eq!(page_window(10, 20, 8), Some(6..=13));
        assert_eq!(page_window(5, 20, 8), Some(1..=8));
        assert_eq!(page_window(16, 20, 8), Some(12..=19));
    }

    #[test]
    fn odd_window_sizes_split_evenly() {
        assert_eq!(page_window(10, 20, 5), Some(8..=12));
    }

    #[test]
    fn previous_and_next_disable_at_edges() {
        let first = PaginationView::build(1, 21, 8).expect("view");
        assert!(!first.previous_enabled);
        assert!(first.next_enabled);

        let last = PaginationView::build(21, 21, 8).expect("view");
        assert!(last.previous_enabled);
        assert!(!last.next_enabled);
        assert_eq!(last.pages, 14..=21);
    }

    #[test]
    fn page_past_the_end_has_no_next() {
        let beyond = PaginationView::build(25, 21, 8).expect("view");
        assert!(!beyond.next_enabled);
        assert!(beyond.previous_enabled);
        assert_eq!(beyond.pages, 14..=21);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(1025, 50), 21);
    }

    #[test]
    fn showing_range_clips_to_total() {
        assert_eq!(showing_range(1, 50, 50, 1025), Some((1, 50)));
        assert_eq!(showing_range(21, 50, 25, 1025), Some((1001, 1025)));
        assert_eq!(showing_range(1, 50, 0, 0), None);
    }
}
