//! Search session state and its translation into catalog search parameters.

use std::{fmt, num::IntErrorKind, str::FromStr};

use shared::domain::{CategoryTag, Stat, StatBlock, UnknownName};

pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Id,
    Name,
    Stat(Stat),
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Id,
        SortKey::Name,
        SortKey::Stat(Stat::Hp),
        SortKey::Stat(Stat::Attack),
        SortKey::Stat(Stat::Defense),
        SortKey::Stat(Stat::SpecialAttack),
        SortKey::Stat(Stat::SpecialDefense),
        SortKey::Stat(Stat::Speed),
    ];

    /// Direction picked the first time this key is selected: text-like keys
    /// sort ascending, stats descending.
    pub fn default_ascending(self) -> bool {
        !matches!(self, SortKey::Stat(_))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Stat(stat) => stat.display_name(),
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Stat(stat) => stat.wire_name(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SortKey {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "name" => Ok(SortKey::Name),
            _ => s.parse::<Stat>().map(SortKey::Stat).map_err(|_| UnknownName {
                kind: "sort key",
                value: s.to_string(),
            }),
        }
    }
}

/// Coerces raw numeric input into a stat minimum: non-numeric text becomes
/// 0 and negative values clamp to 0.
pub fn parse_stat_input(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let digits_end = trimmed
        .char_indices()
        .find(|(idx, ch)| !(ch.is_ascii_digit() || (*idx == 0 && (*ch == '-' || *ch == '+'))))
        .map(|(idx, _)| idx)
        .unwrap_or(trimmed.len());
    match trimmed[..digits_end].parse::<i64>() {
        Ok(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => u32::MAX,
        _ => 0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    text_query: String,
    type_filters: Vec<CategoryTag>,
    minimum_stats: StatBlock,
    exclude_restricted: bool,
    sort_key: SortKey,
    sort_ascending: bool,
    page: u32,
    page_size: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            text_query: String::new(),
            type_filters: Vec::new(),
            minimum_stats: StatBlock::default(),
            exclude_restricted: false,
            sort_key: SortKey::Id,
            sort_ascending: true,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn text_query(&self) -> &str {
        &self.text_query
    }

    pub fn type_filters(&self) -> &[CategoryTag] {
        &self.type_filters
    }

    pub fn minimum_stats(&self) -> &StatBlock {
        &self.minimum_stats
    }

    pub fn minimum(&self, stat: Stat) -> u32 {
        self.minimum_stats.get(stat)
    }

    pub fn exclude_restricted(&self) -> bool {
        self.exclude_restricted
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_ascending(&self) -> bool {
        self.sort_ascending
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn set_text_query(&mut self, text: &str) {
        self.text_query = text.trim().to_string();
        self.page = 1;
    }

    pub fn toggle_type_filter(&mut self, tag: CategoryTag) {
        if let Some(pos) = self.type_filters.iter().position(|t| *t == tag) {
            self.type_filters.remove(pos);
        } else {
            self.type_filters.push(tag);
        }
        self.page = 1;
    }

    pub fn clear_type_filters(&mut self) {
        self.type_filters.clear();
        self.page = 1;
    }

    pub fn set_minimum_stat(&mut self, stat: Stat, input: &str) {
        self.minimum_stats.set(stat, parse_stat_input(input));
        self.page = 1;
    }

    pub fn set_exclude_restricted(&mut self, flag: bool) {
        self.exclude_restricted = flag;
        self.page = 1;
    }

    pub fn set_sort(&mut self, key: SortKey) {
        if key == self.sort_key {
            self.sort_ascending = !self.sort_ascending;
        } else {
            self.sort_key = key;
            self.sort_ascending = key.default_ascending();
        }
        self.page = 1;
    }

    /// Moves to page `n`, clamped to `1..=total_pages` when the page count
    /// is known. Returns the page actually selected.
    pub fn set_page(&mut self, n: u32, total_pages: Option<u32>) -> u32 {
        let mut page = n.max(1);
        if let Some(total_pages) = total_pages.filter(|total| *total > 0) {
            page = page.min(total_pages);
        }
        self.page = page;
        page
    }

    /// True when both states ask for the same result set, ignoring which
    /// page is selected.
    pub fn same_query(&self, other: &QueryState) -> bool {
        self.text_query == other.text_query
            && self.type_filters == other.type_filters
            && self.minimum_stats == other.minimum_stats
            && self.exclude_restricted == other.exclude_restricted
            && self.sort_key == other.sort_key
            && self.sort_ascending == other.sort_ascending
            && self.page_size == other.page_size
    }

    /// Restores every field to its default; page size is kept for the
    /// lifetime of the session.
    pub fn reset(&mut self) {
        *self = Self::new(self.page_size);
    }
}

/// Query parameters for the catalog search endpoint, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Serializes a query state into catalog search parameters.
///
/// Zero minimums and an unset restricted flag are omitted; the service
/// treats absent and zero/false the same way.
pub fn build_request(state: &QueryState) -> SearchParams {
    let mut params = SearchParams::default();

    if !state.text_query.is_empty() {
        params.push("q", &state.text_query);
    }

    for tag in &state.type_filters {
        params.push("types", tag.as_str());
    }

    for (stat, minimum) in state.minimum_stats.iter() {
        if minimum > 0 {
            params.push(format!("{}_min", stat.wire_name()), minimum);
        }
    }

    if state.exclude_restricted {
        params.push("exclude_banned", true);
    }

    params.push("stat", state.sort_key.wire_name());
    params.push("order", if state.sort_ascending { "asc" } else { "desc" });
    params.push("limit", state.page_size);
    params.push("offset", state.offset());

    params
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
