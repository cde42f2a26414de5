//! Filtered, paginated list state for one entity kind.

use std::marker::PhantomData;

use crate::models::CurrentUser;
use crate::search::{paginate, FilterState, Page};
use crate::store::{Portal, PortalEntity};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound for a requested page size.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoKey {
    revision: i64,
    filter: FilterState,
    user: CurrentUser,
}

#[derive(Debug, Clone)]
struct Memo {
    key: MemoKey,
    ids: Vec<String>,
}

/// Search term, facets and page position of one list, with the derived
/// visible set memoized until the portal revision, the filter or the viewer
/// changes.
#[derive(Debug, Clone)]
pub struct ListView<E: PortalEntity> {
    filter: FilterState,
    page: usize,
    page_size: usize,
    max_page_size: usize,
    memo: Option<Memo>,
    derivations: u64,
    _kind: PhantomData<E>,
}

impl<E: PortalEntity> Default for ListView<E> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

impl<E: PortalEntity> ListView<E> {
    pub fn new(page_size: usize, max_page_size: usize) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            filter: FilterState::default(),
            page: 1,
            page_size: page_size.clamp(1, max_page_size),
            max_page_size,
            memo: None,
            derivations: 0,
            _kind: PhantomData,
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// How many times the visible set has been recomputed.
    pub fn derivations(&self) -> u64 {
        self.derivations
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.filter.search_term {
            self.filter.search_term = term;
            self.page = 1;
        }
    }

    pub fn set_facet(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        if self.filter.facets.get(&name) != Some(&value) {
            self.filter.facets.insert(name, value);
            self.page = 1;
        }
    }

    pub fn clear_facet(&mut self, name: &str) {
        if self.filter.facets.remove(name).is_some() {
            self.page = 1;
        }
    }

    /// Replace the whole filter, resetting the page if anything changed.
    pub fn set_filter(&mut self, filter: FilterState) {
        if filter != self.filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.clamp(1, self.max_page_size);
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page = 1;
        }
    }

    /// Request a page. Clamped into range when the view is derived.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// The current page of records visible to `user`.
    pub fn view(&mut self, portal: &Portal, user: &CurrentUser) -> Page<E> {
        let key = MemoKey {
            revision: portal.revision(),
            filter: self.filter.clone(),
            user: user.clone(),
        };

        let ids = match self.memo.take() {
            Some(memo) if memo.key == key => memo.ids,
            previous => {
                if previous.is_some_and(|m| m.key.user != key.user) {
                    self.page = 1;
                }
                self.derivations += 1;
                let ids: Vec<String> = portal
                    .query::<E>(user, &self.filter)
                    .into_iter()
                    .map(|r| r.id().to_string())
                    .collect();
                tracing::trace!(kind = ?E::KIND, matched = ids.len(), "list view derived");
                ids
            }
        };

        let slice = paginate(ids.iter().collect::<Vec<_>>(), self.page, self.page_size);
        self.page = slice.current_page;
        let store = portal.store::<E>();
        let page = Page {
            items: slice.items.iter().filter_map(|id| store.get(id).cloned()).collect(),
            current_page: slice.current_page,
            total_pages: slice.total_pages,
            total_items: slice.total_items,
            page_size: slice.page_size,
        };

        self.memo = Some(Memo { key, ids });
        page
    }
}
