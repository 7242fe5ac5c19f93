//! Tests for pagination module

use super::*;

// ============================================================================
// NextPage Tests
// ============================================================================

#[test]
fn test_next_page_continue() {
    let next = NextPage::Continue {
        page: PageRequest::new(2, 50),
    };
    assert!(next.is_continue());
    assert!(!next.is_done());
}

#[test]
fn test_next_page_done() {
    let next = NextPage::Done;
    assert!(next.is_done());
    assert!(!next.is_continue());
}

// ============================================================================
// PaginationState Tests
// ============================================================================

#[test]
fn test_pagination_state_default() {
    let state = PaginationState::new();
    assert_eq!(state.page, 0);
    assert_eq!(state.total_fetched, 0);
    assert!(!state.done);
}

#[test]
fn test_pagination_state_advances() {
    let mut state = PaginationState::new();
    state.next_page();
    state.add_fetched(10);
    assert_eq!(state.page, 1);
    assert_eq!(state.total_fetched, 10);
}

// ============================================================================
// PageNumberPaginator Tests
// ============================================================================

#[test]
fn test_default_first_page() {
    assert_eq!(PageRequest::default(), PageRequest::new(1, DEFAULT_PAGE_SIZE));
}

#[test]
fn test_full_page_continues_when_returning_all() {
    let paginator = PageNumberPaginator::all();
    let mut state = PaginationState::new();

    assert_eq!(paginator.initial_page(&mut state), PageRequest::new(1, 50));

    let next = paginator.process_response(50, &mut state);
    assert_eq!(
        next,
        NextPage::Continue {
            page: PageRequest::new(2, 50)
        }
    );
    assert!(!state.done);
}

#[test]
fn test_short_page_stops() {
    let paginator = PageNumberPaginator::all();
    let mut state = PaginationState::new();
    paginator.initial_page(&mut state);

    paginator.process_response(50, &mut state);
    let next = paginator.process_response(12, &mut state);

    assert!(next.is_done());
    assert!(state.done);
    assert_eq!(state.total_fetched, 62);
}

#[test]
fn test_limited_reads_one_page() {
    let paginator = PageNumberPaginator::limited(10);
    let mut state = PaginationState::new();

    assert_eq!(paginator.initial_page(&mut state), PageRequest::new(1, 10));
    // A full page does not trigger another request without return_all
    assert!(paginator.process_response(10, &mut state).is_done());
}

#[test]
fn test_empty_page_stops() {
    let paginator = PageNumberPaginator::all();
    let mut state = PaginationState::new();

    assert_eq!(paginator.initial_page(&mut state).page, 1);
    assert!(paginator.process_response(0, &mut state).is_done());
}
