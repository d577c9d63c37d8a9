//! Page index arithmetic. `None` means "no page selected" and only ever
//! appears together with an empty page list.

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NavAction {
    First,
    Previous,
    GoTo,
    Next,
    Last,
}

/// Control order, left to right.
pub fn layout(first_last: bool, go_to: bool) -> Vec<NavAction> {
    let mut actions = Vec::with_capacity(5);

    if first_last {
        actions.push(NavAction::First);
    }
    actions.push(NavAction::Previous);
    if go_to {
        actions.push(NavAction::GoTo);
    }
    actions.push(NavAction::Next);
    if first_last {
        actions.push(NavAction::Last);
    }

    actions
}

pub fn clamp(requested: usize, len: usize) -> Option<usize> {
    (len > 0).then(|| requested.min(len - 1))
}

/// Index after the page list was replaced by one of length `len`.
pub fn refit(index: Option<usize>, len: usize) -> Option<usize> {
    clamp(index.unwrap_or(0), len)
}

/// Index after pressing `action`. [`NavAction::GoTo`] does not move.
pub fn step(index: Option<usize>, len: usize, action: NavAction, overflow: bool) -> Option<usize> {
    let current = refit(index, len)?;
    let last = len - 1;

    let next = match action {
        NavAction::First => 0,
        NavAction::Last => last,
        NavAction::GoTo => current,
        NavAction::Previous if current == 0 => {
            if overflow {
                last
            } else {
                0
            }
        }
        NavAction::Previous => current - 1,
        NavAction::Next if current == last => {
            if overflow {
                0
            } else {
                last
            }
        }
        NavAction::Next => current + 1,
    };

    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_variants() {
        use NavAction::*;

        assert_eq!(layout(true, true), vec![First, Previous, GoTo, Next, Last]);
        assert_eq!(layout(false, true), vec![Previous, GoTo, Next]);
        assert_eq!(layout(true, false), vec![First, Previous, Next, Last]);
        assert_eq!(layout(false, false), vec![Previous, Next]);
    }

    #[test]
    fn test_next_wraps_with_overflow() {
        let visited: Vec<_> = std::iter::successors(Some(Some(0)), |i| {
            Some(step(*i, 3, NavAction::Next, true))
        })
        .skip(1)
        .take(3)
        .collect();

        assert_eq!(visited, vec![Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn test_previous_wraps_with_overflow() {
        assert_eq!(step(Some(0), 4, NavAction::Previous, true), Some(3));
        assert_eq!(step(Some(3), 4, NavAction::Previous, true), Some(2));
    }

    #[test]
    fn test_boundaries_hold_without_overflow() {
        assert_eq!(step(Some(2), 3, NavAction::Next, false), Some(2));
        assert_eq!(step(Some(0), 3, NavAction::Previous, false), Some(0));
    }

    #[test]
    fn test_first_last_and_go_to() {
        assert_eq!(step(Some(1), 5, NavAction::First, true), Some(0));
        assert_eq!(step(Some(1), 5, NavAction::Last, true), Some(4));
        assert_eq!(step(Some(1), 5, NavAction::GoTo, true), Some(1));
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        for action in layout(true, true) {
            assert_eq!(step(None, 0, action, true), None);
            assert_eq!(step(Some(3), 0, action, false), None);
        }
        assert_eq!(clamp(10, 0), None);
    }

    #[test]
    fn test_refit_clamps_to_new_length() {
        assert_eq!(refit(Some(7), 3), Some(2));
        assert_eq!(refit(Some(1), 3), Some(1));
        assert_eq!(refit(None, 3), Some(0));
        assert_eq!(refit(Some(1), 0), None);
    }
}
