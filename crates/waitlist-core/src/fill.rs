//! Last-known-value propagation within a bounded window of rows.
//!
//! The window is whatever slice the caller passes in (one patient, one
//! episode); values never cross it.

/// Fill each missing slot from the nearest earlier known value, when
/// `accept(index, candidate)` allows it.
///
/// A rejected slot stays missing; the candidate remains the last known value
/// for the slots after it.
pub fn fill_forward_where<T, F>(values: &[Option<T>], accept: F) -> Vec<Option<T>>
where
    T: Clone,
    F: Fn(usize, &T) -> bool,
{
    values
        .iter()
        .enumerate()
        .scan(None::<T>, |last, (idx, value)| {
            Some(propagate(last, idx, value.as_ref(), &accept))
        })
        .collect()
}

/// Fill each missing slot from the nearest later known value, when
/// `accept(index, candidate)` allows it.
pub fn fill_backward_where<T, F>(values: &[Option<T>], accept: F) -> Vec<Option<T>>
where
    T: Clone,
    F: Fn(usize, &T) -> bool,
{
    let mut filled: Vec<Option<T>> = values
        .iter()
        .enumerate()
        .rev()
        .scan(None::<T>, |last, (idx, value)| {
            Some(propagate(last, idx, value.as_ref(), &accept))
        })
        .collect();
    filled.reverse();
    filled
}

/// Fill each missing slot from the nearest later known value.
pub fn fill_backward<T: Clone>(values: &[Option<T>]) -> Vec<Option<T>> {
    fill_backward_where(values, |_, _| true)
}

fn propagate<T, F>(last: &mut Option<T>, idx: usize, value: Option<&T>, accept: &F) -> Option<T>
where
    T: Clone,
    F: Fn(usize, &T) -> bool,
{
    match value {
        Some(value) => {
            *last = Some(value.clone());
            Some(value.clone())
        }
        None => last
            .as_ref()
            .filter(|candidate| accept(idx, candidate))
            .cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backward_fill_takes_nearest_later_value() {
        let values = vec![None, Some(1), None, None, Some(4), None];
        assert_eq!(
            fill_backward(&values),
            vec![Some(1), Some(1), Some(4), Some(4), Some(4), None]
        );
    }

    #[test]
    fn forward_fill_respects_predicate_without_forgetting_value() {
        let values = vec![Some(10), None, None, Some(20), None];
        let filled = fill_forward_where(&values, |idx, _| idx != 1);
        assert_eq!(filled, vec![Some(10), None, Some(10), Some(20), Some(20)]);
    }

    #[test]
    fn empty_window_stays_empty() {
        let values: Vec<Option<u8>> = Vec::new();
        assert!(fill_backward(&values).is_empty());
        assert!(fill_forward_where(&values, |_, _| true).is_empty());
    }
}
