/// Step the selection one item back, wrapping from the first to the last.
pub fn select_prev(selected: usize, item_count: usize) -> usize {
    if item_count == 0 {
        return 0;
    }
    (selected % item_count + item_count - 1) % item_count
}

/// Step the selection one item forward, wrapping from the last to the first.
pub fn select_next(selected: usize, item_count: usize) -> usize {
    if item_count == 0 {
        return 0;
    }
    (selected % item_count + 1) % item_count
}
