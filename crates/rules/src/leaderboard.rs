/// Ranks `items` by descending score, breaking ties by original (insertion)
/// order, and returns `(rank, item)` pairs with dense, sequential ranks
/// starting at 1. Ties are *not* assigned the same rank — the stable sort
/// keeps tied items in insertion order and each still gets the next integer.
pub fn rank_leaderboard<T>(items: Vec<T>, score: impl Fn(&T) -> i64) -> Vec<(usize, T)> {
    let mut indexed: Vec<(usize, T)> = items.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| score(b).cmp(&score(a)).then(ia.cmp(ib)));
    indexed
        .into_iter()
        .enumerate()
        .map(|(rank, (_, item))| (rank + 1, item))
        .collect()
}
