/// A participant's point total annotated with its resolved rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub user_id: String,
    pub points: i64,
    pub rank: u32,
}

/// Standard competition ranking over point totals, high score first.
///
/// Tied values share the higher rank; the next distinct value's rank is
/// 1 + the number of strictly greater entries, so two players tied for
/// first are both rank 1 and the next player is rank 3. Output order
/// matches the input order. Empty input yields empty output.
pub fn assign_ranks(totals: &[(String, i64)]) -> Vec<RankedEntry> {
    totals
        .iter()
        .map(|(user_id, points)| {
            let higher = totals.iter().filter(|(_, other)| other > points).count();
            RankedEntry {
                user_id: user_id.clone(),
                points: *points,
                rank: higher as u32 + 1,
            }
        })
        .collect()
}
