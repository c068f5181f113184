use chrono::Utc;

/// Time-based grant ids: the current Unix time in milliseconds, bumped past
/// the last id handed out so two adds in the same millisecond never collide.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Continue after the largest numeric id already in use.
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a str>) -> Self {
        let last = existing
            .into_iter()
            .filter_map(|id| id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        IdGenerator { last }
    }

    pub fn next_id(&mut self) -> String {
        let id = Utc::now().timestamp_millis().max(self.last + 1);
        self.last = id;
        id.to_string()
    }
}
