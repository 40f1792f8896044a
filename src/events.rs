//! Event bus.
//!
//! MONICA's C++ core passes `std::function<void(std::string)>` callbacks
//! into `CropModule`/`MonicaModel`. This rewrite passes an [`EventSink`]
//! closure into `step` instead of storing a callback on the struct, so
//! there is no global event state and no lifetime entanglement between
//! the orchestrator and the crop.

/// A sink that daily steps push event tags into. Implemented for any
/// `FnMut(&str)`, so callers can pass a closure capturing a `Vec<String>`,
/// a channel sender, or a no-op.
pub trait EventSink {
    fn fire_event(&mut self, tag: &str);
}

impl<F: FnMut(&str)> EventSink for F {
    fn fire_event(&mut self, tag: &str) {
        self(tag)
    }
}

/// Event tags emitted by the core, collected here so callers don't have to
/// guess string spelling.
pub mod tags {
    pub const EMERGENCE: &str = "emergence";
    pub const ANTHESIS: &str = "anthesis";
    pub const MATURITY: &str = "maturity";
    pub const CEREAL_STEM_ELONGATION: &str = "cereal-stem-elongation";
    pub const SOWING: &str = "Sowing";
    pub const HARVEST: &str = "Harvest";
    pub const CUTTING: &str = "Cutting";
    pub const IRRIGATION: &str = "Irrigation";
    pub const MINERAL_FERTILIZATION: &str = "MineralFertilization";
    pub const ORGANIC_FERTILIZATION: &str = "OrganicFertilization";
    pub const TILLAGE: &str = "Tillage";

    /// `"Stage-1"` .. `"Stage-N"` as used for every developmental-stage
    /// transition (stage 0, pre-emergence, never fires a stage tag of its
    /// own — the first tag fired is `Stage-1` on the 0→1 transition).
    pub fn stage(n: usize) -> String {
        format!("Stage-{n}")
    }
}

/// A ring of the current and previous day's fired event tags, matching the
/// C++ `_currentEvents` / `_previousDaysEvents` swap-at-day-boundary
/// pattern.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    current: Vec<String>,
    previous: Vec<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: impl Into<String>) {
        self.current.push(tag.into());
    }

    /// Tags fired so far today.
    pub fn current_events(&self) -> &[String] {
        &self.current
    }

    /// Tags fired on the previous simulated day.
    pub fn previous_days_events(&self) -> &[String] {
        &self.previous
    }

    /// Swaps `current` into `previous` and clears `current`; called once at
    /// the top of each new day, before any module runs.
    pub fn advance_day(&mut self) {
        self.previous.clear();
        std::mem::swap(&mut self.previous, &mut self.current);
    }
}

impl EventSink for EventLog {
    fn fire_event(&mut self, tag: &str) {
        self.push(tag);
    }
}

impl EventSink for &mut EventLog {
    fn fire_event(&mut self, tag: &str) {
        (**self).fire_event(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_implements_event_sink() {
        let mut collected = Vec::new();
        let mut sink = |tag: &str| collected.push(tag.to_string());
        sink.fire_event(tags::EMERGENCE);
        assert_eq!(collected, vec!["emergence".to_string()]);
    }

    #[test]
    fn event_log_advance_day_moves_current_to_previous() {
        let mut log = EventLog::new();
        log.push(tags::SOWING);
        log.advance_day();
        assert_eq!(log.previous_days_events(), &["Sowing".to_string()]);
        assert!(log.current_events().is_empty());
    }

    #[test]
    fn stage_tag_formats_with_index() {
        assert_eq!(tags::stage(3), "Stage-3");
    }
}
