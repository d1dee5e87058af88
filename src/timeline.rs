use crate::data::{Timeline, TimelineCategory, TimelineEvent};

impl Timeline {
    /// Events ordered by year; events sharing a year keep fixture order.
    pub fn chronological(&self) -> Vec<&TimelineEvent> {
        let mut events: Vec<&TimelineEvent> = self.events.iter().collect();
        events.sort_by_key(|e| e.year);
        events
    }

    pub fn events_in_category(&self, category: TimelineCategory) -> Vec<&TimelineEvent> {
        self.chronological()
            .into_iter()
            .filter(|e| e.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: u32, year: i32, category: TimelineCategory) -> TimelineEvent {
        TimelineEvent {
            id,
            year,
            title: format!("event {id}"),
            description: String::new(),
            category,
            location: String::new(),
            significance: String::new(),
            achievements: vec![],
        }
    }

    #[test]
    fn test_chronological_is_stable() {
        let timeline = Timeline {
            events: vec![
                event(1, 2005, TimelineCategory::Expansion),
                event(2, 1950, TimelineCategory::Foundation),
                event(3, 2005, TimelineCategory::Growth),
            ],
        };

        let ids: Vec<u32> = timeline.chronological().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_events_in_category() {
        let fixtures = crate::Fixtures::embedded().unwrap();
        let legacy = fixtures.timeline().events_in_category(TimelineCategory::Legacy);

        assert_eq!(legacy.len(), 1);
        assert_eq!(legacy[0].year, 2023);
    }
}
