use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

const DAYS_IN_WEEK: i64 = 7;

/// One class in the timetable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LessonEntry {
    /// Ordinal of the class within the day ("пара" number)
    pub number: u8,
    /// Start and end, e.g. "08:00-09:30"
    pub time: String,
    pub title: String,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub lecturer: Option<String>,
}

/// Maps a day index to that day's lessons, in order.
pub trait ScheduleResolver: Send + Sync {
    fn resolve_day(&self, day_index: i64) -> Vec<LessonEntry>;
}

#[derive(Debug, Deserialize)]
struct TimetableRow {
    /// 0 = Monday .. 6 = Sunday
    day: u8,
    #[serde(flatten)]
    lesson: LessonEntry,
}

#[derive(Debug, Deserialize)]
struct TimetableFile {
    #[serde(default, rename = "lesson")]
    lessons: Vec<TimetableRow>,
}

/// Weekly timetable loaded from a TOML file of `[[lesson]]` rows.
///
/// Day indices wrap around the week, so asking for "tomorrow" on a Sunday
/// yields Monday's lessons.
#[derive(Debug, Clone)]
pub struct Timetable {
    days: Vec<Vec<LessonEntry>>,
}

impl Timetable {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read timetable: {}", path.display()))?;
        let timetable = Self::parse(&content)
            .with_context(|| format!("Failed to load timetable: {}", path.display()))?;
        info!(
            "Timetable loaded from {}: {} lessons",
            path.display(),
            timetable.days.iter().map(Vec::len).sum::<usize>()
        );
        Ok(timetable)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: TimetableFile = toml::from_str(content).context("Failed to parse timetable")?;

        let mut days = vec![Vec::new(); DAYS_IN_WEEK as usize];
        for row in file.lessons {
            let slot = days.get_mut(row.day as usize).with_context(|| {
                format!(
                    "Lesson '{}' has day {}, expected 0..=6",
                    row.lesson.title, row.day
                )
            })?;
            slot.push(row.lesson);
        }

        Ok(Self { days })
    }
}

impl ScheduleResolver for Timetable {
    fn resolve_day(&self, day_index: i64) -> Vec<LessonEntry> {
        let day = day_index.rem_euclid(DAYS_IN_WEEK) as usize;
        self.days[day].clone()
    }
}

/// Weekday index (Monday = 0) of `now` in the given UTC offset.
pub fn day_index(now: DateTime<Utc>, utc_offset: FixedOffset) -> i64 {
    now.with_timezone(&utc_offset)
        .weekday()
        .num_days_from_monday() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"
        [[lesson]]
        day = 0
        number = 2
        time = "09:40-11:10"
        title = "Математический анализ"
        room = "305"

        [[lesson]]
        day = 0
        number = 1
        time = "08:00-09:30"
        title = "Физика"

        [[lesson]]
        day = 4
        number = 3
        time = "11:20-12:50"
        title = "Программирование"
        room = "412"
        lecturer = "Иванов И. И."
    "#;

    #[test]
    fn test_resolve_preserves_file_order() {
        let timetable = Timetable::parse(SAMPLE).unwrap();
        let monday = timetable.resolve_day(0);
        assert_eq!(monday.len(), 2);
        assert_eq!(monday[0].title, "Математический анализ");
        assert_eq!(monday[1].title, "Физика");
        assert_eq!(monday[1].room, None);
    }

    #[test]
    fn test_resolve_wraps_week() {
        let timetable = Timetable::parse(SAMPLE).unwrap();
        assert_eq!(timetable.resolve_day(7), timetable.resolve_day(0));
        assert_eq!(timetable.resolve_day(-3), timetable.resolve_day(4));
        assert_eq!(
            timetable.resolve_day(4)[0].lecturer.as_deref(),
            Some("Иванов И. И.")
        );
    }

    #[test]
    fn test_empty_day() {
        let timetable = Timetable::parse(SAMPLE).unwrap();
        assert!(timetable.resolve_day(6).is_empty());
        assert!(Timetable::parse("").unwrap().resolve_day(2).is_empty());
    }

    #[test]
    fn test_day_out_of_range_fails() {
        let err = Timetable::parse(
            "[[lesson]]\nday = 7\nnumber = 1\ntime = \"08:00\"\ntitle = \"X\"\n",
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("expected 0..=6"));
    }

    #[test]
    fn test_day_index_uses_offset() {
        // Sunday 20:00 UTC is already Monday 03:00 at UTC+7.
        let now = Utc.with_ymd_and_hms(2026, 1, 18, 20, 0, 0).unwrap();
        assert_eq!(day_index(now, FixedOffset::east_opt(0).unwrap()), 6);
        assert_eq!(day_index(now, FixedOffset::east_opt(7 * 3600).unwrap()), 0);
    }
}
