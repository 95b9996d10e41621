use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use super::repo::{OpeningHour, VacationMode};

const TIME_FMT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");
const DATE_FMT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub(crate) fn format_time(t: Time) -> String {
    t.format(TIME_FMT).unwrap_or_else(|_| t.to_string())
}

pub(crate) fn parse_time(s: &str) -> Option<Time> {
    Time::parse(s, TIME_FMT).ok()
}

pub(crate) fn format_date(d: Date) -> String {
    d.format(DATE_FMT).unwrap_or_else(|_| d.to_string())
}

pub(crate) fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s, DATE_FMT).ok()
}

/// Wire form of one weekday row; times as `HH:MM` strings.
#[derive(Debug, Serialize, Deserialize)]
pub struct HourView {
    pub day_of_week: i16,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    #[serde(default)]
    pub closed: bool,
}

impl From<&OpeningHour> for HourView {
    fn from(row: &OpeningHour) -> Self {
        Self {
            day_of_week: row.day_of_week,
            open_time: row.open_time.map(format_time),
            close_time: row.close_time.map(format_time),
            closed: row.closed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateHoursRequest {
    pub hours: Vec<HourView>,
}

#[derive(Debug, Serialize)]
pub struct VacationView {
    pub active: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub message: String,
    pub currently_away: bool,
}

impl VacationView {
    pub fn from_mode(v: &VacationMode, now: OffsetDateTime) -> Self {
        Self {
            active: v.active,
            start_date: v.start_date.map(format_date),
            end_date: v.end_date.map(format_date),
            message: v.message.clone(),
            currently_away: vacation_currently_away(v, now.date()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateVacationRequest {
    pub active: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HoursResponse {
    pub success: bool,
    pub hours: Vec<HourView>,
    pub vacation: VacationView,
}

/// The closure notice only replaces the hours display while the flag is on
/// and today falls inside the (possibly open-ended) range.
pub(crate) fn vacation_currently_away(v: &VacationMode, today: Date) -> bool {
    if !v.active {
        return false;
    }
    if let Some(start) = v.start_date {
        if today < start {
            return false;
        }
    }
    if let Some(end) = v.end_date {
        if today > end {
            return false;
        }
    }
    true
}

/// A week is exactly the seven days 0..=6, each either closed or fully
/// specified with open before close.
pub(crate) fn validate_week(rows: &[HourView]) -> Result<(), String> {
    if rows.len() != 7 {
        return Err("Exactly seven weekday rows are required".into());
    }
    let mut seen = [false; 7];
    for row in rows {
        let day = row.day_of_week;
        if !(0..=6).contains(&day) {
            return Err(format!("day_of_week {day} out of range"));
        }
        if seen[day as usize] {
            return Err(format!("day_of_week {day} appears twice"));
        }
        seen[day as usize] = true;

        if row.closed {
            continue;
        }
        let (Some(open), Some(close)) = (&row.open_time, &row.close_time) else {
            return Err(format!("day {day} must be closed or have both times"));
        };
        let (Some(open), Some(close)) = (parse_time(open), parse_time(close)) else {
            return Err(format!("day {day} has an invalid HH:MM time"));
        };
        if open >= close {
            return Err(format!("day {day} must open before it closes"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn open_day(day: i16) -> HourView {
        HourView {
            day_of_week: day,
            open_time: Some("11:30".into()),
            close_time: Some("22:00".into()),
            closed: false,
        }
    }

    fn full_week() -> Vec<HourView> {
        (0..7).map(open_day).collect()
    }

    #[test]
    fn time_roundtrip() {
        let t = parse_time("11:30").unwrap();
        assert_eq!(format_time(t), "11:30");
        assert!(parse_time("25:00").is_none());
        assert!(parse_time("noonish").is_none());
    }

    #[test]
    fn date_roundtrip() {
        let d = parse_date("2025-08-01").unwrap();
        assert_eq!(format_date(d), "2025-08-01");
        assert!(parse_date("01.08.2025").is_none());
    }

    #[test]
    fn valid_week_passes() {
        assert!(validate_week(&full_week()).is_ok());
    }

    #[test]
    fn closed_day_needs_no_times() {
        let mut week = full_week();
        week[2] = HourView {
            day_of_week: 2,
            open_time: None,
            close_time: None,
            closed: true,
        };
        assert!(validate_week(&week).is_ok());
    }

    #[test]
    fn open_day_without_times_is_rejected() {
        let mut week = full_week();
        week[3].close_time = None;
        assert!(validate_week(&week).is_err());
    }

    #[test]
    fn wrong_cardinality_and_duplicates_are_rejected() {
        assert!(validate_week(&full_week()[..6]).is_err());
        let mut week = full_week();
        week[6].day_of_week = 0;
        assert!(validate_week(&week).is_err());
    }

    #[test]
    fn open_must_precede_close() {
        let mut week = full_week();
        week[1].open_time = Some("23:00".into());
        assert!(validate_week(&week).is_err());
    }

    fn vacation(active: bool, start: Option<Date>, end: Option<Date>) -> VacationMode {
        VacationMode {
            active,
            start_date: start,
            end_date: end,
            message: "Ferie!".into(),
        }
    }

    #[test]
    fn vacation_respects_flag_and_range() {
        let today = date!(2025-08-10);
        assert!(!vacation_currently_away(
            &vacation(false, None, None),
            today
        ));
        assert!(vacation_currently_away(&vacation(true, None, None), today));
        assert!(vacation_currently_away(
            &vacation(true, Some(date!(2025-08-01)), Some(date!(2025-08-20))),
            today
        ));
        assert!(!vacation_currently_away(
            &vacation(true, Some(date!(2025-08-11)), None),
            today
        ));
        assert!(!vacation_currently_away(
            &vacation(true, None, Some(date!(2025-08-09))),
            today
        ));
    }
}
