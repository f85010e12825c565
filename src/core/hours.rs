use crate::domain::model::OpeningHours;
use chrono::Weekday;

const TRANSLATIONS: [(&str, &str); 8] = [
    ("Monday", "Lunes"),
    ("Tuesday", "Martes"),
    ("Wednesday", "Miércoles"),
    ("Thursday", "Jueves"),
    ("Friday", "Viernes"),
    ("Saturday", "Sábado"),
    ("Sunday", "Domingo"),
    ("Closed", "Cerrado"),
];

/// weekday_text 從星期一開始
pub fn today_index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

pub fn translate_line(line: &str) -> String {
    TRANSLATIONS
        .iter()
        .fold(line.to_string(), |acc, (english, spanish)| {
            acc.replace(english, spanish)
        })
}

pub fn todays_hours(hours: &OpeningHours, weekday: Weekday) -> String {
    let line = hours
        .weekday_text
        .as_ref()
        .and_then(|lines| lines.get(today_index(weekday)))
        .map(String::as_str)
        .unwrap_or("");

    let after_colon = match line.find(':') {
        Some(idx) => &line[idx + 1..],
        None => line,
    };
    after_colon.trim().replace("Closed", "Cerrado")
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoursView {
    pub is_open: bool,
    pub status_label: &'static str,
    pub today: String,
    pub week: Vec<String>,
    pub today_index: usize,
}

impl HoursView {
    /// 沒有 weekday_text 時不顯示
    pub fn build(hours: Option<&OpeningHours>, weekday: Weekday) -> Option<Self> {
        let hours = hours?;
        let lines = hours.weekday_text.as_ref()?;
        let is_open = hours.open_now.unwrap_or(false);

        Some(Self {
            is_open,
            status_label: if is_open { "Abierto ahora" } else { "Cerrado ahora" },
            today: todays_hours(hours, weekday),
            week: lines.iter().map(|l| translate_line(l)).collect(),
            today_index: today_index(weekday),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week(sunday: &str) -> OpeningHours {
        OpeningHours {
            open_now: Some(true),
            periods: None,
            weekday_text: Some(vec![
                "Monday: 09:00 – 22:00".to_string(),
                "Tuesday: 09:00 – 22:00".to_string(),
                "Wednesday: 09:00 – 22:00".to_string(),
                "Thursday: 09:00 – 22:00".to_string(),
                "Friday: 09:00 – 23:00".to_string(),
                "Saturday: 10:00 – 23:00".to_string(),
                format!("Sunday: {}", sunday),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_today_index_starts_monday() {
        assert_eq!(today_index(Weekday::Mon), 0);
        assert_eq!(today_index(Weekday::Sun), 6);
    }

    #[test]
    fn test_todays_hours_takes_text_after_colon() {
        let hours = week("10:00 – 21:00");
        assert_eq!(todays_hours(&hours, Weekday::Fri), "09:00 – 23:00");
        assert_eq!(todays_hours(&hours, Weekday::Sun), "10:00 – 21:00");
    }

    #[test]
    fn test_todays_hours_translates_closed() {
        let hours = week("Closed");
        assert_eq!(todays_hours(&hours, Weekday::Sun), "Cerrado");
    }

    #[test]
    fn test_missing_day_line_is_empty() {
        let hours = OpeningHours {
            open_now: None,
            periods: None,
            weekday_text: Some(vec!["Monday: 09:00 – 18:00".to_string()]),
            ..Default::default()
        };
        assert_eq!(todays_hours(&hours, Weekday::Wed), "");
    }

    #[test]
    fn test_translate_line() {
        assert_eq!(translate_line("Sunday: Closed"), "Domingo: Cerrado");
        assert_eq!(translate_line("Wednesday: 09:00 – 22:00"), "Miércoles: 09:00 – 22:00");
    }

    #[test]
    fn test_view_absent_without_weekday_text() {
        assert!(HoursView::build(None, Weekday::Mon).is_none());
        let only_flag = OpeningHours {
            open_now: Some(true),
            ..Default::default()
        };
        assert!(HoursView::build(Some(&only_flag), Weekday::Mon).is_none());
    }

    #[test]
    fn test_view_status_labels() {
        let open = week("Closed");
        let view = HoursView::build(Some(&open), Weekday::Sun).unwrap();
        assert_eq!(view.status_label, "Abierto ahora");
        assert_eq!(view.today, "Cerrado");
        assert_eq!(view.week[6], "Domingo: Cerrado");
        assert_eq!(view.today_index, 6);

        let closed = OpeningHours {
            open_now: Some(false),
            ..week("Closed")
        };
        let view = HoursView::build(Some(&closed), Weekday::Mon).unwrap();
        assert!(!view.is_open);
        assert_eq!(view.status_label, "Cerrado ahora");
    }
}
