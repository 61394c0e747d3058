//! Ready-made parent notices for the four WhatsApp message categories.

use chrono::Local;
use reqwest::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Meeting,
    Saturday,
    Money,
    Congrats,
}

impl MessageCategory {
    pub const ALL: [MessageCategory; 4] = [
        MessageCategory::Meeting,
        MessageCategory::Saturday,
        MessageCategory::Money,
        MessageCategory::Congrats,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "meeting" => Some(Self::Meeting),
            "saturday" => Some(Self::Saturday),
            "money" => Some(Self::Money),
            "congrats" => Some(Self::Congrats),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Meeting => "meeting",
            Self::Saturday => "saturday",
            Self::Money => "money",
            Self::Congrats => "congrats",
        }
    }

    pub fn label_kz(&self) -> &'static str {
        match self {
            Self::Meeting => "Жиналыс",
            Self::Saturday => "Сенбілік",
            Self::Money => "Ақша жинау",
            Self::Congrats => "Құттықтау",
        }
    }

    pub fn compose(&self, form: &MessageForm) -> String {
        match self {
            Self::Meeting => format!(
                "Құрметті ата-аналар!\n\n\
                 {date} күні сағат {time} мектепте ата-аналар жиналысы өтеді.{room}\n\n\
                 {info}\n\n\
                 Құрметпен, мектеп әкімшілігі.",
                date = form.date,
                time = form.time,
                room = form.room_suffix(),
                info = form.info_or("Келуді сұраймыз."),
            ),
            Self::Saturday => format!(
                "Құрметті ата-аналар!\n\n\
                 {date} күні сенбілік сабақ өтеді. Оқушылардың сабаққа келуін сұраймыз.\n\n\
                 {info}\n\n\
                 Құрметпен, мектеп әкімшілігі.",
                date = form.date,
                info = form.info_or("Сабақ басталу уақыты: 09:00"),
            ),
            Self::Money => format!(
                "Құрметті ата-аналар!\n\n\
                 {date} күні {info} ақша жинау жүргізіледі.\n\n\
                 {room}\n\n\
                 Құрметпен, мектеп әкімшілігі.",
                date = form.date,
                info = form.info_or("мәктәптік қажеттіліктер үшін"),
                room = form.room_paragraph(),
            ),
            Self::Congrats => format!(
                "Құрметті ата-аналар!\n\n\
                 {greeting}\n\n\
                 {date} күні {event} өтеді.\n\n\
                 {room}\n\n\
                 Құрметпен, мектеп әкімшілігі.",
                greeting = form.info_or("Сізбен бірге құттықтаймыз!"),
                date = form.date,
                event = form.info_or("арнайы оқиға"),
                room = form.room_paragraph(),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageForm {
    pub date: String,
    pub time: String,
    pub room: String,
    pub additional_info: Option<String>,
}

impl Default for MessageForm {
    fn default() -> Self {
        Self {
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            time: "14:00".to_string(),
            room: String::new(),
            additional_info: None,
        }
    }
}

impl MessageForm {
    fn info_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.additional_info.as_deref() {
            Some(info) if !info.is_empty() => info,
            _ => fallback,
        }
    }

    /// Appended to the announcement sentence when a room is given.
    fn room_suffix(&self) -> String {
        if self.room.is_empty() {
            String::new()
        } else {
            format!(" Кабинет: {}.", self.room)
        }
    }

    /// Stand-alone room paragraph, empty when no room is given.
    fn room_paragraph(&self) -> String {
        if self.room.is_empty() {
            String::new()
        } else {
            format!("Кабинет: {}.", self.room)
        }
    }
}

/// Share URL opening WhatsApp with the message pre-filled.
pub fn whatsapp_link(message: &str) -> String {
    match Url::parse_with_params("https://wa.me/", [("text", message)]) {
        Ok(url) => url.to_string(),
        Err(_) => "https://wa.me/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(date: &str, room: &str, info: Option<&str>) -> MessageForm {
        MessageForm {
            date: date.to_string(),
            time: "14:00".to_string(),
            room: room.to_string(),
            additional_info: info.map(|s| s.to_string()),
        }
    }

    #[test]
    fn meeting_keeps_the_room_on_the_announcement_line() {
        let text = MessageCategory::Meeting.compose(&form("2025-09-01", "204", None));
        assert!(text.contains(
            "2025-09-01 күні сағат 14:00 мектепте ата-аналар жиналысы өтеді. Кабинет: 204."
        ));
        assert!(text.contains("Келуді сұраймыз."));
        assert!(text.ends_with("Құрметпен, мектеп әкімшілігі."));
    }

    #[test]
    fn blank_additional_info_falls_back_to_the_default_line() {
        let text = MessageCategory::Saturday.compose(&form("2025-09-06", "", Some("")));
        assert!(text.contains("Сабақ басталу уақыты: 09:00"));
    }

    #[test]
    fn congrats_reuses_the_info_for_greeting_and_event() {
        let text =
            MessageCategory::Congrats.compose(&form("2025-03-22", "", Some("Наурыз мейрамы")));
        assert_eq!(text.matches("Наурыз мейрамы").count(), 2);
        assert!(!text.contains("арнайы оқиға"));
    }

    #[test]
    fn money_names_the_purpose_and_room() {
        let text = MessageCategory::Money.compose(&form("2025-10-01", "101", None));
        assert!(text.contains("мәктәптік қажеттіліктер үшін ақша жинау жүргізіледі."));
        assert!(text.contains("Кабинет: 101."));
    }

    #[test]
    fn category_ids_round_trip() {
        for category in MessageCategory::ALL {
            assert_eq!(MessageCategory::from_id(category.id()), Some(category));
        }
        assert_eq!(MessageCategory::from_id("newsletter"), None);
    }

    #[test]
    fn share_link_url_encodes_the_text() {
        let link = whatsapp_link("Сәлем әлем");
        assert!(link.starts_with("https://wa.me/?text="));
        assert!(!link.contains(' '));
    }

    #[test]
    fn default_form_starts_today_at_two_pm() {
        let form = MessageForm::default();
        assert_eq!(form.time, "14:00");
        assert_eq!(form.date.len(), 10);
        assert!(form.room.is_empty());
    }
}
