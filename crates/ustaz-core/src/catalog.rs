//! Catalog data behind document forms: schools, classes, teachers,
//! subjects, students.
//!
//! Every loader degrades instead of failing: a demo session skips the
//! network entirely, and an error or an empty answer substitutes the
//! built-in lists. Missing catalogs must never block writing a document.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::api::ApiClient;

/// One selectable catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    pub name: Option<String>,
    pub name_kz: Option<String>,
    pub full_name: Option<String>,
}

impl CatalogItem {
    fn named(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: Some(name.to_string()),
            name_kz: Some(name.to_string()),
            full_name: None,
        }
    }

    /// Lenient view over a backend row. Ids may arrive as numbers.
    pub fn from_value(value: &Value) -> Self {
        let id = match value.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let text = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };
        Self {
            id,
            name: text("name"),
            name_kz: text("nameKz"),
            full_name: text("full_name"),
        }
    }

    /// Kazakh name first, then the neutral one, then a person name.
    pub fn label(&self) -> &str {
        self.name_kz
            .as_deref()
            .or(self.name.as_deref())
            .or(self.full_name.as_deref())
            .unwrap_or(&self.id)
    }
}

fn items_of(rows: Vec<Value>) -> Vec<CatalogItem> {
    rows.iter().map(CatalogItem::from_value).collect()
}

/// Subjects offered when the backend has none.
pub fn fallback_subjects() -> Vec<CatalogItem> {
    const SUBJECTS: [(&str, &str); 9] = [
        ("math", "Математика"),
        ("kazakh", "Қазақ тілі"),
        ("russian", "Орыс тілі"),
        ("english", "Ағылшын тілі"),
        ("physics", "Физика"),
        ("chemistry", "Химия"),
        ("biology", "Биология"),
        ("history", "Тарих"),
        ("geography", "География"),
    ];
    SUBJECTS
        .iter()
        .map(|(id, name)| CatalogItem::named(id, name))
        .collect()
}

/// Classes offered when the backend has none.
pub fn fallback_classes() -> Vec<CatalogItem> {
    const CLASSES: [(&str, &str); 13] = [
        ("1a", "1А"),
        ("1b", "1Б"),
        ("2a", "2А"),
        ("2b", "2Б"),
        ("3a", "3А"),
        ("4a", "4А"),
        ("5a", "5А"),
        ("6a", "6А"),
        ("7a", "7А"),
        ("8a", "8А"),
        ("9a", "9А"),
        ("10a", "10А"),
        ("11a", "11А"),
    ];
    CLASSES
        .iter()
        .map(|(id, name)| CatalogItem::named(id, name))
        .collect()
}

pub struct Catalog {
    api: Arc<ApiClient>,
}

impl Catalog {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Schools have no static stand-in; failures read as an empty list.
    pub async fn schools(&self) -> Vec<CatalogItem> {
        if self.api.session().is_demo() {
            return Vec::new();
        }
        match self.api.schools().await {
            Ok(rows) => items_of(rows),
            Err(err) => {
                warn!(target: "ustaz::catalog", "schools unavailable: {err}");
                Vec::new()
            }
        }
    }

    pub async fn classes(&self, school_id: Option<&str>) -> Vec<CatalogItem> {
        if self.api.session().is_demo() {
            return fallback_classes();
        }
        match self.api.classes(school_id).await {
            Ok(rows) if !rows.is_empty() => items_of(rows),
            Ok(_) => {
                warn!(target: "ustaz::catalog", "no classes on the backend, using the built-in list");
                fallback_classes()
            }
            Err(err) => {
                warn!(target: "ustaz::catalog", "classes unavailable, using the built-in list: {err}");
                fallback_classes()
            }
        }
    }

    /// With nothing else to offer, the signed-in teacher is the list.
    pub async fn teachers(&self, school_id: Option<&str>) -> Vec<CatalogItem> {
        if self.api.session().is_demo() {
            return self.current_teacher_entry();
        }
        match self.api.teachers(school_id).await {
            Ok(rows) if !rows.is_empty() => items_of(rows),
            Ok(_) => self.current_teacher_entry(),
            Err(err) => {
                warn!(target: "ustaz::catalog", "teachers unavailable: {err}");
                self.current_teacher_entry()
            }
        }
    }

    pub async fn subjects(&self) -> Vec<CatalogItem> {
        if self.api.session().is_demo() {
            return fallback_subjects();
        }
        match self.api.subjects().await {
            Ok(rows) if !rows.is_empty() => items_of(rows),
            Ok(_) => fallback_subjects(),
            Err(err) => {
                warn!(target: "ustaz::catalog", "subjects unavailable, using the built-in list: {err}");
                fallback_subjects()
            }
        }
    }

    /// Students exist only online; demo sessions see an empty roster.
    pub async fn students(&self, class_id: &str) -> Vec<CatalogItem> {
        if self.api.session().is_demo() {
            return Vec::new();
        }
        match self.api.students(Some(class_id)).await {
            Ok(rows) => items_of(rows),
            Err(err) => {
                warn!(target: "ustaz::catalog", "students unavailable for {class_id}: {err}");
                Vec::new()
            }
        }
    }

    fn current_teacher_entry(&self) -> Vec<CatalogItem> {
        match self.api.session().current_user() {
            Some(user) if !user.full_name.is_empty() => vec![CatalogItem {
                id: "current".to_string(),
                name: Some(user.full_name.clone()),
                name_kz: Some(user.full_name),
                full_name: None,
            }],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UstazConfig;
    use crate::session::{Session, UserProfile};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn demo_catalog(with_profile: bool) -> Catalog {
        let session = Session::new(Arc::new(MemoryStore::new()));
        session.start_demo().unwrap();
        if with_profile {
            session
                .save_profile(&UserProfile::from_email("aigerim@mektep.kz"))
                .unwrap();
        }
        let config = UstazConfig {
            api_base_url: "http://127.0.0.1:1/api/v1".to_string(),
            ..UstazConfig::default()
        };
        Catalog::new(Arc::new(ApiClient::new(&config, session)))
    }

    #[test]
    fn label_prefers_the_kazakh_name() {
        let item = CatalogItem::from_value(&json!({
            "id": 7, "name": "Mathematics", "nameKz": "Математика"
        }));
        assert_eq!(item.id, "7", "numeric ids become strings");
        assert_eq!(item.label(), "Математика");

        let person = CatalogItem::from_value(&json!({
            "id": "t1", "full_name": "Болат Н."
        }));
        assert_eq!(person.label(), "Болат Н.");

        let bare = CatalogItem::from_value(&json!({ "id": "x" }));
        assert_eq!(bare.label(), "x", "the id is the last resort");
    }

    #[test]
    fn builtin_lists_cover_the_school_program() {
        let subjects = fallback_subjects();
        assert_eq!(subjects.len(), 9);
        assert!(subjects.iter().any(|s| s.label() == "Қазақ тілі"));

        let classes = fallback_classes();
        assert_eq!(classes.len(), 13);
        assert_eq!(classes.first().unwrap().label(), "1А");
        assert_eq!(classes.last().unwrap().label(), "11А");
    }

    #[tokio::test]
    async fn demo_session_serves_fallbacks_without_the_network() {
        let catalog = demo_catalog(true);
        assert_eq!(catalog.classes(None).await.len(), 13);
        assert_eq!(catalog.subjects().await.len(), 9);
        assert!(catalog.schools().await.is_empty());
        assert!(catalog.students("5a").await.is_empty());

        let teachers = catalog.teachers(None).await;
        assert_eq!(teachers.len(), 1, "the signed-in teacher is the roster");
        assert_eq!(teachers[0].id, "current");
        assert_eq!(teachers[0].label(), "aigerim");
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_to_fallbacks() {
        // Same dead endpoint, but a real (non-demo) session.
        let session = Session::new(Arc::new(MemoryStore::new()));
        session.set_access_token("tok").unwrap();
        let config = UstazConfig {
            api_base_url: "http://127.0.0.1:1/api/v1".to_string(),
            request_timeout_secs: 2,
            ..UstazConfig::default()
        };
        let catalog = Catalog::new(Arc::new(ApiClient::new(&config, session)));

        assert_eq!(catalog.classes(Some("15")).await.len(), 13);
        assert_eq!(catalog.subjects().await.len(), 9);
        assert!(catalog.schools().await.is_empty());
    }
}
