//! Ministry-format document templates for Kazakhstani schools.
//!
//! Each template carries its Adilet order reference, a field list the
//! caller can turn into a form, and a renderer producing the printable
//! HTML that the PDF layer consumes. User values are HTML-escaped on
//! the way in.

use std::collections::HashMap;

use chrono::{Datelike, Local, NaiveDate};

use crate::session::UserProfile;

/// Form values keyed by [`TemplateField::key`].
pub type TemplateValues = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Date,
    Select,
}

/// Catalog feeding a select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Schools,
    Classes,
    Teachers,
    Subjects,
    Students,
}

#[derive(Debug, Clone)]
pub struct TemplateField {
    pub key: &'static str,
    pub label: &'static str,
    pub label_kz: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub options: &'static [&'static str],
    pub data_source: Option<DataSource>,
    /// Key of the field whose value narrows this one's catalog.
    pub depends_on: Option<&'static str>,
}

const fn field(
    key: &'static str,
    label: &'static str,
    label_kz: &'static str,
    kind: FieldKind,
) -> TemplateField {
    TemplateField {
        key,
        label,
        label_kz,
        kind,
        required: false,
        options: &[],
        data_source: None,
        depends_on: None,
    }
}

impl TemplateField {
    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn from_source(mut self, source: DataSource) -> Self {
        self.data_source = Some(source);
        self
    }

    const fn with_options(mut self, options: &'static [&'static str]) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone)]
pub struct DocumentTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub name_kz: &'static str,
    /// Adilet order number backing the format.
    pub order_code: &'static str,
    pub fields: &'static [TemplateField],
    render: fn(&TemplateValues) -> String,
}

impl DocumentTemplate {
    pub fn render(&self, data: &TemplateValues) -> String {
        (self.render)(data)
    }

    pub fn order_url_kz(&self) -> String {
        format!("https://adilet.zan.kz/kaz/docs/{}", self.order_code)
    }

    pub fn order_url_ru(&self) -> String {
        format!("https://adilet.zan.kz/rus/docs/{}", self.order_code)
    }
}

pub fn template_by_id(id: &str) -> Option<&'static DocumentTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Pre-fills a form the way a teacher expects it: date fields get
/// today, and the teacher/class/school fields come from the profile.
pub fn initial_values(template: &DocumentTemplate, profile: &UserProfile) -> TemplateValues {
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let mut values = TemplateValues::new();
    for field in template.fields {
        let preset = match field.kind {
            FieldKind::Date => today.clone(),
            _ => match field.key {
                "teacher" if !profile.full_name.is_empty() => profile.full_name.clone(),
                "class" => profile.class_id.clone().unwrap_or_default(),
                "school" => profile.school_id.clone().unwrap_or_default(),
                _ => String::new(),
            },
        };
        values.insert(field.key.to_string(), preset);
    }
    values
}

pub static TEMPLATES: [DocumentTemplate; 10] = [
    DocumentTemplate {
        id: "ktp",
        name: "Календарно-тематическое планирование",
        name_kz: "Күнтізбелік-тақырыптық жоспар",
        order_code: "V2100024429",
        fields: &[
            field("subject", "Предмет", "Пән", FieldKind::Select)
                .required()
                .from_source(DataSource::Subjects),
            field("class", "Класс", "Сынып", FieldKind::Select)
                .required()
                .from_source(DataSource::Classes),
            field("teacher", "ФИО учителя", "Мұғалімнің аты-жөні", FieldKind::Select)
                .required()
                .from_source(DataSource::Teachers),
            field("academicYear", "Учебный год", "Оқу жылы", FieldKind::Text).required(),
        ],
        render: render_ktp,
    },
    DocumentTemplate {
        id: "lesson-plan",
        name: "Поурочный план",
        name_kz: "Қысқа мерзімді жоспар",
        order_code: "V2100024429",
        fields: &[
            field("subject", "Предмет", "Пән", FieldKind::Select)
                .required()
                .from_source(DataSource::Subjects),
            field("class", "Класс", "Сынып", FieldKind::Select)
                .required()
                .from_source(DataSource::Classes),
            field("teacher", "ФИО учителя", "Мұғалімнің аты-жөні", FieldKind::Select)
                .required()
                .from_source(DataSource::Teachers),
            field("date", "Дата", "Күні", FieldKind::Date).required(),
            field("topic", "Тема урока", "Сабақ тақырыбы", FieldKind::Text).required(),
            field("objective", "Цели обучения (код)", "Оқу мақсаты (код)", FieldKind::Text)
                .required(),
            field(
                "allStudents",
                "Все учащиеся смогут",
                "Барлық оқушылар біледі",
                FieldKind::Textarea,
            ),
            field(
                "mostStudents",
                "Большинство учащихся смогут",
                "Көпшілік оқушылар біледі",
                FieldKind::Textarea,
            ),
            field(
                "someStudents",
                "Некоторые учащиеся смогут",
                "Кейбір оқушылар біледі",
                FieldKind::Textarea,
            ),
            field("lessonPlan", "Ход урока", "Сабақ барысы", FieldKind::Textarea).required(),
        ],
        render: render_lesson_plan,
    },
    DocumentTemplate {
        id: "control-analysis",
        name: "Анализ СОР/СОЧ",
        name_kz: "СОР/СОЧ талдауы",
        order_code: "V2200029326",
        fields: &[
            field("subject", "Предмет", "Пән", FieldKind::Select)
                .required()
                .from_source(DataSource::Subjects),
            field("class", "Класс", "Сынып", FieldKind::Select)
                .required()
                .from_source(DataSource::Classes),
            field("quarter", "Четверть", "Тоқсан", FieldKind::Select)
                .required()
                .with_options(&["1", "2", "3", "4"]),
            field("type", "Тип работы", "Жұмыс түрі", FieldKind::Select)
                .required()
                .with_options(&["СОР", "СОЧ"]),
            field("totalStudents", "Всего учащихся", "Барлығы оқушы", FieldKind::Number)
                .required(),
            field("completed", "Выполняли работу", "Жұмыс орындаған", FieldKind::Number)
                .required(),
            field("lowLevel", "Низкий уровень (0-39%)", "Төмен деңгей", FieldKind::Number)
                .required(),
            field("mediumLevel", "Средний уровень (40-84%)", "Орташа деңгей", FieldKind::Number)
                .required(),
            field("highLevel", "Высокий уровень (85-100%)", "Жоғары деңгей", FieldKind::Number)
                .required(),
            field(
                "difficulties",
                "Трудности по целям обучения",
                "Оқу мақсаттары бойынша қиындықтар",
                FieldKind::Textarea,
            ),
            field(
                "conclusions",
                "Выводы и план работы",
                "Қорытынды және жұмыс жоспары",
                FieldKind::Textarea,
            )
            .required(),
        ],
        render: render_control_analysis,
    },
    DocumentTemplate {
        id: "parent-meeting",
        name: "Протокол родительского собрания",
        name_kz: "Ата-аналар жиналысының хаттамасы",
        order_code: "V2100024429",
        fields: &[
            field("number", "Номер протокола", "Хаттама нөмірі", FieldKind::Number).required(),
            field("date", "Дата", "Күні", FieldKind::Date).required(),
            field("class", "Класс", "Сынып", FieldKind::Text).required(),
            field("topic", "Тема собрания", "Жиналыс тақырыбы", FieldKind::Text).required(),
            field("present", "Присутствовали", "Қатысқан", FieldKind::Number).required(),
            field("agenda", "Повестка дня", "Күн тәртібі", FieldKind::Textarea).required(),
            field("discussion", "Слушали", "Тыңдалды", FieldKind::Textarea).required(),
            field("decisions", "Решили", "Қаулы", FieldKind::Textarea).required(),
            field("chairman", "Председатель", "Төраға", FieldKind::Text),
            field("secretary", "Секретарь", "Хатшы", FieldKind::Text),
        ],
        render: render_parent_meeting,
    },
    DocumentTemplate {
        id: "student-characteristic",
        name: "Характеристика на ученика",
        name_kz: "Оқушыға сипаттама",
        order_code: "V2100024429",
        fields: &[
            field("studentName", "ФИО ученика", "Оқушының аты-жөні", FieldKind::Text).required(),
            field("class", "Класс", "Сынып", FieldKind::Text).required(),
            field("birthDate", "Дата рождения", "Туған күні", FieldKind::Date),
            field(
                "academicPerformance",
                "Успеваемость",
                "Оқу жетістігі",
                FieldKind::Textarea,
            )
            .required(),
            field("behavior", "Поведение", "Мінез-құлық", FieldKind::Textarea).required(),
            field(
                "personality",
                "Личностные качества",
                "Жеке қасиеттері",
                FieldKind::Textarea,
            ),
            field("recommendations", "Рекомендации", "Ұсыныстар", FieldKind::Textarea),
        ],
        render: render_student_characteristic,
    },
    DocumentTemplate {
        id: "quality-report",
        name: "Отчет по качеству знаний",
        name_kz: "Білім сапасы туралы есеп",
        order_code: "V2200029326",
        fields: &[
            field("subject", "Предмет", "Пән", FieldKind::Select)
                .required()
                .from_source(DataSource::Subjects),
            field("class", "Класс", "Сынып", FieldKind::Select)
                .required()
                .from_source(DataSource::Classes),
            field("quarter", "Четверть", "Тоқсан", FieldKind::Select)
                .required()
                .with_options(&["1", "2", "3", "4", "Год"]),
            field("totalStudents", "Всего учащихся", "Барлығы оқушы", FieldKind::Number)
                .required(),
            field("excellent", "Отличники (5)", "Өте жақсы (5)", FieldKind::Number).required(),
            field("good", "Хорошисты (4)", "Жақсы (4)", FieldKind::Number).required(),
            field(
                "satisfactory",
                "Удовлетворительно (3)",
                "Қанағаттанарлық (3)",
                FieldKind::Number,
            )
            .required(),
            field(
                "unsatisfactory",
                "Неудовлетворительно (2)",
                "Қанағаттанбайтын (2)",
                FieldKind::Number,
            ),
            field("conclusions", "Выводы", "Қорытынды", FieldKind::Textarea),
        ],
        render: render_quality_report,
    },
    DocumentTemplate {
        id: "education-plan",
        name: "План воспитательной работы",
        name_kz: "Тәрбие жоспары",
        order_code: "V2100024429",
        fields: &[
            field("class", "Класс", "Сынып", FieldKind::Text).required(),
            field("teacher", "Классный руководитель", "Класс жетекшісі", FieldKind::Text)
                .required(),
            field("academicYear", "Учебный год", "Оқу жылы", FieldKind::Text).required(),
            field(
                "goals",
                "Цели воспитательной работы",
                "Тәрбие жұмысының мақсаттары",
                FieldKind::Textarea,
            )
            .required(),
            field("activities", "Мероприятия", "Іс-шаралар", FieldKind::Textarea).required(),
        ],
        render: render_education_plan,
    },
    DocumentTemplate {
        id: "class-passport",
        name: "Социальный паспорт класса",
        name_kz: "Сыныптың әлеуметтік паспорты",
        order_code: "V2000020317",
        fields: &[
            field("class", "Класс", "Сынып", FieldKind::Text).required(),
            field("totalStudents", "Всего учащихся", "Барлығы оқушы", FieldKind::Number)
                .required(),
            field("boys", "Мальчиков", "Ұлдар", FieldKind::Number).required(),
            field("girls", "Девочек", "Қыздар", FieldKind::Number).required(),
            field("fullFamilies", "Полных семей", "Толық отбасылар", FieldKind::Number),
            field(
                "incompleteFamilies",
                "Неполных семей",
                "Толық емес отбасылар",
                FieldKind::Number,
            ),
            field(
                "largeFamilies",
                "Многодетных семей",
                "Көпбалалы отбасылар",
                FieldKind::Number,
            ),
            field("lowIncome", "Малообеспеченных", "Төмен табысты", FieldKind::Number),
            field("guardianship", "Опекаемых", "Қамқорлықтағы", FieldKind::Number),
            field("disabled", "С инвалидностью", "Мүгедектігі бар", FieldKind::Number),
        ],
        render: render_class_passport,
    },
    DocumentTemplate {
        id: "safety-journal",
        name: "Журнал инструктажа по ТБ",
        name_kz: "Қауіпсіздік техникасы бойынша нұсқау журналы",
        order_code: "V2100024429",
        fields: &[
            field("class", "Класс", "Сынып", FieldKind::Text).required(),
            field("teacher", "Учитель", "Мұғалім", FieldKind::Text).required(),
            field("topic", "Тема инструктажа", "Нұсқау тақырыбы", FieldKind::Text).required(),
            field("date", "Дата", "Күні", FieldKind::Date).required(),
            field(
                "students",
                "Список учащихся (ФИО)",
                "Оқушылар тізімі",
                FieldKind::Textarea,
            )
            .required(),
        ],
        render: render_safety_journal,
    },
    DocumentTemplate {
        id: "class-journal",
        name: "Классный журнал",
        name_kz: "Сынып журналы",
        order_code: "V2300033330",
        fields: &[],
        render: render_class_journal,
    },
];

fn value<'a>(data: &'a TemplateValues, key: &str) -> &'a str {
    data.get(key).map(String::as_str).unwrap_or("")
}

fn esc(data: &TemplateValues, key: &str) -> String {
    html_escape::encode_text(value(data, key)).into_owned()
}

/// Escaped value, or the literal fallback when the field is blank.
fn esc_or(data: &TemplateValues, key: &str, fallback: &str) -> String {
    let raw = value(data, key);
    if raw.is_empty() {
        fallback.to_string()
    } else {
        html_escape::encode_text(raw).into_owned()
    }
}

fn count(data: &TemplateValues, key: &str) -> i64 {
    value(data, key).trim().parse().unwrap_or(0)
}

/// `YYYY-MM-DD` form dates print as `DD.MM.YYYY`; anything else passes
/// through escaped.
fn date_kz(data: &TemplateValues, key: &str) -> String {
    let raw = value(data, key);
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%d.%m.%Y").to_string(),
        Err(_) => html_escape::encode_text(raw).into_owned(),
    }
}

fn percent(part: i64, total: i64) -> i64 {
    if total > 0 {
        ((part as f64 / total as f64) * 100.0).round() as i64
    } else {
        0
    }
}

fn order_footer(code: &str) -> String {
    format!(
        "<div class=\"order-ref\">\n\
         <p><strong>Ресми бұйрық:</strong> №{code}</p>\n\
         <p><a href=\"https://adilet.zan.kz/kaz/docs/{code}\">Қазақша нұсқасы</a> | \
         <a href=\"https://adilet.zan.kz/rus/docs/{code}\">Русская версия</a></p>\n\
         </div>"
    )
}

fn render_ktp(data: &TemplateValues) -> String {
    format!(
        "<h2>КҮНТІЗБЕЛІК-ТАҚЫРЫПТЫҚ ЖОСПАР</h2>\n\
         <h3>{subject} | {class_name} | {year}</h3>\n\
         <table>\n\
         <tr><th>№</th><th>Тақырып</th><th>Сағат саны</th><th>Оқу мақсаттары (код)</th><th>Күні</th></tr>\n\
         <tr><td>1</td><td>{topic}</td><td>2</td><td>{objective}</td><td>{date}</td></tr>\n\
         </table>\n\
         <p><strong>Мұғалім:</strong> {teacher}</p>\n\
         <p><strong>Бекітті:</strong> ________________</p>\n\
         {footer}",
        subject = esc_or(data, "subject", "Пән"),
        class_name = esc_or(data, "class", "Сынып"),
        year = esc_or(data, "academicYear", "Оқу жылы"),
        topic = esc_or(data, "topic1", "Тақырып 1"),
        objective = esc_or(data, "objective1", "7.1.1.1"),
        date = esc(data, "date1"),
        teacher = esc_or(data, "teacher", "________________"),
        footer = order_footer("V2100024429"),
    )
}

fn render_lesson_plan(data: &TemplateValues) -> String {
    format!(
        "<h2>ҚЫСҚА МЕРЗІМДІ ЖОСПАР</h2>\n\
         <p><strong>Пән:</strong> {subject}</p>\n\
         <p><strong>Сынып:</strong> {class_name}</p>\n\
         <p><strong>Мұғалім:</strong> {teacher}</p>\n\
         <p><strong>Күні:</strong> {date}</p>\n\
         <h3>Сабақ тақырыбы:</h3>\n\
         <p>{topic}</p>\n\
         <h3>Оқу мақсаттары (бағдарламаға сілтеме):</h3>\n\
         <p>{objective}</p>\n\
         <h3>Сабақ мақсаттары:</h3>\n\
         <p><strong>Барлық оқушылар біледі:</strong> {all}</p>\n\
         <p><strong>Көпшілік оқушылар біледі:</strong> {most}</p>\n\
         <p><strong>Кейбір оқушылар біледі:</strong> {some}</p>\n\
         <h3>Сабақ барысы:</h3>\n\
         <div>{plan}</div>\n\
         <p><strong>Мұғалім:</strong> {signature}</p>\n\
         {footer}",
        subject = esc(data, "subject"),
        class_name = esc(data, "class"),
        teacher = esc(data, "teacher"),
        date = date_kz(data, "date"),
        topic = esc(data, "topic"),
        objective = esc(data, "objective"),
        all = esc(data, "allStudents"),
        most = esc(data, "mostStudents"),
        some = esc(data, "someStudents"),
        plan = esc(data, "lessonPlan"),
        signature = esc_or(data, "teacher", "________________"),
        footer = order_footer("V2100024429"),
    )
}

fn render_control_analysis(data: &TemplateValues) -> String {
    let completed = count(data, "completed");
    let low = count(data, "lowLevel");
    let medium = count(data, "mediumLevel");
    let high = count(data, "highLevel");
    let quality = percent(medium + high, completed);
    let success = percent(completed - low, completed);

    let mut html = format!(
        "<h2>СОР/СОЧ ТАЛДАУЫ</h2>\n\
         <p><strong>Пән:</strong> {subject}</p>\n\
         <p><strong>Сынып:</strong> {class_name}</p>\n\
         <p><strong>Тоқсан:</strong> {quarter}</p>\n\
         <p><strong>Жұмыс түрі:</strong> {kind}</p>\n\
         <p><strong>Барлығы оқушы:</strong> {total}</p>\n\
         <p><strong>Жұмыс орындаған:</strong> {completed}</p>\n\
         <h3>Нәтижелер:</h3>\n\
         <ul>\n\
         <li><strong>Төмен деңгей (0-39%):</strong> {low} оқушы</li>\n\
         <li><strong>Орташа деңгей (40-84%):</strong> {medium} оқушы</li>\n\
         <li><strong>Жоғары деңгей (85-100%):</strong> {high} оқушы</li>\n\
         </ul>\n\
         <p><strong>Білім сапасы:</strong> {quality}%</p>\n\
         <p><strong>Сәттілік:</strong> {success}%</p>\n",
        subject = esc(data, "subject"),
        class_name = esc(data, "class"),
        quarter = esc(data, "quarter"),
        kind = esc(data, "type"),
        total = count(data, "totalStudents"),
    );

    if !value(data, "difficulties").is_empty() {
        html.push_str(&format!(
            "<h3>Оқу мақсаттары бойынша қиындықтар:</h3>\n<p>{}</p>\n",
            esc(data, "difficulties")
        ));
    }

    html.push_str(&format!(
        "<h3>Қорытынды және жұмыс жоспары:</h3>\n\
         <p>{conclusions}</p>\n\
         <p><strong>Қолы:</strong> ________________</p>\n\
         {footer}",
        conclusions = esc(data, "conclusions"),
        footer = order_footer("V2200029326"),
    ));
    html
}

fn render_parent_meeting(data: &TemplateValues) -> String {
    format!(
        "<h2>АТА-АНАЛАР ЖИНАЛЫСЫНЫҢ ХАТТАМАСЫ</h2>\n\
         <p><strong>ХАТТАМА №{number}</strong></p>\n\
         <p>{date}</p>\n\
         <p><strong>Сынып:</strong> {class_name}</p>\n\
         <p><strong>Тақырып:</strong> {topic}</p>\n\
         <p><strong>Қатысқан:</strong> {present} ата-ана</p>\n\
         <h3>Күн тәртібі:</h3>\n\
         <div>{agenda}</div>\n\
         <h3>Тыңдалды:</h3>\n\
         <div>{discussion}</div>\n\
         <h3>Қаулы:</h3>\n\
         <div>{decisions}</div>\n\
         <p><strong>Төраға:</strong> {chairman}</p>\n\
         <p><strong>Хатшы:</strong> {secretary}</p>\n\
         {footer}",
        number = esc(data, "number"),
        date = date_kz(data, "date"),
        class_name = esc(data, "class"),
        topic = esc(data, "topic"),
        present = count(data, "present"),
        agenda = esc(data, "agenda"),
        discussion = esc(data, "discussion"),
        decisions = esc(data, "decisions"),
        chairman = esc_or(data, "chairman", "________________"),
        secretary = esc_or(data, "secretary", "________________"),
        footer = order_footer("V2100024429"),
    )
}

fn render_student_characteristic(data: &TemplateValues) -> String {
    let mut html = format!(
        "<h2>ОҚУШЫҒА СИПАТТАМА</h2>\n\
         <p><strong>Оқушының аты-жөні:</strong> {name}</p>\n\
         <p><strong>Сынып:</strong> {class_name}</p>\n",
        name = esc(data, "studentName"),
        class_name = esc(data, "class"),
    );

    if !value(data, "birthDate").is_empty() {
        html.push_str(&format!(
            "<p><strong>Туған күні:</strong> {}</p>\n",
            date_kz(data, "birthDate")
        ));
    }

    html.push_str(&format!(
        "<h3>Оқу жетістігі:</h3>\n<p>{performance}</p>\n\
         <h3>Мінез-құлық:</h3>\n<p>{behavior}</p>\n",
        performance = esc(data, "academicPerformance"),
        behavior = esc(data, "behavior"),
    ));

    if !value(data, "personality").is_empty() {
        html.push_str(&format!(
            "<h3>Жеке қасиеттері:</h3>\n<p>{}</p>\n",
            esc(data, "personality")
        ));
    }
    if !value(data, "recommendations").is_empty() {
        html.push_str(&format!(
            "<h3>Ұсыныстар:</h3>\n<p>{}</p>\n",
            esc(data, "recommendations")
        ));
    }

    html.push_str(&format!(
        "<p><strong>Класс жетекшісі:</strong> ________________</p>\n\
         <p><strong>Директор:</strong> ________________</p>\n\
         {}",
        order_footer("V2100024429")
    ));
    html
}

fn render_quality_report(data: &TemplateValues) -> String {
    let total = count(data, "totalStudents");
    let excellent = count(data, "excellent");
    let good = count(data, "good");
    let satisfactory = count(data, "satisfactory");
    let unsatisfactory = count(data, "unsatisfactory");
    let quality = percent(excellent + good, total);
    let success = percent(total - unsatisfactory, total);

    let mut html = format!(
        "<h2>БІЛІМ САПАСЫ ТУРАЛЫ ЕСЕП</h2>\n\
         <p><strong>Пән:</strong> {subject}</p>\n\
         <p><strong>Сынып:</strong> {class_name}</p>\n\
         <p><strong>Тоқсан:</strong> {quarter}</p>\n\
         <table>\n\
         <tr><th>Баға</th><th>Оқушылар саны</th><th>%</th></tr>\n\
         <tr><td>5 (Өте жақсы)</td><td>{excellent}</td><td>{p5}%</td></tr>\n\
         <tr><td>4 (Жақсы)</td><td>{good}</td><td>{p4}%</td></tr>\n\
         <tr><td>3 (Қанағаттанарлық)</td><td>{satisfactory}</td><td>{p3}%</td></tr>\n",
        subject = esc(data, "subject"),
        class_name = esc(data, "class"),
        quarter = esc(data, "quarter"),
        p5 = percent(excellent, total),
        p4 = percent(good, total),
        p3 = percent(satisfactory, total),
    );

    if unsatisfactory > 0 {
        html.push_str(&format!(
            "<tr><td>2 (Қанағаттанбайтын)</td><td>{unsatisfactory}</td><td>{p2}%</td></tr>\n",
            p2 = percent(unsatisfactory, total),
        ));
    }

    html.push_str(&format!(
        "</table>\n\
         <p><strong>Барлығы оқушы:</strong> {total}</p>\n\
         <p><strong>Білім сапасы:</strong> {quality}%</p>\n\
         <p><strong>Сәттілік:</strong> {success}%</p>\n"
    ));

    if !value(data, "conclusions").is_empty() {
        html.push_str(&format!(
            "<h3>Қорытынды:</h3>\n<p>{}</p>\n",
            esc(data, "conclusions")
        ));
    }

    html.push_str(&format!(
        "<p><strong>Мұғалім:</strong> ________________</p>\n{}",
        order_footer("V2200029326")
    ));
    html
}

fn render_education_plan(data: &TemplateValues) -> String {
    format!(
        "<h2>ТӘРБИЕ ЖОСПАРЫ</h2>\n\
         <p><strong>Сынып:</strong> {class_name}</p>\n\
         <p><strong>Класс жетекшісі:</strong> {teacher}</p>\n\
         <p><strong>Оқу жылы:</strong> {year}</p>\n\
         <h3>Тәрбие жұмысының мақсаттары:</h3>\n\
         <div>{goals}</div>\n\
         <h3>Іс-шаралар:</h3>\n\
         <div>{activities}</div>\n\
         <p><strong>Класс жетекшісі:</strong> {signature}</p>\n\
         {footer}",
        class_name = esc(data, "class"),
        teacher = esc(data, "teacher"),
        year = esc(data, "academicYear"),
        goals = esc(data, "goals"),
        activities = esc(data, "activities"),
        signature = esc_or(data, "teacher", "________________"),
        footer = order_footer("V2100024429"),
    )
}

fn render_class_passport(data: &TemplateValues) -> String {
    let year = Local::now().year();
    let rows = [
        ("Барлығы оқушы", "totalStudents"),
        ("Ұлдар", "boys"),
        ("Қыздар", "girls"),
        ("Толық отбасылар", "fullFamilies"),
        ("Толық емес отбасылар", "incompleteFamilies"),
        ("Көпбалалы отбасылар", "largeFamilies"),
        ("Төмен табысты", "lowIncome"),
        ("Қамқорлықтағы", "guardianship"),
        ("Мүгедектігі бар", "disabled"),
    ];

    let mut html = format!(
        "<h2>СЫНЫПТЫҢ ӘЛЕУМЕТТІК ПАСПОРТЫ</h2>\n\
         <p><strong>Сынып:</strong> {class_name}</p>\n\
         <p><strong>Оқу жылы:</strong> {year}-{next}</p>\n\
         <table>\n",
        class_name = esc(data, "class"),
        next = year + 1,
    );
    for (label, key) in rows {
        html.push_str(&format!(
            "<tr><td><strong>{label}:</strong></td><td>{}</td></tr>\n",
            count(data, key)
        ));
    }
    html.push_str(&format!(
        "</table>\n\
         <p><strong>Класс жетекшісі:</strong> ________________</p>\n\
         {}",
        order_footer("V2000020317")
    ));
    html
}

fn render_safety_journal(data: &TemplateValues) -> String {
    let rows: String = value(data, "students")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| {
            format!(
                "<tr><td>{n}</td><td>{name}</td><td>________________</td></tr>\n",
                n = index + 1,
                name = html_escape::encode_text(line.trim()),
            )
        })
        .collect();

    format!(
        "<h2>ҚАУІПСІЗДІК ТЕХНИКАСЫ БОЙЫНША НҰСҚАУ ЖУРНАЛЫ</h2>\n\
         <p><strong>Сынып:</strong> {class_name}</p>\n\
         <p><strong>Мұғалім:</strong> {teacher}</p>\n\
         <p><strong>Нұсқау тақырыбы:</strong> {topic}</p>\n\
         <p><strong>Күні:</strong> {date}</p>\n\
         <table>\n\
         <tr><th>№</th><th>Оқушының аты-жөні</th><th>Қолы</th></tr>\n\
         {rows}\
         </table>\n\
         <p><strong>Мұғалім:</strong> {signature}</p>\n\
         {footer}",
        class_name = esc(data, "class"),
        teacher = esc(data, "teacher"),
        topic = esc(data, "topic"),
        date = date_kz(data, "date"),
        signature = esc_or(data, "teacher", "________________"),
        footer = order_footer("V2100024429"),
    )
}

fn render_class_journal(_data: &TemplateValues) -> String {
    format!(
        "<h2>СЫНЫП ЖУРНАЛЫ</h2>\n\
         <p>Электрондық журналды пайдалану үшін <strong>Kundelik.kz</strong> платформасына өтіңіз.</p>\n\
         {}",
        order_footer("V2300033330")
    )
}
