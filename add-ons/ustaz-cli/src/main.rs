//! Ustaz CLI: the teacher assistant from the terminal.
//!
//! Usage:
//!   ustaz login <email> <password>
//!   ustaz render ktp --set subject=math --set class=7a ...
//!
//! State lives in a local sled directory (`data_dir` in the config);
//! every command opens it, does its work, and exits.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use ustaz_agent::{ChatAgent, VoiceAgent};
use ustaz_core::{
    save_document, template_by_id, whatsapp_link, ApiClient, Auth, Catalog, DocumentStore,
    HistoryAction, LessonSlot, MessageCategory, MessageForm, RegisterRequest, ScheduleStore,
    Session, SledStore, StateStore, StoredDocument, TemplateValues, UserProfile, UstazConfig,
    DAYS, PERIODS, TEMPLATES,
};

type CliError = Box<dyn std::error::Error + Send + Sync>;

fn usage() {
    eprintln!("Ustaz — teacher assistant");
    eprintln!("  login <email> <password>          Sign in (falls back to the demo session)");
    eprintln!("  register <email> <password> <name> [--school ID] [--class ID] [--phone N]");
    eprintln!("  logout                            Sign out and drop local tokens");
    eprintln!("  refresh                           Trade the refresh token for a new pair");
    eprintln!("  whoami                            Show the signed-in profile");
    eprintln!("  health                            Probe the backend");
    eprintln!("  catalog <schools|classes|teachers|subjects> [--school ID]");
    eprintln!("  catalog students --class ID");
    eprintln!("  templates                         List document templates");
    eprintln!("  render <template> --set k=v ... [--out FILE.pdf]");
    eprintln!("  docs <list|show ID|history ID|search TERM|delete ID>");
    eprintln!("  schedule <show|demo|clear>");
    eprintln!("  schedule add <day 1-6> <period 1-8> <subject> <class> [room]");
    eprintln!("  schedule remove <day 1-6> <period 1-8> <class>");
    eprintln!("  message <meeting|saturday|money|congrats> [--date D] [--time T] [--room R] [--info TEXT]");
    eprintln!("  chat <text>                       Ask the n8n assistant");
    eprintln!("  voice <audio-file>                Send a recording to the voice agent");
    eprintln!("  wipe                              Clear all local state");
    eprintln!();
    eprintln!("Config: config/ustaz.toml or USTAZ__* environment variables.");
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,ustaz=info".to_string()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        usage();
        return Ok(());
    };
    let rest: Vec<String> = args.collect();

    let config = UstazConfig::load()?;
    let store: Arc<dyn StateStore> = Arc::new(SledStore::open(&config.data_dir)?);
    let session = Session::new(Arc::clone(&store));
    let api = Arc::new(ApiClient::new(&config, session.clone()));

    match command.as_str() {
        "login" => login(&config, &api, &rest).await,
        "register" => register(&config, &api, &rest).await,
        "logout" => {
            Auth::new(api, &config).sign_out().await?;
            println!("Сеанс аяқталды.");
            Ok(())
        }
        "refresh" => {
            api.refresh_token().await?;
            println!("Токендер жаңартылды.");
            Ok(())
        }
        "whoami" => whoami(&session),
        "health" => {
            let status = api.health_check().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        "catalog" => catalog(api, &rest).await,
        "templates" => {
            for template in TEMPLATES.iter() {
                println!("{:<16} {}  ({})", template.id, template.name_kz, template.order_url_kz());
            }
            Ok(())
        }
        "render" => render(&session, &store, &rest),
        "docs" => docs(&store, &rest),
        "schedule" => schedule(&store, &rest),
        "message" => message(&rest),
        "chat" => chat(&config, &rest).await,
        "voice" => voice(&config, &store, &rest).await,
        "wipe" => {
            store.wipe()?;
            println!("Барлық жергілікті деректер өшірілді.");
            Ok(())
        }
        _ => {
            usage();
            Ok(())
        }
    }
}

async fn login(config: &UstazConfig, api: &Arc<ApiClient>, args: &[String]) -> Result<(), CliError> {
    let [email, password] = args else {
        return Err("usage: ustaz login <email> <password>".into());
    };
    let auth = Auth::new(Arc::clone(api), config);
    let profile = auth.sign_in(email, password).await?;
    if auth.is_demo() {
        println!("Кіру сәтті (demo режим): {}", profile.full_name);
    } else {
        println!("Кіру сәтті: {}", profile.full_name);
    }
    Ok(())
}

async fn register(
    config: &UstazConfig,
    api: &Arc<ApiClient>,
    args: &[String],
) -> Result<(), CliError> {
    let (positional, flags) = split_flags(args);
    let [email, password, full_name] = positional.as_slice() else {
        return Err("usage: ustaz register <email> <password> <full name> [--school ID] [--class ID] [--phone N]".into());
    };
    let form = RegisterRequest {
        email: email.clone(),
        password: password.clone(),
        full_name: full_name.clone(),
        phone: flag_value(&flags, "--phone"),
        school_id: flag_value(&flags, "--school"),
        class_id: flag_value(&flags, "--class"),
        role: None,
    };
    let auth = Auth::new(Arc::clone(api), config);
    let profile = auth.register(&form).await?;
    if auth.is_demo() {
        println!("Тіркелу сәтті (demo режим): {}", profile.full_name);
    } else {
        println!("Тіркелу сәтті: {}", profile.full_name);
    }
    Ok(())
}

fn whoami(session: &Session) -> Result<(), CliError> {
    match session.current_user() {
        Some(user) => {
            println!("{} <{}>", user.full_name, user.email);
            if let Some(school) = user.school_id {
                println!("Мектеп: {school}");
            }
            if let Some(class) = user.class_id {
                println!("Сынып: {class}");
            }
            if session.is_demo() {
                println!("(demo режим)");
            }
        }
        None => println!("Жүйеге кірмегенсіз."),
    }
    Ok(())
}

async fn catalog(api: Arc<ApiClient>, args: &[String]) -> Result<(), CliError> {
    let (positional, flags) = split_flags(args);
    let Some(kind) = positional.first() else {
        return Err("usage: ustaz catalog <schools|classes|teachers|subjects|students>".into());
    };
    let school_id = flag_value(&flags, "--school");
    let catalog = Catalog::new(api);

    let items = match kind.as_str() {
        "schools" => catalog.schools().await,
        "classes" => catalog.classes(school_id.as_deref()).await,
        "teachers" => catalog.teachers(school_id.as_deref()).await,
        "subjects" => catalog.subjects().await,
        "students" => {
            let Some(class_id) = flag_value(&flags, "--class") else {
                return Err("usage: ustaz catalog students --class ID".into());
            };
            catalog.students(&class_id).await
        }
        other => return Err(format!("unknown catalog: {other}").into()),
    };

    for item in &items {
        println!("{:<12} {}", item.id, item.label());
    }
    info!(target: "ustaz", "{kind}: {} entries", items.len());
    Ok(())
}

fn render(
    session: &Session,
    store: &Arc<dyn StateStore>,
    args: &[String],
) -> Result<(), CliError> {
    let (positional, flags) = split_flags(args);
    let Some(template_id) = positional.first() else {
        return Err("usage: ustaz render <template> --set k=v ... [--out FILE.pdf]".into());
    };
    let Some(template) = template_by_id(template_id) else {
        return Err(format!("unknown template: {template_id} (see `ustaz templates`)").into());
    };

    let profile = session
        .current_user()
        .unwrap_or_else(|| UserProfile::from_email(""));
    let mut values: TemplateValues = ustaz_core::initial_values(template, &profile);
    for (key, value) in flag_pairs(&flags, "--set") {
        values.insert(key, value);
    }

    let missing: Vec<&str> = template
        .fields
        .iter()
        .filter(|f| f.required && values.get(f.key).map_or(true, |v| v.is_empty()))
        .map(|f| f.label_kz)
        .collect();
    if !missing.is_empty() {
        return Err(format!("міндетті өрістер бос: {}", missing.join(", ")).into());
    }

    let html = template.render(&values);
    let out = flag_value(&flags, "--out").unwrap_or_else(|| {
        format!(
            "{}-{}.pdf",
            template.id,
            chrono::Local::now().format("%Y%m%d_%H%M")
        )
    });
    save_document(Path::new(&out), template.name_kz, &html)?;

    let archive = DocumentStore::new(Arc::clone(store));
    let doc = StoredDocument::new(template.name_kz, &html, Some(out.clone()));
    let doc_id = doc.id.clone();
    archive.save(doc)?;
    archive.record(&doc_id, HistoryAction::Downloaded, Some(&out))?;

    println!("PDF жазылды: {out}");
    Ok(())
}

fn docs(store: &Arc<dyn StateStore>, args: &[String]) -> Result<(), CliError> {
    let archive = DocumentStore::new(Arc::clone(store));
    match args.first().map(String::as_str) {
        Some("list") | None => {
            for doc in archive.list() {
                println!("{}  {}  {}", doc.id, doc.created_at, doc.doc_type);
            }
        }
        Some("show") => {
            let id = args.get(1).ok_or("usage: ustaz docs show <id>")?;
            let doc = archive.get(id).ok_or("құжат табылмады")?;
            println!("{}: {}", doc.doc_type, doc.created_at);
            if let Some(path) = &doc.blob_url {
                println!("PDF: {path}");
            }
            println!("{}", doc.text);
            archive.record(id, HistoryAction::Viewed, None)?;
        }
        Some("history") => {
            let id = args.get(1).ok_or("usage: ustaz docs history <id>")?;
            let doc = archive.get(id).ok_or("құжат табылмады")?;
            for entry in &doc.history {
                match &entry.details {
                    Some(details) => {
                        println!("{}  {}  {}", entry.timestamp, entry.action.label_kz(), details)
                    }
                    None => println!("{}  {}", entry.timestamp, entry.action.label_kz()),
                }
            }
        }
        Some("search") => {
            let term = args.get(1).ok_or("usage: ustaz docs search <term>")?;
            for doc in archive.search(term) {
                println!("{}  {}  {}", doc.id, doc.created_at, doc.doc_type);
            }
        }
        Some("delete") => {
            let id = args.get(1).ok_or("usage: ustaz docs delete <id>")?;
            archive.delete(id)?;
            println!("Құжат жойылды: {id}");
        }
        Some(other) => return Err(format!("unknown docs command: {other}").into()),
    }
    Ok(())
}

fn schedule(store: &Arc<dyn StateStore>, args: &[String]) -> Result<(), CliError> {
    let table = ScheduleStore::new(Arc::clone(store));
    match args.first().map(String::as_str) {
        Some("show") | None => {
            let entries = table.entries();
            for day in DAYS {
                let mut lessons: Vec<&LessonSlot> =
                    entries.iter().filter(|s| s.day == day).collect();
                if lessons.is_empty() {
                    continue;
                }
                lessons.sort_by_key(|s| (s.period, s.class.clone()));
                println!("{day}:");
                for lesson in lessons {
                    let room = lesson.room.as_deref().unwrap_or("-");
                    println!(
                        "  {}-сабақ  {:<10} {:<6} каб. {}",
                        lesson.period, lesson.subject, lesson.class, room
                    );
                }
            }
        }
        Some("add") => {
            let [day, period, subject, class, rest @ ..] = &args[1..] else {
                return Err("usage: ustaz schedule add <day 1-6> <period 1-8> <subject> <class> [room]".into());
            };
            let slot = LessonSlot::new(
                day_name(day)?,
                parse_period(period)?,
                subject,
                class,
                rest.first().map(String::as_str),
            );
            table.upsert(slot)?;
            println!("Сабақ қосылды.");
        }
        Some("remove") => {
            let [day, period, class] = &args[1..] else {
                return Err("usage: ustaz schedule remove <day 1-6> <period 1-8> <class>".into());
            };
            table.remove(day_name(day)?, parse_period(period)?, class)?;
            println!("Сабақ өшірілді.");
        }
        Some("demo") => {
            table.load_demo()?;
            println!("Демо кесте жүктелді.");
        }
        Some("clear") => {
            table.clear()?;
            println!("Кесте тазартылды.");
        }
        Some(other) => return Err(format!("unknown schedule command: {other}").into()),
    }
    Ok(())
}

fn message(args: &[String]) -> Result<(), CliError> {
    let (positional, flags) = split_flags(args);
    let Some(id) = positional.first() else {
        return Err("usage: ustaz message <meeting|saturday|money|congrats>".into());
    };
    let Some(category) = MessageCategory::from_id(id) else {
        return Err(format!("unknown message category: {id}").into());
    };

    let mut form = MessageForm::default();
    if let Some(date) = flag_value(&flags, "--date") {
        form.date = date;
    }
    if let Some(time) = flag_value(&flags, "--time") {
        form.time = time;
    }
    if let Some(room) = flag_value(&flags, "--room") {
        form.room = room;
    }
    form.additional_info = flag_value(&flags, "--info");

    let text = category.compose(&form);
    println!("{text}");
    println!();
    println!("WhatsApp: {}", whatsapp_link(&text));
    Ok(())
}

async fn chat(config: &UstazConfig, args: &[String]) -> Result<(), CliError> {
    if args.is_empty() {
        return Err("usage: ustaz chat <text>".into());
    }
    let agent = ChatAgent::new(&config.chat_webhook_url);
    for line in agent.greetings() {
        println!("{line}");
    }
    let reply = agent.send(&args.join(" ")).await?;
    if reply.is_empty() {
        println!("(бос жауап)");
    } else {
        println!("{reply}");
    }
    Ok(())
}

async fn voice(
    config: &UstazConfig,
    store: &Arc<dyn StateStore>,
    args: &[String],
) -> Result<(), CliError> {
    let Some(path) = args.first() else {
        return Err("usage: ustaz voice <audio-file>".into());
    };
    let audio = std::fs::read(path)?;
    info!(target: "ustaz", "sending {} bytes of audio", audio.len());

    let agent = VoiceAgent::new(&config.voice_webhook_url);
    let reply = agent.send_recording(audio).await?;
    if reply.is_empty() {
        println!("Жауап бос. Қайталап көріңіз.");
        return Ok(());
    }
    if !reply.text.is_empty() {
        println!("{}", reply.text);
    }

    let archive = DocumentStore::new(Arc::clone(store));
    // Same priority as the voice page: a PDF link beats the text, the
    // text beats a bare audio reply.
    if let Some(pdf_url) = &reply.pdf_url {
        let text = if reply.text.is_empty() {
            format!("PDF URL: {pdf_url}")
        } else {
            reply.text.clone()
        };
        archive.save(StoredDocument::new(
            "AI Agent Жауабы",
            &text,
            Some(pdf_url.clone()),
        ))?;
        println!("PDF: {pdf_url}");
        println!("Есеп мұрағатқа сақталды.");
    } else if !reply.text.is_empty() {
        let out = format!("voice-{}.pdf", chrono::Local::now().format("%Y%m%d_%H%M"));
        save_document(Path::new(&out), "AI Agent Жауабы", &reply.text)?;
        archive.save(StoredDocument::new(
            "AI Agent Жауабы",
            &reply.text,
            Some(out.clone()),
        ))?;
        println!("PDF жазылды: {out}");
    } else if let Some(bytes) = reply.audio_bytes() {
        let out = format!("voice-{}.mp3", chrono::Local::now().format("%Y%m%d_%H%M"));
        std::fs::write(&out, bytes)?;
        println!("Аудио жауап жазылды: {out}");
    }
    Ok(())
}

// ---- argument plumbing ----

/// Splits `args` into positionals and `--flag value` pairs. Flags always
/// consume the following argument.
fn split_flags(args: &[String]) -> (Vec<String>, Vec<(String, String)>) {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            let value = iter.next().cloned().unwrap_or_default();
            flags.push((arg.clone(), value));
        } else {
            positional.push(arg.clone());
        }
    }
    (positional, flags)
}

fn flag_value(flags: &[(String, String)], name: &str) -> Option<String> {
    flags
        .iter()
        .find(|(flag, _)| flag == name)
        .map(|(_, value)| value.clone())
}

/// Every `--set k=v` occurrence, in order.
fn flag_pairs(flags: &[(String, String)], name: &str) -> Vec<(String, String)> {
    flags
        .iter()
        .filter(|(flag, _)| flag == name)
        .filter_map(|(_, value)| {
            value
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect()
}

/// Day argument: 1-6 or a day name as it appears in the timetable.
fn day_name(arg: &str) -> Result<&'static str, CliError> {
    if let Ok(index) = arg.parse::<usize>() {
        if (1..=DAYS.len()).contains(&index) {
            return Ok(DAYS[index - 1]);
        }
    }
    DAYS.iter()
        .find(|day| **day == arg)
        .copied()
        .ok_or_else(|| format!("unknown day: {arg} (1-6 or a day name)").into())
}

fn parse_period(arg: &str) -> Result<u8, CliError> {
    let period: u8 = arg.parse().map_err(|_| format!("invalid period: {arg}"))?;
    if PERIODS.contains(&period) {
        Ok(period)
    } else {
        Err(format!("period out of range: {period} (1-8)").into())
    }
}
