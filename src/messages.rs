use crate::schedule::LessonEntry;
use crate::weather::WeatherSnapshot;

pub const TODAY_EMPTY: &str = "Сегодня пар нет";
pub const TOMORROW_EMPTY: &str = "Завтра пар нет";

pub fn start_text() -> &'static str {
    "Привет! Я Верочка, помогаю группе не проспать пары.\n\
     Напиши /help, чтобы узнать, что я умею."
}

pub fn help_text() -> &'static str {
    "Что я умею:\n\
     /today - пары на сегодня\n\
     /tomorrow - пары на завтра\n\
     /weather - погода за окном\n\
     /newyear - новогоднее настроение\n\
     /ping - проверить, что я на связи"
}

pub fn pong_text() -> &'static str {
    "pong"
}

pub fn new_year_caption() -> &'static str {
    "С наступающим Новым годом! 🎄"
}

pub fn today_header(first_name: &str) -> String {
    format!("Сегодня, {}, эти пары:", first_name)
}

pub fn tomorrow_header(first_name: &str) -> String {
    format!("Завтра, {}, эти пары:", first_name)
}

fn lesson_line(lesson: &LessonEntry) -> String {
    let mut line = format!("{}. {} {}", lesson.number, lesson.time, lesson.title);
    if let Some(room) = &lesson.room {
        line.push_str(&format!(", ауд. {}", room));
    }
    if let Some(lecturer) = &lesson.lecturer {
        line.push_str(&format!(" ({})", lecturer));
    }
    line
}

/// `empty_header` alone when there are no lessons, otherwise the header and
/// one line per lesson in the order given.
pub fn lessons_text(lessons: &[LessonEntry], non_empty_header: &str, empty_header: &str) -> String {
    if lessons.is_empty() {
        return empty_header.to_string();
    }

    let mut text = String::from(non_empty_header);
    for lesson in lessons {
        text.push('\n');
        text.push_str(&lesson_line(lesson));
    }
    text
}

fn condition_text(code: &str) -> &str {
    match code {
        "clear" => "ясно",
        "partly-cloudy" => "малооблачно",
        "cloudy" => "облачно с прояснениями",
        "overcast" => "пасмурно",
        "light-rain" => "небольшой дождь",
        "rain" => "дождь",
        "heavy-rain" => "сильный дождь",
        "showers" => "ливень",
        "wet-snow" => "дождь со снегом",
        "light-snow" => "небольшой снег",
        "snow" => "снег",
        "snow-showers" => "снегопад",
        "hail" => "град",
        "thunderstorm" => "гроза",
        "thunderstorm-with-rain" => "дождь с грозой",
        "thunderstorm-with-hail" => "гроза с градом",
        other => other,
    }
}

pub fn weather_text(snapshot: &WeatherSnapshot) -> String {
    format!(
        "Сейчас {:+}°C, ощущается как {:+}°C, {}.\n\
         Ветер {:.1} м/с, влажность {}%, давление {} мм рт. ст.",
        snapshot.temperature,
        snapshot.feels_like,
        condition_text(&snapshot.condition),
        snapshot.wind_speed,
        snapshot.humidity,
        snapshot.pressure_mm,
    )
}
