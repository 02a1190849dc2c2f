//! Chat message formatting.
//!
//! Every text the bot sends is built here so the wording lives in one
//! place. Functions are pure; anything random (the space emoji, the cat
//! joke) is decided by the caller and passed in.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

use crate::event::{CalendarEvent, EventPhase};
use crate::funding::Finances;
use crate::occupancy::Occupancy;
use crate::status::SpaceStatus;
use crate::time::{ansic, same_local_day, weekday_name};

/// Reply to `/status` before the first sensor reading.
pub const UNKNOWN_STATUS: &str = "Nao sei qual o estado do LHC.";

/// Reply to `/quém`.
pub const DUCK: &str = "🦆";

/// Reply to `/boo`.
pub const GHOST: &str = "👻";

/// Emojis picked at random for occupancy replies.
pub const SPACE_EMOJIS: [&str; 4] = ["🌌", "🚀", "🛸", "🛰"];

/// Sent when the finance endpoint cannot be read.
pub const FINANCE_ERROR: &str = "Não consegui pegar as finanças do LHC";

/// Broadcast once a month when expenses are covered.
pub const FUNDING_NOTICE: &str =
    "🎉 Conseguimos a grana pra manter o LHC aberto esse mês!  Mais detalhes: /grana";

/// Labels of the default event sources, in priority order.
pub const DEFAULT_SOURCE_LABELS: [&str; 4] =
    ["calendário público", "MeetUp", "Facebook", "Wiki do LHC"];

const DISCOVERY_GAVE_UP: &str = "Pegar a lista de eventos demorou demais e eu desisti.";

const DONATION_LINK: &str =
    "Ajude a fechar as contas do mês [fazendo uma doação via PayPal](http://bit.ly/doe-para-o-lhc).";

/// Cells in the finance progress bar.
pub const PROGRESS_BAR_WIDTH: usize = 15;

fn state_word(open: bool) -> &'static str {
    if open { "aberto🔓" } else { "fechado🔒" }
}

fn since(status: &SpaceStatus, tz: Tz) -> String {
    status
        .last_change_utc()
        .map(|at| ansic(at, tz))
        .unwrap_or_else(|| "desconhecido".to_string())
}

/// "O LHC está aberto🔓 desde Tue Sep 12 21:00:00 2017."
pub fn status_message(status: &SpaceStatus, tz: Tz) -> String {
    format!(
        "O LHC está {} desde {}.",
        state_word(status.open),
        since(status, tz)
    )
}

/// Announcement for an opening where the people present are known.
pub fn opened_by_message(names: &[String], status: &SpaceStatus, tz: Tz) -> String {
    format!(
        "O LHC foi aberto🔓 por {} às {}.",
        names.join(", "),
        since(status, tz)
    )
}

/// Reply to `/historico`.
pub fn history_message(channel_id: u64) -> String {
    format!("Para ver o histórico, acesse: https://thingspeak.com/channels/{channel_id}")
}

/// Reply to `/quem`.
///
/// `cat` only matters when exactly one unknown device is present alongside
/// known people: it turns the unknown person into a cat.
pub fn occupancy_message(occupancy: &Occupancy, emoji: &str, cat: bool) -> String {
    let mut msg = if occupancy.has_known() {
        format!(
            "Pessoas conhecidas no espaço{emoji}: {}",
            occupancy.who.join(", ")
        )
    } else {
        "Não tem nenhuma pessoa conhecida lá".to_string()
    };

    match occupancy.unknown_devices {
        0 => {}
        1 if occupancy.has_known() && cat => msg.push_str(". Mais um gato🐈, provavelmente"),
        1 => msg.push_str(". Mais uma pessoa desconhecida"),
        n => msg.push_str(&format!(". Mais {n} pessoas desconhecidas")),
    }
    msg
}

/// Reply to `/quem` when the occupancy endpoint fails.
pub fn occupancy_error(emoji: &str) -> String {
    format!("Não consegui pegar a lista de membros no espaço{emoji}")
}

/// Announcement for the event chosen by discovery. The text is Markdown.
pub fn event_message(
    event: &CalendarEvent,
    phase: EventPhase,
    now: DateTime<Utc>,
    tz: Tz,
) -> String {
    if phase == EventPhase::InProgress {
        return format!("Tá rolando agora: {}", event.title);
    }

    let start = event.start.with_timezone(&tz);
    let mut msg = if same_local_day(event.start, now, tz) {
        format!("Hoje tem \"{}\"", event.title)
    } else {
        format!(
            "Vai rolar \"{}\" no dia {:02}/{:02} ({})",
            event.title,
            start.day(),
            start.month(),
            weekday_name(start.weekday())
        )
    };
    msg.push_str(&format!(" às {:02}:{:02}", start.hour(), start.minute()));
    if let Some(location) = &event.location {
        msg.push_str(&format!(" em {location}"));
    }
    msg
}

/// Apology sent when no source produced an event.
///
/// `attempted` are the labels of the sources that were tried, in order.
pub fn discovery_failure<S: AsRef<str>>(attempted: &[S]) -> String {
    let labels: Vec<&str> = attempted.iter().map(AsRef::as_ref).collect();
    match labels.split_last() {
        None => DISCOVERY_GAVE_UP.to_string(),
        Some((only, [])) => format!("{DISCOVERY_GAVE_UP} Eu procurei no {only}."),
        Some((last, rest)) => format!(
            "{DISCOVERY_GAVE_UP} Eu procurei no {}, e no {last}.",
            rest.join(", ")
        ),
    }
}

/// Reply to `/grana`.
pub fn finance_message(finances: &Finances) -> String {
    if finances.has_positive_cash_flow() {
        format!(
            "Temos fluxo positivo de caixa esse mês!🎉 Recebemos R${:.2} de R${:.2}",
            finances.income, finances.expenses
        )
    } else {
        format!(
            "Este mês recebemos R${:.2} de R${:.2}💸.\n\n{}\n\n{DONATION_LINK}",
            finances.income,
            finances.expenses,
            progress_bar(finances.income, finances.expenses)
        )
    }
}

/// A bar of [`PROGRESS_BAR_WIDTH`] cells, `█` for the covered share.
///
/// The painted share is clamped to the bar; a non-positive `max` paints
/// the whole bar.
pub fn progress_bar(current: f64, max: f64) -> String {
    let painted = if max <= 0.0 {
        PROGRESS_BAR_WIDTH
    } else {
        // NaN saturates to zero.
        (PROGRESS_BAR_WIDTH as f64 * current / max)
            .floor()
            .clamp(0.0, PROGRESS_BAR_WIDTH as f64) as usize
    };
    let mut bar = "█".repeat(painted);
    bar.push_str(&"░".repeat(PROGRESS_BAR_WIDTH - painted));
    bar
}
