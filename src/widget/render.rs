//! Calendar heatmap rendering for the terminal and for embeddable HTML.
//!
//! Layout mirrors the GitHub profile calendar: one column per week, one row
//! per weekday starting on Sunday, month labels above the first week in
//! which a month appears. Cell intensity comes straight from the upstream
//! `level` bucket.

use chrono::{Datelike, NaiveDate};
use console::{Style, style};
use folio_common::{ActivityPayload, ContributionDay, MAX_LEVEL};

use super::state::WidgetState;

const WEEKDAY_LABELS: [&str; 7] = ["", "Mon", "", "Wed", "", "Fri", ""];
const LEVEL_GLYPHS: [&str; 5] = ["·", "░", "▒", "▓", "█"];
const LEVEL_COLORS: [u8; 5] = [238, 22, 28, 34, 46];

pub const LOADING_TEXT: &str = "Loading GitHub activity…";

// ── Formatting helpers ────────────────────────────────────────────────

/// Group digits in threes with commas, e.g. `12345` → `12,345`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `Jan 2, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Tooltip text for one day, pluralized for 0, 1 and N.
pub fn tooltip(day: &ContributionDay) -> String {
    let date = format_date(day.date);
    match day.count {
        0 => format!("No contributions on {date}"),
        1 => format!("1 contribution on {date}"),
        n => format!("{} contributions on {date}", format_count(n)),
    }
}

fn summary_line(payload: &ActivityPayload) -> String {
    format!(
        "{} contributions in the last year · {} total ({})",
        format_count(payload.last_year_total),
        format_count(payload.all_time_total),
        payload.year_range
    )
}

// ── Grid layout ───────────────────────────────────────────────────────

/// Week-by-weekday arrangement of a contribution series.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarGrid {
    /// `weeks[w][weekday]`, weekday 0 = Sunday.
    pub weeks: Vec<[Option<ContributionDay>; 7]>,
    /// `(week index, "Jan")` for each week where a new month starts.
    pub month_labels: Vec<(usize, String)>,
}

impl CalendarGrid {
    /// Lay out `days`, which must be sorted oldest first.
    pub fn build(days: &[ContributionDay]) -> Self {
        let Some(first) = days.first() else {
            return Self {
                weeks: Vec::new(),
                month_labels: Vec::new(),
            };
        };

        let origin = first.date
            - chrono::Days::new(u64::from(first.date.weekday().num_days_from_sunday()));

        let mut weeks: Vec<[Option<ContributionDay>; 7]> = Vec::new();
        for day in days {
            let offset = (day.date - origin).num_days();
            let Ok(offset) = usize::try_from(offset) else {
                continue;
            };
            let (week, weekday) = (offset / 7, offset % 7);
            if weeks.len() <= week {
                weeks.resize(week + 1, Default::default());
            }
            weeks[week][weekday] = Some(day.clone());
        }

        let mut month_labels = Vec::new();
        let mut last_month = None;
        for (index, week) in weeks.iter().enumerate() {
            let Some(day) = week.iter().flatten().next() else {
                continue;
            };
            let month = (day.date.year(), day.date.month());
            if last_month != Some(month) {
                month_labels.push((index, day.date.format("%b").to_string()));
                last_month = Some(month);
            }
        }

        Self {
            weeks,
            month_labels,
        }
    }
}

// ── Terminal ──────────────────────────────────────────────────────────

fn level_style(level: u8) -> Style {
    Style::new().color256(LEVEL_COLORS[usize::from(level.min(MAX_LEVEL))])
}

fn level_glyph(level: u8) -> &'static str {
    LEVEL_GLYPHS[usize::from(level.min(MAX_LEVEL))]
}

/// Render any widget state for a terminal.
pub fn render_terminal(state: &WidgetState, profile_url: &str) -> String {
    match state {
        WidgetState::Loading => LOADING_TEXT.to_string(),
        WidgetState::Error(message) => format!(
            "{} {}\nView the activity directly at {}\n",
            style("Could not load GitHub activity:").red().bold(),
            message,
            style(profile_url).underlined()
        ),
        WidgetState::Success(payload) => render_calendar_terminal(payload),
    }
}

fn render_calendar_terminal(payload: &ActivityPayload) -> String {
    let grid = CalendarGrid::build(&payload.contributions);
    let mut out = String::new();

    out.push_str(&style(summary_line(payload)).bold().to_string());
    out.push('\n');

    // Month header: each week is two columns wide ("█ ").
    let mut header = String::from("     ");
    for (week, label) in &grid.month_labels {
        let column = 5 + week * 2;
        if header.len() > column {
            // Previous label still occupies this column.
            continue;
        }
        header.push_str(&" ".repeat(column - header.len()));
        header.push_str(label);
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (weekday, label) in WEEKDAY_LABELS.iter().enumerate() {
        out.push_str(&format!("{label:<4} "));
        for week in &grid.weeks {
            match &week[weekday] {
                Some(day) => out.push_str(
                    &level_style(day.level)
                        .apply_to(level_glyph(day.level))
                        .to_string(),
                ),
                None => out.push(' '),
            }
            out.push(' ');
        }
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push('\n');
    }

    out.push_str("     Less ");
    for level in 0..=MAX_LEVEL {
        out.push_str(&level_style(level).apply_to(level_glyph(level)).to_string());
        out.push(' ');
    }
    out.push_str("More\n");
    out
}

// ── HTML ──────────────────────────────────────────────────────────────

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render any widget state as an embeddable HTML fragment with ARIA roles.
pub fn render_html(state: &WidgetState, profile_url: &str) -> String {
    match state {
        WidgetState::Loading => format!(
            "<section class=\"activity-calendar\" role=\"status\" \
             aria-busy=\"true\" aria-live=\"polite\">\
             <span class=\"activity-calendar__spinner\" aria-hidden=\"true\"></span>\
             <span>{LOADING_TEXT}</span></section>\n"
        ),
        WidgetState::Error(message) => format!(
            "<section class=\"activity-calendar activity-calendar--error\" \
             role=\"alert\" aria-live=\"assertive\">\
             <p>{}</p>\
             <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">\
             View activity on GitHub</a>\
             </section>\n",
            escape_html(message),
            escape_html(profile_url)
        ),
        WidgetState::Success(payload) => render_calendar_html(payload),
    }
}

fn render_calendar_html(payload: &ActivityPayload) -> String {
    let grid = CalendarGrid::build(&payload.contributions);
    let mut out = String::from("<section class=\"activity-calendar\">\n");

    out.push_str(&format!(
        "<p class=\"activity-calendar__summary\"><strong>{}</strong> \
         contributions in the last year · \
         <strong>{}</strong> total ({})</p>\n",
        format_count(payload.last_year_total),
        format_count(payload.all_time_total),
        escape_html(&payload.year_range)
    ));

    out.push_str(
        "<table class=\"activity-calendar__grid\" aria-label=\"Contribution calendar\">\n",
    );
    out.push_str("<thead><tr><td></td>");
    for (i, (week, label)) in grid.month_labels.iter().enumerate() {
        let next = grid
            .month_labels
            .get(i + 1)
            .map(|(w, _)| *w)
            .unwrap_or(grid.weeks.len());
        out.push_str(&format!(
            "<th scope=\"colgroup\" colspan=\"{}\">{}</th>",
            next - week,
            label
        ));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for (weekday, label) in WEEKDAY_LABELS.iter().enumerate() {
        out.push_str(&format!("<tr><th scope=\"row\">{label}</th>"));
        for week in &grid.weeks {
            match &week[weekday] {
                Some(day) => out.push_str(&format!(
                    "<td class=\"day\" data-date=\"{}\" data-level=\"{}\" title=\"{}\"></td>",
                    day.date,
                    day.level,
                    escape_html(&tooltip(day))
                )),
                None => out.push_str("<td></td>"),
            }
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n</section>\n");
    out
}
