//! Terminal rendering of the bucketed agenda.
//!
//! All colour choices live in an injected `Palette` so the scheduling core
//! stays free of presentation state. Output is assembled as a string first;
//! the `print_*` wrappers only write it out.

use chrono::{DateTime, Local};
use crossterm::style::{Color, Stylize};

use crate::schedule::{Agenda, Severity};
use crate::task::Item;

const DUE_WIDTH: usize = 21;
const NAME_WIDTH: usize = 30;
const WIDE_NAME_WIDTH: usize = 50;

/// Colour assignments for every element of the list output.
#[derive(Debug, Clone)]
pub struct Palette {
    pub title: Color,
    pub section: Color,
    pub id: Color,
    pub overdue: Color,
    pub today: Color,
    pub soon: Color,
    pub later: Color,
    pub high: Color,
    pub normal: Color,
    pub low: Color,
    pub tags: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            title: Color::Cyan,
            section: Color::Grey,
            id: Color::DarkGrey,
            overdue: Color::Red,
            today: Color::DarkRed,
            soon: Color::Yellow,
            later: Color::Green,
            high: Color::Red,
            normal: Color::Yellow,
            low: Color::Green,
            tags: Color::Grey,
        }
    }
}

impl Palette {
    fn due_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Overdue => self.overdue,
            Severity::Today => self.today,
            Severity::Soon => self.soon,
            Severity::Later => self.later,
        }
    }

    fn priority_color(&self, item: &Item) -> Color {
        match item.priority {
            crate::fields::Priority::High => self.high,
            crate::fields::Priority::Normal => self.normal,
            crate::fields::Priority::Low => self.low,
        }
    }
}

/// Print the full agenda: a header line, then one section per non-empty
/// bucket in urgency order.
pub fn print_agenda(agenda: &Agenda, pending_count: usize, id_width: usize, now: DateTime<Local>, palette: &Palette) {
    print!("{}", render_agenda(agenda, pending_count, id_width, now, palette));
}

/// Build the agenda text. Non-empty sections after the first are preceded by
/// a blank separator line.
pub fn render_agenda(
    agenda: &Agenda,
    pending_count: usize,
    id_width: usize,
    now: DateTime<Local>,
    palette: &Palette,
) -> String {
    let mut out = String::new();
    let date = now.format("%A %B %-d, %Y (%-m/%-d/%y) %-I:%M%P");
    out.push_str(&format!(
        "{} {} {}\n",
        format!("{pending_count} Items To Do").with(palette.title).bold(),
        "|".bold(),
        format!("{date}").with(palette.soon)
    ));

    if pending_count == 0 {
        out.push_str(&format!(
            "Nothing left to do! Use {} to add more items.\n\n",
            "wtodo add".with(palette.section)
        ));
        return out;
    }

    let mut first = true;
    render_section(&mut out, "OVERDUE", &agenda.overdue, Severity::Overdue, id_width, palette, &mut first);
    render_section(&mut out, "DO TODAY", &agenda.today, Severity::Today, id_width, palette, &mut first);
    render_section(&mut out, "DO SOON", &agenda.soon, Severity::Soon, id_width, palette, &mut first);
    render_section(&mut out, "DO LATER (>1 week)", &agenda.later, Severity::Later, id_width, palette, &mut first);
    out.push('\n');
    out
}

fn render_section(
    out: &mut String,
    header: &str,
    items: &[&Item],
    severity: Severity,
    id_width: usize,
    palette: &Palette,
    first: &mut bool,
) {
    if items.is_empty() {
        return;
    }
    if !*first {
        out.push('\n');
    }
    *first = false;
    out.push_str(&format!("{}\n", header.with(palette.section)));
    for item in items {
        render_item(out, item, severity, id_width, palette);
    }
}

/// Render one list row: id, due date, priority marks, name with length
/// letter, then tags. Never-due rows drop the due column and let the name
/// take the freed width.
fn render_item(out: &mut String, item: &Item, severity: Severity, id_width: usize, palette: &Palette) {
    let (due_text, name_width) = match item.due {
        Some(due) => (format!("{}", due.format("%a %-m/%-d/%y %-I:%M%P")), NAME_WIDTH),
        None => (String::new(), WIDE_NAME_WIDTH),
    };
    let due_width = if item.due.is_some() { DUE_WIDTH } else { 0 };

    let marks = "!".repeat(item.priority.rank() as usize);
    let name = format!("{} ({})", clip_name(&item.name), item.length.letter());

    out.push_str(&format!(
        "  {}. {} {} {} {}\n",
        format!("{:>id_width$}", item.id).with(palette.id),
        format!("{due_text:<due_width$}").with(palette.due_color(severity)),
        format!("{marks:<3}").with(palette.priority_color(item)),
        format!("{name:<name_width$}").bold(),
        item.tags.join(",").with(palette.tags)
    ));
}

/// Truncate names longer than the wide column, marking the cut.
fn clip_name(name: &str) -> String {
    if name.chars().count() <= WIDE_NAME_WIDTH {
        return name.to_string();
    }
    let mut clipped: String = name.chars().take(WIDE_NAME_WIDTH - 3).collect();
    clipped.push_str("...");
    clipped
}

/// Plain listing of finished items, shown under `list --done`.
pub fn print_done(done: &[&Item], id_width: usize, palette: &Palette) {
    print!("{}", render_done(done, id_width, palette));
}

pub fn render_done(done: &[&Item], id_width: usize, palette: &Palette) -> String {
    let mut out = String::new();
    if done.is_empty() {
        return out;
    }
    out.push_str(&format!("{}\n", "FINISHED".with(palette.section)));
    for item in done {
        render_item(&mut out, item, Severity::Later, id_width, palette);
    }
    out.push('\n');
    out
}
