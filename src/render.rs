//! A `Renderer` that draws to a terminal: the list as a table and the chart as horizontal bars.

use crate::aggregate::CategoryTotals;
use crate::error::Failure;
use crate::model::{Category, Expense, DATE_FORMAT};
use crate::view::{EditForm, Renderer};
use std::io::{self, Write};
use tracing::warn;

const EMPTY_LIST: &str = "No expenses to show.";
const EMPTY_CHART: &str = "No spending to chart.";
const BAR_WIDTH: usize = 30;
const RESET: &str = "\x1b[0m";

/// Draws to `W`. Writing errors are logged and otherwise ignored, since there is nowhere else to
/// show them.
pub struct TerminalRenderer<W: Write> {
    out: W,
    color: bool,
    list: bool,
    chart: bool,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    /// Draws both the list and the chart, without color.
    pub fn new(out: W) -> Self {
        Self {
            out,
            color: false,
            list: true,
            chart: true,
        }
    }

    /// Colors chart bars with their category color.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Ignores list renders, for showing only the chart.
    pub fn chart_only(mut self) -> Self {
        self.list = false;
        self.chart = true;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_list(&mut self, view: &[Expense], editing: Option<&EditForm>) -> io::Result<()> {
        if view.is_empty() {
            return writeln!(self.out, "{EMPTY_LIST}");
        }
        let id_width = view
            .iter()
            .map(|e| e.id().as_str().chars().count())
            .max()
            .unwrap_or(0)
            .max(2);
        writeln!(
            self.out,
            "{:<id_width$}  {:<10}  {:<15}  {:>12}  DESCRIPTION",
            "ID", "DATE", "CATEGORY", "AMOUNT"
        )?;
        for expense in view {
            match editing.filter(|form| form.id() == expense.id()) {
                Some(form) => self.write_form(form, id_width)?,
                None => writeln!(
                    self.out,
                    "{:<id_width$}  {:<10}  {:<15}  {:>12}  {}",
                    expense.id(),
                    format_date(expense.date()),
                    expense.category().label(),
                    expense.amount().to_string(),
                    expense.description()
                )?,
            }
        }
        Ok(())
    }

    fn write_form(&mut self, form: &EditForm, id_width: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "{:<id_width$}  [editing] amount={} category={} description=\"{}\" date={}",
            form.id(),
            form.amount(),
            form.category().label(),
            form.description(),
            format_date(form.date())
        )?;
        if let Some(error) = form.error() {
            writeln!(self.out, "{:<id_width$}  [error] {error}", "")?;
        }
        Ok(())
    }

    fn write_chart(&mut self, totals: &CategoryTotals) -> io::Result<()> {
        let total = totals.total();
        if totals.is_empty() || total.is_zero() {
            return writeln!(self.out, "{EMPTY_CHART}");
        }
        writeln!(self.out, "Spending by category (total {total})")?;
        let label_width = totals
            .iter()
            .map(|(category, _)| category.label().chars().count())
            .max()
            .unwrap_or(0);
        let whole = total.to_f64();
        for (category, amount) in totals.iter() {
            let share = if whole > 0.0 { amount.to_f64() / whole } else { 0.0 };
            let bar = "█".repeat((share * BAR_WIDTH as f64).round() as usize);
            let bar = match (self.color, ansi_color(category)) {
                (true, Some(code)) => format!("{code}{bar}{RESET}"),
                _ => bar,
            };
            writeln!(
                self.out,
                "  {:<label_width$}  {:>5.1}%  {:>12}  {bar}",
                category.label(),
                share * 100.0,
                amount.to_string()
            )?;
        }
        Ok(())
    }

    fn write_notice(&mut self, failure: &Failure) -> io::Result<()> {
        writeln!(self.out, "! {failure}")
    }

    fn finish(&mut self, result: io::Result<()>) {
        if let Err(e) = result.and_then(|_| self.out.flush()) {
            warn!("Unable to write to the terminal: {e}");
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_list(&mut self, view: &[Expense], editing: Option<&EditForm>) {
        if !self.list {
            return;
        }
        let result = self.write_list(view, editing);
        self.finish(result);
    }

    fn render_chart(&mut self, totals: &CategoryTotals) {
        if !self.chart {
            return;
        }
        let result = self.write_chart(totals);
        self.finish(result);
    }

    fn notify(&mut self, failure: &Failure) {
        let result = self.write_notice(failure);
        self.finish(result);
    }
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// The 24-bit foreground escape for the category color.
fn ansi_color(category: &Category) -> Option<String> {
    let hex = category.color().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(format!(
        "\x1b[38;2;{};{};{}m",
        channel(0)?,
        channel(2)?,
        channel(4)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::error::FailureKind;
    use crate::test::expense;
    use crate::view::EditForm;

    fn output(renderer: TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(1, "1450", Category::Housing, Some("2024-01-01")),
            expense(2, "50", Category::Food, None),
            expense(3, "0", Category::Other("Pets".to_string()), Some("2024-01-03")),
        ]
    }

    #[test]
    fn test_list_table() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render_list(&sample(), None);
        let text = output(renderer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("2024-01-01"));
        assert!(lines[1].contains("1,450.00"));
        assert!(lines[2].contains(" - "), "{}", lines[2]);
        assert!(lines[3].contains("Pets"));
    }

    #[test]
    fn test_list_columns_line_up() {
        let view = vec![
            expense(1, "5", Category::Food, Some("2024-01-01")),
            expense(100, "5", Category::Food, Some("2024-01-01")),
        ];
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render_list(&view, None);
        let text = output(renderer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].find("DATE"), Some(5), "{text}");
        assert_eq!(lines[1].find("2024-01-01"), Some(5), "{text}");
        assert_eq!(lines[2].find("2024-01-01"), Some(5), "{text}");
    }

    #[test]
    fn test_chart_width_counts_characters() {
        let view = vec![
            expense(1, "100", Category::Other("Crème brûlée".to_string()), None),
            expense(2, "100", Category::Housing, None),
        ];
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render_chart(&aggregate(&view));
        let text = output(renderer);
        let percent_at = |line: &str| line.chars().position(|c| c == '%');
        let lines: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(lines.len(), 2);
        // two spaces, the 12 character label, two spaces, then " 50.0"
        assert_eq!(percent_at(lines[0]), Some(21), "{text}");
        assert_eq!(percent_at(lines[1]), Some(21), "{text}");
    }

    #[test]
    fn test_empty_list_and_chart() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render_list(&[], None);
        renderer.render_chart(&CategoryTotals::default());
        assert_eq!(output(renderer), format!("{EMPTY_LIST}\n{EMPTY_CHART}\n"));
    }

    #[test]
    fn test_missing_category_is_uncategorized() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        let records = vec![expense(1, "5", Category::default(), None)];
        renderer.render_list(&records, None);
        renderer.render_chart(&aggregate(&records));
        let text = output(renderer);
        assert_eq!(text.matches("Uncategorized").count(), 2, "{text}");
    }

    #[test]
    fn test_edit_row_replaces_the_entry() {
        let records = sample();
        let mut form = EditForm::new(&records[1]);
        form.set(&crate::model::ExpenseUpdates {
            description: Some("groceries".to_string()),
            ..Default::default()
        });
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render_list(&records, Some(&form));
        let text = output(renderer);
        assert!(text.contains("[editing]"));
        assert!(text.contains("description=\"groceries\""));
        assert!(!text.contains("expense 2"));
    }

    #[test]
    fn test_chart_shares() {
        let records = vec![
            expense(1, "75", Category::Food, None),
            expense(2, "25", Category::Housing, None),
        ];
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render_chart(&aggregate(&records));
        let text = output(renderer);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("total 100.00"));
        assert!(lines[1].contains("Food") && lines[1].contains("75.0%"));
        assert!(lines[2].contains("Housing") && lines[2].contains("25.0%"));
        assert_eq!(lines[1].matches('█').count(), 23);
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_chart_color() {
        let records = vec![expense(1, "5", Category::Food, None)];
        let mut renderer = TerminalRenderer::new(Vec::new()).with_color(true);
        renderer.render_chart(&aggregate(&records));
        assert!(output(renderer).contains("\x1b[38;2;255;99;132m"));
    }

    #[test]
    fn test_chart_only() {
        let records = sample();
        let mut renderer = TerminalRenderer::new(Vec::new()).chart_only();
        renderer.render_list(&records, None);
        assert!(renderer.get_ref().is_empty());
        renderer.notify(&Failure::msg(FailureKind::Delete, "gone"));
        assert_eq!(output(renderer), "! Could not delete the expense: gone\n");
    }

    #[test]
    fn test_ansi_color_for_fallback() {
        assert_eq!(
            ansi_color(&Category::Other("x".to_string())).unwrap(),
            "\x1b[38;2;201;203;207m"
        );
    }
}
