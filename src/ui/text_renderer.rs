//! Plain-text rendering of screen views for the terminal

use super::navigation::{Route, TabEntry};
use super::presentation::MetricRow;
use super::screens::{DetailCard, ScreenView};
use std::fmt::Write;

const WIDTH: usize = 44;

/// Render a full frame: view, then the tab bar with `active` marked
pub fn render_frame(view: &ScreenView, tabs: &[TabEntry], active: Route) -> String {
    let mut out = render_view(view);
    out.push_str(&rule());
    out.push_str(&render_tabs(tabs, active));
    out
}

pub fn render_view(view: &ScreenView) -> String {
    match view {
        ScreenView::Summary {
            title,
            section,
            rows,
        } => render_summary(title, section, rows),
        ScreenView::Detail(card) => render_detail(card),
    }
}

fn rule() -> String {
    format!("{}\n", "-".repeat(WIDTH))
}

fn render_summary(title: &str, section: &str, rows: &[MetricRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    out.push_str(&rule());
    let _ = writeln!(out, "{}", section);
    for row in rows {
        let chevron = if row.is_navigable { " >" } else { "" };
        let label = format!("{} {}", row.icon, row.label);
        let _ = writeln!(
            out,
            "  {:<width$}{:>8}{}",
            label,
            row.display_value,
            chevron,
            width = WIDTH - 12
        );
        if let Some(sub_label) = &row.sub_label {
            let _ = writeln!(out, "    {}", sub_label);
        }
    }
    out
}

fn render_detail(card: &DetailCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", card.back_icon, card.header);
    out.push_str(&rule());
    let _ = writeln!(out, "{} {}", card.icon, card.title);
    let _ = writeln!(out, "  {}", card.status);
    let _ = writeln!(out, "  {}", card.value);
    let _ = writeln!(out, "  {}", card.caption);
    out
}

fn render_tabs(tabs: &[TabEntry], active: Route) -> String {
    let labels: Vec<String> = tabs
        .iter()
        .map(|tab| {
            if tab.route == active {
                format!("*{}*", tab.title)
            } else {
                tab.title.to_string()
            }
        })
        .collect();
    format!("{}\n", labels.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::icons::{icons, IconName};
    use crate::ui::navigation::tabs;
    use efishpond_types::MetricKey;

    #[test]
    fn test_detail_lines() {
        let card = DetailCard {
            key: MetricKey::Ph,
            header: "e-FishPond",
            back_icon: icons().symbol(IconName::ChevronLeft),
            title: "pH Level",
            icon: icons().metric_image(MetricKey::Ph),
            status: "pH Active",
            value: "7.1".to_string(),
            caption: "Optimal: 6.5 - 7.5",
            loading: false,
        };
        let text = render_view(&ScreenView::Detail(card));
        assert!(text.starts_with("[material:chevron-left] e-FishPond\n"));
        assert!(text.contains("[img:images/ph-optimal.png] pH Level\n"));
        assert!(text.contains("  7.1\n"));
        assert!(text.contains("  Optimal: 6.5 - 7.5\n"));
    }

    #[test]
    fn test_tab_bar_marks_active() {
        let text = render_tabs(&tabs(icons()), Route::OxygenDetail);
        assert_eq!(text, "Home | pH Level | Temperature | *Oxygen* | Feeder\n");
    }

    #[test]
    fn test_summary_header_lines() {
        let view = ScreenView::Summary {
            title: "e-FishPond",
            section: "Water Quality",
            rows: Vec::new(),
        };
        assert_eq!(render_view(&view).lines().nth(2), Some("Water Quality"));
    }
}
