use classifier_core::{ProbabilityRow, StatusView, STYLE_ERROR};

const BAR_WIDTH: usize = 30;

pub fn status_line(view: &StatusView) -> Option<String> {
    match view {
        StatusView::Idle => None,
        StatusView::Busy => Some("Predicting...".to_string()),
        StatusView::Notice { style, text } if style == STYLE_ERROR => Some(format!("Error: {text}")),
        StatusView::Notice { style, text } if style.is_empty() => Some(text.clone()),
        StatusView::Notice { style, text } => Some(format!("[{style}] {text}")),
    }
}

pub fn chart_lines(rows: &[ProbabilityRow]) -> Vec<String> {
    let label_width = rows.iter().map(|row| row.class.len()).max().unwrap_or(0);
    rows.iter()
        .map(|row| {
            let filled = (row.probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
            let marker = if row.predicted { '*' } else { ' ' };
            format!(
                "{marker} {:<label_width$} |{}{}| {:>5.1}%",
                row.class,
                "#".repeat(filled),
                " ".repeat(BAR_WIDTH - filled),
                row.probability * 100.0,
            )
        })
        .collect()
}
