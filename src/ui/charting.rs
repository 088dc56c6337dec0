use ratatui::style::Color;

use crate::report::Series;
use crate::util::format_number;

/// Performance percentages always plot on a fixed scale.
pub const PERCENT_BOUNDS: [f64; 2] = [0.0, 100.0];

const PALETTE: [Color; 6] = [
    Color::Magenta,
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Red,
];

/// X bounds covering every row index, at least one unit wide.
pub fn x_bounds(series: &[Series]) -> [f64; 2] {
    let last = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.row))
        .max()
        .unwrap_or(0);
    [0.0, last.max(1) as f64]
}

/// First and last date, or a single label when they coincide.
pub fn date_axis_labels(dates: &[String]) -> Vec<String> {
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) if first != last => vec![first.clone(), last.clone()],
        (Some(only), _) => vec![only.clone()],
        _ => Vec::new(),
    }
}

pub fn series_color(idx: usize) -> Color {
    PALETTE[idx % PALETTE.len()]
}

/// "name  mean 70  sd 10" for the chart legend.
pub fn series_summary(series: &Series) -> String {
    match (series.mean(), series.std_dev()) {
        (Some(mean), Some(sd)) => format!(
            "{}  mean {}  sd {}",
            series.name,
            format_number(mean),
            format_number(sd)
        ),
        _ => format!("{}  no values", series.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Point;

    fn series(name: &str, points: &[(usize, f64)]) -> Series {
        Series {
            name: name.to_string(),
            points: points.iter().map(|&(row, value)| Point::new(row, value)).collect(),
        }
    }

    #[test]
    fn x_bounds_cover_last_row() {
        let s = [series("a %", &[(0, 10.0), (4, 20.0)]), series("b %", &[(2, 5.0)])];
        assert_eq!(x_bounds(&s), [0.0, 4.0]);
        assert_eq!(x_bounds(&[]), [0.0, 1.0]);
    }

    #[test]
    fn date_labels_use_ends() {
        let dates: Vec<String> = ["2024-03-01", "2024-03-02", "2024-03-09"]
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(date_axis_labels(&dates), ["2024-03-01", "2024-03-09"]);
        assert_eq!(date_axis_labels(&dates[..1]), ["2024-03-01"]);
        assert!(date_axis_labels(&[]).is_empty());
    }

    #[test]
    fn summary_formats_stats() {
        let s = series("ball %", &[(0, 60.0), (1, 80.0)]);
        assert_eq!(series_summary(&s), "ball %  mean 70  sd 10");
        assert_eq!(series_summary(&series("cup %", &[])), "cup %  no values");
    }
}
