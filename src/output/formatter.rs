use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::clan::{Member, MemberRatings, Role};
use crate::scoring::{mean, quantile, WeightSet};
use crate::sheets::Grid;

/// Columns of the ranking file and the rating sheet
pub const RANKING_HEADER: [&str; 10] = [
    "rank",
    "tag",
    "name",
    "rating",
    "ladder",
    "current_war",
    "war_history",
    "avg_fame",
    "current_season",
    "previous_season",
];

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a number without decimals; missing values stay empty
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.0}", v),
        _ => String::new(),
    }
}

fn numeric_columns(ratings: &MemberRatings) -> [Option<f64>; 7] {
    [
        Some(ratings.rating),
        Some(ratings.ladder),
        Some(ratings.current_war),
        ratings.war_history,
        ratings.avg_fame,
        Some(ratings.current_season),
        Some(ratings.previous_season),
    ]
}

/// Ranking table, best first, followed by the mean, p75, p50 and p25 of every
/// numeric column.
pub fn ranking_grid(ranked: &[Member]) -> Grid {
    let mut grid: Grid = vec![RANKING_HEADER.iter().map(|h| h.to_string()).collect()];
    let rated: Vec<(&Member, MemberRatings)> = ranked
        .iter()
        .filter_map(|m| m.ratings.map(|r| (m, r)))
        .collect();

    for (rank, (member, ratings)) in rated.iter().enumerate() {
        let mut row = vec![(rank + 1).to_string(), member.tag.clone(), member.name.clone()];
        row.extend(numeric_columns(ratings).into_iter().map(format_value));
        grid.push(row);
    }

    let columns: Vec<Vec<f64>> = (0..7)
        .map(|i| {
            rated
                .iter()
                .filter_map(|(_, r)| numeric_columns(r)[i])
                .filter(|v| !v.is_nan())
                .collect()
        })
        .collect();

    let summaries: [(&str, fn(&[f64]) -> Option<f64>); 4] = [
        ("mean", mean),
        ("p75", |v| quantile(v, 0.75)),
        ("p50", |v| quantile(v, 0.50)),
        ("p25", |v| quantile(v, 0.25)),
    ];
    for (label, statistic) in summaries {
        let mut row = vec![label.to_string(), String::new(), String::new()];
        row.extend(columns.iter().map(|values| format_value(statistic(values))));
        grid.push(row);
    }
    grid
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format the ranking as a table: Index, Rating, Name, Tag, component scores
/// Index column: 3 chars (fits "50."), right-aligned
/// Score columns are right-aligned, 5 chars wide (fits "2000")
pub fn format_ranking_table(ranked: &[Member], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No clan members found.".to_string();
    }

    let name_width = ranked
        .iter()
        .map(|m| m.name.chars().count())
        .max()
        .unwrap_or(0);
    let tag_width = ranked.iter().map(|m| m.tag.len()).max().unwrap_or(0);

    // index 4 + rating 7 + tag + 6 score columns of 6
    let fixed_width = 4 + 7 + tag_width + 2 + 6 * 6;
    let name_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => name_width.min(width - fixed_width - 2),
        Some(_) => name_width.min(12),
        None => name_width,
    };

    let header = format!(
        "{:>3} {:>6}  {:<nw$}  {:<tw$} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5}",
        "#",
        "rating",
        "name",
        "tag",
        "ladr",
        "war",
        "hist",
        "fame",
        "seas",
        "prev",
        nw = name_width,
        tw = tag_width
    );

    let lines = ranked.iter().enumerate().map(|(idx, member)| {
        let ratings = member.ratings;
        let cell = |f: fn(&MemberRatings) -> Option<f64>| {
            format!("{:>5}", format_value(ratings.as_ref().and_then(f)))
        };
        let index_str = format!("{:>2}.", idx + 1);
        let rating_str = format!("{:>6}", format_value(member.rating()));
        let name = format!("{:<width$}", truncate_name(&member.name, name_width), width = name_width);
        let tag = format!("{:<width$}", member.tag, width = tag_width);
        let scores = [
            cell(|r| Some(r.ladder)),
            cell(|r| Some(r.current_war)),
            cell(|r| r.war_history),
            cell(|r| r.avg_fame),
            cell(|r| Some(r.current_season)),
            cell(|r| Some(r.previous_season)),
        ]
        .join(" ");

        if use_colors {
            let name = if member.role == Role::Elevated {
                name.cyan().to_string()
            } else {
                name
            };
            format!(
                "{} {}  {}  {} {}",
                index_str.dimmed(),
                rating_str.bold(),
                name,
                tag.dimmed(),
                scores
            )
        } else {
            format!("{} {}  {}  {} {}", index_str, rating_str, name, tag, scores)
        }
    });

    std::iter::once(header).chain(lines).collect::<Vec<_>>().join("\n")
}

/// One line per weight, e.g. for the `check` command
pub fn format_weights(weights: &WeightSet) -> String {
    weights
        .named()
        .iter()
        .map(|(name, w)| format!("{:<26}{:.4}", name, w))
        .collect::<Vec<_>>()
        .join("\n")
}
