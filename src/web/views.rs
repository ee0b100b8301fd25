use leptos::prelude::*;

use super::dashboard::{BoardView, SlotRow};

const STYLE: &str = include_str!("../style.css");

pub(super) fn render_page(board: &BoardView) -> String {
    let counts_html = render_count_badges(&board.counts, &board.color, &board.date);
    let dates_html = render_date_links(&board.dates, &board.color, &board.date);
    let groups_html = render_groups(&board.groups);
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let filter_status = match (board.color.is_empty(), board.date.is_empty()) {
        (true, true) => "Showing all slots".to_string(),
        (false, true) => format!("Category: {}", board.color),
        (true, false) => format!("Date: {}", board.date),
        (false, false) => format!("Category: {}, date: {}", board.color, board.date),
    };

    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <title>"Slot Board"</title>
                <style>{STYLE}</style>
            </head>
            <body>
                <h1>"Slot Board"</h1>
                <p class="timestamp">"Updated: " {now}</p>
                <p class="filter-status">{filter_status}</p>
                <section>
                    <h2>"Categories"</h2>
                    <div inner_html=counts_html />
                </section>
                <section>
                    <h2>"Dates"</h2>
                    <div inner_html=dates_html />
                </section>
                <div inner_html=groups_html />
            </body>
        </html>
    }
    .to_html()
}

fn filter_href(color: &str, date: &str) -> String {
    format!(
        "/?color={}&date={}",
        urlencoding::encode(color),
        urlencoding::encode(date)
    )
}

/// One badge per category; clicking a badge toggles that color filter.
fn render_count_badges(counts: &[(String, usize)], active_color: &str, date: &str) -> String {
    let badges: String = counts
        .iter()
        .map(|(label, count)| {
            let active = label == active_color;
            let css = if active {
                format!("badge {label} active")
            } else {
                format!("badge {label}")
            };
            let href = filter_href(if active { "" } else { label }, date);
            let text = format!("{label}: {count}");
            view! { <a class=css href=href>{text}</a> }.to_html()
        })
        .collect();

    view! { <div class="badges" inner_html=badges /> }.to_html()
}

/// One link per available date; clicking a date toggles that date filter.
fn render_date_links(dates: &[String], color: &str, active_date: &str) -> String {
    if dates.is_empty() {
        return view! { <p class="empty">"No dates available."</p> }.to_html();
    }

    let links: String = dates
        .iter()
        .map(|date| {
            let active = date == active_date;
            let css = if active { "date active" } else { "date" }.to_string();
            let href = filter_href(color, if active { "" } else { date });
            let text = date.clone();
            view! { <a class=css href=href>{text}</a> }.to_html()
        })
        .collect();

    view! { <div class="dates" inner_html=links /> }.to_html()
}

fn render_groups(groups: &[(String, Vec<SlotRow>)]) -> String {
    if groups.is_empty() {
        return view! { <p class="empty">"No time slots match the current filters."</p> }
            .to_html();
    }

    groups
        .iter()
        .map(|(date, slots)| {
            let rows_html: String = slots.iter().map(render_slot_row).collect();
            let date = date.clone();
            view! {
                <section>
                    <h2>{date}</h2>
                    <table>
                        <thead>
                            <tr>
                                <th>"Start"</th>
                                <th>"End"</th>
                                <th>"Category"</th>
                                <th>"Capacity"</th>
                            </tr>
                        </thead>
                        <tbody inner_html=rows_html />
                    </table>
                </section>
            }
            .to_html()
        })
        .collect()
}

fn render_slot_row(slot: &SlotRow) -> String {
    let category_css = format!("category {}", slot.category);
    let capacity_text = format!("{}/{}", slot.current, slot.max);
    let capacity_css = if slot.current >= slot.max {
        "capacity full"
    } else {
        "capacity available"
    }
    .to_string();
    let start = slot.start.clone();
    let end = slot.end.clone();
    let category = slot.category.clone();

    view! {
        <tr>
            <td>{start}</td>
            <td>{end}</td>
            <td class=category_css>{category}</td>
            <td class=capacity_css>{capacity_text}</td>
        </tr>
    }
    .to_html()
}
