use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use super::views::render_page;
use super::AppState;
use crate::models::TimeSlot;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FilterParams {
    #[serde(default)]
    pub(crate) color: String,
    #[serde(default)]
    pub(crate) date: String,
}

pub(super) struct SlotRow {
    pub(super) start: String,
    pub(super) end: String,
    pub(super) category: String,
    pub(super) current: u32,
    pub(super) max: u32,
}

impl From<&TimeSlot> for SlotRow {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            start: slot.start_time.clone(),
            end: slot.end_time.clone(),
            category: slot.category.clone(),
            current: slot.capacity.current_capacity,
            max: slot.capacity.max_capacity,
        }
    }
}

pub(super) struct BoardView {
    pub(super) color: String,
    pub(super) date: String,
    pub(super) counts: Vec<(String, usize)>,
    pub(super) dates: Vec<String>,
    /// Groups in ascending date order; the store's grouping is unordered.
    pub(super) groups: Vec<(String, Vec<SlotRow>)>,
}

pub(crate) async fn dashboard_handler(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Html<String> {
    let board = {
        let mut store = state.store.lock().unwrap();
        store.set_filters(&params.color, &params.date);

        let mut counts: Vec<(String, usize)> = store.category_counts().into_iter().collect();
        counts.sort();

        let dates = store.available_dates();
        let groups_by_date = store.grouped_by_date();
        let groups = dates
            .iter()
            .filter_map(|date| {
                groups_by_date
                    .get(date)
                    .map(|slots| (date.clone(), slots.iter().map(SlotRow::from).collect()))
            })
            .collect();

        BoardView {
            color: params.color,
            date: params.date,
            counts,
            dates,
            groups,
        }
    };

    Html(render_page(&board))
}
