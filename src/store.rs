use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::client::{ApiError, SlotApiClient};
use crate::models::{normalize, slot_id_key, Filters, SlotUpdate, TimeSlot};
use crate::views;

/// Owned board state: the canonical slot collection plus the active
/// filters. All mutation goes through `load_snapshot`, `apply_update` and
/// `set_filters`; the derived views are pure reads.
#[derive(Debug, Default)]
pub struct SlotStore {
    slots: Vec<TimeSlot>,
    filters: Filters,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Fetches a fresh snapshot and replaces the collection wholesale, in
    /// reverse server order (the most recently listed record first).
    /// Records without a usable id are dropped with a warning. On failure
    /// the stored state is left untouched.
    pub async fn load_snapshot(&mut self, client: &SlotApiClient) -> Result<()> {
        let raw = client
            .fetch_snapshot()
            .await
            .context("Error fetching time slots")?;

        let mut slots: Vec<TimeSlot> = raw
            .iter()
            .filter_map(|record| {
                let slot = normalize(record);
                if slot.is_none() {
                    warn!("Skipping time slot without id: {}", record);
                }
                slot
            })
            .collect();
        slots.reverse();

        info!("Loaded {} time slots", slots.len());
        self.slots = slots;
        Ok(())
    }

    /// Merges an incremental update into the matching slot, touching only
    /// its current capacity and category. An unknown id is a silent no-op;
    /// updates never create slots.
    pub fn apply_update(&mut self, update: &SlotUpdate) {
        let key = slot_id_key(&update.id);
        if let Some(slot) = self.slots.iter_mut().find(|s| s.id_key() == key) {
            slot.capacity.current_capacity = update.current_capacity;
            slot.category = update.category.clone();
        }
    }

    /// Replaces both filter fields unconditionally. Takes effect on the
    /// next derived-view read; snapshot and update traffic never touch
    /// the filters.
    pub fn set_filters(&mut self, color: &str, date: &str) {
        self.filters = Filters {
            color: color.to_string(),
            date: date.to_string(),
        };
    }

    pub fn grouped_by_date(&self) -> HashMap<String, Vec<TimeSlot>> {
        views::grouped_by_date(&self.slots, &self.filters)
    }

    pub fn category_counts(&self) -> HashMap<String, usize> {
        views::category_counts(&self.slots)
    }

    pub fn available_dates(&self) -> Vec<String> {
        views::available_dates(&self.slots)
    }
}

/// Consumes the live update channel until it ends or fails, merging each
/// message into the store. A malformed message is skipped; a channel
/// failure closes the subscription without reconnecting (retrying is the
/// operator's call).
pub async fn run_live_updates(store: Arc<Mutex<SlotStore>>, client: SlotApiClient) -> Result<()> {
    let mut sub = client
        .subscribe()
        .await
        .context("Error opening live update channel")?;
    info!("Live update channel open");

    while let Some(msg) = sub.next_message().await {
        match msg {
            Ok(data) => match SlotUpdate::from_message(&data) {
                Some(update) => {
                    info!(
                        "Update for slot {}: capacity {}, category {}",
                        slot_id_key(&update.id),
                        update.current_capacity,
                        update.category
                    );
                    store.lock().unwrap().apply_update(&update);
                }
                None => warn!("Skipping update without id: {}", data),
            },
            Err(e @ ApiError::Malformed { .. }) => warn!("Skipping malformed update: {e}"),
            Err(e) => {
                error!("Live update channel failed: {e}");
                break;
            }
        }
    }

    sub.close();
    info!("Live update channel closed");
    Ok(())
}
