use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::client::SlotApiClient;
use crate::models::TimeSlot;
use crate::store::{self, SlotStore};

/// Fetch one snapshot and print the board.
pub async fn run_show(base_url: &str, color: &str, date: &str, verbose: bool) -> Result<()> {
    let client = SlotApiClient::new(base_url)?;

    let mut store = SlotStore::new();
    store.load_snapshot(&client).await?;
    store.set_filters(color, date);

    if verbose {
        println!("{}", serde_json::to_string_pretty(store.slots())?);
    }

    print_board(&store);
    Ok(())
}

/// Fetch a snapshot, then keep the board in sync with the live update
/// channel until it ends or fails.
pub async fn run_watch(base_url: &str, color: &str, date: &str) -> Result<()> {
    let client = SlotApiClient::new(base_url)?;

    let mut store = SlotStore::new();
    store.load_snapshot(&client).await?;
    store.set_filters(color, date);
    print_board(&store);

    let store = Arc::new(Mutex::new(store));
    store::run_live_updates(Arc::clone(&store), client).await?;

    // The channel ended; show where the board landed.
    print_board(&store.lock().unwrap());
    Ok(())
}

fn print_board(store: &SlotStore) {
    let counts = store.category_counts();
    let mut labels: Vec<&String> = counts.keys().collect();
    labels.sort();
    print!("Categories:");
    for label in &labels {
        print!("  {}: {}", label, counts[*label]);
    }
    println!();

    let dates = store.available_dates();
    if dates.is_empty() {
        println!("No time slots loaded.");
        return;
    }
    println!("Dates: {}", dates.join(", "));

    let groups = store.grouped_by_date();
    if groups.is_empty() {
        println!("\nNo time slots match the current filters.");
        return;
    }

    for date in &dates {
        if let Some(slots) = groups.get(date) {
            println!("\n{date}");
            for slot in slots {
                print_slot(slot);
            }
        }
    }
}

fn print_slot(slot: &TimeSlot) {
    println!(
        "  {} to {} — {} ({}/{})",
        slot.start_time,
        slot.end_time,
        slot.category,
        slot.capacity.current_capacity,
        slot.capacity.max_capacity
    );
}
