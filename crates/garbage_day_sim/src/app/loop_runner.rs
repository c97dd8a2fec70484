use std::process::ExitCode;

use garbage_day::{
    GameDate, GarbageDay, InteractionEvent, LootTables, OpenOutcome, ParticipantId, CHECKED_STAT,
};
use tracing::{error, info, warn};

use super::bootstrap::AppWiring;
use super::save::{write_save, SaveError, SaveGame};
use super::world::SimWorld;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) days: u32,
    pub(crate) cans_opened: usize,
    pub(crate) items_taken: usize,
    pub(crate) items_granted: usize,
    pub(crate) items_dropped: usize,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_days(app) {
        Ok((summary, final_date)) => {
            info!(
                days = summary.days,
                cans_opened = summary.cans_opened,
                items_taken = summary.items_taken,
                items_granted = summary.items_granted,
                items_dropped = summary.items_dropped,
                next_date = %final_date,
                "simulation_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "simulation_failed");
            ExitCode::FAILURE
        }
    }
}

/// Serves every map asset once, then plays `app.days` days, saving after
/// each night. Returns the summary and the date the next run resumes on.
pub(crate) fn run_days(mut app: AppWiring) -> Result<(RunSummary, GameDate), SaveError> {
    load_assets(&mut app);

    let mut summary = RunSummary::default();
    let mut date = app.start_date;
    for _ in 0..app.days {
        simulate_day(&mut app.session, &mut app.world, date, &mut summary);
        date = date.next_day();
        write_save(&app.paths.save_file, &SaveGame::capture(&app.world, date))?;
        summary.days += 1;
    }

    info!(
        checked = app.world.stats.get(CHECKED_STAT).copied().unwrap_or(0),
        carried = app.world.carried.len(),
        loose = app.world.loose_items.len(),
        "session_ending"
    );
    app.session.teardown();
    Ok((summary, date))
}

pub(crate) fn load_assets(app: &mut AppWiring) {
    for identity in app.world.map_identities() {
        let Some(raw) = app.maps.get(&identity) else {
            continue;
        };
        let mut data = raw.clone();
        if app.session.on_asset_requested(&identity, &mut data).is_some() {
            app.maps.insert(identity, data);
        }
    }
}

/// One day: place and stock, the player checks every can once, then night.
pub(crate) fn simulate_day(
    session: &mut GarbageDay<LootTables>,
    world: &mut SimWorld,
    date: GameDate,
    summary: &mut RunSummary,
) {
    session.on_day_started(world, date);

    for (location, tile) in world.placed_objects() {
        let events = match session.on_open(world, ParticipantId::HOST, &location, tile) {
            Ok(OpenOutcome::Handled(events)) => events,
            Ok(OpenOutcome::NotOurs) => continue,
            Err(err) => {
                warn!(error = %err, "open_failed");
                continue;
            }
        };
        summary.cans_opened += 1;
        for event in events {
            match event {
                InteractionEvent::ShowContainer { key, .. } => {
                    summary.items_taken += world.take_visible(&key);
                }
                InteractionEvent::ItemGranted { .. } => summary.items_granted += 1,
                InteractionEvent::ItemDropped { .. } => summary.items_dropped += 1,
                InteractionEvent::NpcReacted { .. }
                | InteractionEvent::Queued { .. }
                | InteractionEvent::DeferredDialogue { .. } => {}
            }
        }
        for event in session.on_container_closed(world, ParticipantId::HOST, &location, tile) {
            if let InteractionEvent::DeferredDialogue { character, .. } = event {
                info!(character = %character, "witness_dialogue_shown");
            }
        }
    }

    session.on_day_ending(world, date);
}
