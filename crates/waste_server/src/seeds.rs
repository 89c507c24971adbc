//! Administrative seeding of the bundled pages.

use waste_core::{AppError, Database, Paste, LANDING_ID, MANUAL_ID};

struct Seed {
    id: &'static str,
    name: &'static str,
    syntax: &'static str,
    content: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: MANUAL_ID,
        name: "WASTE(1)",
        syntax: "ansi",
        content: include_str!("../seeds/waste.1.txt"),
    },
    Seed {
        id: LANDING_ID,
        name: "",
        syntax: "",
        content: include_str!("../seeds/bin.txt"),
    },
];

/// Write the bundled pages as permanent, unowned pastes.
///
/// Existing copies are overwritten so upgrades ship new text.
///
/// # Returns
/// Number of pastes written.
///
/// # Errors
/// Returns an error when a write fails.
pub fn seed_database(db: &Database) -> Result<usize, AppError> {
    for seed in SEEDS {
        let paste = Paste::seeded(seed.id, seed.name, seed.content.as_bytes().to_vec(), seed.syntax);
        db.pastes.put(&paste)?;
    }
    tracing::info!(count = SEEDS.len(), "Seeded bundled pastes");
    Ok(SEEDS.len())
}
