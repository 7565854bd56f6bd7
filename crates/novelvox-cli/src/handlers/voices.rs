//! Voices command handler.

use novelvox_core::Voice;

/// List every narration voice. Needs no backend.
pub fn execute(current: Voice) {
    println!("{:<12} {:<26} {:<7} Gender", "Name", "Id", "Locale");
    println!("{}", "-".repeat(56));
    for voice in Voice::ALL {
        let marker = if voice == current { " (selected)" } else { "" };
        println!(
            "{:<12} {:<26} {:<7} {:?}{marker}",
            voice.display_name(),
            voice.id(),
            voice.locale(),
            voice.gender(),
        );
    }
}
