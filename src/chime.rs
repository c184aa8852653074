/// Completion sound, injected into the engine so tests can substitute a
/// counting fake. Fires once per incomplete-to-complete transition.
pub trait CompletionChime {
    fn play(&self);
}

/// System sound via the OS. Currently only implemented for macOS; a no-op
/// elsewhere.
pub struct SystemChime;

impl CompletionChime for SystemChime {
    fn play(&self) {
        #[cfg(target_os = "macos")]
        {
            use std::process::Command;
            let _ = Command::new("afplay")
                .arg("/System/Library/Sounds/Glass.aiff")
                .spawn();
        }
    }
}

/// No sound at all (headless subcommands)
pub struct SilentChime;

impl CompletionChime for SilentChime {
    fn play(&self) {}
}
